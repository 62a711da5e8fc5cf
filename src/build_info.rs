//! Build-time information
//!
//! Metadata captured at compile time by the build script, shown by
//! `pfmt-diagnose --version` so support can tell which build produced a
//! diagnostic transcript.

/// Cargo optimization level (0, 1, 2, 3, s, z)
pub const CARGO_OPT_LEVEL: &str = env!("VERGEN_CARGO_OPT_LEVEL");

/// Target triple (e.g., x86_64-unknown-linux-gnu)
pub const CARGO_TARGET_TRIPLE: &str = env!("VERGEN_CARGO_TARGET_TRIPLE");

/// Version text for `--version`
///
/// `concat!` only takes literals, so the vergen values are read again here.
pub const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    "\nBuilt: ",
    env!("VERGEN_BUILD_TIMESTAMP"),
    "\nTarget: ",
    env!("VERGEN_CARGO_TARGET_TRIPLE"),
    "\nOptimization: ",
    env!("VERGEN_CARGO_OPT_LEVEL"),
    "\nRustc: ",
    env!("VERGEN_RUSTC_SEMVER"),
    " (",
    env!("VERGEN_RUSTC_CHANNEL"),
    ")"
);

/// Returns a formatted build version string
///
/// Format: `{target_triple}-opt{opt_level}`
/// Example: `x86_64-unknown-linux-gnu-opt3`
pub fn version_string() -> String {
    format!("{}-opt{}", CARGO_TARGET_TRIPLE, CARGO_OPT_LEVEL)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_long_version_starts_with_package_version() {
        assert!(LONG_VERSION.starts_with(env!("CARGO_PKG_VERSION")));
        assert!(LONG_VERSION.contains(CARGO_TARGET_TRIPLE));
    }

    #[test]
    fn test_version_string() {
        assert!(version_string().ends_with(&format!("-opt{}", CARGO_OPT_LEVEL)));
    }
}
