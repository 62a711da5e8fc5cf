//! The checklist categories, in the order they run

pub mod containers;
pub mod database;
pub mod endpoints;
pub mod environment;
pub mod logs;
pub mod wizard;

pub use containers::{ComposeCli, ContainerStatusCheck};
pub use database::DatabaseCheck;
pub use endpoints::EndpointCheck;
pub use environment::EnvironmentCheck;
pub use logs::LogAnalysisCheck;
pub use wizard::WizardCheck;
