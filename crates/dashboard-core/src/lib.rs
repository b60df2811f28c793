pub mod config;
pub mod error;
pub mod result;
pub mod traits;

pub use config::{AppConfig, CountdownLocale};
pub use error::DashboardError;
pub use result::DashboardResult;
pub use traits::{AlwaysConfirm, Confirm};
