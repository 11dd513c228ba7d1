pub mod config;
pub mod error;
pub mod infrastructure;
pub mod services;
pub mod utils;

pub use config::ReleaseConfig;
pub use error::ReleaseError;
pub use services::release::{ReleaseOrchestrator, ReleaseSummary};
