pub mod caller;
pub mod config;
pub mod context;
pub mod db;
pub mod error;
pub mod migrations;
pub mod models;
pub mod policy;
pub mod services;
pub mod telemetry;

#[cfg(test)]
mod test_helpers;

pub use caller::{Caller, CallerSource, NoCaller};
pub use context::{Actor, LogContext};
pub use error::{AppError, Result};
pub use models::progress_log_entry::ResultMessage;
pub use policy::{AccessPolicy, Capability};
pub use services::progress::{NewEntry, ProgressLog};
