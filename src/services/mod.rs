pub mod progress;

pub use progress::{NewEntry, ProgressLog, TIMESTAMP_FORMAT};
