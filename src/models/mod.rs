pub mod progress_log_entry;

#[allow(unused_imports)]
pub mod prelude {
    pub use super::progress_log_entry::{self, Entity as ProgressLogEntry};
}
