pub mod error_log;

pub use error_log::{ErrorLog, ErrorRecord, LogClock, SharedErrorLog, TIMESTAMP_FORMAT};
