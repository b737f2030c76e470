use std::io::{self, Write};
use crossterm::terminal;
use crate::cli::session::END_MSG;
use crate::common::error::{AnalyzerError, Result};
use crate::storage::error_log::SharedErrorLog;

/// Writes whatever the session has recorded and says goodbye.
pub fn farewell<W: Write>(log: &SharedErrorLog, out: &mut W) -> Result<()> {
    if log.is_flushed() {
        tracing::debug!("Error log already written, nothing left to flush");
    }
    log.flush()?;
    writeln!(out, "\n{}", END_MSG)?;
    out.flush()?;
    Ok(())
}

/// Installs a SIGINT handler that flushes `log` and exits with success.
///
/// Covers interrupts the session cannot see as key presses: piped input,
/// and Ctrl-C while the terminal is in cooked mode.
pub fn install(log: SharedErrorLog) -> Result<()> {
    ctrlc::set_handler(move || {
        if let Err(e) = terminal::disable_raw_mode() {
            tracing::warn!("Failed to leave raw mode: {}", e);
        }

        let code = match farewell(&log, &mut io::stdout()) {
            Ok(()) => 0,
            Err(e) => {
                tracing::error!("Failed to write error log on interrupt: {}", e);
                1
            }
        };
        std::process::exit(code);
    })
    .map_err(|e| AnalyzerError::Other(e.into()))
}
