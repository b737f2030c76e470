use std::io::Write;
use crate::cli::input::{InputSource, Line, Pause};
use crate::cli::prompt::{ask_again, parse_entry, Entry, QUIT_TOKEN};
use crate::cli::terminal::clear_screen;
use crate::common::config::Config;
use crate::common::error::Result;
use crate::core::measure::{Measurement, Measurer};
use crate::core::report::Comparison;
use crate::storage::error_log::{LogClock, SharedErrorLog};

pub const END_MSG: &str = "Program finished.";
pub const ELEMENTS_PROMPT: &str = "No. of array elements:  ";

/// Why the session stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    Quit,
    Declined,
    Interrupted,
}

enum Step {
    Again,
    Stop(Exit),
}

/// The interactive loop. Holds the run's error log and writes it out once,
/// when [`Session::run`] returns or an interrupt handler flushes it first.
pub struct Session<I, W> {
    config: Config,
    measurer: Measurer,
    clock: LogClock,
    log: SharedErrorLog,
    input: I,
    out: W,
}

impl<I: InputSource, W: Write> Session<I, W> {
    pub fn new(config: Config, input: I, out: W) -> Result<Self> {
        config.validate()?;
        let clock = LogClock::new(config.utc_offset()?);
        let measurer = Measurer::new(config.analysis.max_allocation_bytes);
        let log = SharedErrorLog::new(config.error_log.path.clone());

        Ok(Self {
            config,
            measurer,
            clock,
            log,
            input,
            out,
        })
    }

    /// Handle to this session's error log, for the interrupt handler.
    pub fn error_log(&self) -> SharedErrorLog {
        self.log.clone()
    }

    pub fn run(mut self) -> Result<Exit> {
        match self.run_loop() {
            Ok(exit) => {
                tracing::debug!("Session ending: {:?}, {} error(s) recorded", exit, self.log.len());
                self.log.flush()?;
                writeln!(self.out, "\n{}", END_MSG)?;
                self.out.flush()?;
                Ok(exit)
            }
            Err(e) => {
                tracing::error!("Session aborted: {}", e);
                if let Err(flush_err) = self.log.flush() {
                    tracing::error!("Failed to write error log: {}", flush_err);
                }
                Err(e)
            }
        }
    }

    fn run_loop(&mut self) -> Result<Exit> {
        loop {
            self.clear()?;
            writeln!(self.out, "{} MEMORY ANALYZER TOOL {}", "=".repeat(5), "=".repeat(5))?;
            writeln!(
                self.out,
                "\nEnter your desired number of elements or '{}' to quit",
                QUIT_TOKEN
            )?;
            write!(self.out, "{}", ELEMENTS_PROMPT)?;
            self.out.flush()?;

            let raw = match self.input.read_line()? {
                Line::Text(text) => text,
                Line::Interrupted => return Ok(Exit::Interrupted),
            };

            match parse_entry(&raw) {
                Entry::Empty => continue,
                Entry::Quit => return Ok(Exit::Quit),
                Entry::Invalid(reason) => {
                    tracing::debug!("Rejected input {:?}: {:?}", raw, reason);
                    writeln!(self.out, "\n{}", reason)?;
                    self.out.flush()?;
                    if self.input.pause(self.config.invalid_input_pause())? == Pause::Interrupted {
                        return Ok(Exit::Interrupted);
                    }
                }
                Entry::Count(elements) => match self.analyze(elements) {
                    Ok(Step::Again) => continue,
                    Ok(Step::Stop(exit)) => return Ok(exit),
                    Err(e) if e.is_recoverable() => {
                        tracing::warn!("Analysis of {} elements failed: {}", elements, e);
                        self.log.record(&e, &self.clock);
                    }
                    Err(e) => return Err(e),
                },
            }
        }
    }

    fn analyze(&mut self, elements: usize) -> Result<Step> {
        writeln!(self.out, "\nAnalyzing..")?;
        self.out.flush()?;

        let measurement = self.measurer.measure(elements)?;
        tracing::info!(
            "Measured {} elements: {} bytes as {}",
            measurement.elements, measurement.bytes, measurement.dtype
        );

        if self.input.pause(self.config.analysis_delay())? == Pause::Interrupted {
            return Ok(Step::Stop(Exit::Interrupted));
        }
        self.clear()?;

        write_measurement(&mut self.out, &measurement)?;
        let comparison = Comparison::new(elements, measurement.bytes);
        writeln!(self.out, "\n{}", comparison)?;

        Ok(match ask_again(&mut self.input, &mut self.out)? {
            Some(true) => Step::Again,
            Some(false) => Step::Stop(Exit::Declined),
            None => Step::Stop(Exit::Interrupted),
        })
    }

    fn clear(&mut self) -> Result<()> {
        if self.config.prompt.clear_screen {
            clear_screen(&mut self.out)?;
        }
        Ok(())
    }
}

fn write_measurement<W: Write>(out: &mut W, measurement: &Measurement) -> std::io::Result<()> {
    writeln!(out, "{}", "=".repeat(40))?;
    writeln!(out, "🧠 MEMORY ANALYZER (BEGINNER EDITION)")?;
    writeln!(out, "{}", "=".repeat(40))?;

    match measurement.max_value {
        Some(max) => writeln!(out, "\nArray up to {} needs min dtype: {}.", max, measurement.dtype)?,
        None => writeln!(
            out,
            "\nEmpty array: no values to store, defaulting to {}.",
            measurement.dtype
        )?,
    }
    writeln!(out, "Total bytes used: {} bytes", measurement.bytes)?;
    writeln!(out, "Allocated dtype: {}", measurement.dtype)
}
