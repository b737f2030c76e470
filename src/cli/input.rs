use std::collections::VecDeque;
use std::io::{self, BufRead};
use std::thread;
use std::time::Duration;

/// One answer read from the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    Text(String),
    /// Ctrl-C, Ctrl-D or end of input.
    Interrupted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pause {
    Elapsed,
    Interrupted,
}

/// Where the session gets its answers from.
pub trait InputSource {
    fn read_line(&mut self) -> io::Result<Line>;

    /// Waits for `duration`. Sources that can see keystrokes report an
    /// interrupt pressed while waiting.
    fn pause(&mut self, duration: Duration) -> io::Result<Pause> {
        if !duration.is_zero() {
            thread::sleep(duration);
        }
        Ok(Pause::Elapsed)
    }
}

impl<T: InputSource + ?Sized> InputSource for &mut T {
    fn read_line(&mut self) -> io::Result<Line> {
        (**self).read_line()
    }

    fn pause(&mut self, duration: Duration) -> io::Result<Pause> {
        (**self).pause(duration)
    }
}

/// Line-buffered reader for piped input. End of input counts as an interrupt.
pub struct LineInput<R> {
    reader: R,
}

impl<R: BufRead> LineInput<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: BufRead> InputSource for LineInput<R> {
    fn read_line(&mut self) -> io::Result<Line> {
        let mut buf = String::new();
        if self.reader.read_line(&mut buf)? == 0 {
            return Ok(Line::Interrupted);
        }
        let trimmed = buf.trim_end_matches(['\n', '\r']);
        Ok(Line::Text(trimmed.to_string()))
    }
}

/// Pre-recorded answers. Runs out as if the user hit Ctrl-D.
#[derive(Debug, Default)]
pub struct ScriptedInput {
    lines: VecDeque<Line>,
    pauses: Vec<Duration>,
    reads: usize,
    interrupt_pauses: usize,
}

impl ScriptedInput {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(|s| Line::Text(s.into())).collect(),
            ..Self::default()
        }
    }

    pub fn then_interrupt(mut self) -> Self {
        self.lines.push_back(Line::Interrupted);
        self
    }

    /// The next pause reports Ctrl-C instead of elapsing. Stacks when
    /// called more than once.
    pub fn interrupt_next_pause(mut self) -> Self {
        self.interrupt_pauses += 1;
        self
    }

    /// Number of lines consumed so far, interrupts included.
    pub fn reads(&self) -> usize {
        self.reads
    }

    pub fn remaining(&self) -> usize {
        self.lines.len()
    }

    pub fn pauses(&self) -> &[Duration] {
        &self.pauses
    }
}

impl InputSource for ScriptedInput {
    fn read_line(&mut self) -> io::Result<Line> {
        self.reads += 1;
        Ok(self.lines.pop_front().unwrap_or(Line::Interrupted))
    }

    fn pause(&mut self, duration: Duration) -> io::Result<Pause> {
        self.pauses.push(duration);
        if self.interrupt_pauses > 0 {
            self.interrupt_pauses -= 1;
            return Ok(Pause::Interrupted);
        }
        Ok(Pause::Elapsed)
    }
}
