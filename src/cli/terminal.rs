use std::io::{self, Write};
use std::time::{Duration, Instant};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    terminal::{self, ClearType},
    cursor,
};
use crate::cli::input::{InputSource, Line, Pause};

pub fn clear_screen<W: Write>(out: &mut W) -> io::Result<()> {
    crossterm::execute!(
        out,
        terminal::Clear(ClearType::All),
        cursor::MoveTo(0, 0)
    )?;
    out.flush()
}

/// Leaves raw mode when dropped, even if reading fails half way.
struct RawModeGuard;

impl RawModeGuard {
    fn enable() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        if let Err(e) = terminal::disable_raw_mode() {
            tracing::warn!("Failed to leave raw mode: {}", e);
        }
    }
}

fn is_interrupt(code: KeyCode, modifiers: KeyModifiers) -> bool {
    modifiers.contains(KeyModifiers::CONTROL) && matches!(code, KeyCode::Char('c') | KeyCode::Char('d'))
}

/// What one key press does to the line being edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyAction {
    Submit,
    Interrupt,
    Erase,
    Insert(char),
    Ignore,
}

fn key_action(code: KeyCode, modifiers: KeyModifiers) -> KeyAction {
    if is_interrupt(code, modifiers) {
        return KeyAction::Interrupt;
    }
    match code {
        KeyCode::Enter => KeyAction::Submit,
        KeyCode::Backspace => KeyAction::Erase,
        // Other Ctrl/Alt chords are editing shortcuts we don't support.
        KeyCode::Char(_) if modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) => {
            KeyAction::Ignore
        }
        KeyCode::Char(ch) => KeyAction::Insert(ch),
        _ => KeyAction::Ignore,
    }
}

/// Reads answers from an interactive terminal.
///
/// Keys are read in raw mode so Ctrl-C arrives as a key press instead of a
/// signal and ends the session like `q` does.
#[derive(Debug, Default)]
pub struct TerminalInput;

impl TerminalInput {
    pub fn new() -> Self {
        Self
    }

    fn read_raw(&mut self, stdout: &mut io::Stdout) -> io::Result<Line> {
        let mut buf = String::new();
        loop {
            let Event::Key(KeyEvent { code, modifiers, kind, .. }) = event::read()? else {
                continue;
            };
            if kind != KeyEventKind::Press {
                continue;
            }

            match key_action(code, modifiers) {
                KeyAction::Submit => return Ok(Line::Text(buf)),
                KeyAction::Interrupt => return Ok(Line::Interrupted),
                KeyAction::Erase => {
                    if buf.pop().is_some() {
                        write!(stdout, "\x08 \x08")?;
                        stdout.flush()?;
                    }
                }
                KeyAction::Insert(ch) => {
                    buf.push(ch);
                    write!(stdout, "{}", ch)?;
                    stdout.flush()?;
                }
                KeyAction::Ignore => {}
            }
        }
    }
}

impl InputSource for TerminalInput {
    fn read_line(&mut self) -> io::Result<Line> {
        let mut stdout = io::stdout();
        let line = {
            let _raw = RawModeGuard::enable()?;
            self.read_raw(&mut stdout)?
        };
        writeln!(stdout)?;
        Ok(line)
    }

    fn pause(&mut self, duration: Duration) -> io::Result<Pause> {
        if duration.is_zero() {
            return Ok(Pause::Elapsed);
        }

        let _raw = RawModeGuard::enable()?;
        let deadline = Instant::now() + duration;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Ok(Pause::Elapsed);
            }
            if event::poll(remaining)? {
                if let Event::Key(KeyEvent { code, modifiers, .. }) = event::read()? {
                    if is_interrupt(code, modifiers) {
                        return Ok(Pause::Interrupted);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ctrl_c_and_ctrl_d_interrupt() {
        assert!(is_interrupt(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(is_interrupt(KeyCode::Char('d'), KeyModifiers::CONTROL));
        assert!(!is_interrupt(KeyCode::Char('c'), KeyModifiers::NONE));
        assert!(!is_interrupt(KeyCode::Char('q'), KeyModifiers::CONTROL));
    }

    #[test]
    fn modified_chords_are_not_inserted() {
        assert_eq!(key_action(KeyCode::Char('u'), KeyModifiers::CONTROL), KeyAction::Ignore);
        assert_eq!(key_action(KeyCode::Char('b'), KeyModifiers::ALT), KeyAction::Ignore);
        assert_eq!(key_action(KeyCode::Char('c'), KeyModifiers::CONTROL), KeyAction::Interrupt);
    }

    #[test]
    fn plain_and_shifted_characters_are_inserted() {
        assert_eq!(key_action(KeyCode::Char('7'), KeyModifiers::NONE), KeyAction::Insert('7'));
        assert_eq!(key_action(KeyCode::Char('Q'), KeyModifiers::SHIFT), KeyAction::Insert('Q'));
        assert_eq!(key_action(KeyCode::Enter, KeyModifiers::NONE), KeyAction::Submit);
        assert_eq!(key_action(KeyCode::Backspace, KeyModifiers::NONE), KeyAction::Erase);
        assert_eq!(key_action(KeyCode::Left, KeyModifiers::NONE), KeyAction::Ignore);
    }

    #[test]
    fn clear_screen_writes_escape_sequence() {
        let mut out = Vec::new();
        clear_screen(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("\x1b[2J"));
        assert!(text.contains("\x1b[1;1H"));
    }
}
