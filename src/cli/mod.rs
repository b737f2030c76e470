pub mod input;
pub mod interrupt;
pub mod prompt;
pub mod session;
pub mod terminal;

pub use input::{InputSource, Line, LineInput, Pause, ScriptedInput};
pub use prompt::{ask_again, parse_answer, parse_entry, Answer, Entry, InvalidEntry};
pub use session::{Exit, Session, END_MSG};
pub use terminal::{clear_screen, TerminalInput};
