use std::fmt;
use std::io::{self, Write};
use std::num::IntErrorKind;
use crate::cli::input::{InputSource, Line};

pub const QUIT_TOKEN: &str = "q";
const YES: [&str; 2] = ["yes", "y"];
const NO: [&str; 2] = ["no", "n"];

/// What the user typed at the element count prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entry {
    Empty,
    Quit,
    Count(usize),
    Invalid(InvalidEntry),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidEntry {
    NotANumber,
    Negative,
    TooLarge,
}

impl fmt::Display for InvalidEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidEntry::NotANumber => write!(f, "Oops! Please enter a valid integer."),
            InvalidEntry::Negative => write!(f, "Oops! The number of elements cannot be negative."),
            InvalidEntry::TooLarge => write!(f, "Oops! That number is too large for this machine."),
        }
    }
}

pub fn parse_entry(raw: &str) -> Entry {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Entry::Empty;
    }
    if trimmed.eq_ignore_ascii_case(QUIT_TOKEN) {
        return Entry::Quit;
    }

    match trimmed.parse::<usize>() {
        Ok(count) => Entry::Count(count),
        Err(e) if *e.kind() == IntErrorKind::PosOverflow => Entry::Invalid(InvalidEntry::TooLarge),
        Err(_) => match trimmed.strip_prefix('-') {
            Some(digits) if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) => {
                Entry::Invalid(InvalidEntry::Negative)
            }
            _ => Entry::Invalid(InvalidEntry::NotANumber),
        },
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Answer {
    Yes,
    No,
    Empty,
    Unrecognized,
}

pub fn parse_answer(raw: &str) -> Answer {
    let choice = raw.trim().to_lowercase();
    if choice.is_empty() {
        Answer::Empty
    } else if YES.contains(&choice.as_str()) {
        Answer::Yes
    } else if NO.contains(&choice.as_str()) {
        Answer::No
    } else {
        Answer::Unrecognized
    }
}

/// Asks whether to run another analysis until a yes or no comes back.
/// `None` means the user interrupted instead of answering.
pub fn ask_again<I, W>(input: &mut I, out: &mut W) -> io::Result<Option<bool>>
where
    I: InputSource + ?Sized,
    W: Write + ?Sized,
{
    loop {
        writeln!(out, "\nWould you like to perform another memory analysis?")?;
        write!(out, "(y/n): ")?;
        out.flush()?;

        let raw = match input.read_line()? {
            Line::Text(text) => text,
            Line::Interrupted => return Ok(None),
        };

        match parse_answer(&raw) {
            Answer::Yes => return Ok(Some(true)),
            Answer::No => return Ok(Some(false)),
            Answer::Empty => writeln!(out, "\nInput field cannot be empty!")?,
            Answer::Unrecognized => writeln!(out, "\nDid you mean 'yes' or 'no'? Try again.")?,
        }
    }
}
