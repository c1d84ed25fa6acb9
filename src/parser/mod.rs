//! Turns one line of text into a [`Command`].
//!
//! Parsing is pure: it never looks at the model. A returned command is
//! structurally valid (well-formed indices, legal names, required prefixes
//! present), so only lookups and collisions can fail at execution time.
//!
//! Dispatch has two levels. The first word either names a student command
//! directly (`add`, `delete`, ...) or a command family (`tutorial`,
//! `assignment`, ...), whose own table resolves the second word.

pub mod tokenizer;
pub mod utils;

use log::debug;
use thiserror::Error;

use crate::commands::{self, Command};

pub const MESSAGE_UNKNOWN_COMMAND: &str = "Unknown command";

/// Malformed or unrecognised command text.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct ParseError(String);

impl ParseError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }

    /// Wrap `usage` in the standard invalid-format message.
    pub fn invalid_format(usage: &str) -> Self {
        Self(format!("Invalid command format!\n{usage}"))
    }

    pub fn message(&self) -> &str {
        &self.0
    }
}

pub type SubParser<C> = fn(&str) -> Result<C, ParseError>;

/// Second-level dispatch table for one command family.
pub struct SubcommandTable<C: 'static> {
    pub family: &'static str,
    pub entries: &'static [(&'static str, SubParser<C>)],
}

impl<C> SubcommandTable<C> {
    pub fn usage(&self) -> String {
        let words: Vec<&str> = self.entries.iter().map(|(word, _)| *word).collect();
        format!("Usage: {} COMMAND\nCOMMAND: {}", self.family, words.join(", "))
    }

    pub fn dispatch(&self, args: &str) -> Result<C, ParseError> {
        let (word, rest) = split_command_word(args);
        let parser = self
            .entries
            .iter()
            .find(|(name, _)| *name == word)
            .map(|(_, parser)| *parser)
            .ok_or_else(|| ParseError::invalid_format(&self.usage()))?;
        debug!("event=dispatch family={} sub={word}", self.family);
        parser(rest)
    }
}

/// Split off the first whitespace-delimited word; the rest keeps its
/// leading space so prefix tokenizing works on it.
pub fn split_command_word(input: &str) -> (&str, &str) {
    let input = input.trim_start();
    match input.find(char::is_whitespace) {
        Some(at) => (&input[..at], &input[at..]),
        None => (input, ""),
    }
}

pub fn parse_command(input: &str) -> Result<Command, ParseError> {
    let (word, args) = split_command_word(input.trim());
    if word.is_empty() {
        return Err(ParseError::invalid_format(commands::HELP_USAGE));
    }
    debug!("event=parse word={word}");
    match word {
        commands::student::ADD_WORD => commands::student::parse_add(args).map(Command::Student),
        commands::student::DELETE_WORD => {
            commands::student::parse_delete(args).map(Command::Student)
        }
        commands::student::EDIT_WORD => commands::student::parse_edit(args).map(Command::Student),
        commands::student::FIND_WORD => commands::student::parse_find(args).map(Command::Student),
        commands::student::LIST_WORD => {
            Ok(Command::Student(commands::student::StudentCommand::List))
        }
        commands::student::VIEW_WORD => commands::student::parse_view(args).map(Command::Student),
        commands::CLEAR_WORD => Ok(Command::Clear),
        commands::HELP_WORD => Ok(Command::Help),
        commands::EXIT_WORD => Ok(Command::Exit),
        commands::tutorial::FAMILY_WORD => commands::tutorial::COMMANDS
            .dispatch(args)
            .map(Command::Tutorial),
        commands::assignment::FAMILY_WORD => commands::assignment::COMMANDS
            .dispatch(args)
            .map(Command::Assignment),
        commands::attendance::FAMILY_WORD => commands::attendance::COMMANDS
            .dispatch(args)
            .map(Command::Attendance),
        commands::submission::FAMILY_WORD => commands::submission::COMMANDS
            .dispatch(args)
            .map(Command::Submission),
        _ => Err(ParseError::new(MESSAGE_UNKNOWN_COMMAND)),
    }
}
