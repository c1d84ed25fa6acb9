//! Units of work over the model.
//!
//! Each command family lives in its own module holding both its parsers
//! and its executors. Executors receive the model by mutable reference,
//! return a [`CommandResult`] on success, and report user-facing failures
//! as [`CommandError`]. Commands over several targets apply them one by one:
//! a failing target stops the loop, and earlier targets stay applied.

pub mod assignment;
pub mod attendance;
pub mod student;
pub mod submission;
pub mod tutorial;

use log::info;
use thiserror::Error;

use crate::index::Index;
use crate::model::Model;
use crate::model::address_book::AddressBook;
use crate::model::navigation::NavigationMode;
use crate::model::student::Student;
use crate::model::tutorial::Tutorial;

pub const CLEAR_WORD: &str = "clear";
pub const HELP_WORD: &str = "help";
pub const EXIT_WORD: &str = "exit";

pub const HELP_USAGE: &str = "help: Shows program usage instructions.\nExample: help";
pub const MESSAGE_SHOWING_HELP: &str = "Opened help window.";
pub const MESSAGE_EXIT_ACKNOWLEDGEMENT: &str = "Exiting Address Book as requested ...";
pub const MESSAGE_CLEARED: &str = "Address book has been cleared!";
pub const MESSAGE_INVALID_STUDENT_INDEX: &str = "The student index provided is invalid";

/// Summary of the whole command language, shown by `help`.
pub const HELP_TEXT: &str = "\
Students
  add n/NAME p/PHONE e/EMAIL a/ADDRESS [t/TUTORIAL]...
  edit INDEX [n/NAME] [p/PHONE] [e/EMAIL] [a/ADDRESS] [t/TUTORIAL]...
  delete INDEX
  find [KEYWORD]... [t/TUTORIAL]...
  list
  view INDEX
Tutorials
  tutorial add NAME
  tutorial delete NAME
  tutorial list
  tutorial find KEYWORD...
Assignments
  assignment add NAME [d/YYYY-MM-DD HH:MM] t/TUTORIAL_INDEX...
  assignment delete NAME t/TUTORIAL_INDEX...
Attendance
  attendance mark STUDENT_INDEX t/TUTORIAL_INDEX d/YYYY-MM-DD
  attendance unmark STUDENT_INDEX t/TUTORIAL_INDEX d/YYYY-MM-DD
  attendance list t/TUTORIAL_INDEX
Submissions
  submission add ASSIGNMENT s/STUDENT_INDEX t/TUTORIAL_INDEX
  submission grade ASSIGNMENT s/STUDENT_INDEX t/TUTORIAL_INDEX g/GRADE
  submission list t/TUTORIAL_INDEX
Other
  clear
  help
  exit";

/// A failure the user can fix, with the message to show them.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct CommandError(String);

impl CommandError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }

    pub fn message(&self) -> &str {
        &self.0
    }
}

/// Outcome of a successful command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    pub feedback: String,
    /// Advisory: the caller switches views, the command never does.
    pub mode: NavigationMode,
    pub show_help: bool,
    pub exit: bool,
}

impl CommandResult {
    pub fn new(feedback: impl Into<String>, mode: NavigationMode) -> Self {
        Self {
            feedback: feedback.into(),
            mode,
            show_help: false,
            exit: false,
        }
    }

    pub fn unchanged(feedback: impl Into<String>) -> Self {
        Self::new(feedback, NavigationMode::Unchanged)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Student(student::StudentCommand),
    Tutorial(tutorial::TutorialCommand),
    Assignment(assignment::AssignmentCommand),
    Attendance(attendance::AttendanceCommand),
    Submission(submission::SubmissionCommand),
    Clear,
    Help,
    Exit,
}

impl Command {
    pub fn execute(&self, model: &mut Model) -> Result<CommandResult, CommandError> {
        match self {
            Command::Student(cmd) => student::execute(cmd, model),
            Command::Tutorial(cmd) => tutorial::execute(cmd, model),
            Command::Assignment(cmd) => assignment::execute(cmd, model),
            Command::Attendance(cmd) => attendance::execute(cmd, model),
            Command::Submission(cmd) => submission::execute(cmd, model),
            Command::Clear => clear(model),
            Command::Help => Ok(CommandResult {
                show_help: true,
                ..CommandResult::unchanged(MESSAGE_SHOWING_HELP)
            }),
            Command::Exit => {
                debug_assert!(model.check(), "address book invariants violated");
                Ok(CommandResult {
                    exit: true,
                    ..CommandResult::unchanged(MESSAGE_EXIT_ACKNOWLEDGEMENT)
                })
            }
        }
    }

    /// Short label for logs.
    pub fn word(&self) -> &'static str {
        match self {
            Command::Student(_) => "student",
            Command::Tutorial(_) => tutorial::FAMILY_WORD,
            Command::Assignment(_) => assignment::FAMILY_WORD,
            Command::Attendance(_) => attendance::FAMILY_WORD,
            Command::Submission(_) => submission::FAMILY_WORD,
            Command::Clear => CLEAR_WORD,
            Command::Help => HELP_WORD,
            Command::Exit => EXIT_WORD,
        }
    }
}

fn clear(model: &mut Model) -> Result<CommandResult, CommandError> {
    model
        .book_mut()
        .reset_data(AddressBook::new())
        .expect("an empty address book has no duplicates");
    model.select_student(None);
    model.focus_tutorial(None);
    info!("event=address_book_cleared");
    Ok(CommandResult::unchanged(MESSAGE_CLEARED))
}

pub fn tutorial_not_found(index: Index) -> CommandError {
    CommandError::new(format!("Tutorial {index} not found"))
}

/// Copy of the student at `index` in the filtered student view.
pub(crate) fn resolve_student(model: &Model, index: Index) -> Result<Student, CommandError> {
    model
        .filtered_students()
        .get(index.zero_based())
        .map(|s| (*s).clone())
        .ok_or_else(|| CommandError::new(MESSAGE_INVALID_STUDENT_INDEX))
}

/// Copy of the tutorial at `index` in the filtered tutorial view.
pub(crate) fn resolve_tutorial(model: &Model, index: Index) -> Result<Tutorial, CommandError> {
    model
        .filtered_tutorials()
        .get(index.zero_based())
        .map(|t| (*t).clone())
        .ok_or_else(|| tutorial_not_found(index))
}

/// Write back a modified tutorial copy. The copy came from the model during
/// the same command, so failure means the model was corrupted.
pub(crate) fn write_back(model: &mut Model, old: &Tutorial, new: Tutorial) {
    if let Err(err) = model.book_mut().set_tutorial(old, new) {
        panic!("tutorial {} could not be written back: {err}", old.name);
    }
}
