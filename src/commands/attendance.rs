//! `attendance mark|unmark|list`.

use chrono::NaiveDate;
use log::info;

use crate::commands::{CommandError, CommandResult, resolve_student, resolve_tutorial, write_back};
use crate::index::Index;
use crate::model::Model;
use crate::model::navigation::NavigationMode;
use crate::model::student::Student;
use crate::model::tutorial::{Attendance, Tutorial};
use crate::parser::tokenizer::{PREFIX_DATE, PREFIX_TUTORIAL, tokenize};
use crate::parser::utils::{ATTENDANCE_DATE_FORMAT, all_present, parse_date, parse_index};
use crate::parser::{ParseError, SubcommandTable};

pub const FAMILY_WORD: &str = "attendance";

pub const MARK_USAGE: &str = "Usage: attendance mark STUDENT_INDEX t/TUTORIAL_INDEX d/YYYY-MM-DD";
pub const UNMARK_USAGE: &str =
    "Usage: attendance unmark STUDENT_INDEX t/TUTORIAL_INDEX d/YYYY-MM-DD";
pub const LIST_USAGE: &str = "Usage: attendance list t/TUTORIAL_INDEX";

pub static COMMANDS: SubcommandTable<AttendanceCommand> = SubcommandTable {
    family: FAMILY_WORD,
    entries: &[
        ("mark", parse_mark),
        ("unmark", parse_unmark),
        ("list", parse_list),
    ],
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttendanceCommand {
    Mark {
        student: Index,
        tutorial: Index,
        date: NaiveDate,
    },
    Unmark {
        student: Index,
        tutorial: Index,
        date: NaiveDate,
    },
    List {
        tutorial: Index,
    },
}

fn parse_record(args: &str, usage: &str) -> Result<(Index, Index, NaiveDate), ParseError> {
    let map = tokenize(args, &[PREFIX_TUTORIAL, PREFIX_DATE]);
    if map.preamble().is_empty() || !all_present(&map, &[PREFIX_TUTORIAL, PREFIX_DATE]) {
        return Err(ParseError::invalid_format(usage));
    }
    map.verify_no_duplicate_prefixes(&[PREFIX_TUTORIAL, PREFIX_DATE])?;
    let student = parse_index(map.preamble())?;
    let tutorial = parse_index(map.value(PREFIX_TUTORIAL).unwrap_or_default())?;
    let date = parse_date(map.value(PREFIX_DATE).unwrap_or_default())?;
    Ok((student, tutorial, date))
}

fn parse_mark(args: &str) -> Result<AttendanceCommand, ParseError> {
    let (student, tutorial, date) = parse_record(args, MARK_USAGE)?;
    Ok(AttendanceCommand::Mark {
        student,
        tutorial,
        date,
    })
}

fn parse_unmark(args: &str) -> Result<AttendanceCommand, ParseError> {
    let (student, tutorial, date) = parse_record(args, UNMARK_USAGE)?;
    Ok(AttendanceCommand::Unmark {
        student,
        tutorial,
        date,
    })
}

fn parse_list(args: &str) -> Result<AttendanceCommand, ParseError> {
    let map = tokenize(args, &[PREFIX_TUTORIAL]);
    if !map.preamble().is_empty() || !map.has(PREFIX_TUTORIAL) {
        return Err(ParseError::invalid_format(LIST_USAGE));
    }
    map.verify_no_duplicate_prefixes(&[PREFIX_TUTORIAL])?;
    let tutorial = parse_index(map.value(PREFIX_TUTORIAL).unwrap_or_default())?;
    Ok(AttendanceCommand::List { tutorial })
}

pub fn execute(
    command: &AttendanceCommand,
    model: &mut Model,
) -> Result<CommandResult, CommandError> {
    match *command {
        AttendanceCommand::Mark {
            student,
            tutorial,
            date,
        } => {
            let (student, tutorial) = resolve_member(model, student, tutorial)?;
            let mut updated = tutorial.clone();
            let record = Attendance {
                student: student.name.clone(),
                date,
            };
            if !updated.attendance.add(record) {
                return Err(CommandError::new(format!(
                    "{} is already marked present in {} on {}",
                    student.name,
                    tutorial,
                    date.format(ATTENDANCE_DATE_FORMAT)
                )));
            }
            write_back(model, &tutorial, updated);
            debug_assert!(model.check(), "address book invariants violated");
            info!(
                "event=attendance_marked tutorial={} student={} date={date}",
                tutorial.name, student.name
            );
            model.focus_tutorial(Some(tutorial.name.clone()));
            Ok(CommandResult::new(
                format!(
                    "Marked {} present in {} on {}",
                    student.name,
                    tutorial,
                    date.format(ATTENDANCE_DATE_FORMAT)
                ),
                NavigationMode::Attendance,
            ))
        }
        AttendanceCommand::Unmark {
            student,
            tutorial,
            date,
        } => {
            let (student, tutorial) = resolve_member(model, student, tutorial)?;
            let mut updated = tutorial.clone();
            let record = Attendance {
                student: student.name.clone(),
                date,
            };
            if !updated.attendance.remove(&record) {
                return Err(CommandError::new(format!(
                    "{} was not marked present in {} on {}",
                    student.name,
                    tutorial,
                    date.format(ATTENDANCE_DATE_FORMAT)
                )));
            }
            write_back(model, &tutorial, updated);
            debug_assert!(model.check(), "address book invariants violated");
            info!(
                "event=attendance_unmarked tutorial={} student={} date={date}",
                tutorial.name, student.name
            );
            model.focus_tutorial(Some(tutorial.name.clone()));
            Ok(CommandResult::new(
                format!(
                    "Unmarked {} in {} on {}",
                    student.name,
                    tutorial,
                    date.format(ATTENDANCE_DATE_FORMAT)
                ),
                NavigationMode::Attendance,
            ))
        }
        AttendanceCommand::List { tutorial } => {
            let tutorial = resolve_tutorial(model, tutorial)?;
            model.focus_tutorial(Some(tutorial.name.clone()));
            Ok(CommandResult::new(
                format!("Listed attendance of {tutorial}"),
                NavigationMode::Attendance,
            ))
        }
    }
}

/// Resolve both indices and check the student is enrolled in the tutorial.
pub(crate) fn resolve_member(
    model: &Model,
    student: Index,
    tutorial: Index,
) -> Result<(Student, Tutorial), CommandError> {
    let student = resolve_student(model, student)?;
    let tutorial = resolve_tutorial(model, tutorial)?;
    if !student.belongs_to(&tutorial.name) {
        return Err(CommandError::new(format!(
            "Student {} is not in tutorial {}",
            student.name, tutorial
        )));
    }
    Ok((student, tutorial))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testutil::typical_model;
    use crate::model::fields::{Name, TutorialName};
    use pretty_assertions::assert_eq;

    fn run(model: &mut Model, args: &str) -> Result<CommandResult, CommandError> {
        let command = COMMANDS.dispatch(args).unwrap();
        execute(&command, model)
    }

    fn dates_of(model: &Model, tutorial: &str, student: &str) -> Vec<String> {
        model
            .book()
            .tutorial_by_name(&TutorialName::new(tutorial).unwrap())
            .unwrap()
            .attendance_of(&Name::new(student).unwrap())
            .iter()
            .map(|d| d.to_string())
            .collect()
    }

    #[test]
    fn parse_needs_all_parts() {
        assert_eq!(
            COMMANDS.dispatch("mark 1 t/1").unwrap_err(),
            ParseError::invalid_format(MARK_USAGE)
        );
        assert_eq!(
            COMMANDS.dispatch("unmark t/1 d/2024-03-01").unwrap_err(),
            ParseError::invalid_format(UNMARK_USAGE)
        );
        assert!(COMMANDS.dispatch("mark 1 t/1 d/1st March").is_err());
        assert_eq!(
            COMMANDS.dispatch("list").unwrap_err(),
            ParseError::invalid_format(LIST_USAGE)
        );
    }

    #[test]
    fn mark_then_unmark() {
        let mut model = typical_model();
        let result = run(&mut model, "mark 1 t/1 d/2024-03-01").unwrap();
        assert_eq!(result.feedback, "Marked Alice Pauline present in T01 on 2024-03-01");
        assert_eq!(result.mode, NavigationMode::Attendance);
        assert_eq!(model.focused_tutorial().unwrap().name.as_str(), "T01");
        assert_eq!(dates_of(&model, "T01", "Alice Pauline"), vec!["2024-03-01"]);

        let err = run(&mut model, "mark 1 t/1 d/2024-03-01").unwrap_err();
        assert_eq!(
            err.message(),
            "Alice Pauline is already marked present in T01 on 2024-03-01"
        );

        run(&mut model, "unmark 1 t/1 d/2024-03-01").unwrap();
        assert!(dates_of(&model, "T01", "Alice Pauline").is_empty());
        assert!(run(&mut model, "unmark 1 t/1 d/2024-03-01").is_err());
    }

    #[test]
    fn only_members_can_be_marked() {
        let mut model = typical_model();
        let err = run(&mut model, "mark 2 t/1 d/2024-03-01").unwrap_err();
        assert_eq!(err.message(), "Student Benson Meier is not in tutorial T01");
        let err = run(&mut model, "mark 1 t/7 d/2024-03-01").unwrap_err();
        assert_eq!(err.message(), "Tutorial 7 not found");
    }

    #[test]
    fn deleting_student_drops_attendance() {
        let mut model = typical_model();
        run(&mut model, "mark 3 t/1 d/2024-03-01").unwrap();
        let carl = model
            .book()
            .student_by_name(&Name::new("Carl Kurz").unwrap())
            .cloned()
            .unwrap();
        model.book_mut().remove_student(&carl).unwrap();
        assert!(dates_of(&model, "T01", "Carl Kurz").is_empty());
        assert!(model.check());
    }

    #[test]
    fn list_focuses_tutorial() {
        let mut model = typical_model();
        let result = run(&mut model, "list t/2").unwrap();
        assert_eq!(result.feedback, "Listed attendance of T02");
        assert_eq!(model.focused_tutorial().unwrap().name.as_str(), "T02");
    }
}
