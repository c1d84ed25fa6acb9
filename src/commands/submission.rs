//! `submission add|grade|list`.

use log::info;

use crate::commands::attendance::resolve_member;
use crate::commands::{CommandError, CommandResult, resolve_tutorial, write_back};
use crate::identity::CollectionError;
use crate::index::Index;
use crate::model::Model;
use crate::model::fields::AssignmentName;
use crate::model::navigation::NavigationMode;
use crate::model::tutorial::{Submission, Tutorial};
use crate::parser::tokenizer::{PREFIX_GRADE, PREFIX_STUDENT, PREFIX_TUTORIAL, tokenize};
use crate::parser::utils::{all_present, parse_assignment_name, parse_grade, parse_index};
use crate::parser::{ParseError, SubcommandTable};

pub const FAMILY_WORD: &str = "submission";

pub const ADD_USAGE: &str =
    "Usage: submission add ASSIGNMENT_NAME s/STUDENT_INDEX t/TUTORIAL_INDEX";
pub const GRADE_USAGE: &str =
    "Usage: submission grade ASSIGNMENT_NAME s/STUDENT_INDEX t/TUTORIAL_INDEX g/GRADE";
pub const LIST_USAGE: &str = "Usage: submission list t/TUTORIAL_INDEX";

pub static COMMANDS: SubcommandTable<SubmissionCommand> = SubcommandTable {
    family: FAMILY_WORD,
    entries: &[
        ("add", parse_add),
        ("grade", parse_grade_command),
        ("list", parse_list),
    ],
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionCommand {
    Add {
        assignment: AssignmentName,
        student: Index,
        tutorial: Index,
    },
    Grade {
        assignment: AssignmentName,
        student: Index,
        tutorial: Index,
        grade: u8,
    },
    List {
        tutorial: Index,
    },
}

fn parse_add(args: &str) -> Result<SubmissionCommand, ParseError> {
    let map = tokenize(args, &[PREFIX_STUDENT, PREFIX_TUTORIAL]);
    let required = [PREFIX_STUDENT, PREFIX_TUTORIAL];
    if map.preamble().is_empty() || !all_present(&map, &required) {
        return Err(ParseError::invalid_format(ADD_USAGE));
    }
    map.verify_no_duplicate_prefixes(&required)?;
    Ok(SubmissionCommand::Add {
        assignment: parse_assignment_name(map.preamble())?,
        student: parse_index(map.value(PREFIX_STUDENT).unwrap_or_default())?,
        tutorial: parse_index(map.value(PREFIX_TUTORIAL).unwrap_or_default())?,
    })
}

fn parse_grade_command(args: &str) -> Result<SubmissionCommand, ParseError> {
    let map = tokenize(args, &[PREFIX_STUDENT, PREFIX_TUTORIAL, PREFIX_GRADE]);
    let required = [PREFIX_STUDENT, PREFIX_TUTORIAL, PREFIX_GRADE];
    if map.preamble().is_empty() || !all_present(&map, &required) {
        return Err(ParseError::invalid_format(GRADE_USAGE));
    }
    map.verify_no_duplicate_prefixes(&required)?;
    Ok(SubmissionCommand::Grade {
        assignment: parse_assignment_name(map.preamble())?,
        student: parse_index(map.value(PREFIX_STUDENT).unwrap_or_default())?,
        tutorial: parse_index(map.value(PREFIX_TUTORIAL).unwrap_or_default())?,
        grade: parse_grade(map.value(PREFIX_GRADE).unwrap_or_default())?,
    })
}

fn parse_list(args: &str) -> Result<SubmissionCommand, ParseError> {
    let map = tokenize(args, &[PREFIX_TUTORIAL]);
    if !map.preamble().is_empty() || !map.has(PREFIX_TUTORIAL) {
        return Err(ParseError::invalid_format(LIST_USAGE));
    }
    map.verify_no_duplicate_prefixes(&[PREFIX_TUTORIAL])?;
    Ok(SubmissionCommand::List {
        tutorial: parse_index(map.value(PREFIX_TUTORIAL).unwrap_or_default())?,
    })
}

fn assignment_not_found(assignment: &AssignmentName, tutorial: &Tutorial) -> CommandError {
    CommandError::new(format!("Assignment {assignment} not found in {tutorial}"))
}

pub fn execute(
    command: &SubmissionCommand,
    model: &mut Model,
) -> Result<CommandResult, CommandError> {
    match command {
        SubmissionCommand::Add {
            assignment,
            student,
            tutorial,
        } => {
            let (student, tutorial) = resolve_member(model, *student, *tutorial)?;
            let mut updated = tutorial.clone();
            let outcome = updated.update_assignment(assignment, |a| {
                if a.submissions.add(Submission::new(student.name.clone())) {
                    Ok(())
                } else {
                    Err(CollectionError::DuplicateItem)
                }
            });
            match outcome {
                Ok(()) => {}
                Err(CollectionError::ItemNotFound) => {
                    return Err(assignment_not_found(assignment, &tutorial));
                }
                Err(CollectionError::DuplicateItem) => {
                    return Err(CommandError::new(format!(
                        "{} already has a submission for {assignment}",
                        student.name
                    )));
                }
            }
            write_back(model, &tutorial, updated);
            debug_assert!(model.check(), "address book invariants violated");
            info!(
                "event=submission_added tutorial={} assignment={assignment} student={}",
                tutorial.name, student.name
            );
            model.focus_tutorial(Some(tutorial.name.clone()));
            Ok(CommandResult::new(
                format!("Added submission of {} for {assignment}", student.name),
                NavigationMode::Submission,
            ))
        }
        SubmissionCommand::Grade {
            assignment,
            student,
            tutorial,
            grade,
        } => {
            let (student, tutorial) = resolve_member(model, *student, *tutorial)?;
            let current = tutorial
                .assignment(assignment)
                .ok_or_else(|| assignment_not_found(assignment, &tutorial))?
                .submission_of(&student.name)
                .cloned()
                .ok_or_else(|| {
                    CommandError::new(format!(
                        "{} has no submission for {assignment}",
                        student.name
                    ))
                })?;
            let mut updated = tutorial.clone();
            let graded = Submission {
                grade: Some(*grade),
                ..current.clone()
            };
            if let Err(err) =
                updated.update_assignment(assignment, |a| a.submissions.set(&current, graded))
            {
                panic!("submission of {} vanished while grading: {err}", student.name);
            }
            write_back(model, &tutorial, updated);
            debug_assert!(model.check(), "address book invariants violated");
            info!(
                "event=submission_graded tutorial={} assignment={assignment} student={} grade={grade}",
                tutorial.name, student.name
            );
            model.focus_tutorial(Some(tutorial.name.clone()));
            Ok(CommandResult::new(
                format!("Graded {} for {assignment}: {grade}/100", student.name),
                NavigationMode::Submission,
            ))
        }
        SubmissionCommand::List { tutorial } => {
            let tutorial = resolve_tutorial(model, *tutorial)?;
            model.focus_tutorial(Some(tutorial.name.clone()));
            Ok(CommandResult::new(
                format!("Listed submissions of {tutorial}"),
                NavigationMode::Submission,
            ))
        }
    }
}
