//! `assignment add|delete`, applied to one or more tutorials by index.

use log::info;

use crate::commands::{CommandError, CommandResult, resolve_tutorial, write_back};
use crate::identity::CollectionError;
use crate::index::Index;
use crate::model::Model;
use crate::model::fields::AssignmentName;
use crate::model::tutorial::Assignment;
use crate::parser::tokenizer::{PREFIX_DATE, PREFIX_TUTORIAL, tokenize};
use crate::parser::utils::{parse_assignment_name, parse_due_date, parse_indices};
use crate::parser::{ParseError, SubcommandTable};

pub const FAMILY_WORD: &str = "assignment";

pub const ADD_USAGE: &str =
    "Usage: assignment add ASSIGNMENT_NAME [d/YYYY-MM-DD HH:MM] t/TUTORIAL_INDEX...";
pub const DELETE_USAGE: &str = "Usage: assignment delete ASSIGNMENT_NAME t/TUTORIAL_INDEX...";

pub const MESSAGE_ADDED: &str = "New assignment added";
pub const MESSAGE_DUPLICATE_ASSIGNMENT: &str = "Assignment already exists in tutorial";
pub const MESSAGE_DELETED: &str = "Successfully deleted assignment";

pub static COMMANDS: SubcommandTable<AssignmentCommand> = SubcommandTable {
    family: FAMILY_WORD,
    entries: &[("add", parse_add), ("delete", parse_delete)],
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssignmentCommand {
    Add {
        assignment: Assignment,
        tutorials: Vec<Index>,
    },
    Delete {
        name: AssignmentName,
        tutorials: Vec<Index>,
    },
}

/// Shared shape of both sub-commands: a name preamble plus `t/` indices.
fn parse_targets(
    args: &str,
    usage: &str,
) -> Result<(AssignmentName, Option<String>, Vec<Index>), ParseError> {
    let map = tokenize(args, &[PREFIX_TUTORIAL, PREFIX_DATE]);
    if map.preamble().is_empty() || !map.has(PREFIX_TUTORIAL) {
        return Err(ParseError::invalid_format(usage));
    }
    map.verify_no_duplicate_prefixes(&[PREFIX_DATE])?;
    let name = parse_assignment_name(map.preamble())?;
    let tutorials = parse_indices(map.all_values(PREFIX_TUTORIAL))?;
    Ok((name, map.value(PREFIX_DATE).map(str::to_string), tutorials))
}

fn parse_add(args: &str) -> Result<AssignmentCommand, ParseError> {
    let (name, due, tutorials) = parse_targets(args, ADD_USAGE)?;
    let due = due.as_deref().map(parse_due_date).transpose()?;
    Ok(AssignmentCommand::Add {
        assignment: Assignment::new(name).with_due(due),
        tutorials,
    })
}

fn parse_delete(args: &str) -> Result<AssignmentCommand, ParseError> {
    let (name, due, tutorials) = parse_targets(args, DELETE_USAGE)?;
    if due.is_some() {
        return Err(ParseError::invalid_format(DELETE_USAGE));
    }
    Ok(AssignmentCommand::Delete { name, tutorials })
}

pub fn execute(
    command: &AssignmentCommand,
    model: &mut Model,
) -> Result<CommandResult, CommandError> {
    match command {
        AssignmentCommand::Add {
            assignment,
            tutorials,
        } => {
            for &index in tutorials {
                add_to(model, index, assignment)?;
            }
            debug_assert!(model.check(), "address book invariants violated");
            Ok(CommandResult::unchanged(MESSAGE_ADDED))
        }
        AssignmentCommand::Delete { name, tutorials } => {
            for &index in tutorials {
                delete_from(model, index, name)?;
            }
            debug_assert!(model.check(), "address book invariants violated");
            Ok(CommandResult::unchanged(MESSAGE_DELETED))
        }
    }
}

fn add_to(
    model: &mut Model,
    index: Index,
    assignment: &Assignment,
) -> Result<(), CommandError> {
    let tutorial = resolve_tutorial(model, index)?;
    match model
        .book_mut()
        .add_assignment(&tutorial.name, assignment.clone())
    {
        Ok(()) => {
            info!(
                "event=assignment_added tutorial={} assignment={}",
                tutorial.name, assignment.name
            );
            Ok(())
        }
        Err(CollectionError::DuplicateItem) => {
            Err(CommandError::new(MESSAGE_DUPLICATE_ASSIGNMENT))
        }
        Err(CollectionError::ItemNotFound) => {
            panic!("tutorial {} resolved from the view is missing", tutorial.name)
        }
    }
}

fn delete_from(
    model: &mut Model,
    index: Index,
    name: &AssignmentName,
) -> Result<(), CommandError> {
    let tutorial = resolve_tutorial(model, index)?;
    let mut updated = tutorial.clone();
    if !updated.delete_assignment(name) {
        return Err(CommandError::new(format!(
            "Assignment {name} not found in {tutorial}"
        )));
    }
    write_back(model, &tutorial, updated);
    info!(
        "event=assignment_deleted tutorial={} assignment={name}",
        tutorial.name
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testutil::typical_model;
    use crate::model::fields::TutorialName;
    use pretty_assertions::assert_eq;

    fn run(model: &mut Model, args: &str) -> Result<CommandResult, CommandError> {
        let command = COMMANDS.dispatch(args).unwrap();
        execute(&command, model)
    }

    fn assignments_of(model: &Model, tutorial: &str) -> Vec<String> {
        model
            .book()
            .tutorial_by_name(&TutorialName::new(tutorial).unwrap())
            .unwrap()
            .assignments
            .iter()
            .map(|a| a.to_string())
            .collect()
    }

    #[test]
    fn parse_requires_name_and_tutorials() {
        assert_eq!(
            COMMANDS.dispatch("add t/1").unwrap_err(),
            ParseError::invalid_format(ADD_USAGE)
        );
        assert_eq!(
            COMMANDS.dispatch("add Homework1").unwrap_err(),
            ParseError::invalid_format(ADD_USAGE)
        );
        assert!(COMMANDS.dispatch("add Home%work t/1").is_err());
        assert!(COMMANDS.dispatch("add Homework1 t/0").is_err());
        assert!(COMMANDS.dispatch("add Homework1 t/1 d/tomorrow").is_err());
        assert_eq!(
            COMMANDS.dispatch("delete Homework1 t/1 d/2024-01-01 10:00").unwrap_err(),
            ParseError::invalid_format(DELETE_USAGE)
        );
    }

    #[test]
    fn add_to_one_tutorial() {
        let mut model = typical_model();
        let result = run(&mut model, "add Homework1 d/2024-10-01 23:59 t/1").unwrap();
        assert_eq!(result.feedback, MESSAGE_ADDED);
        assert_eq!(assignments_of(&model, "T01"), vec!["Homework1 (Due: 2024-10-01 23:59)"]);
        assert!(assignments_of(&model, "T02").is_empty());
    }

    #[test]
    fn same_name_in_different_tutorials() {
        let mut model = typical_model();
        run(&mut model, "add A1 t/1 t/2").unwrap();
        assert_eq!(assignments_of(&model, "T01"), vec!["A1"]);
        assert_eq!(assignments_of(&model, "T02"), vec!["A1"]);

        let err = run(&mut model, "add A1 t/1").unwrap_err();
        assert_eq!(err.message(), MESSAGE_DUPLICATE_ASSIGNMENT);
    }

    #[test]
    fn failing_target_keeps_earlier_targets() {
        let mut model = typical_model();
        let err = run(&mut model, "add A1 t/1 t/2 t/9 t/3").unwrap_err();
        assert_eq!(err.message(), "Tutorial 9 not found");
        assert_eq!(assignments_of(&model, "T01"), vec!["A1"]);
        assert_eq!(assignments_of(&model, "T02"), vec!["A1"]);
        assert!(assignments_of(&model, "T03").is_empty());
    }

    #[test]
    fn delete_from_missing_tutorial_changes_nothing() {
        let mut model = typical_model();
        run(&mut model, "add Homework1 t/1").unwrap();
        let before = model.revision();
        let err = run(&mut model, "delete Homework1 t/5").unwrap_err();
        assert_eq!(err.message(), "Tutorial 5 not found");
        assert_eq!(model.revision(), before);
    }

    #[test]
    fn delete_reports_missing_assignment() {
        let mut model = typical_model();
        run(&mut model, "add Homework1 t/1").unwrap();
        let result = run(&mut model, "delete Homework1 t/1").unwrap();
        assert_eq!(result.feedback, MESSAGE_DELETED);
        assert!(assignments_of(&model, "T01").is_empty());

        let err = run(&mut model, "delete Homework1 t/1").unwrap_err();
        assert_eq!(err.message(), "Assignment Homework1 not found in T01");
    }

    #[test]
    fn failing_delete_target_keeps_earlier_deletions() {
        let mut model = typical_model();
        run(&mut model, "add A1 t/1 t/3").unwrap();
        let err = run(&mut model, "delete A1 t/1 t/2 t/3").unwrap_err();
        assert_eq!(err.message(), "Assignment A1 not found in T02");
        assert!(assignments_of(&model, "T01").is_empty());
        assert_eq!(assignments_of(&model, "T03"), vec!["A1"]);
        assert!(model.check());
    }
}
