//! `tutorial add|delete|list|find`.

use log::info;

use crate::commands::{CommandError, CommandResult};
use crate::model::fields::TutorialName;
use crate::model::navigation::NavigationMode;
use crate::model::tutorial::Tutorial;
use crate::model::{Model, TutorialFilter};
use crate::parser::utils::parse_tutorial_name;
use crate::parser::{ParseError, SubcommandTable};

pub const FAMILY_WORD: &str = "tutorial";

pub const ADD_USAGE: &str = "tutorial add: Adds a tutorial.
Parameters: NAME
Example: tutorial add T01";
pub const DELETE_USAGE: &str = "tutorial delete: Deletes a tutorial and withdraws every student from it.
Parameters: NAME
Example: tutorial delete T01";
pub const FIND_USAGE: &str = "tutorial find: Lists tutorials whose names contain any of the keywords (case-insensitive).
Parameters: KEYWORD [MORE_KEYWORDS]...
Example: tutorial find T0 lab";

pub const MESSAGE_LISTED_ALL: &str = "Listed all tutorials";

pub static COMMANDS: SubcommandTable<TutorialCommand> = SubcommandTable {
    family: FAMILY_WORD,
    entries: &[
        ("add", parse_add),
        ("delete", parse_delete),
        ("list", parse_list),
        ("find", parse_find),
    ],
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TutorialCommand {
    Add(Tutorial),
    Delete(TutorialName),
    List,
    Find(Vec<String>),
}

fn parse_name_argument(args: &str, usage: &str) -> Result<TutorialName, ParseError> {
    let raw = args.trim();
    if raw.is_empty() {
        return Err(ParseError::invalid_format(usage));
    }
    parse_tutorial_name(raw)
}

fn parse_add(args: &str) -> Result<TutorialCommand, ParseError> {
    parse_name_argument(args, ADD_USAGE).map(|name| TutorialCommand::Add(Tutorial::new(name)))
}

fn parse_delete(args: &str) -> Result<TutorialCommand, ParseError> {
    parse_name_argument(args, DELETE_USAGE).map(TutorialCommand::Delete)
}

fn parse_list(_args: &str) -> Result<TutorialCommand, ParseError> {
    Ok(TutorialCommand::List)
}

fn parse_find(args: &str) -> Result<TutorialCommand, ParseError> {
    let keywords: Vec<String> = args.split_whitespace().map(str::to_string).collect();
    if keywords.is_empty() {
        return Err(ParseError::invalid_format(FIND_USAGE));
    }
    Ok(TutorialCommand::Find(keywords))
}

pub fn execute(
    command: &TutorialCommand,
    model: &mut Model,
) -> Result<CommandResult, CommandError> {
    match command {
        TutorialCommand::Add(tutorial) => {
            if model.book().has_tutorial(tutorial) {
                return Err(CommandError::new(format!(
                    "Tutorial {} already exists",
                    tutorial.name
                )));
            }
            if let Err(err) = model.book_mut().add_tutorial(tutorial.clone()) {
                panic!("tutorial {} rejected after duplicate check: {err}", tutorial.name);
            }
            info!("event=tutorial_added name={}", tutorial.name);
            Ok(CommandResult::unchanged(format!("New tutorial added: {tutorial}")))
        }
        TutorialCommand::Delete(name) => {
            let target = model
                .book()
                .tutorial_by_name(name)
                .cloned()
                .ok_or_else(|| CommandError::new(format!("Tutorial {name} does not exist")))?;
            let was_focused = model.focused_tutorial().is_some_and(|t| &t.name == name);
            if let Err(err) = model.book_mut().remove_tutorial(&target) {
                panic!("tutorial {name} could not be removed: {err}");
            }
            if was_focused {
                model.focus_tutorial(None);
            }
            debug_assert!(model.check(), "address book invariants violated");
            info!("event=tutorial_deleted name={name}");
            Ok(CommandResult::unchanged(format!("Deleted tutorial: {name}")))
        }
        TutorialCommand::List => {
            model.update_tutorial_filter(TutorialFilter::All);
            Ok(CommandResult::new(MESSAGE_LISTED_ALL, NavigationMode::Tutorial))
        }
        TutorialCommand::Find(keywords) => {
            model.update_tutorial_filter(TutorialFilter::Containing(keywords.clone()));
            let shown = model.filtered_tutorials().len();
            Ok(CommandResult::new(
                format!("{shown} tutorials listed!"),
                NavigationMode::Tutorial,
            ))
        }
    }
}
