//! Student commands (`add`, `delete`, `edit`, `find`, `list`, `view`).

use std::collections::BTreeSet;

use log::info;

use crate::commands::{CommandError, CommandResult, resolve_student};
use crate::index::Index;
use crate::model::fields::TutorialName;
use crate::model::navigation::NavigationMode;
use crate::model::student::{Student, StudentPatch};
use crate::model::{Model, StudentFilter};
use crate::parser::ParseError;
use crate::parser::tokenizer::{
    PREFIX_ADDRESS, PREFIX_EMAIL, PREFIX_NAME, PREFIX_PHONE, PREFIX_TUTORIAL, Prefix, tokenize,
};
use crate::parser::utils::{
    all_present, parse_address, parse_email, parse_index, parse_name, parse_phone,
    parse_tutorial_name,
};

pub const ADD_WORD: &str = "add";
pub const DELETE_WORD: &str = "delete";
pub const EDIT_WORD: &str = "edit";
pub const FIND_WORD: &str = "find";
pub const LIST_WORD: &str = "list";
pub const VIEW_WORD: &str = "view";

pub const ADD_USAGE: &str = "add: Adds a student to the address book.
Parameters: n/NAME p/PHONE e/EMAIL a/ADDRESS [t/TUTORIAL]...
Example: add n/John Doe p/98765432 e/johnd@example.com a/311, Clementi Ave 2, #02-25 t/T01";
pub const DELETE_USAGE: &str = "delete: Deletes the student identified by the index number used in the displayed student list.
Parameters: INDEX (must be a positive integer)
Example: delete 1";
pub const EDIT_USAGE: &str = "edit: Edits the details of the student identified by the index number used in the displayed student list. Existing values will be overwritten by the input values.
Parameters: INDEX (must be a positive integer) [n/NAME] [p/PHONE] [e/EMAIL] [a/ADDRESS] [t/TUTORIAL]...
Example: edit 1 p/91234567 e/johndoe@example.com";
pub const FIND_USAGE: &str = "find: Finds all students whose names contain any of the specified keywords (case-insensitive) and, if given, who attend one of the specified tutorials.
Parameters: [KEYWORD]... [t/TUTORIAL]...
Example: find alice bob t/T01";
pub const VIEW_USAGE: &str = "view: Shows the details of the student identified by the index number used in the displayed student list.
Parameters: INDEX (must be a positive integer)
Example: view 1";

pub const MESSAGE_DUPLICATE_STUDENT: &str = "This student already exists in the address book";
pub const MESSAGE_NOT_EDITED: &str = "At least one field to edit must be provided.";
pub const MESSAGE_LISTED_ALL: &str = "Listed all students";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StudentCommand {
    Add(Student),
    Delete(Index),
    Edit(Index, StudentPatch),
    Find(StudentFilter),
    List,
    View(Index),
}

pub fn parse_add(args: &str) -> Result<StudentCommand, ParseError> {
    let map = tokenize(
        args,
        &[PREFIX_NAME, PREFIX_PHONE, PREFIX_EMAIL, PREFIX_ADDRESS, PREFIX_TUTORIAL],
    );
    let required = [PREFIX_NAME, PREFIX_PHONE, PREFIX_EMAIL, PREFIX_ADDRESS];
    if !map.preamble().is_empty() || !all_present(&map, &required) {
        return Err(ParseError::invalid_format(ADD_USAGE));
    }
    map.verify_no_duplicate_prefixes(&required)?;

    let lookup = |prefix: Prefix| map.value(prefix).unwrap_or_default();
    let student = Student::new(
        parse_name(lookup(PREFIX_NAME))?,
        parse_phone(lookup(PREFIX_PHONE))?,
        parse_email(lookup(PREFIX_EMAIL))?,
        parse_address(lookup(PREFIX_ADDRESS))?,
    )
    .with_tutorials(parse_tutorials(map.all_values(PREFIX_TUTORIAL))?);
    Ok(StudentCommand::Add(student))
}

pub fn parse_delete(args: &str) -> Result<StudentCommand, ParseError> {
    parse_index(args)
        .map(StudentCommand::Delete)
        .map_err(|_| ParseError::invalid_format(DELETE_USAGE))
}

pub fn parse_view(args: &str) -> Result<StudentCommand, ParseError> {
    parse_index(args)
        .map(StudentCommand::View)
        .map_err(|_| ParseError::invalid_format(VIEW_USAGE))
}

pub fn parse_edit(args: &str) -> Result<StudentCommand, ParseError> {
    let map = tokenize(
        args,
        &[PREFIX_NAME, PREFIX_PHONE, PREFIX_EMAIL, PREFIX_ADDRESS, PREFIX_TUTORIAL],
    );
    let index =
        parse_index(map.preamble()).map_err(|_| ParseError::invalid_format(EDIT_USAGE))?;
    map.verify_no_duplicate_prefixes(&[PREFIX_NAME, PREFIX_PHONE, PREFIX_EMAIL, PREFIX_ADDRESS])?;

    let patch = StudentPatch {
        name: map.value(PREFIX_NAME).map(parse_name).transpose()?,
        phone: map.value(PREFIX_PHONE).map(parse_phone).transpose()?,
        email: map.value(PREFIX_EMAIL).map(parse_email).transpose()?,
        address: map.value(PREFIX_ADDRESS).map(parse_address).transpose()?,
        tutorials: parse_tutorials_for_edit(map.all_values(PREFIX_TUTORIAL))?,
    };
    if patch.is_empty() {
        return Err(ParseError::new(MESSAGE_NOT_EDITED));
    }
    Ok(StudentCommand::Edit(index, patch))
}

pub fn parse_find(args: &str) -> Result<StudentCommand, ParseError> {
    let map = tokenize(args, &[PREFIX_TUTORIAL]);
    let names: Vec<String> = map
        .preamble()
        .split_whitespace()
        .map(str::to_string)
        .collect();
    let tutorials: Vec<String> = map
        .all_values(PREFIX_TUTORIAL)
        .iter()
        .filter(|t| !t.is_empty())
        .cloned()
        .collect();
    if names.is_empty() && tutorials.is_empty() {
        return Err(ParseError::invalid_format(FIND_USAGE));
    }
    Ok(StudentCommand::Find(StudentFilter::Matching { names, tutorials }))
}

fn parse_tutorials(raws: &[String]) -> Result<BTreeSet<TutorialName>, ParseError> {
    raws.iter().map(|raw| parse_tutorial_name(raw)).collect()
}

/// A lone empty `t/` clears every enrolment.
fn parse_tutorials_for_edit(
    raws: &[String],
) -> Result<Option<BTreeSet<TutorialName>>, ParseError> {
    match raws {
        [] => Ok(None),
        [only] if only.is_empty() => Ok(Some(BTreeSet::new())),
        _ => parse_tutorials(raws).map(Some),
    }
}

pub fn execute(command: &StudentCommand, model: &mut Model) -> Result<CommandResult, CommandError> {
    match command {
        StudentCommand::Add(student) => add(student, model),
        StudentCommand::Delete(index) => delete(*index, model),
        StudentCommand::Edit(index, patch) => edit(*index, patch, model),
        StudentCommand::Find(filter) => find(filter, model),
        StudentCommand::List => {
            model.update_student_filter(StudentFilter::All);
            Ok(CommandResult::new(MESSAGE_LISTED_ALL, NavigationMode::Student))
        }
        StudentCommand::View(index) => view(*index, model),
    }
}

fn ensure_tutorials_exist(model: &Model, student: &Student) -> Result<(), CommandError> {
    match student
        .tutorials
        .iter()
        .find(|name| model.book().tutorial_by_name(name).is_none())
    {
        Some(missing) => Err(CommandError::new(format!("Tutorial {missing} does not exist"))),
        None => Ok(()),
    }
}

fn is_selected(model: &Model, student: &Student) -> bool {
    model
        .selected_student()
        .is_some_and(|selected| selected.name == student.name)
}

fn add(student: &Student, model: &mut Model) -> Result<CommandResult, CommandError> {
    if model.book().has_student(student) {
        return Err(CommandError::new(MESSAGE_DUPLICATE_STUDENT));
    }
    ensure_tutorials_exist(model, student)?;
    model
        .book_mut()
        .add_student(student.clone())
        .map_err(|_| CommandError::new(MESSAGE_DUPLICATE_STUDENT))?;
    debug_assert!(model.check(), "address book invariants violated");
    info!("event=student_added name={}", student.name);
    Ok(CommandResult::unchanged(format!("New student added: {student}")))
}

fn delete(index: Index, model: &mut Model) -> Result<CommandResult, CommandError> {
    let target = resolve_student(model, index)?;
    let was_selected = is_selected(model, &target);
    if let Err(err) = model.book_mut().remove_student(&target) {
        panic!("student {} vanished before removal: {err}", target.name);
    }
    if was_selected {
        model.select_student(None);
    }
    debug_assert!(model.check(), "address book invariants violated");
    info!("event=student_deleted name={}", target.name);
    Ok(CommandResult::unchanged(format!("Deleted Student: {target}")))
}

fn edit(
    index: Index,
    patch: &StudentPatch,
    model: &mut Model,
) -> Result<CommandResult, CommandError> {
    let target = resolve_student(model, index)?;
    let edited = patch.apply(&target);
    if model.book().students().contains_identity(&edited, Some(&target)) {
        return Err(CommandError::new(MESSAGE_DUPLICATE_STUDENT));
    }
    ensure_tutorials_exist(model, &edited)?;
    let was_selected = is_selected(model, &target);
    if let Err(err) = model.book_mut().set_student(&target, edited.clone()) {
        panic!("validated edit of {} was rejected: {err}", target.name);
    }
    if was_selected {
        model.select_student(Some(edited.name.clone()));
    }
    model.update_student_filter(StudentFilter::All);
    debug_assert!(model.check(), "address book invariants violated");
    info!("event=student_edited name={}", edited.name);
    Ok(CommandResult::unchanged(format!("Edited Student: {edited}")))
}

fn find(filter: &StudentFilter, model: &mut Model) -> Result<CommandResult, CommandError> {
    model.update_student_filter(filter.clone());
    let shown = model.filtered_students().len();
    Ok(CommandResult::new(
        format!("{shown} students listed!"),
        NavigationMode::Student,
    ))
}

fn view(index: Index, model: &mut Model) -> Result<CommandResult, CommandError> {
    let target = resolve_student(model, index)?;
    model.select_student(Some(target.name.clone()));
    Ok(CommandResult::new(
        format!("Viewing student: {}", target.name),
        NavigationMode::SingleStudent,
    ))
}
