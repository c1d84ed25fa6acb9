//! Argument parsers shared by the command families.

use chrono::{NaiveDate, NaiveDateTime};

use crate::index::Index;
use crate::model::fields::{Address, AssignmentName, Email, FieldError, Name, Phone, TutorialName};
use crate::model::tutorial::DUE_DATE_FORMAT;
use crate::parser::ParseError;
use crate::parser::tokenizer::{ArgumentMultimap, Prefix};

pub const MESSAGE_INVALID_INDEX: &str = "Index is not a non-zero unsigned integer.";
pub const MESSAGE_INVALID_DATE: &str = "Dates should be in the format YYYY-MM-DD";
pub const MESSAGE_INVALID_DUE_DATE: &str = "Due dates should be in the format YYYY-MM-DD HH:MM";
pub const MESSAGE_INVALID_GRADE: &str = "Grades should be whole numbers from 0 to 100";
pub const ATTENDANCE_DATE_FORMAT: &str = "%Y-%m-%d";

impl From<FieldError> for ParseError {
    fn from(err: FieldError) -> Self {
        ParseError::new(err.message)
    }
}

/// Parse a 1-based index; surrounding whitespace is ignored.
pub fn parse_index(raw: &str) -> Result<Index, ParseError> {
    raw.trim()
        .parse::<usize>()
        .ok()
        .and_then(Index::from_one_based)
        .ok_or_else(|| ParseError::new(MESSAGE_INVALID_INDEX))
}

pub fn parse_indices(raws: &[String]) -> Result<Vec<Index>, ParseError> {
    raws.iter().map(|raw| parse_index(raw)).collect()
}

pub fn parse_name(raw: &str) -> Result<Name, ParseError> {
    Ok(Name::new(raw.trim())?)
}

pub fn parse_phone(raw: &str) -> Result<Phone, ParseError> {
    Ok(Phone::new(raw.trim())?)
}

pub fn parse_email(raw: &str) -> Result<Email, ParseError> {
    Ok(Email::new(raw.trim())?)
}

pub fn parse_address(raw: &str) -> Result<Address, ParseError> {
    Ok(Address::new(raw.trim())?)
}

pub fn parse_tutorial_name(raw: &str) -> Result<TutorialName, ParseError> {
    Ok(TutorialName::new(raw.trim())?)
}

pub fn parse_assignment_name(raw: &str) -> Result<AssignmentName, ParseError> {
    Ok(AssignmentName::new(raw.trim())?)
}

pub fn parse_date(raw: &str) -> Result<NaiveDate, ParseError> {
    NaiveDate::parse_from_str(raw.trim(), ATTENDANCE_DATE_FORMAT)
        .map_err(|_| ParseError::new(MESSAGE_INVALID_DATE))
}

pub fn parse_due_date(raw: &str) -> Result<NaiveDateTime, ParseError> {
    NaiveDateTime::parse_from_str(raw.trim(), DUE_DATE_FORMAT)
        .map_err(|_| ParseError::new(MESSAGE_INVALID_DUE_DATE))
}

pub fn parse_grade(raw: &str) -> Result<u8, ParseError> {
    raw.trim()
        .parse::<u8>()
        .ok()
        .filter(|grade| *grade <= 100)
        .ok_or_else(|| ParseError::new(MESSAGE_INVALID_GRADE))
}

/// True when every prefix in `required` carries at least one value.
pub fn all_present(map: &ArgumentMultimap, required: &[Prefix]) -> bool {
    required.iter().all(|prefix| map.has(*prefix))
}
