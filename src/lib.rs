//! Core library for tutor record keeping: students, tutorials, assignments
//! and attendance, driven by a line-oriented command language.
//!
//! Text flows through [`Logic::execute`]: it is parsed into a
//! [`commands::Command`], executed against the [`model::Model`], and the
//! address book is written back through a [`storage::Storage`].

pub mod commands;
pub mod identity;
pub mod index;
pub mod logging;
pub mod logic;
pub mod model;
pub mod parser;
pub mod storage;

pub use commands::{Command, CommandError, CommandResult};
pub use identity::{CollectionError, Identifiable, IdentityCollection};
pub use index::Index;
pub use logic::{Logic, LogicError};
pub use model::Model;
pub use model::address_book::AddressBook;
pub use model::navigation::NavigationMode;
pub use model::prefs::UserPrefs;
pub use parser::{ParseError, parse_command};
pub use storage::{JsonStorage, Storage};
