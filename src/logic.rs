//! The parse, execute, persist pipeline behind every line of input.

use anyhow::Result;
use log::{debug, error, info, warn};
use thiserror::Error;

use crate::commands::{CommandError, CommandResult};
use crate::model::Model;
use crate::model::address_book::AddressBook;
use crate::model::prefs::UserPrefs;
use crate::parser::{self, ParseError};
use crate::storage::Storage;

#[derive(Debug, Error)]
pub enum LogicError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Command(#[from] CommandError),
    /// The command ran but the changed book could not be written back.
    /// `outcome` is what the command itself reported.
    #[error("Could not save data: {error:#}")]
    Storage {
        outcome: Result<CommandResult, CommandError>,
        error: anyhow::Error,
    },
}

pub struct Logic<S: Storage> {
    model: Model,
    storage: S,
}

impl<S: Storage> Logic<S> {
    pub fn new(model: Model, storage: S) -> Self {
        Self { model, storage }
    }

    /// Build the model from whatever `storage` holds. Missing files start an
    /// empty book with default preferences; unreadable ones are errors.
    pub fn load(storage: S) -> Result<Self> {
        let prefs = storage.read_prefs()?.unwrap_or_default();
        let book = match storage.read_address_book()? {
            Some(book) => book,
            None => {
                info!(
                    "event=address_book_missing path={} action=start_empty",
                    storage.address_book_path().display()
                );
                AddressBook::new()
            }
        };
        Ok(Self::new(Model::new(book, prefs), storage))
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Run one line of input against the model.
    ///
    /// The book is written back whenever it changed, which includes a
    /// multi-target command that failed after applying some targets.
    pub fn execute(&mut self, input: &str) -> Result<CommandResult, LogicError> {
        debug!("event=command_received len={}", input.len());
        let command = parser::parse_command(input).inspect_err(|err| {
            warn!("event=command_rejected stage=parse reason={:?}", err.message());
        })?;

        let before = self.model.book().revision();
        let outcome = command.execute(&mut self.model);
        match &outcome {
            Ok(result) => {
                self.model.apply_navigation(result.mode);
                info!(
                    "event=command_executed command={} mode={:?}",
                    command.word(),
                    self.model.navigation_mode()
                );
            }
            Err(err) => {
                warn!(
                    "event=command_rejected stage=execute command={} reason={:?}",
                    command.word(),
                    err.message()
                );
            }
        }

        if self.model.book().revision() != before {
            if let Err(err) = self.storage.save_address_book(self.model.book()) {
                error!(
                    "event=save_failed path={} reason={err:#}",
                    self.storage.address_book_path().display()
                );
                return Err(LogicError::Storage {
                    outcome,
                    error: err,
                });
            }
        }
        outcome.map_err(LogicError::from)
    }

    /// Persist the preferences, including the current navigation mode.
    pub fn save_prefs(&self) -> Result<()> {
        let prefs = UserPrefs {
            navigation_mode: self.model.navigation_mode(),
            ..self.model.prefs().clone()
        };
        self.storage.save_prefs(&prefs)
    }
}
