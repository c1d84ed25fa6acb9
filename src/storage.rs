//! JSON persistence for the address book and the user preferences.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use log::{debug, info};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::model::address_book::AddressBook;
use crate::model::prefs::UserPrefs;

pub const DEFAULT_PREFS_PATH: &str = "preferences.json";

/// Where the engine keeps its state between sessions.
pub trait Storage {
    fn address_book_path(&self) -> &Path;

    /// `Ok(None)` when nothing has been saved yet.
    fn read_address_book(&self) -> Result<Option<AddressBook>>;

    fn save_address_book(&self, book: &AddressBook) -> Result<()>;

    fn read_prefs(&self) -> Result<Option<UserPrefs>>;

    fn save_prefs(&self, prefs: &UserPrefs) -> Result<()>;
}

#[derive(Debug, Clone)]
pub struct JsonStorage {
    book_path: PathBuf,
    prefs_path: PathBuf,
}

impl JsonStorage {
    pub fn new(book_path: impl Into<PathBuf>, prefs_path: impl Into<PathBuf>) -> Self {
        Self {
            book_path: book_path.into(),
            prefs_path: prefs_path.into(),
        }
    }
}

impl Storage for JsonStorage {
    fn address_book_path(&self) -> &Path {
        &self.book_path
    }

    fn read_address_book(&self) -> Result<Option<AddressBook>> {
        let Some(book) = read_json::<AddressBook>(&self.book_path)? else {
            return Ok(None);
        };
        if !book.check() {
            return Err(anyhow!(
                "address book {} refers to missing students or tutorials",
                self.book_path.display()
            ));
        }
        info!(
            "event=address_book_loaded path={} students={} tutorials={}",
            self.book_path.display(),
            book.students().len(),
            book.tutorials().len()
        );
        Ok(Some(book))
    }

    fn save_address_book(&self, book: &AddressBook) -> Result<()> {
        write_json(&self.book_path, book)?;
        debug!("event=address_book_saved path={}", self.book_path.display());
        Ok(())
    }

    fn read_prefs(&self) -> Result<Option<UserPrefs>> {
        read_json(&self.prefs_path)
    }

    fn save_prefs(&self, prefs: &UserPrefs) -> Result<()> {
        write_json(&self.prefs_path, prefs)?;
        debug!("event=prefs_saved path={}", self.prefs_path.display());
        Ok(())
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            debug!("event=storage_missing path={}", path.display());
            return Ok(None);
        }
        Err(err) => {
            return Err(err).with_context(|| format!("failed to open {}", path.display()));
        }
    };
    let value = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("failed to parse {}", path.display()))?;
    Ok(Some(value))
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
        .with_context(|| format!("failed to write {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)
        .with_context(|| format!("failed to serialize {}", path.display()))?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::navigation::NavigationMode;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[test]
    fn missing_files_read_as_none() {
        let dir = tempdir().unwrap();
        let storage = JsonStorage::new(dir.path().join("book.json"), dir.path().join("prefs.json"));
        assert!(storage.read_address_book().unwrap().is_none());
        assert!(storage.read_prefs().unwrap().is_none());
    }

    #[test]
    fn prefs_round_trip_creates_parent_dirs() {
        let dir = tempdir().unwrap();
        let storage = JsonStorage::new(
            dir.path().join("book.json"),
            dir.path().join("nested/prefs.json"),
        );
        let prefs = UserPrefs {
            navigation_mode: NavigationMode::Attendance,
            ..UserPrefs::default()
        };
        storage.save_prefs(&prefs).unwrap();
        assert_eq!(storage.read_prefs().unwrap(), Some(prefs));
    }

    #[test]
    fn duplicate_students_fail_the_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("book.json");
        let student =
            r#"{"name":"Amy","phone":"123","email":"amy@example.com","address":"Street 1"}"#;
        fs::write(&path, format!(r#"{{"students":[{student},{student}]}}"#)).unwrap();
        let storage = JsonStorage::new(&path, dir.path().join("prefs.json"));
        let err = storage.read_address_book().unwrap_err();
        assert!(format!("{err:#}").contains("duplicate"));
    }

    #[test]
    fn dangling_enrolment_fails_the_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("book.json");
        fs::write(
            &path,
            r#"{"students":[{"name":"Amy","phone":"123","email":"amy@example.com","address":"Street 1","tutorials":["T09"]}]}"#,
        )
        .unwrap();
        let storage = JsonStorage::new(&path, dir.path().join("prefs.json"));
        let err = storage.read_address_book().unwrap_err();
        assert!(err.to_string().contains("missing students or tutorials"));
    }

    #[test]
    fn invalid_field_fails_the_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("book.json");
        fs::write(&path, r#"{"tutorials":[{"name":"T 01"}]}"#).unwrap();
        let storage = JsonStorage::new(&path, dir.path().join("prefs.json"));
        assert!(storage.read_address_book().is_err());
    }
}
