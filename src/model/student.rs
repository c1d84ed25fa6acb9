use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::identity::Identifiable;
use crate::model::fields::{Address, Email, Name, Phone, TutorialName};

/// A student record. Identity is the name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub name: Name,
    pub phone: Phone,
    pub email: Email,
    pub address: Address,
    /// Tutorials the student is enrolled in.
    #[serde(default)]
    pub tutorials: BTreeSet<TutorialName>,
}

impl Student {
    pub fn new(name: Name, phone: Phone, email: Email, address: Address) -> Self {
        Self {
            name,
            phone,
            email,
            address,
            tutorials: BTreeSet::new(),
        }
    }

    pub fn with_tutorials(mut self, tutorials: impl IntoIterator<Item = TutorialName>) -> Self {
        self.tutorials.extend(tutorials);
        self
    }

    pub fn belongs_to(&self, tutorial: &TutorialName) -> bool {
        self.tutorials.contains(tutorial)
    }
}

impl Identifiable for Student {
    type Key<'a> = &'a Name;

    fn identity_key(&self) -> &Name {
        &self.name
    }
}

impl fmt::Display for Student {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}; Phone: {}; Email: {}; Address: {}; Tutorials: ",
            self.name, self.phone, self.email, self.address
        )?;
        for tutorial in &self.tutorials {
            write!(f, "[{}]", tutorial)?;
        }
        Ok(())
    }
}

/// Fields to overwrite on an existing student; `None` keeps the old value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudentPatch {
    pub name: Option<Name>,
    pub phone: Option<Phone>,
    pub email: Option<Email>,
    pub address: Option<Address>,
    pub tutorials: Option<BTreeSet<TutorialName>>,
}

impl StudentPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.phone.is_none()
            && self.email.is_none()
            && self.address.is_none()
            && self.tutorials.is_none()
    }

    pub fn apply(&self, student: &Student) -> Student {
        Student {
            name: self.name.clone().unwrap_or_else(|| student.name.clone()),
            phone: self.phone.clone().unwrap_or_else(|| student.phone.clone()),
            email: self.email.clone().unwrap_or_else(|| student.email.clone()),
            address: self.address.clone().unwrap_or_else(|| student.address.clone()),
            tutorials: self
                .tutorials
                .clone()
                .unwrap_or_else(|| student.tutorials.clone()),
        }
    }
}
