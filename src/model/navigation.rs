use std::fmt;

use serde::{Deserialize, Serialize};

/// Which view the display shows.
///
/// `Unchanged` is only ever a hint carried by a command result; it is never
/// the current mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NavigationMode {
    Unchanged,
    #[default]
    Student,
    Tutorial,
    Attendance,
    Submission,
    SingleStudent,
}

impl NavigationMode {
    /// The mode to display after a command returned `hint`.
    pub fn apply(self, hint: NavigationMode) -> NavigationMode {
        match hint {
            NavigationMode::Unchanged => self,
            other => other,
        }
    }
}

impl fmt::Display for NavigationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            NavigationMode::Unchanged => "Unchanged",
            NavigationMode::Student => "Students",
            NavigationMode::Tutorial => "Tutorials",
            NavigationMode::Attendance => "Attendance",
            NavigationMode::Submission => "Submissions",
            NavigationMode::SingleStudent => "Student details",
        };
        f.write_str(label)
    }
}
