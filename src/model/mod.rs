//! Entity model, aggregate root and the view state commands operate on.

pub mod address_book;
pub mod fields;
pub mod navigation;
pub mod prefs;
pub mod student;
pub mod tutorial;

use crate::model::address_book::AddressBook;
use crate::model::fields::{Name, TutorialName};
use crate::model::navigation::NavigationMode;
use crate::model::prefs::UserPrefs;
use crate::model::student::Student;
use crate::model::tutorial::Tutorial;

/// Which students appear in the filtered student view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum StudentFilter {
    #[default]
    All,
    /// Whole-word, case-insensitive name keywords and tutorial names.
    /// An empty keyword list places no constraint on that field.
    Matching {
        names: Vec<String>,
        tutorials: Vec<String>,
    },
}

impl StudentFilter {
    pub fn matches(&self, student: &Student) -> bool {
        match self {
            StudentFilter::All => true,
            StudentFilter::Matching { names, tutorials } => {
                let name_ok = names.is_empty()
                    || student.name.as_str().split_whitespace().any(|word| {
                        let word = word.to_lowercase();
                        names.iter().any(|keyword| word == keyword.to_lowercase())
                    });
                let tutorial_ok = tutorials.is_empty()
                    || student.tutorials.iter().any(|t| {
                        let name = t.as_str().to_lowercase();
                        tutorials
                            .iter()
                            .any(|keyword| name == keyword.to_lowercase())
                    });
                name_ok && tutorial_ok
            }
        }
    }
}

/// Which tutorials appear in the filtered tutorial view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TutorialFilter {
    #[default]
    All,
    /// Case-insensitive substrings of the tutorial name.
    Containing(Vec<String>),
}

impl TutorialFilter {
    pub fn matches(&self, tutorial: &Tutorial) -> bool {
        match self {
            TutorialFilter::All => true,
            TutorialFilter::Containing(keywords) => {
                let name = tutorial.name.as_str().to_lowercase();
                keywords
                    .iter()
                    .any(|keyword| name.contains(&keyword.to_lowercase()))
            }
        }
    }
}

/// The address book together with the state that shapes what is displayed.
///
/// Commands resolve user-supplied indices against the filtered views
/// returned here, never against the backing collections.
#[derive(Debug, Clone)]
pub struct Model {
    book: AddressBook,
    prefs: UserPrefs,
    student_filter: StudentFilter,
    tutorial_filter: TutorialFilter,
    selected_student: Option<Name>,
    focused_tutorial: Option<TutorialName>,
    view_revision: u64,
}

impl Model {
    pub fn new(book: AddressBook, prefs: UserPrefs) -> Self {
        let mut prefs = prefs;
        // a stored hint is not a mode
        prefs.navigation_mode = NavigationMode::default().apply(prefs.navigation_mode);
        Self {
            book,
            prefs,
            student_filter: StudentFilter::All,
            tutorial_filter: TutorialFilter::All,
            selected_student: None,
            focused_tutorial: None,
            view_revision: 0,
        }
    }

    pub fn book(&self) -> &AddressBook {
        &self.book
    }

    pub fn book_mut(&mut self) -> &mut AddressBook {
        &mut self.book
    }

    pub fn prefs(&self) -> &UserPrefs {
        &self.prefs
    }

    pub fn navigation_mode(&self) -> NavigationMode {
        self.prefs.navigation_mode
    }

    /// Move to the mode named by `hint`, ignoring `Unchanged`.
    pub fn apply_navigation(&mut self, hint: NavigationMode) {
        let next = self.prefs.navigation_mode.apply(hint);
        if next != self.prefs.navigation_mode {
            self.prefs.navigation_mode = next;
            self.touch();
        }
    }

    pub fn filtered_students(&self) -> Vec<&Student> {
        self.book
            .students()
            .iter()
            .filter(|s| self.student_filter.matches(s))
            .collect()
    }

    pub fn filtered_tutorials(&self) -> Vec<&Tutorial> {
        self.book
            .tutorials()
            .iter()
            .filter(|t| self.tutorial_filter.matches(t))
            .collect()
    }

    pub fn update_student_filter(&mut self, filter: StudentFilter) {
        self.student_filter = filter;
        self.touch();
    }

    pub fn update_tutorial_filter(&mut self, filter: TutorialFilter) {
        self.tutorial_filter = filter;
        self.touch();
    }

    /// The student shown in the single-student view, if still present.
    pub fn selected_student(&self) -> Option<&Student> {
        self.selected_student
            .as_ref()
            .and_then(|name| self.book.student_by_name(name))
    }

    pub fn select_student(&mut self, name: Option<Name>) {
        self.selected_student = name;
        self.touch();
    }

    /// The tutorial shown in the attendance and submission views.
    pub fn focused_tutorial(&self) -> Option<&Tutorial> {
        self.focused_tutorial
            .as_ref()
            .and_then(|name| self.book.tutorial_by_name(name))
    }

    pub fn focus_tutorial(&mut self, name: Option<TutorialName>) {
        self.focused_tutorial = name;
        self.touch();
    }

    /// Changes whenever the book or any view state changes.
    pub fn revision(&self) -> (u64, u64, u64) {
        let (students, tutorials) = self.book.revision();
        (students, tutorials, self.view_revision)
    }

    pub fn check(&self) -> bool {
        self.book.check()
    }

    fn touch(&mut self) {
        self.view_revision = self.view_revision.wrapping_add(1);
    }
}
