//! The aggregate root owning every entity collection.
//!
//! All mutation goes through the typed methods below so that the
//! cross-entity invariants verified by [`AddressBook::check`] hold after
//! every command:
//! - no collection holds two entries with the same identity,
//! - every tutorial a student is enrolled in exists,
//! - every attendance or submission record names an existing student.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::identity::{CollectionError, IdentityCollection};
use crate::model::fields::{Name, TutorialName};
use crate::model::student::Student;
use crate::model::tutorial::{Assignment, Tutorial};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AddressBook {
    #[serde(default)]
    students: IdentityCollection<Student>,
    #[serde(default)]
    tutorials: IdentityCollection<Tutorial>,
}

impl AddressBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn students(&self) -> &IdentityCollection<Student> {
        &self.students
    }

    pub fn tutorials(&self) -> &IdentityCollection<Tutorial> {
        &self.tutorials
    }

    /// Revisions of the student and tutorial collections.
    pub fn revision(&self) -> (u64, u64) {
        (self.students.revision(), self.tutorials.revision())
    }

    pub fn student_by_name(&self, name: &Name) -> Option<&Student> {
        self.students.iter().find(|s| &s.name == name)
    }

    pub fn tutorial_by_name(&self, name: &TutorialName) -> Option<&Tutorial> {
        self.tutorials.iter().find(|t| &t.name == name)
    }

    pub fn has_student(&self, student: &Student) -> bool {
        self.students.contains_identity(student, None)
    }

    pub fn has_tutorial(&self, tutorial: &Tutorial) -> bool {
        self.tutorials.contains_identity(tutorial, None)
    }

    pub fn add_student(&mut self, student: Student) -> Result<(), CollectionError> {
        if !self.students.add(student) {
            return Err(CollectionError::DuplicateItem);
        }
        Ok(())
    }

    /// Replace `old` with `new`; a changed name is carried into every
    /// attendance and submission record.
    pub fn set_student(&mut self, old: &Student, new: Student) -> Result<(), CollectionError> {
        let old_name = old.name.clone();
        let new_name = new.name.clone();
        self.students.set(old, new)?;
        if old_name != new_name {
            debug!("event=student_renamed from={old_name} to={new_name}");
            self.rewrite_tutorials(|t| t.rename_student(&old_name, &new_name))?;
        }
        Ok(())
    }

    /// Remove `student` along with their attendance and submissions.
    pub fn remove_student(&mut self, student: &Student) -> Result<(), CollectionError> {
        if !self.students.remove(student) {
            return Err(CollectionError::ItemNotFound);
        }
        self.rewrite_tutorials(|t| t.forget_student(&student.name))
    }

    pub fn add_tutorial(&mut self, tutorial: Tutorial) -> Result<(), CollectionError> {
        if !self.tutorials.add(tutorial) {
            return Err(CollectionError::DuplicateItem);
        }
        Ok(())
    }

    /// Write back a modified copy of `old`.
    pub fn set_tutorial(&mut self, old: &Tutorial, new: Tutorial) -> Result<(), CollectionError> {
        self.tutorials.set(old, new)
    }

    /// Remove `tutorial` and withdraw every student enrolled in it.
    pub fn remove_tutorial(&mut self, tutorial: &Tutorial) -> Result<(), CollectionError> {
        if !self.tutorials.remove(tutorial) {
            return Err(CollectionError::ItemNotFound);
        }
        let students = self
            .students
            .iter()
            .cloned()
            .map(|mut student| {
                student.tutorials.remove(&tutorial.name);
                student
            })
            .collect();
        self.students.set_all(students)
    }

    /// Add `assignment` to the tutorial called `tutorial`.
    ///
    /// Fails with `ItemNotFound` when there is no such tutorial and with
    /// `DuplicateItem` when the tutorial already has an assignment of that name.
    pub fn add_assignment(
        &mut self,
        tutorial: &TutorialName,
        assignment: Assignment,
    ) -> Result<(), CollectionError> {
        let current = self
            .tutorial_by_name(tutorial)
            .cloned()
            .ok_or(CollectionError::ItemNotFound)?;
        let mut updated = current.clone();
        updated.add_assignment(assignment)?;
        self.tutorials.set(&current, updated)
    }

    pub fn set_students(&mut self, students: Vec<Student>) -> Result<(), CollectionError> {
        self.students.set_all(students)
    }

    pub fn set_tutorials(&mut self, tutorials: Vec<Tutorial>) -> Result<(), CollectionError> {
        self.tutorials.set_all(tutorials)
    }

    /// Replace the whole state with `other`.
    pub fn reset_data(&mut self, other: AddressBook) -> Result<(), CollectionError> {
        let AddressBook {
            students,
            tutorials,
        } = other;
        let students = students.into_vec();
        let tutorials = tutorials.into_vec();
        let saved_students = self.students.clone();
        self.students.set_all(students)?;
        if let Err(err) = self.tutorials.set_all(tutorials) {
            self.students = saved_students;
            return Err(err);
        }
        Ok(())
    }

    /// Verify every invariant of the aggregate. A `false` result is a bug.
    pub fn check(&self) -> bool {
        if !self.students.is_consistent() || !self.tutorials.is_consistent() {
            return false;
        }
        if !self.tutorials.iter().all(Tutorial::is_consistent) {
            return false;
        }
        let enrolments_resolve = self.students.iter().all(|student| {
            student
                .tutorials
                .iter()
                .all(|name| self.tutorial_by_name(name).is_some())
        });
        let records_resolve = self.tutorials.iter().all(|tutorial| {
            tutorial
                .referenced_students()
                .all(|name| self.student_by_name(name).is_some())
        });
        enrolments_resolve && records_resolve
    }

    fn rewrite_tutorials<F>(&mut self, mut rewrite: F) -> Result<(), CollectionError>
    where
        F: FnMut(&mut Tutorial) -> Result<(), CollectionError>,
    {
        let mut tutorials = Vec::with_capacity(self.tutorials.len());
        for tutorial in self.tutorials.iter() {
            let mut tutorial = tutorial.clone();
            rewrite(&mut tutorial)?;
            tutorials.push(tutorial);
        }
        self.tutorials.set_all(tutorials)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fields::{Address, AssignmentName, Email, Phone};
    use crate::model::tutorial::{Attendance, Submission};
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn student(name: &str, tutorials: &[&str]) -> Student {
        Student::new(
            Name::new(name).unwrap(),
            Phone::new("12345678").unwrap(),
            Email::new("someone@example.com").unwrap(),
            Address::new("1 Kent Ridge").unwrap(),
        )
        .with_tutorials(tutorials.iter().map(|t| TutorialName::new(*t).unwrap()))
    }

    fn tutorial(name: &str) -> Tutorial {
        Tutorial::new(TutorialName::new(name).unwrap())
    }

    fn tname(name: &str) -> TutorialName {
        TutorialName::new(name).unwrap()
    }

    fn assignment(name: &str) -> Assignment {
        Assignment::new(AssignmentName::new(name).unwrap())
    }

    fn sample() -> AddressBook {
        let mut book = AddressBook::new();
        book.add_tutorial(tutorial("T1")).unwrap();
        book.add_tutorial(tutorial("T2")).unwrap();
        book.add_student(student("Alice", &["T1"])).unwrap();
        book.add_student(student("Bob", &["T1", "T2"])).unwrap();
        book
    }

    #[test]
    fn duplicate_student_is_rejected() {
        let mut book = sample();
        let err = book.add_student(student("Alice", &[])).unwrap_err();
        assert_eq!(err, CollectionError::DuplicateItem);
        assert_eq!(book.students().len(), 2);
    }

    #[test]
    fn add_assignment_is_scoped_per_tutorial() {
        let mut book = sample();
        book.add_assignment(&tname("T1"), assignment("A1")).unwrap();
        book.add_assignment(&tname("T2"), assignment("A1")).unwrap();
        assert_eq!(
            book.add_assignment(&tname("T1"), assignment("A1")),
            Err(CollectionError::DuplicateItem)
        );
        assert_eq!(
            book.add_assignment(&tname("T9"), assignment("A1")),
            Err(CollectionError::ItemNotFound)
        );
        assert_eq!(book.tutorial_by_name(&tname("T1")).unwrap().assignments.len(), 1);
        assert!(book.check());
    }

    #[test]
    fn removing_a_student_drops_their_records() {
        let mut book = sample();
        let bob = Name::new("Bob").unwrap();
        let mut t1 = book.tutorial_by_name(&tname("T1")).unwrap().clone();
        let original = t1.clone();
        t1.attendance.add(Attendance {
            student: bob.clone(),
            date: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
        });
        t1.add_assignment(assignment("A1")).unwrap();
        t1.update_assignment(&AssignmentName::new("A1").unwrap(), |a| {
            a.submissions.add(Submission::new(bob.clone()));
            Ok(())
        })
        .unwrap();
        book.set_tutorial(&original, t1).unwrap();
        assert!(book.check());

        let bob_record = book.student_by_name(&bob).unwrap().clone();
        book.remove_student(&bob_record).unwrap();
        let t1 = book.tutorial_by_name(&tname("T1")).unwrap();
        assert_eq!(t1.referenced_students().count(), 0);
        assert!(book.check());

        assert_eq!(book.remove_student(&bob_record), Err(CollectionError::ItemNotFound));
    }

    #[test]
    fn renaming_a_student_keeps_references_valid() {
        let mut book = sample();
        let alice = book.student_by_name(&Name::new("Alice").unwrap()).unwrap().clone();
        let mut t1 = book.tutorial_by_name(&tname("T1")).unwrap().clone();
        let original = t1.clone();
        t1.attendance.add(Attendance {
            student: alice.name.clone(),
            date: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
        });
        book.set_tutorial(&original, t1).unwrap();

        let mut renamed = alice.clone();
        renamed.name = Name::new("Alicia").unwrap();
        book.set_student(&alice, renamed).unwrap();

        let t1 = book.tutorial_by_name(&tname("T1")).unwrap();
        assert_eq!(t1.attendance[0].student.as_str(), "Alicia");
        assert!(book.check());
    }

    #[test]
    fn renaming_onto_an_existing_student_fails_without_change() {
        let mut book = sample();
        let before = book.clone();
        let alice = book.student_by_name(&Name::new("Alice").unwrap()).unwrap().clone();
        let mut clash = alice.clone();
        clash.name = Name::new("Bob").unwrap();
        assert_eq!(book.set_student(&alice, clash), Err(CollectionError::DuplicateItem));
        assert_eq!(book, before);
    }

    #[test]
    fn removing_a_tutorial_withdraws_students() {
        let mut book = sample();
        book.remove_tutorial(&tutorial("T1")).unwrap();
        assert!(book.students().iter().all(|s| !s.belongs_to(&tname("T1"))));
        assert!(book.check());
        assert_eq!(book.remove_tutorial(&tutorial("T1")), Err(CollectionError::ItemNotFound));
    }

    #[test]
    fn reset_data_replaces_everything() {
        let mut book = sample();
        book.reset_data(AddressBook::new()).unwrap();
        assert!(book.students().is_empty());
        assert!(book.tutorials().is_empty());
    }

    #[test]
    fn set_tutorials_with_duplicates_leaves_book_untouched() {
        let mut book = sample();
        let before = book.clone();
        let err = book
            .set_tutorials(vec![tutorial("T3"), tutorial("T3")])
            .unwrap_err();
        assert_eq!(err, CollectionError::DuplicateItem);
        assert_eq!(book, before);
    }

    #[test]
    fn check_detects_dangling_enrolment() {
        let mut book = AddressBook::new();
        book.add_student(student("Carl", &["T7"])).unwrap();
        assert!(!book.check());
    }
}
