//! Tutorials and the records nested inside them.
//!
//! A tutorial owns its assignments and attendance by value; an assignment
//! owns its submissions. Uniqueness of nested records is scoped to the
//! owner: two tutorials may each hold an assignment called "A1".

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::identity::{CollectionError, Identifiable, IdentityCollection};
use crate::model::fields::{AssignmentName, Name, TutorialName};

pub const DUE_DATE_FORMAT: &str = "%Y-%m-%d %H:%M";

/// A student's handed-in work for one assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    pub student: Name,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grade: Option<u8>,
}

impl Submission {
    pub fn new(student: Name) -> Self {
        Self {
            student,
            grade: None,
        }
    }
}

impl Identifiable for Submission {
    type Key<'a> = &'a Name;

    fn identity_key(&self) -> &Name {
        &self.student
    }
}

impl fmt::Display for Submission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.grade {
            Some(grade) => write!(f, "{} ({}/100)", self.student, grade),
            None => write!(f, "{} (ungraded)", self.student),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub name: AssignmentName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due: Option<NaiveDateTime>,
    #[serde(default)]
    pub submissions: IdentityCollection<Submission>,
}

impl Assignment {
    pub fn new(name: AssignmentName) -> Self {
        Self {
            name,
            due: None,
            submissions: IdentityCollection::new(),
        }
    }

    pub fn with_due(mut self, due: Option<NaiveDateTime>) -> Self {
        self.due = due;
        self
    }

    pub fn submission_of(&self, student: &Name) -> Option<&Submission> {
        self.submissions.iter().find(|s| &s.student == student)
    }
}

impl Identifiable for Assignment {
    type Key<'a> = &'a AssignmentName;

    fn identity_key(&self) -> &AssignmentName {
        &self.name
    }
}

impl fmt::Display for Assignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.due {
            Some(due) => write!(f, "{} (Due: {})", self.name, due.format(DUE_DATE_FORMAT)),
            None => write!(f, "{}", self.name),
        }
    }
}

/// Presence of a student at a tutorial on a given day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attendance {
    pub student: Name,
    pub date: NaiveDate,
}

impl Identifiable for Attendance {
    type Key<'a> = (&'a Name, NaiveDate);

    fn identity_key(&self) -> (&Name, NaiveDate) {
        (&self.student, self.date)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tutorial {
    pub name: TutorialName,
    #[serde(default)]
    pub assignments: IdentityCollection<Assignment>,
    #[serde(default)]
    pub attendance: IdentityCollection<Attendance>,
}

impl Tutorial {
    pub fn new(name: TutorialName) -> Self {
        Self {
            name,
            assignments: IdentityCollection::new(),
            attendance: IdentityCollection::new(),
        }
    }

    pub fn assignment(&self, name: &AssignmentName) -> Option<&Assignment> {
        self.assignments.iter().find(|a| &a.name == name)
    }

    pub fn add_assignment(&mut self, assignment: Assignment) -> Result<(), CollectionError> {
        if self.assignments.add(assignment) {
            Ok(())
        } else {
            Err(CollectionError::DuplicateItem)
        }
    }

    /// Remove the assignment called `name`; false if there was none.
    pub fn delete_assignment(&mut self, name: &AssignmentName) -> bool {
        self.assignments.remove(&Assignment::new(name.clone()))
    }

    /// Apply `update` to a copy of the named assignment and write it back.
    pub fn update_assignment<F>(
        &mut self,
        name: &AssignmentName,
        update: F,
    ) -> Result<(), CollectionError>
    where
        F: FnOnce(&mut Assignment) -> Result<(), CollectionError>,
    {
        let current = self
            .assignment(name)
            .cloned()
            .ok_or(CollectionError::ItemNotFound)?;
        let mut updated = current.clone();
        update(&mut updated)?;
        self.assignments.set(&current, updated)
    }

    /// Dates on which `student` was marked present, oldest first.
    pub fn attendance_of(&self, student: &Name) -> Vec<NaiveDate> {
        let mut dates: Vec<NaiveDate> = self
            .attendance
            .iter()
            .filter(|a| &a.student == student)
            .map(|a| a.date)
            .collect();
        dates.sort();
        dates
    }

    /// Every distinct date with at least one attendance record, oldest first.
    pub fn session_dates(&self) -> Vec<NaiveDate> {
        let mut dates: Vec<NaiveDate> = self.attendance.iter().map(|a| a.date).collect();
        dates.sort();
        dates.dedup();
        dates
    }

    /// Drop every attendance and submission record that names `student`.
    pub fn forget_student(&mut self, student: &Name) -> Result<(), CollectionError> {
        self.attendance.retain(|a| &a.student != student);
        let assignments = self
            .assignments
            .iter()
            .cloned()
            .map(|mut assignment| {
                assignment.submissions.retain(|s| &s.student != student);
                assignment
            })
            .collect();
        self.assignments.set_all(assignments)
    }

    /// Point every record that names `old` at `new` instead.
    pub fn rename_student(&mut self, old: &Name, new: &Name) -> Result<(), CollectionError> {
        if old == new {
            return Ok(());
        }
        let attendance = self
            .attendance
            .iter()
            .cloned()
            .map(|mut record| {
                if &record.student == old {
                    record.student = new.clone();
                }
                record
            })
            .collect();
        self.attendance.set_all(attendance)?;

        let mut assignments = Vec::with_capacity(self.assignments.len());
        for assignment in self.assignments.iter() {
            let mut assignment = assignment.clone();
            let submissions = assignment
                .submissions
                .iter()
                .cloned()
                .map(|mut submission| {
                    if &submission.student == old {
                        submission.student = new.clone();
                    }
                    submission
                })
                .collect();
            assignment.submissions.set_all(submissions)?;
            assignments.push(assignment);
        }
        self.assignments.set_all(assignments)
    }

    /// Names of every student referenced by a nested record.
    pub fn referenced_students(&self) -> impl Iterator<Item = &Name> {
        self.attendance.iter().map(|a| &a.student).chain(
            self.assignments
                .iter()
                .flat_map(|a| a.submissions.iter().map(|s| &s.student)),
        )
    }

    /// Nested collections hold no colliding identities.
    pub fn is_consistent(&self) -> bool {
        self.assignments.is_consistent()
            && self.attendance.is_consistent()
            && self.assignments.iter().all(|a| a.submissions.is_consistent())
    }
}

impl Identifiable for Tutorial {
    type Key<'a> = &'a TutorialName;

    fn identity_key(&self) -> &TutorialName {
        &self.name
    }
}

impl fmt::Display for Tutorial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn tutorial(name: &str) -> Tutorial {
        Tutorial::new(TutorialName::new(name).unwrap())
    }

    fn assignment(name: &str) -> Assignment {
        Assignment::new(AssignmentName::new(name).unwrap())
    }

    fn name(value: &str) -> Name {
        Name::new(value).unwrap()
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    #[test]
    fn assignment_uniqueness_is_scoped_per_tutorial() {
        let mut t1 = tutorial("T1");
        let mut t2 = tutorial("T2");
        assert_eq!(t1.add_assignment(assignment("A1")), Ok(()));
        assert_eq!(t2.add_assignment(assignment("A1")), Ok(()));
        assert_eq!(
            t1.add_assignment(assignment("A1")),
            Err(CollectionError::DuplicateItem)
        );
        assert_eq!(t1.assignments.len(), 1);
    }

    #[test]
    fn delete_assignment_by_name() {
        let mut t = tutorial("T1");
        t.add_assignment(assignment("A1").with_due(None)).unwrap();
        assert!(t.delete_assignment(&AssignmentName::new("A1").unwrap()));
        assert!(!t.delete_assignment(&AssignmentName::new("A1").unwrap()));
    }

    #[test]
    fn update_assignment_adds_submission() {
        let mut t = tutorial("T1");
        t.add_assignment(assignment("A1")).unwrap();
        let a1 = AssignmentName::new("A1").unwrap();
        t.update_assignment(&a1, |a| {
            if a.submissions.add(Submission::new(name("Bob"))) {
                Ok(())
            } else {
                Err(CollectionError::DuplicateItem)
            }
        })
        .unwrap();
        assert!(t.assignment(&a1).unwrap().submission_of(&name("Bob")).is_some());

        let missing = AssignmentName::new("A9").unwrap();
        assert_eq!(
            t.update_assignment(&missing, |_| Ok(())),
            Err(CollectionError::ItemNotFound)
        );
    }

    #[test]
    fn attendance_identity_is_student_and_date() {
        let mut t = tutorial("T1");
        assert!(t.attendance.add(Attendance {
            student: name("Bob"),
            date: day(1),
        }));
        assert!(t.attendance.add(Attendance {
            student: name("Bob"),
            date: day(8),
        }));
        assert!(t.attendance.add(Attendance {
            student: name("Amy"),
            date: day(1),
        }));
        assert!(!t.attendance.add(Attendance {
            student: name("Bob"),
            date: day(1),
        }));
        assert_eq!(t.attendance_of(&name("Bob")), vec![day(1), day(8)]);
        assert_eq!(t.session_dates(), vec![day(1), day(8)]);
    }

    #[test]
    fn rename_and_forget_cascade_into_nested_records() {
        let mut t = tutorial("T1");
        t.add_assignment(assignment("A1")).unwrap();
        t.attendance.add(Attendance {
            student: name("Bob"),
            date: day(1),
        });
        t.update_assignment(&AssignmentName::new("A1").unwrap(), |a| {
            a.submissions.add(Submission::new(name("Bob")));
            Ok(())
        })
        .unwrap();

        t.rename_student(&name("Bob"), &name("Robert")).unwrap();
        let referenced: Vec<&Name> = t.referenced_students().collect();
        assert_eq!(referenced, vec![&name("Robert"), &name("Robert")]);

        t.forget_student(&name("Robert")).unwrap();
        assert_eq!(t.referenced_students().count(), 0);
        assert_eq!(t.assignments.len(), 1);
        assert!(t.is_consistent());
    }

    #[test]
    fn assignment_display_includes_due_date() {
        let due = NaiveDateTime::parse_from_str("2024-10-01 23:59", DUE_DATE_FORMAT).unwrap();
        assert_eq!(
            assignment("Lab1").with_due(Some(due)).to_string(),
            "Lab1 (Due: 2024-10-01 23:59)"
        );
        assert_eq!(assignment("Lab1").to_string(), "Lab1");
    }
}
