//! Text rendering of the current navigation view.

use std::fmt::Write;

use classbook::model::student::Student;
use classbook::model::tutorial::{DUE_DATE_FORMAT, Tutorial};
use classbook::{Model, NavigationMode};

/// Remembers what was last drawn so the shell only redraws on change.
#[derive(Debug, Default)]
pub struct ViewTracker {
    last: Option<(NavigationMode, (u64, u64, u64))>,
}

impl ViewTracker {
    /// The rendered view if it differs from the previous call.
    pub fn refresh(&mut self, model: &Model) -> Option<String> {
        let current = (model.navigation_mode(), model.revision());
        if self.last == Some(current) {
            return None;
        }
        self.last = Some(current);
        Some(render_view(model))
    }
}

pub fn render_view(model: &Model) -> String {
    let mode = model.navigation_mode();
    let mut out = format!("== {mode} ==\n");
    match mode {
        NavigationMode::Student | NavigationMode::Unchanged => students(model, &mut out),
        NavigationMode::Tutorial => tutorials(model, &mut out),
        NavigationMode::Attendance => match model.focused_tutorial() {
            Some(tutorial) => attendance(model, tutorial, &mut out),
            None => out.push_str("No tutorial selected.\n"),
        },
        NavigationMode::Submission => match model.focused_tutorial() {
            Some(tutorial) => submissions(model, tutorial, &mut out),
            None => out.push_str("No tutorial selected.\n"),
        },
        NavigationMode::SingleStudent => match model.selected_student() {
            Some(student) => student_details(model, student, &mut out),
            None => out.push_str("No student selected.\n"),
        },
    }
    out
}

fn students(model: &Model, out: &mut String) {
    let shown = model.filtered_students();
    if shown.is_empty() {
        out.push_str("No students to show.\n");
    }
    for (i, student) in shown.iter().enumerate() {
        let _ = writeln!(out, "{:>3}. {student}", i + 1);
    }
}

fn tutorials(model: &Model, out: &mut String) {
    let shown = model.filtered_tutorials();
    if shown.is_empty() {
        out.push_str("No tutorials to show.\n");
    }
    for (i, tutorial) in shown.iter().enumerate() {
        let _ = writeln!(
            out,
            "{:>3}. {} ({} students, {} assignments)",
            i + 1,
            tutorial,
            members(model, tutorial).len(),
            tutorial.assignments.len()
        );
    }
}

fn members<'a>(model: &'a Model, tutorial: &Tutorial) -> Vec<&'a Student> {
    model
        .book()
        .students()
        .iter()
        .filter(|s| s.belongs_to(&tutorial.name))
        .collect()
}

/// One row per member, one column per session date; `x` marks presence.
fn attendance(model: &Model, tutorial: &Tutorial, out: &mut String) {
    let dates = tutorial.session_dates();
    let _ = writeln!(out, "Tutorial {tutorial}, {} sessions", dates.len());
    for student in members(model, tutorial) {
        let present = tutorial.attendance_of(&student.name);
        let marks: String = dates
            .iter()
            .map(|d| if present.contains(d) { 'x' } else { '.' })
            .collect();
        let _ = writeln!(
            out,
            "  {:<24} {marks} ({}/{})",
            student.name.as_str(),
            present.len(),
            dates.len()
        );
    }
    if let (Some(first), Some(last)) = (dates.first(), dates.last()) {
        let _ = writeln!(out, "  sessions from {first} to {last}");
    }
}

fn submissions(model: &Model, tutorial: &Tutorial, out: &mut String) {
    if tutorial.assignments.is_empty() {
        let _ = writeln!(out, "Tutorial {tutorial} has no assignments.");
        return;
    }
    let roster = members(model, tutorial);
    for assignment in tutorial.assignments.iter() {
        let _ = writeln!(
            out,
            "{assignment}: {}/{} submitted",
            assignment.submissions.len(),
            roster.len()
        );
        for student in &roster {
            let status = match assignment.submission_of(&student.name) {
                Some(submission) => match submission.grade {
                    Some(grade) => format!("{grade}/100"),
                    None => "ungraded".to_string(),
                },
                None => "missing".to_string(),
            };
            let _ = writeln!(out, "  {:<24} {status}", student.name.as_str());
        }
    }
}

fn student_details(model: &Model, student: &Student, out: &mut String) {
    let _ = writeln!(out, "{}", student.name);
    let _ = writeln!(out, "  Phone:   {}", student.phone);
    let _ = writeln!(out, "  Email:   {}", student.email);
    let _ = writeln!(out, "  Address: {}", student.address);
    for name in &student.tutorials {
        let Some(tutorial) = model.book().tutorial_by_name(name) else {
            continue;
        };
        let attended = tutorial.attendance_of(&student.name).len();
        let _ = writeln!(
            out,
            "  {tutorial}: attended {attended}/{}",
            tutorial.session_dates().len()
        );
        for assignment in tutorial.assignments.iter() {
            let status = match assignment.submission_of(&student.name) {
                Some(submission) => submission.to_string(),
                None => "not submitted".to_string(),
            };
            let due = assignment
                .due
                .map(|d| format!(" due {}", d.format(DUE_DATE_FORMAT)))
                .unwrap_or_default();
            let _ = writeln!(out, "    {}{due}: {status}", assignment.name);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use classbook::{AddressBook, UserPrefs, parse_command};
    use pretty_assertions::assert_eq;

    fn model_after(commands: &[&str]) -> Model {
        let mut model = Model::new(AddressBook::new(), UserPrefs::default());
        for input in commands {
            let result = parse_command(input).unwrap().execute(&mut model).unwrap();
            model.apply_navigation(result.mode);
        }
        model
    }

    const SETUP: [&str; 3] = [
        "tutorial add T01",
        "add n/Amy Tan p/91234567 e/amy@example.com a/1 Kent Ridge t/T01",
        "add n/Ben Ong p/98765432 e/ben@example.com a/2 Kent Ridge t/T01",
    ];

    #[test]
    fn tracker_redraws_only_on_change() {
        let model = model_after(&SETUP);
        let mut tracker = ViewTracker::default();
        assert!(tracker.refresh(&model).is_some());
        assert!(tracker.refresh(&model).is_none());
    }

    #[test]
    fn attendance_grid() {
        let mut commands = SETUP.to_vec();
        commands.extend([
            "attendance mark 1 t/1 d/2024-03-01",
            "attendance mark 1 t/1 d/2024-03-08",
            "attendance mark 2 t/1 d/2024-03-08",
        ]);
        let view = render_view(&model_after(&commands));
        assert!(view.starts_with("== Attendance ==\n"));
        assert!(view.contains("Amy Tan                  xx (2/2)"));
        assert!(view.contains("Ben Ong                  .x (1/2)"));
    }

    #[test]
    fn submission_listing() {
        let mut commands = SETUP.to_vec();
        commands.extend([
            "assignment add Lab1 t/1",
            "submission add Lab1 s/2 t/1",
            "submission grade Lab1 s/2 t/1 g/75",
        ]);
        let view = render_view(&model_after(&commands));
        assert_eq!(
            view,
            "== Submissions ==\n\
             Lab1: 1/2 submitted\n  \
             Amy Tan                  missing\n  \
             Ben Ong                  75/100\n"
        );
    }

    #[test]
    fn student_list_is_numbered() {
        let view = render_view(&model_after(&SETUP));
        assert!(view.contains("  1. Amy Tan; Phone: 91234567"));
        assert!(view.contains("  2. Ben Ong;"));
    }
}
