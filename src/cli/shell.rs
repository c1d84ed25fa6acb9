//! Line-oriented front end: prompt, feedback and view rendering.

use std::io::{self, BufRead, Write};
use std::path::Path;

use anyhow::{Context, Result, bail};
use classbook::commands::HELP_TEXT;
use classbook::{Logic, LogicError, Storage};

use crate::cli::render::ViewTracker;

const PROMPT: &str = "> ";

/// What the shell should do after one line.
enum Step {
    Continue,
    Failed,
    Exit,
}

fn handle_line<S: Storage>(
    logic: &mut Logic<S>,
    tracker: &mut ViewTracker,
    input: &str,
    out: &mut impl Write,
) -> Result<Step> {
    let (outcome, save_error) = match logic.execute(input) {
        Err(LogicError::Storage { outcome, error }) => {
            (outcome.map_err(LogicError::from), Some(error))
        }
        other => (other, None),
    };

    let mut exit = false;
    match &outcome {
        Ok(result) => {
            writeln!(out, "{}", result.feedback)?;
            if result.show_help {
                writeln!(out, "{HELP_TEXT}")?;
            }
            exit = result.exit;
        }
        Err(err) => writeln!(out, "{err}")?,
    }
    if let Some(error) = &save_error {
        writeln!(out, "Could not save data: {error:#}")?;
    }
    if exit {
        return Ok(Step::Exit);
    }
    // a failed multi-target command may still have changed the view
    if let Some(view) = tracker.refresh(logic.model()) {
        write!(out, "{view}")?;
    }
    if outcome.is_err() || save_error.is_some() {
        return Ok(Step::Failed);
    }
    Ok(Step::Continue)
}

fn banner(data_path: &Path) -> String {
    format!(
        "Welcome to classbook. Type `help` to see every command.\nData file: {}",
        data_path.display()
    )
}

/// Read commands from stdin until `exit` or end of input.
pub fn interactive<S: Storage>(logic: &mut Logic<S>) -> Result<()> {
    let stdin = io::stdin();
    let mut out = io::stdout().lock();
    let mut tracker = ViewTracker::default();

    writeln!(out, "{}", banner(logic.storage().address_book_path()))?;
    if let Some(view) = tracker.refresh(logic.model()) {
        write!(out, "{view}")?;
    }

    let mut line = String::new();
    loop {
        write!(out, "{PROMPT}")?;
        out.flush()?;
        line.clear();
        let read = stdin
            .lock()
            .read_line(&mut line)
            .context("failed to read from stdin")?;
        if read == 0 {
            writeln!(out)?;
            return Ok(());
        }
        if line.trim().is_empty() {
            continue;
        }
        if let Step::Exit = handle_line(logic, &mut tracker, &line, &mut out)? {
            return Ok(());
        }
    }
}

/// Run `commands` in order; report an error if any of them failed.
pub fn batch<S: Storage>(logic: &mut Logic<S>, commands: &[String]) -> Result<()> {
    let mut out = io::stdout().lock();
    run_all(logic, commands, &mut out)
}

fn run_all<S: Storage>(
    logic: &mut Logic<S>,
    commands: &[String],
    out: &mut impl Write,
) -> Result<()> {
    let mut tracker = ViewTracker::default();
    // only redraw once something changed
    tracker.refresh(logic.model());

    let mut failed = 0;
    for input in commands {
        match handle_line(logic, &mut tracker, input, out)? {
            Step::Continue => {}
            Step::Failed => failed += 1,
            Step::Exit => break,
        }
    }
    if failed > 0 {
        bail!("{failed} of {} commands failed", commands.len());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use classbook::{AddressBook, JsonStorage, Model, UserPrefs};
    use tempfile::tempdir;

    fn run(commands: &[&str]) -> (String, Result<()>) {
        let dir = tempdir().unwrap();
        let storage = JsonStorage::new(
            dir.path().join("book.json"),
            dir.path().join("prefs.json"),
        );
        let mut logic = Logic::load(storage).unwrap();
        let commands: Vec<String> = commands.iter().map(|c| c.to_string()).collect();
        let mut out = Vec::new();
        let outcome = run_all(&mut logic, &commands, &mut out);
        (String::from_utf8(out).unwrap(), outcome)
    }

    #[test]
    fn batch_prints_feedback_and_views() {
        let (out, outcome) = run(&["tutorial add T01", "tutorial list"]);
        assert!(outcome.is_ok());
        assert!(out.contains("New tutorial added: T01"));
        assert!(out.contains("== Tutorials =="));
        assert!(out.contains("  1. T01 (0 students, 0 assignments)"));
    }

    #[test]
    fn batch_reports_failures_and_stops_at_exit() {
        let (out, outcome) = run(&["tutorial delete T01", "exit", "tutorial add T02"]);
        assert!(out.contains("Tutorial T01 does not exist"));
        assert!(!out.contains("T02"));
        assert_eq!(outcome.unwrap_err().to_string(), "1 of 3 commands failed");
    }

    #[test]
    fn save_failures_still_report_the_command() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("blocker"), "").unwrap();
        let storage = JsonStorage::new(
            dir.path().join("blocker/book.json"),
            dir.path().join("prefs.json"),
        );
        let model = Model::new(AddressBook::new(), UserPrefs::default());
        let mut logic = Logic::new(model, storage);
        let commands = vec!["tutorial add T01".to_string()];
        let mut out = Vec::new();

        let outcome = run_all(&mut logic, &commands, &mut out);
        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("New tutorial added: T01"));
        assert!(out.contains("Could not save data: "));
        assert_eq!(outcome.unwrap_err().to_string(), "1 of 1 commands failed");
    }

    #[test]
    fn banner_names_the_data_file() {
        let text = banner(Path::new("data/classbook.json"));
        assert!(text.ends_with("Data file: data/classbook.json"));
    }

    #[test]
    fn help_prints_the_command_summary() {
        let (out, _) = run(&["help"]);
        assert!(out.contains("Opened help window."));
        assert!(out.contains("assignment add NAME"));
    }
}
