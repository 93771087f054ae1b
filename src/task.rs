use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};

use crate::error::ValidationError;

/// Date format shown to users and accepted at the prompt.
pub const DISPLAY_DATE_FORMAT: &str = "%m/%d/%Y";

/// Session-local handle for a task. Assigned by the store, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskId(pub u32);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub due_date: NaiveDate,
    pub project: String,
    pub done: bool,
}

impl Task {
    pub fn status_label(&self) -> &'static str {
        if self.done {
            "Done"
        } else {
            "Pending"
        }
    }
}

/// A validated task that has not been given an id yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub title: String,
    pub due_date: NaiveDate,
    pub project: String,
    pub done: bool,
}

impl NewTask {
    /// Validates raw user input the same way the Add prompt does.
    pub fn parse(
        title: &str,
        due_date: &str,
        project: &str,
        today: NaiveDate,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            title: parse_title(title)?,
            due_date: parse_future_date(due_date, today)?,
            project: parse_project(project)?,
            done: false,
        })
    }
}

/// A partial change to an existing task. `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskUpdate {
    pub title: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub project: Option<String>,
    pub done: Option<bool>,
}

impl TaskUpdate {
    /// Builds an update from raw prompt answers, where a blank answer keeps
    /// the field. Every invalid field is reported, not just the first.
    pub fn parse(
        title: &str,
        due_date: &str,
        project: &str,
        status: &str,
        today: NaiveDate,
    ) -> Result<Self, Vec<ValidationError>> {
        let mut errors = Vec::new();
        let mut update = TaskUpdate::default();

        if !title.trim().is_empty() {
            update.title = Some(title.trim().to_string());
        }
        if !due_date.trim().is_empty() {
            match parse_future_date(due_date, today) {
                Ok(date) => update.due_date = Some(date),
                Err(err) => errors.push(err),
            }
        }
        if !project.trim().is_empty() {
            update.project = Some(project.trim().to_string());
        }
        if !status.trim().is_empty() {
            match parse_status(status) {
                Ok(done) => update.done = Some(done),
                Err(err) => errors.push(err),
            }
        }

        if errors.is_empty() {
            Ok(update)
        } else {
            Err(errors)
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == TaskUpdate::default()
    }

    /// Rejects values that would break the task invariants.
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();
        if matches!(&self.title, Some(t) if t.trim().is_empty()) {
            errors.push(ValidationError::EmptyTitle);
        }
        if matches!(&self.project, Some(p) if p.trim().is_empty()) {
            errors.push(ValidationError::EmptyProject);
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    pub(crate) fn apply(self, task: &mut Task) {
        if let Some(title) = self.title {
            task.title = title.trim().to_string();
        }
        if let Some(due_date) = self.due_date {
            task.due_date = due_date;
        }
        if let Some(project) = self.project {
            task.project = project.trim().to_string();
        }
        if let Some(done) = self.done {
            task.done = done;
        }
    }
}

pub fn parse_title(input: &str) -> Result<String, ValidationError> {
    let title = input.trim();
    if title.is_empty() {
        return Err(ValidationError::EmptyTitle);
    }
    Ok(title.to_string())
}

pub fn parse_project(input: &str) -> Result<String, ValidationError> {
    let project = input.trim();
    if project.is_empty() {
        return Err(ValidationError::EmptyProject);
    }
    Ok(project.to_string())
}

/// Parses a due date typed by the user and requires it to be after `today`.
pub fn parse_future_date(input: &str, today: NaiveDate) -> Result<NaiveDate, ValidationError> {
    let date = parse_date(input).ok_or_else(|| ValidationError::BadDate(input.trim().to_string()))?;
    if date <= today {
        return Err(ValidationError::DateNotInFuture(date));
    }
    Ok(date)
}

const DATE_FORMATS: [&str; 2] = ["%m/%d/%Y", "%Y-%m-%d"];
const DATE_TIME_FORMATS: [&str; 5] = [
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %I:%M %p",
    "%m/%d/%Y %H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
];

/// Accepts `MM/dd/yyyy`, ISO `yyyy-MM-dd`, and a date followed by a time of
/// day (`12/1/2023 12:00:00 AM`), whose time part is dropped. Anything else
/// after the date makes the whole input invalid.
pub fn parse_date(input: &str) -> Option<NaiveDate> {
    let input = input.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(input, fmt).ok())
        .or_else(|| {
            DATE_TIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(input, fmt).ok())
                .map(|dt| dt.date())
        })
}

pub fn parse_status(input: &str) -> Result<bool, ValidationError> {
    match input.trim().to_ascii_lowercase().as_str() {
        "done" | "true" | "y" | "yes" => Ok(true),
        "pending" | "false" | "n" | "no" => Ok(false),
        _ => Err(ValidationError::BadStatus(input.trim().to_string())),
    }
}

/// Five sample tasks, the second already done.
pub fn demo_tasks() -> Vec<NewTask> {
    let sample = |title: &str, (y, m, d): (i32, u32, u32), project: &str, done: bool| NewTask {
        title: title.to_string(),
        due_date: NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default(),
        project: project.to_string(),
        done,
    };
    vec![
        sample("Complete project report", (2023, 12, 1), "Work", false),
        sample("Buy groceries", (2023, 11, 25), "Personal", true),
        sample("Schedule dentist appointment", (2023, 12, 5), "Health", false),
        sample("Prepare presentation", (2023, 12, 7), "Work", false),
        sample("Call plumber", (2023, 11, 28), "Home", false),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
    }

    #[rstest]
    #[case("12/01/2023", 2023, 12, 1)]
    #[case("2/3/2025", 2025, 2, 3)]
    #[case("2023-12-05", 2023, 12, 5)]
    #[case("12/1/2023 12:00:00 AM", 2023, 12, 1)]
    #[case("7/4/2030 9:15:00 PM", 2030, 7, 4)]
    #[case("2030-07-04 18:30:00", 2030, 7, 4)]
    #[case("  11/25/2023  ", 2023, 11, 25)]
    fn accepts_known_date_shapes(#[case] input: &str, #[case] y: i32, #[case] m: u32, #[case] d: u32) {
        assert_eq!(parse_date(input), NaiveDate::from_ymd_opt(y, m, d));
    }

    #[rstest]
    #[case("")]
    #[case("13/01/2023")]
    #[case("02/30/2024")]
    #[case("tomorrow")]
    #[case("07/04/2030 banana")]
    #[case("07/04/2030 lol what")]
    #[case("2030-07-04 junk")]
    #[case("12/1/2023 25:00:00")]
    fn rejects_non_dates(#[case] input: &str) {
        assert_eq!(parse_date(input), None);
    }

    #[test]
    fn trailing_text_after_date_is_not_a_due_date() {
        assert_eq!(
            parse_future_date("07/04/2030 banana", today()),
            Err(ValidationError::BadDate("07/04/2030 banana".into()))
        );
        assert!(NewTask::parse("t", "07/04/2030 lol what", "p", today()).is_err());
    }

    #[test]
    fn due_date_must_be_strictly_future() {
        assert_eq!(
            parse_future_date("06/15/2024", today()),
            Err(ValidationError::DateNotInFuture(today()))
        );
        assert_eq!(
            parse_future_date("06/16/2024", today()),
            Ok(NaiveDate::from_ymd_opt(2024, 6, 16).unwrap())
        );
    }

    #[test]
    fn new_task_trims_and_starts_pending() {
        let task = NewTask::parse("  Write report ", "07/01/2024", " Work ", today()).unwrap();
        assert_eq!(task.title, "Write report");
        assert_eq!(task.project, "Work");
        assert!(!task.done);
    }

    #[rstest]
    #[case("   ", "07/01/2024", "Work", ValidationError::EmptyTitle)]
    #[case("Report", "07/01/2024", "", ValidationError::EmptyProject)]
    #[case("Report", "01/01/2020", "Work", ValidationError::DateNotInFuture(NaiveDate::from_ymd_opt(2020, 1, 1).unwrap()))]
    #[case("Report", "soon", "Work", ValidationError::BadDate("soon".into()))]
    fn new_task_rejects_bad_input(
        #[case] title: &str,
        #[case] due: &str,
        #[case] project: &str,
        #[case] expected: ValidationError,
    ) {
        assert_eq!(NewTask::parse(title, due, project, today()), Err(expected));
    }

    #[test]
    fn blank_answers_keep_every_field() {
        let update = TaskUpdate::parse("", " ", "", "", today()).unwrap();
        assert!(update.is_empty());
    }

    #[test]
    fn update_collects_every_invalid_field() {
        let errors = TaskUpdate::parse("New title", "yesterday", "", "maybe", today()).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::BadDate("yesterday".into()),
                ValidationError::BadStatus("maybe".into()),
            ]
        );
    }

    #[test]
    fn status_words() {
        assert_eq!(parse_status("Done"), Ok(true));
        assert_eq!(parse_status("TRUE"), Ok(true));
        assert_eq!(parse_status("pending"), Ok(false));
        assert!(parse_status("later").is_err());
    }

    #[test]
    fn task_id_displays_with_hash() {
        assert_eq!(TaskId(7).to_string(), "#7");
    }
}
