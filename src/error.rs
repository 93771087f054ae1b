use std::{io, path::PathBuf};

use chrono::NaiveDate;
use thiserror::Error;

use crate::task::TaskId;

/// Rejected user input for a task field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Title cannot be empty.")]
    EmptyTitle,

    #[error("Project cannot be empty.")]
    EmptyProject,

    #[error("`{0}` is not a date in the format MM/dd/yyyy.")]
    BadDate(String),

    #[error("Due date {} is not in the future.", .0.format("%m/%d/%Y"))]
    DateNotInFuture(NaiveDate),

    #[error("`{0}` is not a status; use done or pending.")]
    BadStatus(String),
}

/// Why a single line of the task file was skipped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LineError {
    #[error("expected 4 fields, found {0}")]
    FieldCount(usize),

    #[error("unreadable due date `{0}`")]
    BadDate(String),

    #[error("unreadable status `{0}`")]
    BadStatus(String),

    #[error("empty {0}")]
    EmptyField(&'static str),

    #[error("line is not valid UTF-8")]
    Encoding,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("could not create {}: {source}", .path.display())]
    Create { path: PathBuf, source: io::Error },

    #[error("could not read {}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("could not write {} ({written} tasks written): {source}", .path.display())]
    Write {
        path: PathBuf,
        written: usize,
        source: io::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("Task not found.")]
    NotFound,

    #[error("Several tasks share that title: {}", join_ids(.0))]
    Ambiguous(Vec<TaskId>),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    #[error(transparent)]
    Lookup(#[from] LookupError),

    #[error("{}", join_errors(.0))]
    Invalid(Vec<ValidationError>),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config {}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("could not parse config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

fn join_ids(ids: &[TaskId]) -> String {
    ids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}
