//! Console task tracker: a numbered menu over a task list kept in a flat
//! `Title|DueDate|Project|Status` text file.

pub mod config;
pub mod error;
pub mod line_format;
pub mod logging;
pub mod store;
pub mod table;
pub mod task;
pub mod ui;
