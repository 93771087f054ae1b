use std::{
    fmt::Display,
    io::{self, BufRead, Write},
    path::Path,
};

use chrono::NaiveDate;
use log::{debug, error, warn};

use crate::{
    error::{EditError, LookupError, StoreError, ValidationError},
    logging,
    store::{LoadReport, Selector, SortKey, TaskStore},
    table::{self, TaskRow},
    task::{self, NewTask, TaskId, TaskUpdate, DISPLAY_DATE_FORMAT},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuState {
    Idle,
    Listing,
    Adding,
    Editing,
    Quitting,
}

/// What the session ended with. `main` turns this into an exit code.
#[derive(Debug)]
pub struct SessionOutcome {
    pub save_error: Option<StoreError>,
}

/// Line-based terminal: prompts go to `out`, answers come from `input`.
pub struct Console<R, W> {
    input: R,
    out: W,
    color: bool,
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(input: R, out: W, color: bool) -> Self {
        Self { input, out, color }
    }

    fn say(&mut self, message: impl Display) -> io::Result<()> {
        writeln!(self.out, "{message}")
    }

    /// `Ok(None)` once input is exhausted or unreadable.
    fn prompt(&mut self, message: &str) -> io::Result<Option<String>> {
        write!(self.out, "{message} ")?;
        self.out.flush()?;

        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) => {
                writeln!(self.out)?;
                debug!("event=end_of_input");
                Ok(None)
            }
            Ok(_) => Ok(Some(line.trim_end_matches(['\n', '\r']).to_string())),
            Err(err) => {
                writeln!(self.out)?;
                warn!("event=input_failed err={err}");
                Ok(None)
            }
        }
    }

    /// Asks until `parse` accepts the answer.
    fn ask_until<T>(
        &mut self,
        message: &str,
        parse: impl Fn(&str) -> Result<T, ValidationError>,
    ) -> io::Result<Option<T>> {
        loop {
            let Some(answer) = self.prompt(message)? else {
                return Ok(None);
            };
            match parse(&answer) {
                Ok(value) => return Ok(Some(value)),
                Err(err) => {
                    debug!("event=rejected_input reason=\"{err}\"");
                    self.say(retry_message(&err))?;
                }
            }
        }
    }
}

fn retry_message(err: &ValidationError) -> String {
    match err {
        ValidationError::BadDate(_) | ValidationError::DateNotInFuture(_) => {
            "Invalid due date. Please enter a future date in the format MM/dd/yyyy.".to_string()
        }
        other => format!("{other} Please try again."),
    }
}

/// Tells the user what loading found before the first menu.
pub fn show_load_report<R: BufRead, W: Write>(
    console: &mut Console<R, W>,
    report: &LoadReport,
    path: &Path,
) -> io::Result<()> {
    if report.created {
        console.say(format!("Created new task file {}.", path.display()))?;
    }
    for corrupt in &report.corrupted {
        console.say(format!(
            "Error: Corrupted data found in file (line {}: {}).",
            corrupt.line_no, corrupt.reason
        ))?;
    }
    if !report.corrupted.is_empty() {
        console.say(format!(
            "Warning: skipped {} corrupted line(s).",
            report.corrupted.len()
        ))?;
    }
    if let Some(err) = &report.io_error {
        console.say(format!("Error reading file: {err}"))?;
    }
    Ok(())
}

/// Runs the menu until the user quits or input ends, then saves to `path`.
pub fn run_app<R: BufRead, W: Write>(
    console: &mut Console<R, W>,
    store: &mut TaskStore,
    path: &Path,
    today: impl Fn() -> NaiveDate,
) -> io::Result<SessionOutcome> {
    let mut state = MenuState::Idle;
    loop {
        debug!("event=menu_state state={state:?}");
        state = match state {
            MenuState::Idle => show_menu(console, store)?,
            MenuState::Listing => list_tasks(console, store)?,
            MenuState::Adding => add_task(console, store, today())?,
            MenuState::Editing => edit_task(console, store, today())?,
            MenuState::Quitting => {
                let save_error = save_and_quit(console, store, path)?;
                return Ok(SessionOutcome { save_error });
            }
        };
    }
}

fn show_menu<R: BufRead, W: Write>(
    console: &mut Console<R, W>,
    store: &TaskStore,
) -> io::Result<MenuState> {
    let summary = store.summary();
    console.say("")?;
    console.say("Task Manager")?;
    console.say(format!(
        "You have {} tasks to do and {} tasks done.",
        summary.pending(),
        summary.done
    ))?;
    console.say("1. List Tasks")?;
    console.say("2. Add Task")?;
    console.say("3. Edit Task")?;
    console.say("4. Save and Quit")?;

    let Some(choice) = console.prompt("Select an option:")? else {
        return Ok(MenuState::Quitting);
    };
    Ok(match choice.trim() {
        "1" => MenuState::Listing,
        "2" => MenuState::Adding,
        "3" => MenuState::Editing,
        "4" => MenuState::Quitting,
        other => {
            warn!("event=invalid_option input=\"{}\"", logging::sanitize(other));
            console.say("Invalid option. Please try again.")?;
            MenuState::Idle
        }
    })
}

fn list_tasks<R: BufRead, W: Write>(
    console: &mut Console<R, W>,
    store: &TaskStore,
) -> io::Result<MenuState> {
    if store.is_empty() {
        console.say("No tasks available.")?;
        return Ok(MenuState::Idle);
    }

    let summary = store.summary();
    console.say(format!(
        "You have {} tasks in total, {} tasks done.",
        summary.total, summary.done
    ))?;
    console.say("How would you like to sort the tasks?")?;
    console.say("1. By Project")?;
    console.say("2. By Due Date")?;
    let Some(choice) = console.prompt("Select an option:")? else {
        return Ok(MenuState::Quitting);
    };
    let key = match choice.trim() {
        "1" => SortKey::Project,
        "2" => SortKey::DueDate,
        _ => {
            console.say("Invalid option. Displaying unsorted tasks.")?;
            SortKey::Unsorted
        }
    };

    let rows: Vec<TaskRow> = store.sorted(key).into_iter().map(TaskRow::from_task).collect();
    console.say("List of Tasks:")?;
    table::write_table(&mut console.out, &rows, console.color)?;

    match console.prompt("Press Enter to return to the menu...")? {
        Some(_) => Ok(MenuState::Idle),
        None => Ok(MenuState::Quitting),
    }
}

fn add_task<R: BufRead, W: Write>(
    console: &mut Console<R, W>,
    store: &mut TaskStore,
    today: NaiveDate,
) -> io::Result<MenuState> {
    let Some(title) = console.ask_until("Enter task title:", task::parse_title)? else {
        return Ok(MenuState::Quitting);
    };
    let Some(due_date) = console.ask_until("Enter task due date (MM/dd/yyyy):", |s| {
        task::parse_future_date(s, today)
    })?
    else {
        return Ok(MenuState::Quitting);
    };
    let Some(project) = console.ask_until("Enter task project:", task::parse_project)? else {
        return Ok(MenuState::Quitting);
    };

    let id = store.add(NewTask {
        title,
        due_date,
        project,
        done: false,
    });
    console.say(format!("Task added successfully ({id})."))?;
    Ok(MenuState::Idle)
}

fn edit_task<R: BufRead, W: Write>(
    console: &mut Console<R, W>,
    store: &mut TaskStore,
    today: NaiveDate,
) -> io::Result<MenuState> {
    if store.is_empty() {
        console.say("No tasks available.")?;
        return Ok(MenuState::Idle);
    }

    let Some(answer) = console.prompt("Enter the task # or title:")? else {
        return Ok(MenuState::Quitting);
    };
    let found = Selector::parse(&answer)
        .ok_or(LookupError::NotFound)
        .and_then(|selector| store.find(&selector));
    let id = match found {
        Ok(id) => id,
        Err(err) => {
            console.say(err)?;
            return Ok(MenuState::Idle);
        }
    };

    if let Some(task) = store.get(id) {
        console.say(format!(
            "{} {} | due {} | {} | {}",
            task.id,
            task.title,
            task.due_date.format(DISPLAY_DATE_FORMAT),
            task.project,
            task.status_label()
        ))?;
    }
    console.say("1. Edit details")?;
    console.say("2. Mark as done")?;
    console.say("3. Delete")?;
    console.say("4. Cancel")?;
    let Some(choice) = console.prompt("Select an option:")? else {
        return Ok(MenuState::Quitting);
    };

    match choice.trim() {
        "1" => return edit_details(console, store, id, today),
        "2" => match store.mark_done(id) {
            Ok(()) => console.say("Task marked as done.")?,
            Err(err) => console.say(err)?,
        },
        "3" => match store.remove(&Selector::Id(id)) {
            Ok(task) => console.say(format!("Task \"{}\" deleted.", task.title))?,
            Err(err) => console.say(err)?,
        },
        _ => console.say("No changes made.")?,
    }
    Ok(MenuState::Idle)
}

fn edit_details<R: BufRead, W: Write>(
    console: &mut Console<R, W>,
    store: &mut TaskStore,
    id: TaskId,
    today: NaiveDate,
) -> io::Result<MenuState> {
    console.say("Leave a field blank to keep its current value.")?;
    let mut answers = Vec::with_capacity(4);
    for message in [
        "New title:",
        "New due date (MM/dd/yyyy):",
        "New project:",
        "Status (done/pending):",
    ] {
        let Some(answer) = console.prompt(message)? else {
            return Ok(MenuState::Quitting);
        };
        answers.push(answer);
    }

    let result = TaskUpdate::parse(&answers[0], &answers[1], &answers[2], &answers[3], today)
        .map_err(EditError::Invalid)
        .and_then(|update| {
            if update.is_empty() {
                return Ok(false);
            }
            store.update(id, update).map(|()| true)
        });
    match result {
        Ok(true) => console.say("Task updated successfully.")?,
        Ok(false) => console.say("No changes made.")?,
        Err(err) => {
            console.say(err)?;
            console.say("No changes made.")?;
        }
    }
    Ok(MenuState::Idle)
}

fn save_and_quit<R: BufRead, W: Write>(
    console: &mut Console<R, W>,
    store: &TaskStore,
    path: &Path,
) -> io::Result<Option<StoreError>> {
    match store.save(path) {
        Ok(_) => {
            console.say("Tasks saved successfully.")?;
            Ok(None)
        }
        Err(err) => {
            error!("event=save_and_quit status=failed err={err}");
            console.say(format!("Error saving file: {err}"))?;
            Ok(Some(err))
        }
    }
}
