use std::{
    fs::File,
    io::{self, BufRead, BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};

use log::{debug, info, warn};

use crate::{
    error::{EditError, LineError, LookupError, StoreError},
    line_format,
    task::{NewTask, Task, TaskId, TaskUpdate},
};

/// How the user names a task in Edit/Delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    Id(TaskId),
    Title(String),
    /// Bare digits: an id when one exists, otherwise a title.
    IdOrTitle(TaskId, String),
}

impl Selector {
    /// `#12` selects by id, `12` by id then title, anything else by title.
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        if input.is_empty() {
            return None;
        }
        if let Some(n) = input.strip_prefix('#').and_then(|d| d.parse::<u32>().ok()) {
            return Some(Selector::Id(TaskId(n)));
        }
        match input.parse::<u32>() {
            Ok(n) => Some(Selector::IdOrTitle(TaskId(n), input.to_string())),
            Err(_) => Some(Selector::Title(input.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Project,
    DueDate,
    Unsorted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Summary {
    pub total: usize,
    pub done: usize,
}

impl Summary {
    pub fn pending(&self) -> usize {
        self.total - self.done
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorruptLine {
    pub line_no: usize,
    pub reason: LineError,
}

/// Result of [`TaskStore::load`]. Loading never fails outright: problems are
/// carried alongside whatever tasks could be read.
#[derive(Debug)]
pub struct LoadReport {
    pub store: TaskStore,
    pub created: bool,
    pub corrupted: Vec<CorruptLine>,
    pub io_error: Option<StoreError>,
}

/// The single in-memory task collection.
#[derive(Debug)]
pub struct TaskStore {
    tasks: Vec<Task>,
    next_id: u32,
}

impl Default for TaskStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskStore {
    pub fn new() -> Self {
        Self {
            tasks: Vec::new(),
            next_id: 1,
        }
    }

    pub fn from_tasks(tasks: impl IntoIterator<Item = NewTask>) -> Self {
        let mut store = Self::new();
        for task in tasks {
            store.add(task);
        }
        store
    }

    pub fn load(path: &Path) -> LoadReport {
        let mut report = LoadReport {
            store: TaskStore::new(),
            created: false,
            corrupted: Vec::new(),
            io_error: None,
        };

        if !path.exists() {
            match File::create(path) {
                Ok(_) => {
                    info!("event=load path={} status=created", path.display());
                    report.created = true;
                }
                Err(source) => {
                    warn!("event=load path={} status=create_failed err={source}", path.display());
                    report.io_error = Some(StoreError::Create {
                        path: path.to_path_buf(),
                        source,
                    });
                }
            }
            return report;
        }

        let file = match File::open(path) {
            Ok(file) => file,
            Err(source) => {
                warn!("event=load path={} status=open_failed err={source}", path.display());
                report.io_error = Some(StoreError::Read {
                    path: path.to_path_buf(),
                    source,
                });
                return report;
            }
        };

        if let Err(source) = report.read_lines(BufReader::new(file)) {
            warn!(
                "event=load path={} status=read_failed tasks={} err={source}",
                path.display(),
                report.store.len()
            );
            report.io_error = Some(StoreError::Read {
                path: path.to_path_buf(),
                source,
            });
        }

        info!(
            "event=load path={} tasks={} corrupted={}",
            path.display(),
            report.store.len(),
            report.corrupted.len()
        );
        report
    }

    /// Overwrites `path` with every task, returning how many were written.
    pub fn save(&self, path: &Path) -> Result<usize, StoreError> {
        let file = File::create(path).map_err(|source| StoreError::Write {
            path: path.to_path_buf(),
            written: 0,
            source,
        })?;
        let mut writer = BufWriter::new(file);

        let mut written = 0;
        for task in &self.tasks {
            if let Err(source) = writeln!(writer, "{}", line_format::encode(task)) {
                // Keep whatever made it into the buffer.
                let _ = writer.flush();
                return Err(write_error(path, written, source));
            }
            written += 1;
        }
        writer
            .flush()
            .and_then(|()| writer.get_ref().sync_all())
            .map_err(|source| write_error(path, written, source))?;

        info!("event=save path={} tasks={written}", path.display());
        Ok(written)
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn summary(&self) -> Summary {
        Summary {
            total: self.tasks.len(),
            done: self.tasks.iter().filter(|t| t.done).count(),
        }
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Appends a task at the end of the collection.
    pub fn add(&mut self, task: NewTask) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        self.tasks.push(Task {
            id,
            title: task.title,
            due_date: task.due_date,
            project: task.project,
            done: task.done,
        });
        debug!("event=add id={id}");
        id
    }

    pub fn find(&self, selector: &Selector) -> Result<TaskId, LookupError> {
        match selector {
            Selector::Id(id) => self.get(*id).map(|t| t.id).ok_or(LookupError::NotFound),
            Selector::Title(title) => self.find_by_title(title),
            Selector::IdOrTitle(id, title) => match self.get(*id) {
                Some(task) => Ok(task.id),
                None => self.find_by_title(title),
            },
        }
    }

    fn find_by_title(&self, title: &str) -> Result<TaskId, LookupError> {
        let wanted = title.trim().to_lowercase();
        let matches: Vec<TaskId> = self
            .tasks
            .iter()
            .filter(|t| t.title.to_lowercase() == wanted)
            .map(|t| t.id)
            .collect();
        match matches.len() {
            0 => Err(LookupError::NotFound),
            1 => Ok(matches[0]),
            _ => Err(LookupError::Ambiguous(matches)),
        }
    }

    /// Applies every field of `update` or none of them.
    pub fn update(&mut self, id: TaskId, update: TaskUpdate) -> Result<(), EditError> {
        update.validate().map_err(EditError::Invalid)?;
        let task = self
            .tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(LookupError::NotFound)?;
        update.apply(task);
        debug!("event=update id={id}");
        Ok(())
    }

    pub fn mark_done(&mut self, id: TaskId) -> Result<(), LookupError> {
        let task = self
            .tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(LookupError::NotFound)?;
        task.done = true;
        debug!("event=mark_done id={id}");
        Ok(())
    }

    pub fn remove(&mut self, selector: &Selector) -> Result<Task, LookupError> {
        let id = self.find(selector)?;
        let index = self
            .tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or(LookupError::NotFound)?;
        debug!("event=remove id={id}");
        Ok(self.tasks.remove(index))
    }

    /// Borrowed view in the requested order. Equal keys keep insertion order.
    /// Projects compare case-insensitively first, then by exact text.
    pub fn sorted(&self, key: SortKey) -> Vec<&Task> {
        let mut view: Vec<&Task> = self.tasks.iter().collect();
        match key {
            SortKey::Project => view.sort_by(|a, b| {
                a.project
                    .to_lowercase()
                    .cmp(&b.project.to_lowercase())
                    .then_with(|| a.project.cmp(&b.project))
            }),
            SortKey::DueDate => view.sort_by_key(|t| t.due_date),
            SortKey::Unsorted => {}
        }
        view
    }
}

impl LoadReport {
    fn read_lines(&mut self, mut reader: impl BufRead) -> io::Result<()> {
        let mut buf = Vec::new();
        let mut line_no = 0;
        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf)? == 0 {
                return Ok(());
            }
            line_no += 1;

            let decoded = match std::str::from_utf8(&buf) {
                Ok(line) => {
                    let line = line.trim_end_matches(['\n', '\r']);
                    if line.trim().is_empty() {
                        continue;
                    }
                    line_format::decode(line)
                }
                Err(_) => Err(LineError::Encoding),
            };

            match decoded {
                Ok(task) => {
                    self.store.add(task);
                }
                Err(reason) => {
                    warn!("event=corrupt_line line={line_no} reason=\"{reason}\"");
                    self.corrupted.push(CorruptLine { line_no, reason });
                }
            }
        }
    }
}

fn write_error(path: &Path, written: usize, source: io::Error) -> StoreError {
    warn!("event=save path={} status=failed written={written} err={source}", path.display());
    StoreError::Write {
        path: PathBuf::from(path),
        written,
        source,
    }
}
