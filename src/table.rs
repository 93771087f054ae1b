use std::io::{self, Write};

use crossterm::{
    queue,
    style::{self as term, Print, ResetColor, SetForegroundColor},
};
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Cell, Row, Table, Widget},
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::task::{Task, DISPLAY_DATE_FORMAT};

pub const TITLE_WIDTH: usize = 20;
pub const PROJECT_WIDTH: usize = 15;
const ELLIPSIS: &str = "...";

const HEADER: [&str; 5] = ["#", "Title", "Due Date", "Project", "Status"];
const COLUMN_WIDTHS: [u16; 5] = [4, TITLE_WIDTH as u16, 10, PROJECT_WIDTH as u16, 11];
const COLUMN_SPACING: u16 = 1;

/// How a rendered row should stand out, independent of the output device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Emphasis {
    Done,
    Pending,
}

impl Emphasis {
    fn style(self) -> Style {
        match self {
            Emphasis::Done => Style::default().fg(Color::Green),
            Emphasis::Pending => Style::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRow {
    pub id: String,
    pub title: String,
    pub due_date: String,
    pub project: String,
    pub status: String,
    pub emphasis: Emphasis,
}

impl TaskRow {
    pub fn from_task(task: &Task) -> Self {
        let (marker, emphasis) = if task.done {
            ("[x]", Emphasis::Done)
        } else {
            ("[ ]", Emphasis::Pending)
        };
        Self {
            id: task.id.0.to_string(),
            title: truncate(&task.title, TITLE_WIDTH),
            due_date: task.due_date.format(DISPLAY_DATE_FORMAT).to_string(),
            project: truncate(&task.project, PROJECT_WIDTH),
            status: format!("{marker} {}", task.status_label()),
            emphasis,
        }
    }
}

/// Cuts `text` to at most `width` terminal columns, ending in `...` when
/// shortened. Wide characters count as two columns.
pub fn truncate(text: &str, width: usize) -> String {
    if text.width() <= width {
        return text.to_string();
    }
    let budget = width.saturating_sub(ELLIPSIS.len());
    let mut used = 0;
    let mut out = String::new();
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > budget {
            break;
        }
        used += w;
        out.push(c);
    }
    out.push_str(ELLIPSIS);
    out
}

/// Lays the rows out as a bordered table in an off-screen buffer.
pub fn render(rows: &[TaskRow]) -> Buffer {
    let inner_width: u16 =
        COLUMN_WIDTHS.iter().sum::<u16>() + COLUMN_SPACING * (COLUMN_WIDTHS.len() as u16 - 1);
    let height = u16::try_from(rows.len()).unwrap_or(u16::MAX).min(u16::MAX - 3) + 3;
    let area = Rect::new(0, 0, inner_width + 2, height);

    let header = Row::new(HEADER).style(Style::default().add_modifier(Modifier::BOLD));
    let body = rows.iter().map(|row| {
        Row::new([
            Cell::from(row.id.as_str()),
            Cell::from(row.title.as_str()),
            Cell::from(row.due_date.as_str()),
            Cell::from(row.project.as_str()),
            Cell::from(row.status.as_str()),
        ])
        .style(row.emphasis.style())
    });
    let table = Table::new(body, COLUMN_WIDTHS.map(Constraint::Length))
        .header(header)
        .column_spacing(COLUMN_SPACING)
        .block(Block::default().borders(Borders::ALL).title(" Tasks "));

    let mut buf = Buffer::empty(area);
    table.render(area, &mut buf);
    buf
}

/// Prints the table line by line. With `color` set, emphasised cells get
/// their foreground colour; otherwise the status marker alone tells rows
/// apart.
pub fn write_table(out: &mut impl Write, rows: &[TaskRow], color: bool) -> io::Result<()> {
    let buf = render(rows);
    let width = usize::from(buf.area.width.max(1));

    for line in buf.content.chunks(width) {
        let mut current: Option<term::Color> = None;
        // Cells covered by the right half of a wide character.
        let mut hidden = 0;
        for cell in line {
            if hidden > 0 {
                hidden -= 1;
                continue;
            }
            let fg = if color { terminal_color(cell.fg) } else { None };
            if fg != current {
                match fg {
                    Some(c) => queue!(out, SetForegroundColor(c))?,
                    None => queue!(out, ResetColor)?,
                }
                current = fg;
            }
            let symbol = cell.symbol();
            hidden = symbol.width().saturating_sub(1);
            queue!(out, Print(symbol))?;
        }
        if current.is_some() {
            queue!(out, ResetColor)?;
        }
        writeln!(out)?;
    }
    out.flush()
}

fn terminal_color(color: Color) -> Option<term::Color> {
    match color {
        Color::Green => Some(term::Color::Green),
        Color::Red => Some(term::Color::Red),
        Color::Yellow => Some(term::Color::Yellow),
        Color::Cyan => Some(term::Color::Cyan),
        _ => None,
    }
}
