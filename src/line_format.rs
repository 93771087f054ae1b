//! One task per line: `Title|YYYY-MM-DD|Project|true`.
//!
//! `|`, `\` and line breaks inside a field are backslash-escaped, so files
//! written without any escapes read back unchanged.

use chrono::NaiveDate;

use crate::{
    error::LineError,
    task::{self, NewTask, Task},
};

pub const DELIMITER: char = '|';
const ESCAPE: char = '\\';
const FIELD_COUNT: usize = 4;
const FILE_DATE_FORMAT: &str = "%Y-%m-%d";

pub fn encode(task: &Task) -> String {
    [
        escape(&task.title),
        format_file_date(task.due_date),
        escape(&task.project),
        task.done.to_string(),
    ]
    .join("|")
}

pub fn decode(line: &str) -> Result<NewTask, LineError> {
    let fields = split_fields(line);
    if fields.len() != FIELD_COUNT {
        return Err(LineError::FieldCount(fields.len()));
    }

    let due_date = task::parse_date(&fields[1]).ok_or_else(|| LineError::BadDate(fields[1].clone()))?;
    let done = parse_bool(&fields[3]).ok_or_else(|| LineError::BadStatus(fields[3].clone()))?;
    let title = non_empty(&fields[0], "title")?;
    let project = non_empty(&fields[2], "project")?;

    Ok(NewTask {
        title,
        due_date,
        project,
        done,
    })
}

fn non_empty(field: &str, name: &'static str) -> Result<String, LineError> {
    let value = field.trim();
    if value.is_empty() {
        return Err(LineError::EmptyField(name));
    }
    Ok(value.to_string())
}

fn parse_bool(field: &str) -> Option<bool> {
    match field.trim().to_ascii_lowercase().as_str() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

fn escape(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    for c in field.chars() {
        match c {
            ESCAPE => out.push_str("\\\\"),
            DELIMITER => out.push_str("\\|"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            c => out.push(c),
        }
    }
    out
}

/// Splits on unescaped delimiters and resolves escapes. A lone trailing
/// backslash, or one before an unknown character, is kept literally.
fn split_fields(line: &str) -> Vec<String> {
    let mut fields = Vec::with_capacity(FIELD_COUNT);
    let mut current = String::new();
    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            ESCAPE => match chars.peek().copied() {
                Some(next @ (ESCAPE | DELIMITER)) => {
                    current.push(next);
                    chars.next();
                }
                Some('n') => {
                    current.push('\n');
                    chars.next();
                }
                Some('r') => {
                    current.push('\r');
                    chars.next();
                }
                _ => current.push(ESCAPE),
            },
            DELIMITER => fields.push(std::mem::take(&mut current)),
            c => current.push(c),
        }
    }
    fields.push(current);
    fields
}

/// Date text as written to the file.
pub fn format_file_date(date: NaiveDate) -> String {
    date.format(FILE_DATE_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::TaskId;
    use rstest::rstest;

    fn task(title: &str, project: &str) -> Task {
        Task {
            id: TaskId(1),
            title: title.to_string(),
            due_date: NaiveDate::from_ymd_opt(2023, 12, 1).unwrap(),
            project: project.to_string(),
            done: true,
        }
    }

    #[test]
    fn encodes_iso_date_and_lowercase_status() {
        assert_eq!(
            encode(&task("Complete project report", "Work")),
            "Complete project report|2023-12-01|Work|true"
        );
    }

    #[test]
    fn delimiter_inside_a_field_survives() {
        let original = task(r"A|B \ C", "x|y");
        let line = encode(&original);
        assert_eq!(line, r"A\|B \\ C|2023-12-01|x\|y|true");

        let decoded = decode(&line).unwrap();
        assert_eq!(decoded.title, r"A|B \ C");
        assert_eq!(decoded.project, "x|y");
    }

    #[test]
    fn reads_legacy_datetime_lines() {
        let decoded = decode("Buy groceries|11/25/2023 12:00:00 AM|Personal|True").unwrap();
        assert_eq!(decoded.due_date, NaiveDate::from_ymd_opt(2023, 11, 25).unwrap());
        assert!(decoded.done);
    }

    #[rstest]
    #[case("only|three|fields", LineError::FieldCount(3))]
    #[case("a|2023-12-01|b|true|extra", LineError::FieldCount(5))]
    #[case("a|not a date|b|true", LineError::BadDate("not a date".into()))]
    #[case("Title|2030-07-04 junk|P|false", LineError::BadDate("2030-07-04 junk".into()))]
    #[case("a|2023-12-01|b|yes", LineError::BadStatus("yes".into()))]
    #[case(" |2023-12-01|b|false", LineError::EmptyField("title"))]
    #[case("a|2023-12-01||false", LineError::EmptyField("project"))]
    fn rejects_corrupt_lines(#[case] line: &str, #[case] expected: LineError) {
        assert_eq!(decode(line), Err(expected));
    }

    #[test]
    fn stray_backslash_is_literal() {
        assert_eq!(split_fields(r"a\x|b\"), vec![r"a\x".to_string(), r"b\".to_string()]);
    }
}
