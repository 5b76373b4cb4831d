use anyhow::{Context, Result};
use chatcloud_core::{Event, Timestamp};
use chrono::NaiveDateTime;
use std::fs;
use std::path::Path;

use crate::segment::Segmenter;

/// e.g. `October 16, 2026 at 09:05PM`
pub const TIME_FORMAT: &str = "%B %d, %Y at %I:%M%p";

#[derive(Debug, Default)]
pub struct LoadReport {
    pub events: Vec<Event>,
    pub skipped: usize,
}

pub fn parse_time(raw: &str) -> Option<Timestamp> {
    NaiveDateTime::parse_from_str(raw.trim(), TIME_FORMAT).ok()
}

pub fn load_events(path: &Path, segmenter: &dyn Segmenter) -> Result<LoadReport> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read records {}", path.display()))?;
    Ok(events_from_str(&text, segmenter))
}

pub fn events_from_str(text: &str, segmenter: &dyn Segmenter) -> LoadReport {
    let mut report = LoadReport::default();
    for (row_no, row) in parse_rows(text).into_iter().enumerate() {
        let [time, user_id, body, ..] = row.as_slice() else {
            tracing::warn!(row = row_no + 1, fields = row.len(), "skipping short record");
            report.skipped += 1;
            continue;
        };
        let Some(time) = parse_time(time) else {
            tracing::warn!(row = row_no + 1, raw = %time, "skipping record with bad timestamp");
            report.skipped += 1;
            continue;
        };
        report.events.push(Event {
            time,
            user_id: user_id.clone(),
            text: body.clone(),
            words: segmenter.segment(body),
        });
    }
    report
}

/// Headerless CSV: quoted fields, `""` escapes, separators and newlines inside quotes.
fn parse_rows(text: &str) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    let mut row = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                _ => field.push(c),
            }
            continue;
        }
        match c {
            '"' => in_quotes = true,
            ',' => row.push(std::mem::take(&mut field)),
            '\r' => {}
            '\n' => {
                row.push(std::mem::take(&mut field));
                finish_row(&mut rows, std::mem::take(&mut row));
            }
            _ => field.push(c),
        }
    }
    if !field.is_empty() || !row.is_empty() {
        row.push(field);
        finish_row(&mut rows, row);
    }
    rows
}

fn finish_row(rows: &mut Vec<Vec<String>>, row: Vec<String>) {
    // blank line
    if row.len() == 1 && row[0].is_empty() {
        return;
    }
    rows.push(row);
}
