//! Table rendering utilities for CLI outputs.
//! Widths are measured in terminal columns, so page titles with wide
//! characters still line up.

use unicode_width::UnicodeWidthStr;

pub struct Column {
    pub header: String,
    pub max_width: usize,
}

impl Column {
    pub fn new(header: &str, max_width: usize) -> Self {
        Self {
            header: header.to_string(),
            max_width,
        }
    }
}

pub struct Table {
    pub columns: Vec<Column>,
    pub rows: Vec<Vec<String>>,
}

/// Cut `s` to at most `max` columns, ending with "…" when shortened.
pub fn truncate(s: &str, max: usize) -> String {
    if s.width() <= max {
        return s.to_string();
    }

    let mut out = String::new();
    let mut used = 0;
    for ch in s.chars() {
        let w = unicode_width::UnicodeWidthChar::width(ch).unwrap_or(0);
        if used + w + 1 > max {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push('…');
    out
}

fn pad(s: &str, width: usize) -> String {
    let fill = width.saturating_sub(s.width());
    format!("{}{}", s, " ".repeat(fill))
}

impl Table {
    pub fn new(columns: Vec<Column>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn add_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    pub fn render(&self) -> String {
        let cells: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|row| {
                self.columns
                    .iter()
                    .enumerate()
                    .map(|(i, col)| truncate(row.get(i).map(String::as_str).unwrap_or(""), col.max_width))
                    .collect()
            })
            .collect();

        let widths: Vec<usize> = self
            .columns
            .iter()
            .enumerate()
            .map(|(i, col)| {
                cells
                    .iter()
                    .map(|r| r[i].width())
                    .chain(std::iter::once(col.header.width()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let mut out = String::new();

        // Header
        let header: Vec<String> = self
            .columns
            .iter()
            .zip(&widths)
            .map(|(c, w)| pad(&c.header, *w))
            .collect();
        out.push_str(header.join(" | ").trim_end());
        out.push('\n');

        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        out.push_str(&rule.join("-+-"));
        out.push('\n');

        // Rows
        for row in &cells {
            let line: Vec<String> = row.iter().zip(&widths).map(|(c, w)| pad(c, *w)).collect();
            out.push_str(line.join(" | ").trim_end());
            out.push('\n');
        }

        out
    }
}
