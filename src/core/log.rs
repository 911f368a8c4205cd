use crate::db::log::{LogEntry, load_log};
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use ansi_term::Colour;
use regex::Regex;
use std::sync::OnceLock;

const OP_MAX: usize = 60;

fn strip_ansi(s: &str) -> String {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"\x1B\[[0-9;]*[mK]").expect("valid regex"));
    re.replace_all(s, "").into_owned()
}

/// Restituisce il colore ANSI in base all'operazione
fn color_for_operation(op: &str) -> Colour {
    match op {
        "capture" => Colour::Green,
        "capture_duplicate" => Colour::Cyan,
        "capture_failed" => Colour::Red,
        "del" | "clear" => Colour::Yellow,
        "export" => Colour::Blue,
        "migration_applied" => Colour::Purple,
        "init" => Colour::RGB(255, 153, 51), // arancione
        _ => Colour::White,
    }
}

/// `op (target)`, cut to `max` visible characters with only `op` colored.
fn render_op(entry: &LogEntry, max: usize) -> String {
    let color = color_for_operation(&entry.operation);

    let visible = if entry.target.is_empty() {
        entry.operation.clone()
    } else {
        format!("{} ({})", entry.operation, entry.target)
    };

    let visible = if visible.chars().count() > max {
        let mut s: String = visible.chars().take(max.saturating_sub(3)).collect();
        s.push_str("...");
        s
    } else {
        visible
    };

    match visible.split_once(' ') {
        Some((op, rest)) => format!("{} {}", color.paint(op), rest),
        None => color.paint(visible.as_str()).to_string(),
    }
}

/// Lines of the internal log as printed by `log --print`.
pub fn format_log(entries: &[LogEntry]) -> Vec<String> {
    let id_w = entries
        .iter()
        .map(|e| e.id.to_string().len())
        .max()
        .unwrap_or(1);
    let date_w = entries.iter().map(|e| e.date.len()).max().unwrap_or(0);

    let ops: Vec<String> = entries.iter().map(|e| render_op(e, OP_MAX)).collect();
    let op_w = ops
        .iter()
        .map(|o| strip_ansi(o).chars().count())
        .max()
        .unwrap_or(0);

    entries
        .iter()
        .zip(ops)
        .map(|(e, op)| {
            // padding on the visible width, not on the escape sequences
            let padding = " ".repeat(op_w.saturating_sub(strip_ansi(&op).chars().count()));
            format!(
                "{:>id_w$}: {:<date_w$} | {}{} => {}",
                e.id, e.date, op, padding, e.message
            )
        })
        .collect()
}

pub struct LogLogic;

impl LogLogic {
    pub fn print_log(pool: &DbPool) -> AppResult<()> {
        let entries: Vec<LogEntry> = load_log(&pool.conn)?
            .into_iter()
            .map(|mut e| {
                if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(&e.date) {
                    e.date = dt.format("%FT%T%:z").to_string();
                }
                e
            })
            .collect();

        if entries.is_empty() {
            println!("📜 Internal log is empty.");
            return Ok(());
        }

        println!("📜 Internal log:\n");
        for line in format_log(&entries) {
            println!("{line}");
        }
        Ok(())
    }
}
