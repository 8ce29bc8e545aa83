//! Terminal output for build reports.
//!
//! `Table` draws a box-drawing table whose widest columns shrink until it
//! fits the terminal.

use crate::build::{BuildReport, FailedStep, FeedbackAnalyzer};
use colored::*;

pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: &[&str]) -> Self {
        Self {
            headers: headers.iter().map(|s| s.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn add_row(&mut self, row: Vec<String>) {
        if row.len() == self.headers.len() {
            self.rows.push(row);
        }
    }

    /// Column widths fitted to `max_width` terminal columns
    fn widths(&self, max_width: usize) -> Vec<usize> {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                widths[i] = widths[i].max(console::measure_text_width(cell));
            }
        }

        let overhead = 3 + 3 * self.headers.len();
        let available = max_width.saturating_sub(overhead);
        while widths.iter().sum::<usize>() > available {
            let Some((idx, &widest)) = widths.iter().enumerate().max_by_key(|(_, w)| **w) else {
                break;
            };
            if widest <= 8 {
                break;
            }
            widths[idx] -= 1;
        }
        widths
    }

    pub fn render(&self, max_width: usize) -> String {
        if self.headers.is_empty() {
            return String::new();
        }
        let widths = self.widths(max_width);

        let sep = |left: &str, mid: &str, right: &str| -> String {
            let inner: Vec<String> = widths.iter().map(|w| "─".repeat(w + 2)).collect();
            format!("  {}{}{}\n", left, inner.join(mid), right)
        };
        let line = |cells: &[String], bold: bool| -> String {
            let mut s = String::from("  │");
            for (cell, &w) in cells.iter().zip(&widths) {
                let flat = cell.replace(['\n', '\r', '\t'], " ");
                let text = console::truncate_str(&flat, w, "...");
                let pad = w.saturating_sub(console::measure_text_width(&text));
                let text = if bold { text.bold().to_string() } else { text.to_string() };
                s.push_str(&format!(" {}{} │", text, " ".repeat(pad)));
            }
            s.push('\n');
            s
        };

        let mut out = sep("┌", "┬", "┐");
        out.push_str(&line(&self.headers, true));
        out.push_str(&sep("├", "┼", "┤"));
        for row in &self.rows {
            out.push_str(&line(row, false));
        }
        out.push_str(&sep("└", "┴", "┘"));
        out
    }

    pub fn print(&self) {
        let (_, term_width) = console::Term::stdout().size();
        print!("{}", self.render(term_width as usize));
    }
}

/// Print failures with hints, then the per-target summary.
pub fn print_report(report: &BuildReport) {
    for result in report.results.iter().filter(|r| !r.succeeded) {
        let what = match (&result.failed_step, &result.unit) {
            (FailedStep::Compile, Some(unit)) => format!("compiling '{}'", unit),
            (FailedStep::Link, _) => "linking".to_string(),
            (FailedStep::Prepare, _) => "preparing directories".to_string(),
            _ => "building".to_string(),
        };
        println!(
            "{} Target {} failed while {}:",
            "x".red(),
            result.target.bold(),
            what
        );
        if !result.message.trim().is_empty() {
            println!("{}", result.message.trim_end());
        }
        if let Some(hint) = FeedbackAnalyzer::analyze(&result.message) {
            println!("{} {}", "💡".yellow(), hint);
        }
        println!();
    }

    let mut table = Table::new(&["Target", "Status", "Step"]);
    for result in &report.results {
        let status = if result.succeeded {
            "ok".green().to_string()
        } else {
            "failed".red().to_string()
        };
        let step = match result.failed_step {
            FailedStep::None => "-",
            FailedStep::Prepare => "prepare",
            FailedStep::Compile => "compile",
            FailedStep::Link => "link",
        };
        table.add_row(vec![result.target.clone(), status, step.to_string()]);
    }
    table.print();
}
