//! Table rendering utilities for CLI outputs.
//! Column widths follow the widest cell; colours wrap whole rows so they
//! never count towards a width.

use crate::utils::colors::RESET;

pub struct Table {
    headers: Vec<String>,
    rows: Vec<(Vec<String>, Option<&'static str>)>,
}

impl Table {
    pub fn new(headers: &[&str]) -> Self {
        Self {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn add_row(&mut self, row: Vec<String>) {
        self.rows.push((row, None));
    }

    pub fn add_colored_row(&mut self, row: Vec<String>, color: &'static str) {
        self.rows.push((row, Some(color)));
    }

    fn widths(&self) -> Vec<usize> {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for (row, _) in &self.rows {
            for (i, cell) in row.iter().enumerate().take(widths.len()) {
                widths[i] = widths[i].max(cell.chars().count());
            }
        }
        widths
    }

    fn line(cells: &[String], widths: &[usize]) -> String {
        let mut out = String::new();
        for (i, w) in widths.iter().enumerate() {
            let cell = cells.get(i).map(String::as_str).unwrap_or("");
            out.push_str(&format!("{:<width$} ", cell, width = *w));
        }
        out.trim_end().to_string()
    }

    pub fn render(&self) -> String {
        let widths = self.widths();
        let mut out = Self::line(&self.headers, &widths);
        out.push('\n');
        let rule: usize = widths.iter().sum::<usize>() + widths.len().saturating_sub(1);
        out.push_str(&"-".repeat(rule));
        out.push('\n');

        for (row, color) in &self.rows {
            let text = Self::line(row, &widths);
            match color {
                Some(c) => out.push_str(&format!("{c}{text}{RESET}")),
                None => out.push_str(&text),
            }
            out.push('\n');
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn columns_fit_the_widest_cell() {
        let mut t = Table::new(&["Time", "Event"]);
        t.add_row(vec!["04:03".into(), "High Tide".into()]);
        t.add_row(vec!["10:40".into(), "Low".into()]);
        let out = t.render();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "Time  Event");
        assert_eq!(lines[2], "04:03 High Tide");
        assert_eq!(lines[3], "10:40 Low");
    }
}
