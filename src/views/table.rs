use std::fmt::Write;

use crate::query::Pager;

/// Plain-text table with columns padded to their widest cell.
#[derive(Debug, Clone)]
pub struct Table {
    headers: Vec<&'static str>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: &[&'static str]) -> Self {
        Self {
            headers: headers.to_vec(),
            rows: Vec::new(),
        }
    }

    /// Cells beyond the header count are dropped; missing ones render empty.
    pub fn row(&mut self, cells: Vec<String>) -> &mut Self {
        self.rows.push(cells);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn widths(&self) -> Vec<usize> {
        self.headers
            .iter()
            .enumerate()
            .map(|(i, header)| {
                self.rows
                    .iter()
                    .filter_map(|row| row.get(i))
                    .map(|cell| cell.chars().count())
                    .chain(std::iter::once(header.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect()
    }

    pub fn render(&self, output: &mut String) {
        let widths = self.widths();
        let _ = writeln!(output, "{}", format_line(&widths, self.headers.iter().copied()));
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        let _ = writeln!(output, "{}", rule.join("-+-"));
        for row in &self.rows {
            let _ = writeln!(output, "{}", format_line(&widths, row.iter().map(String::as_str)));
        }
    }
}

fn format_line<'a>(widths: &[usize], mut cells: impl Iterator<Item = &'a str>) -> String {
    widths
        .iter()
        .map(|w| format!("{:<w$}", cells.next().unwrap_or(""), w = *w))
        .collect::<Vec<_>>()
        .join(" | ")
        .trim_end()
        .to_owned()
}

/// `Previous | Page N | Next`, with unavailable directions in brackets.
pub fn pager_line(pager: &Pager, has_next: bool) -> String {
    let prev = if pager.has_previous_page() {
        "Previous"
    } else {
        "[Previous]"
    };
    let next = if has_next { "Next" } else { "[Next]" };
    format!("{prev} | Page {} | {next}", pager.page_number())
}
