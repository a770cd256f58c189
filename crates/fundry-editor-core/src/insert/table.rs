//! Table insertion: an N x M grid appended to the end of the content.

use web_time::Instant;

use fundry_editor_html::{Formatter, Sanitizer};

use crate::editor::Editor;
use crate::types::Mode;

impl<C: Sanitizer + Formatter> Editor<C> {
    /// Append a table with a header row and placeholder cells. Cursor
    /// position is not preserved; the table always goes at the end.
    pub fn insert_table(&mut self, rows: usize, cols: usize, now: Instant) {
        if !self.config.active || rows == 0 || cols == 0 {
            return;
        }
        match self.mode {
            Mode::Structured => {
                let table = self.surface.create_element("table");
                for row in 0..rows {
                    let tr = self.surface.create_element("tr");
                    for col in 0..cols {
                        let (tag, label) = cell_placeholder(row, col);
                        let cell = self.surface.create_element(tag);
                        let text = self.surface.create_text(&label);
                        self.surface.append_child(cell, text);
                        self.surface.append_child(tr, cell);
                    }
                    self.surface.append_child(table, tr);
                }
                self.append_to_surface(table);
            }
            Mode::Source => {
                self.source.push(&table_markup(rows, cols));
            }
        }
        self.focus();
        self.handle_input(now);
    }
}

fn cell_placeholder(row: usize, col: usize) -> (&'static str, String) {
    if row == 0 {
        ("th", format!("Header {}", col + 1))
    } else {
        ("td", format!("Cell {}-{}", row, col + 1))
    }
}

fn table_markup(rows: usize, cols: usize) -> String {
    let mut out = String::from("<table>");
    for row in 0..rows {
        out.push_str("<tr>");
        for col in 0..cols {
            let (tag, label) = cell_placeholder(row, col);
            out.push('<');
            out.push_str(tag);
            out.push('>');
            out.push_str(&label);
            out.push_str("</");
            out.push_str(tag);
            out.push('>');
        }
        out.push_str("</tr>");
    }
    out.push_str("</table>");
    out
}
