//! Plain column-aligned table rendering.

/// A simple text table: headers, rows, padded columns.
#[derive(Debug, Default)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: &[&str]) -> Self {
        Self {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Renders the table with two-space column gaps and a dashed rule
    /// under the header.
    pub fn render(&self) -> String {
        let columns = self.headers.len();
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate().take(columns) {
                widths[i] = widths[i].max(cell.chars().count());
            }
        }

        let mut out = String::new();
        render_row(&mut out, &self.headers, &widths);
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        render_row(&mut out, &rule, &widths);
        for row in &self.rows {
            render_row(&mut out, row, &widths);
        }
        out
    }
}

fn render_row(out: &mut String, cells: &[String], widths: &[usize]) {
    let last = widths.len().saturating_sub(1);
    for (i, &width) in widths.iter().enumerate() {
        let cell = cells.get(i).map(String::as_str).unwrap_or("");
        if i == last {
            out.push_str(cell);
        } else {
            out.push_str(&format!("{cell:<width$}"));
            out.push_str("  ");
        }
    }
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn aligns_columns() {
        let mut table = Table::new(&["ID", "TITLE"]);
        table.push_row(vec!["1".into(), "Short".into()]);
        table.push_row(vec!["10".into(), "Longer title".into()]);
        let out = table.render();
        assert_eq!(
            out,
            "ID  TITLE\n--  ------------\n1   Short\n10  Longer title\n"
        );
    }

    #[test]
    fn empty_table_renders_header_only() {
        let table = Table::new(&["A"]);
        assert!(table.is_empty());
        assert_eq!(table.render(), "A\n-\n");
    }
}
