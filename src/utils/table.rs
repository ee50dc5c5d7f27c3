use crate::models::TransactionItem;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Right,
}

/// Plain text table for the terminal screen
pub struct Table {
    headers: Vec<String>,
    aligns: Vec<Align>,
    rows: Vec<Vec<String>>,
    col_widths: Vec<usize>,
}

impl Table {
    /// Create a new table with the given `(header, alignment)` columns
    pub fn new(columns: &[(&str, Align)]) -> Self {
        Table {
            headers: columns.iter().map(|(h, _)| h.to_string()).collect(),
            aligns: columns.iter().map(|(_, a)| *a).collect(),
            rows: Vec::new(),
            col_widths: columns.iter().map(|(h, _)| h.chars().count()).collect(),
        }
    }

    pub fn add_row(&mut self, row: Vec<String>) {
        for (i, col) in row.iter().enumerate() {
            if let Some(width) = self.col_widths.get_mut(i) {
                *width = (*width).max(col.chars().count());
            }
        }
        self.rows.push(row);
    }

    pub fn render(&self) -> String {
        let mut lines = Vec::with_capacity(self.rows.len() + 2);
        lines.push(self.render_row(&self.headers));
        lines.push(self.render_separator());
        for row in &self.rows {
            lines.push(self.render_row(row));
        }
        lines.join("\n")
    }

    fn render_row(&self, row: &[String]) -> String {
        let cells: Vec<String> = row
            .iter()
            .zip(self.col_widths.iter().zip(&self.aligns))
            .map(|(col, (&width, align))| match align {
                Align::Left => format!("{:<width$}", col, width = width),
                Align::Right => format!("{:>width$}", col, width = width),
            })
            .collect();
        cells.join(" | ").trim_end().to_string()
    }

    fn render_separator(&self) -> String {
        self.col_widths
            .iter()
            .map(|&w| "-".repeat(w))
            .collect::<Vec<_>>()
            .join("-+-")
    }
}

/// Render one transactions page, numbering rows from `first_row`
pub fn transactions_table(items: &[TransactionItem], first_row: usize) -> String {
    let mut table = Table::new(&[
        ("#", Align::Right),
        ("Date", Align::Left),
        ("Type", Align::Left),
        ("Amount", Align::Right),
    ]);
    for (offset, item) in items.iter().enumerate() {
        table.add_row(vec![
            (first_row + offset).to_string(),
            item.date.clone(),
            item.tx_type.clone(),
            item.amount.clone(),
        ]);
    }
    table.render()
}
