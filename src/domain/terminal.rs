/// TerminalView: the character surface the SlowWriter draws on.
///
/// Deliberately tiny. It understands exactly three control characters:
///   - `\r` carriage return (column 0)
///   - `\n` line feed (next row, same column)
///   - `\b` backspace (one column left, no erase)
///
/// Everything else printable lands at the cursor and advances it. Rows are
/// not wrapped; the renderer clips. Only the last `MAX_ROWS` rows are kept.

use std::collections::VecDeque;

use super::writer::CharSink;

pub const MAX_ROWS: usize = 500;

#[derive(Clone, Debug)]
pub struct TerminalView {
    rows: VecDeque<Vec<char>>,
    cursor_row: usize,
    cursor_col: usize,
}

impl TerminalView {
    pub fn new() -> Self {
        let mut rows = VecDeque::with_capacity(64);
        rows.push_back(Vec::new());
        TerminalView { rows, cursor_row: 0, cursor_col: 0 }
    }

    /// Rendered cursor column on the current row.
    pub fn cursor_col(&self) -> usize {
        self.cursor_col
    }

    /// Column the cursor will reach once `pending` has been drawn.
    pub fn projected_col(&self, pending: impl IntoIterator<Item = char>) -> usize {
        pending.into_iter().fold(self.cursor_col, |col, ch| match ch {
            '\r' => 0,
            '\n' => col,
            '\u{8}' => col.saturating_sub(1),
            c if c.is_control() => col,
            _ => col + 1,
        })
    }

    /// (row, col) of the cursor, row indexed into `rows()`.
    pub fn cursor(&self) -> (usize, usize) {
        (self.cursor_row, self.cursor_col)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn rows(&self) -> impl Iterator<Item = &[char]> {
        self.rows.iter().map(Vec::as_slice)
    }

    #[cfg(test)]
    pub fn row_text(&self, row: usize) -> String {
        self.rows.get(row).map(|r| r.iter().collect()).unwrap_or_default()
    }

    /// Whole surface as text, rows joined with `\n`, trailing blanks trimmed.
    #[cfg(test)]
    pub fn text(&self) -> String {
        self.rows
            .iter()
            .map(|r| r.iter().collect::<String>().trim_end().to_string())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn line_feed(&mut self) {
        self.cursor_row += 1;
        if self.cursor_row == self.rows.len() {
            self.rows.push_back(Vec::new());
        }
        if self.rows.len() > MAX_ROWS {
            self.rows.pop_front();
            self.cursor_row -= 1;
        }
    }

    fn put_printable(&mut self, ch: char) {
        let col = self.cursor_col;
        let row = &mut self.rows[self.cursor_row];
        if row.len() < col {
            row.resize(col, ' ');
        }
        if col < row.len() {
            row[col] = ch;
        } else {
            row.push(ch);
        }
        self.cursor_col += 1;
    }
}

impl Default for TerminalView {
    fn default() -> Self {
        Self::new()
    }
}

impl CharSink for TerminalView {
    fn put_char(&mut self, ch: char) {
        match ch {
            '\r' => self.cursor_col = 0,
            '\n' => self.line_feed(),
            '\u{8}' => self.cursor_col = self.cursor_col.saturating_sub(1),
            c if c.is_control() => {}
            c => self.put_printable(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(view: &mut TerminalView, s: &str) {
        for c in s.chars() {
            view.put_char(c);
        }
    }

    #[test]
    fn prompt_puts_cursor_at_column_two() {
        let mut v = TerminalView::new();
        feed(&mut v, "\r\n\n$ ");
        assert_eq!(v.cursor(), (2, 2));
        assert_eq!(v.row_text(2), "$ ");
    }

    #[test]
    fn backspace_erase_sequence_removes_last_char() {
        let mut v = TerminalView::new();
        feed(&mut v, "$ 12");
        feed(&mut v, "\u{8} \u{8}");
        assert_eq!(v.cursor_col(), 3);
        assert_eq!(v.text(), "$ 1");
    }

    #[test]
    fn line_feed_keeps_column() {
        let mut v = TerminalView::new();
        feed(&mut v, "ab\ncd");
        assert_eq!(v.row_text(1), "  cd");
    }

    #[test]
    fn controls_other_than_cr_lf_bs_are_dropped() {
        let mut v = TerminalView::new();
        feed(&mut v, "a\x1b[31mb");
        assert_eq!(v.text(), "a[31mb");
    }

    #[test]
    fn projection_follows_queued_output() {
        let mut v = TerminalView::new();
        feed(&mut v, "boot");
        assert_eq!(v.projected_col("".chars()), 4);
        assert_eq!(v.projected_col("ing\r\n\n$ 1".chars()), 3);
        assert_eq!(v.projected_col("\u{8} \u{8}\x1b".chars()), 3);
    }

    #[test]
    fn old_rows_are_discarded() {
        let mut v = TerminalView::new();
        for _ in 0..MAX_ROWS + 10 {
            feed(&mut v, "x\r\n");
        }
        assert_eq!(v.row_count(), MAX_ROWS);
        assert_eq!(v.cursor(), (MAX_ROWS - 1, 0));
    }
}
