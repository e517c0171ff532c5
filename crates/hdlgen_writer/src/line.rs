//! Indentation-aware line output shared by both backends.
//!
//! [`LineWriter`] tracks an indentation depth (two columns per level) and
//! can leave a line open so that the next write continues it, which is how
//! `else if` and `end else begin` style continuations are produced. Its
//! [`LineWriter::write_lines`] prints a group of lines as columns, each
//! field starting at the same position on every line.

use std::io::{self, Write};

/// Columns per indentation level.
const INDENT_WIDTH: usize = 2;

/// A line-oriented writer over an [`io::Write`] sink.
pub struct LineWriter<W: Write> {
    out: W,
    indent: usize,
    // A no-newline write left the current line open.
    pending: bool,
}

impl<W: Write> LineWriter<W> {
    /// Creates a writer at indentation depth zero.
    pub fn new(out: W) -> Self {
        Self {
            out,
            indent: 0,
            pending: false,
        }
    }

    /// Consumes the writer and returns the sink.
    pub fn into_inner(self) -> W {
        self.out
    }

    /// Current indentation depth.
    pub fn indent(&self) -> usize {
        self.indent
    }

    /// Increases the indentation depth by one.
    pub fn inc_indent(&mut self) {
        self.indent += 1;
    }

    /// Decreases the indentation depth by one.
    pub fn dec_indent(&mut self) {
        self.indent = self.indent.saturating_sub(1);
    }

    /// Writes `line` and ends it.
    ///
    /// The line is indented unless it continues an open line. An empty
    /// `line` writes only the newline.
    pub fn write_line(&mut self, line: &str) -> io::Result<()> {
        self.put(line)?;
        self.pending = false;
        self.out.write_all(b"\n")
    }

    /// Writes `text` and leaves the line open for the next write.
    pub fn write_partial(&mut self, text: &str) -> io::Result<()> {
        self.put(text)?;
        self.pending = true;
        Ok(())
    }

    /// Writes `header`, then increases the indentation.
    pub fn open(&mut self, header: &str) -> io::Result<()> {
        self.write_line(header)?;
        self.inc_indent();
        Ok(())
    }

    /// Decreases the indentation, then writes `footer`.
    pub fn close(&mut self, footer: &str) -> io::Result<()> {
        self.dec_indent();
        self.write_line(footer)
    }

    fn put(&mut self, text: &str) -> io::Result<()> {
        if text.is_empty() {
            return Ok(());
        }
        if !self.pending {
            write!(self.out, "{:width$}", "", width = self.indent * INDENT_WIDTH)?;
        }
        self.out.write_all(text.as_bytes())
    }

    /// Writes `lines` with their fields aligned in columns.
    ///
    /// Every line but the last is terminated by `end`, the last by
    /// `last_end`. A field that does not fit before the next column start
    /// is followed by a single space.
    pub fn write_lines<S: AsRef<str>>(
        &mut self,
        lines: &[Vec<S>],
        end: &str,
        last_end: &str,
    ) -> io::Result<()> {
        let tabs = tab_positions(lines, self.indent * INDENT_WIDTH);
        for (i, fields) in lines.iter().enumerate() {
            let mut pos = 0;
            let mut prev_empty = true;
            for (field, &tab) in fields.iter().zip(&tabs) {
                let field = field.as_ref();
                if !prev_empty {
                    self.out.write_all(b" ")?;
                    pos += 1;
                }
                let pad = if tab >= pos { tab - pos } else { 1 };
                write!(self.out, "{:pad$}{field}", "")?;
                pos += pad + field.len();
                prev_empty = field.is_empty();
            }
            let terminator = if i + 1 < lines.len() { end } else { last_end };
            writeln!(self.out, "{terminator}")?;
        }
        self.pending = false;
        Ok(())
    }
}

/// Computes the start column of every field of `lines`.
///
/// A column is as wide as its widest field plus one separator, except for
/// empty columns and the last column. The first column starts at `start`.
pub fn tab_positions<S: AsRef<str>>(lines: &[Vec<S>], start: usize) -> Vec<usize> {
    let columns = lines.iter().map(Vec::len).max().unwrap_or(0);
    let mut widths = vec![0usize; columns];
    for fields in lines {
        for (i, field) in fields.iter().enumerate() {
            widths[i] = widths[i].max(field.as_ref().len());
        }
    }
    let mut tabs = Vec::with_capacity(columns);
    let mut pos = start;
    for (i, width) in widths.iter().enumerate() {
        tabs.push(pos);
        if i + 1 < columns && *width > 0 {
            pos += width + 1;
        } else {
            pos += width;
        }
    }
    tabs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(f: impl FnOnce(&mut LineWriter<Vec<u8>>) -> io::Result<()>) -> String {
        let mut w = LineWriter::new(Vec::new());
        f(&mut w).unwrap();
        String::from_utf8(w.into_inner()).unwrap()
    }

    #[test]
    fn indentation_two_columns_per_level() {
        let text = render(|w| {
            w.open("a")?;
            w.open("b")?;
            w.write_line("c")?;
            w.close("d")?;
            w.close("e")
        });
        assert_eq!(text, "a\n  b\n    c\n  d\ne\n");
    }

    #[test]
    fn empty_line_has_no_indent() {
        let text = render(|w| {
            w.inc_indent();
            w.write_line("")
        });
        assert_eq!(text, "\n");
    }

    #[test]
    fn partial_write_continues_line() {
        let text = render(|w| {
            w.inc_indent();
            w.write_partial("else ")?;
            w.write_line("if ( x ) begin")
        });
        assert_eq!(text, "  else if ( x ) begin\n");
    }

    #[test]
    fn tab_positions_skip_empty_columns() {
        let lines = vec![
            vec!["input", "", "", "clock"],
            vec!["output", "", "", "data_out"],
        ];
        assert_eq!(tab_positions(&lines, 2), vec![2, 9, 9, 9]);
    }

    #[test]
    fn tab_positions_empty() {
        let lines: Vec<Vec<&str>> = Vec::new();
        assert!(tab_positions(&lines, 4).is_empty());
    }

    #[test]
    fn aligned_port_list() {
        let text = render(|w| {
            w.inc_indent();
            w.write_lines(
                &[
                    vec!["input", "", "", "clock"],
                    vec!["input", "", "", "data_in"],
                    vec!["output", "", "", "data_out"],
                ],
                ",",
                "",
            )
        });
        assert_eq!(
            text,
            "  input  clock,\n  input  data_in,\n  output data_out\n"
        );
    }

    #[test]
    fn aligned_declarations() {
        let text = render(|w| {
            w.inc_indent();
            w.inc_indent();
            w.write_lines(
                &[
                    vec!["clock", ":", "in", "std_logic"],
                    vec!["data_out", ":", "out", "std_logic"],
                ],
                ";",
                "",
            )
        });
        assert_eq!(
            text,
            "    clock    : in  std_logic;\n    data_out : out std_logic\n"
        );
    }

    #[test]
    fn trailing_empty_field() {
        let text = render(|w| {
            w.write_lines(&[vec!["1'b0:", "q <= 1'b1"], vec!["default:", ""]], ";", ";")
        });
        assert_eq!(text, "1'b0:    q <= 1'b1;\ndefault: ;\n");
    }
}
