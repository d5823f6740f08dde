//! Line-budgeted command buffer
//!
//! The controller reads the command stream line by line into a fixed-size
//! receive buffer, so no line may exceed the budget. Commands are pushed
//! as groups (for example `x12 y7 m`) that are never split across lines;
//! a group that does not fit ends the current line first.
//!
//! Every line starts with a header produced by the caller, so that each
//! line can be executed on its own.

use std::io::{self, Write};

/// Controller receive buffer size, in bytes, minus room for the newline
pub const DEFAULT_LINE_BUDGET: usize = 254;

/// Line-oriented command writer
#[derive(Debug)]
pub struct CommandBuffer<W: Write> {
    writer: W,
    line: String,
    budget: usize,
    lines_written: usize,
}

impl<W: Write> CommandBuffer<W> {
    pub fn new(writer: W) -> Self {
        Self::with_budget(writer, DEFAULT_LINE_BUDGET)
    }

    pub fn with_budget(writer: W, budget: usize) -> Self {
        Self {
            writer,
            line: String::new(),
            budget,
            lines_written: 0,
        }
    }

    pub fn budget(&self) -> usize {
        self.budget
    }

    /// Bytes in the unfinished line
    pub fn pending_len(&self) -> usize {
        self.line.len()
    }

    pub fn is_line_empty(&self) -> bool {
        self.line.is_empty()
    }

    /// Finished lines written so far
    pub fn lines_written(&self) -> usize {
        self.lines_written
    }

    /// Append `group` to the current line
    ///
    /// `header` is called only when the group opens a new line.
    pub fn push_group(&mut self, group: &str, header: impl FnOnce() -> String) -> io::Result<()> {
        if !self.line.is_empty() && self.line.len() + 1 + group.len() > self.budget {
            self.end_line()?;
        }
        if self.line.is_empty() {
            self.line = header();
        }
        if !self.line.is_empty() {
            self.line.push(' ');
        }
        self.line.push_str(group);
        Ok(())
    }

    /// Terminate the current line; does nothing when it is empty
    pub fn end_line(&mut self) -> io::Result<()> {
        if self.line.is_empty() {
            return Ok(());
        }
        if self.line.len() > self.budget {
            tracing::warn!(
                "Command line of {} bytes exceeds the {} byte budget",
                self.line.len(),
                self.budget
            );
        }
        self.writer.write_all(self.line.as_bytes())?;
        self.writer.write_all(b"\n")?;
        self.line.clear();
        self.lines_written += 1;
        Ok(())
    }

    /// End the current line and flush the writer
    pub fn flush(&mut self) -> io::Result<()> {
        self.end_line()?;
        self.writer.flush()
    }

    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    /// Flush and give back the writer
    pub fn into_inner(mut self) -> io::Result<W> {
        self.flush()?;
        Ok(self.writer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output(buffer: CommandBuffer<Vec<u8>>) -> String {
        String::from_utf8(buffer.into_inner().unwrap()).unwrap()
    }

    #[test]
    fn test_header_opens_each_line() {
        let mut buffer = CommandBuffer::new(Vec::new());
        buffer.push_group("x1 m", || "H".to_string()).unwrap();
        buffer.push_group("y2 m", || "H".to_string()).unwrap();
        buffer.end_line().unwrap();
        buffer.push_group("x3 m", || "K".to_string()).unwrap();
        assert_eq!(output(buffer), "H x1 m y2 m\nK x3 m\n");
    }

    #[test]
    fn test_empty_header() {
        let mut buffer = CommandBuffer::new(Vec::new());
        buffer.push_group("s1 d2", String::new).unwrap();
        assert_eq!(output(buffer), "s1 d2\n");
    }

    #[test]
    fn test_end_line_on_empty_line_writes_nothing() {
        let mut buffer = CommandBuffer::new(Vec::new());
        buffer.end_line().unwrap();
        buffer.end_line().unwrap();
        assert_eq!(buffer.lines_written(), 0);
        assert_eq!(output(buffer), "");
    }

    #[test]
    fn test_group_that_fits_exactly() {
        let mut buffer = CommandBuffer::with_budget(Vec::new(), 10);
        buffer.push_group("abcd", || "HH".to_string()).unwrap();
        // "HH abcd" is 7 bytes, " xy" makes exactly 10
        buffer.push_group("xy", || "HH".to_string()).unwrap();
        assert_eq!(buffer.pending_len(), 10);
        assert_eq!(buffer.lines_written(), 0);
    }

    #[test]
    fn test_overflow_by_one_starts_new_line() {
        let mut buffer = CommandBuffer::with_budget(Vec::new(), 10);
        buffer.push_group("abcd", || "HH".to_string()).unwrap();
        buffer.push_group("xyz", || "HH".to_string()).unwrap();
        assert_eq!(buffer.lines_written(), 1);
        assert_eq!(output(buffer), "HH abcd\nHH xyz\n");
    }
}
