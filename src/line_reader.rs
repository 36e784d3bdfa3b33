use anyhow::Result;
use std::io::BufRead;

/// Reads a text file line by line, skipping blank lines and `#` comments.
pub struct LineReader<'a> {
    reader: &'a mut dyn BufRead,
    line_no: usize,
    line: String,
}

impl<'a> LineReader<'a> {
    pub fn new(reader: &'a mut (dyn BufRead + 'a)) -> Self {
        LineReader::<'a> {
            reader,
            line_no: 0,
            line: String::new(),
        }
    }

    pub fn get_last_line_number(&self) -> usize {
        self.line_no
    }

    /// The last line read, without its comment and surrounding whitespace.
    pub fn get_last_line(&self) -> &str {
        match self.line.split_once('#') {
            Some((content, _)) => content.trim(),
            None => self.line.trim(),
        }
    }

    /// Returns false at the end of the input.
    pub fn next_line_raw(&mut self) -> Result<bool> {
        self.line.clear();
        if self.reader.read_line(&mut self.line)? == 0 {
            return Ok(false);
        }
        if self.line.ends_with('\n') {
            self.line.pop();
            if self.line.ends_with('\r') {
                self.line.pop();
            }
        }
        self.line_no += 1;
        Ok(true)
    }

    /// Moves to the next line with content. Returns false at the end of the input.
    pub fn next_line(&mut self) -> Result<bool> {
        while self.next_line_raw()? {
            if !self.get_last_line().is_empty() {
                return Ok(true);
            }
        }
        Ok(false)
    }
}
