//! Indenting output sink

use std::io::{self, Write};

/// One level of indentation.
const INDENT: &[u8] = b"  ";

/// A writer that indents every line by the current depth.
///
/// Indentation is emitted lazily: only when a byte follows a newline, and only
/// right before that byte. Everything written reaches the inner writer in
/// order. The writer tracks the last byte seen across calls so a line that
/// ends in one `write` is indented correctly in the next.
pub struct IndentWriter<W> {
    inner: W,
    depth: usize,
    last: u8,
    line: usize,
    written: usize,
}

impl<W: Write> IndentWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            depth: 0,
            // the first line counts as freshly started
            last: b'\n',
            line: 0,
            written: 0,
        }
    }

    pub fn indent(&mut self) {
        self.depth += 1;
    }

    pub fn dedent(&mut self) {
        self.depth = self
            .depth
            .checked_sub(1)
            .expect("dedent without matching indent");
    }

    /// Current line number, counting from 0.
    pub fn line(&self) -> usize {
        self.line
    }

    /// Bytes accepted by the inner writer so far, indentation included.
    pub fn written(&self) -> usize {
        self.written
    }

    pub fn into_inner(self) -> W {
        self.inner
    }

    /// Pass `chunk` to the inner writer, counting what it accepts.
    ///
    /// `Interrupted` is retried, as `Write::write_all` does. Any other error,
    /// or a write that accepts nothing, ends the call.
    fn emit(&mut self, chunk: &[u8]) -> io::Result<()> {
        let mut rest = chunk;
        while !rest.is_empty() {
            match self.inner.write(rest) {
                Ok(0) => return Err(io::Error::from(io::ErrorKind::WriteZero)),
                Ok(n) => {
                    self.written += n;
                    rest = &rest[n..];
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }
}

impl<W: Write> Write for IndentWriter<W> {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        // invariant: data[..start] has been passed through
        let mut start = 0;
        for (i, &b) in data.iter().enumerate() {
            if b == b'\n' {
                self.emit(&data[start..=i])?;
                start = i + 1;
                self.line += 1;
            } else if self.last == b'\n' {
                for _ in 0..self.depth {
                    self.emit(INDENT)?;
                }
            }
            self.last = b;
        }
        self.emit(&data[start..])?;
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}
