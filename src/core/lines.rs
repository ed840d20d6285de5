// LogMerge - core/lines.rs
//
// Byte-oriented line reader with an explicit per-line ceiling.
//
// `BufRead::read_until` alone would grow without bound on a file with no
// newlines; wrapping each read in `take` caps the buffer at the configured
// limit and turns an over-long line into an InvalidData error instead.

use std::io::{self, BufRead, Read};

/// Reads `\n`-terminated lines as byte slices, reusing one buffer.
///
/// The terminator (`\n` or `\r\n`) is stripped. A final line without a
/// terminator keeps its content but loses a trailing `\r`.
pub struct LineReader<R> {
    inner: R,
    buf: Vec<u8>,
    max_line_bytes: usize,
    lines_read: u64,
}

impl<R: BufRead> LineReader<R> {
    pub fn new(inner: R, max_line_bytes: usize) -> Self {
        Self {
            inner,
            buf: Vec::new(),
            max_line_bytes,
            lines_read: 0,
        }
    }

    /// Next line without its terminator, or `None` at end of input.
    ///
    /// Fails with `InvalidData` if the line content exceeds the limit.
    pub fn next_line(&mut self) -> io::Result<Option<&[u8]>> {
        self.buf.clear();

        // Room for the content plus a two-byte "\r\n" terminator.
        let budget = self.max_line_bytes as u64 + 2;
        let read = (&mut self.inner)
            .take(budget)
            .read_until(b'\n', &mut self.buf)?;
        if read == 0 {
            return Ok(None);
        }

        if self.buf.last() == Some(&b'\n') {
            self.buf.pop();
        }
        if self.buf.last() == Some(&b'\r') {
            self.buf.pop();
        }

        if self.buf.len() > self.max_line_bytes {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "line {} exceeds the maximum length of {} bytes",
                    self.lines_read + 1,
                    self.max_line_bytes
                ),
            ));
        }

        self.lines_read += 1;
        Ok(Some(&self.buf))
    }
}
