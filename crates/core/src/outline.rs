//! Tab-indented outline parsing.
//!
//! Each non-blank line of an outline carries one classification entry:
//!
//! ```text
//! I Certain infectious and parasitic diseases
//! \tA00-A09 Intestinal infectious diseases
//! \t\tA00 Cholera
//! ```
//!
//! The number of leading tab characters is the entry's depth. The remainder is split on
//! whitespace runs (including non-breaking spaces): the first token is the code and the
//! remaining tokens, rejoined with single spaces, are the description.
//!
//! [`OutlineReader`] consumes its source line by line and cannot be rewound.

use crate::constants::OUTLINE_INDENT;
use crate::error::{CodeError, CodeResult};
use hms_types::NonEmptyText;
use std::borrow::Cow;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::iter::FusedIterator;
use std::path::Path;

const BYTE_ORDER_MARK: char = '\u{feff}';

/// One parsed outline line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlineEntry {
    /// 1-based line number in the source, counting blank lines.
    pub line_number: usize,
    /// Number of leading tabs; 0 for chapters.
    pub depth: usize,
    pub code: NonEmptyText,
    pub description: NonEmptyText,
}

/// Parses a single raw line.
///
/// Returns `None` for blank lines, which carry no entry and are not reported.
///
/// # Errors
///
/// Yields [`CodeError::MalformedLine`] when the line has a code but no description.
pub fn parse_line(line_number: usize, raw: &str) -> Option<CodeResult<OutlineEntry>> {
    if raw.trim().is_empty() {
        return None;
    }

    let depth = raw.chars().take_while(|c| *c == OUTLINE_INDENT).count();

    let mut tokens = raw.split_whitespace();
    let code = tokens.next().map(NonEmptyText::new);
    let description = NonEmptyText::new(tokens.collect::<Vec<_>>().join(" "));

    match (code, description) {
        (Some(Ok(code)), Ok(description)) => Some(Ok(OutlineEntry {
            line_number,
            depth,
            code,
            description,
        })),
        _ => Some(Err(CodeError::MalformedLine {
            line_number,
            depth,
            line: raw.to_string(),
        })),
    }
}

/// Lazy, single-pass reader over an outline source.
///
/// Yields one item per non-blank line in file order. Bytes that are not valid UTF-8 are
/// replaced with U+FFFD and the line is still parsed. A read error is yielded once and
/// ends the sequence.
pub struct OutlineReader<R> {
    reader: R,
    buf: Vec<u8>,
    line_number: usize,
    finished: bool,
}

impl<R: BufRead> OutlineReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::new(),
            line_number: 0,
            finished: false,
        }
    }

    /// Number of source lines consumed so far, blank lines included.
    pub fn lines_consumed(&self) -> usize {
        self.line_number
    }
}

fn strip_line_ending(bytes: &[u8]) -> &[u8] {
    let bytes = bytes.strip_suffix(b"\n").unwrap_or(bytes);
    bytes.strip_suffix(b"\r").unwrap_or(bytes)
}

impl OutlineReader<BufReader<File>> {
    /// Opens an outline file for reading.
    ///
    /// # Errors
    ///
    /// Returns [`CodeError::OutlineOpen`] if the file cannot be opened.
    pub fn open(path: &Path) -> CodeResult<Self> {
        let file = File::open(path).map_err(|source| CodeError::OutlineOpen {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead> Iterator for OutlineReader<R> {
    type Item = CodeResult<OutlineEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        loop {
            self.buf.clear();
            match self.reader.read_until(b'\n', &mut self.buf) {
                Ok(0) => {
                    self.finished = true;
                    return None;
                }
                Ok(_) => {}
                Err(e) => {
                    self.finished = true;
                    return Some(Err(CodeError::OutlineRead(e)));
                }
            }
            self.line_number += 1;

            let decoded = String::from_utf8_lossy(strip_line_ending(&self.buf));
            if let Cow::Owned(_) = decoded {
                tracing::warn!(
                    "Line {} is not valid UTF-8, undecodable bytes replaced",
                    self.line_number
                );
            }

            let line: &str = &decoded;
            let raw = if self.line_number == 1 {
                line.strip_prefix(BYTE_ORDER_MARK).unwrap_or(line)
            } else {
                line
            };

            if let Some(item) = parse_line(self.line_number, raw) {
                return Some(item);
            }
        }
    }
}

impl<R: BufRead> FusedIterator for OutlineReader<R> {}
