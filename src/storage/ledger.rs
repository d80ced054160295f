//! Line-oriented reader for ledger files
//!
//! A ledger is a text file whose first non-blank line is the record count,
//! followed by that many record lines of the form `(id,balance)`. Malformed
//! input is a hard error carrying the offending line number.

use std::fs::File;
use std::io::{BufRead, BufReader, Seek, SeekFrom};
use std::path::Path;

use crate::core::error::{PorError, Result};

/// One ledger record: the parsed id plus the raw line text, which is what
/// gets stored and hashed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub id: u64,
    pub text: String,
}

/// Sequential reader over a ledger file
#[derive(Debug)]
pub struct LedgerReader {
    reader: BufReader<File>,
    record_count: u64,
    line_no: usize,
}

impl LedgerReader {
    /// Open a ledger and parse its count line
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let mut ledger = Self {
            reader: BufReader::new(file),
            record_count: 0,
            line_no: 0,
        };
        ledger.record_count = ledger.read_count()?;
        Ok(ledger)
    }

    /// Number of records the count line declares
    pub fn record_count(&self) -> u64 {
        self.record_count
    }

    /// Read and parse the next record line
    pub fn next_record(&mut self) -> Result<Record> {
        let text = self.next_line()?;
        match parse_record(&text) {
            Some((id, _)) => Ok(Record { id, text }),
            None => Err(PorError::ledger(
                self.line_no,
                format!("expected a record of the form (id,balance), found {text:?}"),
            )),
        }
    }

    /// Seek back to the first record line
    pub fn rewind(&mut self) -> Result<()> {
        self.reader.seek(SeekFrom::Start(0))?;
        self.line_no = 0;
        self.read_count()?;
        Ok(())
    }

    /// Skip blank lines, then parse the count line
    fn read_count(&mut self) -> Result<u64> {
        loop {
            let line = self.next_line()?;
            let text = line.trim();
            if text.is_empty() {
                continue;
            }
            return text.parse().map_err(|_| {
                PorError::ledger(
                    self.line_no,
                    format!("expected the record count, found {text:?}"),
                )
            });
        }
    }

    /// Next line with the trailing newline (and a CR before it) removed
    fn next_line(&mut self) -> Result<String> {
        let mut line = String::new();
        let read = self.reader.read_line(&mut line).map_err(|err| {
            if err.kind() == std::io::ErrorKind::InvalidData {
                PorError::ledger(self.line_no + 1, "line is not valid UTF-8")
            } else {
                PorError::Io(err)
            }
        })?;
        if read == 0 {
            return Err(PorError::ledger(self.line_no + 1, "unexpected end of file"));
        }
        self.line_no += 1;
        if line.ends_with('\n') {
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }
        }
        Ok(line)
    }
}

/// Parse record text of the form `(id,balance)`
///
/// Whitespace around the id and balance is tolerated; anything else,
/// including trailing junk after the closing parenthesis, is rejected.
pub fn parse_record(text: &str) -> Option<(u64, i64)> {
    let rest = text.trim_start().strip_prefix('(')?;
    let (id_text, rest) = rest.split_once(',')?;
    let balance_text = rest.trim_end().strip_suffix(')')?;
    let id = id_text.trim().parse().ok()?;
    let balance = balance_text.trim().parse().ok()?;
    Some((id, balance))
}
