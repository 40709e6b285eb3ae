//! Streaming mbox record reader
//!
//! Splits an mbox archive into raw records one at a time. A record starts
//! at a `From ` separator line that is either the first line of the file or
//! follows an empty line. Body lines quoted as `>From ` (any number of `>`)
//! lose one level of quoting.

use chrono::{DateTime, NaiveDateTime, Utc};
use std::io::{self, BufRead, BufReader, Read};

const SEPARATOR: &[u8] = b"From ";

/// Format of the date on a `From ` separator line, e.g. `Wed Dec 25 12:00:00 2024`
const SEPARATOR_DATE_FORMAT: &str = "%a %b %d %H:%M:%S %Y";

/// One raw record of an mbox archive
#[derive(Debug)]
pub struct MboxRecord {
    /// 1-based position in the archive
    pub index: u64,
    /// Line number of the `From ` separator
    pub line: u64,
    /// Envelope sender from the separator line
    pub sender: String,
    /// Date from the separator line
    pub separator_date: Option<DateTime<Utc>>,
    /// Headers and body, unquoted
    pub content: Vec<u8>,
    /// The record exceeded the size limit and `content` was discarded
    pub oversized: bool,
}

pub struct MboxReader<R: Read> {
    reader: BufReader<R>,
    line: Vec<u8>,
    line_number: u64,
    record_count: u64,
    max_record_bytes: usize,
    /// The current line ran past the size limit and was cut short
    truncated: bool,
    started: bool,
    eof: bool,
}

impl<R: Read> MboxReader<R> {
    pub fn new(reader: R, max_record_bytes: usize) -> Self {
        Self {
            reader: BufReader::new(reader),
            line: Vec::new(),
            line_number: 0,
            record_count: 0,
            max_record_bytes,
            truncated: false,
            started: false,
            eof: false,
        }
    }

    /// Read the next record.
    ///
    /// The first call checks that the archive opens with a `From ` separator
    /// (leading blank lines allowed) and fails with `InvalidData` otherwise.
    pub fn read_record(&mut self) -> io::Result<Option<MboxRecord>> {
        if self.eof {
            return Ok(None);
        }

        if !self.started {
            self.started = true;
            loop {
                if !self.next_line()? {
                    self.eof = true;
                    return Ok(None);
                }
                if is_blank(&self.line) {
                    continue;
                }
                if self.line.starts_with(SEPARATOR) {
                    break;
                }
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("line {} is not a From_ separator", self.line_number),
                ));
            }
        }

        // self.line holds the separator of the record being read
        let separator_line = self.line_number;
        let (sender, separator_date) = parse_separator(&String::from_utf8_lossy(&self.line));

        let mut content = Vec::new();
        let mut oversized = false;
        let mut previous_blank = false;

        loop {
            if !self.next_line()? {
                self.eof = true;
                break;
            }

            if previous_blank && self.line.starts_with(SEPARATOR) {
                break;
            }
            previous_blank = is_blank(&self.line);

            if oversized {
                continue;
            }

            let line = unquote(&self.line);
            if self.truncated || content.len() + line.len() > self.max_record_bytes {
                oversized = true;
                content = Vec::new();
                continue;
            }
            content.extend_from_slice(line);
        }

        // The blank line before the next separator belongs to the separator
        while matches!(content.last(), Some(b'\n' | b'\r')) {
            content.pop();
        }
        if !content.is_empty() {
            content.push(b'\n');
        }

        self.record_count += 1;

        Ok(Some(MboxRecord {
            index: self.record_count,
            line: separator_line,
            sender,
            separator_date,
            content,
            oversized,
        }))
    }

    /// Number of records returned so far
    pub fn record_count(&self) -> u64 {
        self.record_count
    }

    /// Read one physical line into `self.line`.
    ///
    /// At most `max_record_bytes + 1` bytes are kept; the rest of a longer
    /// line is consumed and dropped, and `truncated` is set.
    fn next_line(&mut self) -> io::Result<bool> {
        self.line.clear();
        self.truncated = false;
        let keep = self.max_record_bytes.saturating_add(1);
        let mut read_any = false;

        loop {
            let available = match self.reader.fill_buf() {
                Ok(available) => available,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            if available.is_empty() {
                break;
            }
            read_any = true;

            let (used, done) = match available.iter().position(|&b| b == b'\n') {
                Some(end) => (end + 1, true),
                None => (available.len(), false),
            };
            let room = keep.saturating_sub(self.line.len());
            if used > room {
                self.line.extend_from_slice(&available[..room]);
                self.truncated = true;
            } else {
                self.line.extend_from_slice(&available[..used]);
            }
            self.reader.consume(used);

            if done {
                break;
            }
        }

        if !read_any {
            return Ok(false);
        }
        self.line_number += 1;
        Ok(true)
    }
}

fn is_blank(line: &[u8]) -> bool {
    line.iter().all(|b| matches!(b, b'\n' | b'\r'))
}

/// Strip one `>` from an mboxrd-quoted `>From ` line
fn unquote(line: &[u8]) -> &[u8] {
    let quotes = line.iter().take_while(|&&b| b == b'>').count();
    if quotes > 0 && line[quotes..].starts_with(SEPARATOR) {
        &line[1..]
    } else {
        line
    }
}

/// Split `From sender Wed Dec 25 12:00:00 2024` into sender and date
fn parse_separator(line: &str) -> (String, Option<DateTime<Utc>>) {
    let mut parts = line.trim_end().splitn(3, ' ').skip(1);
    let sender = parts.next().unwrap_or_default().trim().to_string();
    let date = parts.next().and_then(parse_separator_date);
    (sender, date)
}

fn parse_separator_date(date: &str) -> Option<DateTime<Utc>> {
    // ctime pads single-digit days with a second space
    let collapsed = date.split_whitespace().collect::<Vec<_>>().join(" ");
    NaiveDateTime::parse_from_str(&collapsed, SEPARATOR_DATE_FORMAT)
        .ok()
        .map(|dt| dt.and_utc())
}
