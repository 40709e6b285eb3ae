use chrono::{DateTime, FixedOffset};
use mail_parser::MessageParser;

use super::reader::MboxRecord;
use crate::error::{Result, SpamGuardError};

/// Fields extracted from one well-formed record
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedMessage {
    pub time: Option<DateTime<FixedOffset>>,
    pub subject: String,
    pub body: String,
}

impl ParsedMessage {
    /// Text handed to the predictor
    pub fn classification_text(&self) -> String {
        format!("{}\n{}", self.subject, self.body)
    }
}

/// Parse a raw record, or explain why it is malformed
pub fn parse_record(record: &MboxRecord) -> Result<ParsedMessage> {
    if record.oversized {
        return Err(SpamGuardError::MalformedRecord(
            "message exceeds the size limit".to_string(),
        ));
    }

    let first_line = record
        .content
        .split(|&b| b == b'\n')
        .find(|line| !line.iter().all(u8::is_ascii_whitespace));
    let Some(first_line) = first_line else {
        return Err(SpamGuardError::MalformedRecord("empty message".to_string()));
    };
    if !is_header_field(first_line) {
        return Err(SpamGuardError::MalformedRecord(
            "message does not start with a header field".to_string(),
        ));
    }

    let message = MessageParser::default()
        .parse(&record.content)
        .ok_or_else(|| SpamGuardError::MalformedRecord("unparsable MIME structure".to_string()))?;

    let time = message
        .date()
        .and_then(to_fixed_offset)
        .or_else(|| record.separator_date.map(DateTime::<FixedOffset>::from));

    let subject = message.subject().unwrap_or_default().trim().to_string();

    let body = (0..)
        .map_while(|i| message.body_text(i))
        .map(|part| part.trim().to_string())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("\n");

    Ok(ParsedMessage { time, subject, body })
}

/// `Name: value` with a non-empty printable-ASCII name
fn is_header_field(line: &[u8]) -> bool {
    match line.iter().position(|&b| b == b':') {
        Some(colon) if colon > 0 => line[..colon].iter().all(|&b| (33..=126).contains(&b)),
        _ => false,
    }
}

fn to_fixed_offset(date: &mail_parser::DateTime) -> Option<DateTime<FixedOffset>> {
    let seconds = (date.tz_hour as i32 * 3600) + (date.tz_minute as i32 * 60);
    let offset = if date.tz_before_gmt {
        FixedOffset::west_opt(seconds)
    } else {
        FixedOffset::east_opt(seconds)
    }?;
    DateTime::from_timestamp(date.to_timestamp(), 0).map(|utc| utc.with_timezone(&offset))
}
