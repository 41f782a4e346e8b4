//! Newline-delimited JSON encoding of shipped messages.

use std::io;

use chrono::{SecondsFormat, Utc};
use serde::Serialize;

/// A line awaiting transmission, as handed over by a producer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingMessage {
    pub line: String,
    pub level: Option<String>,
}

impl PendingMessage {
    pub fn new(line: impl Into<String>) -> Self {
        Self {
            line: line.into(),
            level: None,
        }
    }

    pub fn with_level(level: impl Into<String>, line: impl Into<String>) -> Self {
        Self {
            line: line.into(),
            level: Some(level.into()),
        }
    }
}

#[derive(Serialize)]
struct WireRecord<'a> {
    #[serde(rename = "type")]
    source_type: &'a str,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    loglevel: Option<&'a str>,
    #[serde(rename = "@timestamp", skip_serializing_if = "Option::is_none")]
    timestamp: Option<String>,
}

/// Current UTC time in the RFC 3339 form Logstash expects.
fn send_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Encode a message as one newline-terminated JSON object.
///
/// The line is trimmed of surrounding whitespace. When `include_timestamp` is
/// set the timestamp is taken now, so callers must encode at send time.
pub fn encode_line(
    source_type: &str,
    message: &PendingMessage,
    include_timestamp: bool,
) -> io::Result<Vec<u8>> {
    let record = WireRecord {
        source_type,
        message: message.line.trim(),
        loglevel: message.level.as_deref(),
        timestamp: include_timestamp.then(send_timestamp),
    };
    let mut buf = Vec::with_capacity(record.message.len() + source_type.len() + 32);
    serde_json::to_writer(&mut buf, &record).map_err(io::Error::other)?;
    buf.push(b'\n');
    Ok(buf)
}

/// Reject encoded lines larger than `max_size`.
pub fn check_size(line: Vec<u8>, max_size: usize) -> io::Result<Vec<u8>> {
    if line.len() > max_size {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("encoded line of {} bytes exceeds {max_size}", line.len()),
        ));
    }
    Ok(line)
}
