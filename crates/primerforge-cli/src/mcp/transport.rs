use crate::error::{CliError, Result};
use serde_json::Value;
use std::io::{BufRead, Read, Write};

/// How a message arrived. Replies are written back the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Framing {
    /// One JSON document per line.
    Line,
    /// LSP-style `Content-Length` header block followed by the body.
    ContentLength,
}

#[derive(Debug)]
pub enum Incoming {
    Message(Value, Framing),
    /// Body that was not valid JSON; answered with a parse error.
    Malformed(String, Framing),
}

const CONTENT_LENGTH: &str = "content-length:";

/// Largest `Content-Length` body accepted.
pub const MAX_MESSAGE_BYTES: usize = 16 * 1024 * 1024;

pub fn read_message<R: BufRead>(reader: &mut R) -> Result<Option<Incoming>> {
    let mut content_length: Option<usize> = None;

    loop {
        let mut line = String::new();
        let bytes_read = reader.read_line(&mut line)?;
        if bytes_read == 0 {
            return if content_length.is_some() {
                Err(CliError::Protocol(
                    "Unexpected EOF while reading message headers".to_string(),
                ))
            } else {
                Ok(None)
            };
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            if content_length.is_some() {
                break;
            }
            continue;
        }

        if content_length.is_none() && (trimmed.starts_with('{') || trimmed.starts_with('[')) {
            return Ok(Some(decode(trimmed.as_bytes(), Framing::Line)));
        }

        let lowered = trimmed.to_ascii_lowercase();
        if let Some(value) = lowered.strip_prefix(CONTENT_LENGTH) {
            let len = value.trim().parse::<usize>().map_err(|e| {
                CliError::Protocol(format!("Invalid Content-Length header '{trimmed}': {e}"))
            })?;
            if len > MAX_MESSAGE_BYTES {
                return Err(CliError::Protocol(format!(
                    "Content-Length {len} exceeds the {MAX_MESSAGE_BYTES} byte limit"
                )));
            }
            content_length = Some(len);
        } else if content_length.is_none() && !trimmed.contains(':') {
            return Ok(Some(Incoming::Malformed(
                format!("Unrecognized input line: '{trimmed}'"),
                Framing::Line,
            )));
        }
    }

    let len = content_length
        .ok_or_else(|| CliError::Protocol("Missing Content-Length header".to_string()))?;
    let mut body = Vec::with_capacity(len);
    reader.by_ref().take(len as u64).read_to_end(&mut body)?;
    if body.len() < len {
        return Ok(Some(Incoming::Malformed(
            format!("Message body ended after {} of {len} bytes", body.len()),
            Framing::ContentLength,
        )));
    }
    Ok(Some(decode(&body, Framing::ContentLength)))
}

fn decode(body: &[u8], framing: Framing) -> Incoming {
    match serde_json::from_slice::<Value>(body) {
        Ok(value) => Incoming::Message(value, framing),
        Err(e) => Incoming::Malformed(format!("Could not parse JSON payload: {e}"), framing),
    }
}

pub fn write_message<W: Write>(writer: &mut W, payload: &Value, framing: Framing) -> Result<()> {
    let body = serde_json::to_vec(payload).map_err(|e| CliError::Other(e.into()))?;
    match framing {
        Framing::Line => {
            writer.write_all(&body)?;
            writer.write_all(b"\n")?;
        }
        Framing::ContentLength => {
            writer.write_all(format!("Content-Length: {}\r\n\r\n", body.len()).as_bytes())?;
            writer.write_all(&body)?;
        }
    }
    writer.flush()?;
    Ok(())
}
