use std::io::{self, Read, Write};
use std::net::TcpStream;

use super::error::ProbeError;
use super::types::SmtpReply;

fn is_code_byte(byte: u8) -> bool {
    byte.is_ascii_digit()
}

/// A plain-text SMTP conversation over one TCP stream.
///
/// Inbound bytes are buffered until a full CRLF-terminated line is
/// available, so partial reads and several replies merged into one TCP
/// segment both resolve into clean per-reply events. Replies whose first
/// line carries `NNN-` continuation markers are collected into a single
/// [`SmtpReply`]. Lines that do not look like an SMTP status at all are
/// passed through as single-line replies; classifying them is the caller's
/// business, not a stream error.
pub(crate) struct SmtpStream {
    stream: TcpStream,
    buffer: Vec<u8>,
}

impl SmtpStream {
    pub(crate) fn new(stream: TcpStream) -> Self {
        Self {
            stream,
            buffer: Vec::new(),
        }
    }

    pub(crate) fn send_command(&mut self, command: &str) -> Result<(), ProbeError> {
        let mut data = command.as_bytes().to_vec();
        data.extend_from_slice(b"\r\n");
        self.stream.write_all(&data).map_err(ProbeError::io)?;
        self.stream.flush().map_err(ProbeError::io)
    }

    pub(crate) fn read_reply(&mut self) -> Result<SmtpReply, ProbeError> {
        let mut lines = Vec::new();
        loop {
            let line = self.read_line()?;
            let more = is_continuation(&line);
            lines.push(line);
            if !more {
                break;
            }
        }
        Ok(SmtpReply::new(lines))
    }

    fn read_line(&mut self) -> Result<String, ProbeError> {
        loop {
            if let Some(pos) = self.buffer.iter().position(|byte| *byte == b'\n') {
                let mut line: Vec<u8> = self.buffer.drain(..=pos).collect();
                if line.ends_with(b"\r\n") {
                    line.truncate(line.len() - 2);
                } else if line.ends_with(b"\n") {
                    line.truncate(line.len() - 1);
                }
                return Ok(String::from_utf8_lossy(&line).into_owned());
            }

            let mut buf = [0u8; 512];
            let read = self.stream.read(&mut buf).map_err(ProbeError::io)?;
            if read == 0 {
                return Err(ProbeError::io(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "connection closed while reading reply",
                )));
            }
            self.buffer.extend_from_slice(&buf[..read]);
        }
    }
}

/// `NNN-text` marks a continuation line; anything else ends the reply.
fn is_continuation(line: &str) -> bool {
    let bytes = line.as_bytes();
    bytes.len() >= 4
        && bytes[..3].iter().copied().all(is_code_byte)
        && bytes[3] == b'-'
}
