//! Line-based codec for tokio.
//!
//! Reads LF-terminated lines (CRLF accepted) and writes pre-rendered lines.
//! A bad line (too long, not UTF-8, carrying NUL) is handed to the reader as
//! an `Err` item instead of failing the stream, so one malformed line never
//! tears down a connection.

use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder};

use crate::error::{self, ProtocolError};

/// One decoded line, or the reason it was dropped.
pub type DecodedLine = Result<String, ProtocolError>;

/// Default maximum line length including CRLF.
pub const DEFAULT_MAX_LINE_LEN: usize = 512;

/// Newline-delimited codec with a length limit.
#[derive(Debug)]
pub struct LineCodec {
    /// Index of next byte to check for newline
    next_index: usize,
    max_len: usize,
    /// Set while skipping the rest of an over-long line.
    discarding: bool,
}

impl Default for LineCodec {
    fn default() -> Self {
        Self::with_max_len(DEFAULT_MAX_LINE_LEN)
    }
}

impl LineCodec {
    /// Codec with a custom maximum line length.
    pub fn with_max_len(max_len: usize) -> Self {
        Self {
            next_index: 0,
            max_len,
            discarding: false,
        }
    }

    fn check_line(raw: &[u8]) -> DecodedLine {
        let text = std::str::from_utf8(raw)
            .map_err(|e| ProtocolError::InvalidUtf8 {
                byte_pos: e.valid_up_to(),
            })?
            .trim_end_matches(['\r', '\n']);
        if let Some(ch) = text.chars().find(|&c| c == '\0') {
            return Err(ProtocolError::IllegalControlChar(ch));
        }
        Ok(text.to_string())
    }
}

impl Decoder for LineCodec {
    type Item = DecodedLine;
    type Error = ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> error::Result<Option<DecodedLine>> {
        loop {
            let Some(offset) = src[self.next_index..].iter().position(|b| *b == b'\n') else {
                if src.len() > self.max_len {
                    // Drop what we have and skip until the next newline.
                    let actual = src.len();
                    src.clear();
                    self.next_index = 0;
                    let first = !self.discarding;
                    self.discarding = true;
                    if first {
                        return Ok(Some(Err(ProtocolError::MessageTooLong {
                            actual,
                            limit: self.max_len,
                        })));
                    }
                } else {
                    self.next_index = src.len();
                }
                return Ok(None);
            };

            let line = src.split_to(self.next_index + offset + 1);
            self.next_index = 0;

            if self.discarding {
                // Tail of a line that was already reported.
                self.discarding = false;
                continue;
            }

            if line.len() > self.max_len {
                return Ok(Some(Err(ProtocolError::MessageTooLong {
                    actual: line.len(),
                    limit: self.max_len,
                })));
            }

            return Ok(Some(Self::check_line(&line)));
        }
    }
}

impl Encoder<String> for LineCodec {
    type Error = ProtocolError;

    fn encode(&mut self, line: String, dst: &mut BytesMut) -> error::Result<()> {
        dst.extend_from_slice(line.as_bytes());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_all(codec: &mut LineCodec, buf: &mut BytesMut) -> Vec<DecodedLine> {
        let mut out = Vec::new();
        while let Some(item) = codec.decode(buf).unwrap() {
            out.push(item);
        }
        out
    }

    #[test]
    fn splits_crlf_and_lf_lines() {
        let mut codec = LineCodec::default();
        let mut buf = BytesMut::from("NICK alice\r\nUSER a 0 * :A\nPING x");
        let lines: Vec<String> = decode_all(&mut codec, &mut buf)
            .into_iter()
            .map(|l| l.unwrap())
            .collect();
        assert_eq!(lines, vec!["NICK alice", "USER a 0 * :A"]);
        assert_eq!(&buf[..], b"PING x");

        buf.extend_from_slice(b"\r\n");
        assert_eq!(codec.decode(&mut buf).unwrap().unwrap().unwrap(), "PING x");
    }

    #[test]
    fn overlong_line_is_reported_once_and_skipped() {
        let mut codec = LineCodec::with_max_len(16);
        let mut buf = BytesMut::from(&b"PRIVMSG #c :aaaaaaaaaaaaaaaaaaaa"[..]);
        let first = codec.decode(&mut buf).unwrap();
        assert!(matches!(first, Some(Err(ProtocolError::MessageTooLong { .. }))));

        buf.extend_from_slice(b"bbbbbbbbbbbbbbbbbbbbbbbb");
        assert!(codec.decode(&mut buf).unwrap().is_none());

        buf.extend_from_slice(b"\r\nPING ok\r\n");
        assert_eq!(codec.decode(&mut buf).unwrap().unwrap().unwrap(), "PING ok");
    }

    #[test]
    fn complete_overlong_line_is_rejected() {
        let mut codec = LineCodec::with_max_len(8);
        let mut buf = BytesMut::from("PRIVMSG x\r\nPING\r\n");
        let items = decode_all(&mut codec, &mut buf);
        assert!(matches!(items[0], Err(ProtocolError::MessageTooLong { .. })));
        assert_eq!(items[1].as_deref().unwrap(), "PING");
    }

    #[test]
    fn invalid_utf8_does_not_poison_stream() {
        let mut codec = LineCodec::default();
        let mut buf = BytesMut::from(&b"NICK \xff\xfe\r\nNICK ok\r\n"[..]);
        let items = decode_all(&mut codec, &mut buf);
        assert!(matches!(items[0], Err(ProtocolError::InvalidUtf8 { byte_pos: 5 })));
        assert_eq!(items[1].as_deref().unwrap(), "NICK ok");
    }

    #[test]
    fn encoder_writes_bytes_verbatim() {
        let mut codec = LineCodec::default();
        let mut dst = BytesMut::new();
        codec.encode(":s 001 a :hi\r\n".to_string(), &mut dst).unwrap();
        assert_eq!(&dst[..], b":s 001 a :hi\r\n");
    }
}
