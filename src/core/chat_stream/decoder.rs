//! Line framing and per-frame decoding for server-sent-event bodies.

use memchr::memchr;

use super::error::ChatError;
use super::extract_error_summary;
use crate::api::ChatResponse;

pub const DATA_PREFIX: &str = "data: ";
pub const DONE_SENTINEL: &str = "[DONE]";

/// What one complete line of the body means to the consumer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// A non-empty text increment.
    Delta(String),
    /// The `[DONE]` sentinel.
    Done,
    /// Blank lines, comments, non-data fields and chunks without text.
    Ignored,
}

/// Accumulates raw bytes and yields complete newline-terminated lines.
///
/// A line may arrive split over any number of reads and a single read may
/// carry several lines, so nothing is decoded until its `\n` has been seen.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    buffer: Vec<u8>,
    /// Start of the bytes not yet handed out by `next_line`.
    consumed: usize,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn extend(&mut self, chunk: &[u8]) {
        if self.consumed > 0 {
            self.buffer.drain(..self.consumed);
            self.consumed = 0;
        }
        self.buffer.extend_from_slice(chunk);
    }

    /// Remove and return the next complete line, without its terminator.
    pub fn next_line(&mut self) -> Option<Vec<u8>> {
        let pending = &self.buffer[self.consumed..];
        let newline_pos = memchr(b'\n', pending)?;
        let mut line = &pending[..newline_pos];
        if line.last() == Some(&b'\r') {
            line = &line[..line.len() - 1];
        }
        let line = line.to_vec();
        self.consumed += newline_pos + 1;
        Some(line)
    }

    /// Take whatever unterminated bytes are left once the body has ended.
    pub fn take_remainder(&mut self) -> Option<Vec<u8>> {
        let rest = self.buffer.split_off(self.consumed);
        self.buffer.clear();
        self.consumed = 0;
        if rest.iter().all(u8::is_ascii_whitespace) {
            return None;
        }
        Some(rest)
    }

    #[cfg(test)]
    pub(crate) fn buffered_len(&self) -> usize {
        self.buffer.len() - self.consumed
    }
}

/// Interpret one complete line.
///
/// Returns [`ChatError::MalformedFrame`] for lines that cannot be decoded,
/// including provider error objects sent in place of a chunk; callers skip
/// those and keep reading.
pub fn decode_line(raw: &[u8]) -> Result<Frame, ChatError> {
    let line = std::str::from_utf8(raw)
        .map_err(|err| ChatError::MalformedFrame(format!("invalid UTF-8: {err}")))?;
    let line = line.trim_end();
    if line.trim_start().is_empty() {
        return Ok(Frame::Ignored);
    }

    let Some(payload) = line.strip_prefix(DATA_PREFIX) else {
        return Ok(Frame::Ignored);
    };

    if payload == DONE_SENTINEL {
        return Ok(Frame::Done);
    }

    match serde_json::from_str::<ChatResponse>(payload) {
        Ok(response) => Ok(response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.delta.content)
            .filter(|content| !content.is_empty())
            .map(Frame::Delta)
            .unwrap_or(Frame::Ignored)),
        Err(err) => {
            let provider_message = serde_json::from_str::<serde_json::Value>(payload)
                .ok()
                .filter(|value| value.get("error").is_some())
                .and_then(|value| extract_error_summary(&value));

            Err(ChatError::MalformedFrame(match provider_message {
                Some(message) => format!("provider error frame: {message}"),
                None => format!("{err}: {payload}"),
            }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(decoder: &mut FrameDecoder) -> Vec<String> {
        std::iter::from_fn(|| decoder.next_line())
            .map(|line| String::from_utf8(line).unwrap())
            .collect()
    }

    #[test]
    fn holds_partial_lines_until_newline() {
        let mut decoder = FrameDecoder::new();
        decoder.extend(b"data: {\"cho");
        assert!(decoder.next_line().is_none());
        assert_eq!(decoder.buffered_len(), 11);

        decoder.extend(b"ices\":[]}\r\n\ndata: [DO");
        assert_eq!(drain(&mut decoder), ["data: {\"choices\":[]}", ""]);

        decoder.extend(b"NE]\n");
        assert_eq!(drain(&mut decoder), ["data: [DONE]"]);
        assert_eq!(decoder.buffered_len(), 0);
    }

    #[test]
    fn remainder_skips_trailing_whitespace() {
        let mut decoder = FrameDecoder::new();
        decoder.extend(b"  \r");
        assert!(decoder.take_remainder().is_none());

        decoder.extend(b"data: [DONE]");
        assert_eq!(decoder.take_remainder(), Some(b"data: [DONE]".to_vec()));
        assert_eq!(decoder.buffered_len(), 0);
    }

    #[test]
    fn decode_line_requires_data_prefix_with_space() {
        assert_eq!(
            decode_line(br#"data: {"choices":[{"delta":{"content":"Hello"}}]}"#),
            Ok(Frame::Delta("Hello".to_string()))
        );
        assert_eq!(decode_line(b"data: [DONE]\r"), Ok(Frame::Done));

        for line in [
            r#"data:{"choices":[{"delta":{"content":"Hello"}}]}"#,
            "data:[DONE]",
            r#" data: {"choices":[{"delta":{"content":"Hello"}}]}"#,
        ] {
            assert_eq!(decode_line(line.as_bytes()), Ok(Frame::Ignored), "{line}");
        }
    }

    #[test]
    fn decode_line_ignores_non_text_frames() {
        let ignored: [&[u8]; 6] = [
            b"",
            b"   ",
            b": keep-alive",
            b"event: message",
            br#"data: {"choices":[{"delta":{"role":"assistant"}}]}"#,
            br#"data: {"choices":[{"delta":{"content":""}}]}"#,
        ];
        for line in ignored {
            assert_eq!(decode_line(line), Ok(Frame::Ignored));
        }
        assert_eq!(
            decode_line(br#"data: {"choices":[]}"#),
            Ok(Frame::Ignored)
        );
    }

    #[test]
    fn decode_line_reports_malformed_frames() {
        assert!(matches!(
            decode_line(b"data: {not json"),
            Err(ChatError::MalformedFrame(_))
        ));
        assert!(matches!(
            decode_line(b"data: \xff\xfe"),
            Err(ChatError::MalformedFrame(_))
        ));
        assert!(matches!(
            decode_line(br#"data: {"status":"odd"}"#),
            Err(ChatError::MalformedFrame(_))
        ));
    }

    #[test]
    fn provider_error_frames_are_malformed_not_terminal() {
        let frame = decode_line(br#"data: {"error":{"message":"internal   server error"}}"#);
        assert_eq!(
            frame,
            Err(ChatError::MalformedFrame(
                "provider error frame: internal server error".to_string()
            ))
        );
    }

    #[test]
    fn many_lines_in_one_read_are_taken_in_order() {
        let mut decoder = FrameDecoder::new();
        let body: String = (0..1000).map(|i| format!("line {i}\n")).collect();
        decoder.extend(body.as_bytes());
        decoder.extend(b"tail");

        let lines = drain(&mut decoder);
        assert_eq!(lines.len(), 1000);
        assert_eq!(lines[0], "line 0");
        assert_eq!(lines[999], "line 999");
        assert_eq!(decoder.buffered_len(), 4);

        decoder.extend(b" end\n");
        assert_eq!(drain(&mut decoder), ["tail end"]);
        assert_eq!(decoder.buffered_len(), 0);
    }
}
