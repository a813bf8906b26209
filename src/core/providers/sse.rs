//! Line framing for streamed provider responses

/// Splits a byte stream into lines.
///
/// Bytes are buffered until a newline arrives, so multi-byte characters split across
/// network chunks are decoded intact. Trailing `\r` is stripped.
#[derive(Debug, Default)]
pub struct LineBuffer {
    buffer: Vec<u8>,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk and return every line it completes
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(chunk);

        let mut lines = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let mut line: Vec<u8> = self.buffer.drain(..=pos).collect();
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            lines.push(String::from_utf8_lossy(&line).into_owned());
        }
        lines
    }

    /// Remaining partial line at end of stream
    pub fn finish(&mut self) -> Option<String> {
        if self.buffer.is_empty() {
            return None;
        }
        let rest = std::mem::take(&mut self.buffer);
        let line = String::from_utf8_lossy(&rest).trim_end_matches('\r').to_string();
        (!line.trim().is_empty()).then_some(line)
    }
}

/// Payload of an SSE `data:` line; `None` for comments, event names and blank lines
pub fn sse_data(line: &str) -> Option<&str> {
    let data = line.strip_prefix("data:")?;
    let data = data.strip_prefix(' ').unwrap_or(data);
    (!data.trim().is_empty()).then_some(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lines_across_chunks() {
        let mut buffer = LineBuffer::new();
        assert!(buffer.push(b"data: {\"a\"").is_empty());
        assert_eq!(buffer.push(b":1}\r\ndata: x\n\n"), vec!["data: {\"a\":1}", "data: x", ""]);
        assert_eq!(buffer.finish(), None);
    }

    #[test]
    fn test_split_multibyte_character() {
        let mut buffer = LineBuffer::new();
        let bytes = "héllo\n".as_bytes();
        assert!(buffer.push(&bytes[..2]).is_empty());
        assert_eq!(buffer.push(&bytes[2..]), vec!["héllo"]);
    }

    #[test]
    fn test_finish_returns_partial_line() {
        let mut buffer = LineBuffer::new();
        buffer.push(b"{\"done\":true}");
        assert_eq!(buffer.finish().as_deref(), Some("{\"done\":true}"));
    }

    #[test]
    fn test_sse_data() {
        assert_eq!(sse_data("data: {}"), Some("{}"));
        assert_eq!(sse_data("data:[DONE]"), Some("[DONE]"));
        assert_eq!(sse_data("event: message_start"), None);
        assert_eq!(sse_data(": ping"), None);
        assert_eq!(sse_data("data: "), None);
    }
}
