//! Line framing for server-sent event bodies.

/// Collects raw body bytes and hands out complete lines.
///
/// Lines are decoded only once their `\n` has arrived, so a multi-byte
/// character split across two network reads stays intact.
#[derive(Debug, Default)]
pub(crate) struct LineBuffer {
    pending: Vec<u8>,
}

impl LineBuffer {
    pub(crate) fn push(&mut self, bytes: &[u8]) {
        self.pending.extend_from_slice(bytes);
    }

    /// Next complete line, without its `\n` or `\r\n` terminator.
    pub(crate) fn next_line(&mut self) -> Option<String> {
        let end = self.pending.iter().position(|&b| b == b'\n')?;
        let line: Vec<u8> = self.pending.drain(..=end).collect();
        let line = String::from_utf8_lossy(&line[..end]);
        Some(line.trim_end_matches('\r').to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn character_split_across_reads_is_kept_whole() {
        let body = "data: {\"content\":\"Café\"}\n".as_bytes();
        let split = body.iter().position(|&b| b == 0xC3).unwrap() + 1;

        let mut buffer = LineBuffer::default();
        buffer.push(&body[..split]);
        assert_eq!(buffer.next_line(), None);
        buffer.push(&body[split..]);

        assert_eq!(buffer.next_line().as_deref(), Some("data: {\"content\":\"Café\"}"));
        assert_eq!(buffer.next_line(), None);
    }

    #[test]
    fn crlf_and_several_lines_per_read() {
        let mut buffer = LineBuffer::default();
        buffer.push(b"event: ping\r\ndata: 1\n\ndata: 2");

        assert_eq!(buffer.next_line().as_deref(), Some("event: ping"));
        assert_eq!(buffer.next_line().as_deref(), Some("data: 1"));
        assert_eq!(buffer.next_line().as_deref(), Some(""));
        assert_eq!(buffer.next_line(), None);

        buffer.push(b"\n");
        assert_eq!(buffer.next_line().as_deref(), Some("data: 2"));
    }
}
