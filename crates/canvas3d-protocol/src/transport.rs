//! Newline-framed text transport over a pair of byte streams.

use std::io::{BufRead, BufReader, BufWriter, Read, Write};

use crate::error::TransportError;

/// Reads and writes newline-terminated lines over a reader/writer pair.
///
/// The writer half can be closed independently so the peer observes
/// end-of-input while replies can still be drained.
pub struct LineTransport<R, W: Write> {
    reader: BufReader<R>,
    writer: Option<BufWriter<W>>,
}

impl<R: Read, W: Write> LineTransport<R, W> {
    /// Creates a transport reading from `reader` and writing to `writer`.
    #[must_use]
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            reader: BufReader::new(reader),
            writer: Some(BufWriter::new(writer)),
        }
    }

    /// Writes `line` followed by `\n` and flushes.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::InputClosed`] after [`Self::close_input`],
    /// or [`TransportError::Io`] if writing fails.
    pub fn send_line(&mut self, line: &str) -> Result<(), TransportError> {
        let writer = self.writer.as_mut().ok_or(TransportError::InputClosed)?;
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    }

    /// Blocks until one line arrives and returns it without its terminator.
    ///
    /// A line that is not UTF-8 is still consumed whole, so the next read
    /// starts at the following reply.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::EndOfStream`] when the peer closed its
    /// output, [`TransportError::InvalidUtf8`] for a line that is not text,
    /// or [`TransportError::Io`] if reading fails.
    pub fn receive_line(&mut self) -> Result<String, TransportError> {
        let mut bytes = Vec::new();
        let bytes_read = self.reader.read_until(b'\n', &mut bytes)?;
        if bytes_read == 0 {
            return Err(TransportError::EndOfStream);
        }
        while bytes.last().is_some_and(|byte| matches!(byte, b'\n' | b'\r')) {
            bytes.pop();
        }
        Ok(String::from_utf8(bytes)?)
    }

    /// Flushes and closes the writer half.
    pub fn close_input(&mut self) {
        if let Some(mut writer) = self.writer.take() {
            // The peer may already be gone; closing proceeds regardless.
            drop(writer.flush());
        }
    }

    /// Whether the writer half is still open.
    #[must_use]
    pub const fn is_input_open(&self) -> bool {
        self.writer.is_some()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use rstest::rstest;

    use super::*;

    fn transport(input: &str) -> LineTransport<Cursor<Vec<u8>>, Vec<u8>> {
        LineTransport::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    #[rstest]
    #[case("<ok/>\n", "<ok/>")]
    #[case("<ok/>\r\n", "<ok/>")]
    #[case("<ok/>", "<ok/>")]
    fn receives_one_line_without_terminator(#[case] input: &str, #[case] expected: &str) {
        let mut transport = transport(input);
        assert_eq!(transport.receive_line().expect("line"), expected);
    }

    #[test]
    fn receives_lines_in_order() {
        let mut transport = transport("<ok/>\n<error msg=\"x\"/>\n");
        assert_eq!(transport.receive_line().expect("first"), "<ok/>");
        assert_eq!(transport.receive_line().expect("second"), "<error msg=\"x\"/>");
    }

    #[test]
    fn non_utf8_line_is_consumed_and_reported() {
        let mut transport = LineTransport::new(
            Cursor::new(b"<ok msg=\"\xff\"/>\n<ok/>\n".to_vec()),
            Vec::new(),
        );
        assert!(matches!(
            transport.receive_line(),
            Err(TransportError::InvalidUtf8(_))
        ));
        assert_eq!(transport.receive_line().expect("next line"), "<ok/>");
    }

    #[test]
    fn reports_end_of_stream() {
        let mut transport = transport("");
        assert!(matches!(
            transport.receive_line(),
            Err(TransportError::EndOfStream)
        ));
    }

    #[test]
    fn send_after_close_is_rejected() {
        let mut transport = transport("");
        transport.send_line("showLayer id=\"a\"").expect("send");
        transport.close_input();
        assert!(!transport.is_input_open());
        assert!(matches!(
            transport.send_line("hideLayer id=\"a\""),
            Err(TransportError::InputClosed)
        ));
    }
}
