use crate::line::Line;

use std::{
    error::Error,
    io::{self, Write},
};

/// A trait for connections which can transmit one protocol line at a time.
pub trait Transmit {
    /// Error returned when a write fails.
    type Error: Error;

    /// Writes `line` followed by the stream's terminator, blocking until the
    /// underlying write completes.
    fn transmit(&mut self, line: &Line) -> Result<(), Self::Error>;
}

/// Line framing over any blocking writer, e.g. a TCP stream.
///
/// Each line is written as its UTF-8 bytes followed by CRLF, then flushed
/// before the call returns.
#[derive(Debug)]
pub struct LineTransmitter<W> {
    writer: W,
}

impl<W: Write> LineTransmitter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Consumes the transmitter, returning the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> Transmit for LineTransmitter<W> {
    type Error = TxError;

    fn transmit(&mut self, line: &Line) -> Result<(), TxError> {
        self.writer.write_all(line.as_str().as_bytes())?;
        self.writer.write_all(b"\r\n")?;
        self.writer.flush()?;
        Ok(())
    }
}

/// Errors which can occur when transmitting a line.
#[derive(Debug, thiserror::Error)]
pub enum TxError {
    /// The underlying writer failed.
    #[error(transparent)]
    Io(#[from] io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    struct BrokenWriter;

    impl Write for BrokenWriter {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "peer went away"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn lines_are_terminated_with_crlf() {
        let mut transmitter = LineTransmitter::new(Vec::new());
        transmitter.transmit(&Line::new("PING :tmi.twitch.tv")).unwrap();
        transmitter.transmit(&Line::new("PRIVMSG #foo :hi")).unwrap();
        assert_eq!(
            transmitter.into_inner(),
            b"PING :tmi.twitch.tv\r\nPRIVMSG #foo :hi\r\n"
        );
    }

    #[test]
    fn writer_failures_surface_as_io_errors() {
        let mut transmitter = LineTransmitter::new(BrokenWriter);
        let err = transmitter.transmit(&Line::new("PING :x")).unwrap_err();
        assert!(matches!(err, TxError::Io(e) if e.kind() == io::ErrorKind::BrokenPipe));
    }
}
