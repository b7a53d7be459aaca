//! Optional gzip wrapping shared by all backends.

use std::io::{self, Write};

use flate2::write::GzEncoder;

/// Compression applied to a sink's bytes before they reach the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Compression {
    /// Store bytes as written.
    #[default]
    None,
    /// Gzip the stream.
    Gzip,
}

impl Compression {
    /// File name suffix conventionally used for this compression.
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::None => "",
            Self::Gzip => ".gz",
        }
    }
}

/// Byte-counting writer, tracks what actually reached the backend.
pub(crate) struct Counting<W> {
    inner: W,
    count: u64,
}

impl<W: Write> Counting<W> {
    pub(crate) fn new(inner: W) -> Self {
        Self { inner, count: 0 }
    }

    pub(crate) fn into_parts(self) -> (W, u64) {
        (self.inner, self.count)
    }
}

impl<W: Write> Write for Counting<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let written = self.inner.write(buf)?;
        self.count += written as u64;
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Plain or gzip encoder over a backend writer.
pub(crate) enum Encoder<W: Write> {
    Plain(W),
    Gzip(GzEncoder<W>),
}

impl<W: Write> Encoder<W> {
    pub(crate) fn new(inner: W, compression: Compression) -> Self {
        match compression {
            Compression::None => Self::Plain(inner),
            Compression::Gzip => Self::Gzip(GzEncoder::new(inner, flate2::Compression::default())),
        }
    }

    /// Write the gzip trailer if any and hand back the backend writer, flushed.
    pub(crate) fn finish(self) -> io::Result<W> {
        let mut inner = match self {
            Self::Plain(inner) => inner,
            Self::Gzip(encoder) => encoder.finish()?,
        };
        inner.flush()?;
        Ok(inner)
    }
}

impl<W: Write> Write for Encoder<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::Plain(inner) => inner.write(buf),
            Self::Gzip(encoder) => encoder.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Plain(inner) => inner.flush(),
            Self::Gzip(encoder) => encoder.flush(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use flate2::read::GzDecoder;

    use super::*;

    #[test]
    fn test_plain_encoder_passes_bytes_through() {
        let mut encoder = Encoder::new(Counting::new(Vec::new()), Compression::None);
        encoder.write_all(b"<urlset/>").unwrap();
        let (bytes, count) = encoder.finish().unwrap().into_parts();

        assert_eq!(bytes, b"<urlset/>");
        assert_eq!(count, 9);
    }

    #[test]
    fn test_gzip_encoder_round_trips() {
        let mut encoder = Encoder::new(Counting::new(Vec::new()), Compression::Gzip);
        encoder.write_all(b"<urlset/>").unwrap();
        let (bytes, count) = encoder.finish().unwrap().into_parts();

        assert_eq!(count, bytes.len() as u64);
        let mut decoded = String::new();
        GzDecoder::new(bytes.as_slice())
            .read_to_string(&mut decoded)
            .unwrap();
        assert_eq!(decoded, "<urlset/>");
    }

    #[test]
    fn test_extension() {
        assert_eq!(Compression::None.extension(), "");
        assert_eq!(Compression::Gzip.extension(), ".gz");
    }
}
