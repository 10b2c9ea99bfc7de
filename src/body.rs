use std::fmt::{Debug, Formatter};
use std::io::{Cursor, Read, Seek, SeekFrom};

use bytes::Bytes;

use crate::{Error, Result};

/// A byte stream the signer can read and rewind.
///
/// Anything that is `Read + Seek` qualifies, e.g. `std::fs::File` or
/// `io::Cursor`.
pub trait BodyStream: Read + Seek + Send + Debug {}

impl<T: Read + Seek + Send + Debug> BodyStream for T {}

/// The request body handed to the signer for content hashing.
///
/// The signer only ever reads up to `max_body` bytes and always restores the
/// read position before returning, so the same value can afterwards be
/// consumed in full by the actual transport.
pub enum SigningBody {
    /// No body.
    Empty,
    /// An in-memory body.
    Bytes(Bytes),
    /// A seekable byte stream, e.g. an open file.
    Stream(Box<dyn BodyStream>),
    /// A multipart form that encodes into an internal buffer.
    Multipart(MultipartStream),
}

impl SigningBody {
    /// Wrap a seekable stream.
    pub fn stream(s: impl BodyStream + 'static) -> Self {
        Self::Stream(Box::new(s))
    }

    /// Read up to `max_body` bytes of the body, then restore the read
    /// position so the transport sees an unconsumed body.
    ///
    /// Returns [`ErrorKind::BodyUnsupported`][crate::ErrorKind::BodyUnsupported]
    /// when the stream refuses to be read, and
    /// [`ErrorKind::BodyUnseekable`][crate::ErrorKind::BodyUnseekable] when it
    /// cannot be rewound (e.g. a pipe).
    pub fn read_up_to(&mut self, max_body: usize) -> Result<Bytes> {
        match self {
            Self::Empty => Ok(Bytes::new()),
            Self::Bytes(b) => Ok(b.slice(..b.len().min(max_body))),
            Self::Stream(s) => {
                let mut buf = Vec::new();
                if let Err(e) = (&mut **s).take(max_body as u64).read_to_end(&mut buf) {
                    return Err(match e.kind() {
                        std::io::ErrorKind::Unsupported => {
                            Error::body_unsupported("body stream does not support read")
                                .with_source(e)
                        }
                        _ => Error::unexpected("failed to read body stream").with_source(e),
                    });
                }
                s.seek(SeekFrom::Start(0)).map_err(|e| {
                    Error::body_unseekable("body stream cannot be rewound").with_source(e)
                })?;
                Ok(buf.into())
            }
            Self::Multipart(m) => {
                let buf = m.read_up_to(max_body)?;
                m.reset();
                Ok(buf)
            }
        }
    }

    /// Determine the total body length.
    ///
    /// This is a diagnostic side operation used to report truncation; callers
    /// must treat a [`ErrorKind::BodyLengthUnknown`][crate::ErrorKind::BodyLengthUnknown]
    /// failure as non-fatal and keep the hash they already computed.
    pub fn content_length(&mut self) -> Result<u64> {
        match self {
            Self::Empty => Ok(0),
            Self::Bytes(b) => Ok(b.len() as u64),
            Self::Stream(s) => {
                let mut probe = || -> std::io::Result<u64> {
                    let pos = s.stream_position()?;
                    let end = s.seek(SeekFrom::End(0))?;
                    s.seek(SeekFrom::Start(pos))?;
                    Ok(end)
                };
                probe().map_err(|e| {
                    Error::body_length_unknown("cannot determine body stream length")
                        .with_source(e)
                })
            }
            Self::Multipart(m) => Ok(m.len()),
        }
    }
}

impl Debug for SigningBody {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => f.write_str("SigningBody::Empty"),
            Self::Bytes(b) => write!(f, "SigningBody::Bytes({} bytes)", b.len()),
            Self::Stream(_) => f.write_str("SigningBody::Stream"),
            Self::Multipart(m) => write!(f, "SigningBody::Multipart({:?})", m),
        }
    }
}

impl From<Bytes> for SigningBody {
    fn from(value: Bytes) -> Self {
        Self::Bytes(value)
    }
}

impl From<Vec<u8>> for SigningBody {
    fn from(value: Vec<u8>) -> Self {
        Self::Bytes(value.into())
    }
}

impl From<String> for SigningBody {
    fn from(value: String) -> Self {
        Self::Bytes(value.into_bytes().into())
    }
}

impl From<&str> for SigningBody {
    fn from(value: &str) -> Self {
        Self::Bytes(Bytes::copy_from_slice(value.as_bytes()))
    }
}

impl From<MultipartStream> for SigningBody {
    fn from(value: MultipartStream) -> Self {
        Self::Multipart(value)
    }
}

/// One part of a multipart form.
#[derive(Debug, Clone)]
pub struct Part {
    name: String,
    filename: Option<String>,
    content_type: Option<String>,
    data: Bytes,
}

impl Part {
    /// Create a part with the given field name and content.
    pub fn new(name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            filename: None,
            content_type: None,
            data: data.into(),
        }
    }

    /// Set the filename of this part.
    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    /// Set the content type of this part.
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

/// A `multipart/form-data` body that encodes lazily into an internal buffer.
///
/// Parts are encoded on the first read. The signer reads through the buffer
/// and rewinds it afterwards, which rewinds the whole form; the transport can
/// then read the complete encoding from the start.
pub struct MultipartStream {
    boundary: String,
    parts: Vec<Part>,
    buffer: Option<Cursor<Vec<u8>>>,
}

impl Default for MultipartStream {
    fn default() -> Self {
        Self::new()
    }
}

impl MultipartStream {
    /// Create an empty form with a random boundary.
    pub fn new() -> Self {
        Self {
            boundary: uuid::Uuid::new_v4().simple().to_string(),
            parts: Vec::new(),
            buffer: None,
        }
    }

    /// Use a fixed boundary instead of a random one.
    pub fn with_boundary(mut self, boundary: impl Into<String>) -> Self {
        self.boundary = boundary.into();
        self
    }

    /// Append a part to the form.
    pub fn part(mut self, part: Part) -> Self {
        self.parts.push(part);
        self
    }

    /// Append a plain text field to the form.
    pub fn text(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.part(Part::new(name, value.into().into_bytes()))
    }

    /// The `Content-Type` header value for this form.
    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    /// Total length of the encoded form in bytes.
    pub fn len(&mut self) -> u64 {
        self.ensure_buffer().get_ref().len() as u64
    }

    /// Whether the encoded form is empty. The closing boundary is always
    /// encoded, so even a part-less form has content.
    pub fn is_empty(&mut self) -> bool {
        self.len() == 0
    }

    /// Read up to `n` bytes of the encoded form from the current position.
    pub fn read_up_to(&mut self, n: usize) -> Result<Bytes> {
        let buffer = self.ensure_buffer();
        let mut buf = Vec::new();
        buffer
            .take(n as u64)
            .read_to_end(&mut buf)
            .map_err(|e| Error::unexpected("failed to read multipart buffer").with_source(e))?;
        Ok(buf.into())
    }

    /// Rewind the internal buffer to the start.
    pub fn reset(&mut self) {
        if let Some(buffer) = self.buffer.as_mut() {
            buffer.set_position(0);
        }
    }

    fn ensure_buffer(&mut self) -> &mut Cursor<Vec<u8>> {
        if self.buffer.is_none() {
            let mut out = Vec::new();
            for part in &self.parts {
                out.extend_from_slice(format!("--{}\r\n", self.boundary).as_bytes());
                out.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"", part.name).as_bytes(),
                );
                if let Some(filename) = &part.filename {
                    out.extend_from_slice(format!("; filename=\"{filename}\"").as_bytes());
                }
                out.extend_from_slice(b"\r\n");
                if let Some(content_type) = &part.content_type {
                    out.extend_from_slice(format!("Content-Type: {content_type}\r\n").as_bytes());
                }
                out.extend_from_slice(b"\r\n");
                out.extend_from_slice(&part.data);
                out.extend_from_slice(b"\r\n");
            }
            out.extend_from_slice(format!("--{}--\r\n", self.boundary).as_bytes());
            self.buffer = Some(Cursor::new(out));
        }
        self.buffer.as_mut().expect("buffer just created")
    }
}

impl Debug for MultipartStream {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MultipartStream")
            .field("boundary", &self.boundary)
            .field("parts", &self.parts.len())
            .finish()
    }
}
