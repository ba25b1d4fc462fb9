//! Multipart encoding of request bodies.
//!
//! Every body sent to the gateway is a single `file` part with an empty
//! filename; the `Content-Type` header carrying the boundary is set by
//! reqwest when the form is attached.

use crate::error::ApiError;
use bytes::Bytes;
use futures::Stream;
use reqwest::multipart::{Form, Part};
use reqwest::Body;
use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::io::{AsyncRead, ReadBuf};

/// Form field name the gateway expects file content under.
pub const FILE_FIELD: &str = "file";

const PART_CONTENT_TYPE: &str = "application/octet-stream";
const CHUNK_SIZE: usize = 64 * 1024;

/// Byte source for a streamed upload.
pub type Reader = Box<dyn AsyncRead + Send + Sync + Unpin>;

/// Content of a request body before multipart encoding.
pub enum RequestBody {
    /// Streamed in chunks; the reader is dropped at end-of-stream or on error.
    Reader(Reader),
    Bytes(Vec<u8>),
}

impl std::fmt::Debug for RequestBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RequestBody::Reader(_) => f.write_str("RequestBody::Reader(..)"),
            RequestBody::Bytes(b) => write!(f, "RequestBody::Bytes({} bytes)", b.len()),
        }
    }
}

/// Wrap `body` as a single-part `multipart/form-data` form.
pub fn file_form(body: RequestBody) -> Result<Form, ApiError> {
    let part = match body {
        RequestBody::Reader(reader) => Part::stream(Body::wrap_stream(ReaderChunks::new(reader))),
        RequestBody::Bytes(bytes) => Part::bytes(bytes),
    };
    let part = part.file_name("").mime_str(PART_CONTENT_TYPE)?;
    Ok(Form::new().part(FILE_FIELD, part))
}

/// Adapts an `AsyncRead` into a stream of byte chunks.
pub struct ReaderChunks {
    reader: Option<Reader>,
    buf: Vec<u8>,
}

impl ReaderChunks {
    pub fn new(reader: Reader) -> Self {
        Self {
            reader: Some(reader),
            buf: vec![0; CHUNK_SIZE],
        }
    }
}

impl Stream for ReaderChunks {
    type Item = io::Result<Bytes>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = &mut *self;
        let Some(reader) = this.reader.as_mut() else {
            return Poll::Ready(None);
        };

        let mut read_buf = ReadBuf::new(&mut this.buf);
        let poll = Pin::new(reader).poll_read(cx, &mut read_buf);
        match poll {
            Poll::Pending => Poll::Pending,
            Poll::Ready(Err(e)) => {
                this.reader = None;
                Poll::Ready(Some(Err(e)))
            }
            Poll::Ready(Ok(())) => {
                let filled = read_buf.filled();
                if filled.is_empty() {
                    this.reader = None;
                    Poll::Ready(None)
                } else {
                    Poll::Ready(Some(Ok(Bytes::copy_from_slice(filled))))
                }
            }
        }
    }
}
