//! Upload payloads handed to a backend, and the copy loop backends share.

use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::pin::Pin;

use bytes::{Bytes, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::traits::{StorageError, StorageResult};

const COPY_BUFFER_SIZE: usize = 64 * 1024;

/// Payload of a `PutObject`: either fully staged bytes or a reader to drain.
pub enum MediaBody {
    Bytes(Bytes),
    Reader(Pin<Box<dyn AsyncRead + Send>>),
}

impl MediaBody {
    pub fn from_reader<R>(reader: R) -> Self
    where
        R: AsyncRead + Send + 'static,
    {
        MediaBody::Reader(Box::pin(reader))
    }

    /// Collect the whole payload. Read failures are reported as `SourceRead`.
    pub async fn into_bytes(self) -> StorageResult<Bytes> {
        match self {
            MediaBody::Bytes(bytes) => Ok(bytes),
            MediaBody::Reader(mut reader) => {
                let mut buffer = BytesMut::new();
                loop {
                    buffer.reserve(COPY_BUFFER_SIZE);
                    let read = reader
                        .read_buf(&mut buffer)
                        .await
                        .map_err(StorageError::SourceRead)?;
                    if read == 0 {
                        break;
                    }
                }
                Ok(buffer.freeze())
            }
        }
    }

    /// Turn the payload into a reader regardless of how it was staged.
    pub fn into_reader(self) -> Pin<Box<dyn AsyncRead + Send>> {
        match self {
            MediaBody::Bytes(bytes) => Box::pin(std::io::Cursor::new(bytes)),
            MediaBody::Reader(reader) => reader,
        }
    }
}

impl Debug for MediaBody {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            MediaBody::Bytes(bytes) => f.debug_tuple("Bytes").field(&bytes.len()).finish(),
            MediaBody::Reader(_) => f.write_str("Reader(..)"),
        }
    }
}

/// Copy `reader` into `writer` until EOF and return the number of bytes copied.
///
/// Unlike `tokio::io::copy` this keeps the two sides apart: read failures come
/// back as `StorageError::SourceRead`, write failures as `StorageError::IoError`.
pub async fn copy_body<R, W>(reader: &mut R, writer: &mut W) -> StorageResult<u64>
where
    R: AsyncRead + Unpin + ?Sized,
    W: AsyncWrite + Unpin + ?Sized,
{
    let mut buf = vec![0u8; COPY_BUFFER_SIZE];
    let mut total = 0u64;
    loop {
        let read = reader.read(&mut buf).await.map_err(StorageError::SourceRead)?;
        if read == 0 {
            break;
        }
        writer.write_all(&buf[..read]).await?;
        total += read as u64;
    }
    writer.flush().await?;
    Ok(total)
}
