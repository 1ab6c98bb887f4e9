//! Wire format.
//!
//! One request per connection: a single length byte `N` followed by `N` bytes
//! of UTF-8 command text. The reply is the bare ASCII `OK` or `ERR`, after
//! which the server closes the connection.

use std::io;

use tokio::io::{AsyncRead, AsyncReadExt};

/// Default TCP port.
pub const DEFAULT_PORT: u16 = 39382;

/// Largest payload a length byte can announce.
pub const MAX_PAYLOAD: usize = u8::MAX as usize;

/// Reply for a handled request.
pub const OK: &[u8] = b"OK";

/// Reply for a failed request.
pub const ERR: &[u8] = b"ERR";

/// Errors while decoding a request.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// The stream ended or failed before the full payload arrived.
    #[error("failed to read request: {0}")]
    Io(#[from] io::Error),

    /// The payload is not valid UTF-8.
    #[error("request is not valid UTF-8")]
    Utf8(#[from] std::str::Utf8Error),

    /// The command line does not fit in one length byte.
    #[error("command is {0} bytes, at most {MAX_PAYLOAD} fit in a request")]
    TooLong(usize),
}

/// Server reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reply {
    Ok,
    Err,
}

impl Reply {
    /// Wire bytes of the reply.
    pub fn as_bytes(self) -> &'static [u8] {
        match self {
            Reply::Ok => OK,
            Reply::Err => ERR,
        }
    }

    /// Decodes a reply, returning `None` for anything else.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        match bytes {
            OK => Some(Reply::Ok),
            ERR => Some(Reply::Err),
            _ => None,
        }
    }
}

/// Frames `line` as a request.
pub fn encode_request(line: &str) -> Result<Vec<u8>, ProtocolError> {
    let len = u8::try_from(line.len()).map_err(|_| ProtocolError::TooLong(line.len()))?;
    let mut frame = Vec::with_capacity(line.len() + 1);
    frame.push(len);
    frame.extend_from_slice(line.as_bytes());
    Ok(frame)
}

/// Reads one request and returns its command line.
pub async fn read_request<R: AsyncRead + Unpin>(reader: &mut R) -> Result<String, ProtocolError> {
    let len = usize::from(reader.read_u8().await?);
    let mut buf = [0u8; MAX_PAYLOAD];
    let payload = &mut buf[..len];
    reader.read_exact(payload).await?;
    Ok(std::str::from_utf8(payload)?.to_owned())
}
