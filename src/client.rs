//! Client side of the wire protocol.

use std::io;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::{TcpStream, ToSocketAddrs};

use crate::protocol::{self, ProtocolError, Reply};

/// Errors raised while sending a command.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error("connection failed: {0}")]
    Io(#[from] io::Error),

    /// The server answered with something other than `OK` or `ERR`.
    #[error("unexpected reply {0:?}")]
    UnexpectedReply(Vec<u8>),
}

/// Sends one request over `stream` and reads the reply until the server
/// closes the connection.
pub async fn exchange<S>(stream: &mut S, line: &str) -> Result<Reply, ClientError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let frame = protocol::encode_request(line)?;
    stream.write_all(&frame).await?;
    stream.flush().await?;

    let mut reply = Vec::with_capacity(protocol::ERR.len());
    stream.read_to_end(&mut reply).await?;
    Reply::from_bytes(&reply).ok_or(ClientError::UnexpectedReply(reply))
}

/// Connects to `addr`, sends `line` and returns the server's reply.
pub async fn send_command<A: ToSocketAddrs>(addr: A, line: &str) -> Result<Reply, ClientError> {
    let mut stream = TcpStream::connect(addr).await?;
    exchange(&mut stream, line).await
}
