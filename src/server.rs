//! TCP front end.
//!
//! Each connection carries exactly one request. The command is parsed and
//! handed to the scheduler; `on`/`off` are answered only after their
//! transition ends, everything else right away. Any failure is logged and
//! answered with `ERR`, and the connection is closed either way.

use std::io;
use std::time::Duration;

use log::{error, info, warn};
use palette::Srgb;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpListener;

use crate::command::{Command, CommandError};
use crate::protocol::{self, ProtocolError, Reply};
use crate::scheduler::{ModeOutcome, Scheduler, SchedulerError};

/// Pause after an accept error that a retry will not immediately fix.
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// Why a request was answered with `ERR`.
#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error(transparent)]
    Command(#[from] CommandError),

    #[error(transparent)]
    Scheduler(#[from] SchedulerError),

    /// The awaited transition hit a hardware failure.
    #[error("mode failed: {0}")]
    ModeFailed(String),
}

/// Connection handler bound to a scheduler.
#[derive(Clone)]
pub struct Server {
    scheduler: Scheduler,
    default_color: Srgb,
}

impl Server {
    /// `default_color` is used for channels missing from an `on` command.
    pub fn new(scheduler: Scheduler, default_color: Srgb) -> Self {
        Self {
            scheduler,
            default_color,
        }
    }

    /// Accepts connections forever, serving each on its own task.
    ///
    /// A failed accept is logged and skipped; only a listener without a local
    /// address is an error.
    pub async fn serve(&self, listener: TcpListener) -> io::Result<()> {
        info!("running server on {}", listener.local_addr()?);
        loop {
            let (stream, peer) = match listener.accept().await {
                Ok(accepted) => accepted,
                Err(err) => {
                    accept_failed(&err).await;
                    continue;
                }
            };
            let server = self.clone();
            tokio::spawn(async move {
                server.handle_connection(stream, &peer.to_string()).await;
            });
        }
    }

    /// Serves the single request on `stream`, replies and closes it.
    pub async fn handle_connection<S>(&self, mut stream: S, peer: &str)
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let reply = match self.process(&mut stream, peer).await {
            Ok(()) => Reply::Ok,
            Err(err) => {
                error!("request from {} failed: {}", peer, err);
                Reply::Err
            }
        };

        if let Err(err) = write_reply(&mut stream, reply).await {
            warn!("could not reply to {}: {}", peer, err);
        }
    }

    async fn process<S>(&self, stream: &mut S, peer: &str) -> Result<(), RequestError>
    where
        S: AsyncRead + Unpin,
    {
        let line = protocol::read_request(stream).await?;
        info!("received {:?} from {}", line, peer);

        let command = Command::parse(&line, self.default_color)?;
        let verb = command.verb();
        if let Some(completion) = command.execute(&self.scheduler)? {
            let id = completion.id();
            match completion.wait().await {
                ModeOutcome::Failed(reason) => return Err(RequestError::ModeFailed(reason)),
                outcome => info!("{} #{} {}", verb, id, outcome),
            }
        }
        Ok(())
    }
}

/// Errors caused by a single client going away during the handshake.
fn is_transient(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::ConnectionAborted
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::Interrupted
            | io::ErrorKind::WouldBlock
    )
}

/// Logs a failed accept, pausing unless the failure was one client's doing.
async fn accept_failed(err: &io::Error) {
    warn!("accept failed: {}", err);
    if !is_transient(err) {
        // Out of descriptors or similar; give connections time to close.
        tokio::time::sleep(ACCEPT_BACKOFF).await;
    }
}

async fn write_reply<S: AsyncWrite + Unpin>(stream: &mut S, reply: Reply) -> io::Result<()> {
    stream.write_all(reply.as_bytes()).await?;
    stream.shutdown().await
}
