//! Command line client: `licht <command> [args...]`.
//!
//! The arguments are joined with spaces and sent as one command. The server
//! address is taken from `LICHT_ADDR` (default `127.0.0.1:39382`).

use anyhow::{Context, bail};
use licht::client;
use licht::protocol::DEFAULT_PORT;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.is_empty() {
        bail!("missing argument, usage: licht <command> [args...]");
    }

    let addr = std::env::var("LICHT_ADDR").unwrap_or_else(|_| format!("127.0.0.1:{}", DEFAULT_PORT));
    let line = args.join(" ");

    let reply = client::send_command(addr.as_str(), &line)
        .await
        .with_context(|| format!("sending {:?} to {}", line, addr))?;
    println!("Received: {:?}", reply);
    Ok(())
}
