//! Line-based TCP control console.
//!
//! Each line a client sends is parsed as a control topic and posted to the
//! frame loop. The reply line is the topic when it was accepted, `busy`
//! when another topic is still pending, `unknown` for anything else.

use card_table::control::ControlSender;
use log::{debug, info, warn};
use std::io;
use tokio::{
    io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader},
    net::TcpListener,
};

/// Accepts console clients until the listener fails.
pub async fn serve(listener: TcpListener, control: ControlSender) -> io::Result<()> {
    info!("Control console listening on {}", listener.local_addr()?);

    loop {
        let (stream, peer) = listener.accept().await?;
        info!("Console client connected: {peer}");
        let control = control.clone();
        tokio::spawn(async move {
            if let Err(e) = handle_client(stream, control).await {
                warn!("Console client {peer} failed: {e}");
            }
            debug!("Console client disconnected: {peer}");
        });
    }
}

/// Serves one client until it disconnects or the loop stops.
pub async fn handle_client<S>(stream: S, control: ControlSender) -> io::Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let (reader, mut writer) = tokio::io::split(stream);
    let mut lines = BufReader::new(reader).lines();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let reply = control.respond(&line);
        debug!("Console {:?} -> {reply}", line.trim());
        writer.write_all(reply.as_bytes()).await?;
        writer.write_all(b"\n").await?;
        writer.flush().await?;

        if reply == "stop" || reply == "closed" {
            break;
        }
    }

    Ok(())
}
