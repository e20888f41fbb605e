use log::{debug, error, info, warn};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::time::timeout;

use crate::client::ClientSession;
use crate::config::ServerConfig;
use crate::error::SessionError;
use crate::error::handlers::handle_session_error;
use crate::protocol::{handle_input, parse_input};
use crate::router::RouterHandle;

/// How long queued replies may take to drain after the reader stops
const SHUTDOWN_FLUSH_TIMEOUT: Duration = Duration::from_secs(2);

/// Runs one client connection until either side of it ends.
///
/// - The read side parses each line and dispatches it via `handle_input`.
/// - The write side drains the session's outbound queue onto the socket.
/// - When either stops, the session's handles are released and both stop.
pub async fn handle_client(
    stream: TcpStream,
    client_addr: SocketAddr,
    router: RouterHandle,
    config: Arc<ServerConfig>,
) {
    let (read_half, write_half) = stream.into_split();
    run_session(
        read_half,
        write_half,
        client_addr,
        router,
        config.outbound_queue_capacity,
    )
    .await;
}

async fn run_session<R, W>(
    read_half: R,
    write_half: W,
    client_addr: SocketAddr,
    router: RouterHandle,
    outbound_capacity: usize,
) where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (outbound_tx, outbound_rx) = mpsc::channel(outbound_capacity);
    let mut session = ClientSession::new(client_addr, outbound_tx);
    info!("Session {} opened for {}", session.id(), client_addr);

    let mut writer = tokio::spawn(write_loop(write_half, outbound_rx));
    let mut writer_done = false;

    // A write failure cancels the reader wherever it is, possibly mid-NICK
    let result = tokio::select! {
        result = read_loop(read_half, &mut session, &router) => result,
        joined = &mut writer => {
            writer_done = true;
            match joined {
                Ok(result) => result,
                Err(e) => {
                    error!("Writer task for {} failed: {}", client_addr, e);
                    Ok(())
                }
            }
        }
    };

    if let Err(e) = &result {
        handle_session_error(&client_addr, e);
    }

    // Released by session id: covers a claim the reader never saw confirmed
    if let Err(e) = router.unregister(session.id()).await {
        warn!("Could not unregister session {} for {}: {}", session.id(), client_addr, e);
    }

    let session_id = session.id();
    drop(session);

    // The writer stops on its own once the router has dropped its sender too
    if !writer_done && timeout(SHUTDOWN_FLUSH_TIMEOUT, &mut writer).await.is_err() {
        debug!("Writer for {} did not drain in time, aborting", client_addr);
        writer.abort();
    }

    info!("Session {} for {} closed", session_id, client_addr);
}

async fn read_loop<R>(
    read_half: R,
    session: &mut ClientSession,
    router: &RouterHandle,
) -> Result<(), SessionError>
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(read_half);
    let mut buf = Vec::new();

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            info!("Connection closed by client {}", session.addr());
            return Ok(());
        }

        let line = String::from_utf8_lossy(&buf);
        let input = parse_input(&line);
        debug!("Received from {}: {:?}", session.addr(), input);

        handle_input(session, input, router).await?;
    }
}

async fn write_loop<W>(
    mut write_half: W,
    mut outbound: mpsc::Receiver<String>,
) -> Result<(), SessionError>
where
    W: AsyncWrite + Unpin,
{
    while let Some(text) = outbound.recv().await {
        write_half.write_all(text.as_bytes()).await?;
    }

    let _ = write_half.shutdown().await;
    Ok(())
}
