//! Interactive terminal client for the chat relay.
//!
//! Usage: `connect [address]` (default `localhost:6666`). Every line typed
//! is sent as-is; every line from the server is printed.

use log::error;
use std::io::Write;
use std::process;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

use chat_relay::utils::logging::setup_logging;

const DEFAULT_SERVER: &str = "localhost:6666";

#[tokio::main]
async fn main() {
    setup_logging();

    let server_addr = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_SERVER.to_string());

    let stream = match TcpStream::connect(&server_addr).await {
        Ok(stream) => stream,
        Err(e) => {
            error!("Unable to connect to server at {}: {}", server_addr, e);
            process::exit(1);
        }
    };
    println!("Connected to server at {}", server_addr);

    let (read_half, mut write_half) = stream.into_split();

    let mut incoming = tokio::spawn(async move {
        let mut lines = BufReader::new(read_half).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => println!("{}", line),
                Ok(None) => break,
                Err(e) => {
                    error!("Error reading from server: {}", e);
                    break;
                }
            }
        }
        println!("Disconnected from server.");
    });

    let mut input = BufReader::new(tokio::io::stdin()).lines();
    loop {
        prompt();
        let line = tokio::select! {
            line = input.next_line() => line,
            _ = &mut incoming => return,
        };

        let line = match line {
            Ok(Some(line)) => line,
            Ok(None) => {
                println!("\nExiting client.");
                break;
            }
            Err(e) => {
                error!("Error reading input: {}", e);
                break;
            }
        };

        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Err(e) = write_half.write_all(format!("{}\n", line).as_bytes()).await {
            error!("Error sending message: {}", e);
            break;
        }
    }

    let _ = write_half.shutdown().await;
    let _ = incoming.await;
}

fn prompt() {
    print!("> ");
    let _ = std::io::stdout().flush();
}
