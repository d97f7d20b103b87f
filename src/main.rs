//! Terminal chat client built on `stompframe`.
//!
//! Connects to the broker, prints every event and sends each line read from
//! stdin as a chat message. End of input disconnects.

mod cli;

use std::time::Duration;

use clap::Parser;
use stompframe::{
    client::StompClient,
    config::{ClientConfig, ConnectRequest, DEFAULT_CONNECTION_STRING},
    event::ClientEvent,
    frame::HeartBeat,
};
use tokio::io::{AsyncBufReadExt, BufReader};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Applications embedding the library should install their own subscriber.
    tracing_subscriber::fmt::init();

    let cli = cli::Cli::parse();
    let connection_string = cli
        .connection_string
        .as_deref()
        .unwrap_or(DEFAULT_CONNECTION_STRING);
    let mut config = ClientConfig::from_connection_string(connection_string)?;
    if let Some(heart_beat) = cli.heart_beat.as_deref() {
        config = config.with_heart_beat(heart_beat.parse::<HeartBeat>()?);
    }
    if cli.web_stomp {
        let url = config.web_stomp_url();
        config = config.with_endpoint(url);
    }

    let mut request = ConnectRequest::new(cli.name);
    request.endpoint = cli.endpoint;
    request.login = cli.login;
    request.passcode = cli.passcode;
    request.vhost = cli.vhost;

    let (mut client, mut events) = StompClient::new(config);
    let printer = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            match event {
                ClientEvent::MessageReceived(message) => println!(
                    "[{}] {}: {}",
                    message.timestamp.format("%H:%M:%S"),
                    message.user,
                    message.text
                ),
                ClientEvent::System(text) => println!("* {text}"),
            }
        }
    });

    client.connect(request).await?;
    client
        .wait_until_connected(Duration::from_secs(cli.connect_timeout))
        .await?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let text = line.trim();
        if text.is_empty() {
            continue;
        }
        if !client.is_connected() {
            eprintln!("connection lost");
            break;
        }
        client.send_text(text).await?;
    }

    client.disconnect().await;
    drop(client);
    printer.await?;
    Ok(())
}
