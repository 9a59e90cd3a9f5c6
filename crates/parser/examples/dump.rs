//! Reads HTTP messages from stdin and logs what the parser makes of them.
//!
//! ```text
//! printf 'GET / HTTP/1.1\r\nHost: a\r\n\r\n' | cargo run --example dump
//! curl -si http://example.com | cargo run --example dump -- response
//! ```

use futures::StreamExt;
use micro_http_parser::codec::MessageDecoder;
use micro_http_parser::protocol::ParserMode;
use tokio_util::codec::FramedRead;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::INFO).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let mode = match std::env::args().nth(1).as_deref() {
        Some("response") => ParserMode::Response,
        _ => ParserMode::Request,
    };
    info!(?mode, "reading messages from stdin");

    let mut framed = FramedRead::new(tokio::io::stdin(), MessageDecoder::new(mode));
    while let Some(result) = framed.next().await {
        let message = match result {
            Ok(message) => message,
            Err(e) => {
                error!(cause = %e, "stopped parsing");
                return;
            }
        };

        info!(
            method = ?message.method(),
            status = ?message.status_code(),
            url = %String::from_utf8_lossy(message.raw_url()),
            version = ?message.version(),
            keep_alive = message.should_keep_alive(),
            upgrade = message.is_upgrade(),
            body_len = message.body().len(),
            "message"
        );
        for (name, value) in message.headers() {
            info!(%name, value = %String::from_utf8_lossy(value.as_bytes()), "header");
        }
        for (name, value) in message.trailers() {
            info!(%name, value = %String::from_utf8_lossy(value.as_bytes()), "trailer");
        }

        if message.is_upgrade() {
            info!(remaining = framed.read_buffer().len(), "connection upgraded, the rest is not http");
            return;
        }
    }
}
