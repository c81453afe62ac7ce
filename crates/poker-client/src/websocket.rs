//! WebSocket connector.
//!
//! One socket per room. Text frames carry JSON; binary, ping and pong frames
//! are ignored (tungstenite answers pings itself).

use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::Message};

use crate::{Connector, Endpoint, Link, TransportError};

/// [`Connector`] over `tokio-tungstenite`.
///
/// `wss` endpoints use rustls; the process must have a crypto provider
/// installed (see [`install_crypto_provider`]).
#[derive(Debug, Clone, Copy, Default)]
pub struct WebSocketConnector;

impl Connector for WebSocketConnector {
    async fn connect(&self, endpoint: &Endpoint) -> Result<Link, TransportError> {
        let url = endpoint.url()?;
        let (socket, _response) = connect_async(url.as_str())
            .await
            .map_err(|e| TransportError::Connection(format!("{url}: {e}")))?;
        tracing::info!(%url, "websocket connected");

        let (mut sink, mut stream) = socket.split();
        let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<String>();
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel::<String>();

        let pump = tokio::spawn(async move {
            loop {
                tokio::select! {
                    outbound = outbound_rx.recv() => match outbound {
                        Some(text) => {
                            if let Err(e) = sink.send(Message::Text(text.into())).await {
                                tracing::warn!(error = %e, "websocket write failed");
                                break;
                            }
                        },
                        None => {
                            // Link closed locally.
                            if let Err(e) = sink.close().await {
                                tracing::debug!(error = %e, "websocket close failed");
                            }
                            break;
                        },
                    },
                    inbound = stream.next() => match inbound {
                        Some(Ok(Message::Text(text))) => {
                            if inbound_tx.send(text.as_str().to_owned()).is_err() {
                                break;
                            }
                        },
                        Some(Ok(Message::Close(frame))) => {
                            tracing::info!(?frame, "websocket closed by relay");
                            break;
                        },
                        Some(Ok(_)) => {},
                        Some(Err(e)) => {
                            let error = TransportError::Stream(e.to_string());
                            tracing::warn!(%error, "websocket read failed");
                            break;
                        },
                        None => break,
                    },
                }
            }
        });

        Ok(Link::new(outbound_tx, inbound_rx).with_task(pump.abort_handle()))
    }
}

/// Install the `ring` rustls provider for this process.
///
/// Idempotent. Call once from `main` before connecting to `wss` endpoints.
pub fn install_crypto_provider() {
    if rustls::crypto::ring::default_provider().install_default().is_err() {
        tracing::trace!("rustls crypto provider already installed");
    }
}
