//! Socket transport abstraction and its tokio-tungstenite implementation.

use async_trait::async_trait;
use futures::StreamExt;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, info};

use socialhub_core::result::AppResult;

/// Opens event-stream connections.
#[async_trait]
pub trait Transport: Send + Sync + std::fmt::Debug + 'static {
    /// Connect to `url`. Resolves once the socket is open.
    async fn open(&self, url: &str) -> AppResult<Box<dyn FrameStream>>;
}

/// An open receive-only connection.
#[async_trait]
pub trait FrameStream: Send {
    /// Next text frame. `None` means the server closed the connection.
    async fn next_frame(&mut self) -> Option<AppResult<String>>;

    /// Close the connection from our side.
    async fn close(&mut self);
}

/// WebSocket transport.
#[derive(Debug, Default, Clone, Copy)]
pub struct WsTransport;

#[async_trait]
impl Transport for WsTransport {
    async fn open(&self, url: &str) -> AppResult<Box<dyn FrameStream>> {
        let (socket, response) = tokio_tungstenite::connect_async(url).await?;
        info!(status = %response.status(), "WebSocket connection established");
        Ok(Box::new(WsFrameStream { socket }))
    }
}

/// Frame stream over a tungstenite socket.
struct WsFrameStream {
    socket: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

#[async_trait]
impl FrameStream for WsFrameStream {
    async fn next_frame(&mut self) -> Option<AppResult<String>> {
        while let Some(message) = self.socket.next().await {
            match message {
                Ok(Message::Text(text)) => return Some(Ok(text.as_str().to_owned())),
                Ok(Message::Close(frame)) => {
                    debug!(?frame, "Server closed the event stream");
                    return None;
                }
                // Ping replies are queued by tungstenite itself.
                Ok(_) => continue,
                Err(e) => return Some(Err(e.into())),
            }
        }
        None
    }

    async fn close(&mut self) {
        if let Err(e) = self.socket.close(None).await {
            debug!(error = %e, "Error while closing event stream");
        }
    }
}
