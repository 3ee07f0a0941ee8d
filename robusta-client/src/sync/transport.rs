//! Transport abstraction for the sync channel

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::sync::{Mutex, broadcast};

use shared::message::Frame;

use crate::sync::SyncError;

/// Frames larger than this are rejected as corrupt.
const MAX_FRAME_LEN: usize = 1024 * 1024;

/// Transport abstraction for sync channel communication
#[async_trait]
pub trait Transport: Send + Sync + fmt::Debug {
    async fn read_frame(&self) -> Result<Frame, SyncError>;
    async fn write_frame(&self, frame: &Frame) -> Result<(), SyncError>;
    async fn close(&self) -> Result<(), SyncError>;
}

/// TCP transport: 4-byte little-endian length prefix + JSON body.
#[derive(Debug, Clone)]
pub struct TcpTransport {
    reader: Arc<Mutex<OwnedReadHalf>>,
    writer: Arc<Mutex<OwnedWriteHalf>>,
}

impl TcpTransport {
    pub async fn connect(addr: &str) -> Result<Self, SyncError> {
        let stream = TcpStream::connect(addr)
            .await
            .map_err(|e| SyncError::Connection(e.to_string()))?;
        let (reader, writer) = stream.into_split();
        Ok(Self {
            reader: Arc::new(Mutex::new(reader)),
            writer: Arc::new(Mutex::new(writer)),
        })
    }
}

#[async_trait]
impl Transport for TcpTransport {
    async fn read_frame(&self) -> Result<Frame, SyncError> {
        let mut reader = self.reader.lock().await;

        // Read payload length (4 bytes)
        let mut len_buf = [0u8; 4];
        reader.read_exact(&mut len_buf).await.map_err(SyncError::Io)?;
        let len = u32::from_le_bytes(len_buf) as usize;

        // Fatal: the payload is never read, so the stream cannot be resynced.
        if len > MAX_FRAME_LEN {
            return Err(SyncError::Connection(format!(
                "frame length {} exceeds limit",
                len
            )));
        }

        // Read payload
        let mut payload = vec![0u8; len];
        reader.read_exact(&mut payload).await.map_err(SyncError::Io)?;

        Frame::from_bytes(&payload)
            .map_err(|e| SyncError::InvalidFrame(format!("bad frame payload: {}", e)))
    }

    async fn write_frame(&self, frame: &Frame) -> Result<(), SyncError> {
        let payload = frame.to_bytes()?;
        let mut data = Vec::with_capacity(4 + payload.len());
        data.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        data.extend_from_slice(&payload);

        let mut writer = self.writer.lock().await;
        writer.write_all(&data).await.map_err(SyncError::Io)?;
        Ok(())
    }

    async fn close(&self) -> Result<(), SyncError> {
        let mut writer = self.writer.lock().await;
        writer.shutdown().await.map_err(SyncError::Io)
    }
}

/// In-memory hub standing in for the external socket server.
///
/// Every frame written by any connected transport is broadcast to all
/// transports, the writer included. Matches the hub's fan-out semantics
/// where the originator receives its own events too.
#[derive(Debug, Clone)]
pub struct MemoryHub {
    tx: broadcast::Sender<Frame>,
}

impl MemoryHub {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Connect a new in-memory transport to this hub.
    pub fn transport(&self) -> MemoryTransport {
        MemoryTransport {
            rx: Arc::new(Mutex::new(self.tx.subscribe())),
            tx: self.tx.clone(),
        }
    }

    /// Inject a frame as if an external party (customer app, backend)
    /// had broadcast it.
    pub fn broadcast(&self, frame: Frame) {
        let _ = self.tx.send(frame);
    }
}

/// In-memory transport (for in-process communication and tests)
#[derive(Debug, Clone)]
pub struct MemoryTransport {
    rx: Arc<Mutex<broadcast::Receiver<Frame>>>,
    tx: broadcast::Sender<Frame>,
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn read_frame(&self) -> Result<Frame, SyncError> {
        let mut rx = self.rx.lock().await;
        loop {
            match rx.recv().await {
                Ok(frame) => return Ok(frame),
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "memory transport lagged, frames dropped");
                }
                Err(broadcast::error::RecvError::Closed) => return Err(SyncError::Closed),
            }
        }
    }

    async fn write_frame(&self, frame: &Frame) -> Result<(), SyncError> {
        self.tx
            .send(frame.clone())
            .map_err(|e| SyncError::Connection(format!("hub gone: {}", e)))?;
        Ok(())
    }

    async fn close(&self) -> Result<(), SyncError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::message::SyncEvent;
    use shared::message::payload::CancelRequestedPayload;

    fn cancel_frame(order_id: i64) -> Frame {
        Frame::new(SyncEvent::CancelRequested(CancelRequestedPayload { order_id }))
    }

    #[tokio::test]
    async fn hub_echoes_to_every_transport_including_the_writer() {
        let hub = MemoryHub::new(16);
        let a = hub.transport();
        let b = hub.transport();

        let frame = cancel_frame(1);
        a.write_frame(&frame).await.unwrap();

        assert_eq!(a.read_frame().await.unwrap(), frame);
        assert_eq!(b.read_frame().await.unwrap(), frame);
    }

    #[tokio::test]
    async fn tcp_transport_round_trips_frames() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let accept = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let (reader, writer) = stream.into_split();
            TcpTransport {
                reader: Arc::new(Mutex::new(reader)),
                writer: Arc::new(Mutex::new(writer)),
            }
        });

        let client = TcpTransport::connect(&addr.to_string()).await.unwrap();
        let server = accept.await.unwrap();

        let frame = cancel_frame(42).with_session("session-a");
        client.write_frame(&frame).await.unwrap();
        assert_eq!(server.read_frame().await.unwrap(), frame);

        let reply = cancel_frame(43);
        server.write_frame(&reply).await.unwrap();
        assert_eq!(client.read_frame().await.unwrap(), reply);
    }

    #[tokio::test]
    async fn close_shuts_down_the_stream() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let accept = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let (reader, writer) = stream.into_split();
            TcpTransport {
                reader: Arc::new(Mutex::new(reader)),
                writer: Arc::new(Mutex::new(writer)),
            }
        });

        let client = TcpTransport::connect(&addr.to_string()).await.unwrap();
        let server = accept.await.unwrap();

        client.close().await.unwrap();
        // The peer sees EOF instead of a frame
        assert!(matches!(server.read_frame().await, Err(SyncError::Io(_))));
    }

    #[tokio::test]
    async fn oversized_frame_is_rejected() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let accept = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            // Claim a 100 MiB frame
            stream
                .write_all(&(100 * 1024 * 1024u32).to_le_bytes())
                .await
                .unwrap();
            stream
        });

        let client = TcpTransport::connect(&addr.to_string()).await.unwrap();
        let _server = accept.await.unwrap();

        assert!(matches!(
            client.read_frame().await,
            Err(SyncError::Connection(_))
        ));
    }
}
