//! Sync channel: connection supervision and event fan-out

use std::sync::Arc;

use tokio::sync::{RwLock, broadcast};
use uuid::Uuid;

use shared::message::{Frame, SyncEvent};

use crate::config::{ChannelConfig, ClientConfig};
use crate::sync::SyncError;
use crate::sync::transport::{MemoryHub, MemoryTransport, TcpTransport, Transport};

/// What subscribers see: connection edges plus the event stream.
///
/// `Connected` fires on every successful (re)connect so consumers can
/// resynchronize by refetching; there is no event replay.
#[derive(Debug, Clone)]
pub enum ChannelNotice {
    Connected,
    Event(Frame),
    Disconnected,
}

#[derive(Debug, Clone)]
enum ClientTransport {
    Tcp(TcpTransport),
    Memory(MemoryTransport),
}

impl ClientTransport {
    async fn read_frame(&self) -> Result<Frame, SyncError> {
        match self {
            ClientTransport::Tcp(t) => t.read_frame().await,
            ClientTransport::Memory(t) => t.read_frame().await,
        }
    }

    async fn write_frame(&self, frame: &Frame) -> Result<(), SyncError> {
        match self {
            ClientTransport::Tcp(t) => t.write_frame(frame).await,
            ClientTransport::Memory(t) => t.write_frame(frame).await,
        }
    }

    async fn close(&self) -> Result<(), SyncError> {
        match self {
            ClientTransport::Tcp(t) => t.close().await,
            ClientTransport::Memory(t) => t.close().await,
        }
    }
}

/// Handle to the realtime sync channel.
///
/// Owns a background supervisor task that reads frames, fans them out on a
/// broadcast channel, and reconnects on failure. Dropping a subscription
/// receiver is the unsubscription; dropping the last handle ends fan-out.
#[derive(Debug, Clone)]
pub struct SyncChannel {
    session_id: String,
    current: Arc<RwLock<Option<ClientTransport>>>,
    notices: broadcast::Sender<ChannelNotice>,
}

impl SyncChannel {
    fn new(capacity: usize) -> Self {
        let (notices, _) = broadcast::channel(capacity);
        Self {
            session_id: Uuid::new_v4().to_string(),
            current: Arc::new(RwLock::new(None)),
            notices,
        }
    }

    /// Connect over TCP with auto-reconnect per `config`.
    pub async fn connect(addr: &str, config: ChannelConfig) -> Result<Self, SyncError> {
        let transport = ClientTransport::Tcp(TcpTransport::connect(addr).await?);
        let channel = Self::new(config.capacity);
        channel.spawn_supervisor(transport, Some((addr.to_string(), config)));
        Ok(channel)
    }

    /// Connect to the hub named by `ClientConfig.sync_addr`.
    pub async fn connect_with(
        client: &ClientConfig,
        config: ChannelConfig,
    ) -> Result<Self, SyncError> {
        let addr = client
            .sync_addr
            .as_deref()
            .ok_or_else(|| SyncError::Connection("sync address not configured".into()))?;
        Self::connect(addr, config).await
    }

    /// Connect to an in-memory hub (in-process sessions, tests).
    pub fn memory(hub: &MemoryHub, config: ChannelConfig) -> Self {
        let transport = ClientTransport::Memory(hub.transport());
        let channel = Self::new(config.capacity);
        channel.spawn_supervisor(transport, None);
        channel
    }

    /// Identifier this session stamps on every emitted frame.
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChannelNotice> {
        self.notices.subscribe()
    }

    pub async fn is_connected(&self) -> bool {
        self.current.read().await.is_some()
    }

    /// Emit an event, stamped with this session's id.
    pub async fn emit(&self, event: SyncEvent) -> Result<(), SyncError> {
        let guard = self.current.read().await;
        let transport = guard
            .as_ref()
            .ok_or_else(|| SyncError::Connection("channel disconnected".into()))?;
        let frame = Frame::new(event).with_session(&self.session_id);
        transport.write_frame(&frame).await
    }

    fn spawn_supervisor(
        &self,
        transport: ClientTransport,
        reconnect: Option<(String, ChannelConfig)>,
    ) {
        let current = Arc::clone(&self.current);
        let notices = self.notices.clone();

        tokio::spawn(async move {
            let mut transport = transport;
            loop {
                *current.write().await = Some(transport.clone());
                let _ = notices.send(ChannelNotice::Connected);

                loop {
                    match transport.read_frame().await {
                        Ok(frame) => {
                            if notices.send(ChannelNotice::Event(frame)).is_err() {
                                tracing::debug!("no sync subscribers");
                            }
                        }
                        // The length prefix was consumed whole, so the
                        // stream is still framed; drop the frame and go on.
                        Err(SyncError::InvalidFrame(e)) => {
                            tracing::warn!(error = %e, "malformed frame skipped");
                        }
                        Err(e) => {
                            tracing::warn!(error = %e, "sync channel read failed");
                            break;
                        }
                    }
                }

                if let Err(e) = transport.close().await {
                    tracing::debug!(error = %e, "transport close failed");
                }
                *current.write().await = None;
                let _ = notices.send(ChannelNotice::Disconnected);

                let Some((addr, config)) = &reconnect else {
                    return;
                };
                match reconnect_with_backoff(addr, config).await {
                    Some(t) => transport = t,
                    None => return,
                }
            }
        });
    }
}

async fn reconnect_with_backoff(addr: &str, config: &ChannelConfig) -> Option<ClientTransport> {
    let mut delay = config.reconnect_delay;
    let mut attempt = 0u32;
    loop {
        attempt += 1;
        if config.max_reconnect_attempts != 0 && attempt > config.max_reconnect_attempts {
            tracing::error!(attempts = attempt - 1, "sync channel gave up reconnecting");
            return None;
        }
        tokio::time::sleep(delay).await;
        match TcpTransport::connect(addr).await {
            Ok(t) => {
                tracing::info!(attempt, "sync channel reconnected");
                return Some(ClientTransport::Tcp(t));
            }
            Err(e) => {
                tracing::warn!(attempt, error = %e, "reconnect attempt failed");
                delay = (delay * 2).min(config.max_reconnect_delay);
            }
        }
    }
}
