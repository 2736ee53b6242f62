use crate::error::EngineError;
use crate::transport::{ChannelMode, DataLink, PeerConnection, PeerEngine, TransportConfig, TransportEvent};
use async_trait::async_trait;
use chatlan_core::{PeerId, SignalKind};
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};
use tracing::{debug, info, warn};
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::MediaEngine;
use webrtc::api::setting_engine::SettingEngine;
use webrtc::api::{API, APIBuilder};
use webrtc::data_channel::RTCDataChannel;
use webrtc::data_channel::data_channel_message::DataChannelMessage;
use webrtc::data_channel::data_channel_state::RTCDataChannelState;
use webrtc::ice_transport::ice_gatherer_state::RTCIceGathererState;
use webrtc::ice_transport::ice_server::RTCIceServer;
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;

pub const CHAT_CHANNEL_LABEL: &str = "chat";

/// [`PeerEngine`] backed by the `webrtc` crate.
pub struct RtcEngine {
    api: API,
    config: TransportConfig,
}

impl RtcEngine {
    pub fn new(config: TransportConfig) -> Result<Self, EngineError> {
        // Codecs are registered even though only a data channel is negotiated.
        let mut media_engine = MediaEngine::default();
        media_engine.register_default_codecs()?;
        let registry = register_default_interceptors(Registry::new(), &mut media_engine)?;

        let mut setting_engine = SettingEngine::default();
        setting_engine.set_include_loopback_candidate(config.include_loopback);

        let api = APIBuilder::new()
            .with_media_engine(media_engine)
            .with_interceptor_registry(registry)
            .with_setting_engine(setting_engine)
            .build();

        Ok(Self { api, config })
    }

    fn rtc_configuration(&self) -> RTCConfiguration {
        let ice_servers = if self.config.ice_servers.is_empty() {
            vec![]
        } else {
            vec![RTCIceServer {
                urls: self.config.ice_servers.clone(),
                ..Default::default()
            }]
        };

        RTCConfiguration {
            ice_servers,
            ..Default::default()
        }
    }
}

#[async_trait]
impl PeerEngine for RtcEngine {
    async fn open(
        &self,
        peer_id: PeerId,
        mode: ChannelMode,
        events: mpsc::Sender<TransportEvent>,
    ) -> Result<Arc<dyn PeerConnection>, EngineError> {
        let connection =
            RtcConnection::new(&self.api, self.rtc_configuration(), peer_id, mode, events).await?;
        Ok(Arc::new(connection))
    }
}

/// One `RTCPeerConnection` plus the pending gathering notification.
pub struct RtcConnection {
    peer_id: PeerId,
    peer_connection: Arc<RTCPeerConnection>,
    gathering: Mutex<Option<mpsc::Receiver<()>>>,
}

impl RtcConnection {
    async fn new(
        api: &API,
        configuration: RTCConfiguration,
        peer_id: PeerId,
        mode: ChannelMode,
        events: mpsc::Sender<TransportEvent>,
    ) -> Result<Self, EngineError> {
        let peer_connection = Arc::new(api.new_peer_connection(configuration).await?);

        let state_tx = events.clone();
        peer_connection.on_peer_connection_state_change(Box::new(
            move |s: RTCPeerConnectionState| {
                let tx = state_tx.clone();

                Box::pin(async move {
                    info!("Peer connection state for {:?}: {:?}", peer_id, s);
                    match s {
                        RTCPeerConnectionState::Failed | RTCPeerConnectionState::Closed => {
                            let _ = tx.send(TransportEvent::ConnectionLost(peer_id)).await;
                        }
                        _ => {}
                    }
                })
            },
        ));

        peer_connection.on_ice_gathering_state_change(Box::new(move |s: RTCIceGathererState| {
            debug!("ICE gathering state for {:?}: {:?}", peer_id, s);
            Box::pin(async {})
        }));

        match mode {
            ChannelMode::Create => {
                let channel = peer_connection
                    .create_data_channel(CHAT_CHANNEL_LABEL, None)
                    .await?;
                attach_channel(peer_id, channel, events);
            }
            ChannelMode::Accept => {
                peer_connection.on_data_channel(Box::new(move |channel: Arc<RTCDataChannel>| {
                    let tx = events.clone();

                    Box::pin(async move {
                        debug!(
                            "Incoming data channel '{}' for peer {:?}",
                            channel.label(),
                            peer_id
                        );
                        attach_channel(peer_id, channel, tx);
                    })
                }));
            }
        }

        Ok(Self {
            peer_id,
            peer_connection,
            gathering: Mutex::new(None),
        })
    }
}

#[async_trait]
impl PeerConnection for RtcConnection {
    async fn create_local_description(&self, kind: SignalKind) -> Result<(), EngineError> {
        let description = match kind {
            SignalKind::Offer => self.peer_connection.create_offer(None).await?,
            SignalKind::Answer => self.peer_connection.create_answer(None).await?,
        };

        // Must be armed before the local description starts gathering.
        let gathering = self.peer_connection.gathering_complete_promise().await;
        *self.gathering.lock().await = Some(gathering);

        self.peer_connection.set_local_description(description).await?;
        debug!("Local {} installed for {:?}", kind, self.peer_id);
        Ok(())
    }

    async fn gathering_complete(&self) -> Result<String, EngineError> {
        let mut gathering = self
            .gathering
            .lock()
            .await
            .take()
            .ok_or(EngineError::GatheringNotStarted)?;

        // Completion is signalled by the sender being dropped.
        let _ = gathering.recv().await;

        let description = self
            .peer_connection
            .local_description()
            .await
            .ok_or(EngineError::MissingLocalDescription)?;
        Ok(description.sdp)
    }

    async fn apply_remote_description(
        &self,
        kind: SignalKind,
        sdp: String,
    ) -> Result<(), EngineError> {
        check_ice_credentials(&sdp)?;
        let description = match kind {
            SignalKind::Offer => RTCSessionDescription::offer(sdp)?,
            SignalKind::Answer => RTCSessionDescription::answer(sdp)?,
        };
        self.peer_connection.set_remote_description(description).await?;
        Ok(())
    }

    async fn close(&self) -> Result<(), EngineError> {
        self.peer_connection.close().await?;
        Ok(())
    }
}

/// A description without ICE credentials can never connect.
fn check_ice_credentials(sdp: &str) -> Result<(), EngineError> {
    let has = |prefix: &str| sdp.lines().any(|line| line.trim_start().starts_with(prefix));
    if has("a=ice-ufrag:") && has("a=ice-pwd:") {
        Ok(())
    } else {
        Err(EngineError::Rejected("no ICE credentials".into()))
    }
}

fn attach_channel(
    peer_id: PeerId,
    channel: Arc<RTCDataChannel>,
    events: mpsc::Sender<TransportEvent>,
) {
    let open_tx = events.clone();
    let open_channel = Arc::clone(&channel);
    channel.on_open(Box::new(move || {
        Box::pin(async move {
            info!("Data channel open for peer {:?}", peer_id);
            let link: Arc<dyn DataLink> = Arc::new(RtcLink {
                channel: open_channel,
            });
            let _ = open_tx.send(TransportEvent::ChannelOpen(peer_id, link)).await;
        })
    }));

    let msg_tx = events.clone();
    channel.on_message(Box::new(move |msg: DataChannelMessage| {
        let tx = msg_tx.clone();

        Box::pin(async move {
            match String::from_utf8(msg.data.to_vec()) {
                Ok(text) => {
                    let _ = tx.send(TransportEvent::Message(peer_id, text)).await;
                }
                Err(_) => warn!("Dropping non UTF-8 frame from peer {:?}", peer_id),
            }
        })
    }));

    channel.on_close(Box::new(move || {
        let tx = events.clone();

        Box::pin(async move {
            info!("Data channel closed for peer {:?}", peer_id);
            let _ = tx.send(TransportEvent::ChannelClosed(peer_id)).await;
        })
    }));
}

/// Sending half of a WebRTC data channel.
struct RtcLink {
    channel: Arc<RTCDataChannel>,
}

#[async_trait]
impl DataLink for RtcLink {
    fn is_open(&self) -> bool {
        self.channel.ready_state() == RTCDataChannelState::Open
    }

    async fn send_text(&self, text: &str) -> Result<(), EngineError> {
        if !self.is_open() {
            return Err(EngineError::ChannelNotOpen);
        }
        self.channel.send_text(text.to_owned()).await?;
        Ok(())
    }
}
