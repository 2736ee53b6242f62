use crate::error::{HandshakeError, SessionError};
use crate::handshake::{
    Handshake, HandshakePath, HandshakeState, HandshakeStep, apply_answer, drive_answer,
    drive_offer,
};
use crate::registry::{PeerRegistry, RelayEngine};
use crate::session::{
    HandshakeSummary, IgnoreReason, LocalIdentity, PeerSummary, SessionCommand, SessionConfig,
    SessionHandle, SessionOutput, SessionSnapshot, SignalOutcome,
};
use crate::transport::{DataLink, PeerConnection, PeerEngine, TransportEvent};
use chatlan_core::codec::sdp;
use chatlan_core::{ChatMessage, PeerId, Role, SessionCode, SignalEnvelope, SignalKind};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Actor that owns every piece of mutable session state: handshake table,
/// peer registry and message log. Everything else talks to it through a
/// [`SessionHandle`].
pub struct Session {
    role: Role,
    code: SessionCode,
    identity: LocalIdentity,
    config: SessionConfig,
    engine: Arc<dyn PeerEngine>,
    output: Arc<dyn SessionOutput>,
    handshakes: BTreeMap<PeerId, Handshake>,
    registry: PeerRegistry,
    relay: RelayEngine,
    command_rx: mpsc::Receiver<SessionCommand>,
    step_rx: mpsc::Receiver<HandshakeStep>,
    step_tx: mpsc::Sender<HandshakeStep>,
    transport_rx: mpsc::Receiver<TransportEvent>,
    transport_tx: mpsc::Sender<TransportEvent>,
}

impl Session {
    /// Starts the actor on the current runtime and returns its handle.
    pub fn spawn(
        role: Role,
        identity: LocalIdentity,
        engine: Arc<dyn PeerEngine>,
        output: Arc<dyn SessionOutput>,
        config: SessionConfig,
    ) -> SessionHandle {
        let (command_tx, command_rx) = mpsc::channel(config.command_capacity);
        let (step_tx, step_rx) = mpsc::channel(config.event_capacity);
        let (transport_tx, transport_rx) = mpsc::channel(config.event_capacity);
        let code = SessionCode::new();

        let session = Self {
            role,
            code,
            identity,
            config,
            engine,
            output,
            handshakes: BTreeMap::new(),
            registry: PeerRegistry::new(),
            relay: RelayEngine::new(role),
            command_rx,
            step_rx,
            step_tx,
            transport_rx,
            transport_tx,
        };
        tokio::spawn(session.run());

        SessionHandle::new(command_tx, role, code)
    }

    async fn run(mut self) {
        info!("Session {} started as {}", self.code, self.role);

        let mut sweep = time::interval(self.config.sweep_interval);
        sweep.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                cmd = self.command_rx.recv() => {
                    match cmd {
                        Some(SessionCommand::Shutdown) | None => {
                            info!("Shutting down session {}", self.code);
                            break;
                        }
                        Some(c) => self.handle_command(c).await,
                    }
                }

                Some(step) = self.step_rx.recv() => {
                    self.handle_step(step).await;
                }

                Some(evt) = self.transport_rx.recv() => {
                    self.handle_transport_event(evt).await;
                }

                _ = sweep.tick() => {
                    self.expire_handshakes(Instant::now()).await;
                }
            }
        }

        self.shutdown().await;
        info!("Session {} finished", self.code);
    }

    async fn handle_command(&mut self, cmd: SessionCommand) {
        match cmd {
            SessionCommand::CreateOffer { reply } => {
                let _ = reply.send(self.create_offer());
            }

            SessionCommand::ApplySignal { token, reply } => {
                let outcome = self.apply_signal(&token);
                if let SignalOutcome::Ignored(reason) = outcome {
                    warn!("Ignoring signal token: {:?}", reason);
                }
                let _ = reply.send(outcome);
            }

            SessionCommand::SendChat { text, reply } => {
                let _ = reply.send(self.send_chat(text).await);
            }

            SessionCommand::Cancel { peer_id, reply } => {
                let _ = reply.send(self.cancel(peer_id).await);
            }

            SessionCommand::Snapshot { reply } => {
                let _ = reply.send(self.snapshot());
            }

            SessionCommand::Shutdown => {}
        }
    }

    fn create_offer(&mut self) -> Result<PeerId, SessionError> {
        if self.role != Role::Host {
            return Err(SessionError::WrongRole {
                role: self.role,
                action: "create offers",
            });
        }

        let peer_id = PeerId::new();
        let mut handshake = Handshake::offering(peer_id, self.deadline());
        let task = tokio::spawn(drive_offer(
            self.engine.clone(),
            peer_id,
            self.transport_tx.clone(),
            self.step_tx.clone(),
        ));
        handshake.track_task(task.abort_handle());

        self.handshakes.insert(peer_id, handshake);
        self.registry.begin(peer_id, None);
        info!("Started offer {}", peer_id);
        Ok(peer_id)
    }

    fn apply_signal(&mut self, token: &str) -> SignalOutcome {
        let envelope = match SignalEnvelope::from_token(token) {
            Ok(envelope) => envelope,
            Err(e) => {
                debug!("Undecodable signal token: {}", e);
                return SignalOutcome::Ignored(IgnoreReason::Undecodable);
            }
        };

        match (envelope.kind, self.role) {
            (SignalKind::Offer, Role::Guest) => self.accept_offer(envelope),
            (SignalKind::Answer, Role::Host) => self.accept_answer(envelope),
            _ => SignalOutcome::Ignored(IgnoreReason::WrongRole),
        }
    }

    fn accept_offer(&mut self, envelope: SignalEnvelope) -> SignalOutcome {
        let busy = self.handshakes.values().any(|h| !h.state().is_terminal());
        if busy || !self.registry.is_empty() {
            return SignalOutcome::Ignored(IgnoreReason::AlreadyLinked);
        }

        let peer_id = PeerId::new();
        let remote_sdp = sdp::reconstruct(&envelope.description);
        let mut handshake = Handshake::answering(
            peer_id,
            self.deadline(),
            envelope.display_name.clone(),
            envelope.link_id,
        );
        let task = tokio::spawn(drive_answer(
            self.engine.clone(),
            peer_id,
            remote_sdp,
            self.transport_tx.clone(),
            self.step_tx.clone(),
        ));
        handshake.track_task(task.abort_handle());

        self.handshakes.insert(peer_id, handshake);
        self.registry.begin(peer_id, Some(envelope.display_name));
        info!("Answering offer as {}", peer_id);
        SignalOutcome::Accepted(peer_id)
    }

    fn accept_answer(&mut self, envelope: SignalEnvelope) -> SignalOutcome {
        let peer_id = match self.match_answer(envelope.link_id) {
            Ok(peer_id) => peer_id,
            Err(reason) => return SignalOutcome::Ignored(reason),
        };

        let Some(handshake) = self.handshakes.get_mut(&peer_id) else {
            return SignalOutcome::Ignored(IgnoreReason::NoPendingOffer);
        };
        let Some(connection) = handshake.connection() else {
            return SignalOutcome::Ignored(IgnoreReason::NoPendingOffer);
        };

        handshake.set_remote_name(envelope.display_name.clone());
        handshake.mark_answer_in_flight();
        let task = tokio::spawn(apply_answer(
            connection,
            peer_id,
            sdp::reconstruct(&envelope.description),
            self.step_tx.clone(),
        ));
        handshake.track_task(task.abort_handle());

        self.registry
            .set_display_name(peer_id, envelope.display_name);
        info!("Applying answer for {}", peer_id);
        SignalOutcome::Accepted(peer_id)
    }

    /// Exact match by link id; without one, only an unambiguous single
    /// outstanding offer qualifies.
    fn match_answer(&self, link_id: Option<PeerId>) -> Result<PeerId, IgnoreReason> {
        if let Some(id) = link_id {
            return match self.handshakes.get(&id) {
                Some(h) if h.awaits_answer() => Ok(id),
                _ => Err(IgnoreReason::NoPendingOffer),
            };
        }

        let mut awaiting = self.handshakes.values().filter(|h| h.awaits_answer());
        match (awaiting.next(), awaiting.next()) {
            (Some(h), None) => Ok(h.peer_id()),
            (None, _) => Err(IgnoreReason::NoPendingOffer),
            (Some(_), Some(_)) => Err(IgnoreReason::Ambiguous),
        }
    }

    async fn send_chat(&mut self, text: String) -> Result<ChatMessage, SessionError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(SessionError::EmptyMessage);
        }

        let message =
            ChatMessage::compose(&self.identity.id, &self.identity.display_name, text);
        let message = self.relay.broadcast_local(message, &self.registry).await?;
        Ok(message)
    }

    async fn cancel(&mut self, peer_id: PeerId) -> bool {
        let Some(state) = self.handshakes.get(&peer_id).map(|h| h.state()) else {
            return false;
        };

        if state == HandshakeState::ChannelOpen {
            self.disconnect_peer(peer_id).await;
        } else {
            self.fail_handshake(peer_id, HandshakeError::Cancelled).await;
        }
        true
    }

    fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            role: self.role,
            code: self.code,
            local: self.identity.clone(),
            peers: self
                .registry
                .iter()
                .map(|r| PeerSummary {
                    id: r.id,
                    status: r.status,
                    display_name: r.display_name.clone(),
                })
                .collect(),
            handshakes: self
                .handshakes
                .values()
                .map(|h| HandshakeSummary {
                    peer_id: h.peer_id(),
                    path: h.path(),
                    state: h.state(),
                    remote_name: h.remote_name().map(str::to_owned),
                    local_token: h.local_token().map(str::to_owned),
                })
                .collect(),
            messages: self.relay.log().to_vec(),
        }
    }

    async fn handle_step(&mut self, step: HandshakeStep) {
        let peer_id = step.peer_id();
        let Some(handshake) = self.handshakes.get_mut(&peer_id) else {
            if let HandshakeStep::ConnectionCreated(_, connection) = step {
                debug!("Connection for unknown handshake {}, closing", peer_id);
                close_in_background(connection);
            }
            return;
        };

        match step {
            HandshakeStep::ConnectionCreated(_, connection) => {
                handshake.attach_connection(connection);
            }

            HandshakeStep::Reached(_, state) => {
                if let Err(e) = handshake.advance(state) {
                    debug!("Late step for {}: {}", peer_id, e);
                }
            }

            HandshakeStep::DescriptionReady(_, full_sdp) => {
                if let Err(e) = handshake.advance(HandshakeState::LocalDescriptionReady) {
                    debug!("Late description for {}: {}", peer_id, e);
                    return;
                }

                let compressed = sdp::compress(&full_sdp);
                let name = self.identity.display_name.clone();
                let envelope = match handshake.path() {
                    HandshakePath::Offering => SignalEnvelope::offer(compressed, name, peer_id),
                    HandshakePath::Answering => {
                        SignalEnvelope::answer(compressed, name, handshake.offer_link())
                    }
                };
                let token = envelope.to_token();
                handshake.set_local_token(token.clone());

                info!("Local {} ready for {} ({} chars)", envelope.kind, peer_id, token.len());
                self.output
                    .signal_ready(peer_id, envelope.kind, token)
                    .await;
            }

            HandshakeStep::Failed(_, error) => {
                self.fail_handshake(peer_id, error).await;
            }
        }
    }

    async fn handle_transport_event(&mut self, event: TransportEvent) {
        match event {
            TransportEvent::ChannelOpen(peer_id, link) => {
                self.channel_opened(peer_id, link).await;
            }

            TransportEvent::Message(peer_id, raw) => {
                if !self.registry.get(&peer_id).is_some_and(|r| r.is_reachable()) {
                    debug!("Frame from {} before its channel opened", peer_id);
                    return;
                }
                let Some(message) = self
                    .relay
                    .relay_incoming(peer_id, &raw, &self.registry)
                    .await
                else {
                    return;
                };
                self.output.message_received(peer_id, message).await;
            }

            TransportEvent::ChannelClosed(peer_id) | TransportEvent::ConnectionLost(peer_id) => {
                let open = self
                    .handshakes
                    .get(&peer_id)
                    .map(|h| h.state() == HandshakeState::ChannelOpen);
                match open {
                    Some(true) => self.disconnect_peer(peer_id).await,
                    Some(false) => {
                        self.fail_handshake(peer_id, HandshakeError::ConnectionLost)
                            .await
                    }
                    None => debug!("Transport closed for unknown peer {}", peer_id),
                }
            }
        }
    }

    async fn channel_opened(&mut self, peer_id: PeerId, link: Arc<dyn DataLink>) {
        let Some(handshake) = self.handshakes.get_mut(&peer_id) else {
            warn!("Channel opened for unknown peer {}", peer_id);
            return;
        };
        if let Err(e) = handshake.advance(HandshakeState::ChannelOpen) {
            warn!("Unexpected channel open for {}: {}", peer_id, e);
            return;
        }
        let name = handshake.remote_name().map(str::to_owned);

        self.registry.mark_connected(peer_id, link);
        info!(
            "Peer {} ({}) connected, {} peers online",
            peer_id,
            name.as_deref().unwrap_or("unnamed"),
            self.registry.connected_count()
        );
        self.output.peer_joined(peer_id, name).await;
    }

    /// Open peer went away: forget it and tell the front end.
    async fn disconnect_peer(&mut self, peer_id: PeerId) {
        if let Some(mut handshake) = self.handshakes.remove(&peer_id) {
            if let Some(connection) = handshake.close() {
                close_in_background(connection);
            }
        }

        if self.registry.remove(&peer_id).is_some() {
            info!("Peer {} left", peer_id);
            self.output.peer_left(peer_id).await;
        }
    }

    /// Handshake ends in `Closed` before its channel opened.
    async fn fail_handshake(&mut self, peer_id: PeerId, error: HandshakeError) {
        let Some(mut handshake) = self.handshakes.remove(&peer_id) else {
            return;
        };
        warn!(
            "Handshake {} failed in {:?}: {}",
            peer_id,
            handshake.state(),
            error
        );

        if let Some(connection) = handshake.close() {
            close_in_background(connection);
        }
        self.registry.remove(&peer_id);
        self.output.handshake_failed(peer_id, error).await;
    }

    async fn expire_handshakes(&mut self, now: Instant) {
        let expired: Vec<(PeerId, HandshakeState)> = self
            .handshakes
            .values()
            .filter(|h| h.is_expired(now))
            .map(|h| (h.peer_id(), h.state()))
            .collect();

        for (peer_id, state) in expired {
            self.fail_handshake(peer_id, HandshakeError::TimedOut(state))
                .await;
        }
    }

    async fn shutdown(&mut self) {
        for (_, mut handshake) in std::mem::take(&mut self.handshakes) {
            if let Some(connection) = handshake.close() {
                if let Err(e) = connection.close().await {
                    debug!("Error closing connection: {}", e);
                }
            }
        }
    }

    fn deadline(&self) -> Instant {
        Instant::now() + self.config.handshake_timeout
    }
}

fn close_in_background(connection: Arc<dyn PeerConnection>) {
    tokio::spawn(async move {
        if let Err(e) = connection.close().await {
            debug!("Error closing connection: {}", e);
        }
    });
}
