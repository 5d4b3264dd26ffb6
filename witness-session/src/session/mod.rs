//! Peer session management.
//!
//! This module provides:
//! - The connection state machine, run by a single driver task
//! - The blocking send/receive facade handed to higher layers
//! - The handoff and inbox primitives bridging driver and callers

pub mod handoff;
pub mod inbox;
pub mod state;

pub use handoff::HandoffSlot;
pub use inbox::PayloadInbox;
pub use state::SessionState;

use std::sync::Arc;

use tokio::sync::{mpsc, watch};

use crate::config::{SessionConfig, STRATEGY};
use crate::error::{SessionError, SessionResult};
use crate::transport::{EndpointId, PeerTransport, TransportEvent};

/// Commands sent from the facade to the driver task.
#[derive(Debug)]
enum SessionCommand {
    /// Arm the session into searching mode.
    Create,
    /// Forward bytes to the transport for an endpoint.
    Send {
        endpoint: EndpointId,
        bytes: Vec<u8>,
    },
    /// Tear everything down and return to idle.
    Close,
}

/// Handle to a running peer session.
///
/// Cloneable; all clones share the same driver task. A process is expected
/// to hold one session for its lifetime, re-arming it with [`Session::create`]
/// after a [`Session::close`]. `establish_connection` and `recv` are the only
/// blocking operations.
#[derive(Debug, Clone)]
pub struct Session {
    commands: mpsc::UnboundedSender<SessionCommand>,
    handoff: Arc<HandoffSlot>,
    inbox: Arc<PayloadInbox>,
    state_rx: watch::Receiver<SessionState>,
}

impl Session {
    /// Spawn the session driver over the given transport.
    ///
    /// The session starts idle; call [`Session::create`] to begin searching.
    /// Must be called from within a tokio runtime.
    pub fn spawn(config: SessionConfig, transport: Arc<dyn PeerTransport>) -> Session {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(SessionState::Idle);

        transport.bind_events(event_tx);

        let handoff = Arc::new(HandoffSlot::new());
        let inbox = Arc::new(PayloadInbox::new());

        let driver = SessionDriver {
            config,
            transport,
            state: SessionState::Idle,
            current: None,
            handoff: handoff.clone(),
            inbox: inbox.clone(),
            state_tx,
        };
        tokio::spawn(driver.run(event_rx, command_rx));

        Session {
            commands: command_tx,
            handoff,
            inbox,
            state_rx,
        }
    }

    /// Enter advertising and discovery mode simultaneously.
    ///
    /// Idempotent: calling this while already searching has no effect.
    pub fn create(&self) -> SessionResult<()> {
        self.command(SessionCommand::Create)
    }

    /// Wait until a connection is established and return the peer's id.
    ///
    /// Each call claims exactly one established connection, pairing
    /// one-to-one with one successful negotiation. Returns `Err(Closed)` if
    /// the session is closed while waiting.
    pub async fn establish_connection(&self) -> SessionResult<EndpointId> {
        self.handoff.take().await
    }

    /// Send bytes over the link. Paired with a corresponding remote recv.
    ///
    /// Non-blocking; no delivery confirmation beyond what the substrate
    /// offers. Callers pass the endpoint returned by `establish_connection`.
    pub fn send(&self, endpoint: &EndpointId, bytes: Vec<u8>) -> SessionResult<()> {
        self.command(SessionCommand::Send {
            endpoint: endpoint.clone(),
            bytes,
        })
    }

    /// Wait for the next payload from the established peer.
    ///
    /// Payloads are returned in exactly the order the substrate delivered
    /// them. Returns `Err(Closed)` if the session is closed while waiting.
    pub async fn recv(&self) -> SessionResult<Vec<u8>> {
        self.inbox.take().await
    }

    /// Terminate all connections and return to idle.
    ///
    /// Wakes any caller blocked in `establish_connection` or `recv` with
    /// `Err(Closed)`. The session may be re-armed with [`Session::create`].
    pub fn close(&self) -> SessionResult<()> {
        self.command(SessionCommand::Close)
    }

    /// Watch connection state changes.
    pub fn state_watch(&self) -> watch::Receiver<SessionState> {
        self.state_rx.clone()
    }

    /// Current connection state.
    pub fn state(&self) -> SessionState {
        *self.state_rx.borrow()
    }

    fn command(&self, command: SessionCommand) -> SessionResult<()> {
        self.commands
            .send(command)
            .map_err(|e| SessionError::ChannelSend(e.to_string()))
    }
}

/// The connection state machine.
///
/// Owns the session state and the current endpoint exclusively. Every
/// transition and every transport command executes on this single task, so
/// two substrate callbacks can never interleave partial updates or
/// double-issue start/stop commands.
struct SessionDriver {
    config: SessionConfig,
    transport: Arc<dyn PeerTransport>,
    state: SessionState,
    /// The peer we are currently connected to, if any. The substrate owns
    /// the physical connection; this only names it.
    current: Option<EndpointId>,
    handoff: Arc<HandoffSlot>,
    inbox: Arc<PayloadInbox>,
    state_tx: watch::Sender<SessionState>,
}

impl SessionDriver {
    /// Run the driver until every facade handle and the transport's event
    /// sender have gone away.
    async fn run(
        mut self,
        mut events: mpsc::UnboundedReceiver<TransportEvent>,
        mut commands: mpsc::UnboundedReceiver<SessionCommand>,
    ) {
        loop {
            tokio::select! {
                Some(command) = commands.recv() => {
                    self.handle_command(command).await;
                }
                Some(event) = events.recv() => {
                    self.handle_event(event).await;
                }
                else => break,
            }
        }
        tracing::debug!("Session driver stopped");
    }

    /// Handle a facade command.
    async fn handle_command(&mut self, command: SessionCommand) {
        match command {
            SessionCommand::Create => {
                self.handoff.reopen();
                self.inbox.reopen();
                self.set_state(SessionState::Searching);
            }
            SessionCommand::Send { endpoint, bytes } => {
                if let Err(e) = self.transport.send_bytes(&endpoint, bytes) {
                    tracing::warn!(endpoint = %endpoint, error = %e, "Send failed");
                }
            }
            SessionCommand::Close => {
                tracing::info!("Session closing");
                self.set_state(SessionState::Idle);
                self.handoff.close();
                self.inbox.close();
            }
        }
    }

    /// Handle a transport event.
    async fn handle_event(&mut self, event: TransportEvent) {
        match event {
            TransportEvent::ConnectionInitiated { endpoint } => {
                self.on_connection_initiated(endpoint);
            }
            TransportEvent::ConnectionResult { endpoint, success } => {
                self.on_connection_result(endpoint, success).await;
            }
            TransportEvent::Disconnected { endpoint } => {
                self.on_disconnected(endpoint);
            }
            TransportEvent::PayloadReceived { endpoint, bytes } => {
                self.on_payload_received(endpoint, bytes);
            }
        }
    }

    /// A peer offered a connection.
    ///
    /// Accepted only while searching with no unclaimed connection pending.
    /// Anything else is rejected, never silently ignored, so the offering
    /// peer can retry elsewhere.
    fn on_connection_initiated(&mut self, endpoint: EndpointId) {
        if self.state.is_searching() && self.handoff.is_empty() {
            tracing::debug!(endpoint = %endpoint, "Accepting connection offer");
            if let Err(e) = self.transport.accept_connection(&endpoint) {
                tracing::warn!(endpoint = %endpoint, error = %e, "Accept failed");
            }
        } else {
            tracing::debug!(endpoint = %endpoint, state = %self.state, "Rejecting connection offer");
            if let Err(e) = self.transport.reject_connection(&endpoint) {
                tracing::warn!(endpoint = %endpoint, error = %e, "Reject failed");
            }
        }
    }

    /// A connection negotiation resolved.
    ///
    /// Success while searching wins the advertiser/discoverer race: the
    /// endpoint is recorded, published for the blocked caller, and both
    /// discovery and advertising stop. Failure re-arms the race with no
    /// backoff and no retry limit.
    async fn on_connection_result(&mut self, endpoint: EndpointId, success: bool) {
        if self.state.is_connected() {
            // Impossible by construction: discovery and advertising stop
            // before the connected state is entered.
            tracing::error!(endpoint = %endpoint, success, "Connection result while already connected");
            if success {
                let _ = self.transport.disconnect(&endpoint);
            }
            return;
        }

        if !self.state.is_searching() {
            // Resolved after a close; the session is no longer interested.
            tracing::debug!(endpoint = %endpoint, success, "Negotiation resolved while idle");
            if success {
                let _ = self.transport.disconnect(&endpoint);
            }
            return;
        }

        if success {
            if !self.handoff.is_empty() {
                tracing::error!(endpoint = %endpoint, "Second negotiation succeeded before the first was claimed");
                let _ = self.transport.disconnect(&endpoint);
                return;
            }
            tracing::info!(endpoint = %endpoint, "Connection established");
            self.current = Some(endpoint.clone());
            self.handoff.publish(endpoint).await;
            self.set_state(SessionState::Connected);
        } else {
            tracing::debug!(endpoint = %endpoint, "Negotiation failed, re-arming search");
            self.set_state(SessionState::Idle);
            self.set_state(SessionState::Searching);
        }
    }

    /// An established connection dropped.
    ///
    /// Disconnects of endpoints other than the current peer (for instance a
    /// rejected offeror giving up) do not disturb the session.
    fn on_disconnected(&mut self, endpoint: EndpointId) {
        if self.current.as_ref() != Some(&endpoint) {
            tracing::debug!(endpoint = %endpoint, "Disconnect from non-established endpoint");
            return;
        }
        tracing::info!(endpoint = %endpoint, "Peer disconnected, re-arming search");
        self.set_state(SessionState::Idle);
        self.set_state(SessionState::Searching);
    }

    /// Bytes arrived from an endpoint.
    ///
    /// Only the established peer may deliver payloads. A stray sender is
    /// forcibly disconnected and its payload discarded, so a stale or rogue
    /// endpoint cannot inject data into the session.
    fn on_payload_received(&mut self, endpoint: EndpointId, bytes: Vec<u8>) {
        if self.current.as_ref() == Some(&endpoint) {
            tracing::debug!(endpoint = %endpoint, len = bytes.len(), "Payload received");
            self.inbox.push(bytes);
        } else {
            tracing::warn!(endpoint = %endpoint, "Cross-talk payload, disconnecting sender");
            let _ = self.transport.disconnect(&endpoint);
        }
    }

    /// Transition the state machine, driving substrate mode changes.
    ///
    /// A no-op when the target equals the current state, so re-entry has no
    /// side effects.
    fn set_state(&mut self, next: SessionState) {
        if self.state == next {
            return;
        }
        tracing::debug!(from = %self.state, to = %next, "Session state change");
        self.state = next;
        let _ = self.state_tx.send(next);

        match next {
            SessionState::Searching => {
                self.reset();
                self.start_discovery();
                self.start_advertising();
            }
            SessionState::Connected => {
                if let Err(e) = self.transport.stop_discovery() {
                    tracing::warn!(error = %e, "Stop discovery failed");
                }
                if let Err(e) = self.transport.stop_advertising() {
                    tracing::warn!(error = %e, "Stop advertising failed");
                }
            }
            SessionState::Idle => self.reset(),
        }
    }

    /// Disconnect everything and clear all pending connection state.
    fn reset(&mut self) {
        self.current = None;
        self.inbox.clear();
        if let Err(e) = self.transport.disconnect_all() {
            tracing::warn!(error = %e, "Disconnect-all failed");
        }
        self.handoff.clear();
    }

    fn start_discovery(&self) {
        if let Err(e) = self
            .transport
            .start_discovery(&self.config.service_id, STRATEGY)
        {
            tracing::warn!(error = %e, "Start discovery failed");
        }
    }

    fn start_advertising(&self) {
        if let Err(e) = self.transport.start_advertising(
            &self.config.local_name,
            &self.config.service_id,
            STRATEGY,
        ) {
            tracing::warn!(error = %e, "Start advertising failed");
        }
    }
}
