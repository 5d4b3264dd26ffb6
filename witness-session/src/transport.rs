//! Transport substrate boundary.
//!
//! The session manager treats peer discovery and connection transport as an
//! opaque capability: advertise, discover, accept or reject an offered
//! connection, send bytes, disconnect. Implementations wrap whatever
//! short-range link the platform provides and forward its callbacks as
//! [`TransportEvent`]s over the channel handed to [`PeerTransport::bind_events`].

use std::fmt;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::config::ConnectionStrategy;
use crate::error::SessionResult;

/// Identifier of a remote device as known to the transport substrate.
///
/// Opaque to this crate; equality is by identifier value. The substrate owns
/// the physical connection behind it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EndpointId(pub String);

impl EndpointId {
    /// Create an endpoint id from its substrate identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The raw identifier string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EndpointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for EndpointId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Asynchronous events delivered by the transport substrate.
///
/// Events may originate from any number of substrate callback threads in
/// parallel; the session serializes them through a single channel consumer.
#[derive(Debug, Clone)]
pub enum TransportEvent {
    /// A remote peer offered a connection. Either side may have initiated;
    /// the offer must be accepted or rejected before bytes can flow.
    ConnectionInitiated {
        /// The offering endpoint.
        endpoint: EndpointId,
    },

    /// A previously offered connection resolved.
    ConnectionResult {
        /// The endpoint the negotiation was with.
        endpoint: EndpointId,
        /// Whether the negotiation succeeded.
        success: bool,
    },

    /// An established connection dropped.
    Disconnected {
        /// The endpoint that disconnected.
        endpoint: EndpointId,
    },

    /// Raw bytes arrived from an endpoint.
    PayloadReceived {
        /// The sending endpoint.
        endpoint: EndpointId,
        /// The payload, exactly as sent by the remote peer.
        bytes: Vec<u8>,
    },
}

/// Commands accepted by the transport substrate.
///
/// All commands are non-blocking; outcomes arrive later as events. The
/// session driver issues every command from a single task, so implementations
/// never see concurrent command calls, but events may still be delivered from
/// parallel substrate threads.
pub trait PeerTransport: Send + Sync {
    /// Wire the substrate's callbacks to the session's event channel.
    ///
    /// Called once when the session driver starts, before any command.
    fn bind_events(&self, events: mpsc::UnboundedSender<TransportEvent>);

    /// Broadcast local availability under `local_name` for `service_id`,
    /// pairing with the given strategy.
    fn start_advertising(
        &self,
        local_name: &str,
        service_id: &str,
        strategy: ConnectionStrategy,
    ) -> SessionResult<()>;

    /// Stop broadcasting local availability.
    fn stop_advertising(&self) -> SessionResult<()>;

    /// Scan for peers advertising `service_id` under the same strategy and
    /// request a connection to any that match. Matches surface as
    /// [`TransportEvent::ConnectionInitiated`].
    fn start_discovery(&self, service_id: &str, strategy: ConnectionStrategy)
        -> SessionResult<()>;

    /// Stop scanning for peers.
    fn stop_discovery(&self) -> SessionResult<()>;

    /// Accept a connection offered via [`TransportEvent::ConnectionInitiated`].
    fn accept_connection(&self, endpoint: &EndpointId) -> SessionResult<()>;

    /// Reject a connection offered via [`TransportEvent::ConnectionInitiated`],
    /// letting the offering peer retry elsewhere.
    fn reject_connection(&self, endpoint: &EndpointId) -> SessionResult<()>;

    /// Drop the connection to a single endpoint.
    fn disconnect(&self, endpoint: &EndpointId) -> SessionResult<()>;

    /// Drop every connection and stop all substrate activity.
    fn disconnect_all(&self) -> SessionResult<()>;

    /// Send raw bytes to an endpoint. Paired with a remote recv call; no
    /// delivery confirmation beyond what the substrate itself offers.
    fn send_bytes(&self, endpoint: &EndpointId, bytes: Vec<u8>) -> SessionResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_equality_by_value() {
        assert_eq!(EndpointId::new("E1"), EndpointId::from("E1"));
        assert_ne!(EndpointId::new("E1"), EndpointId::new("E2"));
    }

    #[test]
    fn test_endpoint_display() {
        assert_eq!(EndpointId::new("E1").to_string(), "E1");
        assert_eq!(EndpointId::new("E1").as_str(), "E1");
    }
}
