//! Session configuration.

/// Default service identifier shared by all devices in a witness mesh.
///
/// A discoverer only pairs with an advertiser carrying the same service id,
/// so this acts as the channel name for the whole application.
pub const DEFAULT_SERVICE_ID: &str = "witness";

/// Pairing strategy requested from the transport substrate.
///
/// Strategies determine how many incoming and outgoing connections the
/// substrate allows at the same time. Only devices using the same strategy
/// and service id will find each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionStrategy {
    /// One advertiser pairs with many discoverers at the substrate level.
    /// The session manager only ever uses a single edge of that star.
    #[default]
    Star,
}

/// Pairing strategy used by every session, passed to the substrate with
/// every advertise and discover command. Fixed per deployment, not
/// runtime-negotiable.
pub const STRATEGY: ConnectionStrategy = ConnectionStrategy::Star;

/// Configuration for a peer session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Name advertised to discovering peers (the local identity).
    pub local_name: String,

    /// Service identifier used for both advertising and discovery.
    pub service_id: String,
}

impl SessionConfig {
    /// Create a configuration advertising under the given local name.
    pub fn new(local_name: impl Into<String>) -> Self {
        Self {
            local_name: local_name.into(),
            service_id: DEFAULT_SERVICE_ID.to_string(),
        }
    }

    /// Override the service identifier.
    pub fn with_service_id(mut self, service_id: impl Into<String>) -> Self {
        self.service_id = service_id.into();
        self
    }
}
