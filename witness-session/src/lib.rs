//! Peer connection session management for the Witness mesh.
//!
//! Witness devices share a tamper-evident log of record accesses over ad-hoc
//! short-range links, with no central server. This crate provides the
//! session manager: it discovers nearby peers, negotiates exactly one active
//! bidirectional connection at a time, and exposes a blocking send/receive
//! byte transport to the ledger synchronization layer above it.
//!
//! # Architecture
//!
//! Substrate callbacks become [`TransportEvent`] messages consumed by a
//! single driver task, which owns the connection state machine and issues
//! every substrate command:
//!
//! ```text
//! substrate callbacks --events--> SessionDriver --commands--> PeerTransport
//!                                   |         |
//!                             HandoffSlot   PayloadInbox
//!                                   |         |
//!                     establish_connection   recv       (blocked callers)
//! ```
//!
//! Each device plays advertiser and discoverer simultaneously; whichever
//! side's negotiation resolves first wins, and later offers are rejected so
//! the offering peer can retry elsewhere. Negotiation failure re-arms the
//! search with no backoff and no retry limit; only [`Session::close`] halts
//! it.
//!
//! # Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use witness_session::{Session, SessionConfig};
//!
//! let session = Session::spawn(SessionConfig::new("device-a"), transport);
//! session.create()?;
//! let peer = session.establish_connection().await?;
//! session.send(&peer, b"hello".to_vec())?;
//! let reply = session.recv().await?;
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod session;
pub mod transport;

// Re-export main types
pub use config::{ConnectionStrategy, SessionConfig, DEFAULT_SERVICE_ID, STRATEGY};
pub use error::{SessionError, SessionResult};
pub use session::{HandoffSlot, PayloadInbox, Session, SessionState};
pub use transport::{EndpointId, PeerTransport, TransportEvent};
