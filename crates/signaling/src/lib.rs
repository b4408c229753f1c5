//! advocall-signaling – Session- und Anruf-Koordinator
//!
//! Dieser Crate verwaltet, welcher Teilnehmer auf welchem Live-Kanal
//! erreichbar ist, leitet Chat- und WebRTC-Signale nach Teilnehmer-ID weiter
//! und fuehrt die Zustandsmaschine eines Anrufs inklusive Status-Nebeneffekten.
//!
//! ## Architektur
//!
//! ```text
//! WebSocket /ws (ws_router)
//!     |
//!     v
//! ClientConnection (pro Kanal ein Task, begrenzte Send-Queue)
//!     |
//!     v
//! MessageDispatcher (Dekodieren, authenticate, Auth-Gate)
//!     |
//!     v
//! Coordinator (eine Sperre)
//!     +-- Directory        (Teilnehmer, Rolle, Status)
//!     +-- SessionRegistry  (Teilnehmer -> Send-Queue)
//!     +-- CallTable        (symmetrische Anruf-Paare)
//!     +-- Handler          (chat, offer/answer/ice-candidate, call-*)
//!     +-- Presence         (rollen-partitionierte Listen)
//! ```

pub mod calls;
pub mod connection;
pub mod coordinator;
pub mod directory;
pub mod dispatcher;
pub mod error;
mod handlers;
pub mod metrics;
pub mod presence;
pub mod sessions;
pub mod state;
pub mod ws;

// Bequeme Re-Exporte
pub use calls::CallTable;
pub use connection::ClientConnection;
pub use coordinator::{Abgelehnt, Coordinator, Statistik};
pub use directory::Directory;
pub use dispatcher::{DispatcherContext, MessageDispatcher};
pub use error::{SignalingError, SignalingResult};
pub use metrics::{KeineMetriken, SignalingMetriken};
pub use sessions::{ClientSender, SessionRegistry};
pub use state::{SignalingConfig, SignalingState};
pub use ws::ws_router;
