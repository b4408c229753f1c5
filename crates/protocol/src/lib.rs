//! advocall-protocol – Ereignis-Definitionen des Signaling-Kanals
//!
//! Dieses Crate definiert alle Ereignisse die zwischen Teilnehmer und
//! Koordinator ueber den WebSocket-Kanal ausgetauscht werden, sowie den
//! JSON-Codec fuer Text-Frames.

pub mod codec;
pub mod events;

pub use codec::{JsonCodec, ProtocolError};
pub use events::{ClientEvent, ErrorCode, ServerEvent, UserListUpdate};
