//! Peer wire protocol: a JSON `{event, value}` envelope over text frames.
//!
//! ```text
//!  Transport frame ──▶ codec::decode ──▶ router ──▶ PeerCommand
//!  DeviceEvent ──▶ router ──▶ codec::encode ──▶ Transport frame
//! ```

pub mod codec;
pub mod router;

pub use codec::{Envelope, OutboundFrame};
pub use router::{decode_command, decode_inbound, encode_outbound};
