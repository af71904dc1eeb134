//! Message router: the boundary between wire text and domain types.
//!
//! Inbound frames become [`PeerCommand`]s or are dropped; outbound
//! [`DeviceEvent`]s become frames. Nothing here touches device state.

use log::{debug, warn};

use crate::app::commands::PeerCommand;
use crate::app::events::DeviceEvent;
use crate::error::{CodecError, Result};

use super::codec::{self, OutboundFrame};

/// Decode one frame, surfacing why it was refused.
///
/// `Ok(None)` means the frame was well formed but named an event this device
/// does not handle. Such frames are not held to the field limits.
pub fn decode_command(text: &str) -> Result<Option<PeerCommand>> {
    let Some(envelope) = codec::decode_if(text, PeerCommand::is_known)? else {
        return Ok(None);
    };
    Ok(PeerCommand::parse(&envelope.event, &envelope.value)?)
}

/// Decode one frame for the control loop. Refused frames are logged and
/// dropped; nothing is reported back to the peer.
pub fn decode_inbound(text: &str) -> Option<PeerCommand> {
    debug!("<- {text}");
    match decode_command(text) {
        Ok(Some(cmd)) => Some(cmd),
        Ok(None) => {
            debug!("Ignoring unhandled event");
            None
        }
        Err(e) => {
            warn!("Dropping inbound frame: {e}");
            None
        }
    }
}

/// Encode one device event.
pub fn encode_outbound(event: &DeviceEvent) -> core::result::Result<OutboundFrame, CodecError> {
    codec::encode(event.name(), event.value())
}
