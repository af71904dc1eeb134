//! JSON envelope codec.
//!
//! Every message in either direction is a flat object with two string
//! fields:
//!
//! ```json
//! {"event":"PumpState","value":"ON"}
//! ```
//!
//! Extra fields are ignored. Decoded fields are copied into fixed-capacity
//! strings so nothing downstream holds on to the transport buffer.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::CodecError;

/// Longest accepted event name.
pub const EVENT_CAP: usize = 24;
/// Longest accepted value.
pub const VALUE_CAP: usize = 64;
/// Capacity of one encoded outbound frame.
pub const OUTBOUND_FRAME_CAP: usize = 128;

pub type OutboundFrame = heapless::String<OUTBOUND_FRAME_CAP>;

/// A decoded `{event, value}` message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub event: heapless::String<EVENT_CAP>,
    pub value: heapless::String<VALUE_CAP>,
}

#[derive(Serialize)]
struct WireOut<'a> {
    event: &'a str,
    value: &'a str,
}

fn bounded<const N: usize>(s: &str) -> Result<heapless::String<N>, CodecError> {
    let mut out = heapless::String::new();
    out.push_str(s).map_err(|()| CodecError::FieldTooLong)?;
    Ok(out)
}

/// Top level must be an object; arrays and scalars are refused.
fn object(text: &str) -> Result<Map<String, Value>, CodecError> {
    serde_json::from_str(text).map_err(|_| CodecError::Malformed)
}

fn field<'a>(object: &'a Map<String, Value>, key: &str) -> Result<&'a str, CodecError> {
    object
        .get(key)
        .and_then(Value::as_str)
        .ok_or(CodecError::Malformed)
}

/// Parse one text frame.
pub fn decode(text: &str) -> Result<Envelope, CodecError> {
    let object = object(text)?;
    Ok(Envelope {
        event: bounded(field(&object, "event")?)?,
        value: bounded(field(&object, "value")?)?,
    })
}

/// Parse one text frame, skipping it when `wanted` rejects the event name.
///
/// The name is checked before any field limit applies, so a long or odd
/// event nobody handles yields `Ok(None)` instead of an error.
pub fn decode_if(
    text: &str,
    wanted: impl Fn(&str) -> bool,
) -> Result<Option<Envelope>, CodecError> {
    let object = object(text)?;
    let event = field(&object, "event")?;
    let value = field(&object, "value")?;
    if !wanted(event) {
        return Ok(None);
    }
    Ok(Some(Envelope {
        event: bounded(event)?,
        value: bounded(value)?,
    }))
}

/// Render one outbound frame.
pub fn encode(event: &str, value: &str) -> Result<OutboundFrame, CodecError> {
    let json = serde_json::to_string(&WireOut { event, value })
        .map_err(|_| CodecError::EncodeFailed)?;
    bounded(&json)
}
