//! WebSocket message types.
//!
//! Outbound commands are selected by an `action` field; inbound frames by a
//! `type` field with the payload under `data`. Inbound frames are parsed in
//! two steps: the envelope first, then the payload for the recognized type,
//! so that unknown types can be ignored without treating them as errors.

use serde::{Deserialize, Serialize};

use crate::types::candle::first_out_of_order;
use crate::types::position::first_duplicate_ticket;
use crate::types::{Candle, Position, Price, Quote, Side, Ticket, Timeframe, Volume};

use super::error::WsError;

/// Identifier attached to an outbound command and echoed by the bridge.
pub type RequestId = u64;

/// Client-to-bridge commands.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Request a full candle series.
    GetRates {
        /// Symbol.
        symbol: String,
        /// Candle bucket size.
        timeframe: Timeframe,
        /// Maximum number of candles.
        count: u32,
    },
    /// Request a single tick.
    GetTick {
        /// Symbol.
        symbol: String,
    },
    /// Request the open positions snapshot.
    GetPositions,
    /// Open a market position.
    PlaceOrder {
        /// Symbol.
        symbol: String,
        /// Direction.
        order_type: Side,
        /// Volume in lots.
        volume: Volume,
        /// Stop loss level, explicit null when absent.
        sl: Option<Price>,
        /// Take profit level, explicit null when absent.
        tp: Option<Price>,
    },
    /// Close a position by ticket.
    ClosePosition {
        /// Ticket of the position to close.
        ticket: Ticket,
    },
}

impl ClientMessage {
    /// Returns the wire name of the command.
    #[must_use]
    pub const fn action(&self) -> &'static str {
        match self {
            Self::GetRates { .. } => "get_rates",
            Self::GetTick { .. } => "get_tick",
            Self::GetPositions => "get_positions",
            Self::PlaceOrder { .. } => "place_order",
            Self::ClosePosition { .. } => "close_position",
        }
    }

    /// Serializes the command to a text frame, appending `request_id` when
    /// one is given.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_frame(&self, request_id: Option<RequestId>) -> Result<String, WsError> {
        let mut value = serde_json::to_value(self)?;
        if let (Some(id), Some(object)) = (request_id, value.as_object_mut()) {
            object.insert("request_id".to_string(), id.into());
        }
        Ok(serde_json::to_string(&value)?)
    }
}

/// Result payload of `order_result` and `close_result` frames.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandResult {
    /// Whether the bridge executed the command.
    pub success: bool,
    /// Bridge-supplied failure reason.
    #[serde(default)]
    pub error: Option<String>,
    /// Ticket of the opened or closed position.
    #[serde(default)]
    pub ticket: Option<Ticket>,
    /// Executed volume.
    #[serde(default)]
    pub volume: Option<Volume>,
    /// Execution price.
    #[serde(default)]
    pub price: Option<Price>,
}

/// Bridge-to-client messages after validation.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerMessage {
    /// Full candle series for the active subscription.
    Rates(Vec<Candle>),
    /// Latest quote; None when the bridge could not read a tick.
    Tick(Option<Quote>),
    /// Full open positions snapshot.
    Positions(Vec<Position>),
    /// Outcome of `place_order`.
    OrderResult(CommandResult),
    /// Outcome of `close_position`.
    CloseResult(CommandResult),
    /// Any other `type`; carried only for logging.
    Unknown(String),
}

impl ServerMessage {
    /// Returns a short label for logs.
    #[must_use]
    pub fn kind(&self) -> &str {
        match self {
            Self::Rates(_) => "rates",
            Self::Tick(_) => "tick",
            Self::Positions(_) => "positions",
            Self::OrderResult(_) => "order_result",
            Self::CloseResult(_) => "close_result",
            Self::Unknown(kind) => kind,
        }
    }
}

/// A parsed inbound frame.
#[derive(Debug, Clone, PartialEq)]
pub struct InboundFrame {
    /// The validated message.
    pub message: ServerMessage,
    /// Echoed request id, when the bridge sends one.
    pub request_id: Option<RequestId>,
}

/// Reasons an inbound frame is rejected.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FrameError {
    /// Not a JSON object with a `type` field.
    #[error("malformed frame: {0}")]
    Malformed(String),

    /// Known `type` whose `data` violates the schema.
    #[error("invalid {kind} payload: {reason}")]
    InvalidPayload {
        /// The frame type.
        kind: String,
        /// What was wrong.
        reason: String,
    },
}

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    kind: serde_json::Value,
    #[serde(default)]
    data: serde_json::Value,
    #[serde(default)]
    request_id: Option<RequestId>,
    #[serde(default)]
    symbol: Option<String>,
}

impl InboundFrame {
    /// Parses and validates a raw text frame.
    ///
    /// # Errors
    ///
    /// Returns `FrameError::Malformed` if the frame is not a JSON object with
    /// a `type` field, and `FrameError::InvalidPayload` if the payload of a
    /// recognized type does not match its schema. A `type` that is not a
    /// string is treated as an unknown type.
    pub fn parse(raw: &str) -> Result<Self, FrameError> {
        let object: serde_json::Map<String, serde_json::Value> =
            serde_json::from_str(raw).map_err(|e| FrameError::Malformed(e.to_string()))?;
        let envelope: Envelope = serde_json::from_value(serde_json::Value::Object(object))
            .map_err(|e| FrameError::Malformed(e.to_string()))?;

        let Some(kind) = envelope.kind.as_str() else {
            return Ok(Self {
                message: ServerMessage::Unknown(envelope.kind.to_string()),
                request_id: envelope.request_id,
            });
        };
        let message = match kind {
            "rates" => {
                let series: Option<Vec<Candle>> = payload(kind, envelope.data)?;
                let series = series.unwrap_or_default();
                if let Some(index) = first_out_of_order(&series) {
                    return Err(invalid(
                        kind,
                        format!("candle {} is not after its predecessor", index),
                    ));
                }
                ServerMessage::Rates(series)
            }
            "tick" | "tick_update" => {
                let quote: Option<Quote> = payload(kind, envelope.data)?;
                ServerMessage::Tick(quote.map(|mut q| {
                    if q.symbol.is_none() {
                        q.symbol = envelope.symbol;
                    }
                    q
                }))
            }
            "positions" => {
                let positions: Option<Vec<Position>> = payload(kind, envelope.data)?;
                let positions = positions.unwrap_or_default();
                if let Some(ticket) = first_duplicate_ticket(&positions) {
                    return Err(invalid(kind, format!("duplicate ticket {}", ticket)));
                }
                ServerMessage::Positions(positions)
            }
            "order_result" => ServerMessage::OrderResult(payload(kind, envelope.data)?),
            "close_result" => ServerMessage::CloseResult(payload(kind, envelope.data)?),
            _ => ServerMessage::Unknown(kind.to_string()),
        };

        Ok(Self {
            message,
            request_id: envelope.request_id,
        })
    }
}

fn payload<T: serde::de::DeserializeOwned>(
    kind: &str,
    data: serde_json::Value,
) -> Result<T, FrameError> {
    serde_json::from_value(data).map_err(|e| invalid(kind, e.to_string()))
}

fn invalid(kind: &str, reason: String) -> FrameError {
    FrameError::InvalidPayload {
        kind: kind.to_string(),
        reason,
    }
}
