//! Trade models and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decimal::{precision, Amount, Price, Quantity};
use crate::model::instrument::InstrumentId;

/// Trade model representing a matched pair of orders
///
/// Created only by the matching pass and never mutated afterwards;
/// ownership passes to the trade sink on emission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    /// Unique trade ID
    pub id: Uuid,
    /// Instrument the trade executed on
    pub instrument: InstrumentId,
    /// Price at which the trade executed
    pub price: Price,
    /// Quantity traded
    pub quantity: Quantity,
    /// Total amount (price * quantity)
    pub amount: Amount,
    /// Buy order ID
    pub buy_order_id: Uuid,
    /// Sell order ID
    pub sell_order_id: Uuid,
    /// Per-instrument emission sequence number
    pub trade_sequence: u64,
    /// Timestamp when the trade occurred
    pub created_at: DateTime<Utc>,
}

impl Trade {
    /// Create a new trade from matched orders
    pub fn new(
        instrument: InstrumentId,
        price: Price,
        quantity: Quantity,
        buy_order_id: Uuid,
        sell_order_id: Uuid,
        trade_sequence: u64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            instrument,
            price,
            quantity,
            amount: precision::notional(price, quantity),
            buy_order_id,
            sell_order_id,
            trade_sequence,
            created_at: Utc::now(),
        }
    }
}
