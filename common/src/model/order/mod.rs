//! Order models and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decimal::{Price, Quantity};
use crate::error::{Error, Result};
use crate::model::instrument::InstrumentId;

/// Order side (buy or sell)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Buy,
    Sell,
}

/// Order status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    /// Order has been accepted but nothing has executed against it
    New,
    /// Order has executed partially and still rests in the book
    PartiallyFilled,
    /// Order has been filled completely and left the book
    Filled,
}

/// Limit order model
///
/// Identity is fixed at creation; the only mutation the core performs is
/// decrementing `remaining_quantity` during a matching pass. The `sequence`
/// number is assigned once at submission and is used solely to break price
/// ties, earliest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    /// Unique order ID
    pub id: Uuid,
    /// Instrument whose book this order belongs to
    pub instrument: InstrumentId,
    /// Order side (buy or sell)
    pub side: Side,
    /// Limit price
    pub price: Price,
    /// Original quantity
    pub quantity: Quantity,
    /// Remaining quantity
    pub remaining_quantity: Quantity,
    /// Global submission sequence number
    pub sequence: u64,
    /// Current status
    pub status: Status,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Create a new limit order
    pub fn new_limit(
        instrument: InstrumentId,
        side: Side,
        price: Price,
        quantity: Quantity,
        sequence: u64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            instrument,
            side,
            price,
            quantity,
            remaining_quantity: quantity,
            sequence,
            status: Status::New,
            created_at: Utc::now(),
        }
    }

    /// Decrement the remaining quantity after an execution
    ///
    /// Filling more than the remaining quantity, or nothing at all, can only
    /// come from a broken matching pass and is surfaced as an engine fault.
    pub fn fill(&mut self, quantity: Quantity) -> Result<()> {
        if quantity == 0 || quantity > self.remaining_quantity {
            return Err(Error::EngineFault(format!(
                "fill of {} against order {} with {} remaining",
                quantity, self.id, self.remaining_quantity
            )));
        }
        self.remaining_quantity -= quantity;
        self.status = if self.remaining_quantity == 0 {
            Status::Filled
        } else {
            Status::PartiallyFilled
        };
        Ok(())
    }

    /// Cumulative quantity executed so far
    pub fn filled_quantity(&self) -> Quantity {
        self.quantity - self.remaining_quantity
    }

    /// Check if the order is fully filled
    pub fn is_filled(&self) -> bool {
        self.remaining_quantity == 0
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    fn order(quantity: Quantity) -> Order {
        let instrument = InstrumentId::new(7).unwrap();
        Order::new_limit(instrument, Side::Buy, dec!(20), quantity, 1)
    }

    #[test]
    fn fill_walks_through_statuses() {
        let mut order = order(100);
        assert_eq!(order.status, Status::New);

        order.fill(60).unwrap();
        assert_eq!(order.status, Status::PartiallyFilled);
        assert_eq!(order.remaining_quantity, 40);
        assert_eq!(order.filled_quantity(), 60);

        order.fill(40).unwrap();
        assert_eq!(order.status, Status::Filled);
        assert!(order.is_filled());
    }

    #[test]
    fn overfill_is_an_engine_fault() {
        let mut order = order(10);
        assert!(matches!(order.fill(11), Err(Error::EngineFault(_))));
        assert!(matches!(order.fill(0), Err(Error::EngineFault(_))));
        // A failed fill leaves the order untouched
        assert_eq!(order.remaining_quantity, 10);
        assert_eq!(order.status, Status::New);
    }
}
