//! Order book implementation for price-time priority matching

use std::cmp::Reverse;
use std::collections::BTreeMap;

use common::decimal::{Price, Quantity};
use common::error::{Error, Result};
use common::model::instrument::InstrumentId;
use common::model::order::{Order, Side};

/// Common trait for order book sides
///
/// Ascending key order is priority order on both sides: the bid key inverts
/// its price component so the highest bid ranks first, the ask key uses the
/// natural price order so the lowest ask ranks first. The secondary key is
/// the submission sequence, earliest first: strict FIFO at equal price.
pub trait BookSide {
    /// Add an order to this side
    fn insert(&mut self, order: Order);

    /// Order currently ranked first on this side, if any
    fn peek_best(&self) -> Option<&Order>;

    /// Remove and return the order ranked first on this side
    fn pop_best(&mut self) -> Option<Order>;

    /// Most favorable price on this side
    fn best_price(&self) -> Option<Price>;

    /// Number of resting orders
    fn depth(&self) -> usize;

    /// Aggregated remaining quantity per price level, in priority order
    fn price_levels(&self, limit: usize) -> Vec<(Price, Quantity)>;
}

/// The buy side of the order book (bids)
#[derive(Debug, Default)]
pub struct BidSide {
    /// Orders keyed by (price descending, sequence ascending)
    limits: BTreeMap<(Reverse<Price>, u64), Order>,
}

impl BookSide for BidSide {
    fn insert(&mut self, order: Order) {
        self.limits
            .insert((Reverse(order.price), order.sequence), order);
    }

    fn peek_best(&self) -> Option<&Order> {
        self.limits.first_key_value().map(|(_, order)| order)
    }

    fn pop_best(&mut self) -> Option<Order> {
        self.limits.pop_first().map(|(_, order)| order)
    }

    fn best_price(&self) -> Option<Price> {
        self.peek_best().map(|order| order.price)
    }

    fn depth(&self) -> usize {
        self.limits.len()
    }

    fn price_levels(&self, limit: usize) -> Vec<(Price, Quantity)> {
        let mut levels: Vec<(Price, Quantity)> = Vec::new();
        for order in self.limits.values() {
            match levels.last_mut() {
                Some((price, quantity)) if *price == order.price => {
                    *quantity += order.remaining_quantity;
                }
                _ => {
                    if levels.len() == limit {
                        break;
                    }
                    levels.push((order.price, order.remaining_quantity));
                }
            }
        }
        levels
    }
}

/// The sell side of the order book (asks)
#[derive(Debug, Default)]
pub struct AskSide {
    /// Orders keyed by (price ascending, sequence ascending)
    limits: BTreeMap<(Price, u64), Order>,
}

impl BookSide for AskSide {
    fn insert(&mut self, order: Order) {
        self.limits.insert((order.price, order.sequence), order);
    }

    fn peek_best(&self) -> Option<&Order> {
        self.limits.first_key_value().map(|(_, order)| order)
    }

    fn pop_best(&mut self) -> Option<Order> {
        self.limits.pop_first().map(|(_, order)| order)
    }

    fn best_price(&self) -> Option<Price> {
        self.peek_best().map(|order| order.price)
    }

    fn depth(&self) -> usize {
        self.limits.len()
    }

    fn price_levels(&self, limit: usize) -> Vec<(Price, Quantity)> {
        let mut levels: Vec<(Price, Quantity)> = Vec::new();
        for order in self.limits.values() {
            match levels.last_mut() {
                Some((price, quantity)) if *price == order.price => {
                    *quantity += order.remaining_quantity;
                }
                _ => {
                    if levels.len() == limit {
                        break;
                    }
                    levels.push((order.price, order.remaining_quantity));
                }
            }
        }
        levels
    }
}

/// Order book for a single instrument
///
/// Exclusively owned by the exchange's instrument registry; all mutation
/// happens under that instrument's lock.
pub struct OrderBook {
    /// Instrument this book belongs to
    instrument: InstrumentId,
    /// Buy side (bids)
    bids: BidSide,
    /// Sell side (asks)
    asks: AskSide,
    /// Last traded price
    last_price: Option<Price>,
    /// Per-instrument trade emission counter
    trade_sequence: u64,
    /// Set when an engine fault is detected; refuses further submissions
    halted: bool,
}

impl OrderBook {
    /// Create a new empty order book for the given instrument
    pub fn new(instrument: InstrumentId) -> Self {
        Self {
            instrument,
            bids: BidSide::default(),
            asks: AskSide::default(),
            last_price: None,
            trade_sequence: 0,
            halted: false,
        }
    }

    /// Instrument this book belongs to
    pub fn instrument(&self) -> InstrumentId {
        self.instrument
    }

    /// Add an order to the appropriate side
    ///
    /// An order routed to the wrong book indicates broken routing, not a
    /// caller mistake, and is surfaced as an engine fault.
    pub fn insert(&mut self, order: Order) -> Result<()> {
        if order.instrument != self.instrument {
            return Err(Error::EngineFault(format!(
                "order {} for instrument {} routed to book {}",
                order.id, order.instrument, self.instrument
            )));
        }
        match order.side {
            Side::Buy => self.bids.insert(order),
            Side::Sell => self.asks.insert(order),
        }
        Ok(())
    }

    /// Push back a popped order that retains quantity after a partial fill
    ///
    /// The (price, sequence) key is unchanged, so the remainder keeps the
    /// priority it held before it was popped.
    pub fn reinsert(&mut self, order: Order) -> Result<()> {
        self.insert(order)
    }

    /// Order ranked first on the bid side
    pub fn peek_best_bid(&self) -> Option<&Order> {
        self.bids.peek_best()
    }

    /// Order ranked first on the ask side
    pub fn peek_best_ask(&self) -> Option<&Order> {
        self.asks.peek_best()
    }

    /// Remove and return the top bid; used only by the matching pass
    pub fn pop_best_bid(&mut self) -> Option<Order> {
        self.bids.pop_best()
    }

    /// Remove and return the top ask; used only by the matching pass
    pub fn pop_best_ask(&mut self) -> Option<Order> {
        self.asks.pop_best()
    }

    /// Get the best bid price
    pub fn best_bid(&self) -> Option<Price> {
        self.bids.best_price()
    }

    /// Get the best ask price
    pub fn best_ask(&self) -> Option<Price> {
        self.asks.best_price()
    }

    /// Get the current spread
    pub fn spread(&self) -> Option<Price> {
        match (self.best_ask(), self.best_bid()) {
            (Some(ask), Some(bid)) => Some(ask - bid),
            _ => None,
        }
    }

    /// Number of resting bid orders
    pub fn bid_depth(&self) -> usize {
        self.bids.depth()
    }

    /// Number of resting ask orders
    pub fn ask_depth(&self) -> usize {
        self.asks.depth()
    }

    /// Get bid price levels with quantities (for diagnostics)
    pub fn bid_levels(&self, limit: usize) -> Vec<(Price, Quantity)> {
        self.bids.price_levels(limit)
    }

    /// Get ask price levels with quantities (for diagnostics)
    pub fn ask_levels(&self, limit: usize) -> Vec<(Price, Quantity)> {
        self.asks.price_levels(limit)
    }

    /// Last traded price, if anything has executed
    pub fn last_price(&self) -> Option<Price> {
        self.last_price
    }

    /// Update the last traded price
    pub(crate) fn set_last_price(&mut self, price: Price) {
        self.last_price = Some(price);
    }

    /// Next per-instrument trade sequence number
    pub(crate) fn next_trade_sequence(&mut self) -> u64 {
        self.trade_sequence += 1;
        self.trade_sequence
    }

    /// Whether an engine fault has halted this instrument
    pub fn is_halted(&self) -> bool {
        self.halted
    }

    /// Halt this instrument; submissions are refused from here on
    pub(crate) fn halt(&mut self) {
        self.halted = true;
    }

    /// No live cross remains: either a side is empty or best bid < best ask
    pub fn is_quiescent(&self) -> bool {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) => bid < ask,
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    fn book() -> OrderBook {
        OrderBook::new(InstrumentId::new(5).unwrap())
    }

    fn order(book: &OrderBook, side: Side, price: Price, quantity: Quantity, seq: u64) -> Order {
        Order::new_limit(book.instrument(), side, price, quantity, seq)
    }

    #[test]
    fn bids_rank_highest_price_first() {
        let mut book = book();
        book.insert(order(&book, Side::Buy, dec!(19), 10, 1)).unwrap();
        book.insert(order(&book, Side::Buy, dec!(21), 10, 2)).unwrap();
        book.insert(order(&book, Side::Buy, dec!(20), 10, 3)).unwrap();

        assert_eq!(book.best_bid(), Some(dec!(21)));
        assert_eq!(book.pop_best_bid().unwrap().price, dec!(21));
        assert_eq!(book.pop_best_bid().unwrap().price, dec!(20));
        assert_eq!(book.pop_best_bid().unwrap().price, dec!(19));
    }

    #[test]
    fn asks_rank_lowest_price_first() {
        let mut book = book();
        book.insert(order(&book, Side::Sell, dec!(21), 10, 1)).unwrap();
        book.insert(order(&book, Side::Sell, dec!(19), 10, 2)).unwrap();

        assert_eq!(book.best_ask(), Some(dec!(19)));
        assert_eq!(book.pop_best_ask().unwrap().price, dec!(19));
        assert_eq!(book.pop_best_ask().unwrap().price, dec!(21));
    }

    #[test]
    fn equal_price_ranks_by_sequence() {
        let mut book = book();
        let first = order(&book, Side::Sell, dec!(20), 10, 4);
        let second = order(&book, Side::Sell, dec!(20), 10, 9);
        let first_id = first.id;
        book.insert(second).unwrap();
        book.insert(first).unwrap();

        assert_eq!(book.pop_best_ask().unwrap().id, first_id);
    }

    #[test]
    fn reinsert_keeps_priority() {
        let mut book = book();
        book.insert(order(&book, Side::Buy, dec!(20), 10, 1)).unwrap();
        book.insert(order(&book, Side::Buy, dec!(20), 10, 2)).unwrap();

        let mut top = book.pop_best_bid().unwrap();
        assert_eq!(top.sequence, 1);
        top.fill(4).unwrap();
        book.reinsert(top).unwrap();

        let top = book.peek_best_bid().unwrap();
        assert_eq!(top.sequence, 1);
        assert_eq!(top.remaining_quantity, 6);
    }

    #[test]
    fn rejects_order_for_other_instrument() {
        let mut book = book();
        let stray = Order::new_limit(InstrumentId::new(6).unwrap(), Side::Buy, dec!(20), 10, 1);
        assert!(matches!(book.insert(stray), Err(Error::EngineFault(_))));
    }

    #[test]
    fn price_levels_aggregate_by_price() {
        let mut book = book();
        book.insert(order(&book, Side::Sell, dec!(20), 10, 1)).unwrap();
        book.insert(order(&book, Side::Sell, dec!(20), 15, 2)).unwrap();
        book.insert(order(&book, Side::Sell, dec!(21), 5, 3)).unwrap();

        let levels = book.ask_levels(10);
        assert_eq!(levels, vec![(dec!(20), 25), (dec!(21), 5)]);
        assert_eq!(book.ask_levels(1), vec![(dec!(20), 25)]);
    }
}
