//! Order entry, routing, and per-instrument serialization

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use common::decimal::{Price, Quantity};
use common::error::{Error, Result};
use common::model::instrument::InstrumentId;
use common::model::order::{Order, Side};
use dashmap::DashMap;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use crate::matching::match_orders;
use crate::order_book::OrderBook;
use crate::sink::TradeSink;

/// Read-only view of one instrument's book
#[derive(Debug, Clone, Serialize)]
pub struct BookSnapshot {
    /// Instrument the snapshot was taken for
    pub instrument: InstrumentId,
    /// Best (highest) bid price
    pub best_bid: Option<Price>,
    /// Best (lowest) ask price
    pub best_ask: Option<Price>,
    /// Number of resting bid orders
    pub bid_depth: usize,
    /// Number of resting ask orders
    pub ask_depth: usize,
    /// Last traded price
    pub last_price: Option<Price>,
}

/// The exchange: validates and routes incoming orders
///
/// Owns the registry of per-instrument order books and the global
/// submission sequence counter. Each book is guarded by its own mutex, so
/// submissions for different instruments proceed fully in parallel; the
/// registry itself is only locked shard-wise, and only while a book entry
/// is looked up or first created.
pub struct Exchange {
    /// Map of instruments to order books, created lazily on first use
    books: DashMap<InstrumentId, Arc<Mutex<OrderBook>>>,
    /// Global submission sequence counter
    sequence: AtomicU64,
    /// Collaborator receiving emitted trades
    sink: Arc<dyn TradeSink>,
}

impl Exchange {
    /// Create a new exchange delivering trades to the given sink
    pub fn new(sink: Arc<dyn TradeSink>) -> Self {
        Self {
            books: DashMap::new(),
            sequence: AtomicU64::new(0),
            sink,
        }
    }

    /// Validate and submit a limit order, matching it immediately
    ///
    /// The insert and the matching pass run as one atomic unit under the
    /// target instrument's lock: no other submission can interleave an
    /// insert or pop in the middle of the pass. Which of two racing
    /// submissions wins the lock is environment-dependent; the winner gets
    /// the lower sequence number and with it permanent priority at equal
    /// price.
    ///
    /// Returns the new order's identifier, or a `Validation` error without
    /// having touched any book.
    pub fn submit_order(
        &self,
        side: Side,
        instrument: u16,
        quantity: Quantity,
        price: Price,
    ) -> Result<Uuid> {
        let instrument = InstrumentId::new(instrument)?;
        if quantity == 0 {
            return Err(Error::Validation(
                "order quantity must be positive".to_string(),
            ));
        }
        if price <= Decimal::ZERO {
            return Err(Error::Validation(format!(
                "order price {} must be positive",
                price
            )));
        }

        let book = self.book_handle(instrument);
        let mut book = lock_book(&book, instrument)?;
        if book.is_halted() {
            return Err(Error::EngineFault(format!(
                "instrument {} is halted",
                instrument
            )));
        }

        // Assigned inside the exclusive boundary: lock acquisition order
        // decides priority between racing submissions.
        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        let order = Order::new_limit(instrument, side, price, quantity, sequence);
        let order_id = order.id;
        debug!(
            order = %order_id,
            instrument = %instrument,
            ?side,
            quantity,
            price = %price,
            sequence,
            "order accepted"
        );

        if let Err(err) = book.insert(order) {
            book.halt();
            return Err(err);
        }
        let trades = match match_orders(&mut book) {
            Ok(trades) => trades,
            Err(err) => {
                book.halt();
                return Err(err);
            }
        };

        for trade in &trades {
            self.sink.on_trade(trade);
        }

        Ok(order_id)
    }

    /// Read-only diagnostic snapshot of one instrument's book
    pub fn get_book_snapshot(&self, instrument: u16) -> Result<BookSnapshot> {
        let instrument = InstrumentId::new(instrument)?;
        let book = self.existing_book(instrument)?;
        let book = lock_book(&book, instrument)?;
        Ok(BookSnapshot {
            instrument,
            best_bid: book.best_bid(),
            best_ask: book.best_ask(),
            bid_depth: book.bid_depth(),
            ask_depth: book.ask_depth(),
            last_price: book.last_price(),
        })
    }

    /// Aggregated per-price depth for one instrument, bids then asks
    pub fn depth(
        &self,
        instrument: u16,
        limit: usize,
    ) -> Result<(Vec<(Price, Quantity)>, Vec<(Price, Quantity)>)> {
        let instrument = InstrumentId::new(instrument)?;
        let book = self.existing_book(instrument)?;
        let book = lock_book(&book, instrument)?;
        Ok((book.bid_levels(limit), book.ask_levels(limit)))
    }

    /// Book handle for an instrument, creating the book on first use
    fn book_handle(&self, instrument: InstrumentId) -> Arc<Mutex<OrderBook>> {
        // The Arc is cloned out so the registry shard lock is released
        // before the book mutex is taken.
        self.books
            .entry(instrument)
            .or_insert_with(|| Arc::new(Mutex::new(OrderBook::new(instrument))))
            .value()
            .clone()
    }

    /// Book handle for an instrument that must already exist
    fn existing_book(&self, instrument: InstrumentId) -> Result<Arc<Mutex<OrderBook>>> {
        self.books
            .get(&instrument)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| {
                Error::UnknownInstrument(format!("no book for instrument {}", instrument))
            })
    }
}

/// Acquire an instrument's book lock, surfacing poisoning as an engine fault
fn lock_book<'a>(
    book: &'a Arc<Mutex<OrderBook>>,
    instrument: InstrumentId,
) -> Result<MutexGuard<'a, OrderBook>> {
    book.lock().map_err(|_| {
        Error::EngineFault(format!("poisoned book lock for instrument {}", instrument))
    })
}
