//! Concurrent limit-order matching engine
//!
//! Orders enter through [`Exchange::submit_order`], are serialized per
//! instrument, matched under strict price-time priority, and the resulting
//! trades are handed to a [`TradeSink`] in emission order.

mod order_book;

pub mod exchange;
pub mod matching;
pub mod sink;

pub use exchange::{BookSnapshot, Exchange};
pub use matching::match_orders;
pub use order_book::{BookSide, OrderBook};
pub use sink::{ChannelSink, LogSink, RecordingSink, TradeSink};
