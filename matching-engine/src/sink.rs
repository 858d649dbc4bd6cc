//! Trade delivery to external collaborators

use std::sync::Mutex;

use common::model::trade::Trade;
use crossbeam::channel::Sender;
use tracing::{info, warn};

/// Receiver of emitted trades
///
/// Invoked once per trade, in emission order. Calls for the same instrument
/// are never concurrent: the per-instrument lock is held across the
/// insert-then-match unit that produced the trade.
pub trait TradeSink: Send + Sync {
    fn on_trade(&self, trade: &Trade);
}

/// Logs each trade through `tracing`
#[derive(Debug, Default)]
pub struct LogSink;

impl TradeSink for LogSink {
    fn on_trade(&self, trade: &Trade) {
        info!(
            trade = %trade.id,
            instrument = %trade.instrument,
            price = %trade.price,
            quantity = trade.quantity,
            buy_order = %trade.buy_order_id,
            sell_order = %trade.sell_order_id,
            "trade executed"
        );
    }
}

/// Forwards trades over a channel to a consumer thread
pub struct ChannelSink {
    sender: Sender<Trade>,
}

impl ChannelSink {
    /// Create a sink that forwards into the given channel
    pub fn new(sender: Sender<Trade>) -> Self {
        Self { sender }
    }
}

impl TradeSink for ChannelSink {
    fn on_trade(&self, trade: &Trade) {
        if self.sender.send(trade.clone()).is_err() {
            warn!(trade = %trade.id, "trade receiver dropped, discarding");
        }
    }
}

/// Accumulates trades in memory; intended for tests and diagnostics
#[derive(Debug, Default)]
pub struct RecordingSink {
    trades: Mutex<Vec<Trade>>,
}

impl RecordingSink {
    /// Create an empty recording sink
    pub fn new() -> Self {
        Self::default()
    }

    /// All trades received so far, in emission order
    pub fn trades(&self) -> Vec<Trade> {
        self.trades.lock().expect("sink lock").clone()
    }
}

impl TradeSink for RecordingSink {
    fn on_trade(&self, trade: &Trade) {
        self.trades.lock().expect("sink lock").push(trade.clone());
    }
}
