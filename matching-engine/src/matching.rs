//! Price-time priority matching pass

use common::error::{Error, Result};
use common::model::trade::Trade;
use tracing::debug;

use crate::order_book::OrderBook;

/// Run the matching loop for one instrument's book until quiescence.
///
/// While the best bid and best ask cross (bid price >= ask price, equal
/// prices included), both top orders are popped, the smaller remaining
/// quantity executes at the resting sell's limit price, and whichever side
/// still holds quantity is reinserted before the next round. Returns the
/// trades in emission order.
///
/// Deterministic for a fixed submission sequence: every tie-break reduces
/// to (price, sequence) and sequence numbers are immutable.
pub fn match_orders(book: &mut OrderBook) -> Result<Vec<Trade>> {
    let mut trades = Vec::new();

    loop {
        let crossed = match (book.peek_best_bid(), book.peek_best_ask()) {
            (Some(bid), Some(ask)) => bid.price >= ask.price,
            _ => false,
        };
        if !crossed {
            break;
        }

        // Both peeks succeeded above, so the pops must as well.
        let mut buy = book
            .pop_best_bid()
            .ok_or_else(|| Error::EngineFault("bid side emptied mid-pass".to_string()))?;
        let mut sell = book
            .pop_best_ask()
            .ok_or_else(|| Error::EngineFault("ask side emptied mid-pass".to_string()))?;

        let quantity = buy.remaining_quantity.min(sell.remaining_quantity);
        if quantity == 0 {
            return Err(Error::EngineFault(format!(
                "zero-quantity cross between orders {} and {}",
                buy.id, sell.id
            )));
        }

        // The resting sell sets the execution price; the aggressing buyer
        // takes the improvement when the bid is above the ask.
        let price = sell.price;

        buy.fill(quantity)?;
        sell.fill(quantity)?;

        let trade = Trade::new(
            book.instrument(),
            price,
            quantity,
            buy.id,
            sell.id,
            book.next_trade_sequence(),
        );
        book.set_last_price(price);
        debug!(
            trade = %trade.id,
            instrument = %trade.instrument,
            quantity,
            price = %price,
            "trade executed"
        );
        trades.push(trade);

        if !buy.is_filled() {
            book.reinsert(buy)?;
        }
        if !sell.is_filled() {
            book.reinsert(sell)?;
        }
    }

    if !book.is_quiescent() {
        return Err(Error::EngineFault(format!(
            "live cross remains on instrument {} after matching",
            book.instrument()
        )));
    }

    Ok(trades)
}
