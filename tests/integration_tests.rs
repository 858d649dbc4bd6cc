// File: tests/integration_tests.rs


use std::sync::Arc;
use std::thread;

use common::decimal::{Price, Quantity};
use common::model::order::Side;
use crossbeam::channel;
use matching_engine::{ChannelSink, Exchange};
use rust_decimal_macros::dec;
use test_helpers::TestExchange;

#[test]
fn test_trades_flow_through_channel_sink() {
    let (sender, receiver) = channel::unbounded();
    let exchange = Exchange::new(Arc::new(ChannelSink::new(sender)));

    let consumer = thread::spawn(move || receiver.iter().collect::<Vec<_>>());

    exchange
        .submit_order(Side::Buy, 7, 100, dec!(20))
        .expect("submission failed");
    exchange
        .submit_order(Side::Sell, 7, 60, dec!(18))
        .expect("submission failed");
    exchange
        .submit_order(Side::Sell, 7, 40, dec!(20))
        .expect("submission failed");

    // Dropping the exchange closes the channel and ends the consumer.
    drop(exchange);
    let trades = consumer.join().expect("consumer thread panicked");

    assert_eq!(trades.len(), 2);
    assert_eq!((trades[0].price, trades[0].quantity), (dec!(18), 60));
    assert_eq!((trades[1].price, trades[1].quantity), (dec!(20), 40));
    assert_eq!(trades[0].trade_sequence, 1);
    assert_eq!(trades[1].trade_sequence, 2);
}

fn mixed_flow() -> Vec<(Side, u16, Quantity, Price)> {
    vec![
        (Side::Buy, 7, 100, dec!(20)),
        (Side::Sell, 7, 60, dec!(18)),
        (Side::Buy, 3, 50, dec!(30)),
        (Side::Buy, 3, 50, dec!(30)),
        (Side::Sell, 3, 50, dec!(30)),
        (Side::Buy, 12, 10, dec!(15)),
        (Side::Sell, 12, 10, dec!(20)),
        (Side::Sell, 7, 80, dec!(19)),
        (Side::Buy, 7, 30, dec!(21)),
    ]
}

#[test]
fn test_end_to_end_replay_determinism() {
    let first = TestExchange::new();
    let second = TestExchange::new();

    for (side, instrument, quantity, price) in mixed_flow() {
        first.submit(side, instrument, quantity, price).unwrap();
    }
    for (side, instrument, quantity, price) in mixed_flow() {
        second.submit(side, instrument, quantity, price).unwrap();
    }

    for instrument in [7, 3, 12] {
        let left: Vec<_> = first
            .trades_for(instrument)
            .iter()
            .map(|t| (t.price, t.quantity, t.trade_sequence))
            .collect();
        let right: Vec<_> = second
            .trades_for(instrument)
            .iter()
            .map(|t| (t.price, t.quantity, t.trade_sequence))
            .collect();
        assert_eq!(left, right);
    }
}

#[test]
fn test_concurrent_instruments_do_not_interfere() {
    let harness = TestExchange::new();

    thread::scope(|scope| {
        for instrument in [61u16, 62, 63, 64] {
            let harness = &harness;
            scope.spawn(move || {
                for i in 0..100u64 {
                    let side = if i % 2 == 0 { Side::Buy } else { Side::Sell };
                    let price = dec!(50) + rust_decimal::Decimal::from(i % 7);
                    harness
                        .submit(side, instrument, 1 + i % 3, price)
                        .expect("submission failed");
                }
            });
        }
    });

    // Each instrument conserves quantity on its own, regardless of how the
    // four submission streams interleaved.
    for instrument in [61u16, 62, 63, 64] {
        let traded: Quantity = harness
            .trades_for(instrument)
            .iter()
            .map(|t| t.quantity)
            .sum();
        let (bids, asks) = harness.exchange.depth(instrument, usize::MAX).unwrap();
        let resting_buys: Quantity = bids.iter().map(|(_, q)| q).sum();
        let resting_sells: Quantity = asks.iter().map(|(_, q)| q).sum();

        let submitted_buys: Quantity = (0..100u64).step_by(2).map(|i| 1 + i % 3).sum();
        let submitted_sells: Quantity = (0..100u64).skip(1).step_by(2).map(|i| 1 + i % 3).sum();
        assert_eq!(traded + resting_buys, submitted_buys);
        assert_eq!(traded + resting_sells, submitted_sells);
    }
}

#[test]
fn test_snapshot_serializes_for_diagnostics() {
    let harness = TestExchange::new();
    harness.submit(Side::Buy, 9, 10, dec!(15)).unwrap();
    harness.submit(Side::Sell, 9, 5, dec!(25)).unwrap();

    let snapshot = harness.exchange.get_book_snapshot(9).unwrap();
    let encoded = serde_json::to_value(&snapshot).unwrap();

    assert_eq!(encoded["instrument"], 9);
    assert_eq!(encoded["bid_depth"], 1);
    assert_eq!(encoded["ask_depth"], 1);
    assert_eq!(encoded["best_bid"], "15");
    assert_eq!(encoded["best_ask"], "25");
}
