//! Exchange runner binary
//!
//! External collaborator layer on top of the matching core: sets up
//! logging, wires an [`Exchange`] to a channel-backed trade feed, and
//! drives a fixed demo order flow.

use std::sync::Arc;
use std::thread;

use clap::Parser;
use common::error::Result;
use common::model::order::Side;
use crossbeam::channel;
use dotenv::dotenv;
use matching_engine::{ChannelSink, Exchange};
use rust_decimal_macros::dec;
use tracing::{debug, info, warn, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Command line arguments
#[derive(Parser, Debug)]
#[clap(author, version, about)]
struct Args {
    /// Seed the books with a fixed set of demo orders
    #[clap(short, long)]
    demo: bool,

    /// Print a book snapshot per touched instrument before shutdown
    #[clap(short, long)]
    snapshots: bool,
}

fn main() -> Result<()> {
    // Load environment variables
    dotenv().ok();

    let args = Args::parse();

    // Initialize tracing with debug level if DEBUG=1 in .env
    let env_debug = std::env::var("DEBUG").unwrap_or_else(|_| "0".to_string());
    let log_level = if env_debug == "1" { Level::DEBUG } else { Level::INFO };

    let env_filter = EnvFilter::builder()
        .with_default_directive(log_level.into())
        .parse("matching_engine=debug,exchange_runner=debug")
        .expect("static filter directive");

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .finish();
    if tracing::subscriber::set_global_default(subscriber).is_ok() {
        info!("Tracing initialized");
    }

    info!("Starting exchange runner...");

    // Trades flow to a consumer thread over a channel and come out as JSON
    // lines; the core never blocks on the output.
    let (sender, receiver) = channel::unbounded();
    let exchange = Exchange::new(Arc::new(ChannelSink::new(sender)));

    let consumer = thread::spawn(move || {
        for trade in receiver {
            match serde_json::to_string(&trade) {
                Ok(line) => println!("{}", line),
                Err(err) => warn!(error = %err, "could not encode trade"),
            }
        }
    });

    let touched = if args.demo {
        info!("Submitting demo orders...");
        run_demo(&exchange)?
    } else {
        Vec::new()
    };

    if args.snapshots {
        for instrument in &touched {
            let snapshot = exchange.get_book_snapshot(*instrument)?;
            println!("{}", serde_json::to_string(&snapshot)?);
        }
    }

    // Dropping the exchange drops the sink's sender and ends the consumer.
    drop(exchange);
    if consumer.join().is_err() {
        warn!("trade consumer thread panicked");
    }

    info!("Shutdown complete");
    Ok(())
}

/// Submit a fixed, deterministic order flow across a few instruments
///
/// Returns the instruments that were touched. Mixes resting depth with
/// crossings so both trades and surviving book state show up in the output.
fn run_demo(exchange: &Exchange) -> Result<Vec<u16>> {
    let flow = [
        (Side::Buy, 7, 100, dec!(20)),
        (Side::Sell, 7, 60, dec!(18)),
        (Side::Buy, 3, 50, dec!(30)),
        (Side::Buy, 3, 50, dec!(30)),
        (Side::Sell, 3, 50, dec!(30)),
        (Side::Buy, 12, 10, dec!(15)),
        (Side::Sell, 12, 10, dec!(20)),
        (Side::Sell, 7, 80, dec!(19)),
        (Side::Buy, 7, 30, dec!(21)),
    ];

    let mut touched = Vec::new();
    for (side, instrument, quantity, price) in flow {
        let id = exchange.submit_order(side, instrument, quantity, price)?;
        debug!(order = %id, instrument, "demo order accepted");
        if !touched.contains(&instrument) {
            touched.push(instrument);
        }
    }

    info!("Demo flow complete");
    Ok(touched)
}
