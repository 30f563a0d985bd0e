//! Order management gateway entry point.
//!
//! Loads a text config file, wires `gateway_core::Gateway` to a CSV
//! stats sink and an in-process demo exchange, starts one mock order
//! feed per client prefix, and runs until Ctrl-C — the same shape as
//! `original_source`'s `main.cpp` test scenarios (one exchange
//! simulator, one or more `MockOrdersGenerator` clients, a stats file
//! per run), generalized into a runnable binary instead of fixed test
//! functions.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;

use common::logging::{LogLevel, Logger};
use gateway::{CsvStatsSink, DemoExchange, LoggingRejectSink, OrderFeed};
use gateway_core::clock::SystemClock;
use gateway_core::exchange::Exchange;
use gateway_core::{Clock, Gateway};

/// Order management gateway: admits orders, transmits them to an
/// exchange at a bounded rate within a configured trading session.
#[derive(Parser, Debug)]
#[command(name = "gateway")]
#[command(about = "Order management gateway")]
struct Args {
    /// Path to the `key=value` config file (Open/Close/MonitorWindowSec/Rate/Username/Password).
    #[arg(short, long, default_value = "config/config.txt")]
    config: String,

    /// Path the CSV stats sink writes completed order records to.
    #[arg(short, long, default_value = "stats.csv")]
    stats: String,

    /// Number of mock order-feed clients to run, each with a distinct id prefix.
    #[arg(short = 'n', long, default_value_t = 1)]
    clients: u8,

    /// Symbol id the demo order feed submits orders for.
    #[arg(long, default_value_t = 1)]
    symbol: i32,
}

fn main() {
    let args = Args::parse();
    let logger = Arc::new(Logger::new());

    let config = match gateway::load_config(&args.config) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("failed to load config {}: {}", args.config, err);
            std::process::exit(1);
        }
    };

    let stats_sink = match CsvStatsSink::create(&args.stats) {
        Ok(sink) => Arc::new(sink),
        Err(err) => {
            eprintln!("failed to open stats file {}: {}", args.stats, err);
            std::process::exit(1);
        }
    };

    let (demo_exchange, responses) = DemoExchange::spawn();
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let gateway = Arc::new(Gateway::new(
        config,
        clock,
        demo_exchange.clone() as Arc<dyn Exchange>,
        stats_sink,
        Arc::new(LoggingRejectSink::new(logger.clone())),
        logger.clone(),
    ));

    // Responses arrive on a channel rather than through a stored
    // callback (see demo_exchange.rs); a dedicated thread forwards them
    // into the gateway's ingress.
    let response_gateway = gateway.clone();
    let response_thread = std::thread::spawn(move || {
        while let Ok(response) = responses.recv() {
            response_gateway.on_response(response);
        }
    });

    let order_feeds: Vec<OrderFeed> = (1..=args.clients)
        .map(|prefix| OrderFeed::spawn(gateway.clone(), prefix, args.symbol))
        .collect();

    let running = Arc::new(AtomicBool::new(true));
    let running_clone = running.clone();
    ctrlc::set_handler(move || {
        running_clone.store(false, Ordering::SeqCst);
    })
    .expect("failed to set Ctrl-C handler");

    logger.log(LogLevel::Info, "gateway running, press Ctrl-C to stop");
    while running.load(Ordering::SeqCst) {
        std::thread::sleep(Duration::from_millis(100));
    }

    logger.log(LogLevel::Info, "shutting down");
    drop(order_feeds);
    gateway.shutdown();
    demo_exchange.shutdown();
    drop(demo_exchange);
    let _ = response_thread.join();
}
