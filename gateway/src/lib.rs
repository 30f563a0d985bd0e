//! Ambient adapters around `gateway_core`'s engine: the config-file
//! loader, the CSV stats sink, and the demo exchange/order feed that
//! let the binary run the gateway end-to-end without a real venue.

pub mod config;
pub mod demo_exchange;
pub mod order_feed;
pub mod reject_sink;
pub mod stats_sink;

pub use config::{load as load_config, ConfigError};
pub use demo_exchange::DemoExchange;
pub use order_feed::OrderFeed;
pub use reject_sink::LoggingRejectSink;
pub use stats_sink::CsvStatsSink;
