//! Shared primitives for the order management gateway.
//!
//! - [`time`] — monotonic nanosecond timestamps and latency statistics.
//! - [`logging`] — a lock-free, background-thread logger.
//! - [`lf_queue`] — the SPSC queue the logger is built on.
//! - [`types`] — small domain type aliases shared by `gateway-core` and `gateway`.

pub mod lf_queue;
pub mod logging;
pub mod time;
pub mod types;

pub use types::{OrderId, Price, Qty, Side, SymbolId, INVALID_ORDER_ID, INVALID_SYMBOL_ID};
