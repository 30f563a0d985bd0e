//! The order management gateway engine: ingress, pending-order
//! storage, trading-hours scheduling, rate-throttled transmission and
//! per-order latency tracking, independent of any wire protocol or
//! process entry point.

pub mod clock;
pub mod config;
pub mod exchange;
pub mod gateway;
pub mod hours_controller;
pub mod ingress;
pub mod latency_tracker;
pub mod model;
pub mod pending_store;
pub mod transmitter;

pub use clock::{Clock, SimClock, SystemClock};
pub use config::{Config, ConfigValidationError};
pub use exchange::{Exchange, NullRejectSink, NullStatsSink, RejectSink, StatsSink};
pub use gateway::Gateway;
pub use model::{
    CompletedLatencyRecord, LatencyRecord, OrderRecord, OrderRequest, OrderResponse, RequestKind,
    ResponseResult,
};
