//! The exchange-facing boundary the gateway transmits through.
//!
//! All three operations are fire-and-forget; responses arrive
//! asynchronously via [`crate::ingress::Ingress::on_response`]. A real
//! implementation (a wire protocol over TCP, say) lives outside this
//! crate — the core only ever talks to the trait.

use common::OrderId;

use crate::model::{CompletedLatencyRecord, OrderRequest, OrderResponse};

pub trait Exchange: Send + Sync {
    fn send(&self, request: &OrderRequest);
    fn send_logon(&self, username: &str, password: &str);
    fn send_logout(&self, username: &str);
}

/// Where completed per-order latency records go once a response arrives.
pub trait StatsSink: Send + Sync {
    fn emit(&self, response: &OrderResponse, record: &CompletedLatencyRecord);
}

/// A stats sink that discards everything. Useful where only the
/// transmit/reject side of a test matters.
pub struct NullStatsSink;

impl StatsSink for NullStatsSink {
    fn emit(&self, _response: &OrderResponse, _record: &CompletedLatencyRecord) {}
}

/// Where rejected orders (closed gateway, unknown kind, drain-on-shutdown,
/// close-while-queued) are reported. Rejection is an observable side
/// effect only — no order is queued, no latency record is made.
pub trait RejectSink: Send + Sync {
    fn reject(&self, order_id: OrderId, reason: &str);
}

/// A reject sink that discards everything.
pub struct NullRejectSink;

impl RejectSink for NullRejectSink {
    fn reject(&self, _order_id: OrderId, _reason: &str) {}
}
