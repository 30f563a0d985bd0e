//! The order, request and latency types the gateway engine operates on.

use common::time::Nanos;
use common::{OrderId, Price, Qty, Side, SymbolId};

/// A request carried across the ingress boundary, paired with its [`RequestKind`].
///
/// Immutable by convention: nothing in the gateway ever builds a new
/// `OrderRequest` from an existing one except to replace it wholesale
/// (a `Modify`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrderRequest {
    pub order_id: OrderId,
    pub symbol_id: SymbolId,
    pub price: Price,
    pub qty: Qty,
    pub side: Side,
}

/// What an ingress request is asking the gateway to do.
///
/// Not part of the request stored on the exchange — this only matters
/// at the ingress boundary, not after the order has been admitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    New,
    Modify,
    Cancel,
    Unknown,
}

/// A pending order held in [`crate::pending_store::PendingStore`].
///
/// Distinct from [`OrderRequest`]: this is the gateway's own bookkeeping
/// record, not anything handed across an interface boundary.
#[derive(Debug, Clone, Copy)]
pub struct OrderRecord {
    pub request: OrderRequest,
    pub canceled: bool,
    pub ingress_time_ns: Nanos,
}

impl OrderRecord {
    pub fn new(request: OrderRequest, ingress_time_ns: Nanos) -> Self {
        Self {
            request,
            canceled: false,
            ingress_time_ns,
        }
    }
}

/// The exchange's verdict on a previously transmitted order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseResult {
    Unknown,
    Accept,
    Reject,
}

impl ResponseResult {
    /// The integer encoding the CSV stats sink writes (0/1/2).
    #[inline]
    pub fn as_i32(&self) -> i32 {
        match self {
            ResponseResult::Unknown => 0,
            ResponseResult::Accept => 1,
            ResponseResult::Reject => 2,
        }
    }
}

/// A response delivered asynchronously by the exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderResponse {
    pub order_id: OrderId,
    pub result: ResponseResult,
}

/// Per-order timestamps tracked between send and response.
///
/// Exists iff the order has been transmitted and no response has yet
/// arrived; consumed and removed the instant the response lands.
#[derive(Debug, Clone, Copy)]
pub struct LatencyRecord {
    pub ingress_time_ns: Nanos,
    pub send_time_ns: Nanos,
}

/// A [`LatencyRecord`] completed with a response timestamp, handed to
/// the stats sink.
#[derive(Debug, Clone, Copy)]
pub struct CompletedLatencyRecord {
    pub ingress_time_ns: Nanos,
    pub send_time_ns: Nanos,
    pub response_time_ns: Nanos,
}

impl CompletedLatencyRecord {
    /// `send_time − ingress_time`.
    #[inline]
    pub fn queue_wait_ns(&self) -> u64 {
        self.send_time_ns - self.ingress_time_ns
    }

    /// `response_time − send_time`.
    #[inline]
    pub fn round_trip_ns(&self) -> u64 {
        self.response_time_ns - self.send_time_ns
    }
}
