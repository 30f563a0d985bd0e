//! Per-order latency bookkeeping between send and response.
//!
//! Only one [`crate::model::LatencyRecord`] is ever alive per order id,
//! so there is no aggregation — the map is purely a scratch pad between
//! `record_sent` and `complete`.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use common::time::Nanos;
use common::OrderId;

use crate::exchange::StatsSink;
use crate::model::{CompletedLatencyRecord, LatencyRecord, OrderResponse};

pub struct LatencyTracker {
    in_flight: Mutex<HashMap<OrderId, LatencyRecord>>,
    sink: Arc<dyn StatsSink>,
    unknown_response_count: std::sync::atomic::AtomicU64,
    poisoned: AtomicBool,
}

impl LatencyTracker {
    pub fn new(sink: Arc<dyn StatsSink>) -> Self {
        Self {
            in_flight: Mutex::new(HashMap::new()),
            sink,
            unknown_response_count: std::sync::atomic::AtomicU64::new(0),
            poisoned: AtomicBool::new(false),
        }
    }

    /// Recovers from a poisoned lock instead of re-panicking — see
    /// `PendingStore::lock` for why that's safe here too.
    fn lock(&self) -> MutexGuard<'_, HashMap<OrderId, LatencyRecord>> {
        match self.in_flight.lock() {
            Ok(guard) => guard,
            Err(err) => {
                self.poisoned.store(true, Ordering::Release);
                err.into_inner()
            }
        }
    }

    /// Whether this tracker's mutex has ever been observed poisoned.
    pub fn is_poisoned(&self) -> bool {
        self.poisoned.load(Ordering::Acquire)
    }

    /// Records that `order_id` was just transmitted, opening its
    /// latency record. Called by the Transmitter immediately after
    /// `Exchange::send`.
    pub fn record_sent(&self, order_id: OrderId, ingress_time_ns: Nanos, send_time_ns: Nanos) {
        let mut in_flight = self.lock();
        in_flight.insert(
            order_id,
            LatencyRecord {
                ingress_time_ns,
                send_time_ns,
            },
        );
    }

    /// Handles a response arriving from the exchange: completes the
    /// latency record, hands it to the stats sink under the same lock
    /// (so emission order matches response-arrival order), then removes
    /// the entry. If no record exists for the order id, logs and drops
    /// — this should not occur under normal operation.
    pub fn complete(&self, response: OrderResponse, response_time_ns: Nanos, logger: &common::logging::Logger) {
        let mut in_flight = self.lock();
        match in_flight.remove(&response.order_id) {
            Some(record) => {
                let completed = CompletedLatencyRecord {
                    ingress_time_ns: record.ingress_time_ns,
                    send_time_ns: record.send_time_ns,
                    response_time_ns,
                };
                self.sink.emit(&response, &completed);
            }
            None => {
                self.unknown_response_count
                    .fetch_add(1, std::sync::atomic::Ordering::Relaxed);
                logger.log_with_u64(
                    common::logging::LogLevel::Warn,
                    "response for unknown order id",
                    response.order_id,
                );
            }
        }
    }

    pub fn unknown_response_count(&self) -> u64 {
        self.unknown_response_count
            .load(std::sync::atomic::Ordering::Relaxed)
    }

    /// Number of orders currently awaiting a response. Test/diagnostic use.
    pub fn in_flight_count(&self) -> usize {
        self.lock().len()
    }
}
