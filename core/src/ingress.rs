//! The front door: admits new orders, applies modify/cancel in place,
//! and routes exchange responses to the latency tracker.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use common::logging::{LogLevel, Logger};

use crate::clock::Clock;
use crate::exchange::RejectSink;
use crate::latency_tracker::LatencyTracker;
use crate::model::{OrderRecord, OrderRequest, OrderResponse, RequestKind};
use crate::pending_store::PendingStore;

pub struct Ingress {
    open: Arc<AtomicBool>,
    terminate: Arc<AtomicBool>,
    store: Arc<PendingStore>,
    latency_tracker: Arc<LatencyTracker>,
    clock: Arc<dyn Clock>,
    reject_sink: Arc<dyn RejectSink>,
    logger: Arc<Logger>,
}

impl Ingress {
    pub fn new(
        open: Arc<AtomicBool>,
        terminate: Arc<AtomicBool>,
        store: Arc<PendingStore>,
        latency_tracker: Arc<LatencyTracker>,
        clock: Arc<dyn Clock>,
        reject_sink: Arc<dyn RejectSink>,
        logger: Arc<Logger>,
    ) -> Self {
        Self {
            open,
            terminate,
            store,
            latency_tracker,
            clock,
            reject_sink,
            logger,
        }
    }

    /// If the store or latency tracker has ever observed a poisoned
    /// lock, logs it once and sets `terminate` so both background
    /// actors wind down — a panic in one must not leave ingress admitting
    /// new orders into state the rest of the gateway has given up on.
    fn check_poison(&self) -> bool {
        let poisoned = self.store.is_poisoned() || self.latency_tracker.is_poisoned();
        if poisoned && !self.terminate.swap(true, Ordering::AcqRel) {
            self.logger.log(
                LogLevel::Error,
                "pending store or latency tracker mutex poisoned, terminating gateway",
            );
        }
        poisoned
    }

    /// Admitted from any upstream thread. See spec.md §4.1's contract
    /// table: closed gateway or an unknown kind reject synchronously;
    /// `New` is queued; `Modify`/`Cancel` act on a record still in the
    /// store, or are silently dropped if the transmitter already took
    /// it — a documented, intentional race simplification, not a bug.
    pub fn submit(&self, request: OrderRequest, kind: RequestKind) {
        if self.check_poison() {
            self.reject(request.order_id, "gateway terminating: internal store poisoned");
            return;
        }

        if !self.open.load(Ordering::Acquire) {
            self.reject(request.order_id, "gateway closed");
            return;
        }

        match kind {
            RequestKind::Unknown => {
                self.reject(request.order_id, "unknown kind");
            }
            RequestKind::New => {
                let record = OrderRecord::new(request, self.clock.now_ns());
                self.store.push_new(record);
            }
            RequestKind::Modify => {
                let found = self
                    .store
                    .with_record_mut(request.order_id, |record| record.request = request);
                if !found {
                    self.logger.log_with_u64(
                        LogLevel::Info,
                        "modify dropped: order already sent to the exchange",
                        request.order_id,
                    );
                }
            }
            RequestKind::Cancel => {
                let found = self.store.cancel(request.order_id);
                if !found {
                    self.logger.log_with_u64(
                        LogLevel::Info,
                        "cancel dropped: order already sent to the exchange",
                        request.order_id,
                    );
                }
            }
        }

        self.check_poison();
    }

    /// Admitted from the exchange-facing thread. Delegates to the
    /// latency tracker, which owns the response-arrival-ordered
    /// hand-off to the stats sink (spec.md §4.5).
    pub fn on_response(&self, response: OrderResponse) {
        let now = self.clock.now_ns();
        self.latency_tracker.complete(response, now, &self.logger);
        self.check_poison();
    }

    fn reject(&self, order_id: u64, reason: &str) {
        self.logger.log_with_u64(LogLevel::Warn, "order rejected", order_id);
        self.reject_sink.reject(order_id, reason);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::SimClock;
    use crate::exchange::NullStatsSink;
    use common::time::Nanos;
    use common::Side;
    use std::sync::Mutex;

    struct RecordingRejectSink {
        rejections: Mutex<Vec<(u64, String)>>,
    }

    impl RejectSink for RecordingRejectSink {
        fn reject(&self, order_id: u64, reason: &str) {
            self.rejections
                .lock()
                .unwrap()
                .push((order_id, reason.to_string()));
        }
    }

    fn make_ingress() -> (Ingress, Arc<AtomicBool>, Arc<PendingStore>, Arc<RecordingRejectSink>) {
        let open = Arc::new(AtomicBool::new(true));
        let terminate = Arc::new(AtomicBool::new(false));
        let store = Arc::new(PendingStore::new());
        let latency_tracker = Arc::new(LatencyTracker::new(Arc::new(NullStatsSink)));
        let clock: Arc<dyn Clock> = Arc::new(SimClock::new(0));
        let reject_sink = Arc::new(RecordingRejectSink {
            rejections: Mutex::new(Vec::new()),
        });
        let logger = Arc::new(Logger::new());
        let ingress = Ingress::new(
            open.clone(),
            terminate,
            store.clone(),
            latency_tracker,
            clock,
            reject_sink.clone(),
            logger,
        );
        (ingress, open, store, reject_sink)
    }

    fn req(order_id: u64, price: f64) -> OrderRequest {
        OrderRequest {
            order_id,
            symbol_id: 1,
            price,
            qty: 10,
            side: Side::Buy,
        }
    }

    #[test]
    fn new_order_is_queued_when_open() {
        let (ingress, _open, store, _rejects) = make_ingress();
        ingress.submit(req(1, 100.0), RequestKind::New);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn closed_gateway_rejects_everything() {
        let (ingress, open, store, rejects) = make_ingress();
        open.store(false, Ordering::SeqCst);
        ingress.submit(req(1, 100.0), RequestKind::New);
        assert!(store.is_empty());
        assert_eq!(rejects.rejections.lock().unwrap()[0].1, "gateway closed");
    }

    #[test]
    fn unknown_kind_rejects() {
        let (ingress, _open, store, rejects) = make_ingress();
        ingress.submit(req(1, 100.0), RequestKind::Unknown);
        assert!(store.is_empty());
        assert_eq!(rejects.rejections.lock().unwrap()[0].1, "unknown kind");
    }

    #[test]
    fn modify_before_transmission_overwrites_fields() {
        let (ingress, _open, store, _rejects) = make_ingress();
        ingress.submit(req(7, 100.0), RequestKind::New);
        ingress.submit(req(7, 101.0), RequestKind::Modify);

        let mut seen_price = None;
        store.with_record_mut(7, |record| seen_price = Some(record.request.price));
        assert_eq!(seen_price, Some(101.0));
    }

    #[test]
    fn modify_after_transmission_is_a_documented_no_op() {
        let (ingress, _open, store, _rejects) = make_ingress();
        ingress.submit(req(7, 100.0), RequestKind::New);
        store.pop_head(); // simulate the transmitter taking it
        ingress.submit(req(7, 101.0), RequestKind::Modify);
        // No record to find: the modify silently dropped.
        assert!(!store.with_record_mut(7, |_| {}));
    }

    #[test]
    fn cancel_sets_flag_and_is_idempotent() {
        let (ingress, _open, store, _rejects) = make_ingress();
        ingress.submit(req(9, 100.0), RequestKind::New);
        ingress.submit(req(9, 100.0), RequestKind::Cancel);
        store.with_record_mut(9, |record| assert!(record.canceled));
    }

    #[test]
    fn poisoned_store_rejects_and_sets_terminate() {
        let open = Arc::new(AtomicBool::new(true));
        let terminate = Arc::new(AtomicBool::new(false));
        let store = Arc::new(PendingStore::new());
        let latency_tracker = Arc::new(LatencyTracker::new(Arc::new(NullStatsSink)));
        let clock: Arc<dyn Clock> = Arc::new(SimClock::new(0));
        let reject_sink = Arc::new(RecordingRejectSink {
            rejections: Mutex::new(Vec::new()),
        });
        let logger = Arc::new(Logger::new());

        store.push_new(OrderRecord::new(req(1, 100.0), Nanos::new(0)));
        let poisoning = store.clone();
        let _ = std::thread::spawn(move || {
            poisoning.with_record_mut(1, |_| panic!("simulated panic while holding the store lock"));
        })
        .join();
        assert!(store.is_poisoned());

        let ingress = Ingress::new(
            open,
            terminate.clone(),
            store,
            latency_tracker,
            clock,
            reject_sink.clone(),
            logger,
        );

        ingress.submit(req(3, 100.0), RequestKind::New);
        assert!(terminate.load(Ordering::Acquire));
        assert_eq!(
            reject_sink.rejections.lock().unwrap()[0].1,
            "gateway terminating: internal store poisoned"
        );
    }
}
