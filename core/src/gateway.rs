//! Wires Ingress, PendingStore, HoursController, Transmitter and
//! LatencyTracker into the single entry point a binary actually talks
//! to. Grounded in the teacher's `OrderGateway`, which plays the same
//! "own the threads, expose a thin API" role for its two background
//! loops.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use common::logging::Logger;

use crate::clock::Clock;
use crate::config::Config;
use crate::exchange::{Exchange, RejectSink, StatsSink};
use crate::hours_controller::HoursController;
use crate::ingress::Ingress;
use crate::latency_tracker::LatencyTracker;
use crate::model::{OrderRequest, OrderResponse, RequestKind};
use crate::pending_store::PendingStore;
use crate::transmitter::Transmitter;

/// The assembled gateway: two background actors (hours controller,
/// transmitter) plus the synchronous `Ingress` front door, sharing one
/// `PendingStore` and one `LatencyTracker`.
pub struct Gateway {
    ingress: Ingress,
    open: Arc<AtomicBool>,
    terminate: Arc<AtomicBool>,
    store: Arc<PendingStore>,
    latency_tracker: Arc<LatencyTracker>,
    reject_sink: Arc<dyn RejectSink>,
    handles: Mutex<Option<(JoinHandle<()>, JoinHandle<()>)>>,
}

impl Gateway {
    /// Builds the gateway but does not start its background actors —
    /// call [`Gateway::start`] once all collaborators are ready.
    pub fn new(
        config: Config,
        clock: Arc<dyn Clock>,
        exchange: Arc<dyn Exchange>,
        stats_sink: Arc<dyn StatsSink>,
        reject_sink: Arc<dyn RejectSink>,
        logger: Arc<Logger>,
    ) -> Self {
        let open = Arc::new(AtomicBool::new(false));
        let terminate = Arc::new(AtomicBool::new(false));
        let store = Arc::new(PendingStore::new());
        let latency_tracker = Arc::new(LatencyTracker::new(stats_sink));

        let ingress = Ingress::new(
            open.clone(),
            terminate.clone(),
            store.clone(),
            latency_tracker.clone(),
            clock.clone(),
            reject_sink.clone(),
            logger.clone(),
        );

        let hours_controller = HoursController::new(
            config.clone(),
            open.clone(),
            terminate.clone(),
            clock.clone(),
            exchange.clone(),
            logger.clone(),
        );

        let transmitter = Transmitter::new(
            config,
            open.clone(),
            terminate.clone(),
            store.clone(),
            latency_tracker.clone(),
            clock,
            exchange,
            reject_sink.clone(),
            logger,
        );

        let hours_handle = std::thread::spawn(move || hours_controller.run());
        let mut transmitter = transmitter;
        let transmitter_handle = std::thread::spawn(move || transmitter.run());

        Self {
            ingress,
            open,
            terminate,
            store,
            latency_tracker,
            reject_sink,
            handles: Mutex::new(Some((hours_handle, transmitter_handle))),
        }
    }

    /// Admits a request from any upstream producer thread.
    pub fn submit(&self, request: OrderRequest, kind: RequestKind) {
        self.ingress.submit(request, kind);
    }

    /// Delivers a response from the exchange-facing thread.
    pub fn on_response(&self, response: OrderResponse) {
        self.ingress.on_response(response);
    }

    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::Acquire)
    }

    pub fn pending_count(&self) -> usize {
        self.store.len()
    }

    pub fn unknown_response_count(&self) -> u64 {
        self.latency_tracker.unknown_response_count()
    }

    /// Signals both background actors to stop, joins them, then drains
    /// whatever is still in the pending store, rejecting each
    /// non-canceled record — the transmitter's own closed-gateway drain
    /// only runs on a tick it actually gets to, and `terminate` can end
    /// its loop between ticks with orders still queued. Mirrors the
    /// original's explicit drain in `~OrderManagement()` after both
    /// threads join.
    ///
    /// Idempotent: a second call observes `handles` already taken and
    /// is a no-op.
    pub fn shutdown(&self) {
        self.terminate.store(true, Ordering::Release);
        self.open.store(false, Ordering::Release);

        let mut handles = self.handles.lock().unwrap();
        if let Some((hours_handle, transmitter_handle)) = handles.take() {
            let _ = hours_handle.join();
            let _ = transmitter_handle.join();

            self.store.drain_reject(|record| {
                self.reject_sink
                    .reject(record.request.order_id, "terminate");
            });
        }
    }
}

impl Drop for Gateway {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::SimClock;
    use crate::exchange::{NullRejectSink, NullStatsSink};
    use common::Side;
    use std::sync::Mutex as StdMutex;

    struct RecordingExchange {
        sent: StdMutex<Vec<u64>>,
    }

    impl Exchange for RecordingExchange {
        fn send(&self, request: &OrderRequest) {
            self.sent.lock().unwrap().push(request.order_id);
        }
        fn send_logon(&self, _username: &str, _password: &str) {}
        fn send_logout(&self, _username: &str) {}
    }

    struct RecordingRejectSink {
        rejections: StdMutex<Vec<(u64, String)>>,
    }

    impl RejectSink for RecordingRejectSink {
        fn reject(&self, order_id: u64, reason: &str) {
            self.rejections.lock().unwrap().push((order_id, reason.to_string()));
        }
    }

    fn wait_for(mut predicate: impl FnMut() -> bool, timeout: std::time::Duration) -> bool {
        let step = std::time::Duration::from_millis(1);
        let mut waited = std::time::Duration::ZERO;
        while !predicate() {
            if waited >= timeout {
                return false;
            }
            std::thread::sleep(step);
            waited += step;
        }
        true
    }

    fn req(order_id: u64) -> OrderRequest {
        OrderRequest {
            order_id,
            symbol_id: 1,
            price: 100.0,
            qty: 1,
            side: Side::Buy,
        }
    }

    #[test]
    fn starts_closed_and_shutdown_joins_both_actors() {
        let clock: Arc<dyn Clock> = Arc::new(SimClock::new(0));
        // open/close offsets far beyond anything a coarse sleep could
        // cross during the test, so the hours controller never flips
        // `open` while we're asserting against it.
        let mut config = Config::new(
            crate::clock::NS_PER_DAY - 2,
            crate::clock::NS_PER_DAY - 1,
            1,
            10,
            "u",
            "p",
        )
        .unwrap();
        config.regular_sleep_ns = 1_000_000;
        config.short_sleep_ns = 1_000_000;

        let exchange = Arc::new(RecordingExchange {
            sent: StdMutex::new(Vec::new()),
        });
        let logger = Arc::new(Logger::new());

        let gateway = Gateway::new(
            config,
            clock,
            exchange,
            Arc::new(NullStatsSink),
            Arc::new(NullRejectSink),
            logger,
        );

        assert!(!gateway.is_open());
        gateway.submit(req(1), RequestKind::New);
        // `shutdown` must join both background threads without hanging.
        gateway.shutdown();
        // Idempotent: a second call is a no-op, not a double-join panic.
        gateway.shutdown();
    }

    #[test]
    fn shutdown_drains_orders_still_parked_by_the_rate_cap() {
        let clock: Arc<dyn Clock> = Arc::new(SimClock::new(0));
        // Open immediately, close far away, rate 0: at most one
        // transmission per window, so the rest stay parked in the store
        // for as long as the gateway stays open.
        let mut config = Config::new(0, crate::clock::NS_PER_DAY - 1, 3600, 0, "u", "p").unwrap();
        config.regular_sleep_ns = 1_000;
        config.short_sleep_ns = 1_000;
        config.edge_threshold_ns = 0;

        let exchange = Arc::new(RecordingExchange {
            sent: StdMutex::new(Vec::new()),
        });
        let reject_sink = Arc::new(RecordingRejectSink {
            rejections: StdMutex::new(Vec::new()),
        });
        let logger = Arc::new(Logger::new());

        let gateway = Gateway::new(
            config,
            clock,
            exchange,
            Arc::new(NullStatsSink),
            reject_sink.clone(),
            logger,
        );

        let opened = wait_for(|| gateway.is_open(), std::time::Duration::from_millis(500));
        assert!(opened, "hours controller never opened the session");

        for id in 1..=5u64 {
            gateway.submit(req(id), RequestKind::New);
        }

        gateway.shutdown();

        // Whatever the rate cap left parked must be gone — rejected by
        // `shutdown`'s own drain if the transmitter's last tick didn't
        // already get to it.
        assert_eq!(gateway.pending_count(), 0);
        assert!(!reject_sink.rejections.lock().unwrap().is_empty());
    }
}
