//! Background actor that drains the pending store at a bounded rate
//! while the gateway is open.
//!
//! Owns a private sliding window of recent send timestamps — no
//! locking needed, since only this actor ever touches it (spec.md
//! §4.4). Grounded in `original_source`'s `transmitRemoteRequests`/
//! `transmitOneOrder`.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use common::logging::{LogLevel, Logger};

use crate::clock::Clock;
use crate::config::Config;
use crate::exchange::{Exchange, RejectSink};
use crate::latency_tracker::LatencyTracker;
use crate::pending_store::PendingStore;

pub struct Transmitter {
    config: Config,
    open: Arc<AtomicBool>,
    terminate: Arc<AtomicBool>,
    store: Arc<PendingStore>,
    latency_tracker: Arc<LatencyTracker>,
    clock: Arc<dyn Clock>,
    exchange: Arc<dyn Exchange>,
    reject_sink: Arc<dyn RejectSink>,
    logger: Arc<Logger>,
    /// Send timestamps within the last `window_sec` seconds. Private to
    /// this actor — never shared, never locked.
    window: VecDeque<u64>,
}

impl Transmitter {
    pub fn new(
        config: Config,
        open: Arc<AtomicBool>,
        terminate: Arc<AtomicBool>,
        store: Arc<PendingStore>,
        latency_tracker: Arc<LatencyTracker>,
        clock: Arc<dyn Clock>,
        exchange: Arc<dyn Exchange>,
        reject_sink: Arc<dyn RejectSink>,
        logger: Arc<Logger>,
    ) -> Self {
        Self {
            config,
            open,
            terminate,
            store,
            latency_tracker,
            clock,
            exchange,
            reject_sink,
            logger,
            window: VecDeque::new(),
        }
    }

    pub fn run(&mut self) {
        while !self.terminate.load(Ordering::Acquire) {
            self.tick();
        }
    }

    /// If the store or latency tracker has ever observed a poisoned
    /// lock, logs it once and sets `terminate` — matches `Ingress`'s own
    /// bridge, since either actor may be the one to first notice.
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

    fn tick(&mut self) {
        if self.check_poison() {
            return;
        }

        let now = self.clock.now_ns().as_u64();

        if !self.open.load(Ordering::Acquire) {
            self.store.drain_reject(|record| {
                self.reject_sink
                    .reject(record.request.order_id, "closed while queued");
            });

            let now_offset = now % crate::clock::NS_PER_DAY;
            let past_or_near_close = now_offset >= self.config.close_offset_ns
                || self.config.close_offset_ns - now_offset < self.config.edge_threshold_ns;
            if past_or_near_close {
                thread::sleep(Duration::from_nanos(self.config.regular_sleep_ns));
            } else {
                thread::sleep(Duration::from_nanos(self.config.short_sleep_ns));
            }
            return;
        }

        let window_ns = self.config.window_sec.saturating_mul(1_000_000_000);
        while let Some(&front) = self.window.front() {
            if front + window_ns < now {
                self.window.pop_front();
            } else {
                break;
            }
        }

        // Inclusive boundary by design: this admits `rate + 1`
        // transmissions per window, per spec.md's open question.
        if (self.window.len() as u64) <= self.config.rate {
            if self.transmit_one() {
                self.window.push_back(now);
            }
        } else {
            thread::sleep(Duration::from_nanos(self.config.short_sleep_ns));
        }
    }

    /// Pops the head of the store and, unless canceled, transmits it.
    /// Returns whether a transmission actually happened.
    fn transmit_one(&self) -> bool {
        let record = match self.store.pop_head() {
            Some(record) => record,
            None => return false,
        };

        if record.canceled {
            return false;
        }

        self.exchange.send(&record.request);
        let send_time = self.clock.now_ns();
        self.latency_tracker
            .record_sent(record.request.order_id, record.ingress_time_ns, send_time);
        true
    }
}
