//! Background actor that opens and closes the session on schedule.
//!
//! Uses coarse sleeps when the next edge (open or close) is far away
//! and tight polling when it is near, so the edge is hit with
//! sub-microsecond accuracy without burning CPU the rest of the day —
//! the hybrid wait/spin strategy from spec.md §4.3, grounded in
//! `original_source`'s `checkExchangeState`/`waitOrAct`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use common::logging::{LogLevel, Logger};

use crate::clock::Clock;
use crate::config::Config;
use crate::exchange::Exchange;

pub struct HoursController {
    config: Config,
    open: Arc<AtomicBool>,
    terminate: Arc<AtomicBool>,
    clock: Arc<dyn Clock>,
    exchange: Arc<dyn Exchange>,
    logger: Arc<Logger>,
}

impl HoursController {
    pub fn new(
        config: Config,
        open: Arc<AtomicBool>,
        terminate: Arc<AtomicBool>,
        clock: Arc<dyn Clock>,
        exchange: Arc<dyn Exchange>,
        logger: Arc<Logger>,
    ) -> Self {
        Self {
            config,
            open,
            terminate,
            clock,
            exchange,
            logger,
        }
    }

    pub fn run(&self) {
        while !self.terminate.load(Ordering::Acquire) {
            self.tick();
        }
    }

    fn tick(&self) {
        let now_offset = self.clock.day_offset_ns();

        if now_offset >= self.config.close_offset_ns {
            self.sleep_regular();
            return;
        }

        if !self.open.load(Ordering::Acquire) {
            self.wait_or_act(now_offset, self.config.open_offset_ns, || {
                self.logger.log(LogLevel::Info, "sending logon");
                self.exchange.send_logon(&self.config.username, &self.config.password);
                self.open.store(true, Ordering::Release);
            });
        } else {
            let close_guard_offset = self
                .config
                .close_offset_ns
                .saturating_sub(self.config.close_guard_ns);
            self.wait_or_act(now_offset, close_guard_offset, || {
                self.logger.log(LogLevel::Info, "sending logout");
                self.exchange.send_logout(&self.config.username);
                self.open.store(false, Ordering::Release);
            });
        }
    }

    /// If the target offset is far away, sleep one regular tick and
    /// re-evaluate on the next `tick()`. Otherwise busy-poll the clock
    /// until the target is reached, then perform `act`.
    fn wait_or_act(&self, now_offset: u64, target_offset: u64, act: impl FnOnce()) {
        if now_offset < target_offset
            && target_offset - now_offset > self.config.edge_threshold_ns
        {
            self.sleep_regular();
            return;
        }

        while self.clock.day_offset_ns() < target_offset {
            if self.terminate.load(Ordering::Acquire) {
                return;
            }
            std::hint::spin_loop();
        }
        act();
    }

    fn sleep_regular(&self) {
        thread::sleep(Duration::from_nanos(self.config.regular_sleep_ns));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::SimClock;
    use std::sync::Mutex;

    struct RecordingExchange {
        events: Mutex<Vec<&'static str>>,
    }

    impl Exchange for RecordingExchange {
        fn send(&self, _request: &crate::model::OrderRequest) {}
        fn send_logon(&self, _username: &str, _password: &str) {
            self.events.lock().unwrap().push("logon");
        }
        fn send_logout(&self, _username: &str) {
            self.events.lock().unwrap().push("logout");
        }
    }

    fn make_controller(
        open_offset_ns: u64,
        close_offset_ns: u64,
        clock: SimClock,
    ) -> (HoursController, Arc<AtomicBool>, Arc<AtomicBool>, Arc<RecordingExchange>) {
        let mut config = Config::new(open_offset_ns, close_offset_ns, 1, 1, "u", "p").unwrap();
        config.edge_threshold_ns = 0; // always busy-poll in tests, no real sleeping
        config.close_guard_ns = 0;
        let open = Arc::new(AtomicBool::new(false));
        let terminate = Arc::new(AtomicBool::new(false));
        let exchange = Arc::new(RecordingExchange {
            events: Mutex::new(Vec::new()),
        });
        let logger = Arc::new(Logger::new());
        let controller = HoursController::new(
            config,
            open.clone(),
            terminate.clone(),
            Arc::new(clock),
            exchange.clone(),
            logger,
        );
        (controller, open, terminate, exchange)
    }

    #[test]
    fn opens_at_open_offset() {
        let clock = SimClock::new(10);
        let (controller, open, _terminate, exchange) = make_controller(10, 100, clock);
        controller.tick();
        assert!(open.load(Ordering::SeqCst));
        assert_eq!(*exchange.events.lock().unwrap(), vec!["logon"]);
    }

    #[test]
    fn closes_at_close_offset() {
        let clock = SimClock::new(100);
        let (controller, open, _terminate, exchange) = make_controller(10, 100, clock);
        open.store(true, Ordering::SeqCst);
        controller.tick();
        assert!(!open.load(Ordering::SeqCst));
        assert_eq!(*exchange.events.lock().unwrap(), vec!["logout"]);
    }

    #[test]
    fn no_action_before_edge_is_reached_with_slack() {
        let clock = SimClock::new(0);
        let (mut controller, open, _terminate, exchange) = make_controller(50, 100, clock);
        controller.config.edge_threshold_ns = 1000; // force the "sleep" branch
        controller.config.regular_sleep_ns = 1; // keep the test fast
        controller.tick();
        assert!(!open.load(Ordering::SeqCst));
        assert!(exchange.events.lock().unwrap().is_empty());
    }
}
