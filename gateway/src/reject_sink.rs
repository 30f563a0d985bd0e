//! Logger-backed [`RejectSink`]. Grounded in `original_source`'s
//! `rejectOrder`, which writes every rejection to `std::cerr` — the
//! same externally-observable event here goes through
//! `common::logging::Logger` at `Warn` instead of a raw stream, matching
//! how the rest of this workspace reports order-level events.

use std::sync::Arc;

use common::logging::{LogLevel, Logger};
use common::OrderId;
use gateway_core::exchange::RejectSink;

/// Logs every rejection at `Warn` rather than discarding it. The only
/// `RejectSink` a runnable binary should wire — `NullRejectSink` exists
/// for tests that don't care about the reject path.
pub struct LoggingRejectSink {
    logger: Arc<Logger>,
}

impl LoggingRejectSink {
    pub fn new(logger: Arc<Logger>) -> Self {
        Self { logger }
    }
}

impl RejectSink for LoggingRejectSink {
    fn reject(&self, order_id: OrderId, reason: &str) {
        self.logger.log_with_value(
            LogLevel::Warn,
            "order rejected",
            format!("{order_id} ({reason})"),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reject_does_not_panic_and_is_fire_and_forget() {
        let sink = LoggingRejectSink::new(Arc::new(Logger::new()));
        sink.reject(7, "closed while queued");
    }
}
