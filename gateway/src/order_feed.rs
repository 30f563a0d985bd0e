//! Per-prefix mock order generator, grounded in `original_source`'s
//! `MockOrdersGenerator`: one background thread per client prefix,
//! submitting a `New` order every 100ms, with every `%10==1` order
//! preceded by a `Cancel` of the order nine back and every `%10==6`
//! order preceded by a `Modify` of the order nine back — the exact
//! cadence the original exercises.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use rand::Rng;

use common::Side;
use gateway_core::model::{OrderRequest, RequestKind};
use gateway_core::Gateway;

pub struct OrderFeed {
    terminate: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl OrderFeed {
    /// Spawns the generator thread for one client `prefix`.
    pub fn spawn(gateway: Arc<Gateway>, prefix: u8, symbol_id: i32) -> Self {
        let terminate = Arc::new(AtomicBool::new(false));
        let worker_terminate = terminate.clone();
        let handle = thread::spawn(move || generate(gateway, prefix, symbol_id, worker_terminate));
        Self {
            terminate,
            handle: Some(handle),
        }
    }

    pub fn shutdown(&mut self) {
        self.terminate.store(true, Ordering::Release);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for OrderFeed {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Builds the next order id by prefixing `seq_num` with `prefix`,
/// growing the prefix by a power of ten each time `seq_num` gains a
/// digit — the same scheme `MockOrdersGenerator::getNextSeqNumber` uses
/// so that concurrent clients never collide on an id.
fn next_seq_number(seq_num: u64, prefix: u8) -> u64 {
    let mut client_prefix = prefix as u64;
    let mut tmp = seq_num;
    while tmp > 0 {
        client_prefix *= 10;
        tmp /= 10;
    }
    seq_num + client_prefix
}

fn random_request(order_id: u64, symbol_id: i32, rng: &mut impl Rng) -> OrderRequest {
    OrderRequest {
        order_id,
        symbol_id,
        price: rng.gen_range(10.0..1000.0),
        qty: rng.gen_range(1..1000),
        side: if rng.gen_bool(0.5) { Side::Buy } else { Side::Sell },
    }
}

fn generate(gateway: Arc<Gateway>, prefix: u8, symbol_id: i32, terminate: Arc<AtomicBool>) {
    let mut rng = rand::thread_rng();
    let mut seq_num = 0u64;
    while !terminate.load(Ordering::Acquire) {
        let next_id = next_seq_number(seq_num, prefix);
        seq_num += 1;

        if next_id % 10 == 1 {
            gateway.submit(random_request(next_id - 1, symbol_id, &mut rng), RequestKind::Cancel);
            thread::sleep(Duration::from_millis(100));
        }
        if next_id % 10 == 6 {
            gateway.submit(random_request(next_id - 1, symbol_id, &mut rng), RequestKind::Modify);
            thread::sleep(Duration::from_millis(100));
        }

        gateway.submit(random_request(next_id, symbol_id, &mut rng), RequestKind::New);
        thread::sleep(Duration::from_millis(100));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seq_number_grows_prefix_with_digit_count() {
        assert_eq!(next_seq_number(0, 1), 1);
        assert_eq!(next_seq_number(1, 1), 11);
        assert_eq!(next_seq_number(9, 1), 19);
        assert_eq!(next_seq_number(10, 1), 110);
    }

    #[test]
    fn distinct_prefixes_never_collide() {
        for seq in 0..50u64 {
            assert_ne!(next_seq_number(seq, 1), next_seq_number(seq, 2));
        }
    }
}
