//! An in-process stand-in exchange for running the gateway end-to-end
//! without a real venue. Grounded in `original_source`'s
//! `ExchangeResponseSimulator`: a background thread pops transmitted
//! order ids off a queue and responds with a uniformly random result.
//!
//! Decoupled from the gateway by an `mpsc` channel rather than a
//! stored callback — `Exchange` is constructed before the `Gateway`
//! that will hold it, so there is no `Gateway` to call back into yet.
//! The caller (`main`) owns the receiving half and drives
//! `Gateway::on_response` from it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Mutex;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use rand::Rng;

use gateway_core::exchange::Exchange;
use gateway_core::model::{OrderRequest, OrderResponse, ResponseResult};

/// Samples a response the same way `uniform_int_distribution<>(0,
/// static_cast<int>(ResponseType::Reject) + 1)` does in the original:
/// four equally likely outcomes over a three-variant enum. The fourth
/// (out-of-range) draw folds into `Unknown`, mirroring the undefined
/// `static_cast<ResponseType>(3)` the original performs without
/// noticing.
fn sample_response_result(rng: &mut impl Rng) -> ResponseResult {
    match rng.gen_range(0..=3) {
        1 => ResponseResult::Accept,
        2 => ResponseResult::Reject,
        _ => ResponseResult::Unknown,
    }
}

pub struct DemoExchange {
    pending: Mutex<std::collections::VecDeque<u64>>,
    terminated: AtomicBool,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl DemoExchange {
    /// Spawns the responder thread and returns the exchange paired with
    /// the receiving half of its response channel.
    pub fn spawn() -> (std::sync::Arc<Self>, Receiver<OrderResponse>) {
        let (tx, rx) = mpsc::channel();
        let exchange = std::sync::Arc::new(Self {
            pending: Mutex::new(std::collections::VecDeque::new()),
            terminated: AtomicBool::new(false),
            handle: Mutex::new(None),
        });

        let worker = exchange.clone();
        let handle = thread::spawn(move || worker.respond(tx));
        *exchange.handle.lock().unwrap() = Some(handle);

        (exchange, rx)
    }

    fn respond(&self, tx: Sender<OrderResponse>) {
        let mut rng = rand::thread_rng();
        while !self.terminated.load(Ordering::Acquire) {
            let next = self.pending.lock().unwrap().pop_front();
            if let Some(order_id) = next {
                let result = sample_response_result(&mut rng);
                if tx.send(OrderResponse { order_id, result }).is_err() {
                    return;
                }
            }
            thread::sleep(Duration::from_micros(1));
        }
    }

    pub fn shutdown(&self) {
        self.terminated.store(true, Ordering::Release);
        if let Some(handle) = self.handle.lock().unwrap().take() {
            let _ = handle.join();
        }
    }
}

impl Exchange for DemoExchange {
    fn send(&self, request: &OrderRequest) {
        self.pending.lock().unwrap().push_back(request.order_id);
    }

    fn send_logon(&self, _username: &str, _password: &str) {}
    fn send_logout(&self, _username: &str) {}
}

impl Drop for DemoExchange {
    fn drop(&mut self) {
        self.terminated.store(true, Ordering::Release);
        if let Some(handle) = self.handle.lock().unwrap().take() {
            let _ = handle.join();
        }
    }
}
