//! FIFO of pending orders plus an id-indexed lookup, shared between
//! Ingress and Transmitter behind a single mutex.
//!
//! spec.md's re-architecture note rules out a raw pointer into a
//! growable sequential container: here the FIFO only ever holds
//! `OrderId`s, and the records themselves live in a `HashMap` keyed by
//! id. The id is the stable handle; the map entry is the stable
//! storage. Both are only ever touched while `inner`'s mutex is held,
//! so "the index borrows for the lifetime of the store mutex only"
//! holds trivially — there is no borrow to outlive the lock in the
//! first place.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use common::OrderId;

use crate::model::OrderRecord;

struct Inner {
    fifo: VecDeque<OrderId>,
    records: HashMap<OrderId, OrderRecord>,
}

pub struct PendingStore {
    inner: Mutex<Inner>,
    poisoned: AtomicBool,
}

impl PendingStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                fifo: VecDeque::new(),
                records: HashMap::new(),
            }),
            poisoned: AtomicBool::new(false),
        }
    }

    /// Recovers from a poisoned lock rather than re-panicking: the data
    /// behind it is still structurally valid (a `VecDeque`/`HashMap`
    /// can't be left half-written by any of this module's own critical
    /// sections), only possibly stale relative to whatever the panicking
    /// thread was doing. `is_poisoned` latches so callers can notice and
    /// escalate to shutdown.
    fn lock(&self) -> MutexGuard<'_, Inner> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(err) => {
                self.poisoned.store(true, Ordering::Release);
                err.into_inner()
            }
        }
    }

    /// Whether this store's mutex has ever been observed poisoned.
    pub fn is_poisoned(&self) -> bool {
        self.poisoned.load(Ordering::Acquire)
    }

    /// Appends a new record to the FIFO tail and indexes it by id. O(1).
    pub fn push_new(&self, record: OrderRecord) {
        let mut inner = self.lock();
        let order_id = record.request.order_id;
        inner.fifo.push_back(order_id);
        inner.records.insert(order_id, record);
    }

    /// Applies `f` to the record for `order_id` while the mutex is
    /// held, if it is still in the store. Returns whether a record was
    /// found — the best-effort contract modify/cancel operate under.
    pub fn with_record_mut(&self, order_id: OrderId, f: impl FnOnce(&mut OrderRecord)) -> bool {
        let mut inner = self.lock();
        match inner.records.get_mut(&order_id) {
            Some(record) => {
                f(record);
                true
            }
            None => false,
        }
    }

    /// Marks `order_id` canceled if it is still in the store. Once set,
    /// the flag is never unset by any other operation.
    pub fn cancel(&self, order_id: OrderId) -> bool {
        self.with_record_mut(order_id, |record| record.canceled = true)
    }

    /// Pops the head of the FIFO, removing it from the index too. O(1).
    /// Returns `None` if the store is empty.
    pub fn pop_head(&self) -> Option<OrderRecord> {
        let mut inner = self.lock();
        let order_id = inner.fifo.pop_front()?;
        inner.records.remove(&order_id)
    }

    /// Pops every record, invoking `on_reject` on each non-canceled one.
    /// Used to drain the store when the gateway is closed or is
    /// shutting down.
    pub fn drain_reject(&self, mut on_reject: impl FnMut(OrderRecord)) {
        let mut inner = self.lock();
        while let Some(order_id) = inner.fifo.pop_front() {
            if let Some(record) = inner.records.remove(&order_id) {
                if !record.canceled {
                    on_reject(record);
                }
            }
        }
    }

    /// Number of records currently held. Test/diagnostic use only.
    pub fn len(&self) -> usize {
        self.lock().fifo.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for PendingStore {
    fn default() -> Self {
        Self::new()
    }
}
