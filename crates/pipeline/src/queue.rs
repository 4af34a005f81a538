//! Bounded FIFO channel connecting producers and consumers.
//!
//! A [`Queue`] is a cloneable handle: every clone refers to the same
//! underlying buffer, so one queue can be the output of one pool and the
//! input of the next. Producers block while the queue is full and consumers
//! block while it is empty.

use std::fmt;
use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender, TryRecvError, TrySendError};

use brewline_core::{BrewlineError, Result};

/// Bounded multi-producer, multi-consumer FIFO queue.
pub struct Queue<T> {
    tx: Sender<T>,
    rx: Receiver<T>,
    capacity: usize,
}

impl<T> Queue<T> {
    /// Create a queue holding at most `capacity` items.
    ///
    /// The capacity is fixed for the queue's lifetime. Zero is rejected: a
    /// rendezvous channel would change the buffering contract.
    pub fn bounded(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(BrewlineError::invalid("queue capacity must be positive"));
        }
        let (tx, rx) = bounded(capacity);
        Ok(Self { tx, rx, capacity })
    }

    /// Enqueue an item, blocking while the queue is full.
    pub fn push(&self, item: T) -> Result<()> {
        self.tx
            .send(item)
            .map_err(|_| BrewlineError::QueueClosed("all receivers dropped".into()))
    }

    /// Dequeue the oldest item, blocking while the queue is empty.
    pub fn pop(&self) -> Result<T> {
        self.rx
            .recv()
            .map_err(|_| BrewlineError::QueueClosed("all senders dropped".into()))
    }

    /// Enqueue without blocking. A full queue hands the item back.
    pub fn try_push(&self, item: T) -> std::result::Result<(), T> {
        self.tx.try_send(item).map_err(|e| match e {
            TrySendError::Full(item) | TrySendError::Disconnected(item) => item,
        })
    }

    /// Dequeue without blocking.
    pub fn try_pop(&self) -> Option<T> {
        match self.rx.try_recv() {
            Ok(item) => Some(item),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    /// Dequeue, giving up after `timeout`.
    pub fn pop_timeout(&self, timeout: Duration) -> Option<T> {
        match self.rx.recv_timeout(timeout) {
            Ok(item) => Some(item),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.tx.is_full()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Whether two handles refer to the same underlying queue.
    pub fn same_queue(a: &Self, b: &Self) -> bool {
        a.tx.same_channel(&b.tx)
    }
}

impl<T> Clone for Queue<T> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
            rx: self.rx.clone(),
            capacity: self.capacity,
        }
    }
}

impl<T> fmt::Debug for Queue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Queue")
            .field("len", &self.len())
            .field("capacity", &self.capacity)
            .finish()
    }
}
