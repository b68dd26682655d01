//! Unbounded multi-producer, multi-consumer work queue
//!
//! Producers push into an unbounded channel and never wait. A dispatcher task
//! owns the buffered items and offers the oldest one to consumers through a
//! single-slot hand-off channel, so submissions and deliveries never contend
//! on one lock over the whole buffer.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio_util::sync::CancellationToken;

/// Capacity the dispatcher buffer starts with and shrinks back to
const INITIAL_CAPACITY: usize = 64;

/// Buffers that grew past this are released once they drain
const SHRINK_THRESHOLD: usize = 4096;

/// Unbounded FIFO queue with explicit shutdown
///
/// `put` never blocks. `next` suspends until an item is available and yields
/// `None` once the queue has been closed and everything accepted before the
/// close has been handed out.
pub struct Frontier<T> {
    input: mpsc::UnboundedSender<T>,
    output: Mutex<mpsc::Receiver<T>>,
    closed: CancellationToken,
    queued: Arc<AtomicUsize>,
}

impl<T: Send + 'static> Frontier<T> {
    /// Creates an empty frontier and spawns its dispatcher
    ///
    /// # Panics
    ///
    /// Panics when called outside of a tokio runtime.
    pub fn new() -> Self {
        let (input, input_rx) = mpsc::unbounded_channel();
        let (output_tx, output) = mpsc::channel(1);
        let closed = CancellationToken::new();

        tokio::spawn(dispatch(input_rx, output_tx, closed.clone()));

        Self {
            input,
            output: Mutex::new(output),
            closed,
            queued: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl<T: Send + 'static> Default for Frontier<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Frontier<T> {
    /// Adds an item to the back of the queue, returning whether it was accepted
    ///
    /// Items submitted after `close` are discarded.
    pub fn put(&self, item: T) -> bool {
        if self.closed.is_cancelled() {
            tracing::trace!("Frontier closed, dropping submitted item");
            return false;
        }

        self.queued.fetch_add(1, Ordering::SeqCst);
        if self.input.send(item).is_err() {
            self.queued.fetch_sub(1, Ordering::SeqCst);
            tracing::trace!("Frontier closed, dropping submitted item");
            return false;
        }

        true
    }

    /// Waits for the next item
    ///
    /// Returns `None` once the frontier is closed and drained. Cancel safe:
    /// dropping the returned future never loses an item.
    pub async fn next(&self) -> Option<T> {
        let mut output = self.output.lock().await;
        let item = output.recv().await?;
        self.queued.fetch_sub(1, Ordering::SeqCst);
        Some(item)
    }

    /// Stops accepting items; consumers see `None` after the backlog drains
    pub fn close(&self) {
        self.closed.cancel();
    }

    /// Returns whether `close` has been called
    pub fn is_closed(&self) -> bool {
        self.closed.is_cancelled()
    }

    /// Number of accepted items not yet returned by `next`
    pub fn len(&self) -> usize {
        self.queued.load(Ordering::SeqCst)
    }

    /// Returns whether no accepted item is waiting
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Moves items from producers to consumers until closed and drained
async fn dispatch<T>(
    mut input: mpsc::UnboundedReceiver<T>,
    output: mpsc::Sender<T>,
    closed: CancellationToken,
) {
    let mut buffer: VecDeque<T> = VecDeque::with_capacity(INITIAL_CAPACITY);
    let mut accepting = true;
    let mut input_open = true;

    loop {
        if !input_open && buffer.is_empty() {
            break;
        }

        tokio::select! {
            biased;

            _ = closed.cancelled(), if accepting => {
                // Rejects later sends but keeps what was already submitted
                input.close();
                accepting = false;
            }

            permit = output.reserve(), if !buffer.is_empty() => {
                let Ok(permit) = permit else {
                    // Every consumer handle is gone
                    break;
                };
                if let Some(item) = buffer.pop_front() {
                    permit.send(item);
                }
                if buffer.is_empty() && buffer.capacity() > SHRINK_THRESHOLD {
                    buffer.shrink_to(INITIAL_CAPACITY);
                }
            }

            item = input.recv(), if input_open => {
                match item {
                    Some(item) => buffer.push_back(item),
                    None => input_open = false,
                }
            }
        }
    }

    tracing::trace!("Frontier dispatcher stopped");
}
