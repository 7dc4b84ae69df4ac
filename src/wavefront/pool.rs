use std::pin::pin;
use std::sync::Arc;
use std::time::Duration;

use crossbeam_queue::ArrayQueue;
use tokio::net::TcpStream;
use tokio::sync::{Notify, OwnedSemaphorePermit, Semaphore};
use tokio::time::timeout;

use super::writer::WriteError;

// ─── Tuning ──────────────────────────────────────────────────────

/// How long `get` optimistically waits for a returned connection before
/// it starts competing for a capacity slot to dial a new one. Bounds the
/// reuse wait only; it is not a connect timeout.
const REUSE_WAIT: Duration = Duration::from_millis(1);

// ─── Pooled connection ───────────────────────────────────────────

/// A live proxy connection paired with the capacity token that admitted
/// it. Dropping one closes the socket and releases the token in a single
/// step, so no failure path can leak a slot.
#[derive(Debug)]
pub struct PooledConn {
    pub(crate) stream: TcpStream,
    _permit: OwnedSemaphorePermit,
}

// ─── Pool ────────────────────────────────────────────────────────

/// Bounded pool of TCP connections to one downstream address.
///
/// Shared state is a lock-free idle queue plus a counting semaphore for
/// capacity, so concurrent `get`/`put_back` callers never serialize on a
/// pool-wide lock. There is no fairness guarantee among waiters.
pub struct ConnectionPool {
    addr: String,
    /// Idle connections available for reuse; holds at most the pool cap.
    idle: ArrayQueue<PooledConn>,
    /// Signaled once per buffered `put_back`.
    returned: Notify,
    /// Capacity tokens; exactly one is held per live connection.
    slots: Arc<Semaphore>,
}

impl ConnectionPool {
    /// Create an empty pool for `addr`. Connections are dialed lazily.
    pub fn new(addr: String, max_connections: usize) -> Self {
        Self {
            addr,
            idle: ArrayQueue::new(max_connections),
            returned: Notify::new(),
            slots: Arc::new(Semaphore::new(max_connections)),
        }
    }

    /// Check out a connection.
    ///
    /// Two-phase acquisition: first wait briefly for an idle connection to
    /// show up, so a burst doesn't dial new sockets while returns are in
    /// flight; then race "a connection was returned" against "a capacity
    /// slot freed up". Winning a slot dials a fresh connection; a dial
    /// failure surfaces as [`WriteError::Connect`] and the reserved slot
    /// is released with the dropped permit.
    pub async fn get(&self) -> Result<PooledConn, WriteError> {
        if let Some(conn) = self.idle.pop() {
            return Ok(conn);
        }

        // Phase 1: optimistic bounded wait for a return. The waiter is
        // enabled before the re-check so a wakeup can't slip past us.
        {
            let mut returned = pin!(self.returned.notified());
            returned.as_mut().enable();
            if let Some(conn) = self.idle.pop() {
                return Ok(conn);
            }
            if timeout(REUSE_WAIT, returned).await.is_ok() {
                if let Some(conn) = self.idle.pop() {
                    return Ok(conn);
                }
            }
        }

        // Phase 2: race a returned connection against a free slot.
        loop {
            let mut returned = pin!(self.returned.notified());
            returned.as_mut().enable();
            if let Some(conn) = self.idle.pop() {
                return Ok(conn);
            }

            tokio::select! {
                _ = &mut returned => {
                    // Another waiter may have grabbed it first; go again.
                    if let Some(conn) = self.idle.pop() {
                        return Ok(conn);
                    }
                }
                permit = Arc::clone(&self.slots).acquire_owned() => {
                    // The semaphore is never closed while the pool lives.
                    let permit = permit.expect("pool semaphore closed");
                    let stream = TcpStream::connect(&self.addr)
                        .await
                        .map_err(WriteError::Connect)?;
                    return Ok(PooledConn { stream, _permit: permit });
                }
            }
        }
    }

    /// Return a checked-out connection for reuse. Never blocks.
    ///
    /// If the idle buffer is already full the connection is closed and its
    /// slot released instead — whichever connection happened to be on its
    /// way back, not the least recently used one.
    pub fn put_back(&self, conn: PooledConn) {
        if self.idle.push(conn).is_ok() {
            self.returned.notify_one();
        }
        // On overflow the rejected connection is dropped here: the socket
        // closes and the permit frees the capacity slot.
    }
}

// ─── Tests ───────────────────────────────────────────────────────
