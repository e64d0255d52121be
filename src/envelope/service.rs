//! Adapter over an external geometry-query service.
//!
//! The service (typically a spatial database) answers "oriented rectangle of
//! these fragments" with the rectangle's four side lengths. Calls are
//! throttled through a [`ConnectionPool`] so that no more than a fixed number
//! of queries are outstanding, whatever the number of worker threads.

use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

use super::{Envelope, EnvelopeProvider};
use crate::error::GeometryError;
use crate::fragment::FragmentId;

/// External geometry-query service.
pub trait GeometryQueryService: Send + Sync {
    /// Side lengths in meters of the oriented minimum rectangle enclosing the
    /// union of `ids`, in perimeter order.
    ///
    /// # Returns
    /// - `Ok(Some(sides))` on success
    /// - `Ok(None)` if the service knows none of the ids
    /// - `Err(message)` on service failure
    fn oriented_rect_sides(&self, ids: &[FragmentId]) -> Result<Option<[f64; 4]>, String>;
}

/// Bounded pool of connection permits.
///
/// [`ConnectionPool::acquire`] blocks until a permit is free; the returned
/// [`PoolPermit`] gives it back when dropped.
#[derive(Debug)]
pub struct ConnectionPool {
    capacity: usize,
    available: Mutex<usize>,
    released: Condvar,
}

impl ConnectionPool {
    /// Create a pool with `capacity` permits (at least one).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            available: Mutex::new(capacity),
            released: Condvar::new(),
        }
    }

    /// Total number of permits.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Permits currently free.
    pub fn available(&self) -> usize {
        *self.available.lock()
    }

    /// Block until a permit is free.
    pub fn acquire(&self) -> PoolPermit<'_> {
        let mut available = self.available.lock();
        while *available == 0 {
            self.released.wait(&mut available);
        }
        *available -= 1;
        PoolPermit { pool: self }
    }

    /// Wait at most `timeout` in total for a permit.
    pub fn try_acquire_for(&self, timeout: Duration) -> Option<PoolPermit<'_>> {
        let deadline = Instant::now() + timeout;
        let mut available = self.available.lock();
        while *available == 0 {
            if self.released.wait_until(&mut available, deadline).timed_out() && *available == 0 {
                return None;
            }
        }
        *available -= 1;
        Some(PoolPermit { pool: self })
    }

    fn release(&self) {
        let mut available = self.available.lock();
        *available += 1;
        self.released.notify_one();
    }
}

/// A held connection permit. Released on drop.
#[derive(Debug)]
pub struct PoolPermit<'a> {
    pool: &'a ConnectionPool,
}

impl Drop for PoolPermit<'_> {
    fn drop(&mut self) {
        self.pool.release();
    }
}

/// Envelope provider backed by a [`GeometryQueryService`].
pub struct QueryServiceProvider<S> {
    service: S,
    pool: ConnectionPool,
    acquire_timeout: Option<Duration>,
}

impl<S: GeometryQueryService> QueryServiceProvider<S> {
    /// Wrap a service with a pool of `max_connections` permits.
    pub fn new(service: S, max_connections: usize) -> Self {
        Self {
            service,
            pool: ConnectionPool::new(max_connections),
            acquire_timeout: None,
        }
    }

    /// Fail with [`GeometryError::Service`] instead of waiting longer than
    /// `timeout` for a free connection.
    pub fn with_acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout = Some(timeout);
        self
    }

    /// The connection pool.
    pub fn pool(&self) -> &ConnectionPool {
        &self.pool
    }

    /// The wrapped service.
    pub fn service(&self) -> &S {
        &self.service
    }
}

impl<S: GeometryQueryService> EnvelopeProvider for QueryServiceProvider<S> {
    fn envelope(&self, ids: &[FragmentId]) -> Result<Envelope, GeometryError> {
        if ids.is_empty() {
            return Err(GeometryError::Empty);
        }

        let response = {
            let _permit = match self.acquire_timeout {
                Some(timeout) => self.pool.try_acquire_for(timeout).ok_or_else(|| {
                    GeometryError::Service(format!(
                        "no connection available within {} ms",
                        timeout.as_millis()
                    ))
                })?,
                None => self.pool.acquire(),
            };
            self.service.oriented_rect_sides(ids)
        };

        match response {
            Ok(Some(sides)) => Envelope::from_sides(sides),
            // The service does not say which id it missed
            Ok(None) => Err(GeometryError::UnknownFragment(ids[0])),
            Err(message) => Err(GeometryError::Service(message)),
        }
    }
}
