// wordshield/src/pool.rs
//! Bounded free lists of reusable scratch buffers.
//!
//! The detector's hot paths (normalization scratch, match bitmap, rewrite
//! output) draw their buffers from these pools instead of allocating per
//! call. Buffers whose capacity grew past [`MAX_POOLED_CAPACITY`] are
//! dropped on release so a single pathological input cannot pin memory.
//!
//! License: MIT OR APACHE 2.0

use std::sync::Mutex;

/// Buffers larger than this many elements are not retained.
pub(crate) const MAX_POOLED_CAPACITY: usize = 64 * 1024;

/// Upper bound on idle buffers kept per pool.
const MAX_POOLED_BUFFERS: usize = 8;

/// A bounded free list of `Vec<T>` scratch buffers.
///
/// Each acquired buffer is owned by exactly one caller until released;
/// the pool itself is safe to share across threads.
#[derive(Debug)]
pub(crate) struct BufferPool<T> {
    free: Mutex<Vec<Vec<T>>>,
}

impl<T> BufferPool<T> {
    pub(crate) fn new() -> Self {
        Self {
            free: Mutex::new(Vec::new()),
        }
    }

    /// Returns an empty buffer with at least `capacity` spare elements.
    pub(crate) fn acquire(&self, capacity: usize) -> Vec<T> {
        let recycled = self.free.lock().unwrap().pop();
        match recycled {
            Some(mut buf) => {
                buf.clear();
                if buf.capacity() < capacity {
                    buf.reserve(capacity - buf.capacity());
                }
                buf
            }
            None => Vec::with_capacity(capacity),
        }
    }

    /// Returns a buffer to the pool, discarding it if it outgrew the
    /// retention ceiling or the pool is already full.
    pub(crate) fn release(&self, buf: Vec<T>) {
        if buf.capacity() > MAX_POOLED_CAPACITY {
            return;
        }
        let mut free = self.free.lock().unwrap();
        if free.len() < MAX_POOLED_BUFFERS {
            free.push(buf);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acquire_reuses_released_buffer() {
        let pool: BufferPool<char> = BufferPool::new();
        let mut buf = pool.acquire(16);
        buf.extend("hello".chars());
        let cap = buf.capacity();
        pool.release(buf);

        let reused = pool.acquire(4);
        assert!(reused.is_empty());
        assert_eq!(reused.capacity(), cap);
    }

    #[test]
    fn test_acquire_grows_to_requested_capacity() {
        let pool: BufferPool<bool> = BufferPool::new();
        pool.release(Vec::with_capacity(8));
        let buf = pool.acquire(1024);
        assert!(buf.capacity() >= 1024);
    }

    #[test]
    fn test_oversized_buffers_are_discarded() {
        let pool: BufferPool<char> = BufferPool::new();
        pool.release(Vec::with_capacity(MAX_POOLED_CAPACITY + 1));
        // The oversized buffer was dropped, so this one is fresh.
        let buf = pool.acquire(1);
        assert!(buf.capacity() <= MAX_POOLED_CAPACITY);
    }
}
