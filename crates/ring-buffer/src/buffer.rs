//! Overwrite-oldest window storage

use serde::Serialize;
use std::iter::Chain;
use std::slice;

/// Fixed-capacity ring buffer that evicts the oldest sample on overflow.
///
/// Storage grows up to `capacity` once and is then reused slot by slot, so a
/// push never reallocates after the window has filled.
#[derive(Debug, Clone, Serialize)]
pub struct RingBuffer<T> {
    /// Sample storage, never longer than `capacity`
    storage: Vec<T>,
    capacity: usize,
    /// Next slot to write once the buffer is full (also the oldest sample)
    head: usize,
}

impl<T> RingBuffer<T> {
    /// Create an empty buffer holding at most `capacity` samples
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "Ring buffer capacity must be > 0");
        Self {
            storage: Vec::with_capacity(capacity),
            capacity,
            head: 0,
        }
    }

    /// Push a sample, returning the evicted oldest sample if the buffer was full
    pub fn push(&mut self, item: T) -> Option<T> {
        if self.storage.len() < self.capacity {
            self.storage.push(item);
            self.head = self.storage.len() % self.capacity;
            return None;
        }

        let evicted = std::mem::replace(&mut self.storage[self.head], item);
        self.head = (self.head + 1) % self.capacity;
        Some(evicted)
    }

    /// Number of samples currently held
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.storage.len() == self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Iterate samples from oldest to newest
    pub fn iter(&self) -> Chain<slice::Iter<'_, T>, slice::Iter<'_, T>> {
        let start = if self.is_full() { self.head } else { 0 };
        let (newer, older) = self.storage.split_at(start);
        older.iter().chain(newer.iter())
    }

    /// Most recently pushed sample
    pub fn latest(&self) -> Option<&T> {
        if self.storage.is_empty() {
            return None;
        }
        let idx = (self.head + self.capacity - 1) % self.capacity;
        self.storage.get(idx)
    }
}

impl<T: Clone> RingBuffer<T> {
    /// Copy the window out, oldest first
    pub fn to_vec(&self) -> Vec<T> {
        self.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_push_and_iterate() {
        let mut buffer = RingBuffer::new(10);

        for i in 0..5 {
            buffer.push(i * 100);
        }

        assert_eq!(buffer.len(), 5);
        assert!(!buffer.is_full());
        assert_eq!(buffer.to_vec(), vec![0, 100, 200, 300, 400]);
        assert_eq!(buffer.latest(), Some(&400));
    }

    #[test]
    fn test_overwrite_oldest() {
        let mut buffer = RingBuffer::new(5);

        let mut evicted = Vec::new();
        for i in 0..8 {
            if let Some(old) = buffer.push(i) {
                evicted.push(old);
            }
        }

        assert!(buffer.is_full());
        assert_eq!(buffer.len(), 5);
        assert_eq!(evicted, vec![0, 1, 2]);
        assert_eq!(buffer.to_vec(), vec![3, 4, 5, 6, 7]);
        assert_eq!(buffer.latest(), Some(&7));
        assert_eq!(buffer.iter().rev().take(2).copied().collect::<Vec<_>>(), vec![7, 6]);
    }

    #[test]
    fn test_empty_buffer() {
        let buffer: RingBuffer<u8> = RingBuffer::new(3);
        assert!(buffer.is_empty());
        assert_eq!(buffer.latest(), None);
        assert_eq!(buffer.capacity(), 3);
        assert_eq!(buffer.iter().count(), 0);
    }

    #[test]
    #[should_panic(expected = "capacity must be > 0")]
    fn test_zero_capacity_panics() {
        let _ = RingBuffer::<u8>::new(0);
    }

    proptest! {
        #[test]
        fn prop_window_holds_most_recent(capacity in 1usize..64, values in proptest::collection::vec(any::<i32>(), 0..256)) {
            let mut buffer = RingBuffer::new(capacity);
            for v in &values {
                buffer.push(*v);
            }

            let expected: Vec<i32> = values.iter().rev().take(capacity).rev().cloned().collect();
            prop_assert_eq!(buffer.len(), expected.len());
            prop_assert_eq!(buffer.to_vec(), expected);
        }
    }
}
