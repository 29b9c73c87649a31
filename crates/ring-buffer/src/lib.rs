//! Fixed-Capacity Ring Buffer
//!
//! Provides the bounded, overwrite-oldest buffer used for every rolling
//! window in the fusion core (distance histories, context sample windows).

mod buffer;

pub use buffer::RingBuffer;
