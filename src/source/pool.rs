//! Reusable decode buffers
//!
//! The async path decodes every line into a rented `String`. Buffers go back
//! to the pool when the rented handle is dropped, so steady-state decoding
//! allocates only when a line outgrows every pooled buffer.

use std::fmt;
use std::ops::{Deref, DerefMut};

use crossbeam_channel::{Receiver, Sender, bounded};

use crate::constants::DECODE_POOL_CAPACITY;

/// Bounded pool of scratch `String`s
#[derive(Clone)]
pub struct DecodeBufferPool {
    sender: Sender<String>,
    receiver: Receiver<String>,
}

impl DecodeBufferPool {
    /// Pool that retains at most `capacity` idle buffers
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = bounded(capacity.max(1));
        Self { sender, receiver }
    }

    /// Rent an empty buffer with room for at least `min_capacity` bytes
    pub fn rent(&self, min_capacity: usize) -> PooledBuffer {
        let mut buffer = self.receiver.try_recv().unwrap_or_default();
        buffer.reserve(min_capacity);
        PooledBuffer {
            buffer,
            home: self.sender.clone(),
        }
    }

    /// Idle buffers currently held
    pub fn available(&self) -> usize {
        self.receiver.len()
    }
}

impl Default for DecodeBufferPool {
    fn default() -> Self {
        Self::new(DECODE_POOL_CAPACITY)
    }
}

impl fmt::Debug for DecodeBufferPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecodeBufferPool")
            .field("available", &self.available())
            .finish()
    }
}

/// Rented buffer, released to its pool on drop
pub struct PooledBuffer {
    buffer: String,
    home: Sender<String>,
}

impl PooledBuffer {
    pub fn as_str(&self) -> &str {
        &self.buffer
    }
}

impl Deref for PooledBuffer {
    type Target = String;

    fn deref(&self) -> &String {
        &self.buffer
    }
}

impl DerefMut for PooledBuffer {
    fn deref_mut(&mut self) -> &mut String {
        &mut self.buffer
    }
}

impl fmt::Debug for PooledBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.buffer, f)
    }
}

impl Drop for PooledBuffer {
    fn drop(&mut self) {
        let mut buffer = std::mem::take(&mut self.buffer);
        buffer.clear();
        // A full pool drops the buffer
        let _ = self.home.try_send(buffer);
    }
}
