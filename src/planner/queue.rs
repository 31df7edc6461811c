//! Block queue between the planner and the step interrupt.

use heapless::spsc::{Consumer, Producer, Queue};

use crate::error::{Error, MotionError, Result};

use super::block::MixBlock;

/// Fixed-capacity block queue holding up to `N - 1` blocks.
pub struct BlockQueue<const N: usize> {
    queue: Queue<MixBlock, N>,
}

impl<const N: usize> Default for BlockQueue<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> BlockQueue<N> {
    /// Create an empty queue.
    pub const fn new() -> Self {
        Self {
            queue: Queue::new(),
        }
    }

    /// Split into the planner's and the interrupt's ends.
    pub fn split(&mut self) -> (BlockProducer<'_, N>, BlockConsumer<'_, N>) {
        let (producer, consumer) = self.queue.split();
        (
            BlockProducer { inner: producer },
            BlockConsumer { inner: consumer },
        )
    }
}

/// Planner end of a [`BlockQueue`].
pub struct BlockProducer<'a, const N: usize> {
    inner: Producer<'a, MixBlock, N>,
}

impl<const N: usize> BlockProducer<'_, N> {
    /// Queue a block.
    ///
    /// # Errors
    ///
    /// Returns `MotionError::QueueFull` if there is no room.
    pub fn push(&mut self, block: MixBlock) -> Result<()> {
        self.inner
            .enqueue(block)
            .map_err(|_| Error::Motion(MotionError::QueueFull))
    }

    /// True if the next push would fail.
    #[inline]
    pub fn is_full(&self) -> bool {
        !self.inner.ready()
    }

    /// Blocks waiting.
    #[inline]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// True if no block is waiting.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.len() == 0
    }
}

/// Step-interrupt end of a [`BlockQueue`].
pub struct BlockConsumer<'a, const N: usize> {
    inner: Consumer<'a, MixBlock, N>,
}

impl<const N: usize> BlockConsumer<'_, N> {
    /// Take the oldest block.
    #[inline]
    pub fn pop(&mut self) -> Option<MixBlock> {
        self.inner.dequeue()
    }

    /// Look at the oldest block without taking it.
    #[inline]
    pub fn peek(&self) -> Option<&MixBlock> {
        self.inner.peek()
    }

    /// Blocks waiting.
    #[inline]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// True if no block is waiting.
    #[inline]
    pub fn is_empty(&self) -> bool {
        !self.inner.ready()
    }
}
