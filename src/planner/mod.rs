//! Planner side of the block queue.
//!
//! The foreground loop turns extruder moves into [`MixBlock`]s, each carrying a
//! copy of the row it was planned with, and hands them to the step interrupt
//! through a single-producer/single-consumer [`BlockQueue`].

mod block;
mod queue;

pub use block::{plan_move, MixBlock, ZPosition};
pub use queue::{BlockConsumer, BlockProducer, BlockQueue};
