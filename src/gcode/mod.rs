//! Mixing commands from G-code lines.
//!
//! Supports `M163` (set a collector weight), `M164` (store the collector in a
//! tool), `M165` (set the whole mix of the selected tool), `M166` (configure
//! the Z gradient) and `T<n>` (select a virtual tool).

mod handler;
mod parser;

pub use handler::{execute, process_line, Report};
pub use parser::{parse_command, parse_words, MixCommand, Word, MAX_WORDS, MIX_LETTERS};
