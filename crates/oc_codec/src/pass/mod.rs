//! Per-pass state.
//!
//! Every top-level [`Codec`](crate::Codec) call creates a fresh context
//! that lives exactly as long as the call: [`WriteContext`],
//! [`ReadContext`] or [`CopyContext`]. Contexts own the object identity
//! table of the pass and, for write and read, its generics scope stack.
//! Nothing leaks from one call into the next.

// -----------------------------------------------------------------------------
// Modules

mod copy;
mod read;
mod write;

// -----------------------------------------------------------------------------
// Exports

pub use copy::CopyContext;
pub use read::ReadContext;
pub use write::WriteContext;
