//! Dynamic instances of registered classes.

// -----------------------------------------------------------------------------
// Modules

mod graph_eq;
mod object;
mod value;

// -----------------------------------------------------------------------------
// Exports

pub use graph_eq::graph_eq;
pub use object::{Object, ObjectRef};
pub use value::Value;
