#![deny(unused_must_use)]
#![warn(clippy::dbg_macro, clippy::todo, clippy::unimplemented)]
#![forbid(unsafe_code)]

mod emit;
mod error;
mod scope;

pub use emit::{emit, emit_to};
pub use error::EmitError;
pub use scope::{Binding, Scope};
