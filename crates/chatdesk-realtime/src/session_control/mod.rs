//! Administrator-initiated session termination.

pub mod terminator;

pub use terminator::SessionControl;
