//! Numerical helpers shared by the table loaders

pub mod interp;

pub use interp::{InterpError, LinearTable};
