//! Transfer-matrix optics for planar thin-film stacks
//!
//! Computes the internal optical field, the absorption in each layer and the
//! short-circuit current density of a photovoltaic stack under normal
//! incidence, optionally sweeping the thickness of one layer.
//!
//! The pipeline, leaves first:
//!
//! - [`optics`] builds interface/propagation matrices, solves the coherent
//!   stack and reconstructs the field inside each layer
//! - [`device`] discretises the device cross-section
//! - [`photocurrent`] turns field intensity into exciton generation and Jsc
//! - [`simulation`] runs one full pass for a fixed stack
//! - [`sweep`] repeats the pass for every thickness of the varied layer

pub mod algo;
pub mod config;
pub mod device;
pub mod error;
pub mod grid;
pub mod materials;
pub mod optics;
pub mod photocurrent;
pub mod simulation;
pub mod sweep;
pub mod units;

pub use config::DeviceConfig;
pub use device::{CrossSection, Layer, Stack};
pub use error::TmmError;
pub use grid::{SweepRange, WavelengthGrid};
pub use materials::{MaterialLibrary, OpticalConstants};
pub use simulation::{DeviceSimulation, Singularity};
pub use sweep::{CancelToken, SweepPoint, SweepResult, ThicknessSweep};
