//! Reusable observers for multistep solvers.
//!
//! This crate provides [`Observer`] implementations and capability traits that
//! work across the Newton solver and the time-stepping controllers.
//!
//! # Modules
//!
//! - [`traits`] — Capability traits for cross-solver observers
//!   ([`HasResidual`], [`HasTime`], [`CanStopEarly`])
//! - [`recorder`] — [`Recorder`] and [`Probe`] for reading trajectories out of
//!   transient events
//!
//! # Features
//!
//! - `plot` — Enables [`PlotObserver`] for visualizing trajectories via egui.
//!   This feature adds dependencies on `eframe` and `egui_plot`.
//!
//! [`Observer`]: multistep_core::Observer
//! [`HasResidual`]: traits::HasResidual
//! [`HasTime`]: traits::HasTime
//! [`CanStopEarly`]: traits::CanStopEarly

pub mod recorder;
pub mod traits;

#[cfg(feature = "plot")]
mod plot;

pub use recorder::{Partition, Probe, Recorder};

#[cfg(feature = "plot")]
pub use plot::{PlotObserver, ShowConfig};
