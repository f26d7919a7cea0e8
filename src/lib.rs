#![deny(missing_docs)]
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Mandelbrot escape-time grid generator
//!
//! The Mandelbrot set is the set of complex numbers `c` for which the
//! recurrence z' = z² + c, started from zero, stays bounded forever.
//! Membership is approximated by iterating the recurrence up to a
//! budget and counting how many steps a point survives before its
//! magnitude leaves the escape radius of 2.  That count is the only
//! thing a renderer needs: low counts escape quickly and sit far from
//! the set, high counts hug its border, and points that exhaust the
//! budget are taken to be members.
//!
//! This crate computes those counts for every cell of a square grid
//! sampled from a window on the complex plane.  Three arithmetic
//! strategies are provided behind the single [`Variant`] tag: one
//! iterates `Complex<f64>` values directly and two decompose the
//! recurrence into real arithmetic.  Their behavioral differences are
//! deliberate and documented in the [`escape`] module; do not expect
//! them to agree exactly at the border of the set.
//!
//! Grids can be computed serially or across a pool of worker threads.
//! The two paths are guaranteed to produce bit-identical matrices,
//! since every cell is an independent function of its coordinate.

extern crate crossbeam;
#[macro_use]
extern crate failure;
extern crate itertools;
#[macro_use]
extern crate log;
extern crate num;
extern crate num_cpus;

pub mod error;
pub mod escape;
pub mod grid;
pub mod plane;
pub mod trajectory;

pub use error::Error;
pub use escape::{escape_count, Variant, ESCAPE_RADIUS};
pub use grid::{compute, EscapeGrid, GridComputer};
pub use plane::{GridPlane, Pixel};
pub use trajectory::{record_trajectory, Trajectory, TrajectoryStep};
