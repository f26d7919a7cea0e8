// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The grid driver.  Walks every cell of a [`GridPlane`], runs the
//! chosen escape evaluator on the complex number under it, and
//! assembles the counts into an [`EscapeGrid`].
//!
//! Rows are the unit of parallel work: the matrix is split into one
//! disjoint mutable slice per row and the rows are handed out to the
//! workers through a shared queue.  Each cell has exactly one writer
//! and no readers until the join, so the buffer itself needs no
//! locking, and the output cannot depend on worker count or
//! scheduling order.

extern crate crossbeam;
extern crate num_cpus;

use std::sync::{Arc, Mutex};

use itertools::iproduct;

use error::Error;
use escape::Variant;
use plane::GridPlane;

/// A resolution × resolution matrix of escape counts, row-major by
/// the real-axis index: cell (i, j) holds the count for the point
/// with the i-th real and j-th imaginary coordinate.  Each
/// computation allocates, fills, and hands over a fresh one; nothing
/// is cached between calls.
#[derive(Clone, Debug, PartialEq)]
pub struct EscapeGrid {
    resolution: usize,
    cells: Vec<u32>,
}

impl EscapeGrid {
    fn new(resolution: usize) -> EscapeGrid {
        EscapeGrid {
            resolution,
            cells: vec![0 as u32; resolution * resolution],
        }
    }

    /// The number of samples along each axis.
    pub fn resolution(&self) -> usize {
        self.resolution
    }

    /// The total number of cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Describes that the matrix is of a size.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// The count at cell (i, j), or None outside the grid.
    pub fn get(&self, i: usize, j: usize) -> Option<u32> {
        if i >= self.resolution || j >= self.resolution {
            return None;
        }
        Some(self.cells[i * self.resolution + j])
    }

    /// The raw cells, row-major by the real-axis index.
    pub fn cells(&self) -> &[u32] {
        &self.cells
    }

    /// The rows of the matrix, in real-axis order.
    pub fn rows(&self) -> ::std::slice::Chunks<u32> {
        self.cells.chunks(self.resolution)
    }
}

impl ::std::ops::Index<(usize, usize)> for EscapeGrid {
    type Output = u32;

    fn index(&self, (i, j): (usize, usize)) -> &u32 {
        &self.cells[i * self.resolution + j]
    }
}

/// Drives an escape evaluator over every cell of a grid plane.
/// Construction validates the inputs once; computations may then be
/// repeated freely, each returning an independently owned matrix.
#[derive(Clone, Debug)]
pub struct GridComputer {
    plane: GridPlane,
    max_iterations: u32,
    variant: Variant,
}

impl GridComputer {
    /// Requires a validated plane, a positive iteration budget, and
    /// the arithmetic variant to run.
    pub fn new(
        plane: GridPlane,
        max_iterations: u32,
        variant: Variant,
    ) -> Result<GridComputer, Error> {
        if max_iterations == 0 {
            return Err(Error::invalid_argument(
                "iteration budget must be at least 1",
            ));
        }
        Ok(GridComputer {
            plane,
            max_iterations,
            variant,
        })
    }

    /// The single-threaded reference computation.
    pub fn compute_single(&self) -> EscapeGrid {
        let resolution = self.plane.resolution;
        info!(
            "computing {}x{} grid, {:?} variant, single-threaded",
            resolution, resolution, self.variant
        );
        let mut grid = EscapeGrid::new(resolution);
        for (i, j) in iproduct!(0..resolution, 0..resolution) {
            let c = self.plane.point(i, j);
            grid.cells[i * resolution + j] = self.variant.count(c, self.max_iterations);
        }
        grid
    }

    /// The multi-threaded computation.  Guaranteed to produce the
    /// same matrix as [`GridComputer::compute_single`] for the same
    /// inputs, whatever the worker count.
    pub fn compute_threaded(&self, threads: usize) -> Result<EscapeGrid, Error> {
        if threads == 0 {
            return Err(Error::invalid_argument("worker count must be at least 1"));
        }
        Ok(self.compute_with(threads))
    }

    /// Convenience wrapper that uses every available CPU.
    pub fn compute(&self) -> EscapeGrid {
        self.compute_with(num_cpus::get())
    }

    // One row: a fixed real-axis index against every imaginary-axis
    // index.
    fn fill_row(&self, i: usize, row: &mut [u32]) {
        for j in 0..row.len() {
            let c = self.plane.point(i, j);
            row[j] = self.variant.count(c, self.max_iterations);
        }
    }

    fn compute_with(&self, threads: usize) -> EscapeGrid {
        let resolution = self.plane.resolution;
        info!(
            "computing {}x{} grid, {:?} variant, {} workers",
            resolution, resolution, self.variant, threads
        );
        let mut grid = EscapeGrid::new(resolution);
        {
            let rows: Vec<(usize, &mut [u32])> =
                grid.cells.chunks_mut(resolution).enumerate().collect();
            let rows = Arc::new(Mutex::new(rows.into_iter()));
            crossbeam::scope(|spawner| {
                for worker in 0..threads {
                    let rows = rows.clone();
                    spawner.spawn(move |_| {
                        debug!("worker {} started", worker);
                        loop {
                            let row = { rows.lock().unwrap().next() };
                            match row {
                                Some((i, row)) => self.fill_row(i, row),
                                None => {
                                    break;
                                }
                            }
                        }
                    });
                }
            })
            .unwrap();
        }
        grid
    }
}

/// The external entry point: the escape matrix for the classical
/// window at the given resolution, computed across every available
/// CPU.
pub fn compute(
    resolution: usize,
    max_iterations: u32,
    variant: Variant,
) -> Result<EscapeGrid, Error> {
    let plane = GridPlane::new(resolution)?;
    let computer = GridComputer::new(plane, max_iterations, variant)?;
    Ok(computer.compute())
}

#[cfg(test)]
mod tests {
    use super::*;
    use escape::escape_count;
    use plane::Pixel;

    fn computer(resolution: usize, budget: u32, variant: Variant) -> GridComputer {
        GridComputer::new(GridPlane::new(resolution).unwrap(), budget, variant).unwrap()
    }

    #[test]
    fn matrix_has_the_expected_shape_and_range() {
        for &variant in &Variant::all() {
            let grid = computer(16, 32, variant).compute_single();
            assert_eq!(grid.resolution(), 16);
            assert_eq!(grid.len(), 256);
            assert!(grid.cells().iter().all(|&cell| cell <= 32));
        }
    }

    #[test]
    fn single_and_threaded_agree() {
        for &variant in &Variant::all() {
            let computer = computer(24, 64, variant);
            let serial = computer.compute_single();
            assert_eq!(serial, computer.compute_threaded(1).unwrap());
            assert_eq!(serial, computer.compute_threaded(4).unwrap());
            assert_eq!(serial, computer.compute());
        }
    }

    #[test]
    fn worker_count_never_changes_a_cell() {
        // An odd resolution so the rows never divide evenly among the
        // workers.
        let computer = computer(17, 50, Variant::Optimized);
        let reference = computer.compute_threaded(1).unwrap();
        for &threads in &[2, 3, 8] {
            assert_eq!(reference, computer.compute_threaded(threads).unwrap());
        }
    }

    #[test]
    fn single_cell_grid_matches_direct_evaluation() {
        let plane = GridPlane::new(1).unwrap();
        let c = plane.pixel_to_point(&Pixel(0, 0)).unwrap();
        for &variant in &Variant::all() {
            let grid = GridComputer::new(plane, 20, variant).unwrap().compute();
            assert_eq!(grid[(0, 0)], escape_count(c, 20, variant).unwrap());
        }
    }

    #[test]
    fn interior_cell_exhausts_the_budget() {
        // On a 4x4 classical grid, cell (1, 2) sits at -1 + 0i, a
        // point of the set.
        for &variant in &Variant::all() {
            let grid = computer(4, 25, variant).compute_single();
            assert_eq!(grid[(1, 2)], 25);
        }
    }

    #[test]
    fn get_and_index_agree() {
        let grid = computer(8, 10, Variant::Complex).compute_single();
        assert_eq!(grid.get(3, 5), Some(grid[(3, 5)]));
        assert_eq!(grid.get(8, 0), None);
        assert_eq!(grid.get(0, 8), None);
    }

    #[test]
    fn rows_iterate_in_real_axis_order() {
        let grid = computer(5, 10, Variant::Naive).compute_single();
        let rows: Vec<&[u32]> = grid.rows().collect();
        assert_eq!(rows.len(), 5);
        assert_eq!(rows[2], &grid.cells()[10..15]);
    }

    #[test]
    fn zero_workers_are_rejected() {
        assert!(computer(4, 10, Variant::Naive).compute_threaded(0).is_err());
    }

    #[test]
    fn zero_budget_is_rejected() {
        let plane = GridPlane::new(4).unwrap();
        assert!(GridComputer::new(plane, 0, Variant::Complex).is_err());
    }

    #[test]
    fn zero_resolution_is_rejected() {
        assert!(compute(0, 10, Variant::Complex).is_err());
    }

    #[test]
    fn entry_point_covers_the_classical_window() {
        let grid = compute(8, 12, Variant::Complex).unwrap();
        assert_eq!(grid.len(), 64);
        // The corner at (-2, -2) escapes without a single accepted
        // step.
        assert_eq!(grid[(0, 0)], 0);
    }
}
