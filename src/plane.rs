//! Contains the GridPlane struct, which describes the relationship
//! between a square integral grid with an origin at 0,0 and a square
//! window on the complex plane with an arbitrary pair of corners
//! defining the leftlower and rightupper corners of the window.  The
//! grid driver samples the window by asking for the complex number
//! that sits under each cell.

use num::Complex;

use error::Error;

/// Left-lower corner of the classical window.  The whole Mandelbrot
/// set lives inside the circle of radius 2, so corners at (-2,-2) and
/// (2,2) cover it entirely.
pub const CLASSIC_LEFTLOWER: Complex<f64> = Complex { re: -2.0, im: -2.0 };

/// Right-upper corner of the classical window.
pub const CLASSIC_RIGHTUPPER: Complex<f64> = Complex { re: 2.0, im: 2.0 };

/// Describes the x, y of a cell in the grid.  The first coordinate
/// walks the real axis, the second the imaginary one.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Pixel(pub usize, pub usize);

/// A square sampling window on the complex plane together with the
/// resolution of the integral grid laid over it.  Immutable once
/// built; the per-axis deltas are derived at construction and every
/// later question is answered from them.
#[derive(Copy, Clone, Debug)]
pub struct GridPlane {
    /// The left-lower corner of the window.
    pub leftlower: Complex<f64>,
    /// The right-upper corner of the window.
    pub rightupper: Complex<f64>,
    /// The number of samples along each axis.
    pub resolution: usize,
    // Window span divided by resolution, per axis.
    deltas: (f64, f64),
}

impl GridPlane {
    /// A grid over the classical window.
    pub fn new(resolution: usize) -> Result<GridPlane, Error> {
        GridPlane::with_corners(resolution, CLASSIC_LEFTLOWER, CLASSIC_RIGHTUPPER)
    }

    /// A grid over an arbitrary window.  The resolution must be
    /// positive and the corners must actually be the left-lower and
    /// right-upper ones.
    pub fn with_corners(
        resolution: usize,
        leftlower: Complex<f64>,
        rightupper: Complex<f64>,
    ) -> Result<GridPlane, Error> {
        if resolution == 0 {
            return Err(Error::invalid_argument("resolution must be at least 1"));
        }
        if rightupper.re < leftlower.re {
            return Err(Error::invalid_argument(
                "the left lower corner is not to the left of the right upper corner",
            ));
        }
        if rightupper.im < leftlower.im {
            return Err(Error::invalid_argument(
                "the left lower corner is not lower than the right upper corner",
            ));
        }

        let deltas = (
            (rightupper.re - leftlower.re) / (resolution as f64),
            (rightupper.im - leftlower.im) / (resolution as f64),
        );

        Ok(GridPlane {
            leftlower,
            rightupper,
            resolution,
            deltas,
        })
    }

    /// The total number of cells in the grid.  Used to size result
    /// buffers.
    pub fn len(&self) -> usize {
        self.resolution * self.resolution
    }

    /// Describes that the grid is of a size.
    pub fn is_empty(&self) -> bool {
        self.resolution == 0
    }

    /// Given a cell of the integral grid, return the complex number
    /// sitting at the equivalent location inside the window.
    pub fn pixel_to_point(&self, pixel: &Pixel) -> Result<Complex<f64>, Error> {
        if pixel.0 >= self.resolution || pixel.1 >= self.resolution {
            return Err(Error::invalid_argument(format!(
                "pixel ({}, {}) lies outside a {}x{} grid",
                pixel.0, pixel.1, self.resolution, self.resolution
            )));
        }
        Ok(self.point(pixel.0, pixel.1))
    }

    // Unchecked transform for loop indices the grid driver generates
    // itself.
    pub(crate) fn point(&self, i: usize, j: usize) -> Complex<f64> {
        Complex {
            re: self.leftlower.re + (i as f64) * self.deltas.0,
            im: self.leftlower.im + (j as f64) * self.deltas.1,
        }
    }
}
