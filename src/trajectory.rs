//! Records the full orbit of a single point instead of collapsing it
//! to a count.  This is the inspection path: it shows how an
//! individual point wanders before settling or escaping.  Bulk grid
//! computation never goes through here.

use num::Complex;

use error::Error;
use escape::{round10, ESCAPE_RADIUS};

/// One recorded step of an orbit: the value of z after the step and
/// its magnitude at that moment.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TrajectoryStep {
    /// The value of z after the step.
    pub z: Complex<f64>,
    /// The magnitude of that value.
    pub magnitude: f64,
}

/// The ordered orbit of one point, starting with the initial z = 0
/// entry and ending either with the first escaping value or when the
/// iteration budget runs out.  Never longer than the budget plus one.
#[derive(Clone, Debug, PartialEq)]
pub struct Trajectory {
    /// The recorded steps, oldest first.
    pub steps: Vec<TrajectoryStep>,
}

impl Trajectory {
    /// The number of recorded steps, the initial value included.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// A recorded trajectory always holds at least the initial value.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// True when the last recorded step left the escape radius.
    pub fn escaped(&self) -> bool {
        match self.steps.last() {
            Some(step) => !(step.magnitude <= ESCAPE_RADIUS),
            None => false,
        }
    }
}

/// Runs the recurrence for `c`, recording every intermediate value.
/// Uses the same step order and rounding policy as the
/// complex-arithmetic variant, so the number of non-escaping entries
/// here lines up with that variant's escape count.
pub fn record_trajectory(c: Complex<f64>, max_iterations: u32) -> Result<Trajectory, Error> {
    if max_iterations == 0 {
        return Err(Error::invalid_argument(
            "iteration budget must be at least 1",
        ));
    }

    let mut steps = Vec::with_capacity(max_iterations as usize + 1);
    let mut z: Complex<f64> = Complex { re: 0.0, im: 0.0 };
    steps.push(TrajectoryStep {
        z,
        magnitude: z.norm(),
    });

    let mut iterations = 0;
    while iterations < max_iterations {
        let stepped = z * z + c;
        let stepped = Complex {
            re: round10(stepped.re),
            im: round10(stepped.im),
        };
        let magnitude = stepped.norm();
        steps.push(TrajectoryStep {
            z: stepped,
            magnitude,
        });
        if !(magnitude <= ESCAPE_RADIUS) {
            break;
        }
        z = stepped;
        iterations += 1;
    }

    Ok(Trajectory { steps })
}

#[cfg(test)]
mod tests {
    use super::*;
    use escape::{escape_count, Variant};

    #[test]
    fn origin_fills_the_whole_budget() {
        let trajectory = record_trajectory(Complex::new(0.0, 0.0), 8).unwrap();
        assert_eq!(trajectory.len(), 9);
        assert!(!trajectory.escaped());
        for step in &trajectory.steps {
            assert!(step.magnitude <= ESCAPE_RADIUS);
        }
    }

    #[test]
    fn escaping_point_stops_at_the_escaping_step() {
        // The orbit of c = 1 is 0, 1, 2, 5; the final entry is the
        // escaping one.
        let trajectory = record_trajectory(Complex::new(1.0, 0.0), 5).unwrap();
        assert_eq!(trajectory.len(), 4);
        assert!(trajectory.escaped());

        let magnitudes: Vec<f64> = trajectory.steps.iter().map(|s| s.magnitude).collect();
        assert_eq!(magnitudes, vec![0.0, 1.0, 2.0, 5.0]);
        assert!(*magnitudes.last().unwrap() > ESCAPE_RADIUS);
        assert!(trajectory.len() < 6);
    }

    #[test]
    fn length_lines_up_with_the_complex_variant() {
        for &(re, im) in &[(1.0, 0.0), (0.3, 0.6), (-0.8, 0.4), (2.0, 2.0)] {
            let c = Complex::new(re, im);
            let budget = 40;
            let count = escape_count(c, budget, Variant::Complex).unwrap();
            let trajectory = record_trajectory(c, budget).unwrap();
            if trajectory.escaped() {
                // Initial entry, the accepted steps, and the escaping
                // step.
                assert_eq!(trajectory.len() as u32, count + 2);
            } else {
                assert_eq!(trajectory.len() as u32, budget + 1);
            }
        }
    }

    #[test]
    fn zero_budget_is_rejected() {
        assert!(record_trajectory(Complex::new(0.0, 0.0), 0).is_err());
    }
}
