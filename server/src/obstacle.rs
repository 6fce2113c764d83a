//! Oriented-rectangle obstacle geometry
//!
//! Obstacles are static: the rotated vertices and the line equation of every
//! edge are computed once at construction and reused unchanged for each
//! containment query. Containment compares per-edge slope/intercept values
//! rather than half-plane dot products; the rotation sign selects between
//! two mirrored inequality sets that are not interchangeable, so the branch
//! is tagged once at construction.

use crate::entity::Bullet;
use shared::ObstacleSnapshot;

/// Number of sampled future bullet positions checked by the swept test.
const SWEEP_SAMPLES: u32 = 10;
/// Seconds of bullet travel between consecutive sweep samples.
const SWEEP_SAMPLE_DT: f64 = 0.00015;

/// Rejected obstacle construction parameters
///
/// Degenerate geometry would silently produce wrong containment results
/// downstream, so it is refused up front.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    #[error("obstacle rotation {0} degrees outside supported range (-90, 90]")]
    AngleOutOfRange(f64),
    #[error("obstacle dimensions must be positive and finite, got {width}x{height}")]
    DegenerateDimensions { width: f64, height: f64 },
    #[error("obstacle origin must be finite, got ({x}, {y})")]
    NonFiniteOrigin { x: f64, y: f64 },
}

/// Which mirrored inequality set a containment query applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Orientation {
    /// Rotation angle > 0.
    Positive,
    /// Rotation angle <= 0.
    NonPositive,
}

/// The infinite line containing one rectangle edge, as slope plus the two
/// intercepts every containment query compares against.
#[derive(Debug, Clone, Copy)]
struct Edge {
    slope: f64,
    x_intercept: f64,
    y_intercept: f64,
}

fn intercept(x: f64, y: f64, slope: f64) -> f64 {
    y - x * slope
}

impl Edge {
    fn through(x1: f64, y1: f64, x2: f64, y2: f64) -> Edge {
        let slope = (y2 - y1) / (x2 - x1);
        Edge {
            slope,
            x_intercept: intercept(y1, x1, 1.0 / slope),
            y_intercept: intercept(x1, y1, slope),
        }
    }

    /// Intercepts of the line parallel to this edge passing through (x, y).
    fn intercepts_at(&self, x: f64, y: f64) -> (f64, f64) {
        (intercept(y, x, 1.0 / self.slope), intercept(x, y, self.slope))
    }
}

/// A static rotated rectangle on the playfield.
///
/// The origin is the top-left vertex; `width` runs along the rotated top
/// edge and `height` down the rotated left edge.
#[derive(Debug, Clone)]
pub struct Obstacle {
    x: f64,
    y: f64,
    direction: f64,
    width: f64,
    height: f64,
    orientation: Orientation,
    top: Edge,
    bottom: Edge,
    left: Edge,
    right: Edge,
}

impl Obstacle {
    /// Builds the static edge equations for a rectangle rotated by
    /// `angle_degrees` in (-90, 90].
    pub fn new(
        x: f64,
        y: f64,
        angle_degrees: f64,
        width: f64,
        height: f64,
    ) -> Result<Obstacle, GeometryError> {
        if !x.is_finite() || !y.is_finite() {
            return Err(GeometryError::NonFiniteOrigin { x, y });
        }
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(GeometryError::DegenerateDimensions { width, height });
        }
        // The mirrored inequality branches are only valid within this range.
        if !angle_degrees.is_finite() || angle_degrees <= -90.0 || angle_degrees > 90.0 {
            return Err(GeometryError::AngleOutOfRange(angle_degrees));
        }

        let direction = angle_degrees.to_radians();
        let normal = direction + std::f64::consts::FRAC_PI_2;

        let top_opp_x = width * direction.cos() + x;
        let top_opp_y = width * direction.sin() + y;
        let bottom_x = height * normal.cos() + x;
        let bottom_y = height * normal.sin() + y;
        let bottom_opp_x = top_opp_x + height * normal.cos();
        let bottom_opp_y = top_opp_y + height * normal.sin();

        let orientation = if direction > 0.0 {
            Orientation::Positive
        } else {
            Orientation::NonPositive
        };

        Ok(Obstacle {
            x,
            y,
            direction,
            width,
            height,
            orientation,
            top: Edge::through(x, y, top_opp_x, top_opp_y),
            bottom: Edge::through(bottom_x, bottom_y, bottom_opp_x, bottom_opp_y),
            left: Edge::through(x, y, bottom_x, bottom_y),
            right: Edge::through(top_opp_x, top_opp_y, bottom_opp_x, bottom_opp_y),
        })
    }

    /// Tests a single point against the four precomputed edges.
    ///
    /// A point counts as inside iff all four edge tests pass. Axis-aligned
    /// rectangles produce zero slopes whose reciprocal intercepts are
    /// infinite; the disjunctions below still resolve through the finite
    /// comparison, so they are not special-cased.
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        self.passes_edge_tests(x, y)
    }

    /// Swept containment test for a moving bullet.
    ///
    /// Evaluates the point test at `SWEEP_SAMPLES` discrete future positions
    /// spaced `SWEEP_SAMPLE_DT` seconds of bullet velocity apart, starting at
    /// the current position. A fast bullet can cross an edge between samples
    /// without being flagged; that discrete sampling (and its tunneling) is
    /// part of the gameplay contract, not a tunable detail.
    pub fn contains(&self, bullet: &Bullet) -> bool {
        for sample in 0..SWEEP_SAMPLES {
            let t = f64::from(sample) * SWEEP_SAMPLE_DT;
            let x = bullet.body.x + t * bullet.body.speed * bullet.body.direction.sin();
            let y = bullet.body.y - t * bullet.body.speed * bullet.body.direction.cos();
            if self.passes_edge_tests(x, y) {
                return true;
            }
        }
        false
    }

    fn passes_edge_tests(&self, x: f64, y: f64) -> bool {
        let (top_x, top_y) = self.top.intercepts_at(x, y);
        let (bottom_x, bottom_y) = self.bottom.intercepts_at(x, y);
        let (left_x, left_y) = self.left.intercepts_at(x, y);
        let (right_x, right_y) = self.right.intercepts_at(x, y);

        match self.orientation {
            Orientation::Positive => {
                (top_y > self.top.y_intercept || top_x < self.top.x_intercept)
                    && (bottom_y < self.bottom.y_intercept || bottom_x > self.bottom.x_intercept)
                    && (left_y > self.left.y_intercept || left_x > self.left.x_intercept)
                    && (right_y < self.right.y_intercept || right_x < self.right.x_intercept)
            }
            Orientation::NonPositive => {
                (top_y > self.top.y_intercept || top_x > self.top.x_intercept)
                    && (bottom_y < self.bottom.y_intercept || bottom_x < self.bottom.x_intercept)
                    && (left_y < self.left.y_intercept || left_x > self.left.x_intercept)
                    && (right_y > self.right.y_intercept || right_x < self.right.x_intercept)
            }
        }
    }

    pub fn snapshot(&self) -> ObstacleSnapshot {
        ObstacleSnapshot {
            x: self.x,
            y: self.y,
            direction: self.direction,
            width: self.width,
            height: self.height,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn test_axis_aligned_containment() {
        // Occupies roughly x in [100, 400], y in [100, 125].
        let obstacle = Obstacle::new(100.0, 100.0, 0.0, 300.0, 25.0).unwrap();

        assert!(obstacle.contains_point(250.0, 110.0));
        assert!(!obstacle.contains_point(250.0, 200.0));
    }

    #[test]
    fn test_axis_aligned_exterior_sides() {
        let obstacle = Obstacle::new(100.0, 100.0, 0.0, 300.0, 25.0).unwrap();

        assert!(!obstacle.contains_point(50.0, 110.0));
        assert!(!obstacle.contains_point(450.0, 110.0));
        assert!(!obstacle.contains_point(250.0, 50.0));
    }

    #[test]
    fn test_positive_rotation_containment() {
        // 30 degree tilt; the rectangle's center sits away from the
        // unrotated footprint.
        let obstacle = Obstacle::new(100.0, 500.0, 30.0, 300.0, 25.0).unwrap();

        // Average of the four rotated vertices.
        let center_x = (100.0 + 359.8 + 87.5 + 347.3) / 4.0;
        let center_y = (500.0 + 650.0 + 521.7 + 671.7) / 4.0;
        assert!(obstacle.contains_point(center_x, center_y));

        // Directly above the origin, outside the tilted footprint.
        assert!(!obstacle.contains_point(center_x, 400.0));
    }

    #[test]
    fn test_negative_rotation_containment() {
        let obstacle = Obstacle::new(100.0, 500.0, -10.0, 300.0, 50.0).unwrap();

        // Interior point near the rectangle center.
        assert!(obstacle.contains_point(252.0, 498.5));
        assert!(!obstacle.contains_point(252.0, 300.0));
        assert!(!obstacle.contains_point(600.0, 498.5));
    }

    #[test]
    fn test_containment_is_deterministic() {
        let obstacle = Obstacle::new(100.0, 500.0, 30.0, 300.0, 25.0).unwrap();

        let first = obstacle.contains_point(223.6, 585.8);
        for _ in 0..10 {
            assert_eq!(obstacle.contains_point(223.6, 585.8), first);
        }
    }

    #[test]
    fn test_swept_containment_catches_approaching_bullet() {
        let obstacle = Obstacle::new(100.0, 100.0, 0.0, 300.0, 25.0).unwrap();

        // Heading PI points down (+y); the sweep advances up to
        // 9 * 0.00015 * 800 = 1.08 px beyond the current position.
        let approaching = Bullet::new(1, 1, 250.0, 99.5, std::f64::consts::PI);
        assert!(!obstacle.contains_point(250.0, 99.5));
        assert!(obstacle.contains(&approaching));

        // Same spot, heading away: no sample ever enters.
        let leaving = Bullet::new(2, 1, 250.0, 99.5, 0.0);
        assert!(!obstacle.contains(&leaving));
    }

    #[test]
    fn test_swept_containment_outside_sample_reach() {
        let obstacle = Obstacle::new(100.0, 100.0, 0.0, 300.0, 25.0).unwrap();

        // 2 px away but the sweep only reaches 1.08 px: a preserved
        // tunneling-style miss.
        let bullet = Bullet::new(1, 1, 250.0, 98.0, std::f64::consts::PI);
        assert!(!obstacle.contains(&bullet));
    }

    #[test]
    fn test_swept_containment_inside_bullet() {
        let obstacle = Obstacle::new(100.0, 100.0, 0.0, 300.0, 25.0).unwrap();

        let bullet = Bullet::new(1, 1, 250.0, 110.0, 0.0);
        assert!(obstacle.contains(&bullet));
    }

    #[test]
    fn test_rejects_angle_out_of_range() {
        assert_eq!(
            Obstacle::new(0.0, 0.0, 120.0, 10.0, 10.0).unwrap_err(),
            GeometryError::AngleOutOfRange(120.0)
        );
        assert_eq!(
            Obstacle::new(0.0, 0.0, -90.0, 10.0, 10.0).unwrap_err(),
            GeometryError::AngleOutOfRange(-90.0)
        );
        assert!(Obstacle::new(0.0, 0.0, 90.0, 10.0, 10.0).is_ok());
    }

    #[test]
    fn test_rejects_degenerate_dimensions() {
        assert!(matches!(
            Obstacle::new(0.0, 0.0, 0.0, 0.0, 10.0),
            Err(GeometryError::DegenerateDimensions { .. })
        ));
        assert!(matches!(
            Obstacle::new(0.0, 0.0, 0.0, 10.0, -5.0),
            Err(GeometryError::DegenerateDimensions { .. })
        ));
        assert!(matches!(
            Obstacle::new(0.0, 0.0, 0.0, f64::INFINITY, 10.0),
            Err(GeometryError::DegenerateDimensions { .. })
        ));
    }

    #[test]
    fn test_rejects_non_finite_origin() {
        assert!(matches!(
            Obstacle::new(f64::NAN, 0.0, 0.0, 10.0, 10.0),
            Err(GeometryError::NonFiniteOrigin { .. })
        ));
    }

    #[test]
    fn test_snapshot_reports_radians() {
        let obstacle = Obstacle::new(100.0, 500.0, 30.0, 300.0, 25.0).unwrap();
        let snapshot = obstacle.snapshot();

        assert_approx_eq!(snapshot.x, 100.0);
        assert_approx_eq!(snapshot.y, 500.0);
        assert_approx_eq!(snapshot.direction, 30.0_f64.to_radians());
        assert_approx_eq!(snapshot.width, 300.0);
        assert_approx_eq!(snapshot.height, 25.0);
    }
}
