//! Grid snapping for raw touch coordinates
//!
//! Touch sources report sub-pixel float positions that drift even while a finger
//! is stationary, and the drift on a Move is not guaranteed to be undone by the
//! matching Up. Raw floats are therefore never used as lookup keys; every position
//! is snapped to an integer grid cell first.
//!
//! # Rounding policy
//!
//! Each axis is rounded independently to the nearest integer, with ties rounding
//! away from zero (`f32::round`). `0.5` becomes `1`, `-0.5` becomes `-1`.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::error::TrackerError;

/// Raw position as reported by the input source
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Snap to the containing grid cell
    ///
    /// Fails for NaN or infinite components, and for components whose rounded
    /// value falls outside the `i32` grid.
    pub fn snap(self) -> Result<GridPoint, TrackerError> {
        GridPoint::try_from(self)
    }
}

impl From<(f32, f32)> for Point {
    fn from((x, y): (f32, f32)) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Rounded (grid-snapped) position, the registry's lookup key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridPoint {
    pub x: i32,
    pub y: i32,
}

impl GridPoint {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Center of the cell in raw coordinate space
    ///
    /// Feeding this back into any registry lookup resolves to the same cell.
    pub fn to_point(self) -> Point {
        Point::new(self.x as f32, self.y as f32)
    }
}

impl TryFrom<Point> for GridPoint {
    type Error = TrackerError;

    fn try_from(p: Point) -> Result<Self, Self::Error> {
        if !p.x.is_finite() || !p.y.is_finite() {
            return Err(TrackerError::NonFiniteCoordinate { x: p.x, y: p.y });
        }
        match (snap_axis(p.x), snap_axis(p.y)) {
            (Some(x), Some(y)) => Ok(Self { x, y }),
            _ => Err(TrackerError::CoordinateOutOfRange { x: p.x, y: p.y }),
        }
    }
}

impl From<GridPoint> for Point {
    fn from(g: GridPoint) -> Self {
        g.to_point()
    }
}

impl fmt::Display for GridPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Round a single finite axis value, ties away from zero
///
/// Returns `None` when the rounded value does not fit in an `i32`, so distinct
/// far-off positions never collapse into the same boundary cell.
#[inline]
pub fn snap_axis(v: f32) -> Option<i32> {
    // -2^31 and 2^31 are exact in f32; i32::MAX itself is not
    const LOWER: f32 = -2_147_483_648.0;
    const UPPER: f32 = 2_147_483_648.0;

    let rounded = v.round();
    (LOWER..UPPER).contains(&rounded).then(|| rounded as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snap_nearest() {
        assert_eq!(Point::new(990.71, 102.29).snap().unwrap(), GridPoint::new(991, 102));
        assert_eq!(Point::new(994.0, 99.0).snap().unwrap(), GridPoint::new(994, 99));
        assert_eq!(Point::new(-3.4, -3.6).snap().unwrap(), GridPoint::new(-3, -4));
    }

    #[test]
    fn test_ties_round_away_from_zero() {
        assert_eq!(snap_axis(0.5), Some(1));
        assert_eq!(snap_axis(1.5), Some(2));
        assert_eq!(snap_axis(2.5), Some(3));
        assert_eq!(snap_axis(-0.5), Some(-1));
        assert_eq!(snap_axis(-2.5), Some(-3));
    }

    #[test]
    fn test_axes_are_independent() {
        let g = Point::new(10.49, 10.51).snap().unwrap();
        assert_eq!(g, GridPoint::new(10, 11));
    }

    #[test]
    fn test_non_finite_rejected() {
        assert!(matches!(
            Point::new(f32::NAN, 1.0).snap(),
            Err(TrackerError::NonFiniteCoordinate { .. })
        ));
        assert!(Point::new(1.0, f32::INFINITY).snap().is_err());
        assert!(Point::new(f32::NEG_INFINITY, 0.0).snap().is_err());
    }

    #[test]
    fn test_out_of_range_rejected() {
        assert_eq!(snap_axis(1.0e12), None);
        assert_eq!(snap_axis(-1.0e12), None);
        assert_eq!(snap_axis(2_147_483_648.0), None);
        assert_eq!(snap_axis(-2_147_483_648.0), Some(i32::MIN));

        assert!(matches!(
            Point::new(3.0e9, 0.0).snap(),
            Err(TrackerError::CoordinateOutOfRange { .. })
        ));
        assert!(matches!(
            Point::new(0.0, -4.0e9).snap(),
            Err(TrackerError::CoordinateOutOfRange { .. })
        ));
    }

    #[test]
    fn test_cell_center_round_trips() {
        let g = GridPoint::new(-7, 42);
        assert_eq!(g.to_point().snap().unwrap(), g);
    }
}
