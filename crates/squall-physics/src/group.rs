//! Particle group definitions and handles

use squall_core::Vec2;

/// Opaque id of one particle group inside a [`ParticleWorld`](crate::ParticleWorld).
///
/// Ids are handed out monotonically and never reused, so a stale handle can
/// always be told apart from a live one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParticleGroupHandle(pub(crate) u32);

impl ParticleGroupHandle {
    pub fn id(&self) -> u32 {
        self.0
    }
}

/// Region filled with particles when a group is created (world units)
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GroupShape {
    Box { half_width: f32, half_height: f32 },
    Circle { radius: f32 },
}

impl GroupShape {
    fn contains(&self, x: f32, y: f32) -> bool {
        match *self {
            GroupShape::Box {
                half_width,
                half_height,
            } => x.abs() <= half_width + 1e-6 && y.abs() <= half_height + 1e-6,
            GroupShape::Circle { radius } => x * x + y * y <= radius * radius + 1e-6,
        }
    }

    fn half_extents(&self) -> (f32, f32) {
        match *self {
            GroupShape::Box {
                half_width,
                half_height,
            } => (half_width, half_height),
            GroupShape::Circle { radius } => (radius, radius),
        }
    }

    /// Lattice offsets (relative to the group center) covering this shape,
    /// at most `limit` of them.
    ///
    /// Points sit on a centered grid with the given stride; a shape smaller
    /// than one stride still yields its center point. The flag is set when
    /// the shape holds more than `limit` points.
    pub fn lattice(&self, stride: f32, limit: usize) -> (Vec<Vec2>, bool) {
        if limit == 0 {
            return (Vec::new(), true);
        }
        let (hw, hh) = self.half_extents();
        let stride = stride.max(1e-4);
        let cols = ((2.0 * hw / stride).floor() as usize).saturating_add(1);
        let rows = ((2.0 * hh / stride).floor() as usize).saturating_add(1);
        let x0 = -((cols - 1) as f32) * stride * 0.5;
        let y0 = -((rows - 1) as f32) * stride * 0.5;

        let mut points = Vec::with_capacity(cols.saturating_mul(rows).min(limit));
        for row in 0..rows {
            for col in 0..cols {
                let x = x0 + col as f32 * stride;
                let y = y0 + row as f32 * stride;
                if self.contains(x, y) {
                    if points.len() == limit {
                        return (points, true);
                    }
                    points.push(Vec2::new(x, y));
                }
            }
        }
        if points.is_empty() {
            points.push(Vec2::ZERO);
        }
        (points, false)
    }
}

/// Everything needed to create one group
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParticleGroupDef {
    pub shape: GroupShape,
    /// Group center in world units
    pub position: Vec2,
    /// Initial linear velocity shared by every particle of the group
    pub linear_velocity: Vec2,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn box_lattice_is_centered() {
        let shape = GroupShape::Box {
            half_width: 0.0,
            half_height: 0.5,
        };
        let (points, truncated) = shape.lattice(0.25, usize::MAX);
        assert_eq!(points.len(), 5);
        assert!(!truncated);
        assert!(points.iter().all(|p| p.x == 0.0));
        let sum: f32 = points.iter().map(|p| p.y).sum();
        assert!(sum.abs() < 1e-5);
    }

    #[test]
    fn circle_lattice_stays_inside() {
        let shape = GroupShape::Circle { radius: 0.5 };
        let (points, _) = shape.lattice(0.1, usize::MAX);
        assert!(points.len() > 10);
        assert!(points.iter().all(|p| p.length() <= 0.5 + 1e-4));
    }

    #[test]
    fn tiny_shape_still_yields_center() {
        let shape = GroupShape::Circle { radius: 0.001 };
        assert_eq!(shape.lattice(1.0, 8), (vec![Vec2::ZERO], false));
    }

    #[test]
    fn tiny_stride_stops_at_limit() {
        let shape = GroupShape::Box {
            half_width: 1000.0,
            half_height: 1000.0,
        };
        let (points, truncated) = shape.lattice(0.0, 64);
        assert_eq!(points.len(), 64);
        assert!(truncated);
        assert_eq!(shape.lattice(0.0, 0), (Vec::new(), true));
    }
}
