//! Exclusion zones: named regions of the ground plane where nothing may spawn.
//!
//! Containment is evaluated on the XZ plane; the height of the tested point is
//! ignored. Box and polygon shapes are expressed in the zone's local frame
//! (translated by `position`, rotated by `yaw` around +Y).
use glam::{Quat, Vec2, Vec3};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::math::horizontal_distance;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub enum ZoneShape {
    Circle {
        radius: f32,
    },
    /// Rectangle with the given full size along local X and Z.
    Box {
        size: Vec2,
    },
    /// Simple polygon in local XZ coordinates (`Vec2::y` is Z). Fewer than three
    /// points never contain anything.
    Polygon {
        points: Vec<Vec2>,
    },
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct ExclusionZone {
    pub name: String,
    pub shape: ZoneShape,
    pub position: Vec3,
    /// Rotation around +Y in radians.
    #[cfg_attr(feature = "serde", serde(default))]
    pub yaw: f32,
}

impl ExclusionZone {
    pub fn new(name: impl Into<String>, shape: ZoneShape, position: Vec3) -> Self {
        Self {
            name: name.into(),
            shape,
            position,
            yaw: 0.0,
        }
    }

    pub fn circle(name: impl Into<String>, position: Vec3, radius: f32) -> Self {
        Self::new(name, ZoneShape::Circle { radius }, position)
    }

    pub fn boxed(name: impl Into<String>, position: Vec3, size: Vec2) -> Self {
        Self::new(name, ZoneShape::Box { size }, position)
    }

    pub fn polygon(name: impl Into<String>, position: Vec3, points: Vec<Vec2>) -> Self {
        Self::new(name, ZoneShape::Polygon { points }, position)
    }

    /// Axis-aligned (before yaw) rectangular polygon centred on `position`.
    pub fn rectangle(name: impl Into<String>, position: Vec3, width: f32, depth: f32) -> Self {
        let hw = width / 2.0;
        let hd = depth / 2.0;
        Self::polygon(
            name,
            position,
            vec![
                Vec2::new(-hw, -hd),
                Vec2::new(hw, -hd),
                Vec2::new(hw, hd),
                Vec2::new(-hw, hd),
            ],
        )
    }

    /// Equilateral triangle with side `size`, centroid at `position`.
    pub fn triangle(name: impl Into<String>, position: Vec3, size: f32) -> Self {
        let height = size * 3f32.sqrt() / 2.0;
        Self::polygon(
            name,
            position,
            vec![
                Vec2::new(0.0, height * 2.0 / 3.0),
                Vec2::new(-size / 2.0, -height / 3.0),
                Vec2::new(size / 2.0, -height / 3.0),
            ],
        )
    }

    pub fn with_yaw(mut self, yaw: f32) -> Self {
        self.yaw = yaw;
        self
    }

    pub fn contains(&self, point: Vec3) -> bool {
        match &self.shape {
            ZoneShape::Circle { radius } => horizontal_distance(point, self.position) <= *radius,
            ZoneShape::Box { size } => {
                let local = self.to_local(point);
                local.x.abs() <= size.x / 2.0 && local.y.abs() <= size.y / 2.0
            }
            ZoneShape::Polygon { points } => {
                points.len() >= 3 && point_in_polygon(self.to_local(point), points)
            }
        }
    }

    /// World point → local XZ coordinates.
    fn to_local(&self, point: Vec3) -> Vec2 {
        let local = Quat::from_rotation_y(self.yaw).inverse() * (point - self.position);
        Vec2::new(local.x, local.z)
    }
}

/// Even-odd ray casting test.
fn point_in_polygon(p: Vec2, points: &[Vec2]) -> bool {
    let mut inside = false;
    let mut j = points.len() - 1;
    for i in 0..points.len() {
        let (a, b) = (points[i], points[j]);
        if (a.y > p.y) != (b.y > p.y) && p.x < (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x {
            inside = !inside;
        }
        j = i;
    }
    inside
}

#[cfg(test)]
mod tests {
    use std::f32::consts::FRAC_PI_4;

    use proptest::prelude::*;

    use super::*;

    #[test]
    fn circle_ignores_height() {
        let zone = ExclusionZone::circle("pond", Vec3::new(10.0, 0.0, 0.0), 5.0);
        assert!(zone.contains(Vec3::new(12.0, 300.0, 3.0)));
        assert!(zone.contains(Vec3::new(15.0, 0.0, 0.0)));
        assert!(!zone.contains(Vec3::new(15.1, 0.0, 0.0)));
    }

    #[test]
    fn box_respects_yaw() {
        let zone = ExclusionZone::boxed("shed", Vec3::ZERO, Vec2::new(10.0, 2.0));
        assert!(zone.contains(Vec3::new(4.5, 0.0, 0.0)));
        assert!(!zone.contains(Vec3::new(0.0, 0.0, 4.5)));

        let rotated = zone.with_yaw(std::f32::consts::FRAC_PI_2);
        assert!(rotated.contains(Vec3::new(0.0, 0.0, 4.5)));
        assert!(!rotated.contains(Vec3::new(4.5, 0.0, 0.0)));
    }

    #[test]
    fn polygon_needs_three_points() {
        let zone = ExclusionZone::polygon(
            "line",
            Vec3::ZERO,
            vec![Vec2::new(-1.0, 0.0), Vec2::new(1.0, 0.0)],
        );
        assert!(!zone.contains(Vec3::ZERO));
    }

    #[test]
    fn rectangle_and_triangle_helpers() {
        let rect = ExclusionZone::rectangle("yard", Vec3::new(5.0, 0.0, 5.0), 4.0, 2.0);
        assert!(rect.contains(Vec3::new(6.9, 0.0, 5.9)));
        assert!(!rect.contains(Vec3::new(7.1, 0.0, 5.0)));

        let tri = ExclusionZone::triangle("wedge", Vec3::ZERO, 6.0);
        assert!(tri.contains(Vec3::ZERO));
        assert!(!tri.contains(Vec3::new(0.0, 0.0, 4.0)));
    }

    #[test]
    fn concave_polygon_excludes_notch() {
        // U shape opening toward +Z.
        let zone = ExclusionZone::polygon(
            "u",
            Vec3::ZERO,
            vec![
                Vec2::new(-3.0, -3.0),
                Vec2::new(3.0, -3.0),
                Vec2::new(3.0, 3.0),
                Vec2::new(1.0, 3.0),
                Vec2::new(1.0, -1.0),
                Vec2::new(-1.0, -1.0),
                Vec2::new(-1.0, 3.0),
                Vec2::new(-3.0, 3.0),
            ],
        );
        assert!(zone.contains(Vec3::new(-2.0, 0.0, 2.0)));
        assert!(!zone.contains(Vec3::new(0.0, 0.0, 2.0)));
    }

    proptest! {
        #[test]
        fn rotated_square_polygon_matches_box(x in -10.0f32..10.0, z in -10.0f32..10.0) {
            let square = ExclusionZone::rectangle("sq", Vec3::ZERO, 8.0, 8.0).with_yaw(FRAC_PI_4);
            let boxed = ExclusionZone::boxed("bx", Vec3::ZERO, Vec2::splat(8.0)).with_yaw(FRAC_PI_4);
            let p = Vec3::new(x, 0.0, z);
            // Ignore points within float noise of the boundary.
            let local = Quat::from_rotation_y(FRAC_PI_4).inverse() * p;
            prop_assume!((local.x.abs() - 4.0).abs() > 1e-3 && (local.z.abs() - 4.0).abs() > 1e-3);
            prop_assert_eq!(square.contains(p), boxed.contains(p));
        }
    }
}
