//! Height field queries used to place collectibles on the ground.
//!
//! Coordinates cross this boundary as [`mint::Vector2`] so that terrain
//! providers backed by other math libraries can implement [`Terrain`] without
//! depending on `glam`. The `x` component is world X, `y` is world Z.
use std::sync::Arc;

use glam::Vec2;
use mint::Vector2;

/// Height and horizontal extent of a walkable surface.
pub trait Terrain: Send + Sync {
    /// Surface height at the given XZ position.
    fn height_at(&self, xz: Vector2<f32>) -> f32;

    /// Inclusive `(min, max)` corners of the horizontal extent.
    fn horizontal_bounds(&self) -> (Vector2<f32>, Vector2<f32>);
}

impl<T: Terrain + ?Sized> Terrain for Arc<T> {
    fn height_at(&self, xz: Vector2<f32>) -> f32 {
        (**self).height_at(xz)
    }

    fn horizontal_bounds(&self) -> (Vector2<f32>, Vector2<f32>) {
        (**self).horizontal_bounds()
    }
}

/// Constant-height rectangle.
#[derive(Clone, Debug, PartialEq)]
pub struct FlatTerrain {
    pub min: Vec2,
    pub max: Vec2,
    pub height: f32,
}

impl FlatTerrain {
    pub fn new(min: Vec2, max: Vec2, height: f32) -> Self {
        Self { min, max, height }
    }

    /// Square of side `2 * half_extent` centred on the origin at height 0.
    pub fn centered(half_extent: f32) -> Self {
        Self::new(Vec2::splat(-half_extent), Vec2::splat(half_extent), 0.0)
    }
}

impl Terrain for FlatTerrain {
    fn height_at(&self, _xz: Vector2<f32>) -> f32 {
        self.height
    }

    fn horizontal_bounds(&self) -> (Vector2<f32>, Vector2<f32>) {
        (self.min.into(), self.max.into())
    }
}

/// Regular grid of height samples with bilinear interpolation.
///
/// Sample `(i, j)` sits at `origin + (i, j) * cell_size`. Queries outside the
/// grid clamp to the border.
#[derive(Clone, Debug, PartialEq)]
pub struct HeightGrid {
    origin: Vec2,
    cell_size: f32,
    width: usize,
    depth: usize,
    heights: Vec<f32>,
}

impl HeightGrid {
    /// Build a grid from row-major heights (`depth` rows of `width` samples).
    ///
    /// Returns `None` if the grid is smaller than 2x2, the cell size is not
    /// positive, or the sample count does not match.
    pub fn new(
        origin: Vec2,
        cell_size: f32,
        width: usize,
        depth: usize,
        heights: Vec<f32>,
    ) -> Option<Self> {
        if width < 2 || depth < 2 || cell_size <= 0.0 || heights.len() != width * depth {
            return None;
        }
        Some(Self {
            origin,
            cell_size,
            width,
            depth,
            heights,
        })
    }

    /// Sample `f(x, z)` at every grid point.
    pub fn from_fn(
        origin: Vec2,
        cell_size: f32,
        width: usize,
        depth: usize,
        f: impl Fn(f32, f32) -> f32,
    ) -> Option<Self> {
        let heights = (0..depth)
            .flat_map(|j| (0..width).map(move |i| (i, j)))
            .map(|(i, j)| {
                let p = origin + Vec2::new(i as f32, j as f32) * cell_size;
                f(p.x, p.y)
            })
            .collect();
        Self::new(origin, cell_size, width, depth, heights)
    }

    fn sample(&self, i: usize, j: usize) -> f32 {
        self.heights[j * self.width + i]
    }
}

impl Terrain for HeightGrid {
    fn height_at(&self, xz: Vector2<f32>) -> f32 {
        let local = (Vec2::from(xz) - self.origin) / self.cell_size;
        let fx = local.x.clamp(0.0, (self.width - 1) as f32);
        let fz = local.y.clamp(0.0, (self.depth - 1) as f32);
        let i0 = (fx.floor() as usize).min(self.width - 2);
        let j0 = (fz.floor() as usize).min(self.depth - 2);
        let tx = fx - i0 as f32;
        let tz = fz - j0 as f32;

        let h00 = self.sample(i0, j0);
        let h10 = self.sample(i0 + 1, j0);
        let h01 = self.sample(i0, j0 + 1);
        let h11 = self.sample(i0 + 1, j0 + 1);
        let near = h00 + (h10 - h00) * tx;
        let far = h01 + (h11 - h01) * tx;
        near + (far - near) * tz
    }

    fn horizontal_bounds(&self) -> (Vector2<f32>, Vector2<f32>) {
        let extent = Vec2::new((self.width - 1) as f32, (self.depth - 1) as f32) * self.cell_size;
        (self.origin.into(), (self.origin + extent).into())
    }
}
