//! Vertical stacking and level-of-detail parameters.

use crate::layer::{Extent, ScaleRange};

/// What a placed layer contributes to the scene's vertical layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stratum {
    /// An elevation surface loaded as terrain.
    Terrain,
    /// Anything drawn over the ground: vector layers and imagery.
    Overlay,
}

/// Assigns each newly placed layer its height above the ground plane.
///
/// The first layer sits at zero. Every later layer sits one gap above the
/// previous placement; an overlay placed directly above terrain uses the
/// terrain gap so its geometry clears the surface. Heights only grow, even
/// after layers are removed.
#[derive(Debug, Clone, Default)]
pub struct ZStack {
    last: Option<(f64, Stratum)>,
}

impl ZStack {
    /// Creates an empty stack.
    #[must_use]
    pub const fn new() -> Self {
        Self { last: None }
    }

    /// Reserves the next height for a layer in `stratum`.
    #[expect(clippy::float_arithmetic, reason = "stacking adds gap distances")]
    pub fn place(&mut self, stratum: Stratum, vector_gap: f64, terrain_gap: f64) -> f64 {
        let z = match self.last {
            None => 0.0,
            Some((previous, Stratum::Terrain)) if stratum == Stratum::Overlay => {
                previous + terrain_gap
            }
            Some((previous, _)) => previous + vector_gap,
        };
        self.last = Some((z, stratum));
        z
    }

    /// Height of the most recent placement.
    #[must_use]
    pub fn last_z(&self) -> Option<f64> {
        self.last.map(|(z, _)| z)
    }
}

/// Renderer origin argument: `"x y z"` around the centre of `extent`.
#[must_use]
pub fn origin(extent: &Extent, z: f64) -> String {
    let (x, y) = extent.center();
    format!("{x} {y} {z}")
}

/// Renderer level-of-detail list: `"near far"`.
///
/// Layers without a distance band span zero to `default_far`.
#[must_use]
pub fn lod(range: Option<&ScaleRange>, default_far: f64) -> String {
    match range {
        Some(range) => format!("{} {}", range.near, range.far),
        None => format!("0 {default_far}"),
    }
}
