//! Read-only view of the host's layers.
//!
//! These types mirror what the host registry knows about a layer. The
//! synchronizer never mutates them; it derives renderer commands from them.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable identifier the host assigns to a layer.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerId(String);

impl LayerId {
    /// Wraps a host identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Identifier text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LayerId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for LayerId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Broad layer category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerKind {
    /// Feature geometry, usually from a database.
    Vector,
    /// Gridded data such as elevation models or imagery.
    Raster,
}

impl fmt::Display for LayerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Vector => "vector",
            Self::Raster => "raster",
        })
    }
}

/// Axis-aligned rectangle in map units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    /// Minimum x.
    pub x_min: f64,
    /// Minimum y.
    pub y_min: f64,
    /// Maximum x.
    pub x_max: f64,
    /// Maximum y.
    pub y_max: f64,
}

impl Extent {
    /// Builds an extent from its corners.
    #[must_use]
    pub const fn new(x_min: f64, y_min: f64, x_max: f64, y_max: f64) -> Self {
        Self {
            x_min,
            y_min,
            x_max,
            y_max,
        }
    }

    /// Whether the extent covers no area.
    ///
    /// Degenerate and inverted rectangles are empty, as is any extent with a
    /// NaN coordinate.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        !(self.x_max > self.x_min && self.y_max > self.y_min)
    }

    /// Centre point as `(x, y)`.
    #[must_use]
    #[expect(
        clippy::float_arithmetic,
        reason = "midpoint of two map coordinates"
    )]
    pub fn center(&self) -> (f64, f64) {
        (
            (self.x_min + self.x_max) * 0.5,
            (self.y_min + self.y_max) * 0.5,
        )
    }

    /// Smallest extent covering both `self` and `other`.
    #[must_use]
    pub const fn union(&self, other: &Self) -> Self {
        Self {
            x_min: self.x_min.min(other.x_min),
            y_min: self.y_min.min(other.y_min),
            x_max: self.x_max.max(other.x_max),
            y_max: self.y_max.max(other.y_max),
        }
    }

    /// Renderer encoding: `"xmin ymin,xmax ymax"`.
    #[must_use]
    pub fn to_wire(&self) -> String {
        format!(
            "{} {},{} {}",
            self.x_min, self.y_min, self.x_max, self.y_max
        )
    }
}

/// Distance band within which a layer is drawn.
///
/// The renderer receives `near far` as the layer's level-of-detail list.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScaleRange {
    /// Closest distance at which the layer is drawn.
    pub near: f64,
    /// Furthest distance at which the layer is drawn.
    pub far: f64,
}

/// First symbol of a layer's style, reduced to what the renderer can use.
///
/// Colours are host colour names such as `#ff0000`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "symbol", rename_all = "snake_case")]
pub enum Style {
    /// Marker symbol.
    Point {
        /// Marker fill colour.
        color: String,
    },
    /// Stroke symbol.
    Line {
        /// Stroke colour.
        color: String,
    },
    /// Polygon symbol.
    Fill {
        /// Interior colour.
        color: String,
        /// Outline colour.
        border_color: String,
    },
    /// Single-colour override of a raster's rendering.
    Colorize {
        /// Tint colour.
        color: String,
    },
}

/// Pixel type of a raster's first band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RasterDataType {
    /// Unsigned 8-bit, typical for imagery.
    Byte,
    /// Unsigned 16-bit.
    UInt16,
    /// Signed 16-bit.
    Int16,
    /// Unsigned 32-bit.
    UInt32,
    /// Signed 32-bit.
    Int32,
    /// 32-bit float.
    Float32,
    /// 64-bit float.
    Float64,
    /// Any other pixel type.
    Other,
}

/// Band layout of a raster layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RasterInfo {
    /// Number of bands.
    pub band_count: u32,
    /// Pixel type of band one.
    pub data_type: RasterDataType,
}

impl RasterInfo {
    /// Whether the raster reads as an elevation model rather than imagery.
    ///
    /// Elevation models have a single band of a non-byte type.
    #[must_use]
    pub fn is_elevation(&self) -> bool {
        self.band_count == 1 && self.data_type != RasterDataType::Byte
    }
}

/// A layer as the host registry describes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    /// Stable host identifier.
    pub id: LayerId,
    /// Vector or raster.
    pub kind: LayerKind,
    /// Data provider name, such as `postgres` or `gdal`.
    pub provider: String,
    /// Provider-specific source string.
    pub source: String,
    /// Spatial extent of the layer's data.
    pub extent: Extent,
    /// First symbol of the layer's style.
    #[serde(default)]
    pub style: Option<Style>,
    /// Visibility distance band.
    #[serde(default)]
    pub scale_range: Option<ScaleRange>,
    /// Band layout, for raster layers.
    #[serde(default)]
    pub raster: Option<RasterInfo>,
}

impl Layer {
    /// Describes a vector layer.
    #[must_use]
    pub fn vector(
        id: impl Into<LayerId>,
        provider: impl Into<String>,
        source: impl Into<String>,
        extent: Extent,
    ) -> Self {
        Self {
            id: id.into(),
            kind: LayerKind::Vector,
            provider: provider.into(),
            source: source.into(),
            extent,
            style: None,
            scale_range: None,
            raster: None,
        }
    }

    /// Describes a raster layer.
    #[must_use]
    pub fn raster(
        id: impl Into<LayerId>,
        provider: impl Into<String>,
        source: impl Into<String>,
        extent: Extent,
        raster: RasterInfo,
    ) -> Self {
        Self {
            id: id.into(),
            kind: LayerKind::Raster,
            provider: provider.into(),
            source: source.into(),
            extent,
            style: None,
            scale_range: None,
            raster: Some(raster),
        }
    }

    /// Sets the layer's style.
    #[must_use]
    pub fn with_style(mut self, style: Style) -> Self {
        self.style = Some(style);
        self
    }

    /// Sets the layer's visibility distance band.
    #[must_use]
    pub const fn with_scale_range(mut self, range: ScaleRange) -> Self {
        self.scale_range = Some(range);
        self
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(Extent::new(0.0, 0.0, 10.0, 10.0), false)]
    #[case(Extent::new(0.0, 0.0, 0.0, 10.0), true)]
    #[case(Extent::new(5.0, 0.0, 1.0, 10.0), true)]
    #[case(Extent::new(0.0, f64::NAN, 1.0, 10.0), true)]
    fn detects_empty_extents(#[case] extent: Extent, #[case] empty: bool) {
        assert_eq!(extent.is_empty(), empty);
    }

    #[test]
    fn extent_wire_form_uses_comma_between_corners() {
        let extent = Extent::new(-1.5, 2.0, 300.0, 4000.25);
        assert_eq!(extent.to_wire(), "-1.5 2,300 4000.25");
    }

    #[test]
    fn center_is_midpoint() {
        assert_eq!(Extent::new(0.0, 10.0, 100.0, 30.0).center(), (50.0, 20.0));
    }

    #[rstest]
    #[case(1, RasterDataType::Float32, true)]
    #[case(1, RasterDataType::Int16, true)]
    #[case(1, RasterDataType::Byte, false)]
    #[case(3, RasterDataType::Float32, false)]
    fn classifies_elevation_rasters(
        #[case] band_count: u32,
        #[case] data_type: RasterDataType,
        #[case] expected: bool,
    ) {
        let info = RasterInfo {
            band_count,
            data_type,
        };
        assert_eq!(info.is_elevation(), expected);
    }

    #[test]
    fn style_deserialises_from_tagged_json() {
        let style: Style =
            serde_json::from_str(r##"{"symbol":"fill","color":"#00ff00","border_color":"#000000"}"##)
                .expect("style json");
        assert_eq!(
            style,
            Style::Fill {
                color: "#00ff00".into(),
                border_color: "#000000".into(),
            }
        );
    }
}
