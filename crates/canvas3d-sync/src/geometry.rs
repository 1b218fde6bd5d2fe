//! Classification of sampled geometry type codes.

/// Mask that drops the extended-WKB flag bits from a type code.
const TYPE_MASK: i64 = 0x0FFF_FFFF;

/// ISO base codes for polygons and multi-polygons.
const POLYGON: i64 = 3;
const MULTI_POLYGON: i64 = 6;

/// Geometry type of a layer's first feature, as reported by the host.
///
/// Codes follow WKB: plain 2D types are below 1000, ISO Z and ZM types sit in
/// `1000..2000` and `3000..4000`, and extended WKB sets the high bit, which
/// reads as a negative number once the code is widened from `i32`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeometryClass {
    code: i64,
}

impl GeometryClass {
    /// Wraps a sampled type code.
    #[must_use]
    pub const fn from_code(code: i64) -> Self {
        Self { code }
    }

    /// Raw type code.
    #[must_use]
    pub const fn code(self) -> i64 {
        self.code
    }

    /// Whether features carry a z coordinate.
    #[must_use]
    pub fn is_3d(self) -> bool {
        self.code < 0 || (1000..2000).contains(&self.code) || (3000..4000).contains(&self.code)
    }

    /// Whether features are polygons or multi-polygons.
    #[must_use]
    pub fn is_polygonal(self) -> bool {
        matches!(
            (self.code & TYPE_MASK).rem_euclid(1000),
            POLYGON | MULTI_POLYGON
        )
    }

    /// Whether the renderer may drape the geometry onto terrain.
    #[must_use]
    pub fn is_drapeable(self) -> bool {
        self.is_polygonal() && !self.is_3d()
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(3, false)]
    #[case(6, false)]
    #[case(1003, true)]
    #[case(1999, true)]
    #[case(2003, false)]
    #[case(3002, true)]
    #[case(-2_147_483_645, true)]
    fn detects_z_coordinates(#[case] code: i64, #[case] expected: bool) {
        assert_eq!(GeometryClass::from_code(code).is_3d(), expected);
    }

    #[rstest]
    #[case(3, true)]
    #[case(6, true)]
    #[case(1003, true)]
    #[case(-2_147_483_645, true)]
    #[case(2, false)]
    #[case(1, false)]
    fn detects_polygons(#[case] code: i64, #[case] expected: bool) {
        assert_eq!(GeometryClass::from_code(code).is_polygonal(), expected);
    }

    #[test]
    fn only_flat_polygons_drape() {
        assert!(GeometryClass::from_code(3).is_drapeable());
        assert!(!GeometryClass::from_code(1003).is_drapeable());
        assert!(!GeometryClass::from_code(2).is_drapeable());
    }
}
