use std::fmt;

use serde::{Deserialize, Serialize};

/// World-space position. The streaming core only ever measures distances with it.
pub type Position = glam::Vec3;

/// Identity of a world region as produced by a region locator: a ring index
/// plus an angular sector within that ring.
///
/// Equality and hashing derive from the fields alone, so two coordinates
/// describing the same ring and sector are interchangeable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RegionCoord {
    pub ring: u32,
    pub sector: u32,
}

impl RegionCoord {
    pub fn new(ring: u32, sector: u32) -> Self {
        Self { ring, sector }
    }
}

impl fmt::Display for RegionCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ring {} / sector {}", self.ring, self.sector)
    }
}

/// Canonical map key for a region.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RegionKey(pub String);

impl RegionKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RegionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Per-ring placement rules, consumed by structure generation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RingDefinition {
    pub ring: u32,
    pub structure_types: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn equal_fields_are_equal_regions() {
        let a = RegionCoord::new(3, 1);
        let b = RegionCoord { ring: 3, sector: 1 };
        assert_eq!(a, b);

        let set: HashSet<RegionCoord> = [a, b].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn region_key_displays_raw_string() {
        let key = RegionKey::new("r2:s3");
        assert_eq!(key.to_string(), "r2:s3");
        assert_eq!(key.as_str(), "r2:s3");
    }

    #[test]
    fn region_coord_serde_roundtrip() {
        let coord = RegionCoord::new(7, 2);
        let json = serde_json::to_string(&coord).unwrap();
        let back: RegionCoord = serde_json::from_str(&json).unwrap();
        assert_eq!(coord, back);
    }
}
