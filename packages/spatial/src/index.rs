//! R-tree indexes over polygon geometries.
//!
//! [`BoundaryIndex`] answers point-in-polygon lookups (which locality
//! contains a clicked coordinate). [`FootprintIndex`] answers
//! polygon-intersects queries (which blocks touch a proximity ring).

use geo::{BoundingRect, Contains, Intersects, MultiPolygon, Point};
use rstar::{AABB, RTree, RTreeObject};

/// A boundary polygon stored in the R-tree with its key.
struct BoundaryEntry {
    key: String,
    envelope: AABB<[f64; 2]>,
    polygon: MultiPolygon<f64>,
}

impl RTreeObject for BoundaryEntry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

/// Point-in-polygon index over keyed boundaries.
pub struct BoundaryIndex {
    tree: RTree<BoundaryEntry>,
}

impl BoundaryIndex {
    /// Bulk-loads the index from `(key, polygon)` pairs.
    pub fn build<I>(boundaries: I) -> Self
    where
        I: IntoIterator<Item = (String, MultiPolygon<f64>)>,
    {
        let entries: Vec<BoundaryEntry> = boundaries
            .into_iter()
            .filter(|(key, polygon)| !key.is_empty() && !polygon.0.is_empty())
            .map(|(key, polygon)| BoundaryEntry {
                key,
                envelope: compute_envelope(&polygon),
                polygon,
            })
            .collect();

        Self {
            tree: RTree::bulk_load(entries),
        }
    }

    /// Number of indexed boundaries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    /// Returns `true` if nothing was indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// Looks up the key of the boundary containing the point.
    ///
    /// Boundaries are expected to tile without overlap, so first match
    /// wins.
    #[must_use]
    pub fn lookup(&self, lng: f64, lat: f64) -> Option<&str> {
        let point = Point::new(lng, lat);
        let query_env = AABB::from_point([lng, lat]);

        self.tree
            .locate_in_envelope_intersecting(&query_env)
            .find(|entry| entry.polygon.contains(&point))
            .map(|entry| entry.key.as_str())
    }
}

/// A footprint stored in the R-tree with its position in the caller's
/// slice.
struct FootprintEntry {
    slot: usize,
    envelope: AABB<[f64; 2]>,
    polygon: MultiPolygon<f64>,
}

impl RTreeObject for FootprintEntry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

/// Polygon-intersects index over an ordered list of footprints.
///
/// Query results are reported as slot numbers (positions in the list the
/// index was built from), sorted ascending so callers see candidates in
/// their original order.
pub struct FootprintIndex {
    tree: RTree<FootprintEntry>,
}

impl FootprintIndex {
    /// Bulk-loads the index. Slot `i` refers to the `i`-th footprint.
    pub fn build<I>(footprints: I) -> Self
    where
        I: IntoIterator<Item = MultiPolygon<f64>>,
    {
        let entries: Vec<FootprintEntry> = footprints
            .into_iter()
            .enumerate()
            .filter(|(_, polygon)| !polygon.0.is_empty())
            .map(|(slot, polygon)| FootprintEntry {
                slot,
                envelope: compute_envelope(&polygon),
                polygon,
            })
            .collect();

        Self {
            tree: RTree::bulk_load(entries),
        }
    }

    /// Number of indexed footprints.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    /// Returns `true` if nothing was indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// Returns the slots of every footprint that intersects `query`.
    #[must_use]
    pub fn intersecting(&self, query: &MultiPolygon<f64>) -> Vec<usize> {
        let Some(rect) = query.bounding_rect() else {
            return Vec::new();
        };
        let query_env =
            AABB::from_corners([rect.min().x, rect.min().y], [rect.max().x, rect.max().y]);

        let mut slots: Vec<usize> = self
            .tree
            .locate_in_envelope_intersecting(&query_env)
            .filter(|entry| entry.polygon.intersects(query))
            .map(|entry| entry.slot)
            .collect();
        slots.sort_unstable();
        slots
    }
}

/// Compute the bounding box envelope for a [`MultiPolygon`].
fn compute_envelope(mp: &MultiPolygon<f64>) -> AABB<[f64; 2]> {
    mp.bounding_rect().map_or_else(
        || AABB::from_point([0.0, 0.0]),
        |rect| AABB::from_corners([rect.min().x, rect.min().y], [rect.max().x, rect.max().y]),
    )
}
