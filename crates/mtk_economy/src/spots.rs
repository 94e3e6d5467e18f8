//! # Mine Spots
//!
//! The clickable / auto-mining targets and the field they sit on.
//!
//! ## Spot Lifecycle
//!
//! ```text
//! Active ──strike──> Inactive ──(respawn delay)──> Active (new position)
//! ```
//!
//! Each spot cycles independently. Auto-mining never deactivates a spot.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::FieldConfig;

/// A position in field coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal coordinate, growing right.
    pub x: f32,
    /// Vertical coordinate, growing down.
    pub y: f32,
}

impl Point {
    /// Creates a point.
    #[inline]
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    #[inline]
    #[must_use]
    pub fn distance(self, other: Self) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// A single mining target.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MineSpot {
    /// Centre of the spot.
    pub position: Point,
    /// Drawn radius.
    pub radius: f32,
    /// Whether the spot accepts strikes and auto-mining.
    pub active: bool,
}

impl MineSpot {
    /// True if `point` falls strictly inside the spot's hit circle.
    #[inline]
    #[must_use]
    pub fn contains(&self, point: Point, hit_slop: f32) -> bool {
        self.position.distance(point) < self.radius + hit_slop
    }
}

/// The ordered set of spots plus the bounds they are placed within.
#[derive(Clone, Debug)]
pub struct SpotField {
    bounds: FieldConfig,
    spots: Vec<MineSpot>,
}

impl SpotField {
    /// Places `count` active spots at random positions.
    pub fn scatter<R: Rng + ?Sized>(bounds: FieldConfig, count: usize, rng: &mut R) -> Self {
        let spots = (0..count).map(|_| Self::place(&bounds, rng)).collect();
        Self { bounds, spots }
    }

    /// Rolls a fresh active spot inside the margin.
    fn place<R: Rng + ?Sized>(bounds: &FieldConfig, rng: &mut R) -> MineSpot {
        let x = rng.gen_range(bounds.margin..bounds.width - bounds.margin);
        let y = rng.gen_range(bounds.margin..bounds.height - bounds.margin);
        let radius = if bounds.max_radius > bounds.min_radius {
            rng.gen_range(bounds.min_radius..bounds.max_radius)
        } else {
            bounds.min_radius
        };
        MineSpot {
            position: Point::new(x, y),
            radius,
            active: true,
        }
    }

    /// Number of spots.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.spots.len()
    }

    /// True if the field holds no spots.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.spots.is_empty()
    }

    /// All spots, in index order.
    #[inline]
    #[must_use]
    pub fn spots(&self) -> &[MineSpot] {
        &self.spots
    }

    /// The spot at `index`, if any.
    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&MineSpot> {
        self.spots.get(index)
    }

    /// Number of active spots.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.spots.iter().filter(|s| s.active).count()
    }

    /// Indices of active spots, in order.
    pub fn active_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.spots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.active.then_some(i))
    }

    /// Deactivates an active spot. Returns `false` if the index is out of
    /// range or the spot was already inactive.
    pub fn deactivate(&mut self, index: usize) -> bool {
        match self.spots.get_mut(index) {
            Some(spot) if spot.active => {
                spot.active = false;
                true
            }
            _ => false,
        }
    }

    /// Replaces the spot at `index` with a fresh active one.
    ///
    /// Returns the new spot, or `None` if the index is out of range.
    pub fn respawn<R: Rng + ?Sized>(&mut self, index: usize, rng: &mut R) -> Option<MineSpot> {
        let fresh = Self::place(&self.bounds, rng);
        let slot = self.spots.get_mut(index)?;
        *slot = fresh;
        Some(fresh)
    }

    /// First active spot whose hit circle contains `point`.
    #[must_use]
    pub fn hit_test(&self, point: Point) -> Option<usize> {
        self.spots
            .iter()
            .position(|s| s.active && s.contains(point, self.bounds.hit_slop))
    }

    /// True if `spot`'s centre lies within the placement margin.
    #[must_use]
    pub fn in_bounds(&self, spot: &MineSpot) -> bool {
        let b = &self.bounds;
        (b.margin..=b.width - b.margin).contains(&spot.position.x)
            && (b.margin..=b.height - b.margin).contains(&spot.position.y)
            && (b.min_radius..=b.max_radius).contains(&spot.radius)
    }
}
