use crate::game::item::{ItemIdentity, ItemKind, RawCandidate};
use glam::Vec3;
use rustc_hash::FxHashSet;

// Scan box = viewer bounding box inflated by these amounts on each side.
const EXPAND_XZ: f32 = 1.0;
const EXPAND_Y: f32 = 0.5;
// Squared horizontal movement per step below which the viewer counts as standing still.
const STILL_SPEED_SQ: f32 = 0.0001;

const DEFAULT_HALF_WIDTH: f32 = 0.3;
const DEFAULT_HEIGHT: f32 = 1.8;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScanRegion {
    pub min: Vec3,
    pub max: Vec3,
}

impl ScanRegion {
    #[inline(always)]
    pub fn contains(&self, p: Vec3) -> bool {
        p.cmpge(self.min).all() && p.cmple(self.max).all()
    }
}

/// Pose of the local player as sampled at the end of a step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewer {
    /// Feet position.
    pub position: Vec3,
    /// Feet position one step earlier.
    pub previous_position: Vec3,
    /// Positive when looking down, in degrees.
    pub pitch_degrees: f32,
    pub half_width: f32,
    pub height: f32,
}

impl Viewer {
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            previous_position: position,
            pitch_degrees: 0.0,
            half_width: DEFAULT_HALF_WIDTH,
            height: DEFAULT_HEIGHT,
        }
    }

    pub fn scan_region(&self) -> ScanRegion {
        let half = Vec3::new(self.half_width, 0.0, self.half_width);
        let inflate = Vec3::new(EXPAND_XZ, EXPAND_Y, EXPAND_XZ);
        ScanRegion {
            min: self.position - half - inflate,
            max: self.position + half + Vec3::new(0.0, self.height, 0.0) + inflate,
        }
    }

    pub fn horizontal_speed_sq(&self) -> f32 {
        let d = self.position - self.previous_position;
        d.x * d.x + d.z * d.z
    }

    #[inline(always)]
    pub fn is_standing_still(&self) -> bool {
        self.horizontal_speed_sq() < STILL_SPEED_SQ
    }
}

/// Read side of the world: dropped items inside a region.
///
/// Implementations return only alive, non-empty drops; the order they
/// return them in is the order used for merging.
pub trait WorldSnapshot {
    fn nearby_items(&self, region: &ScanRegion, step: u64) -> Vec<RawCandidate>;
}

/// Item types the viewer already carries, used for the "new item" marker.
pub trait InventorySnapshot {
    fn carried_kinds(&self) -> Vec<ItemKind>;
}

/// Items that stay visible in rare-only mode regardless of rarity.
pub trait Whitelist {
    fn contains(&self, identity: &ItemIdentity) -> bool;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct NoWhitelist;

impl Whitelist for NoWhitelist {
    fn contains(&self, _identity: &ItemIdentity) -> bool {
        false
    }
}

impl Whitelist for FxHashSet<ItemKind> {
    fn contains(&self, identity: &ItemIdentity) -> bool {
        FxHashSet::contains(self, &identity.kind)
    }
}

// In-memory worlds, used by the demo host and tests.
impl WorldSnapshot for Vec<RawCandidate> {
    fn nearby_items(&self, region: &ScanRegion, _step: u64) -> Vec<RawCandidate> {
        self.iter()
            .filter(|c| c.alive && c.count > 0 && region.contains(c.position))
            .cloned()
            .collect()
    }
}

impl InventorySnapshot for Vec<ItemKind> {
    fn carried_kinds(&self) -> Vec<ItemKind> {
        self.clone()
    }
}
