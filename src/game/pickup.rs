use crate::game::item::{DisplayGroup, EntityId};
use glam::Vec3;

/// Steps the pickup key must be held before a press counts as "take all".
pub const LONG_PRESS_THRESHOLD: u32 = 15;
/// Auto pickup fires on one step out of this many.
pub const AUTO_PICKUP_INTERVAL: u32 = 5;
/// A single pickup takes at most one full stack's worth from a merged row.
pub const SINGLE_PICKUP_CAP: u32 = 64;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PickupAction {
    None,
    Single,
    Batch,
}

/// Tap-vs-hold classifier for the pickup key plus the auto pickup cooldown.
#[derive(Clone, Copy, Debug, Default)]
pub struct PickupHandler {
    hold_ticks: u32,
    batch_triggered: bool,
    auto_cooldown: u32,
}

impl PickupHandler {
    pub const fn new() -> Self {
        Self {
            hold_ticks: 0,
            batch_triggered: false,
            auto_cooldown: 0,
        }
    }

    /// Advances one step. A release before the threshold is a tap; reaching
    /// the threshold fires a batch once and swallows the release.
    pub fn tick_input(&mut self, key_down: bool, override_down: bool, has_items: bool) -> PickupAction {
        // Override cancels unconditionally, even mid-hold.
        if override_down {
            self.reset_hold();
            return PickupAction::None;
        }

        if key_down {
            if has_items || self.batch_triggered {
                self.hold_ticks = self.hold_ticks.saturating_add(1);
            }
            if self.hold_ticks >= LONG_PRESS_THRESHOLD && !self.batch_triggered && has_items {
                self.batch_triggered = true;
                return PickupAction::Batch;
            }
            return PickupAction::None;
        }

        let action = if self.hold_ticks > 0
            && self.hold_ticks < LONG_PRESS_THRESHOLD
            && !self.batch_triggered
            && has_items
        {
            PickupAction::Single
        } else {
            PickupAction::None
        };
        self.reset_hold();
        action
    }

    /// True on the first step with auto mode active, then every
    /// `AUTO_PICKUP_INTERVAL` steps.
    pub fn can_auto_pickup(&mut self) -> bool {
        if self.auto_cooldown > 0 {
            self.auto_cooldown -= 1;
            false
        } else {
            self.auto_cooldown = AUTO_PICKUP_INTERVAL - 1;
            true
        }
    }

    pub fn reset_auto_cooldown(&mut self) {
        self.auto_cooldown = 0;
    }

    pub fn reset_hold(&mut self) {
        self.hold_ticks = 0;
        self.batch_triggered = false;
    }

    pub fn reset(&mut self) {
        self.reset_hold();
        self.reset_auto_cooldown();
    }

    /// Hold progress toward a batch pickup, 0 once the batch has fired.
    pub fn progress(&self) -> f32 {
        if self.batch_triggered {
            return 0.0;
        }
        (self.hold_ticks as f32 / LONG_PRESS_THRESHOLD as f32).clamp(0.0, 1.0)
    }

    #[inline(always)]
    pub const fn is_interacting(&self) -> bool {
        self.batch_triggered || self.hold_ticks > 0
    }

    pub const fn hold_ticks(&self) -> u32 {
        self.hold_ticks
    }
}

/// Members of `group` nearest to `viewer`, taken in distance order while the
/// running count stays within `cap`. The nearest member is always taken.
pub fn nearest_within_cap(group: &DisplayGroup, viewer: Vec3, cap: u32) -> Vec<EntityId> {
    let mut members: Vec<_> = group.members().iter().collect();
    members.sort_by(|a, b| {
        a.position
            .distance_squared(viewer)
            .total_cmp(&b.position.distance_squared(viewer))
    });

    let mut picked = Vec::with_capacity(members.len());
    let mut total = 0u32;
    for m in members {
        let next = total.saturating_add(m.count);
        if next > cap && !picked.is_empty() {
            break;
        }
        picked.push(m.id);
        total = next;
    }
    picked
}

/// Every member of every row, in list order.
pub fn batch_targets(groups: &[DisplayGroup]) -> Vec<EntityId> {
    groups.iter().flat_map(|g| g.member_ids()).collect()
}
