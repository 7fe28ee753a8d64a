use crate::core::world::Whitelist;
use crate::game::item::{DisplayGroup, Rarity, RawCandidate};
use log::trace;
use std::cmp::Ordering;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FilterMode {
    #[default]
    All,
    RareOnly,
}

impl FilterMode {
    pub const fn toggled(self) -> Self {
        match self {
            Self::All => Self::RareOnly,
            Self::RareOnly => Self::All,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::All => "All",
            Self::RareOnly => "RareOnly",
        }
    }
}

/// Rare-only mode hides plain common drops: common rarity, not enchanted
/// and nothing extra to show in a tooltip. Whitelisted items always show.
pub fn should_hide<W: Whitelist + ?Sized>(c: &RawCandidate, whitelist: &W) -> bool {
    if whitelist.contains(&c.identity) {
        return false;
    }
    c.rarity == Rarity::Common && !c.enchanted && !c.has_tooltip
}

/// Greedy first-fit merge in snapshot order.
pub fn aggregate<I>(candidates: I) -> Vec<DisplayGroup>
where
    I: IntoIterator<Item = RawCandidate>,
{
    let mut groups: Vec<DisplayGroup> = Vec::new();
    for c in candidates {
        match groups.iter_mut().find(|g| g.accepts(&c)) {
            Some(group) => group.absorb(&c),
            None => groups.push(DisplayGroup::from_candidate(c)),
        }
    }
    groups
}

/// Rarity desc, count desc, enchanted first, name asc, primary id asc.
pub fn compare_groups(a: &DisplayGroup, b: &DisplayGroup) -> Ordering {
    b.rarity()
        .cmp(&a.rarity())
        .then_with(|| b.count().cmp(&a.count()))
        .then_with(|| b.is_enchanted().cmp(&a.is_enchanted()))
        .then_with(|| a.name().cmp(b.name()))
        .then_with(|| a.primary_id().cmp(&b.primary_id()))
}

#[inline(always)]
pub fn sort_groups(groups: &mut [DisplayGroup]) {
    groups.sort_by(compare_groups);
}

/// Builds the ranked overlay list from one step's raw snapshot.
pub fn scan<W: Whitelist + ?Sized>(
    candidates: Vec<RawCandidate>,
    mode: FilterMode,
    whitelist: &W,
) -> Vec<DisplayGroup> {
    let raw_len = candidates.len();
    let visible = candidates
        .into_iter()
        .filter(|c| c.alive && c.count > 0)
        .filter(|c| mode == FilterMode::All || !should_hide(c, whitelist));
    let mut groups = aggregate(visible);
    sort_groups(&mut groups);
    trace!(
        "loot scan: {raw_len} candidates -> {} rows ({})",
        groups.len(),
        mode.as_str()
    );
    groups
}
