use glam::Vec3;
use serde::Serialize;
use smallvec::SmallVec;
use std::fmt;
use std::sync::Arc;

/// World entity id of a dropped item. Only unique within one world session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct EntityId(pub u32);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Rarity {
    #[default]
    Common = 0,
    Uncommon = 1,
    Rare = 2,
    Epic = 3,
}

impl Rarity {
    #[inline(always)]
    pub const fn tier(self) -> u8 {
        self as u8
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Common => "Common",
            Self::Uncommon => "Uncommon",
            Self::Rare => "Rare",
            Self::Epic => "Epic",
        }
    }
}

/// Registry key of an item type, e.g. `minecraft:diamond`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ItemKind(Arc<str>);

impl ItemKind {
    pub fn new(key: &str) -> Self {
        Self(Arc::from(key))
    }

    #[inline(always)]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ItemKind {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Type plus the tag data that decides whether two stacks are interchangeable.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ItemIdentity {
    pub kind: ItemKind,
    pub tag: Option<Arc<str>>,
}

impl ItemIdentity {
    pub fn new(kind: &str) -> Self {
        Self {
            kind: ItemKind::new(kind),
            tag: None,
        }
    }
}

/// One dropped item observed in the current step.
#[derive(Clone, Debug)]
pub struct RawCandidate {
    pub id: EntityId,
    pub identity: ItemIdentity,
    pub stackable: bool,
    pub count: u32,
    pub rarity: Rarity,
    pub enchanted: bool,
    // Damage bars, lore lines and similar extras the overlay shows on hover.
    pub has_tooltip: bool,
    pub name: String,
    pub alive: bool,
    pub position: Vec3,
}

impl RawCandidate {
    /// A live, stackable, common stack at the origin.
    pub fn new(id: u32, kind: &str, name: &str, count: u32) -> Self {
        Self {
            id: EntityId(id),
            identity: ItemIdentity::new(kind),
            stackable: true,
            count,
            rarity: Rarity::Common,
            enchanted: false,
            has_tooltip: false,
            name: name.to_string(),
            alive: true,
            position: Vec3::ZERO,
        }
    }

    pub fn with_rarity(mut self, rarity: Rarity) -> Self {
        self.rarity = rarity;
        self
    }

    pub fn with_tag(mut self, tag: &str) -> Self {
        self.identity.tag = Some(Arc::from(tag));
        self
    }

    pub fn unstackable(mut self) -> Self {
        self.stackable = false;
        self
    }

    pub fn enchanted(mut self) -> Self {
        self.enchanted = true;
        self
    }

    pub fn with_tooltip(mut self) -> Self {
        self.has_tooltip = true;
        self
    }

    pub fn at(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GroupMember {
    pub id: EntityId,
    pub count: u32,
    pub position: Vec3,
}

/// One overlay row: every stackable drop of the same identity merged together.
///
/// Members keep first-seen order, so the first member's id stays the row's
/// identity for as long as that entity exists.
#[derive(Clone, Debug)]
pub struct DisplayGroup {
    identity: ItemIdentity,
    stackable: bool,
    rarity: Rarity,
    enchanted: bool,
    has_tooltip: bool,
    name: String,
    count: u32,
    members: SmallVec<[GroupMember; 4]>,
}

impl DisplayGroup {
    pub(crate) fn from_candidate(c: RawCandidate) -> Self {
        let mut members = SmallVec::new();
        members.push(GroupMember {
            id: c.id,
            count: c.count,
            position: c.position,
        });
        Self {
            identity: c.identity,
            stackable: c.stackable,
            rarity: c.rarity,
            enchanted: c.enchanted,
            has_tooltip: c.has_tooltip,
            name: c.name,
            count: c.count,
            members,
        }
    }

    /// Unstackable drops (tools, armor) stay on their own row even when identical.
    #[inline(always)]
    pub fn accepts(&self, c: &RawCandidate) -> bool {
        self.stackable && c.stackable && self.identity == c.identity
    }

    pub(crate) fn absorb(&mut self, c: &RawCandidate) {
        self.members.push(GroupMember {
            id: c.id,
            count: c.count,
            position: c.position,
        });
        self.count = self.count.saturating_add(c.count);
    }

    #[inline(always)]
    pub fn primary_id(&self) -> EntityId {
        self.members[0].id
    }

    pub fn member_ids(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.members.iter().map(|m| m.id)
    }

    pub fn members(&self) -> &[GroupMember] {
        &self.members
    }

    pub fn identity(&self) -> &ItemIdentity {
        &self.identity
    }

    pub const fn is_stackable(&self) -> bool {
        self.stackable
    }

    pub const fn rarity(&self) -> Rarity {
        self.rarity
    }

    pub const fn is_enchanted(&self) -> bool {
        self.enchanted
    }

    pub const fn has_tooltip(&self) -> bool {
        self.has_tooltip
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub const fn count(&self) -> u32 {
        self.count
    }
}
