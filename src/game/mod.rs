pub mod item;
pub mod loot;
pub mod pickup;
pub mod selection;
