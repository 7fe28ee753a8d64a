pub mod anim;
pub mod overlay;
