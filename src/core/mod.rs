pub mod input;
pub mod network;
pub mod world;
