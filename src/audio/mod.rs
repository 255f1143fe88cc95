pub mod duration;
pub mod engine;
pub mod player;
