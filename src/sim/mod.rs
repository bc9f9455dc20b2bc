pub mod coordinator;
pub mod event;
pub mod level;
pub mod mover;
pub mod proposal;
pub mod world;
