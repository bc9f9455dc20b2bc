pub mod ai;
pub mod cell;
pub mod entity;
pub mod grid;
