pub mod bestlist;
pub mod common;
pub mod discipline;
