pub mod bestlist;
pub mod disciplines;
