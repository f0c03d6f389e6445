pub mod chapter;
pub mod common;
pub mod markings;
pub mod owner;
