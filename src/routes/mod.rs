pub mod generation;
pub mod root;
