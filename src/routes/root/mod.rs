mod handler;

pub use handler::{health, welcome};
