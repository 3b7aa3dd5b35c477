mod bridge;

pub use bridge::*;
