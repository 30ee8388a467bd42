mod bb;
mod core;

pub use bb::BB;
pub use core::Shape;
