pub mod annotate;
pub mod domain;
pub mod fonts;
pub mod result;
pub mod sampling;
pub mod tracing_setup;

pub use annotate::{annotate, View, VIEWS};
pub use sampling::Annotation;
