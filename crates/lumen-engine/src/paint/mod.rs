//! Color primitives shared by materials and the debug registry.

mod color;

pub use color::{Color, ColorParseError};
