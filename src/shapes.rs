pub mod base;
pub mod circle;
pub mod ellipse;
pub mod image;
pub mod line;
pub mod polygon;
pub mod rect;
pub mod text;

#[cfg(test)]
#[path = "../tests/unit/shapes/variants.rs"]
mod tests;
