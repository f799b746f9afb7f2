/// Text rasterization.
pub mod render;
/// Width-aware line wrapping.
pub mod wrap;
