/// Ring-marker detection.
pub mod analyzer;
/// Crop geometry.
pub mod crop;
