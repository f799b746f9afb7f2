/// Timeline audio mixing.
pub mod mix;
/// Loudness normalization.
pub mod normalize;
