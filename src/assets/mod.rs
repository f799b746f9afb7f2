//! Source assets: colors, raster images and media probed or decoded through `ffmpeg`.

/// Color values and their JSON forms.
pub mod color;
/// `ffprobe`/`ffmpeg` boundary: probing, frame and audio decoding.
pub mod media;
/// Asset resolution and prepared rasters.
pub mod store;
