use crate::assets::color::Rgba8;
use crate::config::style::{StrokeStyle, TextAlign, TextStyle};
use crate::vision::crop::CropShape;
use serde::{Deserialize, Serialize};

/// Game family a reel is built for. Every per-game difference is looked up through
/// [`GameKind::profile`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameKind {
    /// Round-screen cabinet footage; cropped square around the detected ring.
    Maimai,
    /// Widescreen footage; cropped to 16:9.
    Chunithm,
}

/// Layout and crop policy for one [`GameKind`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GameProfile {
    /// Source video height as a fraction of canvas height.
    pub video_height_ratio: f64,
    /// Top-left of the gameplay video, relative to the canvas.
    pub video_position: (f64, f64),
    /// Top-left of the comment text, relative to the canvas.
    pub text_position: (f64, f64),
    /// Shape the gameplay video is cropped to.
    pub crop_shape: CropShape,
    /// Whether to search for the ring marker before cropping.
    pub detect_center: bool,
}

const MAIMAI: GameProfile = GameProfile {
    video_height_ratio: 0.5,
    video_position: (0.092, 0.328),
    text_position: (0.54, 0.54),
    crop_shape: CropShape::Square,
    detect_center: true,
};

const CHUNITHM: GameProfile = GameProfile {
    video_height_ratio: 0.667,
    video_position: (0.0422, 0.0583),
    text_position: (0.76, 0.227),
    crop_shape: CropShape::Widescreen,
    detect_center: false,
};

impl GameKind {
    /// Strategy table lookup.
    pub fn profile(self) -> &'static GameProfile {
        match self {
            Self::Maimai => &MAIMAI,
            Self::Chunithm => &CHUNITHM,
        }
    }

    /// Default comment text style for this game.
    pub fn default_content_text_style(self) -> TextStyle {
        match self {
            Self::Maimai => TextStyle {
                font_size: 28.0,
                color: Rgba8::WHITE,
                max_chars_per_line: 24,
                stroke: Some(StrokeStyle {
                    color: Rgba8::BLACK,
                    width: 2.0,
                }),
                interline: 6.5,
                align: TextAlign::Left,
            },
            Self::Chunithm => TextStyle {
                font_size: 24.0,
                color: Rgba8::rgb(0xff, 0x80, 0x00),
                max_chars_per_line: 12,
                stroke: Some(StrokeStyle {
                    color: Rgba8::WHITE,
                    width: 2.0,
                }),
                interline: 6.5,
                align: TextAlign::Left,
            },
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/config/game.rs"]
mod tests;
