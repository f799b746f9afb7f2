use crate::assets::color::Rgba8;
use crate::config::game::GameKind;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Horizontal alignment of wrapped text lines.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// Text outline.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct StrokeStyle {
    pub color: Rgba8,
    pub width: f32,
}

/// Font and layout settings for one block of text.
///
/// Serialized with the flat key layout used by style files (`font_color`, `inline_max_chara`,
/// `enable_stroke`, `stroke_color`, `stroke_width`, `horizontal_align`).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "TextStyleDoc", into = "TextStyleDoc")]
pub struct TextStyle {
    /// Font size in pixels.
    pub font_size: f32,
    pub color: Rgba8,
    /// Wrap budget in full-width characters; half-width characters count half.
    pub max_chars_per_line: u32,
    pub stroke: Option<StrokeStyle>,
    /// Extra spacing between lines, in pixels.
    pub interline: f32,
    pub align: TextAlign,
}

impl TextStyle {
    /// Style used for intro and ending commentary.
    pub fn default_intro() -> Self {
        Self {
            font_size: 44.0,
            color: Rgba8::WHITE,
            max_chars_per_line: 26,
            stroke: Some(StrokeStyle {
                color: Rgba8::BLACK,
                width: 2.0,
            }),
            interline: 6.5,
            align: TextAlign::Left,
        }
    }

    /// Width budget in half-width units.
    pub fn wrap_budget(&self) -> usize {
        self.max_chars_per_line as usize * 2
    }
}

#[derive(Serialize, Deserialize)]
struct TextStyleDoc {
    #[serde(default = "default_font_size")]
    font_size: f32,
    #[serde(default = "default_font_color", alias = "color")]
    font_color: Rgba8,
    #[serde(default = "default_max_chars", alias = "max_chars_per_line")]
    inline_max_chara: u32,
    #[serde(default)]
    enable_stroke: bool,
    #[serde(default = "default_stroke_color")]
    stroke_color: Rgba8,
    #[serde(default)]
    stroke_width: f32,
    #[serde(default = "default_interline")]
    interline: f32,
    #[serde(default, alias = "align")]
    horizontal_align: TextAlign,
}

fn default_font_size() -> f32 {
    28.0
}

fn default_font_color() -> Rgba8 {
    Rgba8::WHITE
}

fn default_max_chars() -> u32 {
    24
}

fn default_stroke_color() -> Rgba8 {
    Rgba8::BLACK
}

fn default_interline() -> f32 {
    6.5
}

impl From<TextStyleDoc> for TextStyle {
    fn from(d: TextStyleDoc) -> Self {
        let stroke = (d.enable_stroke && d.stroke_width > 0.0).then_some(StrokeStyle {
            color: d.stroke_color,
            width: d.stroke_width,
        });
        Self {
            font_size: d.font_size,
            color: d.font_color,
            max_chars_per_line: d.inline_max_chara.max(1),
            stroke,
            interline: d.interline,
            align: d.horizontal_align,
        }
    }
}

impl From<TextStyle> for TextStyleDoc {
    fn from(s: TextStyle) -> Self {
        Self {
            font_size: s.font_size,
            font_color: s.color,
            inline_max_chara: s.max_chars_per_line,
            enable_stroke: s.stroke.is_some(),
            stroke_color: s.stroke.map_or(Rgba8::BLACK, |st| st.color),
            stroke_width: s.stroke.map_or(0.0, |st| st.width),
            interline: s.interline,
            horizontal_align: s.align,
        }
    }
}

/// Asset files referenced by a style. Any of them may be absent on disk; absence is recovered at
/// build time.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetPaths {
    /// Font used for all commentary text.
    pub comment_font: Option<PathBuf>,
    /// Looping background video of intro/ending segments.
    pub intro_video_bg: Option<PathBuf>,
    /// Text-box overlay image of intro/ending segments.
    pub intro_text_bg: Option<PathBuf>,
    /// Default content background image.
    pub content_bg: Option<PathBuf>,
    /// Optional looping content background video.
    pub content_bg_video: Option<PathBuf>,
    /// Background music of intro/ending segments.
    pub intro_bgm: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleOptions {
    /// Use `content_bg_video` behind content segments when it exists.
    pub content_use_video_bg: bool,
    /// Ignore per-clip background images and always use the style default.
    pub override_content_default_bg: bool,
}

/// Visual style bundle for one game. Passed by reference and never mutated.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StyleConfig {
    #[serde(default)]
    pub style_name: String,
    #[serde(default)]
    pub asset_paths: AssetPaths,
    #[serde(default)]
    pub options: StyleOptions,
    #[serde(default = "TextStyle::default_intro")]
    pub intro_text_style: TextStyle,
    /// Falls back to the game's default when absent.
    #[serde(default)]
    pub content_text_style: Option<TextStyle>,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            style_name: String::new(),
            asset_paths: AssetPaths::default(),
            options: StyleOptions::default(),
            intro_text_style: TextStyle::default_intro(),
            content_text_style: None,
        }
    }
}

impl StyleConfig {
    /// Style with no assets and the default text styles of `game`.
    pub fn default_for(game: GameKind) -> Self {
        Self {
            content_text_style: Some(game.default_content_text_style()),
            ..Self::default()
        }
    }

    /// Content text style, or `game`'s default.
    pub fn content_text_style(&self, game: GameKind) -> TextStyle {
        self.content_text_style
            .clone()
            .unwrap_or_else(|| game.default_content_text_style())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/config/style.rs"]
mod tests;
