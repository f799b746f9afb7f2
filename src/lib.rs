//! Reelforge composes achievement reels: gameplay clips cropped around their play area, stamped
//! result images and commentary text, blended with crossfades into one video.
//!
//! - Describe a reel as a [`RenderJob`] (JSON)
//! - Build [`Segment`]s and [`assemble`] them into a [`Timeline`]
//! - Export segments or the whole timeline through an [`Exporter`], or stream frames into any
//!   [`FrameSink`]
#![forbid(unsafe_code)]

mod foundation;

pub mod assets;
pub mod audio;
pub mod config;
pub mod effects;
pub mod encode;
pub mod export;
pub mod render;
pub mod segment;
pub mod text;
pub mod timeline;
pub mod vision;

pub use crate::foundation::core::{Canvas, Fps, FrameIndex, Point};
pub use crate::foundation::error::{EngineError, EngineResult};

pub use crate::config::clip::{ClipConfig, InfoClipConfig};
pub use crate::config::game::GameKind;
pub use crate::config::job::{RenderJob, RenderOptions};
pub use crate::config::style::{StyleConfig, TextStyle};
pub use crate::encode::ffmpeg::{EncodeSettings, FfmpegSink, FfmpegSinkOpts, is_ffmpeg_on_path};
pub use crate::encode::sink::{AudioInputConfig, FrameSink, InMemorySink, SinkConfig};
pub use crate::export::exporter::{Exporter, RenderResult, RenderStatus, concat_existing};
pub use crate::render::backend::FrameRGBA;
pub use crate::render::cpu::TimelineRenderer;
pub use crate::render::pipeline::{RenderStats, render_timeline};
pub use crate::segment::model::Segment;
pub use crate::timeline::assemble::{Timeline, assemble};
