use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdout, Command, Stdio};

use crate::foundation::core::Fps;
use crate::foundation::error::{EngineError, EngineResult};
use crate::render::backend::FrameRGBA;
use crate::vision::crop::CropRect;

/// Internal audio mixing sample rate used across decode/mix/encode pipeline.
pub const MIX_SAMPLE_RATE: u32 = 48_000;
/// Internal audio channel count (interleaved stereo).
pub const MIX_CHANNELS: u16 = 2;

#[derive(Clone, Debug)]
/// Basic metadata about a source video file.
pub struct VideoSourceInfo {
    /// Source path used for probing/decoding.
    pub source_path: PathBuf,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Container (or video stream) duration in seconds.
    pub duration_secs: f64,
    /// Whether ffprobe detected at least one audio stream.
    pub has_audio: bool,
}

#[derive(Clone, Debug, Default)]
/// Decoded interleaved floating-point PCM.
pub struct AudioPcm {
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Channel count.
    pub channels: u16,
    /// Interleaved `f32` PCM samples.
    pub interleaved_f32: Vec<f32>,
}

impl AudioPcm {
    /// Number of sample frames (one sample per channel).
    pub fn frames(&self) -> usize {
        if self.channels == 0 {
            return 0;
        }
        self.interleaved_f32.len() / usize::from(self.channels)
    }

    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frames() as f64 / f64::from(self.sample_rate)
    }
}

/// Probe source video metadata through `ffprobe`.
pub fn probe_video(source_path: &Path) -> EngineResult<VideoSourceInfo> {
    #[derive(serde::Deserialize)]
    struct ProbeStream {
        codec_type: Option<String>,
        width: Option<u32>,
        height: Option<u32>,
        duration: Option<String>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeFormat {
        duration: Option<String>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeOut {
        streams: Vec<ProbeStream>,
        format: Option<ProbeFormat>,
    }

    let out = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-print_format",
            "json",
            "-show_streams",
            "-show_format",
        ])
        .arg(source_path)
        .output()
        .map_err(|e| EngineError::media(format!("failed to run ffprobe: {e}")))?;
    if !out.status.success() {
        return Err(EngineError::media(format!(
            "ffprobe failed for '{}': {}",
            source_path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }

    let parsed: ProbeOut = serde_json::from_slice(&out.stdout)
        .map_err(|e| EngineError::media(format!("ffprobe json parse failed: {e}")))?;
    let video_stream = parsed
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| EngineError::media("no video stream found"))?;
    let width = video_stream
        .width
        .ok_or_else(|| EngineError::media("missing video width from ffprobe"))?;
    let height = video_stream
        .height
        .ok_or_else(|| EngineError::media("missing video height from ffprobe"))?;
    let duration_secs = parsed
        .format
        .as_ref()
        .and_then(|f| parse_secs(f.duration.as_deref()))
        .or_else(|| parse_secs(video_stream.duration.as_deref()))
        .ok_or_else(|| EngineError::media("missing duration from ffprobe"))?;
    let has_audio = parsed
        .streams
        .iter()
        .any(|s| s.codec_type.as_deref() == Some("audio"));

    Ok(VideoSourceInfo {
        source_path: source_path.to_path_buf(),
        width,
        height,
        duration_secs,
        has_audio,
    })
}

fn parse_secs(s: Option<&str>) -> Option<f64> {
    s.and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|d| d.is_finite() && *d > 0.0)
}

/// Decode a single RGBA frame from source video at `source_time_sec`, at source resolution.
pub fn decode_video_frame(
    source: &VideoSourceInfo,
    source_time_sec: f64,
) -> EngineResult<FrameRGBA> {
    let out = Command::new("ffmpeg")
        .args([
            "-v",
            "error",
            "-ss",
            &format!("{:.6}", source_time_sec.max(0.0)),
        ])
        .arg("-i")
        .arg(&source.source_path)
        .args([
            "-frames:v",
            "1",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgba",
            "pipe:1",
        ])
        .output()
        .map_err(|e| EngineError::media(format!("failed to run ffmpeg for video decode: {e}")))?;

    if !out.status.success() {
        return Err(EngineError::media(format!(
            "ffmpeg video decode failed for '{}': {}",
            source.source_path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }

    let expected_len = source.width as usize * source.height as usize * 4;
    if expected_len == 0 || out.stdout.len() < expected_len {
        return Err(EngineError::media(format!(
            "decoded video frame has invalid size: got {} bytes, expected {expected_len}",
            out.stdout.len()
        )));
    }
    let mut data = out.stdout;
    data.truncate(expected_len);
    Ok(FrameRGBA {
        width: source.width,
        height: source.height,
        data,
        premultiplied: false,
    })
}

/// How a video layer is pulled out of its source file.
#[derive(Clone, Debug)]
pub struct VideoStreamSpec {
    pub source_path: PathBuf,
    /// Source time of the first frame.
    pub start_secs: f64,
    /// Length of the stream to produce.
    pub duration_secs: f64,
    /// Size the source is scaled to before cropping.
    pub scale_to: (u32, u32),
    /// Crop applied after scaling.
    pub crop: Option<CropRect>,
    /// Restart the source when it runs out.
    pub looped: bool,
}

impl VideoStreamSpec {
    /// Size of the frames the reader produces.
    pub fn output_size(&self) -> (u32, u32) {
        self.crop
            .map_or(self.scale_to, |c| (c.width, c.height))
    }

    fn filter_chain(&self, fps: Fps) -> String {
        let (w, h) = self.scale_to;
        let mut vf = format!("scale={w}:{h}:flags=bilinear");
        if let Some(c) = self.crop {
            vf.push(',');
            vf.push_str(&c.to_ffmpeg_filter());
        }
        vf.push_str(&format!(",fps={}/{}", fps.num, fps.den));
        vf
    }
}

/// Sequential decoder over one video layer, backed by an `ffmpeg` child process.
///
/// Frames are requested by layer-local index in increasing order. Once the stream is exhausted the
/// last decoded frame is held. Dropping the reader kills and reaps the child.
pub struct VideoReader {
    child: Child,
    stdout: ChildStdout,
    width: u32,
    height: u32,
    next_index: u64,
    current: Option<FrameRGBA>,
    exhausted: bool,
}

impl VideoReader {
    pub fn open(spec: &VideoStreamSpec, fps: Fps) -> EngineResult<Self> {
        let (width, height) = spec.output_size();
        if width == 0 || height == 0 {
            return Err(EngineError::validation("video layer size must be non-zero"));
        }

        let mut cmd = Command::new("ffmpeg");
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null());
        cmd.args(["-v", "error", "-nostdin"]);
        if spec.looped {
            cmd.args(["-stream_loop", "-1"]);
        }
        if spec.start_secs > 0.0 {
            cmd.args(["-ss", &format!("{:.6}", spec.start_secs)]);
        }
        cmd.arg("-i")
            .arg(&spec.source_path)
            .args(["-t", &format!("{:.6}", spec.duration_secs.max(0.0))])
            .args(["-an", "-vf", &spec.filter_chain(fps)])
            .args(["-f", "rawvideo", "-pix_fmt", "rgba", "pipe:1"]);

        let mut child = cmd.spawn().map_err(|e| {
            EngineError::media(format!(
                "failed to spawn ffmpeg for '{}': {e}",
                spec.source_path.display()
            ))
        })?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| EngineError::media("failed to open ffmpeg stdout"))?;

        tracing::debug!(
            path = %spec.source_path.display(),
            width,
            height,
            looped = spec.looped,
            "video reader opened"
        );
        Ok(Self {
            child,
            stdout,
            width,
            height,
            next_index: 0,
            current: None,
            exhausted: false,
        })
    }

    /// Frame at layer-local `index`; `None` only when the stream produced no frame at all.
    pub fn frame_at(&mut self, index: u64) -> EngineResult<Option<&FrameRGBA>> {
        while !self.exhausted && (self.current.is_none() || self.next_index <= index) {
            let mut buf = vec![0u8; self.width as usize * self.height as usize * 4];
            match self.stdout.read_exact(&mut buf) {
                Ok(()) => {
                    self.current = Some(FrameRGBA {
                        width: self.width,
                        height: self.height,
                        data: buf,
                        premultiplied: false,
                    });
                    self.next_index += 1;
                }
                Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                    self.exhausted = true;
                }
                Err(e) => {
                    return Err(EngineError::media(format!("read decoded video frame: {e}")));
                }
            }
        }
        Ok(self.current.as_ref())
    }
}

impl Drop for VideoReader {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

/// Decode audio from a media source to stereo interleaved `f32` PCM at [`MIX_SAMPLE_RATE`].
///
/// `window` restricts decoding to `(start, duration)` in source seconds. A source without an audio
/// stream yields empty PCM.
pub fn decode_audio(path: &Path, window: Option<(f64, f64)>) -> EngineResult<AudioPcm> {
    let mut cmd = Command::new("ffmpeg");
    cmd.args(["-v", "error", "-nostdin"]);
    if let Some((start, _)) = window.filter(|(s, _)| *s > 0.0) {
        cmd.args(["-ss", &format!("{start:.6}")]);
    }
    cmd.arg("-i").arg(path);
    if let Some((_, dur)) = window {
        cmd.args(["-t", &format!("{:.6}", dur.max(0.0))]);
    }
    let out = cmd
        .args([
            "-vn",
            "-f",
            "f32le",
            "-acodec",
            "pcm_f32le",
            "-ac",
            &MIX_CHANNELS.to_string(),
            "-ar",
            &MIX_SAMPLE_RATE.to_string(),
            "pipe:1",
        ])
        .output()
        .map_err(|e| EngineError::media(format!("failed to run ffmpeg for audio decode: {e}")))?;

    let empty = AudioPcm {
        sample_rate: MIX_SAMPLE_RATE,
        channels: MIX_CHANNELS,
        interleaved_f32: Vec::new(),
    };

    if !out.status.success() {
        let msg = String::from_utf8_lossy(&out.stderr);
        // ffmpeg reports a missing audio stream as an error; treat it as silence.
        if msg.contains("Stream specifier")
            || msg.contains("matches no streams")
            || msg.contains("does not contain any stream")
        {
            return Ok(empty);
        }
        return Err(EngineError::media(format!(
            "ffmpeg audio decode failed for '{}': {}",
            path.display(),
            msg.trim()
        )));
    }

    if !out.stdout.len().is_multiple_of(4) {
        return Err(EngineError::media(
            "decoded audio byte length is not aligned to f32 samples",
        ));
    }
    let interleaved_f32 = out
        .stdout
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect();

    Ok(AudioPcm {
        interleaved_f32,
        ..empty
    })
}

#[cfg(test)]
#[path = "../../tests/unit/assets/media.rs"]
mod tests;
