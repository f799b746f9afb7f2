use crate::assets::media::AudioPcm;
use crate::foundation::error::{EngineError, EngineResult};
use std::path::Path;

/// Placement of one decoded source on the output timeline.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AudioPlacement {
    /// Timeline second at which the source starts.
    pub timeline_start_sec: f64,
    /// Length of the contribution; the source is cut (or looped) to fit.
    pub duration_sec: f64,
    pub gain: f32,
    pub fade_in_sec: f64,
    pub fade_out_sec: f64,
    /// Restart the source from its beginning when it runs out.
    pub looped: bool,
}

/// Interleaved output accumulator for a whole render.
#[derive(Clone, Debug)]
pub struct MixBuffer {
    sample_rate: u32,
    channels: u16,
    samples: Vec<f32>,
}

impl MixBuffer {
    pub fn new(sample_rate: u32, channels: u16, duration_sec: f64) -> Self {
        let frames = secs_to_sample(duration_sec, sample_rate);
        Self {
            sample_rate,
            channels,
            samples: vec![0.0; frames * usize::from(channels)],
        }
    }

    /// Number of output sample frames.
    pub fn frames(&self) -> usize {
        self.samples.len() / usize::from(self.channels.max(1))
    }

    /// Add `pcm` at `placement`, resampling linearly when rates differ.
    pub fn add(&mut self, pcm: &AudioPcm, placement: &AudioPlacement) {
        let src_ch = usize::from(pcm.channels);
        let src_frames = pcm.frames();
        if src_frames == 0 || pcm.sample_rate == 0 || placement.duration_sec <= 0.0 {
            return;
        }
        let src = pcm.interleaved_f32.as_slice();
        let out_ch = usize::from(self.channels);
        let start = secs_to_sample(placement.timeline_start_sec, self.sample_rate);
        let len = secs_to_sample(placement.duration_sec, self.sample_rate);
        let end = (start + len).min(self.frames());
        let ratio = f64::from(pcm.sample_rate) / f64::from(self.sample_rate);

        for dst in start..end {
            let rel = dst - start;
            let rel_sec = rel as f64 / f64::from(self.sample_rate);
            let mut pos = rel as f64 * ratio;
            if pos >= src_frames as f64 {
                if !placement.looped {
                    break;
                }
                pos %= src_frames as f64;
            }
            let f0 = pos.floor() as usize;
            let f1 = if f0 + 1 < src_frames {
                f0 + 1
            } else if placement.looped {
                0
            } else {
                f0
            };
            let frac = (pos - f0 as f64) as f32;

            let gain = placement.gain * fade_gain(placement, rel_sec);
            let (l, r) = if src_ch == 1 {
                let v = lerp(src[f0], src[f1], frac);
                (v, v)
            } else {
                let i0 = f0 * src_ch;
                let i1 = f1 * src_ch;
                (lerp(src[i0], src[i1], frac), lerp(src[i0 + 1], src[i1 + 1], frac))
            };

            let di = dst * out_ch;
            self.samples[di] += l * gain;
            if out_ch > 1 {
                self.samples[di + 1] += r * gain;
            }
        }
    }

    /// Clamp to `[-1, 1]` and return interleaved samples.
    pub fn finish(mut self) -> Vec<f32> {
        for s in &mut self.samples {
            *s = s.clamp(-1.0, 1.0);
        }
        self.samples
    }
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

fn secs_to_sample(secs: f64, sample_rate: u32) -> usize {
    if !secs.is_finite() || secs <= 0.0 {
        return 0;
    }
    (secs * f64::from(sample_rate)).round() as usize
}

fn fade_gain(p: &AudioPlacement, rel_sec: f64) -> f32 {
    let mut gain = 1.0f32;
    if p.fade_in_sec > 0.0 {
        gain *= (rel_sec / p.fade_in_sec).clamp(0.0, 1.0) as f32;
    }
    if p.fade_out_sec > 0.0 {
        let rem = (p.duration_sec - rel_sec).max(0.0);
        gain *= (rem / p.fade_out_sec).clamp(0.0, 1.0) as f32;
    }
    gain
}

/// Write interleaved `f32` PCM samples to a raw little-endian `.f32le` file.
pub fn write_f32le_file(samples_interleaved: &[f32], out_path: &Path) -> EngineResult<()> {
    let mut bytes = Vec::<u8>::with_capacity(samples_interleaved.len() * 4);
    for &sample in samples_interleaved {
        bytes.extend_from_slice(&sample.to_le_bytes());
    }
    std::fs::write(out_path, bytes).map_err(|e| {
        EngineError::encode(format!(
            "failed to write mixed audio file '{}': {e}",
            out_path.display()
        ))
    })
}

#[cfg(test)]
#[path = "../../tests/unit/audio/mix.rs"]
mod tests;
