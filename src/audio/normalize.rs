use crate::assets::media::AudioPcm;

/// Loudness the normalizer aims for.
pub const TARGET_DBFS: f64 = -20.0;
pub const MIN_GAIN: f32 = 0.1;
pub const MAX_GAIN: f32 = 3.0;
const SAMPLE_POINTS: usize = 100;
const RMS_EPSILON: f64 = 1e-8;

/// Gain that brings `pcm` toward [`TARGET_DBFS`], estimated from ~100 evenly spaced sample
/// frames and clamped to `[MIN_GAIN, MAX_GAIN]`.
///
/// Empty PCM yields 1.0; digital silence yields [`MAX_GAIN`].
pub fn loudness_gain(pcm: &AudioPcm) -> f32 {
    let frames = pcm.frames();
    if frames == 0 {
        return 1.0;
    }
    let ch = usize::from(pcm.channels);
    let points = SAMPLE_POINTS.min(frames);

    let mut sum_sq = 0.0f64;
    let mut n = 0usize;
    for i in 0..points {
        let frame = if points == 1 {
            0
        } else {
            i * (frames - 1) / (points - 1)
        };
        for &s in &pcm.interleaved_f32[frame * ch..frame * ch + ch] {
            sum_sq += f64::from(s) * f64::from(s);
            n += 1;
        }
    }
    let rms = (sum_sq / n as f64).sqrt();
    let target_rms = 10f64.powf(TARGET_DBFS / 20.0);
    let gain = target_rms / (rms + RMS_EPSILON);
    (gain as f32).clamp(MIN_GAIN, MAX_GAIN)
}

/// Scale every sample of `pcm` by `gain`.
pub fn apply_gain(pcm: &mut AudioPcm, gain: f32) {
    if gain == 1.0 {
        return;
    }
    for s in &mut pcm.interleaved_f32 {
        *s *= gain;
    }
}

/// Normalize `pcm` in place and return the gain applied.
pub fn normalize(pcm: &mut AudioPcm) -> f32 {
    let gain = loudness_gain(pcm);
    apply_gain(pcm, gain);
    gain
}

#[cfg(test)]
#[path = "../../tests/unit/audio/normalize.rs"]
mod tests;
