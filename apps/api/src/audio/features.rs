//! Acoustic feature extraction for the voice confidence model.
//!
//! Eight markers: pitch mean/variance, energy mean/variance, jitter,
//! shimmer, harmonics-to-noise ratio and speaking rate. Pitch-derived
//! values come from a normalized-autocorrelation pitch tracker; jitter and
//! shimmer are period/amplitude perturbations between consecutive voiced
//! frames.

pub const SAMPLE_RATE: u32 = 22_050;

const PITCH_FLOOR_HZ: f64 = 75.0;
const PITCH_CEILING_HZ: f64 = 500.0;
const VOICING_THRESHOLD: f64 = 0.45;
/// Candidate lags scoring within this fraction of the best one win if they
/// are shorter. Keeps the tracker from locking onto sub-octaves.
const OCTAVE_TOLERANCE: f64 = 0.9;
const SILENCE_RMS: f64 = 0.01;
const PITCH_FRAME: usize = 1024;

const RMS_FRAME: usize = 2048;
const RMS_HOP: usize = 512;

const FLATNESS_FFT: usize = 512;
const FLATNESS_AMIN: f64 = 1e-10;
const TONAL_FLATNESS: f64 = 0.01;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct VoiceFeatures {
    pub pitch_mean: f64,
    pub pitch_var: f64,
    pub energy_mean: f64,
    pub energy_var: f64,
    pub jitter: f64,
    pub shimmer: f64,
    pub hnr: f64,
    pub speaking_rate: f64,
}

impl VoiceFeatures {
    /// Model input order.
    pub fn as_array(&self) -> [f64; 8] {
        [
            self.pitch_mean,
            self.pitch_var,
            self.energy_mean,
            self.energy_var,
            self.jitter,
            self.shimmer,
            self.hnr,
            self.speaking_rate,
        ]
    }

    pub fn is_finite(&self) -> bool {
        self.as_array().iter().all(|v| v.is_finite())
    }
}

#[derive(Debug, Clone, Copy)]
struct VoicedFrame {
    f0: f64,
    peak_amplitude: f64,
    hnr_db: f64,
}

pub fn extract_features(samples: &[f32], sample_rate: u32) -> VoiceFeatures {
    if samples.is_empty() || sample_rate == 0 {
        return VoiceFeatures::default();
    }
    let sr = f64::from(sample_rate);

    let voiced = voiced_frames(samples, sr);
    let f0: Vec<f64> = voiced.iter().map(|f| f.f0).collect();
    let (pitch_mean, pitch_var) = mean_and_variance(&f0);

    let periods: Vec<f64> = f0.iter().map(|f| 1.0 / f).collect();
    let amplitudes: Vec<f64> = voiced.iter().map(|f| f.peak_amplitude).collect();
    let hnr_values: Vec<f64> = voiced.iter().map(|f| f.hnr_db).collect();

    let rms = frame_rms(samples, RMS_FRAME, RMS_HOP);
    let (energy_mean, energy_var) = mean_and_variance(&rms);

    let peaks = peak_pick(&rms, 5, 5, 5, 5, 0.1, 10);
    let duration_secs = samples.len() as f64 / sr;

    VoiceFeatures {
        pitch_mean,
        pitch_var,
        energy_mean,
        energy_var,
        jitter: local_perturbation(&periods),
        shimmer: local_perturbation(&amplitudes),
        hnr: mean_and_variance(&hnr_values).0,
        speaking_rate: peaks.len() as f64 / duration_secs,
    }
}

/// 0.5 for flat, tonal audio (hum, a held note), otherwise 1.0.
pub fn spectral_flatness_penalty(samples: &[f32]) -> f64 {
    if spectral_flatness(samples) < TONAL_FLATNESS {
        0.5
    } else {
        1.0
    }
}

/// Mean spectral flatness (geometric / arithmetic mean of the power
/// spectrum) over Hann-windowed frames.
pub fn spectral_flatness(samples: &[f32]) -> f64 {
    const N: usize = FLATNESS_FFT;
    if samples.is_empty() {
        return 1.0;
    }

    let window: Vec<f64> = (0..N)
        .map(|i| 0.5 - 0.5 * (2.0 * std::f64::consts::PI * i as f64 / N as f64).cos())
        .collect();
    let (cos_table, sin_table): (Vec<f64>, Vec<f64>) = (0..N)
        .map(|i| {
            let angle = 2.0 * std::f64::consts::PI * i as f64 / N as f64;
            (angle.cos(), angle.sin())
        })
        .unzip();

    let mut flatness_sum = 0.0;
    let mut frames = 0usize;
    let mut frame = vec![0.0f64; N];

    for start in (0..samples.len()).step_by(N) {
        let end = (start + N).min(samples.len());
        frame.iter_mut().for_each(|v| *v = 0.0);
        for (i, &s) in samples[start..end].iter().enumerate() {
            frame[i] = f64::from(s) * window[i];
        }

        let mut log_sum = 0.0;
        let mut power_sum = 0.0;
        let bins = N / 2 + 1;
        for k in 0..bins {
            let (mut re, mut im) = (0.0, 0.0);
            for (i, &x) in frame.iter().enumerate() {
                let idx = (k * i) % N;
                re += x * cos_table[idx];
                im -= x * sin_table[idx];
            }
            let power = (re * re + im * im).max(FLATNESS_AMIN);
            log_sum += power.ln();
            power_sum += power;
        }
        let geometric = (log_sum / bins as f64).exp();
        let arithmetic = power_sum / bins as f64;
        flatness_sum += geometric / arithmetic;
        frames += 1;
    }

    flatness_sum / frames as f64
}

fn voiced_frames(samples: &[f32], sr: f64) -> Vec<VoicedFrame> {
    let min_lag = ((sr / PITCH_CEILING_HZ).floor() as usize).max(1);
    let max_lag = (sr / PITCH_FLOOR_HZ).ceil() as usize;
    let frame_len = PITCH_FRAME.max(2 * max_lag);

    samples
        .chunks_exact(frame_len)
        .filter_map(|frame| {
            let energy: f64 = frame.iter().map(|&x| f64::from(x) * f64::from(x)).sum();
            if (energy / frame.len() as f64).sqrt() < SILENCE_RMS {
                return None;
            }

            let scores: Vec<(usize, f64)> = (min_lag..=max_lag.min(frame.len() - 1))
                .map(|lag| (lag, normalized_autocorrelation(frame, lag)))
                .collect();
            let (lag, r) = pick_pitch_lag(&scores)?;
            if r < VOICING_THRESHOLD {
                return None;
            }

            let peak_amplitude = frame
                .iter()
                .map(|&x| f64::from(x).abs())
                .fold(0.0, f64::max);
            let r = r.clamp(1e-6, 1.0 - 1e-6);
            Some(VoicedFrame {
                f0: sr / lag as f64,
                peak_amplitude,
                hnr_db: 10.0 * (r / (1.0 - r)).log10(),
            })
        })
        .collect()
}

/// Shortest local maximum scoring close to the global best.
fn pick_pitch_lag(scores: &[(usize, f64)]) -> Option<(usize, f64)> {
    let best = scores
        .iter()
        .map(|&(_, r)| r)
        .fold(f64::NEG_INFINITY, f64::max);
    if !best.is_finite() {
        return None;
    }

    let is_local_max = |i: usize| {
        let r = scores[i].1;
        let left = i == 0 || scores[i - 1].1 <= r;
        let right = i + 1 == scores.len() || scores[i + 1].1 <= r;
        left && right
    };

    (0..scores.len())
        .find(|&i| scores[i].1 >= best * OCTAVE_TOLERANCE && is_local_max(i))
        .map(|i| scores[i])
}

fn normalized_autocorrelation(frame: &[f32], lag: usize) -> f64 {
    let a = &frame[..frame.len() - lag];
    let b = &frame[lag..];
    let (mut dot, mut ea, mut eb) = (0.0, 0.0, 0.0);
    for (&x, &y) in a.iter().zip(b) {
        let (x, y) = (f64::from(x), f64::from(y));
        dot += x * y;
        ea += x * x;
        eb += y * y;
    }
    let denom = (ea * eb).sqrt();
    if denom > 0.0 {
        dot / denom
    } else {
        0.0
    }
}

/// Mean absolute difference between consecutive values relative to their mean.
fn local_perturbation(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    if mean <= 0.0 {
        return 0.0;
    }
    let diff_mean = values
        .windows(2)
        .map(|w| (w[1] - w[0]).abs())
        .sum::<f64>()
        / (values.len() - 1) as f64;
    diff_mean / mean
}

fn frame_rms(samples: &[f32], frame: usize, hop: usize) -> Vec<f64> {
    let rms = |chunk: &[f32]| {
        (chunk.iter().map(|&x| f64::from(x) * f64::from(x)).sum::<f64>() / chunk.len() as f64)
            .sqrt()
    };
    if samples.len() <= frame {
        return vec![rms(samples)];
    }
    (0..=samples.len() - frame)
        .step_by(hop)
        .map(|start| rms(&samples[start..start + frame]))
        .collect()
}

/// Population mean and variance; zeros for an empty slice.
fn mean_and_variance(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    (mean, var)
}

/// Peak picking over an envelope: a point is a peak if it is the maximum of
/// its neighbourhood, exceeds the local average by `delta`, and comes more
/// than `wait` points after the previous peak.
fn peak_pick(
    x: &[f64],
    pre_max: usize,
    post_max: usize,
    pre_avg: usize,
    post_avg: usize,
    delta: f64,
    wait: usize,
) -> Vec<usize> {
    let mut peaks = Vec::new();
    let mut last: Option<usize> = None;

    for n in 0..x.len() {
        let max_window = &x[n.saturating_sub(pre_max)..(n + post_max + 1).min(x.len())];
        if max_window.iter().any(|&v| v > x[n]) {
            continue;
        }
        let avg_window = &x[n.saturating_sub(pre_avg)..(n + post_avg + 1).min(x.len())];
        let avg = avg_window.iter().sum::<f64>() / avg_window.len() as f64;
        if x[n] < avg + delta {
            continue;
        }
        if last.is_some_and(|l| n <= l + wait) {
            continue;
        }
        peaks.push(n);
        last = Some(n);
    }

    peaks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(freq: f64, amplitude: f32, secs: f64) -> Vec<f32> {
        let n = (f64::from(SAMPLE_RATE) * secs) as usize;
        (0..n)
            .map(|i| {
                let t = i as f64 / f64::from(SAMPLE_RATE);
                amplitude * (2.0 * std::f64::consts::PI * freq * t).sin() as f32
            })
            .collect()
    }

    /// Deterministic pseudo-random noise in [-amplitude, amplitude].
    fn noise(n: usize, amplitude: f32) -> Vec<f32> {
        let mut state: u32 = 0x1234_5678;
        (0..n)
            .map(|_| {
                state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
                ((state >> 8) as f32 / (1u32 << 24) as f32 * 2.0 - 1.0) * amplitude
            })
            .collect()
    }

    #[test]
    fn test_sine_pitch_is_tracked() {
        let features = extract_features(&sine(200.0, 0.5, 1.0), SAMPLE_RATE);
        assert!(
            (features.pitch_mean - 200.0).abs() < 5.0,
            "Pitch was {}",
            features.pitch_mean
        );
        assert!(features.jitter < 0.02, "Jitter was {}", features.jitter);
        assert!(features.shimmer < 0.02, "Shimmer was {}", features.shimmer);
        assert!(features.hnr > 10.0, "HNR was {}", features.hnr);
        // RMS of a 0.5 sine is 0.5/sqrt(2)
        assert!((features.energy_mean - 0.3536).abs() < 0.01);
        assert!(features.is_finite());
    }

    #[test]
    fn test_silence_yields_zero_features() {
        let features = extract_features(&vec![0.0; 22_050], SAMPLE_RATE);
        assert_eq!(features.pitch_mean, 0.0);
        assert_eq!(features.pitch_var, 0.0);
        assert_eq!(features.jitter, 0.0);
        assert_eq!(features.energy_mean, 0.0);
        assert_eq!(features.speaking_rate, 0.0);
        assert!(features.is_finite());
    }

    #[test]
    fn test_empty_input_is_default() {
        assert_eq!(extract_features(&[], SAMPLE_RATE), VoiceFeatures::default());
    }

    #[test]
    fn test_tonal_audio_is_penalized() {
        let tone = sine(440.0, 0.5, 0.5);
        assert_eq!(spectral_flatness_penalty(&tone[..FLATNESS_FFT * 20]), 0.5);
    }

    #[test]
    fn test_noisy_audio_is_not_penalized() {
        let flat = spectral_flatness(&noise(11_025, 0.5));
        assert!(flat > 0.1, "Flatness was {flat}");
        assert_eq!(spectral_flatness_penalty(&noise(11_025, 0.5)), 1.0);
    }

    #[test]
    fn test_local_perturbation() {
        assert_eq!(local_perturbation(&[1.0]), 0.0);
        // diffs 0.2, 0.2 -> 0.2 / mean 1.0
        let p = local_perturbation(&[0.9, 1.1, 0.9, 1.1]);
        assert!((p - 0.2).abs() < 1e-9, "Perturbation was {p}");
    }

    #[test]
    fn test_peak_pick_respects_delta_and_wait() {
        let mut envelope = vec![0.0; 40];
        envelope[5] = 0.5;
        envelope[8] = 0.6; // shadows the smaller neighbour at 5
        envelope[30] = 0.05; // below delta
        let peaks = peak_pick(&envelope, 5, 5, 5, 5, 0.1, 10);
        assert_eq!(peaks, vec![8]);
    }

    #[test]
    fn test_peak_pick_finds_separated_peaks() {
        let mut envelope = vec![0.0; 60];
        envelope[10] = 0.5;
        envelope[40] = 0.5;
        assert_eq!(peak_pick(&envelope, 5, 5, 5, 5, 0.1, 10), vec![10, 40]);
    }

    #[test]
    fn test_mean_and_variance_population() {
        let (mean, var) = mean_and_variance(&[1.0, 2.0, 3.0, 4.0]);
        assert!((mean - 2.5).abs() < 1e-12);
        assert!((var - 1.25).abs() < 1e-12);
    }
}
