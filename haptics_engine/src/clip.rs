//! Decoded, immutable haptic clips
//!
//! A clip is two piecewise-linear envelopes (amplitude and frequency) over
//! time. Both are validated once at load; rendering only ever reads them.

use haptics_shared::clip_format::{HapticClipFile, SUPPORTED_MAJOR_VERSION};
use haptics_shared::{HapticsError, HapticsResult};

/// Frequency used when a clip carries no frequency envelope
pub const DEFAULT_FREQUENCY: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Breakpoint {
    pub time: f32,
    pub value: f32,
}

/// Amplitude and frequency at one point of a clip, both in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub amplitude: f32,
    pub frequency: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Clip {
    amplitude: Vec<Breakpoint>,
    frequency: Vec<Breakpoint>,
    duration: f32,
}

impl Clip {
    /// Decodes UTF-8 JSON clip data. The buffer needs no null terminator.
    pub fn from_json(data: &[u8]) -> HapticsResult<Self> {
        let text = std::str::from_utf8(data)?;
        let file: HapticClipFile =
            serde_json::from_str(text).map_err(|e| HapticsError::ParseFailed(e.to_string()))?;
        Self::from_file(&file)
    }

    pub fn from_file(file: &HapticClipFile) -> HapticsResult<Self> {
        let version = file.version;
        if version.major != SUPPORTED_MAJOR_VERSION {
            return Err(HapticsError::ParseFailed(format!(
                "unsupported clip version {}.{}.{}",
                version.major, version.minor, version.patch
            )));
        }

        let envelopes = &file.signals.continuous.envelopes;
        if envelopes.amplitude.is_empty() {
            return Err(HapticsError::ParseFailed("amplitude envelope is empty".to_string()));
        }

        let mut amplitude = Vec::with_capacity(envelopes.amplitude.len());
        for point in &envelopes.amplitude {
            check_unit_range("amplitude", point.amplitude)?;
            if let Some(emphasis) = point.emphasis {
                check_unit_range("emphasis amplitude", emphasis.amplitude)?;
                check_unit_range("emphasis frequency", emphasis.frequency)?;
            }
            amplitude.push(Breakpoint { time: point.time, value: point.amplitude });
        }
        check_times("amplitude", &amplitude)?;

        let mut frequency = Vec::with_capacity(envelopes.frequency.len().max(1));
        for point in &envelopes.frequency {
            check_unit_range("frequency", point.frequency)?;
            frequency.push(Breakpoint { time: point.time, value: point.frequency });
        }
        check_times("frequency", &frequency)?;
        if frequency.is_empty() {
            frequency.push(Breakpoint { time: 0.0, value: DEFAULT_FREQUENCY });
        }

        let duration = last_time(&amplitude).max(last_time(&frequency));

        Ok(Self { amplitude, frequency, duration })
    }

    /// Duration in seconds
    pub fn duration(&self) -> f32 {
        self.duration
    }

    pub fn sample_at(&self, time: f32) -> Sample {
        Sample {
            amplitude: interpolate(&self.amplitude, time),
            frequency: interpolate(&self.frequency, time),
        }
    }
}

fn check_unit_range(label: &str, value: f32) -> HapticsResult<()> {
    if !value.is_finite() || !(0.0..=1.0).contains(&value) {
        return Err(HapticsError::ParseFailed(format!(
            "{} value {} is outside the range 0.0 to 1.0",
            label, value
        )));
    }
    Ok(())
}

fn check_times(label: &str, points: &[Breakpoint]) -> HapticsResult<()> {
    let mut previous = 0.0_f32;
    for point in points {
        if !point.time.is_finite() || point.time < 0.0 {
            return Err(HapticsError::ParseFailed(format!(
                "{} envelope has invalid time {}",
                label, point.time
            )));
        }
        if point.time < previous {
            return Err(HapticsError::ParseFailed(format!(
                "{} envelope times are not in ascending order ({} after {})",
                label, point.time, previous
            )));
        }
        previous = point.time;
    }
    Ok(())
}

fn last_time(points: &[Breakpoint]) -> f32 {
    points.last().map(|p| p.time).unwrap_or(0.0)
}

/// Linear interpolation, holding the first/last value outside the envelope
fn interpolate(points: &[Breakpoint], time: f32) -> f32 {
    let Some(first) = points.first() else {
        return 0.0;
    };
    if time <= first.time {
        return first.value;
    }

    // index of the first breakpoint strictly after `time`; >= 1 here
    let next = points.partition_point(|p| p.time <= time);
    if next >= points.len() {
        return points[points.len() - 1].value;
    }

    let a = points[next - 1];
    let b = points[next];
    let span = b.time - a.time;
    if span <= 0.0 {
        return b.value;
    }
    a.value + (b.value - a.value) * ((time - a.time) / span)
}
