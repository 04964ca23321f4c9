//! Serde model of the `.haptic` clip file (schema version 1)
//!
//! The JSON is produced by haptic authoring tools. Fields this SDK does not
//! interpret are ignored rather than rejected, so newer minor versions load.
use serde::{Deserialize, Serialize};

pub const SUPPORTED_MAJOR_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HapticClipFile {
    pub version: FormatVersion,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ClipMetadata>,
    pub signals: Signals,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClipMetadata {
    #[serde(default)]
    pub editor: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub project: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signals {
    pub continuous: ContinuousSignal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContinuousSignal {
    pub envelopes: Envelopes,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelopes {
    pub amplitude: Vec<AmplitudePoint>,
    #[serde(default)]
    pub frequency: Vec<FrequencyPoint>,
}

/// Amplitude breakpoint, optionally carrying a transient emphasis
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AmplitudePoint {
    pub time: f32,
    pub amplitude: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emphasis: Option<Emphasis>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Emphasis {
    pub amplitude: f32,
    pub frequency: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrequencyPoint {
    pub time: f32,
    pub frequency: f32,
}

impl HapticClipFile {
    /// Builds a v1 clip from (time, amplitude, frequency) samples
    pub fn from_samples(samples: &[(f32, f32, f32)]) -> Self {
        Self {
            version: FormatVersion { major: SUPPORTED_MAJOR_VERSION, minor: 0, patch: 0 },
            metadata: None,
            signals: Signals {
                continuous: ContinuousSignal {
                    envelopes: Envelopes {
                        amplitude: samples
                            .iter()
                            .map(|&(time, amplitude, _)| AmplitudePoint { time, amplitude, emphasis: None })
                            .collect(),
                        frequency: samples
                            .iter()
                            .map(|&(time, _, frequency)| FrequencyPoint { time, frequency })
                            .collect(),
                    },
                },
            },
        }
    }
}
