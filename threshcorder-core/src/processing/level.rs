//! Loudness reduction of a buffer of signed 16-bit samples.
//!
//! Both detectors operate on raw sample values (no normalisation), so
//! thresholds are expressed in the same units as the samples.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::models::error::RecorderError;

/// How a buffer is reduced to a single loudness value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectionMethod {
    /// Root mean square over all samples.
    #[default]
    Rms,
    /// Largest signed sample value.
    Peak,
}

impl DetectionMethod {
    pub fn compute_level(self, samples: &[i16]) -> f32 {
        match self {
            Self::Rms => rms_level(samples),
            Self::Peak => peak_level(samples),
        }
    }
}

impl FromStr for DetectionMethod {
    type Err = RecorderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "rms" => Ok(Self::Rms),
            "peak" | "max" => Ok(Self::Peak),
            _ => Err(RecorderError::ConfigurationFailed(format!(
                "unknown detection method '{s}'"
            ))),
        }
    }
}

impl fmt::Display for DetectionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rms => f.write_str("RMS"),
            Self::Peak => f.write_str("Peak"),
        }
    }
}

/// RMS of `samples`, accumulated in 64 bits so full-scale buffers cannot overflow.
///
/// Returns 0.0 for an empty buffer.
pub fn rms_level(samples: &[i16]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_sq: i64 = samples
        .iter()
        .map(|&s| {
            let s = i64::from(s);
            s * s
        })
        .sum();
    let mean_square = sum_sq as f64 / samples.len() as f64;
    mean_square.abs().sqrt() as f32
}

/// Maximum signed sample value, not magnitude: a buffer that is loud only in
/// the negative direction reports a low peak.
///
/// Returns 0.0 for an empty buffer.
pub fn peak_level(samples: &[i16]) -> f32 {
    samples.iter().copied().max().map_or(0.0, f32::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn rms_of_silence_is_zero() {
        assert_eq!(rms_level(&[0; 64]), 0.0);
    }

    #[test]
    fn rms_of_constant_is_its_magnitude() {
        assert_relative_eq!(rms_level(&[1000; 32]), 1000.0);
        assert_relative_eq!(rms_level(&[-250; 7]), 250.0);
    }

    #[test]
    fn rms_full_scale_does_not_overflow() {
        let samples = vec![i16::MIN; 44_100];
        assert_relative_eq!(rms_level(&samples), 32_768.0);
    }

    #[test]
    fn rms_of_mixed_signal() {
        // sqrt((9 + 16) / 2)
        assert_relative_eq!(rms_level(&[3, -4]), 12.5f32.sqrt(), epsilon = 1e-6);
    }

    #[test]
    fn peak_is_signed_maximum() {
        assert_eq!(peak_level(&[-100, 50, -30]), 50.0);
        assert_eq!(peak_level(&[-100, -200]), -100.0);
    }

    #[test]
    fn empty_buffer_is_silent() {
        assert_eq!(DetectionMethod::Rms.compute_level(&[]), 0.0);
        assert_eq!(DetectionMethod::Peak.compute_level(&[]), 0.0);
    }

    #[test]
    fn method_dispatch() {
        let samples = [-300, 100, 200];
        assert_eq!(DetectionMethod::Peak.compute_level(&samples), 200.0);
        assert!(DetectionMethod::Rms.compute_level(&samples) > 200.0);
    }

    #[test]
    fn parse_method_names() {
        assert_eq!("RMS".parse::<DetectionMethod>().unwrap(), DetectionMethod::Rms);
        assert_eq!("peak".parse::<DetectionMethod>().unwrap(), DetectionMethod::Peak);
        assert_eq!("MAX".parse::<DetectionMethod>().unwrap(), DetectionMethod::Peak);
        assert!(matches!(
            "loudness".parse::<DetectionMethod>(),
            Err(RecorderError::ConfigurationFailed(_))
        ));
    }

    #[test]
    fn default_method_is_rms() {
        assert_eq!(DetectionMethod::default(), DetectionMethod::Rms);
        assert_eq!(DetectionMethod::Rms.to_string(), "RMS");
    }
}
