/// Audio-related types
use serde::{Deserialize, Serialize};

/// A single stereo audio frame
///
/// Samples are f32 in the range [-1.0, 1.0]. The bridge moves these around
/// without looking at their content.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Left channel
    pub left: f32,

    /// Right channel
    pub right: f32,
}

impl Sample {
    /// Digital silence on both channels
    pub const SILENCE: Self = Self {
        left: 0.0,
        right: 0.0,
    };

    /// Create a new stereo frame
    pub const fn new(left: f32, right: f32) -> Self {
        Self { left, right }
    }

    /// Create a frame carrying the same value on both channels
    pub const fn mono(value: f32) -> Self {
        Self {
            left: value,
            right: value,
        }
    }

    /// Flatten frames into interleaved `[L, R, L, R, ...]` samples
    pub fn interleave(frames: &[Self]) -> Vec<f32> {
        let mut interleaved = Vec::with_capacity(frames.len() * 2);
        for frame in frames {
            interleaved.push(frame.left);
            interleaved.push(frame.right);
        }
        interleaved
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mono_duplicates_value() {
        let frame = Sample::mono(0.25);
        assert_eq!(frame.left, 0.25);
        assert_eq!(frame.right, 0.25);
    }

    #[test]
    fn interleave_keeps_channel_order() {
        let frames = [Sample::new(1.0, 2.0), Sample::new(3.0, 4.0)];
        assert_eq!(Sample::interleave(&frames), vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn sample_serializes_as_struct() {
        let json = serde_json::to_string(&Sample::new(0.5, -0.5)).unwrap();
        assert_eq!(json, r#"{"left":0.5,"right":-0.5}"#);
    }
}
