use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::error::{CompileError, Result};

/// Frame size of the source media, written as `WxH`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl FromStr for Resolution {
    type Err = CompileError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || CompileError::InvalidResolution(s.to_string());
        let (w, h) = s.trim().split_once('x').ok_or_else(invalid)?;
        let width: u32 = w.parse().map_err(|_| invalid())?;
        let height: u32 = h.parse().map_err(|_| invalid())?;
        if width == 0 || height == 0 {
            return Err(invalid());
        }
        Ok(Self { width, height })
    }
}

impl TryFrom<String> for Resolution {
    type Error = CompileError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Resolution> for String {
    fn from(value: Resolution) -> Self {
        value.to_string()
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Facts about the source file supplied by a prober.
///
/// The compiler only reads it; crop arithmetic and fade-out timing become
/// literal values when the relevant fields are known.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaDescriptor {
    pub resolution: Option<Resolution>,
    /// Seconds
    pub duration: Option<f64>,
    pub codecs: Vec<String>,
    pub has_audio: bool,
}

impl MediaDescriptor {
    pub fn with_resolution(mut self, resolution: Resolution) -> Self {
        self.resolution = Some(resolution);
        self
    }

    pub fn with_duration(mut self, seconds: f64) -> Self {
        self.duration = Some(seconds);
        self
    }

    /// Parse a descriptor in this crate's own JSON shape
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Build a descriptor from `ffprobe -print_format json -show_format -show_streams` output
    pub fn from_ffprobe_json(json: &str) -> Result<Self> {
        let root: Value = serde_json::from_str(json)?;
        let streams = root["streams"].as_array().cloned().unwrap_or_default();

        let video = streams
            .iter()
            .find(|s| s["codec_type"].as_str() == Some("video"));

        let resolution = video.and_then(|s| {
            let width = u32::try_from(s["width"].as_u64()?).ok()?;
            let height = u32::try_from(s["height"].as_u64()?).ok()?;
            (width > 0 && height > 0).then_some(Resolution { width, height })
        });

        // ffprobe reports durations as strings
        let duration = root["format"]["duration"]
            .as_str()
            .and_then(|d| d.parse::<f64>().ok())
            .or_else(|| {
                video
                    .and_then(|s| s["duration"].as_str())
                    .and_then(|d| d.parse().ok())
            });

        let codecs = streams
            .iter()
            .filter_map(|s| s["codec_name"].as_str().map(str::to_string))
            .collect();

        let has_audio = streams
            .iter()
            .any(|s| s["codec_type"].as_str() == Some("audio"));

        Ok(Self {
            resolution,
            duration,
            codecs,
            has_audio,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const FFPROBE_OUTPUT: &str = r#"{
        "streams": [
            {"index": 0, "codec_name": "h264", "codec_type": "video", "width": 1920, "height": 1080, "r_frame_rate": "30/1"},
            {"index": 1, "codec_name": "aac", "codec_type": "audio", "sample_rate": "48000"}
        ],
        "format": {"filename": "clip.mp4", "duration": "62.500000"}
    }"#;

    #[test]
    fn test_resolution_parsing() {
        assert_eq!(
            "1920x1080".parse::<Resolution>().unwrap(),
            Resolution {
                width: 1920,
                height: 1080
            }
        );
        assert!("1920".parse::<Resolution>().is_err());
        assert!("0x1080".parse::<Resolution>().is_err());
        assert!("axb".parse::<Resolution>().is_err());
    }

    #[test]
    fn test_descriptor_json() {
        let descriptor =
            MediaDescriptor::from_json(r#"{"resolution": "1280x720", "duration": 12.5}"#).unwrap();
        assert_eq!(
            descriptor.resolution,
            Some(Resolution {
                width: 1280,
                height: 720
            })
        );
        assert_eq!(descriptor.duration, Some(12.5));
        assert!(descriptor.codecs.is_empty());

        let serialized = serde_json::to_value(&descriptor).unwrap();
        assert_eq!(serialized["resolution"], "1280x720");
    }

    #[test]
    fn test_descriptor_rejects_bad_resolution() {
        assert!(MediaDescriptor::from_json(r#"{"resolution": "wide"}"#).is_err());
    }

    #[test]
    fn test_from_ffprobe_json() {
        let descriptor = MediaDescriptor::from_ffprobe_json(FFPROBE_OUTPUT).unwrap();
        assert_eq!(descriptor.resolution.unwrap().to_string(), "1920x1080");
        assert_eq!(descriptor.duration, Some(62.5));
        assert_eq!(descriptor.codecs, vec!["h264", "aac"]);
        assert!(descriptor.has_audio);
    }

    #[test]
    fn test_from_ffprobe_audio_only() {
        let json = r#"{"streams": [{"codec_name": "mp3", "codec_type": "audio"}], "format": {}}"#;
        let descriptor = MediaDescriptor::from_ffprobe_json(json).unwrap();
        assert_eq!(descriptor.resolution, None);
        assert_eq!(descriptor.duration, None);
    }
}
