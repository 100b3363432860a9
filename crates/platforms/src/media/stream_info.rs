use crate::media::{StreamFormat, formats::MediaFormat};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single concrete playable variant of an asset.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct StreamInfo {
    // Url of the stream
    pub url: String,
    // Identifier unique within one descriptor, e.g. "hls-2500"
    pub format_id: String,
    pub stream_format: StreamFormat,
    pub media_format: MediaFormat,
    // Quality label, e.g. "1280x720" or "Source"
    pub quality: String,
    // Bitrate of the stream in kbps, 0 when unknown
    pub bitrate: u64,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub codec: String,
    pub fps: f64,
    // Rank after sorting, higher is better
    pub priority: u32,
    pub extras: Option<serde_json::Value>,
}

impl StreamInfo {
    /// A format that is nothing more than a URL.
    pub fn direct(url: impl Into<String>, stream_format: StreamFormat) -> Self {
        Self {
            url: url.into(),
            format_id: stream_format.as_str().to_string(),
            stream_format,
            media_format: MediaFormat::Unknown,
            quality: "Source".to_string(),
            bitrate: 0,
            width: None,
            height: None,
            codec: String::new(),
            fps: 0.0,
            priority: 0,
            extras: None,
        }
    }
}

impl fmt::Display for StreamInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {:?} ({}) - {}",
            self.format_id, self.stream_format, self.media_format, self.quality
        )?;
        if self.bitrate > 0 {
            write!(f, " @ {} kbps", self.bitrate)?;
        }
        Ok(())
    }
}
