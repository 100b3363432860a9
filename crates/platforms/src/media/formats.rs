use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// How a format is delivered to the downloader.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamFormat {
    Hls,
    Smil,
    Mp4,
    Direct,
}

impl StreamFormat {
    pub fn as_str(&self) -> &str {
        match self {
            StreamFormat::Hls => "hls",
            StreamFormat::Smil => "smil",
            StreamFormat::Mp4 => "mp4",
            StreamFormat::Direct => "direct",
        }
    }

    pub fn from_extension(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "m3u8" => StreamFormat::Hls,
            "smil" => StreamFormat::Smil,
            "mp4" => StreamFormat::Mp4,
            _ => StreamFormat::Direct,
        }
    }
}

impl Display for StreamFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for StreamFormat {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "hls" => Ok(StreamFormat::Hls),
            "smil" => Ok(StreamFormat::Smil),
            "mp4" => Ok(StreamFormat::Mp4),
            "direct" => Ok(StreamFormat::Direct),
            _ => Err(()),
        }
    }
}

/// Container of the media segments, when it can be told from the playlist.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaFormat {
    Ts,
    Mp4,
    Unknown,
}

impl MediaFormat {
    pub fn as_str(&self) -> &str {
        match self {
            MediaFormat::Ts => "ts",
            MediaFormat::Mp4 => "mp4",
            MediaFormat::Unknown => "unknown",
        }
    }

    pub fn from_extension(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "ts" => MediaFormat::Ts,
            "fmp4" | "mp4" | "m4s" => MediaFormat::Mp4,
            _ => MediaFormat::Unknown,
        }
    }
}

impl Display for MediaFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for MediaFormat {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ts" => Ok(MediaFormat::Ts),
            "fmp4" | "mp4" => Ok(MediaFormat::Mp4),
            "unknown" => Ok(MediaFormat::Unknown),
            _ => Err(()),
        }
    }
}
