use std::sync::LazyLock;

use super::error::ExtractorError;
use super::platform_extractor::PlatformExtractor;
use crate::extractor::platforms::{self, sportdeutschland::SportDeutschland};
use regex::Regex;
use reqwest::Client;

// A type alias for a thread-safe constructor function.
type ExtractorConstructor = fn(String, Client, Option<serde_json::Value>) -> Box<dyn PlatformExtractor>;

struct PlatformEntry {
    name: &'static str,
    url_pattern: &'static str,
    regex: &'static LazyLock<Regex>,
    constructor: ExtractorConstructor,
}

// Macro to create a constructor function for a given platform
macro_rules! create_constructor {
    ($name:ident, $builder:expr) => {
        fn $name(
            url: String,
            client: Client,
            extras: Option<serde_json::Value>,
        ) -> Box<dyn PlatformExtractor> {
            Box::new($builder(url, client, extras))
        }
    };
}

create_constructor!(new_sportdeutschland, SportDeutschland::new);

// Static platform registry
static PLATFORMS: &[PlatformEntry] = &[PlatformEntry {
    name: "SportDeutschland",
    url_pattern: "sportdeutschland.tv/[{category}/]{slug}",
    regex: &platforms::sportdeutschland::URL_REGEX,
    constructor: new_sportdeutschland,
}];

/// A factory for creating platform-specific extractors.
pub struct ExtractorFactory {
    client: Client,
}

impl ExtractorFactory {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Name and URL shape of every registered platform.
    pub fn supported_platforms() -> impl Iterator<Item = (&'static str, &'static str)> {
        PLATFORMS.iter().map(|p| (p.name, p.url_pattern))
    }

    pub fn create_extractor(
        &self,
        url: &str,
        extras: Option<serde_json::Value>,
    ) -> Result<Box<dyn PlatformExtractor>, ExtractorError> {
        PLATFORMS
            .iter()
            .find(|platform| platform.regex.is_match(url))
            .map(|platform| (platform.constructor)(url.to_string(), self.client.clone(), extras))
            .ok_or(ExtractorError::UnsupportedExtractor)
    }
}
