use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::HeaderMap;
use rustc_hash::FxHashSet;
use scraper::{Html, Selector};
use tracing::debug;
use url::Url;

use super::error::ExtractorError;
use super::hls_extractor::{HlsExtractor, HlsOptions};
use crate::media::{StreamFormat, StreamInfo};
use crate::utils::determine_ext;

/// A `video` or `audio` entry of a SMIL document.
#[derive(Debug, Clone, PartialEq)]
pub struct SmilMedium {
    pub src: String,
    // kbps
    pub bitrate: Option<u64>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

/// Parsed SMIL document: the base every relative `src` is resolved against,
/// and its media entries in document order with duplicates removed.
#[derive(Debug, Clone, PartialEq)]
pub struct SmilDocument {
    pub base: String,
    pub media: Vec<SmilMedium>,
}

fn selector(css: &str) -> Result<Selector, ExtractorError> {
    Selector::parse(css).map_err(|e| ExtractorError::SmilError(e.to_string()))
}

fn number_attr<T: std::str::FromStr>(element: &scraper::node::Element, names: &[&str]) -> Option<T> {
    names
        .iter()
        .find_map(|name| element.attr(name))
        .and_then(|value| value.trim().parse().ok())
}

/// Parses a SMIL document. The markup parser lowercases attribute names, so
/// `systemBitrate` is looked up as `systembitrate`.
pub fn parse_smil(text: &str, smil_url: &str) -> Result<SmilDocument, ExtractorError> {
    let document = Html::parse_document(text);

    let base = document
        .select(&selector("meta")?)
        .find_map(|meta| {
            let meta = meta.value();
            meta.attr("base").or_else(|| match meta.attr("name") {
                Some(name) if name.eq_ignore_ascii_case("httpBase") => meta.attr("content"),
                _ => None,
            })
        })
        .unwrap_or(smil_url)
        .to_string();

    let mut seen = FxHashSet::default();
    let media = document
        .select(&selector("video[src], audio[src]")?)
        .filter_map(|node| {
            let element = node.value();
            let src = element.attr("src")?.trim();
            if src.is_empty() || !seen.insert(src.to_string()) {
                return None;
            }
            Some(SmilMedium {
                src: src.to_string(),
                bitrate: number_attr::<f64>(element, &["system-bitrate", "systembitrate"])
                    .map(|bps| (bps / 1000.0) as u64),
                width: number_attr(element, &["width"]),
                height: number_attr(element, &["height"]),
            })
        })
        .collect();

    Ok(SmilDocument { base, media })
}

fn resolve_src(base: &str, src: &str) -> Result<String, ExtractorError> {
    if src.starts_with("http://") || src.starts_with("https://") || src.starts_with("rtmp") {
        return Ok(src.to_string());
    }
    let base = Url::parse(base).map_err(|e| ExtractorError::SmilError(e.to_string()))?;
    base.join(src)
        .map(String::from)
        .map_err(|e| ExtractorError::SmilError(e.to_string()))
}

#[async_trait]
pub trait SmilExtractor: HlsExtractor + Sync {
    async fn extract_smil_formats(
        &self,
        client: &Client,
        headers: Option<HeaderMap>,
        smil_url: &str,
    ) -> Result<Vec<StreamInfo>, ExtractorError> {
        let text = client
            .get(smil_url)
            .headers(headers.clone().unwrap_or_default())
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let document = parse_smil(&text, smil_url)?;
        debug!(
            "SMIL {} lists {} media with base {}",
            smil_url,
            document.media.len(),
            document.base
        );

        let mut formats = Vec::new();
        for (index, medium) in document.media.into_iter().enumerate() {
            let format_id = match medium.bitrate {
                Some(bitrate) if bitrate > 0 => format!("smil-{bitrate}"),
                _ => format!("smil-{index}"),
            };

            if document.base.starts_with("rtmp") {
                let mut info = StreamInfo::direct(document.base.as_str(), StreamFormat::Direct);
                info.format_id = format_id.replacen("smil", "rtmp", 1);
                info.extras = Some(serde_json::json!({ "play_path": medium.src }));
                apply_medium(&mut info, &medium);
                formats.push(info);
                continue;
            }

            let src_url = resolve_src(&document.base, &medium.src)?;
            let ext = determine_ext(&src_url);

            if ext.as_deref() == Some("m3u8") {
                let options = HlsOptions {
                    live: false,
                    fatal: false,
                };
                formats.extend(
                    self.extract_hls_stream(client, headers.clone(), &src_url, options)
                        .await?,
                );
                continue;
            }

            let stream_format = ext
                .as_deref()
                .map(StreamFormat::from_extension)
                .unwrap_or(StreamFormat::Direct);
            let mut info = StreamInfo::direct(src_url, stream_format);
            info.format_id = format_id;
            apply_medium(&mut info, &medium);
            formats.push(info);
        }

        Ok(formats)
    }
}

fn apply_medium(info: &mut StreamInfo, medium: &SmilMedium) {
    info.bitrate = medium.bitrate.unwrap_or(0);
    info.width = medium.width;
    info.height = medium.height;
    if let (Some(w), Some(h)) = (medium.width, medium.height) {
        info.quality = format!("{w}x{h}");
    }
}
