use async_trait::async_trait;
use m3u8_rs::{MasterPlaylist, MediaPlaylist, Playlist};
use reqwest::Client;
use reqwest::header::HeaderMap;
use tracing::{debug, warn};
use url::Url;

use super::error::ExtractorError;
use crate::media::{MediaFormat, StreamFormat, stream_info::StreamInfo};

/// How a playlist should be treated while extracting formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HlsOptions {
    /// The playlist belongs to a live stream; formats are tagged so the
    /// downloader keeps refreshing the playlist.
    pub live: bool,
    /// When false, fetch and parse failures yield an empty list instead of an error.
    pub fatal: bool,
}

impl Default for HlsOptions {
    fn default() -> Self {
        Self {
            live: false,
            fatal: true,
        }
    }
}

#[async_trait]
pub trait HlsExtractor {
    async fn extract_hls_stream(
        &self,
        client: &Client,
        headers: Option<HeaderMap>,
        m3u8_url: &str,
        options: HlsOptions,
    ) -> Result<Vec<StreamInfo>, ExtractorError> {
        match fetch_hls_streams(client, headers, m3u8_url, options.live).await {
            Ok(streams) => {
                debug!("Found {} hls formats in {}", streams.len(), m3u8_url);
                Ok(streams)
            }
            Err(e) if !options.fatal => {
                warn!("Failed to extract hls formats from {}: {}", m3u8_url, e);
                Ok(vec![])
            }
            Err(e) => Err(e),
        }
    }
}

async fn fetch_hls_streams(
    client: &Client,
    headers: Option<HeaderMap>,
    m3u8_url: &str,
    live: bool,
) -> Result<Vec<StreamInfo>, ExtractorError> {
    let base_url =
        Url::parse(m3u8_url).map_err(|e| ExtractorError::HlsPlaylistError(e.to_string()))?;

    let response = client
        .get(m3u8_url)
        .headers(headers.unwrap_or_default())
        .send()
        .await?
        .error_for_status()?
        .bytes()
        .await?;

    parse_hls_playlist(&response, &base_url, live)
}

/// Turns raw playlist bytes into formats. Relative variant URIs are resolved
/// against `base_url`.
pub fn parse_hls_playlist(
    bytes: &[u8],
    base_url: &Url,
    live: bool,
) -> Result<Vec<StreamInfo>, ExtractorError> {
    let playlist = m3u8_rs::parse_playlist_res(bytes)
        .map_err(|e| ExtractorError::HlsPlaylistError(e.to_string()))?;

    let extras = live.then(|| serde_json::json!({ "live": true }));

    let streams = match playlist {
        Playlist::MasterPlaylist(pl) => process_master_playlist(pl, base_url, extras),
        Playlist::MediaPlaylist(pl) => vec![process_media_playlist(&pl, base_url, live, extras)],
    };

    Ok(streams)
}

fn process_media_playlist(
    playlist: &MediaPlaylist,
    base_url: &Url,
    live: bool,
    extras: Option<serde_json::Value>,
) -> StreamInfo {
    if live && playlist.end_list {
        debug!("Live playlist {} already carries an end marker", base_url);
    }

    let media_format = if playlist
        .segments
        .iter()
        .any(|s| s.uri.contains("fmp4") || s.uri.contains(".mp4") || s.uri.contains(".m4s"))
    {
        MediaFormat::Mp4
    } else {
        MediaFormat::Ts
    };

    let mut stream = StreamInfo::direct(base_url.as_str(), StreamFormat::Hls);
    stream.format_id = "hls".to_string();
    stream.media_format = media_format;
    stream.extras = extras;
    stream
}

fn process_master_playlist(
    playlist: MasterPlaylist,
    base_url: &Url,
    extras: Option<serde_json::Value>,
) -> Vec<StreamInfo> {
    playlist
        .variants
        .into_iter()
        .filter(|variant| !variant.is_i_frame)
        .enumerate()
        .filter_map(|(index, variant)| {
            let stream_url = match base_url.join(&variant.uri) {
                Ok(url) => url,
                Err(e) => {
                    warn!("Skipping hls variant {}: {}", variant.uri, e);
                    return None;
                }
            };
            let bitrate = variant.bandwidth / 1000;
            let format_id = if bitrate > 0 {
                format!("hls-{bitrate}")
            } else {
                format!("hls-{index}")
            };

            let (width, height) = variant
                .resolution
                .map(|r| (Some(r.width as u32), Some(r.height as u32)))
                .unwrap_or((None, None));
            let quality = match (width, height) {
                (Some(w), Some(h)) => format!("{w}x{h}"),
                _ => variant.video.clone().unwrap_or_else(|| "Source".to_string()),
            };

            Some(StreamInfo {
                url: stream_url.to_string(),
                format_id,
                stream_format: StreamFormat::Hls,
                // we do not know the media format here, so we use Ts as default
                media_format: MediaFormat::Ts,
                quality,
                bitrate,
                width,
                height,
                codec: variant.codecs.unwrap_or_default(),
                fps: variant.frame_rate.unwrap_or(0.0),
                priority: 0,
                extras: extras.clone(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const MASTER: &str = "#EXTM3U
#EXT-X-STREAM-INF:BANDWIDTH=2500000,RESOLUTION=1280x720,CODECS=\"avc1.64001f,mp4a.40.2\",FRAME-RATE=30.000
rendition/720.m3u8?token=abc
#EXT-X-STREAM-INF:BANDWIDTH=800000,RESOLUTION=640x360,CODECS=\"avc1.4d401e,mp4a.40.2\"
https://cdn.example.com/360.m3u8
";

    const MEDIA: &str = "#EXTM3U
#EXT-X-VERSION:3
#EXT-X-TARGETDURATION:6
#EXT-X-MEDIA-SEQUENCE:42
#EXTINF:6.000,
segment42.ts
#EXTINF:6.000,
segment43.ts
";

    #[test]
    fn master_playlist_yields_one_format_per_variant() {
        let base = Url::parse("https://stream.mux.com/abc.m3u8?token=t").unwrap();
        let streams = parse_hls_playlist(MASTER.as_bytes(), &base, true).unwrap();

        assert_eq!(streams.len(), 2);
        assert_eq!(streams[0].url, "https://stream.mux.com/rendition/720.m3u8?token=abc");
        assert_eq!(streams[0].format_id, "hls-2500");
        assert_eq!(streams[0].height, Some(720));
        assert_eq!(streams[0].quality, "1280x720");
        assert_eq!(streams[0].codec, "avc1.64001f,mp4a.40.2");
        assert_eq!(streams[0].fps, 30.0);
        assert_eq!(streams[0].extras, Some(serde_json::json!({ "live": true })));
        assert_eq!(streams[1].url, "https://cdn.example.com/360.m3u8");
        assert_eq!(streams[1].bitrate, 800);
    }

    #[test]
    fn media_playlist_yields_the_playlist_itself() {
        let base = Url::parse("https://cdn.example.com/live/index.m3u8").unwrap();
        let streams = parse_hls_playlist(MEDIA.as_bytes(), &base, false).unwrap();

        assert_eq!(streams.len(), 1);
        assert_eq!(streams[0].url, "https://cdn.example.com/live/index.m3u8");
        assert_eq!(streams[0].media_format, MediaFormat::Ts);
        assert_eq!(streams[0].extras, None);
    }

    #[test]
    fn garbage_is_a_playlist_error() {
        let base = Url::parse("https://cdn.example.com/index.m3u8").unwrap();
        let err = parse_hls_playlist(b"<html>offline</html>", &base, true).unwrap_err();
        assert!(matches!(err, ExtractorError::HlsPlaylistError(_)));
    }
}
