use regex::Regex;
use reqwest::Client;
use std::sync::LazyLock;
use tracing::debug;
use url::Url;

pub static URL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://sportdeutschland\.tv/((?:[^/]+/)?[^?#/&]+)").unwrap()
});

use crate::{
    extractor::{
        error::ExtractorError,
        format_sort::sort_formats,
        hls_extractor::{HlsExtractor, HlsOptions},
        platform_extractor::{Extractor, PlatformExtractor},
        platforms::sportdeutschland::models::{
            AccessTokenResponse, AssetMetadata, LivestreamInfo, LivestreamKind,
        },
        smil_extractor::SmilExtractor,
    },
    media::{MediaDescriptor, StreamFormat, StreamInfo},
    utils::{determine_ext, parse_iso8601},
};

/// Hosts the extractor talks to. Both can be overridden through the `api_base`
/// and `stream_base` keys of the extractor extras.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SportDeutschlandEndpoints {
    pub api_base: String,
    pub stream_base: String,
}

impl Default for SportDeutschlandEndpoints {
    fn default() -> Self {
        Self {
            api_base: "https://api.sportdeutschland.tv".to_string(),
            stream_base: "https://stream.mux.com".to_string(),
        }
    }
}

impl SportDeutschlandEndpoints {
    pub fn from_extras(extras: Option<&serde_json::Value>) -> Self {
        let mut endpoints = Self::default();
        let Some(extras) = extras else {
            return endpoints;
        };
        if let Some(api_base) = extras.get("api_base").and_then(|v| v.as_str()) {
            endpoints.api_base = api_base.trim_end_matches('/').to_string();
        }
        if let Some(stream_base) = extras.get("stream_base").and_then(|v| v.as_str()) {
            endpoints.stream_base = stream_base.trim_end_matches('/').to_string();
        }
        endpoints
    }
}

pub struct SportDeutschland {
    pub extractor: Extractor,
    pub endpoints: SportDeutschlandEndpoints,
}

impl SportDeutschland {
    const BASE_URL: &'static str = "https://sportdeutschland.tv";

    const ASSET_PATH: &'static str = "/api/stateless/frontend/assets/";

    pub fn new(url: String, client: Client, extras: Option<serde_json::Value>) -> Self {
        let endpoints = SportDeutschlandEndpoints::from_extras(extras.as_ref());
        Self::with_endpoints(url, client, endpoints)
    }

    pub fn with_endpoints(
        url: String,
        client: Client,
        endpoints: SportDeutschlandEndpoints,
    ) -> Self {
        let mut extractor = Extractor::new("SportDeutschland", url, client);
        extractor.add_header(reqwest::header::ORIGIN.as_str(), Self::BASE_URL);
        extractor.add_header(reqwest::header::REFERER.as_str(), Self::BASE_URL);
        Self {
            extractor,
            endpoints,
        }
    }

    /// The `category/slug` part of the page URL.
    pub fn extract_display_id(&self) -> Result<String, ExtractorError> {
        URL_REGEX
            .captures(&self.extractor.url)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
            .ok_or_else(|| ExtractorError::InvalidUrl(self.extractor.url.clone()))
    }

    pub async fn fetch_asset(&self, display_id: &str) -> Result<AssetMetadata, ExtractorError> {
        let api_url = format!("{}{}{}", self.endpoints.api_base, Self::ASSET_PATH, display_id);
        debug!("Fetching asset metadata from {}", api_url);

        let body = self
            .extractor
            .get(&api_url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        AssetMetadata::from_body(&body)
    }

    fn token_url(&self, asset_id: &str) -> Result<Url, ExtractorError> {
        let mut url = Url::parse(&self.endpoints.api_base)
            .map_err(|e| ExtractorError::InvalidUrl(format!("{}: {e}", self.endpoints.api_base)))?;
        url.path_segments_mut()
            .map_err(|_| ExtractorError::InvalidUrl(self.endpoints.api_base.clone()))?
            .pop_if_empty()
            .extend(["api", "frontend", "asset-token", asset_id]);
        Ok(url)
    }

    async fn request_access_token(
        &self,
        asset_id: &str,
        livestream: &LivestreamInfo,
    ) -> Result<String, ExtractorError> {
        let url = self.token_url(asset_id)?;
        debug!("Determining asset access token via {}", url);

        self.extractor
            .get(url.as_str())
            .query(&[
                ("type", livestream.kind.as_str()),
                ("playback_id", livestream.src.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json::<AccessTokenResponse>()
            .await?
            .into_token()
    }

    /// Fetches the playback token for a `mux_live` stream. Every failure of
    /// this call is reported as [`ExtractorError::TokenFetch`].
    pub async fn fetch_access_token(
        &self,
        display_id: &str,
        asset_id: &str,
        livestream: &LivestreamInfo,
    ) -> Result<String, ExtractorError> {
        self.request_access_token(asset_id, livestream)
            .await
            .map_err(|e| ExtractorError::TokenFetch {
                display_id: display_id.to_string(),
                source: Box::new(e),
            })
    }

    /// Works out where the stream of `asset` lives.
    pub async fn resolve_stream_url(
        &self,
        display_id: &str,
        asset: &AssetMetadata,
    ) -> Result<String, ExtractorError> {
        let livestream = asset
            .livestream
            .as_ref()
            .ok_or_else(|| ExtractorError::NoLivestream(display_id.to_string()))?;
        debug!("Livestream type {} with src {}", livestream.kind, livestream.src);

        match &livestream.kind {
            LivestreamKind::MuxLive => {
                let token = self
                    .fetch_access_token(display_id, &asset.id, livestream)
                    .await?;
                Ok(format!(
                    "{}/{}.m3u8?token={}",
                    self.endpoints.stream_base, livestream.src, token
                ))
            }
            LivestreamKind::Smil => Ok(livestream.src.clone()),
            LivestreamKind::Unsupported(kind) => {
                Err(ExtractorError::UnsupportedStreamType(kind.clone()))
            }
        }
    }

    pub async fn extract_formats(
        &self,
        display_id: &str,
        stream_url: &str,
    ) -> Result<Vec<StreamInfo>, ExtractorError> {
        let client = &self.extractor.client;
        let headers = Some(self.extractor.get_platform_headers().clone());

        let ext = determine_ext(stream_url);
        let formats = match ext.as_deref() {
            Some("smil") => {
                let formats = self.extract_smil_formats(client, headers, stream_url).await?;
                if formats.is_empty() {
                    return Err(ExtractorError::NoStreamsFound);
                }
                formats
            }
            Some("m3u8") => {
                let options = HlsOptions {
                    live: true,
                    fatal: false,
                };
                let formats = self
                    .extract_hls_stream(client, headers, stream_url, options)
                    .await?;
                if formats.is_empty() {
                    return Err(ExtractorError::NotLive(display_id.to_string()));
                }
                formats
            }
            other => vec![StreamInfo::direct(
                stream_url,
                other
                    .map(StreamFormat::from_extension)
                    .unwrap_or(StreamFormat::Direct),
            )],
        };

        Ok(formats)
    }

    pub async fn resolve(&self) -> Result<MediaDescriptor, ExtractorError> {
        let display_id = self.extract_display_id()?;
        debug!("Extracted display ID: {}", display_id);

        let asset = self.fetch_asset(&display_id).await?;
        let title = asset.name.trim().to_string();

        let stream_url = self.resolve_stream_url(&display_id, &asset).await?;
        debug!("Stream URL: {}", stream_url);

        let mut formats = self.extract_formats(&display_id, &stream_url).await?;
        sort_formats(&mut formats);

        let timestamp = asset.content_start_date.as_deref().and_then(parse_iso8601);
        let duration = timestamp.and_then(|start| {
            asset
                .content_end_date
                .as_deref()
                .and_then(parse_iso8601)
                .map(|end| end - start)
        });

        Ok(MediaDescriptor {
            id: asset.id,
            display_id,
            title,
            description: asset.description,
            formats,
            thumbnail: asset.image_url,
            timestamp,
            duration,
        })
    }
}

impl HlsExtractor for SportDeutschland {}

impl SmilExtractor for SportDeutschland {}

#[async_trait::async_trait]
impl PlatformExtractor for SportDeutschland {
    fn get_extractor(&self) -> &Extractor {
        &self.extractor
    }

    async fn extract(&self) -> Result<MediaDescriptor, ExtractorError> {
        self.resolve().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tracing::Level;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::extractor::default::default_client;

    const PAGE_URL: &str =
        "https://sportdeutschland.tv/badminton/re-live-deutsche-meisterschaften?playlistId=0";
    const DISPLAY_ID: &str = "badminton/re-live-deutsche-meisterschaften";
    const ASSET_PATH: &str =
        "/api/stateless/frontend/assets/badminton/re-live-deutsche-meisterschaften";

    const MASTER: &str = "#EXTM3U
#EXT-X-STREAM-INF:BANDWIDTH=5000000,RESOLUTION=1920x1080
1080.m3u8
#EXT-X-STREAM-INF:BANDWIDTH=800000,RESOLUTION=640x360
360.m3u8
";

    fn mocked(server: &MockServer, url: &str) -> SportDeutschland {
        SportDeutschland::with_endpoints(
            url.to_string(),
            Client::new(),
            SportDeutschlandEndpoints {
                api_base: server.uri(),
                stream_base: server.uri(),
            },
        )
    }

    fn asset(livestream: serde_json::Value) -> serde_json::Value {
        json!({
            "id": "asset-1",
            "name": "  Re-live: Deutsche Meisterschaften  ",
            "description": "Halbfinals",
            "image_url": "https://img.sportdeutschland.tv/a.jpg",
            "content_start_date": "2021-01-01T00:00:00Z",
            "content_end_date": "2021-01-01T01:00:00Z",
            "livestream": livestream,
        })
    }

    async fn mount_asset(server: &MockServer, body: serde_json::Value) {
        Mock::given(method("GET"))
            .and(path(ASSET_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .expect(1)
            .mount(server)
            .await;
    }

    async fn mount_token(server: &MockServer, playback_id: &str) {
        Mock::given(method("GET"))
            .and(path("/api/frontend/asset-token/asset-1"))
            .and(query_param("type", "mux_live"))
            .and(query_param("playback_id", playback_id))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token": "tok" })))
            .expect(1)
            .mount(server)
            .await;
    }

    async fn api_calls(server: &MockServer) -> usize {
        server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter(|r| r.url.path().starts_with("/api/"))
            .count()
    }

    #[test]
    fn display_id_from_url() {
        let cases = [
            (PAGE_URL, DISPLAY_ID),
            (
                "https://sportdeutschland.tv/freeride-world-tour-2021-fieberbrunn-oesterreich",
                "freeride-world-tour-2021-fieberbrunn-oesterreich",
            ),
            ("http://sportdeutschland.tv/tischtennis/finale#chat", "tischtennis/finale"),
        ];
        for (url, expected) in cases {
            let extractor = SportDeutschland::new(url.to_string(), Client::new(), None);
            assert_eq!(extractor.extract_display_id().unwrap(), expected);
        }
    }

    #[test]
    fn foreign_url_is_rejected() {
        for url in ["https://example.com/badminton/x", "https://sportdeutschland.tv/"] {
            let extractor = SportDeutschland::new(url.to_string(), Client::new(), None);
            let err = extractor.extract_display_id().unwrap_err();
            assert!(matches!(err, ExtractorError::InvalidUrl(_)));
            assert!(err.is_malformed_input());
        }
    }

    #[test]
    fn endpoints_from_extras() {
        let extras = json!({ "api_base": "http://localhost:8080/", "stream_base": "http://cdn" });
        let endpoints = SportDeutschlandEndpoints::from_extras(Some(&extras));
        assert_eq!(endpoints.api_base, "http://localhost:8080");
        assert_eq!(endpoints.stream_base, "http://cdn");
        assert_eq!(
            SportDeutschlandEndpoints::from_extras(None),
            SportDeutschlandEndpoints::default()
        );
    }

    #[tokio::test]
    async fn mux_live_fetches_token_and_builds_stream_url() {
        let server = MockServer::start().await;
        mount_asset(&server, asset(json!({ "src": "pb&1 x", "type": "mux_live" }))).await;
        mount_token(&server, "pb&1 x").await;

        let extractor = SportDeutschland::with_endpoints(
            PAGE_URL.to_string(),
            Client::new(),
            SportDeutschlandEndpoints {
                api_base: server.uri(),
                ..Default::default()
            },
        );
        let asset = extractor.fetch_asset(DISPLAY_ID).await.unwrap();
        let stream_url = extractor
            .resolve_stream_url(DISPLAY_ID, &asset)
            .await
            .unwrap();

        assert_eq!(stream_url, "https://stream.mux.com/pb&1 x.m3u8?token=tok");
        assert_eq!(api_calls(&server).await, 2);
    }

    #[tokio::test]
    async fn mux_live_resolves_to_sorted_hls_formats() {
        let server = MockServer::start().await;
        mount_asset(&server, asset(json!({ "src": "pb1", "type": "mux_live" }))).await;
        mount_token(&server, "pb1").await;
        Mock::given(method("GET"))
            .and(path("/pb1.m3u8"))
            .and(query_param("token", "tok"))
            .respond_with(ResponseTemplate::new(200).set_body_string(MASTER))
            .expect(1)
            .mount(&server)
            .await;

        let media = mocked(&server, PAGE_URL).extract().await.unwrap();

        assert_eq!(media.id, "asset-1");
        assert_eq!(media.display_id, DISPLAY_ID);
        assert_eq!(media.title, "Re-live: Deutsche Meisterschaften");
        assert_eq!(media.description.as_deref(), Some("Halbfinals"));
        assert_eq!(
            media.thumbnail.as_deref(),
            Some("https://img.sportdeutschland.tv/a.jpg")
        );
        assert_eq!(media.timestamp, Some(1609459200));
        assert_eq!(media.duration, Some(3600));

        assert_eq!(media.formats.len(), 2);
        assert_eq!(media.formats[0].height, Some(360));
        let best = media.best_format().unwrap();
        assert_eq!(best.height, Some(1080));
        assert_eq!(best.url, format!("{}/1080.m3u8", server.uri()));
        assert_eq!(best.priority, 1);
        assert_eq!(api_calls(&server).await, 2);
    }

    #[tokio::test]
    async fn smil_src_is_used_verbatim_without_token_call() {
        let server = MockServer::start().await;
        let src = "https://vod.sportdeutschland.tv/archive/final.mp4?sig=a%20b";
        mount_asset(&server, asset(json!({ "src": src, "type": "smil" }))).await;

        let media = mocked(&server, PAGE_URL).extract().await.unwrap();

        assert_eq!(media.formats.len(), 1);
        assert_eq!(media.formats[0].url, src);
        assert_eq!(media.formats[0].stream_format, StreamFormat::Mp4);
        assert_eq!(server.received_requests().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn smil_playlist_is_expanded() {
        let server = MockServer::start().await;
        let src = format!("{}/live/event.smil", server.uri());
        mount_asset(&server, asset(json!({ "src": src, "type": "smil" }))).await;
        Mock::given(method("GET"))
            .and(path("/live/event.smil"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"<smil><head><meta base="https://edge.example.com/event/"/></head><body><switch>
                <video src="hd.mp4" system-bitrate="3000000" width="1920" height="1080"/>
                <video src="sd.mp4" system-bitrate="900000" width="640" height="360"/>
                </switch></body></smil>"#,
            ))
            .expect(1)
            .mount(&server)
            .await;

        let media = mocked(&server, PAGE_URL).extract().await.unwrap();

        let urls: Vec<_> = media.formats.iter().map(|f| f.url.as_str()).collect();
        assert_eq!(
            urls,
            [
                "https://edge.example.com/event/sd.mp4",
                "https://edge.example.com/event/hd.mp4"
            ]
        );
        assert_eq!(media.formats[1].bitrate, 3000);
        assert_eq!(media.formats[1].format_id, "smil-3000");
        assert_eq!(api_calls(&server).await, 1);
    }

    #[tokio::test]
    async fn empty_smil_has_no_streams() {
        let server = MockServer::start().await;
        let src = format!("{}/live/event.smil", server.uri());
        mount_asset(&server, asset(json!({ "src": src, "type": "smil" }))).await;
        Mock::given(method("GET"))
            .and(path("/live/event.smil"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<smil><body/></smil>"))
            .mount(&server)
            .await;

        let err = mocked(&server, PAGE_URL).extract().await.unwrap_err();
        assert!(matches!(err, ExtractorError::NoStreamsFound));
    }

    #[tokio::test]
    async fn null_livestream_stops_after_metadata() {
        let server = MockServer::start().await;
        mount_asset(&server, asset(serde_json::Value::Null)).await;

        let err = mocked(&server, PAGE_URL).extract().await.unwrap_err();

        assert!(matches!(err, ExtractorError::NoLivestream(ref id) if id == DISPLAY_ID));
        assert_eq!(server.received_requests().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn unknown_livestream_type_is_unsupported() {
        let server = MockServer::start().await;
        mount_asset(&server, asset(json!({ "src": "x", "type": "unknown_type" }))).await;

        let err = mocked(&server, PAGE_URL).extract().await.unwrap_err();

        assert!(matches!(err, ExtractorError::UnsupportedStreamType(ref t) if t == "unknown_type"));
        assert_eq!(server.received_requests().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn failed_token_call_is_reported_as_token_error() {
        let server = MockServer::start().await;
        mount_asset(&server, asset(json!({ "src": "pb", "type": "mux_live" }))).await;
        Mock::given(method("GET"))
            .and(path("/api/frontend/asset-token/asset-1"))
            .respond_with(ResponseTemplate::new(403))
            .expect(1)
            .mount(&server)
            .await;

        let err = mocked(&server, PAGE_URL).extract().await.unwrap_err();

        match err {
            ExtractorError::TokenFetch { display_id, source } => {
                assert_eq!(display_id, DISPLAY_ID);
                assert!(matches!(*source, ExtractorError::HttpError(_)));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn offline_hls_is_not_live() {
        let server = MockServer::start().await;
        mount_asset(&server, asset(json!({ "src": "pb1", "type": "mux_live" }))).await;
        mount_token(&server, "pb1").await;
        Mock::given(method("GET"))
            .and(path("/pb1.m3u8"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = mocked(&server, PAGE_URL).extract().await.unwrap_err();

        assert!(matches!(err, ExtractorError::NotLive(ref id) if id == DISPLAY_ID));
    }

    #[tokio::test]
    async fn start_date_alone_sets_only_timestamp() {
        let server = MockServer::start().await;
        let mut body = asset(json!({ "src": "https://cdn.example.com/stream", "type": "smil" }));
        body["content_end_date"] = json!("not a date");
        mount_asset(&server, body).await;

        let media = mocked(&server, PAGE_URL).extract().await.unwrap();

        assert_eq!(media.timestamp, Some(1609459200));
        assert_eq!(media.duration, None);
        assert_eq!(media.formats[0].stream_format, StreamFormat::Direct);
    }

    #[tokio::test]
    async fn missing_start_date_drops_both() {
        let server = MockServer::start().await;
        let mut body = asset(json!({ "src": "https://cdn.example.com/a.mp4", "type": "smil" }));
        body["content_start_date"] = serde_json::Value::Null;
        mount_asset(&server, body).await;

        let media = mocked(&server, PAGE_URL).extract().await.unwrap();

        assert_eq!(media.timestamp, None);
        assert_eq!(media.duration, None);
    }

    #[tokio::test]
    async fn non_string_start_date_is_ignored() {
        let server = MockServer::start().await;
        let mut body = asset(json!({ "src": "https://cdn.example.com/a.mp4", "type": "smil" }));
        body["content_start_date"] = json!(1609459200);
        mount_asset(&server, body).await;

        let media = mocked(&server, PAGE_URL).extract().await.unwrap();

        assert_eq!(media.timestamp, None);
        assert_eq!(media.duration, None);
        assert_eq!(media.formats.len(), 1);
    }

    #[tokio::test]
    async fn false_livestream_is_no_livestream() {
        let server = MockServer::start().await;
        mount_asset(&server, asset(json!(false))).await;

        let err = mocked(&server, PAGE_URL).extract().await.unwrap_err();

        assert!(matches!(err, ExtractorError::NoLivestream(ref id) if id == DISPLAY_ID));
    }

    #[tokio::test]
    async fn empty_metadata_body_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(ASSET_PATH))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let err = mocked(&server, PAGE_URL).extract().await.unwrap_err();

        assert!(matches!(err, ExtractorError::MissingField("name")));
        assert!(err.is_malformed_input());
    }

    #[tokio::test]
    async fn invalid_url_makes_no_request() {
        let server = MockServer::start().await;

        let err = mocked(&server, "https://example.com/foo")
            .extract()
            .await
            .unwrap_err();

        assert!(matches!(err, ExtractorError::InvalidUrl(_)));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    #[ignore]
    async fn test_sportdeutschland_extractor() {
        tracing_subscriber::fmt()
            .with_max_level(Level::DEBUG)
            .init();

        let extractor = SportDeutschland::new(
            "https://sportdeutschland.tv/freeride-world-tour-2021-fieberbrunn-oesterreich"
                .to_string(),
            default_client().unwrap(),
            None,
        );

        let media_info = extractor.extract().await;
        println!("{media_info:?}");
    }
}
