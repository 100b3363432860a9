use std::fmt;

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::extractor::error::ExtractorError;

/// Raw body of `/api/stateless/frontend/assets/{display_id}`.
#[derive(Debug, Default, Deserialize)]
pub struct AssetResponse {
    pub id: Option<String>,
    pub name: Option<String>,
    #[serde(default, deserialize_with = "string_or_none")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "string_or_none")]
    pub image_url: Option<String>,
    #[serde(default, deserialize_with = "string_or_none")]
    pub content_start_date: Option<String>,
    #[serde(default, deserialize_with = "string_or_none")]
    pub content_end_date: Option<String>,
    /// Kept raw: the API uses several falsy values for "no livestream".
    #[serde(default)]
    pub livestream: Option<Value>,
}

/// Optional metadata fields of any non-string type are read as absent.
fn string_or_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        _ => None,
    })
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct LivestreamResponse {
    pub src: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

/// Raw body of `/api/frontend/asset-token/{asset_id}`.
#[derive(Debug, Default, Deserialize)]
pub struct AccessTokenResponse {
    pub token: Option<String>,
}

/// Stream resolution strategy selected by the livestream `type` tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LivestreamKind {
    /// `src` is a Mux playback id, playable only with an access token.
    MuxLive,
    /// `src` is a directly addressable playlist URL.
    Smil,
    Unsupported(String),
}

impl LivestreamKind {
    pub fn as_str(&self) -> &str {
        match self {
            LivestreamKind::MuxLive => "mux_live",
            LivestreamKind::Smil => "smil",
            LivestreamKind::Unsupported(tag) => tag,
        }
    }
}

impl From<&str> for LivestreamKind {
    fn from(tag: &str) -> Self {
        match tag {
            "mux_live" => LivestreamKind::MuxLive,
            "smil" => LivestreamKind::Smil,
            other => LivestreamKind::Unsupported(other.to_string()),
        }
    }
}

impl fmt::Display for LivestreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LivestreamInfo {
    pub src: String,
    pub kind: LivestreamKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetMetadata {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub content_start_date: Option<String>,
    pub content_end_date: Option<String>,
    /// `None` when the API sent no livestream, `null` or an empty object.
    pub livestream: Option<LivestreamInfo>,
}

impl AssetMetadata {
    /// Decodes an asset response. An empty body or `null` is read as `{}`,
    /// which then fails on the first required field.
    pub fn from_body(body: &str) -> Result<Self, ExtractorError> {
        let response = if body.trim().is_empty() {
            AssetResponse::default()
        } else {
            serde_json::from_str::<Option<AssetResponse>>(body)?.unwrap_or_default()
        };
        response.try_into()
    }
}

impl TryFrom<AssetResponse> for AssetMetadata {
    type Error = ExtractorError;

    fn try_from(value: AssetResponse) -> Result<Self, Self::Error> {
        let name = value.name.ok_or(ExtractorError::MissingField("name"))?;
        let id = value.id.ok_or(ExtractorError::MissingField("id"))?;

        let livestream = match value.livestream.filter(|v| !is_falsy(v)) {
            None => None,
            Some(raw) => match serde_json::from_value::<LivestreamResponse>(raw)? {
                LivestreamResponse {
                    src: None,
                    kind: None,
                } => None,
                LivestreamResponse { src, kind } => Some(LivestreamInfo {
                    src: src.ok_or(ExtractorError::MissingField("livestream.src"))?,
                    kind: kind
                        .as_deref()
                        .map(LivestreamKind::from)
                        .ok_or(ExtractorError::MissingField("livestream.type"))?,
                }),
            },
        };

        Ok(Self {
            id,
            name,
            description: value.description,
            image_url: value.image_url,
            content_start_date: value.content_start_date,
            content_end_date: value.content_end_date,
            livestream,
        })
    }
}

impl AccessTokenResponse {
    pub fn into_token(self) -> Result<String, ExtractorError> {
        self.token.ok_or(ExtractorError::MissingField("token"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_full_asset() {
        let asset = AssetMetadata::from_body(
            r#"{
                "id": "c6e2fdd01f63013854c47054d2ab776f",
                "name": " Finals ",
                "description": null,
                "image_url": "https://img.example.com/a.jpg",
                "content_start_date": "2021-01-01T00:00:00Z",
                "livestream": {"src": "playback123", "type": "mux_live", "extra": 1},
                "section": {"title": "ignored"}
            }"#,
        )
        .unwrap();

        assert_eq!(asset.id, "c6e2fdd01f63013854c47054d2ab776f");
        assert_eq!(asset.name, " Finals ");
        assert_eq!(asset.description, None);
        assert_eq!(asset.content_end_date, None);
        assert_eq!(
            asset.livestream,
            Some(LivestreamInfo {
                src: "playback123".to_string(),
                kind: LivestreamKind::MuxLive,
            })
        );
    }

    #[test]
    fn empty_body_is_missing_name() {
        for body in ["", "  ", "null", "{}"] {
            let err = AssetMetadata::from_body(body).unwrap_err();
            assert!(matches!(err, ExtractorError::MissingField("name")), "{body}");
        }
    }

    #[test]
    fn missing_id_is_rejected() {
        let err = AssetMetadata::from_body(r#"{"name": "x"}"#).unwrap_err();
        assert!(matches!(err, ExtractorError::MissingField("id")));
        assert!(err.is_malformed_input());
    }

    #[test]
    fn null_and_empty_livestream_mean_none() {
        for livestream in ["null", "{}", "false", "\"\"", "0", "[]"] {
            let body = format!(r#"{{"id": "1", "name": "x", "livestream": {livestream}}}"#);
            let asset = AssetMetadata::from_body(&body).unwrap();
            assert_eq!(asset.livestream, None);
        }
    }

    #[test]
    fn optional_fields_of_other_types_are_absent() {
        let asset = AssetMetadata::from_body(
            r#"{"id": "1", "name": "x", "description": 7, "image_url": false,
                "content_start_date": 1609459200, "content_end_date": {}, "livestream": null}"#,
        )
        .unwrap();
        assert_eq!(asset.description, None);
        assert_eq!(asset.image_url, None);
        assert_eq!(asset.content_start_date, None);
        assert_eq!(asset.content_end_date, None);
    }

    #[test]
    fn incomplete_livestream_is_rejected() {
        let err =
            AssetMetadata::from_body(r#"{"id": "1", "name": "x", "livestream": {"src": "a"}}"#)
                .unwrap_err();
        assert!(matches!(err, ExtractorError::MissingField("livestream.type")));
    }

    #[test]
    fn livestream_kind_keeps_unknown_tags() {
        assert_eq!(LivestreamKind::from("smil"), LivestreamKind::Smil);
        let kind = LivestreamKind::from("unknown_type");
        assert_eq!(kind, LivestreamKind::Unsupported("unknown_type".to_string()));
        assert_eq!(kind.to_string(), "unknown_type");
    }

    #[test]
    fn token_is_required() {
        let token = AccessTokenResponse { token: None }.into_token();
        assert!(matches!(token, Err(ExtractorError::MissingField("token"))));

        let token = AccessTokenResponse {
            token: Some("abc".to_string()),
        };
        assert_eq!(token.into_token().unwrap(), "abc");
    }
}
