use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractorError {
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("missing required field `{0}` in asset metadata")]
    MissingField(&'static str),
    #[error("no livestream for {0} found")]
    NoLivestream(String),
    #[error("unsupported livestream type {0}")]
    UnsupportedStreamType(String),
    #[error("not able to get the asset access token for {display_id}: {source}")]
    TokenFetch {
        display_id: String,
        #[source]
        source: Box<ExtractorError>,
    },
    #[error("livestream {0} is currently not live")]
    NotLive(String),
    #[error("http error: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("unsupported extractor")]
    UnsupportedExtractor,
    #[error("json error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("no streams found")]
    NoStreamsFound,
    #[error("hls playlist error: {0}")]
    HlsPlaylistError(String),
    #[error("smil error: {0}")]
    SmilError(String),
    #[error("http client error: {0}")]
    ClientBuild(String),
}

impl ExtractorError {
    /// The input could not be understood: bad page URL or incomplete metadata.
    pub fn is_malformed_input(&self) -> bool {
        matches!(self, Self::InvalidUrl(_) | Self::MissingField(_))
    }
}
