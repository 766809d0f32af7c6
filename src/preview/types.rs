use crate::id::PreviewId;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use url::Url;

/// Failures while retrieving a page. None of these reach callers of
/// `fetch_metadata`; they only show up in logs.
#[derive(thiserror::Error, Debug)]
pub enum FetchError {
    #[error("reqwest error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("unexpected status {0}")]
    Status(reqwest::StatusCode),

    #[error("body is not valid utf-8")]
    Encoding(#[from] std::string::FromUtf8Error),
}

/// `og:type` classification of a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PreviewType {
    #[serde(rename = "product")]
    Product,
    #[serde(rename = "website")]
    Website,
    #[serde(rename = "article")]
    Article,
    #[serde(rename = "book")]
    Book,
    #[serde(rename = "profile")]
    Profile,
    #[default]
    #[serde(rename = "unknown")]
    Unknown,
    #[serde(rename = "video.movie")]
    Movie,
    #[serde(rename = "video.tv_show")]
    TvShow,
    #[serde(rename = "video.other")]
    Video,
    #[serde(rename = "music.song")]
    Song,
    #[serde(rename = "music.album")]
    Album,
    #[serde(rename = "music.playlist")]
    Playlist,
    #[serde(rename = "music.radio_station")]
    RadioStation,
}

impl PreviewType {
    pub const ALL: [PreviewType; 13] = [
        PreviewType::Product,
        PreviewType::Website,
        PreviewType::Article,
        PreviewType::Book,
        PreviewType::Profile,
        PreviewType::Unknown,
        PreviewType::Movie,
        PreviewType::TvShow,
        PreviewType::Video,
        PreviewType::Song,
        PreviewType::Album,
        PreviewType::Playlist,
        PreviewType::RadioStation,
    ];

    /// The `og:type` value this variant is matched against.
    pub fn as_str(&self) -> &'static str {
        match self {
            PreviewType::Product => "product",
            PreviewType::Website => "website",
            PreviewType::Article => "article",
            PreviewType::Book => "book",
            PreviewType::Profile => "profile",
            PreviewType::Unknown => "unknown",
            PreviewType::Movie => "video.movie",
            PreviewType::TvShow => "video.tv_show",
            PreviewType::Video => "video.other",
            PreviewType::Song => "music.song",
            PreviewType::Album => "music.album",
            PreviewType::Playlist => "music.playlist",
            PreviewType::RadioStation => "music.radio_station",
        }
    }

    /// Exact, case-sensitive lookup. Anything unrecognized is `Unknown`.
    pub fn from_og_type(value: &str) -> PreviewType {
        value.parse().unwrap_or_default()
    }
}

impl FromStr for PreviewType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PreviewType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or(())
    }
}

impl std::fmt::Display for PreviewType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything extracted from one page.
///
/// Fields are fixed at construction; only the content type can be changed
/// afterwards, through [`PreviewRecord::reclassify`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PreviewRecord {
    id: PreviewId,
    url: Url,
    content_type: PreviewType,
    site_name: Option<String>,
    title: Option<String>,
    description: Option<String>,
    #[serde(rename = "imageURL")]
    image_url: Option<Url>,
    #[serde(rename = "videoURL")]
    video_url: Option<Url>,
    locale: Option<String>,
    price: Option<String>,
    currency: Option<String>,
}

/// Field values gathered by the extractor before a record is minted.
#[derive(Debug, Clone, Default)]
pub struct PreviewFields {
    pub content_type: PreviewType,
    pub site_name: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<Url>,
    pub video_url: Option<Url>,
    pub locale: Option<String>,
    pub price: Option<String>,
    pub currency: Option<String>,
}

impl PreviewRecord {
    pub fn new(url: Url, fields: PreviewFields) -> Self {
        Self {
            id: PreviewId::generate(),
            url,
            content_type: fields.content_type,
            site_name: fields.site_name,
            title: fields.title,
            description: fields.description,
            image_url: fields.image_url,
            video_url: fields.video_url,
            locale: fields.locale,
            price: fields.price,
            currency: fields.currency,
        }
    }

    pub fn reclassify(&mut self, content_type: PreviewType) {
        self.content_type = content_type;
    }

    pub fn id(&self) -> &PreviewId {
        &self.id
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn content_type(&self) -> PreviewType {
        self.content_type
    }

    pub fn site_name(&self) -> Option<&str> {
        self.site_name.as_deref()
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn image_url(&self) -> Option<&Url> {
        self.image_url.as_ref()
    }

    pub fn video_url(&self) -> Option<&Url> {
        self.video_url.as_ref()
    }

    pub fn locale(&self) -> Option<&str> {
        self.locale.as_deref()
    }

    pub fn price(&self) -> Option<&str> {
        self.price.as_deref()
    }

    pub fn currency(&self) -> Option<&str> {
        self.currency.as_deref()
    }

    /// Returns true if any optional field was filled
    pub fn has_any_data(&self) -> bool {
        self.site_name.is_some()
            || self.title.is_some()
            || self.description.is_some()
            || self.image_url.is_some()
            || self.video_url.is_some()
            || self.locale.is_some()
            || self.price.is_some()
            || self.currency.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_og_type_lookup_is_exact() {
        assert_eq!(PreviewType::from_og_type("video.movie"), PreviewType::Movie);
        assert_eq!(PreviewType::from_og_type("music.radio_station"), PreviewType::RadioStation);
        assert_eq!(PreviewType::from_og_type("Article"), PreviewType::Unknown);
        assert_eq!(PreviewType::from_og_type("gibberish"), PreviewType::Unknown);
        assert_eq!(PreviewType::from_og_type(""), PreviewType::Unknown);
    }

    #[test]
    fn test_serde_uses_og_values() {
        let json = serde_json::to_string(&PreviewType::TvShow).unwrap();
        assert_eq!(json, "\"video.tv_show\"");
        for t in PreviewType::ALL {
            let back: PreviewType = serde_json::from_str(&format!("\"{}\"", t)).unwrap();
            assert_eq!(back, t);
        }
    }

    #[test]
    fn test_reclassify_only_touches_content_type() {
        let url = Url::parse("https://example.com/item").unwrap();
        let mut record = PreviewRecord::new(
            url,
            PreviewFields {
                title: Some("Item".into()),
                ..Default::default()
            },
        );
        let id = record.id().clone();

        record.reclassify(PreviewType::Product);

        assert_eq!(record.content_type(), PreviewType::Product);
        assert_eq!(record.title(), Some("Item"));
        assert_eq!(record.id(), &id);
    }

    #[test]
    fn test_record_json_keys() {
        let url = Url::parse("https://example.com").unwrap();
        let record = PreviewRecord::new(
            url,
            PreviewFields {
                image_url: Some(Url::parse("https://example.com/a.png").unwrap()),
                ..Default::default()
            },
        );
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["contentType"], "unknown");
        assert_eq!(value["imageURL"], "https://example.com/a.png");
        assert!(value["siteName"].is_null());
        assert!(value["id"].is_string());
    }
}
