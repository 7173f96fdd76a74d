use crate::error::HttpError;
use crate::transport::model::PagedEnvelope;
use serde::Deserialize;
use serde_json::Value;

/// First page of a hashtag feed: the tag's metadata plus its media edge
/// collection.
#[derive(Debug, Clone)]
pub struct TagFeed {
    pub name: String,
    pub media_count: u64,
    pub media: PagedEnvelope,
}

impl TagFeed {
    pub fn from_page(body: &Value) -> Result<Self, HttpError> {
        let hashtag = body
            .get("graphql")
            .and_then(|g| g.get("hashtag"))
            .ok_or_else(|| {
                HttpError::UnexpectedShape("tag page missing graphql.hashtag".to_string())
            })?;
        let media =
            PagedEnvelope::from_response(body, &["graphql", "hashtag", "edge_hashtag_to_media"])?;
        Ok(Self {
            name: hashtag
                .get("name")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            media_count: media.count,
            media,
        })
    }
}

/// First page of a location feed.
#[derive(Debug, Clone)]
pub struct LocationFeed {
    pub id: String,
    pub name: String,
    pub media: PagedEnvelope,
}

impl LocationFeed {
    pub fn from_page(body: &Value) -> Result<Self, HttpError> {
        let location = body
            .get("graphql")
            .and_then(|g| g.get("location"))
            .ok_or_else(|| {
                HttpError::UnexpectedShape("location page missing graphql.location".to_string())
            })?;
        let media = PagedEnvelope::from_response(
            body,
            &["graphql", "location", "edge_location_to_media"],
        )?;
        Ok(Self {
            id: location
                .get("id")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            name: location
                .get("name")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            media,
        })
    }
}

/// Blended search across users, tags and places.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResult {
    #[serde(default)]
    pub users: Vec<Value>,
    #[serde(default)]
    pub hashtags: Vec<Value>,
    #[serde(default)]
    pub places: Vec<Value>,
    pub status: Option<String>,
}

/// A place row from the standalone location search endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct Venue {
    pub external_id: Option<Value>,
    pub name: Option<String>,
    pub address: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct VenueEnvelope {
    #[serde(default)]
    pub venues: Vec<Venue>,
}
