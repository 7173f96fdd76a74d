use crate::error::HttpError;
use serde::Deserialize;
use serde_json::Value;

/// A media item as the shortcode page shapes it.
#[derive(Debug, Clone, Deserialize)]
pub struct Media {
    pub id: String,
    pub shortcode: String,
    pub display_url: Option<String>,
    pub is_video: Option<bool>,
    pub taken_at_timestamp: Option<i64>,
    pub owner: Option<MediaOwner>,
    pub edge_media_preview_like: Option<LikeCount>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MediaOwner {
    pub id: String,
    pub username: Option<String>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct LikeCount {
    pub count: u64,
}

/// Unwraps the `graphql.shortcode_media` envelope of a media page.
pub fn media_from_shortcode_page(body: &Value) -> Result<Media, HttpError> {
    let media = body
        .get("graphql")
        .and_then(|g| g.get("shortcode_media"))
        .ok_or_else(|| {
            HttpError::UnexpectedShape("media page missing graphql.shortcode_media".to_string())
        })?;
    Ok(serde_json::from_value(media.clone())?)
}

#[derive(Debug, Clone, Deserialize)]
pub struct Comment {
    pub id: String,
    pub text: String,
    pub created_time: Option<i64>,
    pub status: Option<String>,
}

/// Generic outcome of the social action endpoints (like, follow, save...).
#[derive(Debug, Clone, Deserialize)]
pub struct ActionStatus {
    pub status: Option<String>,
}

impl ActionStatus {
    pub fn is_ok(&self) -> bool {
        self.status.as_deref() == Some("ok")
    }
}

/// First phase of an upload: the vendor acknowledges the raw bytes with an
/// upload id the configure step refers back to.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadAck {
    pub upload_id: String,
    pub status: Option<String>,
}

/// Second phase: the configure call turns the uploaded bytes into a post
/// or story.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigureResponse {
    pub status: Option<String>,
    pub media: Option<Value>,
}

#[cfg(test)]
mod tests_media {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_media_from_shortcode_page() {
        let body = json!({
            "graphql": { "shortcode_media": {
                "id": "2366929737360789025",
                "shortcode": "CDZBg47ss4h",
                "is_video": false,
                "owner": { "id": "44059601", "username": "maluma" },
                "edge_media_preview_like": { "count": 12 }
            }}
        });

        let media = media_from_shortcode_page(&body).unwrap();
        assert_eq!(media.shortcode, "CDZBg47ss4h");
        assert_eq!(media.owner.unwrap().username.as_deref(), Some("maluma"));
        assert_eq!(media.edge_media_preview_like.unwrap().count, 12);
    }

    #[test]
    fn test_missing_envelope_is_rejected() {
        let body = json!({ "graphql": {} });
        assert!(matches!(
            media_from_shortcode_page(&body),
            Err(HttpError::UnexpectedShape(_))
        ));
    }

    #[test]
    fn test_action_status() {
        let ok: ActionStatus = serde_json::from_str(r#"{"status":"ok"}"#).unwrap();
        let fail: ActionStatus = serde_json::from_str(r#"{"status":"fail"}"#).unwrap();
        let silent: ActionStatus = serde_json::from_str("{}").unwrap();
        assert!(ok.is_ok());
        assert!(!fail.is_ok());
        assert!(!silent.is_ok());
    }
}
