use crate::constants::{
    FOLLOWERS_QUERY_HASH, FOLLOWING_QUERY_HASH, GRAPHQL_PATH, HASHTAG_MEDIA_QUERY_HASH,
    MEDIA_COMMENTS_QUERY_HASH, USER_MEDIA_QUERY_HASH,
};
use crate::error::HttpError;
use reqwest::Method;
use serde::Deserialize;
use serde_json::{json, Value};

/// One logical call against the vendor API, before headers and signing are
/// attached by the dispatcher.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub form: Option<Vec<(String, String)>>,
    pub json: Option<Value>,
    pub multipart: Option<Vec<MultipartPart>>,
    pub extra_headers: Vec<(String, String)>,
    /// Requires an `x-instagram-gis` signature derived from the cached seed.
    pub signed: bool,
}

impl ApiRequest {
    pub fn get(path: &str) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: &str) -> Self {
        Self::new(Method::POST, path)
    }

    fn new(method: Method, path: &str) -> Self {
        Self {
            method,
            path: path.to_string(),
            query: Vec::new(),
            form: None,
            json: None,
            multipart: None,
            extra_headers: Vec::new(),
            signed: false,
        }
    }

    pub fn with_query(mut self, key: &str, value: &str) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    pub fn with_form(mut self, fields: Vec<(String, String)>) -> Self {
        self.form = Some(fields);
        self
    }

    pub fn with_json(mut self, body: Value) -> Self {
        self.json = Some(body);
        self
    }

    pub fn with_multipart(mut self, parts: Vec<MultipartPart>) -> Self {
        self.multipart = Some(parts);
        self
    }

    pub fn with_header(mut self, key: &str, value: &str) -> Self {
        self.extra_headers.push((key.to_string(), value.to_string()));
        self
    }

    pub fn signed(mut self) -> Self {
        self.signed = true;
        self
    }
}

/// A multipart form field; the dispatcher hands these to reqwest's
/// multipart encoder.
#[derive(Debug, Clone)]
pub struct MultipartPart {
    pub name: String,
    pub body: PartBody,
}

#[derive(Debug, Clone)]
pub enum PartBody {
    Text(String),
    Bytes {
        data: Vec<u8>,
        file_name: String,
        mime: String,
    },
}

impl MultipartPart {
    pub fn text(name: &str, value: &str) -> Self {
        Self {
            name: name.to_string(),
            body: PartBody::Text(value.to_string()),
        }
    }

    pub fn bytes(name: &str, data: Vec<u8>, file_name: &str, mime: &str) -> Self {
        Self {
            name: name.to_string(),
            body: PartBody::Bytes {
                data,
                file_name: file_name.to_string(),
                mime: mime.to_string(),
            },
        }
    }
}

/// Cursor block of the vendor's edge/node envelope. `end_cursor` is
/// meaningless once `has_next_page` is false.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct PageInfo {
    pub has_next_page: bool,
    pub end_cursor: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct EdgeWire {
    node: Value,
}

#[derive(Debug, Clone, Deserialize)]
struct EdgeCollectionWire {
    #[serde(default)]
    count: u64,
    page_info: PageInfo,
    edges: Vec<EdgeWire>,
}

/// One decoded page of an edge/node endpoint, with the edge wrappers
/// already flattened away.
#[derive(Debug, Clone)]
pub struct PagedEnvelope {
    pub count: u64,
    pub page_info: PageInfo,
    pub items: Vec<Value>,
}

impl PagedEnvelope {
    /// Walks `edge_path` into a GraphQL response body and decodes the edge
    /// collection found there. Unknown shapes are rejected, not indexed into.
    pub fn from_response(body: &Value, edge_path: &[&str]) -> Result<Self, HttpError> {
        let mut cursor = body;
        for segment in edge_path {
            cursor = cursor.get(segment).ok_or_else(|| {
                HttpError::UnexpectedShape(format!(
                    "missing `{}` in paged response (path {})",
                    segment,
                    edge_path.join(".")
                ))
            })?;
        }

        let wire: EdgeCollectionWire = serde_json::from_value(cursor.clone())?;
        Ok(Self {
            count: wire.count,
            page_info: wire.page_info,
            items: wire.edges.into_iter().map(|e| e.node).collect(),
        })
    }
}

/// Spec of one paged GraphQL endpoint: the vendor's opaque query hash, the
/// fixed variables, and the path to the edge collection in the response.
#[derive(Debug, Clone)]
pub struct PagedQuery {
    pub query_hash: &'static str,
    pub variables: Value,
    pub edge_path: &'static [&'static str],
}

impl PagedQuery {
    pub fn followers(user_id: &str) -> Self {
        Self {
            query_hash: FOLLOWERS_QUERY_HASH,
            variables: json!({ "id": user_id, "include_reel": true, "fetch_mutual": false }),
            edge_path: &["data", "user", "edge_followed_by"],
        }
    }

    pub fn following(user_id: &str) -> Self {
        Self {
            query_hash: FOLLOWING_QUERY_HASH,
            variables: json!({ "id": user_id, "include_reel": true, "fetch_mutual": false }),
            edge_path: &["data", "user", "edge_follow"],
        }
    }

    pub fn hashtag_media(tag: &str) -> Self {
        Self {
            query_hash: HASHTAG_MEDIA_QUERY_HASH,
            variables: json!({ "tag_name": tag }),
            edge_path: &["data", "hashtag", "edge_hashtag_to_media"],
        }
    }

    pub fn user_media(user_id: &str) -> Self {
        Self {
            query_hash: USER_MEDIA_QUERY_HASH,
            variables: json!({ "id": user_id }),
            edge_path: &["data", "user", "edge_owner_to_timeline_media"],
        }
    }

    pub fn media_comments(shortcode: &str) -> Self {
        Self {
            query_hash: MEDIA_COMMENTS_QUERY_HASH,
            variables: json!({ "shortcode": shortcode }),
            edge_path: &["data", "shortcode_media", "edge_media_to_comment"],
        }
    }

    /// The GraphQL request for one page of this query.
    pub(crate) fn page_request(&self, cursor: Option<&str>, page_size: u32) -> ApiRequest {
        let mut variables = self.variables.clone();
        if let Some(map) = variables.as_object_mut() {
            map.insert("first".to_string(), json!(page_size));
            if let Some(after) = cursor {
                map.insert("after".to_string(), json!(after));
            }
        }
        ApiRequest::get(GRAPHQL_PATH)
            .with_query("query_hash", self.query_hash)
            .with_query("variables", &variables.to_string())
            .signed()
    }
}
