use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

use crate::application::models::feed::{LocationFeed, TagFeed};
use crate::application::models::media::{media_from_shortcode_page, ActionStatus, Comment, Media};
use crate::error::HttpError;
use crate::session::session::SessionContext;
use crate::transport::http_client::RequestDispatcher;
use crate::transport::model::{ApiRequest, PagedQuery};
use crate::transport::pagination::{NodeStream, PaginatedFetcher};

/// Media reads and the social actions attached to a media item.
#[async_trait]
pub trait MediaService: Send + Sync {
    async fn get_media_by_shortcode(
        &self,
        context: &SessionContext,
        shortcode: &str,
    ) -> Result<Media, HttpError>;

    async fn get_media_feed_by_hashtag(
        &self,
        context: &SessionContext,
        hashtag: &str,
    ) -> Result<TagFeed, HttpError>;

    async fn get_media_feed_by_location(
        &self,
        context: &SessionContext,
        location_id: &str,
    ) -> Result<LocationFeed, HttpError>;

    async fn like(&self, context: &SessionContext, media_id: &str)
        -> Result<ActionStatus, HttpError>;
    async fn unlike(
        &self,
        context: &SessionContext,
        media_id: &str,
    ) -> Result<ActionStatus, HttpError>;
    async fn save(&self, context: &SessionContext, media_id: &str)
        -> Result<ActionStatus, HttpError>;
    async fn unsave(
        &self,
        context: &SessionContext,
        media_id: &str,
    ) -> Result<ActionStatus, HttpError>;

    async fn add_comment(
        &self,
        context: &SessionContext,
        media_id: &str,
        text: &str,
    ) -> Result<Comment, HttpError>;

    async fn delete_comment(
        &self,
        context: &SessionContext,
        media_id: &str,
        comment_id: &str,
    ) -> Result<ActionStatus, HttpError>;

    async fn delete_media(
        &self,
        context: &SessionContext,
        media_id: &str,
    ) -> Result<ActionStatus, HttpError>;
}

pub struct MediaServiceImpl<T: RequestDispatcher> {
    client: Arc<T>,
}

impl<T: RequestDispatcher> MediaServiceImpl<T> {
    pub fn new(client: Arc<T>) -> Self {
        Self { client }
    }

    async fn post_action(
        &self,
        context: &SessionContext,
        path: String,
    ) -> Result<ActionStatus, HttpError> {
        let response = self.client.execute(context, ApiRequest::post(&path)).await?;
        response.json()
    }

    /// Lazy walk over a media item's comments.
    pub fn comments(
        &self,
        context: &Arc<SessionContext>,
        shortcode: &str,
        page_size: u32,
        ceiling: Option<usize>,
    ) -> NodeStream<T> {
        PaginatedFetcher::new(Arc::clone(&self.client), Arc::clone(context)).iterate(
            PagedQuery::media_comments(shortcode),
            page_size,
            ceiling,
        )
    }
}

#[async_trait]
impl<T: RequestDispatcher + 'static> MediaService for MediaServiceImpl<T> {
    async fn get_media_by_shortcode(
        &self,
        context: &SessionContext,
        shortcode: &str,
    ) -> Result<Media, HttpError> {
        let request = ApiRequest::get(&format!("/p/{shortcode}/")).with_query("__a", "1");
        let response = self.client.execute(context, request).await?;
        media_from_shortcode_page(&response.value()?)
    }

    async fn get_media_feed_by_hashtag(
        &self,
        context: &SessionContext,
        hashtag: &str,
    ) -> Result<TagFeed, HttpError> {
        let request = ApiRequest::get(&format!("/explore/tags/{hashtag}/")).with_query("__a", "1");
        let response = self.client.execute(context, request).await?;
        TagFeed::from_page(&response.value()?)
    }

    async fn get_media_feed_by_location(
        &self,
        context: &SessionContext,
        location_id: &str,
    ) -> Result<LocationFeed, HttpError> {
        let request =
            ApiRequest::get(&format!("/explore/locations/{location_id}/")).with_query("__a", "1");
        let response = self.client.execute(context, request).await?;
        LocationFeed::from_page(&response.value()?)
    }

    async fn like(
        &self,
        context: &SessionContext,
        media_id: &str,
    ) -> Result<ActionStatus, HttpError> {
        info!("Liking media {media_id}");
        self.post_action(context, format!("/web/likes/{media_id}/like/"))
            .await
    }

    async fn unlike(
        &self,
        context: &SessionContext,
        media_id: &str,
    ) -> Result<ActionStatus, HttpError> {
        self.post_action(context, format!("/web/likes/{media_id}/unlike/"))
            .await
    }

    async fn save(
        &self,
        context: &SessionContext,
        media_id: &str,
    ) -> Result<ActionStatus, HttpError> {
        self.post_action(context, format!("/web/save/{media_id}/save/"))
            .await
    }

    async fn unsave(
        &self,
        context: &SessionContext,
        media_id: &str,
    ) -> Result<ActionStatus, HttpError> {
        self.post_action(context, format!("/web/save/{media_id}/unsave/"))
            .await
    }

    async fn add_comment(
        &self,
        context: &SessionContext,
        media_id: &str,
        text: &str,
    ) -> Result<Comment, HttpError> {
        info!("Commenting on media {media_id}");
        let request = ApiRequest::post(&format!("/web/comments/{media_id}/add/"))
            .with_form(vec![("comment_text".to_string(), text.to_string())]);
        let response = self.client.execute(context, request).await?;
        response.json()
    }

    async fn delete_comment(
        &self,
        context: &SessionContext,
        media_id: &str,
        comment_id: &str,
    ) -> Result<ActionStatus, HttpError> {
        self.post_action(
            context,
            format!("/web/comments/{media_id}/delete/{comment_id}/"),
        )
        .await
    }

    async fn delete_media(
        &self,
        context: &SessionContext,
        media_id: &str,
    ) -> Result<ActionStatus, HttpError> {
        info!("Deleting media {media_id}");
        self.post_action(context, format!("/create/{media_id}/delete/"))
            .await
    }
}
