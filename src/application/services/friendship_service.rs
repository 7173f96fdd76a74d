use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

use crate::application::models::media::ActionStatus;
use crate::error::HttpError;
use crate::session::session::SessionContext;
use crate::transport::http_client::RequestDispatcher;
use crate::transport::model::{ApiRequest, PagedQuery};
use crate::transport::pagination::{NodeStream, PaginatedFetcher};

/// Relationship actions against another account.
#[async_trait]
pub trait FriendshipService: Send + Sync {
    async fn follow(&self, context: &SessionContext, user_id: &str)
        -> Result<ActionStatus, HttpError>;
    async fn unfollow(
        &self,
        context: &SessionContext,
        user_id: &str,
    ) -> Result<ActionStatus, HttpError>;
    async fn block(&self, context: &SessionContext, user_id: &str)
        -> Result<ActionStatus, HttpError>;
    async fn unblock(
        &self,
        context: &SessionContext,
        user_id: &str,
    ) -> Result<ActionStatus, HttpError>;
    /// Accept a pending follow request.
    async fn approve(
        &self,
        context: &SessionContext,
        user_id: &str,
    ) -> Result<ActionStatus, HttpError>;
    /// Dismiss a pending follow request.
    async fn ignore(&self, context: &SessionContext, user_id: &str)
        -> Result<ActionStatus, HttpError>;
}

pub struct FriendshipServiceImpl<T: RequestDispatcher> {
    client: Arc<T>,
}

impl<T: RequestDispatcher> FriendshipServiceImpl<T> {
    pub fn new(client: Arc<T>) -> Self {
        Self { client }
    }

    async fn action(
        &self,
        context: &SessionContext,
        user_id: &str,
        action: &str,
    ) -> Result<ActionStatus, HttpError> {
        info!("Friendship action {action} on user {user_id}");
        let request = ApiRequest::post(&format!("/web/friendships/{user_id}/{action}/"));
        let response = self.client.execute(context, request).await?;
        response.json()
    }

    /// Lazy walk over an account's followers, newest first as the vendor
    /// orders them.
    pub fn followers(
        &self,
        context: &Arc<SessionContext>,
        user_id: &str,
        page_size: u32,
        ceiling: Option<usize>,
    ) -> NodeStream<T> {
        PaginatedFetcher::new(Arc::clone(&self.client), Arc::clone(context)).iterate(
            PagedQuery::followers(user_id),
            page_size,
            ceiling,
        )
    }

    /// Lazy walk over the accounts a user follows.
    pub fn following(
        &self,
        context: &Arc<SessionContext>,
        user_id: &str,
        page_size: u32,
        ceiling: Option<usize>,
    ) -> NodeStream<T> {
        PaginatedFetcher::new(Arc::clone(&self.client), Arc::clone(context)).iterate(
            PagedQuery::following(user_id),
            page_size,
            ceiling,
        )
    }
}

#[async_trait]
impl<T: RequestDispatcher + 'static> FriendshipService for FriendshipServiceImpl<T> {
    async fn follow(
        &self,
        context: &SessionContext,
        user_id: &str,
    ) -> Result<ActionStatus, HttpError> {
        self.action(context, user_id, "follow").await
    }

    async fn unfollow(
        &self,
        context: &SessionContext,
        user_id: &str,
    ) -> Result<ActionStatus, HttpError> {
        self.action(context, user_id, "unfollow").await
    }

    async fn block(
        &self,
        context: &SessionContext,
        user_id: &str,
    ) -> Result<ActionStatus, HttpError> {
        self.action(context, user_id, "block").await
    }

    async fn unblock(
        &self,
        context: &SessionContext,
        user_id: &str,
    ) -> Result<ActionStatus, HttpError> {
        self.action(context, user_id, "unblock").await
    }

    async fn approve(
        &self,
        context: &SessionContext,
        user_id: &str,
    ) -> Result<ActionStatus, HttpError> {
        self.action(context, user_id, "approve").await
    }

    async fn ignore(
        &self,
        context: &SessionContext,
        user_id: &str,
    ) -> Result<ActionStatus, HttpError> {
        self.action(context, user_id, "ignore").await
    }
}
