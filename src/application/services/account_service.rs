use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};

use crate::application::models::feed::{SearchResult, Venue, VenueEnvelope};
use crate::application::models::user::{
    user_from_profile_page, ProfileEnvelope, ProfileForm, ProfileUpdate, User,
};
use crate::application::models::media::ActionStatus;
use crate::error::HttpError;
use crate::session::session::SessionContext;
use crate::transport::http_client::RequestDispatcher;
use crate::transport::model::{ApiRequest, MultipartPart};

/// Account-scoped reads and edits.
#[async_trait]
pub trait AccountService: Send + Sync {
    /// Own editable profile fields.
    async fn get_profile(&self, context: &SessionContext) -> Result<ProfileForm, HttpError>;

    async fn update_profile(
        &self,
        context: &SessionContext,
        update: &ProfileUpdate,
    ) -> Result<ActionStatus, HttpError>;

    async fn change_profile_photo(
        &self,
        context: &SessionContext,
        photo: Vec<u8>,
    ) -> Result<Value, HttpError>;

    async fn get_user_by_username(
        &self,
        context: &SessionContext,
        username: &str,
    ) -> Result<User, HttpError>;

    /// The logged-in home feed, returned raw; its shape shifts too often
    /// to pin down.
    async fn get_home(&self, context: &SessionContext) -> Result<Value, HttpError>;

    /// Notifications feed of the logged-in account.
    async fn get_activity(&self, context: &SessionContext) -> Result<Value, HttpError>;

    async fn search(
        &self,
        context: &SessionContext,
        query: &str,
        search_context: &str,
    ) -> Result<SearchResult, HttpError>;

    async fn location_search(
        &self,
        context: &SessionContext,
        query: &str,
        latitude: f64,
        longitude: f64,
    ) -> Result<Vec<Venue>, HttpError>;
}

pub struct AccountServiceImpl<T: RequestDispatcher> {
    client: Arc<T>,
}

impl<T: RequestDispatcher> AccountServiceImpl<T> {
    pub fn new(client: Arc<T>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl<T: RequestDispatcher + 'static> AccountService for AccountServiceImpl<T> {
    async fn get_profile(&self, context: &SessionContext) -> Result<ProfileForm, HttpError> {
        let request = ApiRequest::get("/accounts/edit/").with_query("__a", "1");
        let response = self.client.execute(context, request).await?;
        let envelope: ProfileEnvelope = response.json()?;
        Ok(envelope.form_data)
    }

    async fn update_profile(
        &self,
        context: &SessionContext,
        update: &ProfileUpdate,
    ) -> Result<ActionStatus, HttpError> {
        info!("Updating profile");
        let request = ApiRequest::post("/accounts/edit/").with_form(update.form_fields());
        let response = self.client.execute(context, request).await?;
        response.json()
    }

    async fn change_profile_photo(
        &self,
        context: &SessionContext,
        photo: Vec<u8>,
    ) -> Result<Value, HttpError> {
        info!("Changing profile photo ({} bytes)", photo.len());
        let request = ApiRequest::post("/accounts/web_change_profile_picture/").with_multipart(
            vec![MultipartPart::bytes(
                "profile_pic",
                photo,
                "profile_pic.jpg",
                "image/jpeg",
            )],
        );
        let response = self.client.execute(context, request).await?;
        response.value()
    }

    async fn get_user_by_username(
        &self,
        context: &SessionContext,
        username: &str,
    ) -> Result<User, HttpError> {
        let request = ApiRequest::get(&format!("/{username}/")).with_query("__a", "1");
        let response = self.client.execute(context, request).await?;
        let user = user_from_profile_page(&response.value()?)?;
        debug!("Fetched user {} ({})", user.username, user.id);
        Ok(user)
    }

    async fn get_home(&self, context: &SessionContext) -> Result<Value, HttpError> {
        let request = ApiRequest::get("/").with_query("__a", "1");
        let response = self.client.execute(context, request).await?;
        response.value()
    }

    async fn get_activity(&self, context: &SessionContext) -> Result<Value, HttpError> {
        let request = ApiRequest::get("/accounts/activity/").with_query("__a", "1");
        let response = self.client.execute(context, request).await?;
        let body = response.value()?;
        body.get("graphql")
            .and_then(|g| g.get("user"))
            .cloned()
            .ok_or_else(|| {
                HttpError::UnexpectedShape("activity page missing graphql.user".to_string())
            })
    }

    async fn search(
        &self,
        context: &SessionContext,
        query: &str,
        search_context: &str,
    ) -> Result<SearchResult, HttpError> {
        let request = ApiRequest::get("/web/search/topsearch/")
            .with_query("query", query)
            .with_query("context", search_context);
        let response = self.client.execute(context, request).await?;
        response.json()
    }

    async fn location_search(
        &self,
        context: &SessionContext,
        query: &str,
        latitude: f64,
        longitude: f64,
    ) -> Result<Vec<Venue>, HttpError> {
        let request = ApiRequest::get("/location_search/")
            .with_query("search_query", query)
            .with_query("latitude", &latitude.to_string())
            .with_query("longitude", &longitude.to_string());
        let response = self.client.execute(context, request).await?;
        let envelope: VenueEnvelope = response.json()?;
        Ok(envelope.venues)
    }
}
