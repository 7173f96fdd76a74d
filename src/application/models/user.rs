use crate::error::HttpError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A user as the profile and follower endpoints shape it. The vendor omits
/// fields freely depending on endpoint and login state.
#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    pub full_name: Option<String>,
    pub biography: Option<String>,
    pub external_url: Option<String>,
    pub profile_pic_url: Option<String>,
    pub is_private: Option<bool>,
    pub is_verified: Option<bool>,
    pub edge_followed_by: Option<EdgeCount>,
    pub edge_follow: Option<EdgeCount>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct EdgeCount {
    pub count: u64,
}

/// Unwraps the `graphql.user` envelope of a profile page response.
pub fn user_from_profile_page(body: &Value) -> Result<User, HttpError> {
    let user = body
        .get("graphql")
        .and_then(|g| g.get("user"))
        .ok_or_else(|| {
            HttpError::UnexpectedShape("profile page missing graphql.user".to_string())
        })?;
    Ok(serde_json::from_value(user.clone())?)
}

/// Editable profile fields as `/accounts/edit/` returns them.
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileForm {
    pub first_name: Option<String>,
    pub email: Option<String>,
    pub username: Option<String>,
    pub phone_number: Option<String>,
    pub gender: Option<i32>,
    pub biography: Option<String>,
    pub external_url: Option<String>,
    pub chaining_enabled: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ProfileEnvelope {
    pub form_data: ProfileForm,
}

/// Fields submitted back to `/accounts/edit/`. Unset fields are sent as
/// empty strings, matching the vendor's form contract.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProfileUpdate {
    pub name: String,
    pub email: String,
    pub username: String,
    pub phone_number: String,
    pub gender: Option<i32>,
    pub biography: String,
    pub website: String,
    pub similar_account_suggestions: bool,
}

impl ProfileUpdate {
    pub(crate) fn form_fields(&self) -> Vec<(String, String)> {
        vec![
            ("first_name".to_string(), self.name.clone()),
            ("email".to_string(), self.email.clone()),
            ("username".to_string(), self.username.clone()),
            ("phone_number".to_string(), self.phone_number.clone()),
            (
                "gender".to_string(),
                self.gender.map(|g| g.to_string()).unwrap_or_default(),
            ),
            ("biography".to_string(), self.biography.clone()),
            ("external_url".to_string(), self.website.clone()),
            (
                "chaining_enabled".to_string(),
                self.similar_account_suggestions.to_string(),
            ),
        ]
    }
}
