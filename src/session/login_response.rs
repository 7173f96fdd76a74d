use serde::Deserialize;

/// Wire shape of `/accounts/login/ajax/`. The vendor answers with partial
/// combinations of these fields depending on outcome, so everything is
/// optional and interpreted, never indexed into.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub authenticated: Option<bool>,
    pub user: Option<bool>,
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
    pub status: Option<String>,
    pub message: Option<String>,
    pub checkpoint_url: Option<String>,
}

impl LoginResponse {
    pub fn is_checkpoint(&self) -> bool {
        self.checkpoint_url.is_some() || self.message.as_deref() == Some("checkpoint_required")
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated.unwrap_or(false)
    }
}

/// Wire shape of a challenge page fetched with `__a=1`.
#[derive(Debug, Clone, Deserialize)]
pub struct ChallengeResponse {
    pub step_name: Option<String>,
    pub step_data: Option<serde_json::Value>,
    pub status: Option<String>,
}

impl ChallengeResponse {
    pub fn is_ok(&self) -> bool {
        self.status.as_deref() == Some("ok")
    }
}
