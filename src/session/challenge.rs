use crate::constants::CHALLENGE_MAX_ATTEMPTS;
use crate::error::AuthError;
use crate::session::login_response::ChallengeResponse;
use crate::session::session::SessionContext;
use crate::transport::http_client::{InstagramHttpClient, RequestDispatcher};
use crate::transport::model::ApiRequest;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Where a checkpoint negotiation currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChallengeStep {
    /// The vendor is asking which delivery method should receive the code.
    AwaitingChoice,
    /// A code was dispatched and must be submitted.
    AwaitingCode,
    Resolved,
}

/// State of one checkpoint flow. Created when `authenticate` reports
/// `ChallengeRequired`; gone once the challenge resolves or is abandoned.
#[derive(Debug, Clone)]
pub struct ChallengeState {
    pub challenge_url: String,
    pub step: ChallengeStep,
    pub attempts_remaining: u8,
}

/// Drives the vendor's interactive checkpoint flow:
/// `AwaitingChoice -> AwaitingCode -> Resolved`, with reset/replay loops on
/// the code step. On success control returns to the session layer's
/// post-login extraction.
pub struct ChallengeNegotiator {
    client: Arc<InstagramHttpClient>,
    context: Arc<SessionContext>,
}

impl ChallengeNegotiator {
    pub(crate) fn new(client: Arc<InstagramHttpClient>, context: Arc<SessionContext>) -> Self {
        Self { client, context }
    }

    /// Loads the checkpoint page and reads which step the vendor put the
    /// flow in.
    #[instrument(skip(self))]
    pub async fn get_challenge(&self, challenge_url: &str) -> Result<ChallengeState, AuthError> {
        let request = ApiRequest::get(challenge_url).with_query("__a", "1");
        let response = self.client.execute(&self.context, request).await?;
        let challenge: ChallengeResponse = response.json()?;

        let step = match challenge.step_name.as_deref() {
            Some("select_verify_method") => ChallengeStep::AwaitingChoice,
            _ => ChallengeStep::AwaitingCode,
        };
        debug!("Challenge opened at step {step:?}");

        Ok(ChallengeState {
            challenge_url: challenge_url.to_string(),
            step,
            attempts_remaining: CHALLENGE_MAX_ATTEMPTS,
        })
    }

    /// Picks the verification method (0 = SMS, 1 = email, as the vendor
    /// numbers them) and advances to the code step.
    #[instrument(skip(self, state))]
    pub async fn submit_choice(
        &self,
        state: &mut ChallengeState,
        choice: u8,
    ) -> Result<(), AuthError> {
        debug_assert_eq!(state.step, ChallengeStep::AwaitingChoice);

        let request = ApiRequest::post(&state.challenge_url)
            .with_form(vec![("choice".to_string(), choice.to_string())]);
        self.client.execute(&self.context, request).await?;

        state.step = ChallengeStep::AwaitingCode;
        Ok(())
    }

    /// Submits a verification code. A match resolves the challenge and
    /// yields the authenticated context; a mismatch burns one attempt and
    /// leaves the flow on the code step until the budget runs out.
    #[instrument(skip(self, state, code))]
    pub async fn submit_code(
        &self,
        state: &mut ChallengeState,
        code: &str,
    ) -> Result<Arc<SessionContext>, AuthError> {
        debug_assert_eq!(state.step, ChallengeStep::AwaitingCode);

        let request = ApiRequest::post(&state.challenge_url)
            .with_form(vec![("security_code".to_string(), code.to_string())]);
        let response = self.client.execute(&self.context, request).await?;
        let challenge: ChallengeResponse = response.json()?;

        if challenge.is_ok() && self.context.is_authenticated() {
            state.step = ChallengeStep::Resolved;
            let token = self
                .context
                .jar_csrf()
                .ok_or(AuthError::MissingCsrfCookie)?;
            self.context.set_csrf_token(&token);
            info!("Challenge resolved");
            return Ok(Arc::clone(&self.context));
        }

        state.step = ChallengeStep::AwaitingCode;
        state.attempts_remaining = state.attempts_remaining.saturating_sub(1);
        if state.attempts_remaining == 0 {
            warn!("Challenge attempts exhausted");
            return Err(AuthError::ChallengeExhausted);
        }
        Err(AuthError::InvalidCode)
    }

    /// Asks the vendor to send a fresh code to the already-chosen method.
    #[instrument(skip(self, state))]
    pub async fn replay(&self, state: &mut ChallengeState) -> Result<(), AuthError> {
        debug_assert_eq!(state.step, ChallengeStep::AwaitingCode);
        let url = rewrite_challenge_path(&state.challenge_url, "replay");
        self.client
            .execute(&self.context, ApiRequest::post(&url))
            .await?;
        state.step = ChallengeStep::AwaitingCode;
        Ok(())
    }

    /// Restarts the flow on the vendor side while keeping the local
    /// attempt budget.
    #[instrument(skip(self, state))]
    pub async fn reset(&self, state: &mut ChallengeState) -> Result<(), AuthError> {
        let url = rewrite_challenge_path(&state.challenge_url, "reset");
        self.client
            .execute(&self.context, ApiRequest::post(&url))
            .await?;
        state.step = ChallengeStep::AwaitingCode;
        Ok(())
    }
}

fn rewrite_challenge_path(challenge_url: &str, action: &str) -> String {
    challenge_url.replacen("/challenge/", &format!("/challenge/{action}/"), 1)
}
