use std::sync::Arc;

use serde::Deserialize;
use serde_json::{json, Value};

use super::{NoArgs, Tool};
use crate::api::{ApiError, ApiResult, SessionClient};

/// Logs the conversation's user in so protected tools become available.
pub struct LoginUser {
    client: Arc<SessionClient>,
}

#[derive(Deserialize)]
pub struct LoginArgs {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl LoginUser {
    pub fn new(client: Arc<SessionClient>) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl Tool for LoginUser {
    type Input = LoginArgs;

    fn name(&self) -> &'static str {
        "login_user"
    }

    fn description(&self) -> &'static str {
        "Logs in a user with their email and password to enable access to protected services."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "email": {"type": "string"},
                "password": {"type": "string"}
            },
            "required": ["email", "password"]
        })
    }

    async fn run(&self, input: LoginArgs) -> ApiResult {
        log::info!("Tool: {} called for email: {}", self.name(), input.email);
        if input.email.trim().is_empty() || input.password.is_empty() {
            return Err(ApiError::validation("Email and password are required."));
        }

        // The session keeps the token; the agent only needs to know it worked.
        self.client.login(input.email.trim(), &input.password).await?;
        Ok(json!({"success": true, "message": "Login successful."}))
    }
}

/// Fetches the logged-in user's profile.
pub struct CurrentUserProfile {
    client: Arc<SessionClient>,
}

impl CurrentUserProfile {
    pub fn new(client: Arc<SessionClient>) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl Tool for CurrentUserProfile {
    type Input = NoArgs;

    fn name(&self) -> &'static str {
        "get_current_user_profile"
    }

    fn description(&self) -> &'static str {
        "Fetches the profile of the currently logged-in user."
    }

    fn parameters(&self) -> Value {
        json!({"type": "object", "properties": {}})
    }

    async fn run(&self, _input: NoArgs) -> ApiResult {
        log::info!("Tool: {} called.", self.name());
        self.client.fetch_user_profile().await
    }
}
