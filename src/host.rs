use std::collections::HashMap;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::{json, Value};

use crate::api::{ApiError, SessionClient};
use crate::config::QuoteConfig;
use crate::tools::{ToolDefinition, ToolRegistry, ToolResponse};

const DEFAULT_SESSION: &str = "default";

/// One line of input from the agent runtime.
#[derive(Debug, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
enum Request {
    ListTools,
    Call {
        #[serde(default = "default_session")]
        session: String,
        tool: String,
        #[serde(default)]
        arguments: Value,
    },
    EndSession {
        #[serde(default = "default_session")]
        session: String,
    },
}

fn default_session() -> String {
    DEFAULT_SESSION.to_string()
}

/// Routes tool calls to per-conversation registries.
///
/// Each session key gets its own [`SessionClient`], so logins never leak
/// between conversations. A conversation lives until the runtime sends
/// `end_session` for it; keys that are never ended stay for the life of
/// the process.
pub struct Host {
    template: SessionClient,
    quote_defaults: QuoteConfig,
    definitions: Vec<ToolDefinition>,
    sessions: HashMap<String, Conversation>,
}

struct Conversation {
    client: Arc<SessionClient>,
    tools: ToolRegistry,
}

impl Host {
    pub fn new(template: SessionClient, quote_defaults: QuoteConfig) -> Self {
        // Definitions do not depend on session state; list them once.
        let definitions =
            ToolRegistry::for_session(Arc::new(template.fork()), quote_defaults.clone()).definitions();
        Self {
            template,
            quote_defaults,
            definitions,
            sessions: HashMap::new(),
        }
    }

    /// Handle one JSON request line and produce one JSON response.
    pub async fn handle_line(&mut self, line: &str) -> Value {
        let request = match serde_json::from_str::<Request>(line) {
            Ok(request) => request,
            Err(e) => {
                log::warn!("Malformed request line: {}", e);
                let error = ApiError::validation(format!("Malformed request: {}", e));
                return json!({ "result": ToolResponse::from(Err(error)) });
            }
        };

        match request {
            Request::ListTools => json!({ "tools": self.definitions }),
            Request::Call { session, tool, arguments } => {
                log::info!("Session '{}' calling {}", session, tool);
                let result = self.registry(&session).call(&tool, arguments).await;
                json!({ "session": session, "tool": tool, "result": result })
            }
            Request::EndSession { session } => {
                let ended = match self.sessions.remove(&session) {
                    Some(conversation) => {
                        if conversation.client.is_logged_in() {
                            conversation.client.logout();
                        }
                        true
                    }
                    None => false,
                };
                log::info!("Session '{}' ended (existed: {})", session, ended);
                json!({ "session": session, "ended": ended })
            }
        }
    }

    fn registry(&mut self, session: &str) -> &ToolRegistry {
        if !self.sessions.contains_key(session) {
            let client = Arc::new(self.template.fork());
            log::info!("New conversation '{}' on session {}", session, client.session_id());
            let tools = ToolRegistry::for_session(client.clone(), self.quote_defaults.clone());
            self.sessions.insert(session.to_string(), Conversation { client, tools });
        }
        &self.sessions[session].tools
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::client::tests::{login_mock, test_client};
    use httpmock::prelude::*;

    #[tokio::test]
    async fn test_list_tools() {
        let server = MockServer::start();
        let mut host = Host::new(test_client(&server), QuoteConfig::default());
        let response = host.handle_line(r#"{"op": "list_tools"}"#).await;
        assert_eq!(response["tools"].as_array().unwrap().len(), 11);
        assert_eq!(host.session_count(), 0);
    }

    #[tokio::test]
    async fn test_sessions_are_isolated() {
        let server = MockServer::start();
        login_mock(&server, "T");
        let profile = server.mock(|when, then| {
            when.method(GET).path("/users/me").header("authorization", "T");
            then.status(200).json_body(json!({"firstname": "Ada"}));
        });

        let mut host = Host::new(test_client(&server), QuoteConfig::default());
        let login = host
            .handle_line(r#"{"op": "call", "session": "alice", "tool": "login_user", "arguments": {"email": "ada@example.com", "password": "pw"}}"#)
            .await;
        assert_eq!(login["result"]["status"], "success");

        let alice = host
            .handle_line(r#"{"op": "call", "session": "alice", "tool": "get_current_user_profile"}"#)
            .await;
        assert_eq!(alice["result"]["payload"]["firstname"], "Ada");

        let bob = host
            .handle_line(r#"{"op": "call", "session": "bob", "tool": "get_current_user_profile"}"#)
            .await;
        assert_eq!(bob["result"]["kind"], "auth_required");

        assert_eq!(profile.hits(), 1);
        assert_eq!(host.session_count(), 2);
    }

    #[tokio::test]
    async fn test_end_session_forgets_login() {
        let server = MockServer::start();
        login_mock(&server, "T");

        let mut host = Host::new(test_client(&server), QuoteConfig::default());
        host.handle_line(r#"{"op": "call", "tool": "login_user", "arguments": {"email": "a@b.c", "password": "pw"}}"#)
            .await;
        let ended = host.handle_line(r#"{"op": "end_session"}"#).await;
        assert_eq!(ended["ended"], true);

        let after = host
            .handle_line(r#"{"op": "call", "tool": "search_user_shipments", "arguments": {}}"#)
            .await;
        assert_eq!(after["result"]["kind"], "auth_required");
    }

    #[tokio::test]
    async fn test_malformed_line() {
        let server = MockServer::start();
        let mut host = Host::new(test_client(&server), QuoteConfig::default());
        let response = host.handle_line("not json").await;
        assert_eq!(response["result"]["status"], "failure");
        assert_eq!(response["result"]["kind"], "validation");
        assert_eq!(host.session_count(), 0);
    }
}
