//! Name-addressed access to every tool, with JSON in and JSON out.
//!
//! This is the only layer an agent runtime needs to know about: it lists
//! tool definitions for the LLM and turns a `(name, arguments)` call into
//! a [`ToolResponse`].

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use super::{
    CreateTruckingShipment, CurrentUserProfile, LoginUser, QuoteDetailsById,
    SearchUserBookingsAdvanced, SearchUserShipments, Tool, TruckingPriceQuote,
    VehicleMakesForYear, VehicleModelsForMakeYear, VehicleSpecsByVin, VehicleYearsForMakeModel,
};
use crate::api::{ApiError, ApiResult, FailureKind, SessionClient};
use crate::config::QuoteConfig;

/// Object-safe view of a [`Tool`].
#[async_trait::async_trait]
trait ErasedTool: Send + Sync {
    fn definition(&self) -> ToolDefinition;
    async fn call(&self, arguments: Value) -> ApiResult;
}

#[async_trait::async_trait]
impl<T: Tool> ErasedTool for T {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name(),
            description: self.description(),
            parameters: self.parameters(),
        }
    }

    async fn call(&self, arguments: Value) -> ApiResult {
        // Tools without arguments may be called with null.
        let arguments = if arguments.is_null() {
            Value::Object(Default::default())
        } else {
            arguments
        };
        let input: T::Input = serde_json::from_value(arguments).map_err(|e| {
            log::error!("Invalid arguments for {}: {}", self.name(), e);
            ApiError::validation(format!("Invalid arguments for {}: {}", self.name(), e))
        })?;
        self.run(input).await
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ToolDefinition {
    pub name: &'static str,
    pub description: &'static str,
    pub parameters: Value,
}

/// The uniform result shape handed back to the agent runtime.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ToolResponse {
    Success {
        payload: Value,
    },
    Failure {
        kind: FailureKind,
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        details: Option<Value>,
        #[serde(skip_serializing_if = "Option::is_none")]
        status_code: Option<u16>,
    },
}

impl From<ApiResult> for ToolResponse {
    fn from(result: ApiResult) -> Self {
        match result {
            Ok(payload) => Self::Success { payload },
            Err(err) => Self::Failure {
                kind: err.kind(),
                message: err.to_string(),
                details: err.details().cloned(),
                status_code: err.status_code(),
            },
        }
    }
}

#[derive(Default)]
pub struct ToolRegistry {
    tools: BTreeMap<&'static str, Box<dyn ErasedTool>>,
}

impl ToolRegistry {
    /// Every trucking tool bound to one conversation's session.
    pub fn for_session(client: Arc<SessionClient>, quote_defaults: QuoteConfig) -> Self {
        let mut registry = Self::default();
        registry.register(LoginUser::new(client.clone()));
        registry.register(CurrentUserProfile::new(client.clone()));
        registry.register(VehicleSpecsByVin::new(client.clone()));
        registry.register(VehicleMakesForYear::new(client.clone()));
        registry.register(VehicleModelsForMakeYear::new(client.clone()));
        registry.register(VehicleYearsForMakeModel::new(client.clone()));
        registry.register(TruckingPriceQuote::new(client.clone(), quote_defaults));
        registry.register(QuoteDetailsById::new(client.clone()));
        registry.register(SearchUserShipments::new(client.clone()));
        registry.register(SearchUserBookingsAdvanced::new(client.clone()));
        registry.register(CreateTruckingShipment::new(client));
        log::info!("{} tools initialized.", registry.len());
        registry
    }

    pub fn register<T>(&mut self, tool: T)
    where
        T: Tool + 'static,
    {
        self.tools.insert(tool.name(), Box::new(tool));
    }

    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.values().map(|tool| tool.definition()).collect()
    }

    pub async fn call(&self, name: &str, arguments: Value) -> ToolResponse {
        let result = match self.tools.get(name) {
            Some(tool) => tool.call(arguments).await,
            None => {
                log::warn!("Unknown tool requested: {}", name);
                Err(ApiError::validation(format!("Unknown tool: {}", name)))
            }
        };
        ToolResponse::from(result)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }
}
