pub mod quoting;
pub mod registry;
pub mod shipment;
pub mod user;
pub mod vehicle;

pub use quoting::{QuoteDetailsById, TruckingPriceQuote};
pub use registry::{ToolDefinition, ToolRegistry, ToolResponse};
pub use shipment::{CreateTruckingShipment, SearchUserBookingsAdvanced, SearchUserShipments};
pub use user::{CurrentUserProfile, LoginUser};
pub use vehicle::{VehicleMakesForYear, VehicleModelsForMakeYear, VehicleSpecsByVin, VehicleYearsForMakeModel};

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::api::{ApiError, ApiResult};

/// Tool trait for agent-invoked backend capabilities.
///
/// Not object-safe (associated types). The agent runtime reaches tools
/// through [`ToolRegistry`], which erases the input type.
#[async_trait::async_trait]
pub trait Tool: Send + Sync {
    type Input: DeserializeOwned + Send;

    fn name(&self) -> &'static str;
    fn description(&self) -> &'static str;
    /// JSON schema of `Input`, as advertised to the LLM.
    fn parameters(&self) -> Value;
    async fn run(&self, input: Self::Input) -> ApiResult;
}

/// Input for tools that take no arguments.
#[derive(Debug, Default, Deserialize)]
pub struct NoArgs {}

/// Reject missing or blank string arguments.
pub(crate) fn require(field: &str, value: &str) -> ApiResult<()> {
    if value.trim().is_empty() {
        log::error!("Invalid or missing string value for '{}'", field);
        return Err(ApiError::validation(format!("Missing or invalid value for {}.", field)));
    }
    Ok(())
}

/// Years are exactly four ASCII digits.
pub(crate) fn require_year(field: &str, value: &str) -> ApiResult<()> {
    if value.len() != 4 || !value.bytes().all(|b| b.is_ascii_digit()) {
        log::error!("Invalid {} '{}'. Must be a 4-digit string.", field, value);
        return Err(ApiError::validation(format!(
            "Invalid {} provided. Must be a 4-digit string.",
            field
        )));
    }
    Ok(())
}

/// Treat empty optional strings as absent.
pub(crate) fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_rejects_blank() {
        assert!(require("vin", "1HGCM82633A123456").is_ok());
        let err = require("vin", "   ").unwrap_err();
        assert_eq!(err.to_string(), "Missing or invalid value for vin.");
    }

    #[test]
    fn test_require_year() {
        assert!(require_year("year", "2020").is_ok());
        for bad in ["", "20", "20200", "20a0", "２０２０", " 2020"] {
            assert!(require_year("year", bad).is_err(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn test_non_empty() {
        assert_eq!(non_empty(&Some("rav4".to_string())), Some("rav4"));
        assert_eq!(non_empty(&Some("  ".to_string())), None);
        assert_eq!(non_empty(&None), None);
    }
}
