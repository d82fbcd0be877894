use std::sync::Arc;

use serde::Deserialize;
use serde_json::{json, Value};

use super::{require, require_year, Tool};
use crate::api::{ApiResult, SessionClient};

/// Looks up vehicle specifications by VIN.
pub struct VehicleSpecsByVin {
    client: Arc<SessionClient>,
}

#[derive(Debug, Deserialize)]
pub struct VinArgs {
    #[serde(default)]
    pub vin: String,
}

impl VehicleSpecsByVin {
    pub fn new(client: Arc<SessionClient>) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl Tool for VehicleSpecsByVin {
    type Input = VinArgs;

    fn name(&self) -> &'static str {
        "get_vehicle_specs_by_vin"
    }

    fn description(&self) -> &'static str {
        "Fetches detailed vehicle specifications based on its Vehicle Identification Number (VIN)."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "vin": {"type": "string", "description": "Vehicle Identification Number"}
            },
            "required": ["vin"]
        })
    }

    async fn run(&self, input: VinArgs) -> ApiResult {
        log::info!("Tool: {} called for VIN: {}", self.name(), input.vin);
        require("VIN", &input.vin)?;

        self.client
            .fetch_vehicle_specs(input.vin.trim())
            .await
            .inspect_err(|e| log::error!("API error fetching vehicle specs for VIN {}: {}", input.vin, e))
    }
}

/// Lists vehicle makes for a model year.
pub struct VehicleMakesForYear {
    client: Arc<SessionClient>,
}

#[derive(Debug, Deserialize)]
pub struct YearArgs {
    #[serde(default)]
    pub year: String,
}

impl VehicleMakesForYear {
    pub fn new(client: Arc<SessionClient>) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl Tool for VehicleMakesForYear {
    type Input = YearArgs;

    fn name(&self) -> &'static str {
        "get_vehicle_makes_for_year"
    }

    fn description(&self) -> &'static str {
        "Lists available vehicle makes for a given year. The year should be a 4-digit number."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "year": {"type": "string", "description": "4-digit model year, e.g. \"2020\""}
            },
            "required": ["year"]
        })
    }

    async fn run(&self, input: YearArgs) -> ApiResult {
        log::info!("Tool: {} called for year: {}", self.name(), input.year);
        require_year("year", &input.year)?;

        self.client
            .fetch_vehicle_makes(&input.year)
            .await
            .inspect_err(|e| log::error!("API error fetching vehicle makes for year {}: {}", input.year, e))
    }
}

/// Lists models for a make and model year.
pub struct VehicleModelsForMakeYear {
    client: Arc<SessionClient>,
}

#[derive(Debug, Deserialize)]
pub struct MakeYearArgs {
    #[serde(default)]
    pub make: String,
    #[serde(default)]
    pub year: String,
}

impl VehicleModelsForMakeYear {
    pub fn new(client: Arc<SessionClient>) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl Tool for VehicleModelsForMakeYear {
    type Input = MakeYearArgs;

    fn name(&self) -> &'static str {
        "get_vehicle_models_for_make_year"
    }

    fn description(&self) -> &'static str {
        "Lists available vehicle models for a given make and year. The year should be a 4-digit number."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "make": {"type": "string", "description": "Vehicle make, e.g. \"Toyota\""},
                "year": {"type": "string", "description": "4-digit model year"}
            },
            "required": ["make", "year"]
        })
    }

    async fn run(&self, input: MakeYearArgs) -> ApiResult {
        log::info!("Tool: {} called for make: {}, year: {}", self.name(), input.make, input.year);
        require("make", &input.make)?;
        require_year("year", &input.year)?;

        self.client
            .fetch_vehicle_models(input.make.trim(), &input.year)
            .await
            .inspect_err(|e| {
                log::error!("API error fetching models for make {}, year {}: {}", input.make, input.year, e)
            })
    }
}

/// Lists model years for a make and model.
pub struct VehicleYearsForMakeModel {
    client: Arc<SessionClient>,
}

#[derive(Debug, Deserialize)]
pub struct MakeModelArgs {
    #[serde(default)]
    pub make: String,
    #[serde(default)]
    pub model: String,
}

impl VehicleYearsForMakeModel {
    pub fn new(client: Arc<SessionClient>) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl Tool for VehicleYearsForMakeModel {
    type Input = MakeModelArgs;

    fn name(&self) -> &'static str {
        "get_vehicle_years_for_make_model"
    }

    fn description(&self) -> &'static str {
        "Lists available model years for a given make and model."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "make": {"type": "string", "description": "Vehicle make"},
                "model": {"type": "string", "description": "Vehicle model, e.g. \"RAV4\""}
            },
            "required": ["make", "model"]
        })
    }

    async fn run(&self, input: MakeModelArgs) -> ApiResult {
        log::info!("Tool: {} called for make: {}, model: {}", self.name(), input.make, input.model);
        require("make", &input.make)?;
        require("model", &input.model)?;

        self.client
            .fetch_vehicle_years(input.make.trim(), input.model.trim())
            .await
            .inspect_err(|e| {
                log::error!("API error fetching years for make {}, model {}: {}", input.make, input.model, e)
            })
    }
}
