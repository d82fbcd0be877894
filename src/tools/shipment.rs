use std::sync::Arc;

use chrono::{Datelike, NaiveDate, Utc};
use serde::Deserialize;
use serde_json::{json, Value};

use super::{non_empty, require, Tool};
use crate::api::payloads::{
    BookingSearchQuery, CodTerms, OrderAddress, OrderPrice, OrderRequest, OrderSearchQuery,
    OrderVehicle,
};
use crate::api::{ApiError, ApiResult, SessionClient};

const DEFAULT_LIMIT: u32 = 10;
const DEFAULT_PAGE: u32 = 1;

const STATE_ABBREVIATIONS: [(&str, &str); 50] = [
    ("alabama", "AL"), ("alaska", "AK"), ("arizona", "AZ"), ("arkansas", "AR"),
    ("california", "CA"), ("colorado", "CO"), ("connecticut", "CT"), ("delaware", "DE"),
    ("florida", "FL"), ("georgia", "GA"), ("hawaii", "HI"), ("idaho", "ID"),
    ("illinois", "IL"), ("indiana", "IN"), ("iowa", "IA"), ("kansas", "KS"),
    ("kentucky", "KY"), ("louisiana", "LA"), ("maine", "ME"), ("maryland", "MD"),
    ("massachusetts", "MA"), ("michigan", "MI"), ("minnesota", "MN"), ("mississippi", "MS"),
    ("missouri", "MO"), ("montana", "MT"), ("nebraska", "NE"), ("nevada", "NV"),
    ("new hampshire", "NH"), ("new jersey", "NJ"), ("new mexico", "NM"), ("new york", "NY"),
    ("north carolina", "NC"), ("north dakota", "ND"), ("ohio", "OH"), ("oklahoma", "OK"),
    ("oregon", "OR"), ("pennsylvania", "PA"), ("rhode island", "RI"), ("south carolina", "SC"),
    ("south dakota", "SD"), ("tennessee", "TN"), ("texas", "TX"), ("utah", "UT"),
    ("vermont", "VT"), ("virginia", "VA"), ("washington", "WA"), ("west virginia", "WV"),
    ("wisconsin", "WI"), ("wyoming", "WY"),
];

/// Map a full US state name to its postal code, case-insensitively.
/// Anything else (including codes already abbreviated) passes through.
pub fn state_abbreviation(state: &str) -> String {
    STATE_ABBREVIATIONS
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(state))
        .map(|(_, code)| code.to_string())
        .unwrap_or_else(|| state.to_string())
}

fn page_bounds(limit: Option<u32>, page: Option<u32>) -> ApiResult<(u32, u32)> {
    let limit = limit.unwrap_or(DEFAULT_LIMIT);
    let page = page.unwrap_or(DEFAULT_PAGE);
    if limit == 0 || page == 0 {
        return Err(ApiError::validation("limit and page must be at least 1."));
    }
    Ok((limit, page))
}

fn paging_schema() -> Value {
    json!({
        "limit": {"type": "integer", "minimum": 1, "default": DEFAULT_LIMIT},
        "page": {"type": "integer", "minimum": 1, "default": DEFAULT_PAGE}
    })
}

/// Simple search over the logged-in user's trucking orders.
pub struct SearchUserShipments {
    client: Arc<SessionClient>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ShipmentSearchArgs {
    pub search_query: Option<String>,
    pub limit: Option<u32>,
    pub page: Option<u32>,
}

impl SearchUserShipments {
    pub fn new(client: Arc<SessionClient>) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl Tool for SearchUserShipments {
    type Input = ShipmentSearchArgs;

    fn name(&self) -> &'static str {
        "search_user_shipments"
    }

    fn description(&self) -> &'static str {
        "Searches a logged-in user's shipments. A search query can be provided to filter results."
    }

    fn parameters(&self) -> Value {
        let mut properties = paging_schema();
        properties["search_query"] = json!({"type": "string"});
        json!({"type": "object", "properties": properties})
    }

    async fn run(&self, input: ShipmentSearchArgs) -> ApiResult {
        log::info!("Tool: {} called with query: {:?}", self.name(), input.search_query);
        let (limit, page) = page_bounds(input.limit, input.page)?;

        let query = OrderSearchQuery {
            search: non_empty(&input.search_query),
            limit,
            page,
        };
        self.client
            .search_trucking_orders(&query)
            .await
            .inspect_err(|e| log::error!("API error searching shipments: {}", e))
    }
}

/// Filtered search over the logged-in user's bookings.
pub struct SearchUserBookingsAdvanced {
    client: Arc<SessionClient>,
}

#[derive(Debug, Default, Deserialize)]
pub struct BookingSearchArgs {
    pub search_query: Option<String>,
    pub type_vehicle: Option<String>,
    pub type_shipping: Option<String>,
    pub is_completed: Option<bool>,
    pub limit: Option<u32>,
    pub page: Option<u32>,
}

impl SearchUserBookingsAdvanced {
    pub fn new(client: Arc<SessionClient>) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl Tool for SearchUserBookingsAdvanced {
    type Input = BookingSearchArgs;

    fn name(&self) -> &'static str {
        "search_user_bookings_advanced"
    }

    fn description(&self) -> &'static str {
        "Performs an advanced search on a user's bookings with multiple optional filters."
    }

    fn parameters(&self) -> Value {
        let mut properties = paging_schema();
        properties["search_query"] = json!({"type": "string"});
        properties["type_vehicle"] = json!({"type": "string"});
        properties["type_shipping"] = json!({"type": "string"});
        properties["is_completed"] = json!({"type": "boolean"});
        json!({"type": "object", "properties": properties})
    }

    async fn run(&self, input: BookingSearchArgs) -> ApiResult {
        log::info!(
            "Tool: {} called with query: {:?}, type_vehicle: {:?}, type_shipping: {:?}, is_completed: {:?}",
            self.name(),
            input.search_query,
            input.type_vehicle,
            input.type_shipping,
            input.is_completed
        );
        let (limit, page) = page_bounds(input.limit, input.page)?;

        let query = BookingSearchQuery {
            search: non_empty(&input.search_query),
            type_vehicle: non_empty(&input.type_vehicle),
            type_shipping: non_empty(&input.type_shipping),
            done: input.is_completed,
            limit,
            page,
        };
        self.client
            .search_bookings(&query)
            .await
            .inspect_err(|e| log::error!("API error searching bookings: {}", e))
    }
}

/// Books a vehicle transport for the logged-in user.
pub struct CreateTruckingShipment {
    client: Arc<SessionClient>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ShipmentArgs {
    #[serde(default)]
    pub origin_city: String,
    #[serde(default)]
    pub origin_state: String,
    #[serde(default)]
    pub origin_zip: String,
    #[serde(default)]
    pub destination_city: String,
    #[serde(default)]
    pub destination_state: String,
    #[serde(default)]
    pub destination_zip: String,
    #[serde(default)]
    pub trailer_type: String,
    pub vehicle_year: Option<i32>,
    #[serde(default)]
    pub vehicle_make: String,
    #[serde(default)]
    pub vehicle_model: String,
    /// `YYYY-MM-DD`
    #[serde(default)]
    pub available_date: String,
    pub total_price: Option<f64>,
    pub cod_amount: Option<f64>,
    #[serde(default = "default_vehicle_type")]
    pub vehicle_type: String,
    #[serde(default = "default_cod_payment_method")]
    pub cod_payment_method: String,
    #[serde(default = "default_cod_payment_location")]
    pub cod_payment_location: String,
    pub origin_address1: Option<String>,
    pub origin_address2: Option<String>,
    pub origin_phone: Option<String>,
    pub origin_location_type: Option<String>,
    #[serde(default)]
    pub origin_forklift: bool,
    pub destination_address1: Option<String>,
    pub destination_address2: Option<String>,
    pub destination_phone: Option<String>,
    pub destination_location_type: Option<String>,
    #[serde(default)]
    pub destination_forklift: bool,
    #[serde(default)]
    pub is_inoperable: bool,
    pub pickup_instructions: Option<String>,
    #[serde(default)]
    pub save_contact: bool,
    #[serde(default = "default_vehicle_qty")]
    pub vehicle_qty: u32,
}

fn default_vehicle_type() -> String {
    "SUV".to_string()
}

fn default_cod_payment_method() -> String {
    "CASH_CERTIFIED_FUNDS".to_string()
}

fn default_cod_payment_location() -> String {
    "Delivery".to_string()
}

fn default_vehicle_qty() -> u32 {
    1
}

fn require_amount(field: &str, value: Option<f64>) -> ApiResult<f64> {
    match value {
        Some(v) if v.is_finite() && v >= 0.0 => Ok(v),
        _ => Err(ApiError::validation(format!(
            "Missing or invalid value for {}. Must be a non-negative number.",
            field
        ))),
    }
}

fn require_date(field: &str, value: &str) -> ApiResult<()> {
    let parsed = NaiveDate::parse_from_str(value, "%Y-%m-%d").ok();
    match parsed {
        // Round-trip so "2025-1-5" style dates are rejected too.
        Some(date) if date.format("%Y-%m-%d").to_string() == value => Ok(()),
        _ => Err(ApiError::validation(format!(
            "Invalid {} provided. Must be a date in YYYY-MM-DD format.",
            field
        ))),
    }
}

fn optional(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl CreateTruckingShipment {
    pub fn new(client: Arc<SessionClient>) -> Self {
        Self { client }
    }

    /// Validate the arguments and shape the order payload.
    fn build_request(input: ShipmentArgs) -> ApiResult<OrderRequest> {
        let required = [
            ("origin_city", &input.origin_city),
            ("origin_state", &input.origin_state),
            ("origin_zip", &input.origin_zip),
            ("destination_city", &input.destination_city),
            ("destination_state", &input.destination_state),
            ("destination_zip", &input.destination_zip),
            ("trailer_type", &input.trailer_type),
            ("vehicle_make", &input.vehicle_make),
            ("vehicle_model", &input.vehicle_model),
            ("vehicle_type", &input.vehicle_type),
            ("cod_payment_method", &input.cod_payment_method),
            ("cod_payment_location", &input.cod_payment_location),
        ];
        for (field, value) in required {
            require(field, value)?;
        }

        let latest_year = Utc::now().year() + 1;
        let year = match input.vehicle_year {
            Some(year) if (1900..=latest_year).contains(&year) => year,
            _ => {
                return Err(ApiError::validation(format!(
                    "Invalid vehicle_year provided. Must be between 1900 and {}.",
                    latest_year
                )))
            }
        };
        require_date("available_date", &input.available_date)?;
        let total = require_amount("total_price", input.total_price)?;
        let cod_amount = require_amount("cod_amount", input.cod_amount)?;
        if input.vehicle_qty == 0 {
            return Err(ApiError::validation("vehicle_qty must be at least 1."));
        }

        Ok(OrderRequest {
            origin: OrderAddress {
                city: input.origin_city,
                state: state_abbreviation(&input.origin_state),
                zip: input.origin_zip,
                forklift: input.origin_forklift,
                address1: optional(input.origin_address1),
                address2: optional(input.origin_address2),
                phone: optional(input.origin_phone),
                location_type: optional(input.origin_location_type),
            },
            destination: OrderAddress {
                city: input.destination_city,
                state: state_abbreviation(&input.destination_state),
                zip: input.destination_zip,
                forklift: input.destination_forklift,
                address1: optional(input.destination_address1),
                address2: optional(input.destination_address2),
                phone: optional(input.destination_phone),
                location_type: optional(input.destination_location_type),
            },
            trailer_type: input.trailer_type,
            vehicles: vec![OrderVehicle {
                year,
                make: input.vehicle_make,
                model: input.vehicle_model,
                vehicle_type: input.vehicle_type,
                qty: input.vehicle_qty,
            }],
            available_date: input.available_date,
            has_inop_vehicle: input.is_inoperable,
            save_contact: input.save_contact,
            price: OrderPrice {
                total,
                cod: CodTerms {
                    amount: cod_amount,
                    payment_method: input.cod_payment_method,
                    payment_location: input.cod_payment_location,
                },
            },
            pickup_instructions: optional(input.pickup_instructions),
        })
    }
}

#[async_trait::async_trait]
impl Tool for CreateTruckingShipment {
    type Input = ShipmentArgs;

    fn name(&self) -> &'static str {
        "create_trucking_shipment"
    }

    fn description(&self) -> &'static str {
        "Creates a new trucking shipment to book a vehicle transport. Collect origin, destination, \
         vehicle, date and price details first; use full state names or postal codes."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "origin_city": {"type": "string"},
                "origin_state": {"type": "string"},
                "origin_zip": {"type": "string"},
                "destination_city": {"type": "string"},
                "destination_state": {"type": "string"},
                "destination_zip": {"type": "string"},
                "trailer_type": {"type": "string"},
                "vehicle_year": {"type": "integer"},
                "vehicle_make": {"type": "string"},
                "vehicle_model": {"type": "string"},
                "available_date": {"type": "string", "description": "YYYY-MM-DD"},
                "total_price": {"type": "number"},
                "cod_amount": {"type": "number"},
                "vehicle_type": {"type": "string", "default": "SUV"},
                "cod_payment_method": {"type": "string", "default": "CASH_CERTIFIED_FUNDS"},
                "cod_payment_location": {"type": "string", "default": "Delivery"},
                "origin_address1": {"type": "string"},
                "origin_address2": {"type": "string"},
                "origin_phone": {"type": "string"},
                "origin_location_type": {"type": "string"},
                "origin_forklift": {"type": "boolean", "default": false},
                "destination_address1": {"type": "string"},
                "destination_address2": {"type": "string"},
                "destination_phone": {"type": "string"},
                "destination_location_type": {"type": "string"},
                "destination_forklift": {"type": "boolean", "default": false},
                "is_inoperable": {"type": "boolean", "default": false},
                "pickup_instructions": {"type": "string"},
                "save_contact": {"type": "boolean", "default": false},
                "vehicle_qty": {"type": "integer", "minimum": 1, "default": 1}
            },
            "required": [
                "origin_city", "origin_state", "origin_zip",
                "destination_city", "destination_state", "destination_zip",
                "trailer_type", "vehicle_year", "vehicle_make", "vehicle_model",
                "available_date", "total_price", "cod_amount"
            ]
        })
    }

    async fn run(&self, input: ShipmentArgs) -> ApiResult {
        log::info!(
            "Tool: {} called for {:?} {} {}.",
            self.name(),
            input.vehicle_year,
            input.vehicle_make,
            input.vehicle_model
        );
        let payload = Self::build_request(input)?;
        log::debug!("Submitting booking payload: {:?}", payload);

        let result = self.client.create_trucking_order(&payload).await;
        match &result {
            Ok(body) => match body.get("orderId") {
                Some(order_id) => log::info!("Booked order {}", order_id),
                None => log::warn!("create_trucking_order response had no 'orderId': {}", body),
            },
            Err(e) => log::error!("API error creating shipment: {}", e),
        }
        result
    }
}
