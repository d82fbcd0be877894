//! Request and response bodies for the trucking backend.
//!
//! Field names follow the backend verbatim, including its mixed casing
//! (`Ip`, `LocationType`, `PickupInstructions`, `hasInOpvehicle`).

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    #[serde(rename = "_token")]
    pub token: Option<String>,
    /// Kept raw so an unexpected user shape never hides the token.
    #[serde(default)]
    pub user: Option<Value>,
}

/// The logged-in user as returned by `/auth/login`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub email: Option<String>,
    pub country: Option<String>,
    pub state: Option<String>,
    pub city: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct VinQuery<'a> {
    pub vin: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub struct YearQuery<'a> {
    pub year: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub struct MakeYearQuery<'a> {
    pub make: &'a str,
    pub year: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub struct MakeModelQuery<'a> {
    pub make: &'a str,
    pub model: &'a str,
}

/// `/trucking/check/prices` body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuoteRequest {
    #[serde(rename = "Ip")]
    pub ip: String,
    pub firstname: String,
    pub lastname: String,
    pub email: String,
    pub country: String,
    pub state: Option<String>,
    pub city: Option<String>,
    #[serde(rename = "offerPrice")]
    pub offer_price: String,
    #[serde(rename = "stopNumber1")]
    pub stop_number1: QuoteStop,
    #[serde(rename = "stopNumber2")]
    pub stop_number2: QuoteStop,
    pub vehicles: Vec<QuoteVehicle>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuoteStop {
    pub city: String,
    pub state: String,
    pub country: String,
    pub code: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteVehicle {
    pub year: String,
    pub make: String,
    pub model: String,
    pub vehicle_type: String,
    pub operable: bool,
    pub pick_up_stop_number: u8,
    pub drop_off_stop_number: u8,
}

/// A quote submission response. The id is optional because the backend
/// sometimes omits it on a 2xx.
#[derive(Debug, Clone, Deserialize)]
pub struct QuoteSubmission {
    pub quote: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct OrderSearchQuery<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<&'a str>,
    pub limit: u32,
    pub page: u32,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BookingSearchQuery<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<&'a str>,
    #[serde(rename = "typeVehicle", skip_serializing_if = "Option::is_none")]
    pub type_vehicle: Option<&'a str>,
    #[serde(rename = "typeShipping", skip_serializing_if = "Option::is_none")]
    pub type_shipping: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub done: Option<bool>,
    pub limit: u32,
    pub page: u32,
}

/// `POST /trucking` body.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    pub origin: OrderAddress,
    pub destination: OrderAddress,
    pub trailer_type: String,
    pub vehicles: Vec<OrderVehicle>,
    /// `YYYY-MM-DD`
    pub available_date: String,
    #[serde(rename = "hasInOpvehicle")]
    pub has_inop_vehicle: bool,
    pub save_contact: bool,
    pub price: OrderPrice,
    #[serde(rename = "PickupInstructions", skip_serializing_if = "Option::is_none")]
    pub pickup_instructions: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderAddress {
    pub city: String,
    pub state: String,
    pub zip: String,
    pub forklift: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address1: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address2: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(rename = "LocationType", skip_serializing_if = "Option::is_none")]
    pub location_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderVehicle {
    pub year: i32,
    pub make: String,
    pub model: String,
    pub vehicle_type: String,
    pub qty: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderPrice {
    pub total: f64,
    pub cod: CodTerms,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CodTerms {
    pub amount: f64,
    pub payment_method: String,
    pub payment_location: String,
}
