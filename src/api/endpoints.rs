//! Typed calls for each backend capability.

use super::client::SessionClient;
use super::error::ApiResult;
use super::payloads::{
    BookingSearchQuery, MakeModelQuery, MakeYearQuery, OrderRequest, OrderSearchQuery,
    QuoteRequest, VinQuery, YearQuery,
};

impl SessionClient {
    pub async fn fetch_user_profile(&self) -> ApiResult {
        self.authenticated_get("get_user_profile", "/users/me", &(), self.timeouts().light())
            .await
    }

    pub async fn fetch_vehicle_specs(&self, vin: &str) -> ApiResult {
        self.anonymous_get(
            "fetch_vehicle_specs",
            "/function/vehicle",
            &VinQuery { vin },
            self.timeouts().light(),
        )
        .await
    }

    pub async fn fetch_vehicle_makes(&self, year: &str) -> ApiResult {
        self.anonymous_get(
            "fetch_vehicle_makes",
            "/function/makes",
            &YearQuery { year },
            self.timeouts().light(),
        )
        .await
    }

    pub async fn fetch_vehicle_models(&self, make: &str, year: &str) -> ApiResult {
        self.anonymous_get(
            "fetch_vehicle_models",
            "/function/model",
            &MakeYearQuery { make, year },
            self.timeouts().light(),
        )
        .await
    }

    pub async fn fetch_vehicle_years(&self, make: &str, model: &str) -> ApiResult {
        self.anonymous_get(
            "fetch_vehicle_years",
            "/function/year",
            &MakeModelQuery { make, model },
            self.timeouts().light(),
        )
        .await
    }

    pub async fn submit_for_quote(&self, payload: &QuoteRequest) -> ApiResult {
        self.anonymous_post(
            "submit_for_quote",
            "/trucking/check/prices",
            payload,
            self.timeouts().quote(),
        )
        .await
    }

    /// The quote id travels as a single encoded path segment, not a query parameter.
    pub async fn fetch_quote_details(&self, quote_id: &str) -> ApiResult {
        self.anonymous_get_item("fetch_quote_details", "/search/quote", quote_id, self.timeouts().light())
            .await
    }

    pub async fn search_trucking_orders(&self, query: &OrderSearchQuery<'_>) -> ApiResult {
        self.authenticated_get("search_trucking_orders", "/trucking", query, self.timeouts().search())
            .await
    }

    pub async fn search_bookings(&self, query: &BookingSearchQuery<'_>) -> ApiResult {
        self.authenticated_get("search_bookings", "/booking", query, self.timeouts().search())
            .await
    }

    pub async fn create_trucking_order(&self, payload: &OrderRequest) -> ApiResult {
        self.authenticated_post(
            "create_trucking_order",
            "/trucking",
            payload,
            self.timeouts().booking(),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use crate::api::client::tests::{login_mock, test_client};
    use crate::api::payloads::{BookingSearchQuery, OrderSearchQuery};
    use httpmock::prelude::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_quote_details_uses_path_parameter() {
        let server = MockServer::start();
        let details = server.mock(|when, then| {
            when.method(GET).path("/search/quote/abc123");
            then.status(200).json_body(json!({"quote": "abc123", "price": 950}));
        });

        let client = test_client(&server);
        let result = client.fetch_quote_details("abc123").await.unwrap();
        assert_eq!(result["price"], 950);
        details.assert();
    }

    #[tokio::test]
    async fn test_quote_id_cannot_add_query_or_fragment() {
        let server = MockServer::start();
        let truncated = server.mock(|when, then| {
            when.method(GET).path("/search/quote/abc");
            then.status(200).json_body(json!({"quote": "abc"}));
        });

        let client = test_client(&server);
        for quote_id in ["abc?admin=1", "abc#x"] {
            let err = client.fetch_quote_details(quote_id).await.unwrap_err();
            assert_eq!(err.status_code(), Some(404), "{quote_id} reached another resource");
        }
        assert_eq!(truncated.hits(), 0);
    }

    #[tokio::test]
    async fn test_order_search_omits_empty_search() {
        let server = MockServer::start();
        login_mock(&server, "T");
        let search = server.mock(|when, then| {
            when.method(GET)
                .path("/trucking")
                .query_param("limit", "10")
                .query_param("page", "1")
                .header("authorization", "T");
            then.status(200).json_body(json!({"data": []}));
        });
        let with_search = server.mock(|when, then| {
            when.method(GET).path("/trucking").query_param_exists("search");
            then.status(500);
        });

        let client = test_client(&server);
        client.login("ada@example.com", "secret").await.unwrap();
        let query = OrderSearchQuery { search: None, limit: 10, page: 1 };
        client.search_trucking_orders(&query).await.unwrap();

        search.assert();
        assert_eq!(with_search.hits(), 0);
    }

    #[tokio::test]
    async fn test_booking_search_renders_done_flag() {
        let server = MockServer::start();
        login_mock(&server, "T");
        let bookings = server.mock(|when, then| {
            when.method(GET)
                .path("/booking")
                .query_param("search", "rav4")
                .query_param("typeShipping", "OPEN")
                .query_param("done", "false")
                .query_param("limit", "5")
                .query_param("page", "2");
            then.status(200).json_body(json!({"data": [], "total": 0}));
        });

        let client = test_client(&server);
        client.login("ada@example.com", "secret").await.unwrap();
        let query = BookingSearchQuery {
            search: Some("rav4"),
            type_shipping: Some("OPEN"),
            done: Some(false),
            limit: 5,
            page: 2,
            ..Default::default()
        };
        let result = client.search_bookings(&query).await.unwrap();
        assert_eq!(result["total"], 0);
        bookings.assert();
    }
}
