use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::RwLock;
use std::time::Duration;
use tablebook_core::booking::{Provenance, Reservation, ReservationStatus};
use tablebook_core::search::{AvailabilitySlot, SearchCriteria};
use tablebook_core::session::{Credentials, RegisterProfile, Role};
use tablebook_core::{ClientError, ClientResult};

use crate::app_config::ApiConfig;

/// The single HTTP client every remote operation goes through. Attaches the
/// bearer token when one is set and normalizes every failure to
/// `ClientError` before it reaches a caller.
pub struct ApiClient {
    http: Client,
    base_url: String,
    token: RwLock<Option<String>>,
}

impl ApiClient {
    pub fn new(config: &ApiConfig) -> ClientResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| ClientError::Validation(format!("http client setup failed: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: RwLock::new(None),
        })
    }

    /// Replace the bearer token used on subsequent requests. `None` drops
    /// authentication entirely (logout).
    pub fn set_token(&self, token: Option<String>) {
        if let Ok(mut guard) = self.token.write() {
            *guard = token;
        }
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let mut builder = self.http.request(method, format!("{}{}", self.base_url, path));
        if let Ok(guard) = self.token.read() {
            if let Some(token) = guard.as_ref() {
                builder = builder.bearer_auth(token);
            }
        }
        builder
    }

    async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> ClientResult<T> {
        let response = builder.send().await.map_err(|_| ClientError::Network)?;
        if response.status().is_success() {
            response
                .json::<T>()
                .await
                .map_err(|e| ClientError::Validation(format!("unexpected response body: {}", e)))
        } else {
            Err(read_error(response).await)
        }
    }

    async fn send_unit(&self, builder: RequestBuilder) -> ClientResult<()> {
        let response = builder.send().await.map_err(|_| ClientError::Network)?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(read_error(response).await)
        }
    }

    // ------------------------------------------------------------------
    // Auth
    // ------------------------------------------------------------------

    pub async fn login(&self, credentials: &Credentials) -> ClientResult<TokenResponse> {
        self.send_json(self.request(Method::POST, "/users/login").json(credentials))
            .await
    }

    pub async fn register(&self, profile: &RegisterProfile) -> ClientResult<TokenResponse> {
        self.send_json(self.request(Method::POST, "/users/register").json(profile))
            .await
    }

    pub async fn profile(&self) -> ClientResult<Profile> {
        self.send_json(self.request(Method::GET, "/users/me")).await
    }

    // ------------------------------------------------------------------
    // Search
    // ------------------------------------------------------------------

    /// Flat availability rows matching the criteria. A 404 from the server
    /// means "nothing matched" and is returned as an empty list, not an
    /// error.
    pub async fn search_availability(
        &self,
        criteria: &SearchCriteria,
    ) -> ClientResult<Vec<AvailabilitySlot>> {
        let mut query: Vec<(&str, String)> = vec![
            ("date", criteria.date.clone()),
            ("time", criteria.time.clone()),
            ("people", criteria.people.to_string()),
        ];
        if let Some(city) = &criteria.city {
            query.push(("city", city.clone()));
        }
        if let Some(state) = &criteria.state {
            query.push(("state", state.clone()));
        }
        if let Some(zip) = &criteria.zip {
            query.push(("zip_code", zip.clone()));
        }

        let rows: Vec<AvailabilityRow> = match self
            .send_json(self.request(Method::GET, "/restaurants/availability").query(&query))
            .await
        {
            Ok(rows) => rows,
            Err(ClientError::Server { status: 404, .. }) => Vec::new(),
            Err(err) => return Err(err),
        };

        Ok(rows.into_iter().map(AvailabilitySlot::from).collect())
    }

    /// Restaurant summaries matching the filters; 404 is an empty list.
    pub async fn search_restaurants(
        &self,
        city: Option<&str>,
        state: Option<&str>,
        cuisine: Option<&str>,
    ) -> ClientResult<Vec<RestaurantInfo>> {
        let mut query: Vec<(&str, String)> = Vec::new();
        if let Some(city) = city {
            query.push(("city", city.to_string()));
        }
        if let Some(state) = state {
            query.push(("state", state.to_string()));
        }
        if let Some(cuisine) = cuisine {
            query.push(("cuisine", cuisine.to_string()));
        }

        let rows: Vec<RestaurantRow> = match self
            .send_json(self.request(Method::GET, "/restaurants/search").query(&query))
            .await
        {
            Ok(rows) => rows,
            Err(ClientError::Server { status: 404, .. }) => Vec::new(),
            Err(err) => return Err(err),
        };

        Ok(rows.into_iter().map(RestaurantInfo::from).collect())
    }

    pub async fn restaurant_details(&self, restaurant_id: i64) -> ClientResult<RestaurantInfo> {
        let row: RestaurantRow = self
            .send_json(self.request(Method::GET, &format!("/restaurants/{}", restaurant_id)))
            .await?;
        Ok(RestaurantInfo::from(row))
    }

    // ------------------------------------------------------------------
    // Reservations
    // ------------------------------------------------------------------

    pub async fn create_reservation(
        &self,
        restaurant_id: i64,
        request: &CreateReservationRequest,
    ) -> ClientResult<CreateReservationResponse> {
        self.send_json(
            self.request(Method::POST, &format!("/restaurants/{}/book", restaurant_id))
                .json(request),
        )
        .await
    }

    pub async fn cancel_reservation(&self, reservation_id: &str) -> ClientResult<()> {
        self.send_unit(self.request(
            Method::DELETE,
            &format!("/restaurants/cancel/{}", reservation_id),
        ))
        .await
    }

    pub async fn my_reservations(&self) -> ClientResult<Vec<Reservation>> {
        let rows: Vec<ReservationRow> = self
            .send_json(self.request(Method::GET, "/restaurants/my-reservations"))
            .await?;
        Ok(rows.into_iter().map(Reservation::from).collect())
    }

    pub async fn send_confirmation_email(&self, reservation_id: &str) -> ClientResult<()> {
        self.send_unit(
            self.request(Method::POST, "/restaurants/send-confirmation-email")
                .json(&serde_json::json!({ "reservation_id": reservation_id })),
        )
        .await
    }

    // ------------------------------------------------------------------
    // Manager / admin surface. The server enforces the role behind these;
    // the client only decides whether to offer them.
    // ------------------------------------------------------------------

    pub async fn manager_restaurants(&self) -> ClientResult<Vec<RestaurantInfo>> {
        let rows: Vec<RestaurantRow> = self
            .send_json(self.request(Method::GET, "/manager/restaurants"))
            .await?;
        Ok(rows.into_iter().map(RestaurantInfo::from).collect())
    }

    pub async fn upsert_listing(&self, listing: &ListingUpsert) -> ClientResult<()> {
        self.send_unit(self.request(Method::POST, "/manager/restaurants").json(listing))
            .await
    }

    pub async fn pending_restaurants(&self) -> ClientResult<Vec<RestaurantInfo>> {
        let rows: Vec<RestaurantRow> = self
            .send_json(self.request(Method::GET, "/restaurants/pending"))
            .await?;
        Ok(rows.into_iter().map(RestaurantInfo::from).collect())
    }

    pub async fn approve_restaurant(&self, restaurant_id: i64) -> ClientResult<()> {
        self.send_unit(self.request(
            Method::PUT,
            &format!("/restaurants/approve/{}", restaurant_id),
        ))
        .await
    }

    pub async fn remove_restaurant(&self, restaurant_id: i64) -> ClientResult<()> {
        self.send_unit(self.request(Method::DELETE, &format!("/restaurants/{}", restaurant_id)))
            .await
    }

    pub async fn dashboard_analytics(&self) -> ClientResult<DashboardAnalytics> {
        self.send_json(self.request(Method::GET, "/dashboard/analytics"))
            .await
    }
}

/// Pull a human-readable message out of whatever error body the server
/// sent. Known spellings are `message` (the node-style API), `detail`
/// (FastAPI) and `error`; anything else gets the generic fallback.
async fn read_error(response: reqwest::Response) -> ClientError {
    let status = response.status();
    let message = response
        .json::<WireError>()
        .await
        .ok()
        .and_then(|e| e.message.or(e.detail).or(e.error))
        .unwrap_or_else(|| "An error occurred".to_string());

    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        ClientError::Auth(message)
    } else {
        ClientError::Server {
            status: status.as_u16(),
            message,
        }
    }
}

#[derive(Debug, Deserialize)]
struct WireError {
    message: Option<String>,
    detail: Option<String>,
    error: Option<String>,
}

// ----------------------------------------------------------------------
// Wire shapes. Field-name variants the server has used are folded into one
// canonical form here; nothing past the gateway sees the raw spellings.
// ----------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    #[serde(alias = "token")]
    pub access_token: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Profile {
    pub id: i64,
    pub email: String,
    #[serde(alias = "fullName", alias = "name")]
    pub full_name: String,
    pub role: Role,
}

#[derive(Debug, Deserialize)]
struct AvailabilityRow {
    #[serde(alias = "restaurantId")]
    restaurant_id: i64,
    #[serde(alias = "restaurantName", alias = "name")]
    restaurant_name: String,
    #[serde(default)]
    city: String,
    #[serde(alias = "cuisine_type", default)]
    cuisine: String,
    #[serde(alias = "costRating", default)]
    cost_rating: i32,
    #[serde(default)]
    rating: f64,
    #[serde(alias = "availableTime", alias = "time")]
    available_time: String,
    #[serde(alias = "tableId")]
    table_id: i64,
}

impl From<AvailabilityRow> for AvailabilitySlot {
    fn from(row: AvailabilityRow) -> Self {
        AvailabilitySlot {
            restaurant_id: row.restaurant_id,
            restaurant_name: row.restaurant_name,
            city: row.city,
            cuisine: row.cuisine,
            cost_rating: row.cost_rating,
            rating: row.rating,
            available_time: row.available_time,
            table_id: row.table_id,
        }
    }
}

/// Canonical restaurant details, however the server chose to spell them.
#[derive(Debug, Clone)]
pub struct RestaurantInfo {
    pub id: Option<i64>,
    pub name: String,
    pub cuisine: Option<String>,
    pub cost_rating: Option<i32>,
    pub rating: Option<f64>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub address: Option<String>,
    pub contact_email: Option<String>,
    pub maps_url: Option<String>,
}

impl RestaurantInfo {
    /// Minimal details synthesized when every remote lookup failed.
    pub fn fallback(id: Option<i64>, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            cuisine: None,
            cost_rating: None,
            rating: None,
            city: None,
            state: None,
            address: None,
            contact_email: None,
            maps_url: None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RestaurantRow {
    #[serde(default, alias = "restaurant_id", alias = "restaurantId")]
    id: Option<i64>,
    name: String,
    #[serde(default, alias = "cuisine_type", alias = "cuisineType")]
    cuisine: Option<String>,
    #[serde(default, alias = "costRating")]
    cost_rating: Option<i32>,
    #[serde(default)]
    rating: Option<f64>,
    #[serde(default)]
    city: Option<String>,
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    address: Option<WireAddress>,
    #[serde(default, alias = "contactEmail")]
    contact_email: Option<String>,
    #[serde(default)]
    maps_url: Option<String>,
}

/// The server has returned addresses both as one string and as a
/// structured object; both collapse to one display string here.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WireAddress {
    Flat(String),
    Structured {
        #[serde(default)]
        street: Option<String>,
        #[serde(default)]
        city: Option<String>,
        #[serde(default)]
        state: Option<String>,
        #[serde(default, alias = "zipCode")]
        zip_code: Option<String>,
    },
}

impl WireAddress {
    fn into_display(self) -> String {
        match self {
            WireAddress::Flat(s) => s,
            WireAddress::Structured {
                street,
                city,
                state,
                zip_code,
            } => [street, city, state, zip_code]
                .into_iter()
                .flatten()
                .filter(|part| !part.is_empty())
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

impl From<RestaurantRow> for RestaurantInfo {
    fn from(row: RestaurantRow) -> Self {
        RestaurantInfo {
            id: row.id,
            name: row.name,
            cuisine: row.cuisine,
            cost_rating: row.cost_rating,
            rating: row.rating,
            city: row.city,
            state: row.state,
            address: row.address.map(WireAddress::into_display),
            contact_email: row.contact_email,
            maps_url: row.maps_url,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CreateReservationRequest {
    pub date: String,
    pub time: String,
    pub number_of_people: u32,
    pub table_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct CreateReservationResponse {
    #[serde(default, alias = "id")]
    pub reservation_id: Option<i64>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ReservationRow {
    #[serde(alias = "id")]
    reservation_id: i64,
    #[serde(alias = "restaurant_name", alias = "restaurantName")]
    restaurant: String,
    #[serde(default, alias = "restaurantId")]
    restaurant_id: Option<i64>,
    date: String,
    time: String,
    #[serde(alias = "people", alias = "party_size", alias = "partySize")]
    number_of_people: u32,
}

impl From<ReservationRow> for Reservation {
    fn from(row: ReservationRow) -> Self {
        Reservation {
            id: row.reservation_id.to_string(),
            restaurant: row.restaurant,
            restaurant_id: row.restaurant_id,
            date: row.date,
            time: row.time,
            people: row.number_of_people,
            status: ReservationStatus::Confirmed,
            provenance: Provenance::Server,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ListingUpsert {
    pub name: String,
    pub cuisine: String,
    pub cost_rating: i32,
    pub city: String,
    pub state: String,
    pub zip_code: String,
}

#[derive(Debug, Deserialize)]
pub struct DashboardAnalytics {
    #[serde(default)]
    pub total_reservations: i64,
    #[serde(default)]
    pub total_restaurants: i64,
    #[serde(default)]
    pub pending_approvals: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_availability_row_accepts_field_variants() {
        let canonical: AvailabilityRow = serde_json::from_value(serde_json::json!({
            "restaurant_id": 3, "restaurant_name": "Trattoria", "city": "San Jose",
            "cuisine": "Italian", "cost_rating": 2, "rating": 4.5,
            "available_time": "19:00", "table_id": 14
        }))
        .unwrap();
        assert_eq!(canonical.cuisine, "Italian");

        let variant: AvailabilityRow = serde_json::from_value(serde_json::json!({
            "restaurantId": 3, "restaurantName": "Trattoria",
            "cuisine_type": "Italian", "costRating": 2,
            "availableTime": "19:00", "tableId": 14
        }))
        .unwrap();
        assert_eq!(variant.cuisine, "Italian");
        assert_eq!(variant.restaurant_id, 3);
        // Absent optional fields get defaults instead of failing the row
        assert_eq!(variant.city, "");
        assert_eq!(variant.rating, 0.0);
    }

    #[test]
    fn test_reservation_row_party_size_variants() {
        for key in ["number_of_people", "people", "party_size"] {
            let row: ReservationRow = serde_json::from_value(serde_json::json!({
                "reservation_id": 9, "restaurant": "Trattoria",
                "date": "2025-05-04", "time": "19:00", key: 4
            }))
            .unwrap();
            assert_eq!(row.number_of_people, 4);
        }
    }

    #[test]
    fn test_structured_and_flat_addresses_collapse() {
        let flat: RestaurantRow = serde_json::from_value(serde_json::json!({
            "name": "Trattoria", "address": "1 Main St, San Jose"
        }))
        .unwrap();
        let info = RestaurantInfo::from(flat);
        assert_eq!(info.address.as_deref(), Some("1 Main St, San Jose"));

        let structured: RestaurantRow = serde_json::from_value(serde_json::json!({
            "name": "Trattoria",
            "address": {"street": "1 Main St", "city": "San Jose", "state": "CA", "zipCode": "95112"}
        }))
        .unwrap();
        let info = RestaurantInfo::from(structured);
        assert_eq!(info.address.as_deref(), Some("1 Main St, San Jose, CA, 95112"));
    }
}
