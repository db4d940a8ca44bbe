use serde_json::json;
use tablebook_core::search::SearchCriteria;
use tablebook_core::session::Credentials;
use tablebook_core::ClientError;
use tablebook_gateway::api::{ApiClient, CreateReservationRequest};
use tablebook_gateway::app_config::ApiConfig;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> ApiClient {
    ApiClient::new(&ApiConfig {
        base_url: server.uri(),
        timeout_seconds: 5,
    })
    .unwrap()
}

fn criteria() -> SearchCriteria {
    SearchCriteria {
        date: "2025-05-04".to_string(),
        time: "19:00".to_string(),
        people: 2,
        city: Some("San Jose".to_string()),
        state: None,
        zip: None,
    }
}

#[tokio::test]
async fn login_returns_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/users/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "tok-abc", "token_type": "bearer"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let api = client_for(&server);
    let response = api
        .login(&Credentials {
            email: "a@b.com".to_string(),
            password: "x".to_string(),
        })
        .await
        .unwrap();

    assert_eq!(response.access_token.as_deref(), Some("tok-abc"));
}

#[tokio::test]
async fn rejected_credentials_become_auth_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/users/login"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "detail": "Invalid credentials"
        })))
        .mount(&server)
        .await;

    let api = client_for(&server);
    let err = api
        .login(&Credentials {
            email: "a@b.com".to_string(),
            password: "wrong".to_string(),
        })
        .await
        .unwrap_err();

    match err {
        ClientError::Auth(message) => assert_eq!(message, "Invalid credentials"),
        other => panic!("expected Auth, got {:?}", other),
    }
}

#[tokio::test]
async fn unreachable_server_is_a_network_error_without_status() {
    // Nothing is listening on this port
    let api = ApiClient::new(&ApiConfig {
        base_url: "http://127.0.0.1:9".to_string(),
        timeout_seconds: 1,
    })
    .unwrap();

    let err = api.my_reservations().await.unwrap_err();
    assert!(matches!(err, ClientError::Network));
    assert_eq!(err.status(), None);
    assert_eq!(err.to_string(), "Network Error");
}

#[tokio::test]
async fn bearer_token_is_attached_once_set() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/restaurants/my-reservations"))
        .and(header("authorization", "Bearer tok-abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let api = client_for(&server);
    api.set_token(Some("tok-abc".to_string()));
    let reservations = api.my_reservations().await.unwrap();
    assert!(reservations.is_empty());
}

#[tokio::test]
async fn availability_not_found_reads_as_empty_not_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/restaurants/availability"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "detail": "No available restaurants found."
        })))
        .mount(&server)
        .await;

    let api = client_for(&server);
    let rows = api.search_availability(&criteria()).await.unwrap();
    assert!(rows.is_empty());
}

#[tokio::test]
async fn availability_rows_are_canonicalized() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/restaurants/availability"))
        .and(query_param("date", "2025-05-04"))
        .and(query_param("people", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "restaurant_id": 3, "restaurant_name": "Trattoria", "city": "San Jose",
                "cuisine_type": "Italian", "costRating": 2, "rating": 4.5,
                "available_time": "19:00", "table_id": 14
            }
        ])))
        .mount(&server)
        .await;

    let api = client_for(&server);
    let rows = api.search_availability(&criteria()).await.unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].cuisine, "Italian");
    assert_eq!(rows[0].cost_rating, 2);
}

#[tokio::test]
async fn booking_conflict_surfaces_status_and_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/restaurants/3/book"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "detail": "This table is already reserved within the selected time window."
        })))
        .mount(&server)
        .await;

    let api = client_for(&server);
    let err = api
        .create_reservation(
            3,
            &CreateReservationRequest {
                date: "2025-05-04".to_string(),
                time: "19:00".to_string(),
                number_of_people: 2,
                table_id: 14,
            },
        )
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(400));
    assert!(err.to_string().contains("already reserved"));
}

#[tokio::test]
async fn error_body_without_known_fields_gets_generic_message() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/restaurants/cancel/42"))
        .respond_with(ResponseTemplate::new(500).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let api = client_for(&server);
    let err = api.cancel_reservation("42").await.unwrap_err();

    match err {
        ClientError::Server { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "An error occurred");
        }
        other => panic!("expected Server, got {:?}", other),
    }
}

#[tokio::test]
async fn my_reservations_rows_become_server_provenance() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/restaurants/my-reservations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "reservation_id": 11, "restaurant": "Trattoria",
                "date": "2025-05-04", "time": "19:00", "number_of_people": 2
            },
            {
                "id": 12, "restaurant_name": "Izakaya",
                "date": "2025-05-05", "time": "18:30", "people": 4
            }
        ])))
        .mount(&server)
        .await;

    let api = client_for(&server);
    let reservations = api.my_reservations().await.unwrap();

    assert_eq!(reservations.len(), 2);
    assert_eq!(reservations[0].id, "11");
    assert_eq!(reservations[1].people, 4);
    assert!(reservations.iter().all(|r| !r.is_local()));
}
