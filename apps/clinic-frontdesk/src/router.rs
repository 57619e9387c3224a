//! Roteador HTTP da recepção
//!
//! API JSON sob `/api/`, páginas HTML em `/dashboard` e `/prescription/:token`.
//! O limite de concorrência é um único semáforo para toda a árvore `/api`;
//! as páginas ficam fora dele porque buscam os dados na própria API.

use axum::routing::{get, post};
use axum::Router;
use tower::limit::ConcurrencyLimitLayer;
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::api;
use crate::state::AppState;
use crate::views;

fn api_routes(state: AppState) -> Router {
    Router::new()
        .route("/appointments", get(api::list_appointments).post(api::book_appointment))
        .route("/check-in/search", post(api::search_appointment))
        .route("/check-in", post(api::check_in))
        .route("/slots", get(api::slots))
        .route("/patients", post(api::register_patient))
        .route("/patients/age", get(api::age))
        .route("/patients/:id", get(api::get_patient))
        .route("/patients/:id/history", get(api::patient_history))
        .route("/billing", get(api::billing))
        .route("/billing/tests", get(api::price_table))
        .route("/consultations", get(api::list_consultations).post(api::submit_consultation))
        .route("/prescription/:token", get(api::prescription))
        .with_state(state)
}

pub fn build_router(state: AppState, concurrency_limit: usize) -> Router {
    let limited_api = ServiceBuilder::new()
        .layer(ConcurrencyLimitLayer::new(concurrency_limit))
        .service(api_routes(state.clone()));

    Router::new()
        .route("/health", get(api::health))
        .route("/dashboard", get(views::dashboard))
        .route("/prescription/:token", get(views::prescription))
        .nest_service("/api", limited_api)
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;
    use std::sync::Arc;
    use std::time::Duration;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use chrono::NaiveDate;
    use clinic_core::checkin::CheckInDesk;
    use clinic_core::db::{init_db_pool, DbConfig};
    use clinic_core::models::ConsultationRecord;
    use clinic_core::registration::Clock;
    use serde_json::{json, Value};
    use tempfile::TempDir;
    use tower::ServiceExt;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::backend::BackendClient;

    struct FixedClock(NaiveDate);

    impl Clock for FixedClock {
        fn today(&self) -> NaiveDate {
            self.0
        }
    }

    async fn test_state(backend_url: &str) -> (AppState, TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let pool = init_db_pool(&DbConfig {
            db_path: dir.path().join("frontdesk.db").to_string_lossy().to_string(),
            max_connections: 2,
        })
        .await
        .unwrap();
        let backend = BackendClient::new(backend_url, Duration::from_secs(2)).unwrap();
        let clock = Arc::new(FixedClock(NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()));
        let state = AppState::new(CheckInDesk::with_mock_data(), pool, backend, "http://clinic.test").with_clock(clock);
        (state, dir)
    }

    fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = hyper::body::to_bytes(response.into_body()).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn body_text(response: axum::response::Response) -> String {
        let bytes = hyper::body::to_bytes(response.into_body()).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn consultation_body() -> Value {
        json!({
            "patientId": "P001",
            "draft": {
                "diagnosis": "Sinusitis",
                "notes": "Steam inhalation",
                "prescriptions": [
                    {"medicationName": "Azithromycin", "dosageInstructions": "500mg once", "duration": "3 days"}
                ],
                "labTests": [
                    {"testName": "Blood Test", "testInstructions": "Fasting"}
                ],
                "selectedTest": "Kidney Test"
            }
        })
    }

    #[tokio::test]
    async fn health_is_ok() {
        let (state, _dir) = test_state("http://127.0.0.1:1").await;
        let response = build_router(state, 8).oneshot(get_request("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn check_in_flow() {
        let (state, _dir) = test_state("http://127.0.0.1:1").await;
        let app = build_router(state, 8);
        let query = json!({"name": "john doe", "contact": "JOHN.DOE@example.com", "doctor": "dr. smith"});

        let response = app
            .clone()
            .oneshot(json_request("POST", "/api/check-in/search", query.clone()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "Scheduled");

        let response = app
            .clone()
            .oneshot(json_request("POST", "/api/check-in", query.clone()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "Checked-In");

        let response = app
            .oneshot(json_request("POST", "/api/check-in", query))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert_eq!(body_json(response).await["error"]["message"], "Patient is already checked in.");
    }

    #[tokio::test]
    async fn check_in_miss_and_missing_fields() {
        let (state, _dir) = test_state("http://127.0.0.1:1").await;
        let app = build_router(state, 8);

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/check-in/search",
                json!({"name": "Nobody", "contact": "x", "doctor": "Dr. Smith"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = app
            .oneshot(json_request("POST", "/api/check-in/search", json!({"name": "John Doe"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = body_json(response).await;
        assert_eq!(body["error"]["fields"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn slots_and_billing() {
        let (state, _dir) = test_state("http://127.0.0.1:1").await;
        let app = build_router(state, 8);

        let response = app.clone().oneshot(get_request("/api/slots")).await.unwrap();
        let slots = body_json(response).await;
        assert_eq!(slots.as_array().unwrap().len(), 28);
        assert_eq!(slots[0], "10:00");

        let response = app
            .clone()
            .oneshot(get_request("/api/billing?test=Kidney%20Test"))
            .await
            .unwrap();
        let body = body_json(response).await;
        assert_eq!(body["total"], billing_total(500));

        let response = app.clone().oneshot(get_request("/api/billing")).await.unwrap();
        assert_eq!(body_json(response).await["total"], billing_total(0));

        let response = app.oneshot(get_request("/api/billing?test=MRI")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    fn billing_total(test_price: u32) -> u32 {
        clinic_core::billing::CONSULTATION_FEE + test_price
    }

    #[tokio::test]
    async fn age_uses_the_state_clock() {
        let (state, _dir) = test_state("http://127.0.0.1:1").await;
        let app = build_router(state, 8);

        let response = app
            .clone()
            .oneshot(get_request("/api/patients/age?dob=1990-06-16"))
            .await
            .unwrap();
        assert_eq!(body_json(response).await["age"], 33);

        let response = app
            .oneshot(get_request("/api/patients/age?dob=2030-01-01"))
            .await
            .unwrap();
        assert!(body_json(response).await["age"].is_null());
    }

    #[tokio::test]
    async fn registration_is_stored() {
        let (state, _dir) = test_state("http://127.0.0.1:1").await;
        let app = build_router(state, 8);
        let form = json!({
            "firstName": "Meera", "lastName": "Iyer", "motherName": "Lata", "fatherName": "Suresh",
            "dob": "2000-06-15", "gender": "female", "spouseName": "Karan", "bloodGroup": "B+",
            "contactNumber": "9000000000", "email": "meera@example.com",
            "pincode": "600001", "city": "Chennai", "state": "Tamil Nadu"
        });

        let response = app
            .clone()
            .oneshot(json_request("POST", "/api/patients", form))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = body_json(response).await;
        assert_eq!(body["age"], 24);
        let id = body["patientId"].as_str().unwrap().to_string();
        assert!(id.starts_with("meera") && id.ends_with("@clinicname.com"));

        let response = app
            .oneshot(get_request(&format!("/api/patients/{}", id)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn booking_validation() {
        let (state, _dir) = test_state("http://127.0.0.1:1").await;
        let app = build_router(state, 8);
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/appointments",
                json!({"reasonForVisit": "Back pain", "modeOfAppointment": "online", "appointmentDate": "2024-07-01", "appointmentTime": "17:15"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let response = app
            .oneshot(json_request(
                "POST",
                "/api/appointments",
                json!({"reasonForVisit": "Back pain", "modeOfAppointment": "online", "appointmentDate": "2024-07-01", "appointmentTime": "16:45"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn consultation_is_served_by_token() {
        let (state, _dir) = test_state("http://127.0.0.1:1").await;
        let app = build_router(state, 8);

        let response = app
            .clone()
            .oneshot(json_request("POST", "/api/consultations", consultation_body()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let record: ConsultationRecord = serde_json::from_value(body_json(response).await).unwrap();
        assert_eq!(record.total, billing_total(500));
        assert!(record.secure_url.starts_with("http://clinic.test/prescription/"));

        let token = record.secure_url.rsplit('/').next().unwrap().to_string();
        let response = app
            .clone()
            .oneshot(get_request(&format!("/api/prescription/{}", token)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app.oneshot(get_request("/api/prescription/unknown")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn opted_out_consultation_has_no_lab_tests() {
        let (state, _dir) = test_state("http://127.0.0.1:1").await;
        let app = build_router(state, 8);
        let mut body = consultation_body();
        body["draft"]["optOutMonitoring"] = json!(true);

        let response = app
            .oneshot(json_request("POST", "/api/consultations", body))
            .await
            .unwrap();
        let record = body_json(response).await;
        assert!(record["labTests"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn dashboard_renders_backend_records() {
        let server = MockServer::start().await;
        let (state, _dir) = test_state(&server.uri()).await;
        let record = repository_record(&state).await;
        Mock::given(method("GET"))
            .and(path("/api/consultations"))
            .respond_with(ResponseTemplate::new(200).set_body_json(vec![record]))
            .mount(&server)
            .await;

        let response = build_router(state, 8).oneshot(get_request("/dashboard")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("Staff Dashboard"));
        assert!(html.contains("Sinusitis"));
    }

    async fn repository_record(state: &AppState) -> ConsultationRecord {
        let mut draft: clinic_core::consultation::ConsultationDraft =
            serde_json::from_value(consultation_body()["draft"].clone()).unwrap();
        let snapshot = draft.submit().unwrap();
        clinic_core::repository::insert_consultation(&state.pool, "P001", &snapshot, "http://clinic.test")
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn dashboard_failure_shows_static_message() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .expect(1)
            .mount(&server)
            .await;
        let (state, _dir) = test_state(&server.uri()).await;

        let response = build_router(state, 8).oneshot(get_request("/dashboard")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert!(body_text(response).await.contains(views::DASHBOARD_ERROR));
    }

    #[tokio::test]
    async fn unknown_prescription_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        let (state, _dir) = test_state(&server.uri()).await;

        let response = build_router(state, 8)
            .oneshot(get_request("/prescription/bogus"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(body_text(response).await.contains(views::PRESCRIPTION_ERROR));
    }

    #[tokio::test]
    async fn views_read_from_the_service_itself() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let (state, _dir) = test_state(&format!("http://{}", addr)).await;
        let app = build_router(state, 8);
        tokio::spawn(async move {
            axum::Server::from_tcp(listener)
                .unwrap()
                .serve(app.into_make_service())
                .await
                .unwrap();
        });

        let client = reqwest::Client::new();
        let record: ConsultationRecord = client
            .post(format!("http://{}/api/consultations", addr))
            .json(&consultation_body())
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();

        let token = record.secure_url.rsplit('/').next().unwrap().to_string();
        let html = client
            .get(format!("http://{}/prescription/{}", addr, token))
            .send()
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        assert!(html.contains("<strong>Azithromycin</strong>: 500mg once for 3 days"));

        let dashboard = reqwest::get(format!("http://{}/dashboard", addr))
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        assert!(dashboard.contains("<td>P001</td>"));
    }

    #[tokio::test]
    async fn api_limit_is_shared_across_routes() {
        let (state, _dir) = test_state("http://127.0.0.1:1").await;
        let desk_guard = state.desk.clone().write_owned().await;
        let app = build_router(state, 1);

        // segura a única vaga esperando o balcão
        let query = json!({"name": "John Doe", "contact": "john.doe@example.com", "doctor": "Dr. Smith"});
        let held = tokio::spawn(
            app.clone()
                .oneshot(json_request("POST", "/api/check-in/search", query)),
        );
        tokio::time::sleep(Duration::from_millis(50)).await;

        let other_route = tokio::time::timeout(
            Duration::from_millis(200),
            app.clone().oneshot(get_request("/api/slots")),
        )
        .await;
        assert!(other_route.is_err());

        let response = app.clone().oneshot(get_request("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        drop(desk_guard);
        let response = held.await.unwrap().unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app.oneshot(get_request("/api/slots")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn views_work_with_a_single_permit() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let (state, _dir) = test_state(&format!("http://{}", addr)).await;
        let app = build_router(state, 1);
        tokio::spawn(async move {
            axum::Server::from_tcp(listener)
                .unwrap()
                .serve(app.into_make_service())
                .await
                .unwrap();
        });

        let response = reqwest::get(format!("http://{}/dashboard", addr)).await.unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::OK);
        assert!(response.text().await.unwrap().contains(views::DASHBOARD_EMPTY));
    }

    #[tokio::test]
    async fn patient_history_comes_from_the_fixed_records() {
        let (state, _dir) = test_state("http://127.0.0.1:1").await;
        let app = build_router(state, 8);

        let response = app
            .clone()
            .oneshot(get_request("/api/patients/P001/history"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["name"], "John Doe");
        assert_eq!(body["medicalHistory"][0]["diagnosis"], "Common Cold");

        let response = app
            .oneshot(get_request("/api/patients/P999/history"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn check_in_missing_fields_message() {
        let (state, _dir) = test_state("http://127.0.0.1:1").await;
        let response = build_router(state, 8)
            .oneshot(json_request("POST", "/api/check-in", json!({"name": "", "contact": "", "doctor": ""})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = body_json(response).await;
        assert_eq!(body["error"]["message"], clinic_core::checkin::MISSING_FIELDS_MESSAGE);
        assert_eq!(body["error"]["fields"].as_array().unwrap().len(), 3);
    }
}
