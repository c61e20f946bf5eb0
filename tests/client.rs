mod common;

use std::{io::Write, path::PathBuf, time::Duration};

use chrono::NaiveDateTime;
use sensor_admin::{
    client::{ApiClient, ApiError, ApiRequest, ValidationBody},
    config::Config,
    csv_import,
    models::{LoginForm, SensorDataCreate},
    query::{keys, Pager, QueryCache},
    toast::ToastStatus,
};
use serde_json::Value;
use uuid::Uuid;

async fn client() -> (common::MockBackend, ApiClient) {
    let backend = common::spawn().await;
    let client = ApiClient::from_base_url(&backend.base_url).unwrap();
    (backend, client)
}

#[tokio::test]
async fn login_token_is_sent_as_bearer_header() {
    let (backend, client) = client().await;

    let token = client
        .login()
        .login_access_token(&LoginForm {
            username: common::EMAIL.into(),
            password: common::PASSWORD.into(),
        })
        .await
        .unwrap();
    assert_eq!(token.token_type, "bearer");

    client.set_token(Some(token.access_token)).await;
    let me = client.users().read_user_me().await.unwrap();

    assert_eq!(me.email, common::EMAIL);
    assert_eq!(
        backend.state.last_auth.lock().unwrap().as_deref(),
        Some("Bearer tok-123")
    );
}

#[tokio::test]
async fn wrong_password_maps_to_status_with_detail() {
    let (_backend, client) = client().await;

    let err = client
        .login()
        .login_access_token(&LoginForm {
            username: common::EMAIL.into(),
            password: "wrong-password".into(),
        })
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(400));
    assert_eq!(err.detail(), "Incorrect email or password");
    match err {
        ApiError::Status { description, .. } => {
            assert_eq!(description.as_deref(), Some("Bad Request"));
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn missing_token_is_unauthorized() {
    let (backend, client) = client().await;

    let err = client.users().read_user_me().await.unwrap_err();

    assert_eq!(err.status(), Some(401));
    assert_eq!(err.detail(), "Not authenticated");
    assert!(backend.state.last_auth.lock().unwrap().is_none());
}

#[tokio::test]
async fn unprocessable_entity_maps_to_validation_error() {
    let (_backend, client) = client().await;
    let body = SensorDataCreate {
        equipment_id: "EQ-1".into(),
        // Serialized as null, which the backend rejects.
        value: f64::NAN,
        timestamp: NaiveDateTime::parse_from_str("2024-01-01 00:00:00", "%Y-%m-%d %H:%M:%S")
            .unwrap(),
    };

    let err = client
        .sensor_data()
        .create_sensor_data(&body)
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(422));
    assert_eq!(err.detail(), "Input should be a valid number");
    match err {
        ApiError::Validation {
            body: ValidationBody::Parsed(parsed),
            ..
        } => {
            assert_eq!(parsed.detail.len(), 1);
            assert_eq!(parsed.detail[0].error_type, "float_parsing");
        }
        other => panic!("expected parsed validation error, got {other:?}"),
    }
}

#[tokio::test]
async fn not_found_carries_backend_detail() {
    let (_backend, client) = client().await;

    let err = client
        .sensor_data()
        .read_sensor_data(Uuid::nil())
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(404));
    assert_eq!(err.detail(), "Sensor data not found");
}

#[tokio::test]
async fn non_json_error_body_is_kept_as_string() {
    let (_backend, client) = client().await;

    let err = client.items().read_items(0, 5).await.unwrap_err();

    assert_eq!(err.detail(), "Something went wrong.");
    match err {
        ApiError::Status { status, body, .. } => {
            assert_eq!(status, 500);
            assert_eq!(body, Value::String("internal failure".into()));
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn cancelled_request_resolves_to_cancelled() {
    let (_backend, client) = client().await;

    let request = client.send::<Value>(ApiRequest::get("/api/v1/slow"));
    tokio::time::sleep(Duration::from_millis(50)).await;
    request.cancel();

    let result = tokio::time::timeout(Duration::from_secs(5), request)
        .await
        .expect("cancelled request should settle promptly");
    assert!(matches!(result, Err(ApiError::Cancelled)));
}

#[tokio::test]
async fn configured_timeout_aborts_slow_requests() {
    let backend = common::spawn().await;
    let config = Config {
        api_base_url: backend.base_url.clone(),
        api_token: None,
        token_file: PathBuf::from("unused"),
        request_timeout_secs: 1,
        page_size: 5,
        prefetch_debounce_ms: 300,
        query_stale_secs: 30,
    };
    let client = ApiClient::new(&config).unwrap();

    let result = tokio::time::timeout(
        Duration::from_secs(10),
        client.request::<Value>(ApiRequest::get("/api/v1/slow")),
    )
    .await
    .expect("request should time out on its own");

    match result {
        Err(ApiError::Transport(e)) => assert!(e.is_timeout()),
        other => panic!("expected transport timeout, got {other:?}"),
    }
}

#[tokio::test]
async fn csv_upload_uses_expected_multipart_field() {
    let (backend, client) = client().await;
    let cache = QueryCache::new(Duration::from_secs(60));
    let listed = keys::sensors_page(Pager::new(0, 5));
    cache.set_query_data(&listed, 1_i64).await;

    let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
    writeln!(file, "equipment_id,timestamp,value").unwrap();
    writeln!(file, "EQ-1,2024-01-01T00:00:00,1.5").unwrap();
    writeln!(file, "EQ-2,2024-01-01T00:00:00,2.5").unwrap();
    writeln!(file, "broken row").unwrap();
    file.flush().unwrap();

    let outcome = csv_import::import_file(&client, &cache, Some(file.path())).await;

    let status = outcome.status.unwrap();
    assert_eq!((status.count_success, status.count_fail), (2, 1));
    assert!(!cache.is_fresh(&listed).await, "sensor pages must refetch after an import");
    assert_eq!(outcome.toast.status, ToastStatus::Warning);
    assert_eq!(
        outcome.toast.description,
        "Upload finished. 2 rows imported, but 1 was not possible."
    );

    let upload = backend.state.last_upload.lock().unwrap().clone().unwrap();
    assert_eq!(upload.field, "sensor_data_csv_file");
    assert_eq!(upload.content_type, "text/csv");
    assert_eq!(
        upload.file_name,
        file.path().file_name().unwrap().to_string_lossy()
    );
}
