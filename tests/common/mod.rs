//! In-process stand-in for the sensor data backend.
//!
//! Serves a handful of canned endpoints on `127.0.0.1:0` and records what
//! the client sent so tests can assert on it.

#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use axum::{
    extract::{Multipart, Path, Query, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    routing::{get, post},
    Form, Json, Router,
};
use serde_json::{json, Value};
use uuid::Uuid;

pub const TOKEN: &str = "tok-123";
pub const EMAIL: &str = "admin@example.com";
pub const PASSWORD: &str = "changethis";
/// Rows behind `GET /sensor-data/`.
pub const SENSOR_ROWS: u64 = 7;

#[derive(Debug, Clone)]
pub struct Upload {
    pub field: String,
    pub file_name: String,
    pub content_type: String,
    pub body: String,
}

#[derive(Default)]
pub struct Recorded {
    pub sensor_list_calls: AtomicUsize,
    pub bar_chart_calls: AtomicUsize,
    pub line_chart_calls: AtomicUsize,
    pub last_auth: Mutex<Option<String>>,
    pub last_bar_chart: Mutex<Option<Value>>,
    pub last_upload: Mutex<Option<Upload>>,
}

impl Recorded {
    pub fn sensor_list_calls(&self) -> usize {
        self.sensor_list_calls.load(Ordering::SeqCst)
    }

    pub fn bar_chart_calls(&self) -> usize {
        self.bar_chart_calls.load(Ordering::SeqCst)
    }

    pub fn line_chart_calls(&self) -> usize {
        self.line_chart_calls.load(Ordering::SeqCst)
    }
}

pub struct MockBackend {
    pub base_url: String,
    pub state: Arc<Recorded>,
}

pub async fn spawn() -> MockBackend {
    let state = Arc::new(Recorded::default());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = router(state.clone());
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    MockBackend {
        base_url: format!("http://{addr}"),
        state,
    }
}

type ApiResult = Result<Json<Value>, (StatusCode, Json<Value>)>;

fn fail(status: StatusCode, detail: &str) -> (StatusCode, Json<Value>) {
    (status, Json(json!({ "detail": detail })))
}

fn router(state: Arc<Recorded>) -> Router {
    Router::new()
        .route("/api/v1/login/access-token", post(login))
        .route("/api/v1/users/me", get(me))
        .route("/api/v1/items/", get(broken_items))
        .route("/api/v1/sensor-data/", get(list_sensors).post(create_sensor))
        .route("/api/v1/sensor-data/{id}", get(read_sensor))
        .route("/api/v1/sensor-data/dashboard/bar-chart", post(bar_chart))
        .route("/api/v1/sensor-data/dashboard/line-chart", post(line_chart))
        .route("/api/v1/sensor-data/options/equipment", get(equipment_options))
        .route("/api/v1/sensor-data/csv", post(import_csv))
        .route("/api/v1/slow", get(slow))
        .with_state(state)
}

fn record_auth(state: &Recorded, headers: &HeaderMap) -> bool {
    let auth = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);
    let ok = auth.as_deref() == Some(format!("Bearer {TOKEN}").as_str());
    *state.last_auth.lock().unwrap() = auth;
    ok
}

fn sensor_row(i: u64) -> Value {
    json!({
        "id": Uuid::from_u128(u128::from(i) + 1),
        "equipment_id": format!("EQ-{i}"),
        "value": 10.0 + i as f64,
        "timestamp": "2024-03-05T07:08:09",
    })
}

async fn login(Form(form): Form<HashMap<String, String>>) -> ApiResult {
    let ok = form.get("username").map(String::as_str) == Some(EMAIL)
        && form.get("password").map(String::as_str) == Some(PASSWORD);
    if !ok {
        return Err(fail(StatusCode::BAD_REQUEST, "Incorrect email or password"));
    }
    Ok(Json(json!({ "access_token": TOKEN, "token_type": "bearer" })))
}

async fn me(State(state): State<Arc<Recorded>>, headers: HeaderMap) -> ApiResult {
    if !record_auth(&state, &headers) {
        return Err(fail(StatusCode::UNAUTHORIZED, "Not authenticated"));
    }
    Ok(Json(json!({
        "id": Uuid::from_u128(42),
        "email": EMAIL,
        "full_name": "Ada Admin",
        "is_active": true,
        "is_superuser": true,
    })))
}

async fn broken_items() -> (StatusCode, &'static str) {
    (StatusCode::INTERNAL_SERVER_ERROR, "internal failure")
}

async fn list_sensors(
    State(state): State<Arc<Recorded>>,
    Query(params): Query<HashMap<String, u64>>,
) -> Json<Value> {
    state.sensor_list_calls.fetch_add(1, Ordering::SeqCst);
    let skip = params.get("skip").copied().unwrap_or(0);
    let limit = params.get("limit").copied().unwrap_or(100);
    let data: Vec<Value> = (skip..SENSOR_ROWS.min(skip + limit)).map(sensor_row).collect();
    Json(json!({ "data": data, "count": SENSOR_ROWS }))
}

async fn read_sensor(Path(id): Path<Uuid>) -> ApiResult {
    if id.is_nil() {
        return Err(fail(StatusCode::NOT_FOUND, "Sensor data not found"));
    }
    Ok(Json(sensor_row(0)))
}

async fn create_sensor(Json(body): Json<Value>) -> ApiResult {
    if !body["value"].is_number() {
        return Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({
                "detail": [{
                    "loc": ["body", "value"],
                    "msg": "Input should be a valid number",
                    "type": "float_parsing",
                }]
            })),
        ));
    }
    let mut created = body;
    created["id"] = json!(Uuid::from_u128(99));
    Ok(Json(created))
}

/// Custom windows are always empty; every other mode has two equipments.
async fn bar_chart(State(state): State<Arc<Recorded>>, Json(body): Json<Value>) -> Json<Value> {
    state.bar_chart_calls.fetch_add(1, Ordering::SeqCst);
    let custom = body["fetch_mode"] == json!(5);
    *state.last_bar_chart.lock().unwrap() = Some(body);
    if custom {
        return Json(json!({ "data": [], "count": 0 }));
    }
    Json(json!({
        "data": [
            { "equipment_id": "EQ-1", "avg": 20.0 },
            { "equipment_id": "EQ-2", "avg": 10.0 },
        ],
        "count": 2,
    }))
}

async fn line_chart(State(state): State<Arc<Recorded>>) -> Json<Value> {
    state.line_chart_calls.fetch_add(1, Ordering::SeqCst);
    Json(json!({
        "data": [
            { "equipment_id": "EQ-1", "date_trunc": "2024-03-05T07:00:00", "avg": 8.0 },
            { "equipment_id": "EQ-1", "date_trunc": "2024-03-05T08:00:00", "avg": 4.0 },
            { "equipment_id": "EQ-2", "date_trunc": "2024-03-05T07:00:00", "avg": 2.0 },
        ]
    }))
}

async fn equipment_options() -> Json<Value> {
    Json(json!({
        "data": [
            { "value": "EQ-1", "label": "EQ-1" },
            { "value": "EQ-2", "label": "EQ-2" },
        ]
    }))
}

/// Counts data rows with exactly three columns as imported.
async fn import_csv(State(state): State<Arc<Recorded>>, mut multipart: Multipart) -> ApiResult {
    let Some(field) = multipart.next_field().await.unwrap() else {
        return Err(fail(StatusCode::BAD_REQUEST, "No file"));
    };
    let upload = Upload {
        field: field.name().unwrap_or_default().to_owned(),
        file_name: field.file_name().unwrap_or_default().to_owned(),
        content_type: field.content_type().unwrap_or_default().to_owned(),
        body: field.text().await.unwrap(),
    };

    let (mut success, mut fail_count) = (0, 0);
    for line in upload.body.lines().skip(1).filter(|l| !l.trim().is_empty()) {
        if line.split(',').count() == 3 {
            success += 1;
        } else {
            fail_count += 1;
        }
    }
    *state.last_upload.lock().unwrap() = Some(upload);
    Ok(Json(json!({ "count_success": success, "count_fail": fail_count })))
}

async fn slow() -> Json<Value> {
    tokio::time::sleep(Duration::from_secs(30)).await;
    Json(json!({}))
}

/// Poll `check` until it holds or two seconds pass.
pub async fn eventually<F, Fut>(mut check: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    for _ in 0..200 {
        if check().await {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    false
}
