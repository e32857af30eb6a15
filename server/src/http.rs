use std::{
    net::{IpAddr, SocketAddr},
    sync::Arc,
};

use anyhow::Context;
use axum::{
    Router,
    extract::{Path, State},
    http::{self, HeaderName, HeaderValue, Method},
    routing::get,
};
use entity::Employee;
use platform_api::{ApiError, ApiResult, Counted, Data, Envelope};
use platform_store::Directory;
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::{info, instrument};

use crate::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub directory: Arc<Directory>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(directory: Directory, config: AppConfig) -> Self {
        Self {
            directory: Arc::new(directory),
            config: Arc::new(config),
        }
    }
}

#[derive(Clone, Debug)]
pub struct ServeConfig {
    addr: SocketAddr,
}

impl ServeConfig {
    pub fn new(host: IpAddr, port: u16) -> Self {
        Self {
            addr: SocketAddr::from((host, port)),
        }
    }
}

pub async fn serve(config: ServeConfig, state: AppState) -> anyhow::Result<()> {
    let router = build_router(state);
    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.addr))?;

    info!(%config.addr, "directory server listening");
    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;
    Ok(())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed = origins
        .iter()
        .filter_map(|origin| origin.parse::<HeaderValue>().ok())
        .collect::<Vec<_>>();
    CorsLayer::new()
        .allow_credentials(true)
        .allow_headers([http::header::CONTENT_TYPE])
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_origin(AllowOrigin::list(allowed))
}

/// Every route answers non-GET methods with the same 404 envelope as an
/// unknown path.
pub fn build_router(state: AppState) -> Router {
    let request_id = MakeRequestUuid;
    let header_name = HeaderName::from_static("x-request-id");
    let cors = cors_layer(&state.config.cors_allowed_origins);
    Router::new()
        .route("/", get(root_handler).fallback(route_not_found))
        .route("/health", get(health_handler).fallback(route_not_found))
        .route("/api/users", get(list_users).fallback(route_not_found))
        .route("/api/users/{id}", get(get_user).fallback(route_not_found))
        .route(
            "/api/users/department/{department}",
            get(users_in_department).fallback(route_not_found),
        )
        .fallback(route_not_found)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(header_name.clone(), request_id))
                .layer(PropagateRequestIdLayer::new(header_name))
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RootSummary {
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    created_by: Option<String>,
    total_users: usize,
}

#[instrument(name = "http.root", skip_all)]
async fn root_handler(State(state): State<AppState>) -> Envelope<RootSummary> {
    Envelope::ok(RootSummary {
        message: state.config.root_message.clone(),
        created_by: state.directory.created_by().map(str::to_owned),
        total_users: state.directory.len(),
    })
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HealthSummary {
    status: &'static str,
    version: &'static str,
    total_users: usize,
}

async fn health_handler(State(state): State<AppState>) -> Envelope<HealthSummary> {
    Envelope::ok(HealthSummary {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        total_users: state.directory.len(),
    })
}

#[instrument(name = "http.users.list", skip_all)]
async fn list_users(State(state): State<AppState>) -> Envelope<Data<Vec<Employee>>> {
    Envelope::ok(Data {
        data: state.directory.all().to_vec(),
    })
}

/// The whole segment must parse as an integer; `1abc` or `1.0` never match.
#[instrument(name = "http.users.get", skip(state))]
async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Envelope<Data<Employee>>> {
    let employee = id
        .parse::<u64>()
        .ok()
        .and_then(|id| state.directory.find(id))
        .cloned()
        .ok_or(ApiError::UserNotFound)?;
    Ok(Envelope::ok(Data { data: employee }))
}

#[instrument(name = "http.users.department", skip(state))]
async fn users_in_department(
    State(state): State<AppState>,
    Path(department): Path<String>,
) -> Envelope<Counted<Employee>> {
    let matches = state
        .directory
        .in_department(&department)
        .into_iter()
        .cloned()
        .collect::<Vec<_>>();
    Envelope::ok(Counted::from(matches))
}

async fn route_not_found() -> ApiError {
    ApiError::RouteNotFound
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install CTRL+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        signal(SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    ctrl_c.await;

    #[cfg(unix)]
    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        response::Response,
    };
    use entity::DirectorySource;
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    fn fixture() -> AppState {
        let source: DirectorySource = serde_json::from_value(json!({
            "createdBy": "People Ops",
            "totalUsers": 2,
            "users": [
                {"id": 1, "name": "Ann", "department": "IT", "role": "Dev", "salary": 1000},
                {"id": 2, "name": "Bo", "department": "HR", "role": "Recruiter", "salary": 2000}
            ]
        }))
        .unwrap();
        AppState::new(Directory::from_source(source).unwrap(), AppConfig::default())
    }

    async fn send(request: Request<Body>) -> Response {
        build_router(fixture()).oneshot(request).await.unwrap()
    }

    async fn get(uri: &str) -> (StatusCode, Value) {
        let response = send(Request::builder().uri(uri).body(Body::empty()).unwrap()).await;
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn root_reports_metadata() {
        let (status, body) = get("/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({
                "success": true,
                "message": "Employee directory API is running",
                "createdBy": "People Ops",
                "totalUsers": 2
            })
        );
    }

    #[tokio::test]
    async fn list_returns_every_record_in_source_order() {
        let (status, body) = get("/api/users").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], json!(true));
        let data = body["data"].as_array().unwrap();
        assert_eq!(data.len(), 2);
        assert_eq!(data[0]["name"], "Ann");
        assert_eq!(data[1]["name"], "Bo");
    }

    #[tokio::test]
    async fn each_present_id_returns_its_record() {
        for (id, name) in [(1, "Ann"), (2, "Bo")] {
            let (status, body) = get(&format!("/api/users/{id}")).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body["success"], json!(true));
            assert_eq!(body["data"]["id"], json!(id));
            assert_eq!(body["data"]["name"], name);
        }
    }

    #[tokio::test]
    async fn absent_id_is_a_not_found_envelope() {
        let (status, body) = get("/api/users/99").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({"success": false, "message": "User not found"}));
    }

    #[tokio::test]
    async fn non_numeric_id_is_treated_as_missing() {
        let (status, body) = get("/api/users/abc").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "User not found");
    }

    #[tokio::test]
    async fn partially_numeric_id_is_not_coerced() {
        for raw in ["1abc", "1.0", "-1"] {
            let (status, body) = get(&format!("/api/users/{raw}")).await;
            assert_eq!(status, StatusCode::NOT_FOUND, "id {raw}");
            assert_eq!(body["message"], "User not found");
        }
    }

    #[tokio::test]
    async fn department_filter_ignores_case() {
        let (status, body) = get("/api/users/department/hr").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], json!(1));
        assert_eq!(body["data"][0]["name"], "Bo");
    }

    #[tokio::test]
    async fn unknown_department_is_an_empty_success() {
        let (status, body) = get("/api/users/department/Legal").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"success": true, "count": 0, "data": []}));
    }

    #[tokio::test]
    async fn unmatched_path_is_route_not_found() {
        let (status, body) = get("/api/teams").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({"success": false, "message": "Route not found"}));
    }

    #[tokio::test]
    async fn non_get_method_is_route_not_found() {
        let response = send(
            Request::builder()
                .method(Method::POST)
                .uri("/api/users")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["message"], "Route not found");
    }

    #[tokio::test]
    async fn health_reports_record_count() {
        let (status, body) = get("/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["totalUsers"], json!(2));
    }

    #[tokio::test]
    async fn allowed_origin_is_echoed() {
        let response = send(
            Request::builder()
                .uri("/api/users")
                .header(http::header::ORIGIN, "http://localhost:3000")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(
            response
                .headers()
                .get(http::header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .and_then(|v| v.to_str().ok()),
            Some("http://localhost:3000")
        );
    }

    #[tokio::test]
    async fn preflight_allows_listed_methods_with_credentials() {
        let response = send(
            Request::builder()
                .method(Method::OPTIONS)
                .uri("/api/users/1")
                .header(http::header::ORIGIN, "http://localhost:3000")
                .header(http::header::ACCESS_CONTROL_REQUEST_METHOD, "DELETE")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert!(response.status().is_success());
        let headers = response.headers();
        let mut methods: Vec<String> = headers
            .get(http::header::ACCESS_CONTROL_ALLOW_METHODS)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .split(',')
            .map(|m| m.trim().to_string())
            .collect();
        methods.sort();
        assert_eq!(methods, ["DELETE", "GET", "POST", "PUT"]);
        assert_eq!(
            headers
                .get(http::header::ACCESS_CONTROL_ALLOW_CREDENTIALS)
                .and_then(|v| v.to_str().ok()),
            Some("true")
        );
        assert_eq!(
            headers
                .get(http::header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .and_then(|v| v.to_str().ok()),
            Some("http://localhost:3000")
        );
    }

    #[tokio::test]
    async fn unlisted_origin_gets_no_cors_grant() {
        let response = send(
            Request::builder()
                .uri("/api/users")
                .header(http::header::ORIGIN, "http://evil.test")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert!(
            response
                .headers()
                .get(http::header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .is_none()
        );
    }

    #[tokio::test]
    async fn responses_carry_a_request_id() {
        let response = send(Request::builder().uri("/").body(Body::empty()).unwrap()).await;
        assert!(response.headers().contains_key("x-request-id"));
    }
}
