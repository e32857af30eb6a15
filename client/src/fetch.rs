use std::{future::Future, time::Duration};

use entity::Employee;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::{ClientError, ClientResult};

/// The employee collection as the client holds it, whatever shape it arrived in.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Roster(Vec<Employee>);

impl Roster {
    pub fn new(employees: Vec<Employee>) -> Self {
        Self(employees)
    }

    pub fn employees(&self) -> &[Employee] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Bodies the directory service has answered with across revisions.
///
/// Records stay as raw JSON here so one incomplete entry cannot sink the
/// whole collection; see [`RosterEntry`].
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RosterResponse {
    /// `{"success": true, "data": [...]}` from the list route.
    Listed { data: Vec<Value> },
    /// `{"users": [...]}` from roots that embed the collection.
    Embedded { users: Vec<Value> },
    /// `{"data": {...}}` from the single-record route.
    Single { data: Map<String, Value> },
    Bare(Vec<Value>),
    /// Anything else: a failure envelope, a metadata-only root, or junk.
    Unrecognized(Value),
}

/// One record as the client accepts it: `id` and `name` are required,
/// everything else falls back to empty or zero.
#[derive(Debug, Deserialize)]
struct RosterEntry {
    id: u64,
    name: String,
    #[serde(default)]
    department: String,
    #[serde(default)]
    role: String,
    #[serde(default)]
    salary: f64,
}

impl From<RosterEntry> for Employee {
    fn from(entry: RosterEntry) -> Self {
        Employee {
            id: entry.id,
            name: entry.name,
            department: entry.department,
            role: entry.role,
            salary: entry.salary,
        }
    }
}

fn collect_entries(entries: Vec<Value>) -> Roster {
    let employees = entries
        .into_iter()
        .enumerate()
        .filter_map(|(index, entry)| match serde_json::from_value::<RosterEntry>(entry) {
            Ok(entry) => Some(Employee::from(entry)),
            Err(err) => {
                warn!(index, error = %err, "skipping unusable employee record");
                None
            }
        })
        .collect();
    Roster(employees)
}

impl From<RosterResponse> for Roster {
    fn from(response: RosterResponse) -> Self {
        match response {
            RosterResponse::Listed { data } => collect_entries(data),
            RosterResponse::Embedded { users } => collect_entries(users),
            RosterResponse::Single { data } => collect_entries(vec![Value::Object(data)]),
            RosterResponse::Bare(entries) => collect_entries(entries),
            RosterResponse::Unrecognized(body) => {
                let reason = body
                    .get("message")
                    .and_then(|value| value.as_str())
                    .unwrap_or("no employee collection in response");
                warn!(reason, "directory response carried no employees");
                Roster::default()
            }
        }
    }
}

impl Roster {
    pub fn from_json(bytes: &[u8], status: u16) -> ClientResult<Self> {
        serde_json::from_slice::<RosterResponse>(bytes)
            .map(Roster::from)
            .map_err(|source| ClientError::Decode { status, source })
    }
}

/// Where a dashboard gets its one snapshot from.
pub trait RosterSource: Send + Sync + 'static {
    fn fetch(&self) -> impl Future<Output = ClientResult<Roster>> + Send;
}

/// Fetches the roster from a running directory server.
#[derive(Clone, Debug)]
pub struct HttpRosterSource {
    client: reqwest::Client,
    url: String,
}

impl HttpRosterSource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> ClientResult<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl RosterSource for HttpRosterSource {
    async fn fetch(&self) -> ClientResult<Roster> {
        let response = self.client.get(&self.url).send().await?;
        let status = response.status();
        let body = response.bytes().await?;
        let roster = Roster::from_json(&body, status.as_u16())?;
        debug!(url = %self.url, %status, employees = roster.len(), "roster fetched");
        Ok(roster)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Json, Router, http::StatusCode, routing::get};
    use serde_json::{Value, json};

    fn roster_of(body: Value) -> Roster {
        Roster::from_json(body.to_string().as_bytes(), 200).unwrap()
    }

    fn sample() -> Value {
        json!([
            {"id": 1, "name": "Ann", "department": "IT", "role": "Dev", "salary": 1000},
            {"id": 2, "name": "Bo", "department": "HR", "role": "Recruiter", "salary": 2000}
        ])
    }

    #[test]
    fn data_and_users_shapes_normalize_alike() {
        let listed = roster_of(json!({"success": true, "data": sample()}));
        let embedded = roster_of(json!({"success": true, "message": "hi", "users": sample()}));
        let bare = roster_of(sample());
        assert_eq!(listed.len(), 2);
        assert_eq!(listed, embedded);
        assert_eq!(listed, bare);
        assert_eq!(listed.employees()[1].name, "Bo");
    }

    #[test]
    fn single_record_body_becomes_a_one_entry_roster() {
        let roster = roster_of(json!({"success": true, "data": sample()[0].clone()}));
        assert_eq!(roster.len(), 1);
        assert_eq!(roster.employees()[0].name, "Ann");
    }

    #[test]
    fn metadata_only_root_yields_empty_roster() {
        let roster = roster_of(json!({"success": true, "message": "running", "totalUsers": 2}));
        assert!(roster.is_empty());
    }

    #[test]
    fn failure_envelope_yields_empty_roster() {
        let roster = roster_of(json!({"success": false, "message": "Route not found"}));
        assert!(roster.is_empty());
    }

    #[test]
    fn records_missing_fields_do_not_fail_the_fetch() {
        let roster = roster_of(json!({
            "success": true,
            "data": [
                {"id": 1, "name": "Ann", "department": "IT", "role": "Dev", "salary": 1000},
                {"id": 2, "name": "Bo", "department": "HR", "salary": 2000},
                {"id": 3, "name": "Cy"}
            ]
        }));
        assert_eq!(roster.len(), 3);
        let bo = &roster.employees()[1];
        assert_eq!(bo.role, "");
        assert_eq!(bo.salary, 2000.0);
        let cy = &roster.employees()[2];
        assert_eq!(cy.department, "");
        assert_eq!(cy.salary, 0.0);
    }

    #[test]
    fn records_without_identity_are_skipped() {
        let roster = roster_of(json!({
            "users": [
                {"name": "No Id", "department": "IT", "role": "Dev", "salary": 1},
                {"id": 2, "name": "Bo", "department": "HR", "role": "Recruiter", "salary": 2000},
                {"id": 3, "department": "HR"},
                "not a record"
            ]
        }));
        assert_eq!(roster.len(), 1);
        assert_eq!(roster.employees()[0].name, "Bo");
    }

    #[test]
    fn non_json_body_is_a_decode_error() {
        let err = Roster::from_json(b"<html>oops</html>", 502).unwrap_err();
        assert!(matches!(err, ClientError::Decode { status: 502, .. }));
    }

    async fn spawn_server(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn http_source_reads_list_and_root_shapes() {
        let router = Router::new()
            .route(
                "/api/users",
                get(|| async { Json(json!({"success": true, "data": sample()})) }),
            )
            .route(
                "/",
                get(|| async { Json(json!({"success": true, "users": sample()})) }),
            );
        let base = spawn_server(router).await;

        let list = HttpRosterSource::new(format!("{base}/api/users"), Duration::from_secs(5))
            .unwrap()
            .fetch()
            .await
            .unwrap();
        let root = HttpRosterSource::new(format!("{base}/"), Duration::from_secs(5))
            .unwrap()
            .fetch()
            .await
            .unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list, root);
    }

    #[tokio::test]
    async fn http_source_reports_non_json_errors() {
        let router = Router::new().route(
            "/api/users",
            get(|| async { (StatusCode::BAD_GATEWAY, "upstream down") }),
        );
        let base = spawn_server(router).await;
        let err = HttpRosterSource::new(format!("{base}/api/users"), Duration::from_secs(5))
            .unwrap()
            .fetch()
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Decode { status: 502, .. }));
    }

    #[tokio::test]
    async fn unreachable_server_is_an_http_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let err = HttpRosterSource::new(format!("http://{addr}/api/users"), Duration::from_secs(5))
            .unwrap()
            .fetch()
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Http(_)));
    }
}
