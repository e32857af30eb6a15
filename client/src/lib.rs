//! Presentation side of the directory: one fetch on mount, then pure local
//! filtering and aggregation over the fetched snapshot.

pub mod dashboard;
pub mod fetch;
pub mod input;
pub mod render;
pub mod view;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request to directory service failed")]
    Http(#[from] reqwest::Error),
    #[error("directory service answered {status} with a body that is not JSON")]
    Decode {
        status: u16,
        #[source]
        source: serde_json::Error,
    },
}

pub type ClientResult<T> = Result<T, ClientError>;

pub use dashboard::{Dashboard, Screen};
pub use fetch::{HttpRosterSource, Roster, RosterSource};
pub use view::{DepartmentFilter, DirectoryView, Filters, SalaryStats};
