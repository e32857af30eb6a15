//! Static directory storage. The collection is read from disk once and never
//! mutated afterwards, so callers share it behind an `Arc` without locking.

use std::{
    collections::HashSet,
    path::{Path, PathBuf},
};

use entity::{DirectorySource, Employee};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read directory source {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("directory source {path} is not valid JSON")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("employee id {0} appears more than once")]
    DuplicateId(u64),
    #[error("source declares {declared} users but contains {actual}")]
    TotalMismatch { declared: usize, actual: usize },
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Where the directory source lives.
#[derive(Clone, Debug)]
pub struct StoreSettings {
    path: PathBuf,
}

fn default_path() -> PathBuf {
    PathBuf::from("data/users.json")
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            path: default_path(),
        }
    }
}

impl StoreSettings {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Reads `DIRECTORY_DATA_PATH`, falling back to `data/users.json`.
    pub fn from_env() -> Self {
        std::env::var("DIRECTORY_DATA_PATH")
            .map(Self::new)
            .unwrap_or_default()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// The loaded employee collection.
#[derive(Clone, Debug)]
pub struct Directory {
    created_by: Option<String>,
    employees: Vec<Employee>,
}

impl Directory {
    pub fn load(settings: &StoreSettings) -> StoreResult<Self> {
        let path = settings.path();
        let raw = std::fs::read_to_string(path).map_err(|source| StoreError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let source: DirectorySource =
            serde_json::from_str(&raw).map_err(|source| StoreError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        let directory = Self::from_source(source)?;
        info!(
            path = %path.display(),
            employees = directory.len(),
            "directory source loaded"
        );
        Ok(directory)
    }

    pub fn from_source(source: DirectorySource) -> StoreResult<Self> {
        if source.total_users != source.users.len() {
            return Err(StoreError::TotalMismatch {
                declared: source.total_users,
                actual: source.users.len(),
            });
        }
        let mut seen = HashSet::with_capacity(source.users.len());
        for employee in &source.users {
            if !seen.insert(employee.id) {
                return Err(StoreError::DuplicateId(employee.id));
            }
        }
        Ok(Self {
            created_by: source.created_by,
            employees: source.users,
        })
    }

    pub fn created_by(&self) -> Option<&str> {
        self.created_by.as_deref()
    }

    pub fn len(&self) -> usize {
        self.employees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.employees.is_empty()
    }

    pub fn all(&self) -> &[Employee] {
        &self.employees
    }

    /// Linear scan; the collection is small and unindexed.
    pub fn find(&self, id: u64) -> Option<&Employee> {
        self.employees.iter().find(|employee| employee.id == id)
    }

    pub fn in_department(&self, department: &str) -> Vec<&Employee> {
        self.employees
            .iter()
            .filter(|employee| employee.in_department(department))
            .collect()
    }
}
