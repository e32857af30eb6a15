use serde::{Deserialize, Serialize};

/// A single employee as served by `/api/users`.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Employee {
    pub id: u64,
    pub name: String,
    pub department: String,
    pub role: String,
    pub salary: f64,
}

impl Employee {
    /// Display form of the id, zero-padded to three digits.
    pub fn display_id(&self) -> String {
        format!("#{:03}", self.id)
    }

    pub fn in_department(&self, department: &str) -> bool {
        self.department.to_lowercase() == department.to_lowercase()
    }
}
