use serde::{Deserialize, Serialize};

use crate::employees::Employee;

/// Layout of the static JSON document the directory is loaded from.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectorySource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    pub total_users: usize,
    pub users: Vec<Employee>,
}
