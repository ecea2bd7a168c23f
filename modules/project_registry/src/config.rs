use serde::{Deserialize, Serialize};

/// Settings read from `modules.project_registry`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectRegistryConfig {
    /// Reject projects whose end date precedes their start date.
    #[serde(default = "default_validate_project_dates")]
    pub validate_project_dates: bool,
}

impl Default for ProjectRegistryConfig {
    fn default() -> Self {
        Self {
            validate_project_dates: default_validate_project_dates(),
        }
    }
}

fn default_validate_project_dates() -> bool {
    true
}
