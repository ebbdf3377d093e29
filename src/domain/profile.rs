use serde::{Deserialize, Serialize};

/// User details embedded in backup exports.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub owner_id: String,
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default = "UserProfile::default_currency")]
    pub base_currency: String,
}

impl UserProfile {
    pub fn new(owner_id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            owner_id: owner_id.into(),
            display_name: display_name.into(),
            email: None,
            base_currency: Self::default_currency(),
        }
    }

    fn default_currency() -> String {
        "USD".into()
    }
}
