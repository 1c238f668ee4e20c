use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Response envelope returned by the logical endpoints of the store
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Secret {
    #[serde(default)]
    pub request_id: String,
    #[serde(default)]
    pub lease_id: String,
    #[serde(default)]
    pub lease_duration: u64,
    #[serde(default)]
    pub renewable: bool,
    #[serde(default)]
    pub data: Option<HashMap<String, serde_json::Value>>,
    #[serde(default)]
    pub auth: Option<SecretAuth>,
    #[serde(default)]
    pub warnings: Option<Vec<String>>,
}

/// Authentication section of a login response
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SecretAuth {
    pub client_token: String,
    #[serde(default)]
    pub accessor: String,
    #[serde(default)]
    pub policies: Option<Vec<String>>,
    #[serde(default)]
    pub lease_duration: u64,
    #[serde(default)]
    pub renewable: bool,
}
