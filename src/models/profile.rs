use serde::{Deserialize, Serialize};

use super::envelope::ApiEnvelope;

/// The signed-in administrator, as returned by `GET /profile`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct AdminProfile {
    pub id: u64,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub roles: String,
    #[serde(default)]
    pub profile_image: Option<String>,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

pub type AdminProfileResponse = ApiEnvelope<AdminProfile>;
