//! Admin profile store.
//!
//! Holds the signed-in administrator's profile and permissions, with the
//! same busy/error bookkeeping the session store uses.

use std::sync::{PoisonError, RwLock, RwLockWriteGuard};

use chrono::Utc;
use tracing::{error, warn};

use crate::client::{ApiClient, AuthErrorPolicy, FormPart, RequestOptions};
use crate::error::FetchError;
use crate::models::profile::AdminProfileResponse;
use crate::models::{AdminProfile, ApiEnvelope};

pub const PROFILE_PATH: &str = "/profile";
pub const MAX_PROFILE_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// A point-in-time copy of the profile store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileState {
    pub profile: Option<AdminProfile>,
    pub loading: bool,
    pub update_loading: bool,
    pub error: Option<String>,
    pub permissions: Vec<String>,
}

/// A file chosen for upload as the profile image.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    #[error("Please select an image file!")]
    NotAnImage,

    #[error("Image size must be less than 5MB!")]
    TooLarge,

    /// The backend answered without profile data; carries its message.
    #[error("{0}")]
    Rejected(String),

    #[error(transparent)]
    Fetch(#[from] FetchError),
}

pub struct ProfileStore {
    client: ApiClient,
    state: RwLock<ProfileState>,
}

impl ProfileStore {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            state: RwLock::new(ProfileState::default()),
        }
    }

    pub fn snapshot(&self) -> ProfileState {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn has_permission(&self, permission: &str) -> bool {
        self.snapshot().permissions.iter().any(|p| p == permission)
    }

    /// Replaces the permission list from its persisted JSON form.
    /// Anything other than an array of strings yields no permissions.
    pub fn load_permissions(&self, raw: Option<&str>) {
        let permissions = raw
            .and_then(|raw| serde_json::from_str::<Vec<String>>(raw).ok())
            .unwrap_or_default();
        self.write().permissions = permissions;
    }

    /// The profile image URL with a cache-busting `v` parameter.
    pub fn profile_image_url(&self) -> Option<String> {
        let image = self.snapshot().profile?.profile_image?;
        if image.is_empty() {
            return None;
        }
        let separator = if image.contains('?') { '&' } else { '?' };
        Some(format!("{}{}v={}", image, separator, Utc::now().timestamp_millis()))
    }

    /// Loads the profile. Failures are recorded in `error`, not returned.
    pub async fn fetch_profile(&self) {
        {
            let mut state = self.write();
            state.loading = true;
            state.error = None;
        }

        let result = self
            .client
            .fetch::<AdminProfileResponse>(PROFILE_PATH, RequestOptions::get(), AuthErrorPolicy::Propagate)
            .await;

        let mut state = self.write();
        match result {
            Ok(Some(envelope)) if envelope.is_ok() => {
                state.profile = envelope.data;
            }
            Ok(Some(envelope)) => {
                let message = envelope
                    .message
                    .unwrap_or_else(|| "Failed to fetch profile".to_string());
                warn!("Profile fetch rejected: {}", message);
                state.error = Some(message);
            }
            Ok(None) => {
                state.error = Some("Failed to fetch profile".to_string());
            }
            Err(e) => {
                error!("Profile fetch failed: {}", e);
                state.error = Some("Failed to fetch admin profile".to_string());
            }
        }
        state.loading = false;
    }

    /// Updates name and email.
    pub async fn update_profile(&self, name: &str, email: &str) -> Result<AdminProfile, ProfileError> {
        let parts = vec![
            FormPart::text("_method", "PUT"),
            FormPart::text("name", name),
            FormPart::text("email", email),
        ];
        self.submit_update(parts, "Failed to update profile").await
    }

    /// Replaces the profile image. The file is checked before any request.
    pub async fn update_profile_image(&self, upload: ImageUpload) -> Result<AdminProfile, ProfileError> {
        if !upload.content_type.starts_with("image/") {
            return Err(ProfileError::NotAnImage);
        }
        if upload.bytes.len() > MAX_PROFILE_IMAGE_BYTES {
            return Err(ProfileError::TooLarge);
        }
        let parts = vec![
            FormPart::text("_method", "PUT"),
            FormPart::file("profile_image", &upload.file_name, &upload.content_type, upload.bytes),
        ];
        self.submit_update(parts, "Failed to update profile image").await
    }

    async fn submit_update(&self, parts: Vec<FormPart>, fallback: &str) -> Result<AdminProfile, ProfileError> {
        self.write().update_loading = true;
        let result = self
            .client
            .fetch::<AdminProfileResponse>(PROFILE_PATH, RequestOptions::post().multipart(parts), AuthErrorPolicy::Propagate)
            .await;

        let mut state = self.write();
        state.update_loading = false;
        match result {
            Ok(Some(ApiEnvelope {
                data: Some(profile), ..
            })) => {
                state.profile = Some(profile.clone());
                Ok(profile)
            }
            Ok(Some(envelope)) => Err(ProfileError::Rejected(
                envelope.message.unwrap_or_else(|| fallback.to_string()),
            )),
            Ok(None) => Err(ProfileError::Rejected(fallback.to_string())),
            Err(e) => {
                error!("{}: {}", fallback, e);
                Err(e.into())
            }
        }
    }

    fn write(&self) -> RwLockWriteGuard<'_, ProfileState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}
