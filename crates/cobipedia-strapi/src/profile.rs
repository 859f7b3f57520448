//! The authenticated user's own profile.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::owned::OwnedError;
use crate::store::ContentStore;
use crate::types::{Populate, Query};

/// Store endpoint of user accounts.
pub const USERS_ENDPOINT: &str = "users";

/// Profile fields a user may change on their own account.
const EDITABLE_FIELDS: &[&str] = &["slogan", "avatar"];

/// Public view of a user account. Empty `slogan` and `avatar` values are
/// reported as `null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: Option<i64>,
    pub document_id: String,
    pub username: String,
    pub email: String,
    pub slogan: Option<String>,
    pub avatar: Option<Value>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl UserProfile {
    fn from_document(doc: &Value) -> Self {
        let text = |key: &str| doc.get(key).and_then(Value::as_str).map(str::to_string);
        Self {
            id: doc.get("id").and_then(Value::as_i64),
            document_id: text("documentId").unwrap_or_default(),
            username: text("username").unwrap_or_default(),
            email: text("email").unwrap_or_default(),
            slogan: text("slogan").filter(|s| !s.is_empty()),
            avatar: doc
                .get("avatar")
                .filter(|a| !matches!(a, Value::Null | Value::Bool(false)))
                .cloned(),
            created_at: text("createdAt"),
            updated_at: text("updatedAt"),
        }
    }
}

pub struct UserProfiles<'a> {
    store: &'a dyn ContentStore,
}

impl<'a> UserProfiles<'a> {
    #[must_use]
    pub fn new(store: &'a dyn ContentStore) -> Self {
        Self { store }
    }

    /// Profile of `user`, with the avatar populated.
    ///
    /// # Errors
    ///
    /// [`OwnedError::Unauthorized`] without a user; [`OwnedError::Store`] if
    /// the account is missing or the store call fails.
    pub async fn me(&self, user: Option<&str>) -> Result<UserProfile, OwnedError> {
        let user = user.filter(|u| !u.is_empty()).ok_or(OwnedError::Unauthorized)?;
        let query = Query::new().populate(Populate::relation("avatar", &[]));
        let doc = self
            .store
            .find_one(USERS_ENDPOINT, user, &query)
            .await?
            .ok_or_else(|| crate::StrapiError::NotFound {
                content_type: USERS_ENDPOINT.to_string(),
                document_id: user.to_string(),
            })?;
        Ok(UserProfile::from_document(&doc))
    }

    /// Updates `slogan` and `avatar` when `body` carries them, including as
    /// `null`; every other key in `body` is ignored.
    ///
    /// # Errors
    ///
    /// See [`UserProfiles::me`].
    pub async fn update_me(&self, user: Option<&str>, body: &Value) -> Result<UserProfile, OwnedError> {
        let user = user.filter(|u| !u.is_empty()).ok_or(OwnedError::Unauthorized)?;
        let data: Map<String, Value> = EDITABLE_FIELDS
            .iter()
            .filter_map(|field| body.get(field).map(|v| ((*field).to_string(), v.clone())))
            .collect();

        self.store
            .update(USERS_ENDPOINT, user, None, Value::Object(data))
            .await?;
        tracing::debug!(user, "profile updated");
        self.me(Some(user)).await
    }
}
