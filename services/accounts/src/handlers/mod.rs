pub mod account;
pub mod channel;
pub mod extract;
pub mod federated;
pub mod like;
pub mod multipart;
pub mod password;
pub mod registration;
pub mod session;
pub mod subscription;
pub mod token;

use serde::Serialize;
use uuid::Uuid;

use nextube_domain::relationship::Toggle;

use crate::error::AccountsServiceError;

/// JSON shape of a toggle outcome: `{"status":"added","edge":{…}}` or
/// `{"status":"removed"}`.
#[derive(Debug, Serialize)]
pub struct ToggleResponse<T: Serialize> {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edge: Option<T>,
}

impl<T: Serialize> From<Toggle<T>> for ToggleResponse<T> {
    fn from(toggle: Toggle<T>) -> Self {
        match toggle {
            Toggle::Added(edge) => Self {
                status: "added",
                edge: Some(edge),
            },
            Toggle::Removed => Self {
                status: "removed",
                edge: None,
            },
        }
    }
}

/// Parse an id taken from the URL path.
pub(crate) fn parse_path_id(raw: &str, what: &str) -> Result<Uuid, AccountsServiceError> {
    raw.parse::<Uuid>()
        .map_err(|_| AccountsServiceError::Validation(format!("invalid {what}")))
}
