use anyhow::Context as _;
use serde::Deserialize;
use url::Url;

use crate::domain::repository::FederatedIdentityPort;
use crate::domain::types::FederatedProfile;
use crate::error::AccountsServiceError;

const TOKENINFO_URL: &str = "https://oauth2.googleapis.com/tokeninfo";

/// Claims returned by Google's `tokeninfo` endpoint. Booleans arrive as strings.
#[derive(Debug, Deserialize)]
struct TokenInfo {
    aud: String,
    email: Option<String>,
    #[serde(default)]
    email_verified: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    picture: Option<String>,
}

/// Verifies Google ID tokens through the `tokeninfo` endpoint.
#[derive(Clone)]
pub struct GoogleIdentityVerifier {
    pub http: reqwest::Client,
    pub client_id: String,
    pub tokeninfo_url: String,
}

impl GoogleIdentityVerifier {
    pub fn new(http: reqwest::Client, client_id: String) -> Self {
        Self {
            http,
            client_id,
            tokeninfo_url: TOKENINFO_URL.to_owned(),
        }
    }
}

impl FederatedIdentityPort for GoogleIdentityVerifier {
    async fn verify(&self, id_token: &str) -> Result<FederatedProfile, AccountsServiceError> {
        let url = Url::parse_with_params(&self.tokeninfo_url, &[("id_token", id_token)])
            .context("build tokeninfo url")?;

        let resp = self
            .http
            .get(url)
            .send()
            .await
            .context("call google tokeninfo")?;

        // Google answers 400 for expired, malformed or forged tokens.
        if resp.status().is_client_error() {
            return Err(AccountsServiceError::InvalidFederatedToken);
        }
        let info: TokenInfo = resp
            .error_for_status()
            .context("google tokeninfo status")?
            .json()
            .await
            .context("decode google tokeninfo")?;

        profile_from_token_info(info, &self.client_id)
    }
}

fn profile_from_token_info(
    info: TokenInfo,
    client_id: &str,
) -> Result<FederatedProfile, AccountsServiceError> {
    if info.aud != client_id {
        tracing::warn!(aud = %info.aud, "google id token issued for another client");
        return Err(AccountsServiceError::InvalidFederatedToken);
    }
    let email = info
        .email
        .filter(|e| !e.is_empty())
        .ok_or(AccountsServiceError::InvalidFederatedToken)?;
    Ok(FederatedProfile {
        email,
        email_verified: info.email_verified.as_deref() == Some("true"),
        name: info.name.unwrap_or_default(),
        picture: info.picture,
    })
}
