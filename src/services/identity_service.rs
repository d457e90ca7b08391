use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::warn;

use crate::error::{Error, Result};

/// Outcome of resolving a Minecraft username against the identity service.
#[derive(Debug, Clone)]
pub struct Verification {
    pub valid: bool,
    pub uuid: Option<String>,
}

impl Verification {
    pub fn invalid() -> Self {
        Self {
            valid: false,
            uuid: None,
        }
    }
}

/// Resolves a player handle to its canonical id. Transient outages surface
/// as `IdentityUnavailable` so the caller can retry the whole submission.
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify(&self, username: &str) -> Result<Verification>;
}

#[derive(Debug, Deserialize)]
struct MojangProfile {
    id: String,
    #[allow(dead_code)]
    name: String,
}

/// Mojang profile API client. A 200 resolves to the canonical UUID, a
/// 404/204 means the username does not exist, anything else is transient.
#[derive(Clone)]
pub struct MojangVerifier {
    client: Client,
    base_url: String,
}

impl MojangVerifier {
    pub fn new(base_url: String, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Config(format!("Failed to build identity client: {}", e)))?;
        Ok(Self { client, base_url })
    }
}

#[async_trait]
impl IdentityVerifier for MojangVerifier {
    async fn verify(&self, username: &str) -> Result<Verification> {
        let url = format!("{}/users/profiles/minecraft/{}", self.base_url, username);
        let response = self.client.get(&url).send().await.map_err(|e| {
            warn!(username, error = %e, "identity lookup failed");
            Error::IdentityUnavailable(format!("Identity lookup failed: {}", e))
        })?;

        match response.status() {
            StatusCode::OK => {
                let profile: MojangProfile = response.json().await.map_err(|e| {
                    Error::IdentityUnavailable(format!("Malformed identity response: {}", e))
                })?;
                Ok(Verification {
                    valid: true,
                    uuid: Some(profile.id),
                })
            }
            StatusCode::NOT_FOUND | StatusCode::NO_CONTENT => Ok(Verification::invalid()),
            other => Err(Error::IdentityUnavailable(format!(
                "Identity service returned {}",
                other
            ))),
        }
    }
}
