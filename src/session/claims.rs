use base64::Engine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ClientError, ClientResult};

/// Role claim embedded by the dashboard issuer. Ordered loosest to tightest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Viewer,
    PowerUser,
    Moderator,
    Admin,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Viewer, Role::PowerUser, Role::Moderator, Role::Admin];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Viewer => "viewer",
            Role::PowerUser => "power_user",
            Role::Moderator => "moderator",
            Role::Admin => "admin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "viewer" => Ok(Role::Viewer),
            "power_user" => Ok(Role::PowerUser),
            "moderator" => Ok(Role::Moderator),
            "admin" => Ok(Role::Admin),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

/// Identity claims carried in the credential's payload segment.
/// The issuer embeds `sub` as the user id in string form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub username: String,
    pub role: Role,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub exp: i64,
}

impl Claims {
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        if self.exp <= 0 {
            return None;
        }
        DateTime::from_timestamp(self.exp, 0)
    }

    pub fn is_expired(&self) -> bool {
        match self.expires_at() {
            Some(at) => at <= Utc::now(),
            None => false,
        }
    }
}

/// Decode the claims object from a bearer credential without verifying the
/// signature; verification is the server's job, the client only reads the
/// embedded identity and role hints. Any shape problem maps to
/// `MalformedCredential`.
pub fn decode_claims(credential: &str) -> ClientResult<Claims> {
    let segments: Vec<&str> = credential.split('.').collect();
    if segments.len() != 3 {
        return Err(ClientError::malformed(format!(
            "expected 3 token segments, found {}",
            segments.len()
        )));
    }
    let payload = base64::engine::general_purpose::URL_SAFE_NO_PAD
        .decode(segments[1])
        .map_err(|e| ClientError::malformed(format!("payload segment is not base64url: {}", e)))?;
    serde_json::from_slice(&payload)
        .map_err(|e| ClientError::malformed(format!("payload is not a claims object: {}", e)))
}
