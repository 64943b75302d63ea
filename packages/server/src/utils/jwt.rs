use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode, errors};
use serde::{Deserialize, Serialize};

use crate::principal::{Principal, PrincipalKind};

/// Admin sessions last 12 hours.
pub const ADMIN_TOKEN_TTL: Duration = Duration::hours(12);
/// User sessions last 7 days.
pub const USER_TOKEN_TTL: Duration = Duration::days(7);

/// JWT Claims structure.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub id: String,
    pub username: String,
    /// Absent for admins, `"user"` for registered users.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<PrincipalKind>,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn into_principal(self) -> Principal {
        Principal {
            id: self.id,
            username: self.username,
            kind: self.kind.unwrap_or(PrincipalKind::Admin),
        }
    }
}

/// Sign a token for the given principal, valid for `ttl` from now.
pub fn sign(principal: &Principal, ttl: Duration, secret: &str) -> errors::Result<String> {
    let now = Utc::now();
    let claims = Claims {
        id: principal.id.clone(),
        username: principal.username.clone(),
        kind: match principal.kind {
            PrincipalKind::Admin => None,
            PrincipalKind::User => Some(PrincipalKind::User),
        },
        iat: now.timestamp(),
        exp: (now + ttl).timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Verify and decode a token.
pub fn verify(token: &str, secret: &str) -> errors::Result<Claims> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(token_data.claims)
}
