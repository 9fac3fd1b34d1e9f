use chrono::Utc;
use jsonwebtoken::{EncodingKey, Header, encode, errors::Error};
#[cfg(test)]
use jsonwebtoken::{DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub user_id: u64,
    pub role: String,
    pub iat: u64,
    pub exp: u64,
    pub jti: String,
}

/// Signs and checks HS256 bearer tokens with the server secret.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    #[cfg(test)]
    decoding: DecodingKey,
    ttl_secs: u64,
}

impl TokenIssuer {
    pub fn new(secret: &str, ttl_secs: u64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            #[cfg(test)]
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl_secs,
        }
    }

    pub fn issue(&self, user_id: u64, role: &str) -> Result<String, Error> {
        let now = Utc::now().timestamp().max(0) as u64;
        let claims = Claims {
            user_id,
            role: role.to_string(),
            iat: now,
            exp: now + self.ttl_secs,
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding)
    }

    /// Decodes a token from `issue`; bad signatures and expired tokens fail.
    #[cfg(test)]
    pub fn verify(&self, token: &str) -> Result<Claims, Error> {
        decode::<Claims>(token, &self.decoding, &Validation::default()).map(|data| data.claims)
    }
}
