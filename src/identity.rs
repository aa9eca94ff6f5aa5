//! Identity provider tokens
//!
//! The provider signs an ID token (JWT) in the browser. It is verified once,
//! when the admin panel opens a session; after that the session cookie
//! carries the identity.

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::config::AuthConfig;
use crate::error::{AppError, AppResult};

/// Claims read from the provider's token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdClaims {
    pub sub: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    pub exp: usize,
}

/// Signed-in administrator, as kept in the session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminIdentity {
    pub uid: String,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
}

pub struct IdentityVerifier {
    key: DecodingKey,
    validation: Validation,
    admins: Vec<String>,
}

impl IdentityVerifier {
    pub fn from_config(config: &AuthConfig) -> anyhow::Result<Self> {
        let (algorithm, key) = match config.algorithm.to_ascii_uppercase().as_str() {
            "HS256" => {
                if config.secret.is_empty() {
                    tracing::warn!("auth.secret is empty; no session can be opened");
                }
                (Algorithm::HS256, DecodingKey::from_secret(config.secret.as_bytes()))
            }
            "RS256" => {
                let path = config
                    .public_key_pem
                    .as_ref()
                    .ok_or_else(|| anyhow::anyhow!("auth.public_key_pem is required for RS256"))?;
                let pem = std::fs::read(path)?;
                (Algorithm::RS256, DecodingKey::from_rsa_pem(&pem)?)
            }
            other => anyhow::bail!("unsupported token algorithm: {}", other),
        };

        let mut validation = Validation::new(algorithm);
        if config.issuer.is_empty() {
            validation.iss = None;
        } else {
            validation.set_issuer(&[config.issuer.as_str()]);
        }
        if config.audience.is_empty() {
            validation.validate_aud = false;
        } else {
            validation.set_audience(&[config.audience.as_str()]);
        }

        Ok(Self {
            key,
            validation,
            admins: config.admins.iter().map(|a| a.trim().to_lowercase()).collect(),
        })
    }

    /// Check signature, expiry, issuer and audience, then the admin list
    pub fn verify(&self, token: &str) -> AppResult<AdminIdentity> {
        let data = decode::<IdClaims>(token, &self.key, &self.validation).map_err(|e| {
            tracing::warn!("Rejected identity token: {}", e);
            AppError::Unauthorized
        })?;
        let claims = data.claims;
        let email = claims.email.unwrap_or_default().trim().to_lowercase();

        if !self.is_admin(&email) {
            tracing::warn!("Identity {} ({}) is not an administrator", claims.sub, email);
            return Err(AppError::Forbidden);
        }

        Ok(AdminIdentity {
            uid: claims.sub,
            email,
            name: claims.name,
        })
    }

    /// An empty admin list admits every verified identity
    pub fn is_admin(&self, email: &str) -> bool {
        self.admins.is_empty() || self.admins.iter().any(|a| a == email)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    pub const SECRET: &str = "test-secret";

    pub fn token(email: &str, valid_for_secs: i64) -> String {
        let exp = (chrono::Utc::now().timestamp() + valid_for_secs) as usize;
        let claims = IdClaims {
            sub: format!("uid-{}", email),
            email: Some(email.to_string()),
            name: None,
            exp,
        };
        encode(&Header::default(), &claims, &EncodingKey::from_secret(SECRET.as_bytes())).unwrap()
    }

    pub fn config(admins: &[&str]) -> AuthConfig {
        AuthConfig {
            secret: SECRET.to_string(),
            admins: admins.iter().map(|a| a.to_string()).collect(),
            ..AuthConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::{config, token};
    use super::*;

    #[test]
    fn test_valid_token_for_listed_admin() {
        let verifier = IdentityVerifier::from_config(&config(&["Admin@School.edu.my"])).unwrap();
        let identity = verifier.verify(&token("admin@school.edu.my", 600)).unwrap();
        assert_eq!(identity.email, "admin@school.edu.my");
        assert_eq!(identity.uid, "uid-admin@school.edu.my");
    }

    #[test]
    fn test_unlisted_identity_is_forbidden() {
        let verifier = IdentityVerifier::from_config(&config(&["admin@school.edu.my"])).unwrap();
        assert!(matches!(
            verifier.verify(&token("parent@gmail.com", 600)),
            Err(AppError::Forbidden)
        ));
    }

    #[test]
    fn test_empty_admin_list_admits_anyone_verified() {
        let verifier = IdentityVerifier::from_config(&config(&[])).unwrap();
        assert!(verifier.verify(&token("someone@school.edu.my", 600)).is_ok());
    }

    #[test]
    fn test_expired_or_forged_tokens_are_unauthorized() {
        let verifier = IdentityVerifier::from_config(&config(&[])).unwrap();
        assert!(matches!(
            verifier.verify(&token("a@b.c", -3600)),
            Err(AppError::Unauthorized)
        ));
        assert!(matches!(verifier.verify("not.a.jwt"), Err(AppError::Unauthorized)));
    }

    #[test]
    fn test_unknown_algorithm_fails_to_configure() {
        let mut cfg = config(&[]);
        cfg.algorithm = "none".to_string();
        assert!(IdentityVerifier::from_config(&cfg).is_err());
    }
}
