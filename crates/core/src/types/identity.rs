//! Verified user identity returned by the identity provider.

use serde::{Deserialize, Serialize};

use super::id::UserId;

/// Errors that can occur when turning provider claims into an [`Identity`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum IdentityError {
    /// The `sub` claim is absent or empty.
    #[error("userinfo response has no subject")]
    MissingSubject,
}

/// Claims returned by an OpenID Connect `userinfo` endpoint.
///
/// Only `sub` is required; every other claim defaults when absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserInfoClaims {
    #[serde(default)]
    pub sub: Option<String>,
    #[serde(default)]
    pub email_verified: bool,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub preferred_username: String,
    #[serde(default)]
    pub given_name: String,
    #[serde(default)]
    pub family_name: String,
    #[serde(default)]
    pub email: String,
}

/// A user identity resolved for the duration of one request.
///
/// Never persisted. `subject` is the only field used as a key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub subject: UserId,
    pub email_verified: bool,
    pub display_name: String,
    pub email: String,
    pub preferred_username: String,
}

impl Identity {
    /// Whether this identity is the owner of `user_id`'s data.
    #[must_use]
    pub fn owns(&self, user_id: &UserId) -> bool {
        &self.subject == user_id
    }
}

impl TryFrom<UserInfoClaims> for Identity {
    type Error = IdentityError;

    fn try_from(claims: UserInfoClaims) -> Result<Self, Self::Error> {
        let subject = claims
            .sub
            .filter(|sub| !sub.trim().is_empty())
            .map(UserId::new)
            .ok_or(IdentityError::MissingSubject)?;

        // Fall back to the given/family names when the provider omits `name`.
        let display_name = if claims.name.is_empty() {
            format!("{} {}", claims.given_name, claims.family_name)
                .trim()
                .to_owned()
        } else {
            claims.name
        };

        Ok(Self {
            subject,
            email_verified: claims.email_verified,
            display_name,
            email: claims.email,
            preferred_username: claims.preferred_username,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_full_claims_into_identity() {
        let claims: UserInfoClaims = serde_json::from_str(
            r#"{
                "sub": "6f1c2d3e",
                "email_verified": true,
                "name": "Ada Lovelace",
                "preferred_username": "ada",
                "given_name": "Ada",
                "family_name": "Lovelace",
                "email": "ada@example.com"
            }"#,
        )
        .unwrap();

        let identity = Identity::try_from(claims).unwrap();
        assert_eq!(identity.subject, UserId::new("6f1c2d3e"));
        assert!(identity.email_verified);
        assert_eq!(identity.display_name, "Ada Lovelace");
        assert_eq!(identity.email, "ada@example.com");
        assert_eq!(identity.preferred_username, "ada");
    }

    #[test]
    fn test_display_name_falls_back_to_given_and_family() {
        let claims = UserInfoClaims {
            sub: Some("s".to_string()),
            given_name: "Grace".to_string(),
            family_name: "Hopper".to_string(),
            ..UserInfoClaims::default()
        };
        let identity = Identity::try_from(claims).unwrap();
        assert_eq!(identity.display_name, "Grace Hopper");
    }

    #[test]
    fn test_missing_subject_is_rejected() {
        let claims: UserInfoClaims = serde_json::from_str(r#"{"email": "x@y.z"}"#).unwrap();
        assert_eq!(
            Identity::try_from(claims),
            Err(IdentityError::MissingSubject)
        );
    }

    #[test]
    fn test_blank_subject_is_rejected() {
        let claims = UserInfoClaims {
            sub: Some("  ".to_string()),
            ..UserInfoClaims::default()
        };
        assert_eq!(
            Identity::try_from(claims),
            Err(IdentityError::MissingSubject)
        );
    }

    #[test]
    fn test_owns() {
        let identity = Identity::try_from(UserInfoClaims {
            sub: Some("u1".to_string()),
            ..UserInfoClaims::default()
        })
        .unwrap();
        assert!(identity.owns(&UserId::new("u1")));
        assert!(!identity.owns(&UserId::new("u2")));
    }
}
