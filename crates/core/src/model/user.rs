use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::model::ids::UserId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    Student,
    Teacher,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown user type: {0}")]
pub struct UserTypeParseError(pub String);

impl UserType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            UserType::Student => "student",
            UserType::Teacher => "teacher",
        }
    }
}

impl fmt::Display for UserType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserType {
    type Err = UserTypeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "student" => Ok(UserType::Student),
            "teacher" => Ok(UserType::Teacher),
            other => Err(UserTypeParseError(other.to_string())),
        }
    }
}

/// Identity record of a signed-in student or teacher.
///
/// The session store keeps this as an opaque value: no field is validated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    id: UserId,
    name: String,
    email: String,
    #[serde(rename = "type")]
    user_type: UserType,
    has_account: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    biometric_data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    voice_profile: Option<String>,
    created_at: DateTime<Utc>,
}

impl UserProfile {
    #[must_use]
    pub fn new(
        id: UserId,
        name: impl Into<String>,
        email: impl Into<String>,
        user_type: UserType,
        has_account: bool,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            email: email.into(),
            user_type,
            has_account,
            biometric_data: None,
            voice_profile: None,
            created_at,
        }
    }

    /// Attaches an encoded face capture.
    #[must_use]
    pub fn with_biometric_data(mut self, data: impl Into<String>) -> Self {
        self.biometric_data = Some(data.into());
        self
    }

    /// Attaches a spoken transcript used as the voice profile.
    #[must_use]
    pub fn with_voice_profile(mut self, profile: impl Into<String>) -> Self {
        self.voice_profile = Some(profile.into());
        self
    }

    #[must_use]
    pub fn id(&self) -> &UserId {
        &self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    #[must_use]
    pub fn user_type(&self) -> UserType {
        self.user_type
    }

    #[must_use]
    pub fn has_account(&self) -> bool {
        self.has_account
    }

    #[must_use]
    pub fn biometric_data(&self) -> Option<&str> {
        self.biometric_data.as_deref()
    }

    #[must_use]
    pub fn voice_profile(&self) -> Option<&str> {
        self.voice_profile.as_deref()
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Derives a placeholder e-mail from a display name (`Ana Garcia` -> `ana.garcia@<domain>`).
#[must_use]
pub fn email_from_name(name: &str, domain: &str) -> String {
    let local = name
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(".");
    let local = if local.is_empty() { "user".to_string() } else { local };
    format!("{local}@{domain}")
}
