//! Account Types

use serde::{Deserialize, Serialize};

use crate::error::{ClientError, Result};

/// Shortest accepted new password
pub const MIN_PASSWORD_LEN: usize = 6;

/// Signed-in user profile
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub username: String,

    #[serde(default)]
    pub email: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

impl User {
    /// The profile endpoint sometimes answers with just the username
    pub fn from_profile(value: serde_json::Value) -> serde_json::Result<Self> {
        match value {
            serde_json::Value::String(username) => Ok(Self {
                username,
                ..Self::default()
            }),
            other => serde_json::from_value(other),
        }
    }

    /// Single uppercase letter for avatars
    pub fn initial(&self) -> char {
        self.first_name
            .as_deref()
            .and_then(|n| n.chars().next())
            .or_else(|| self.username.chars().next())
            .map_or('U', |c| c.to_uppercase().next().unwrap_or(c))
    }

    /// Home page greeting
    pub fn greeting(&self) -> String {
        match self.first_name.as_deref().filter(|n| !n.is_empty()) {
            Some(name) => format!("Hey, {name}!"),
            None => "Welcome back".into(),
        }
    }
}

/// Password change request body
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PasswordChange {
    pub password: String,
    pub new_password: String,
}

impl PasswordChange {
    /// Local checks before anything is sent
    pub fn validate(&self) -> Result<()> {
        if self.password.is_empty() {
            return Err(ClientError::Rejected("Please enter your current password.".into()));
        }
        if self.new_password.chars().count() < MIN_PASSWORD_LEN {
            return Err(ClientError::Rejected(format!(
                "New password must be at least {MIN_PASSWORD_LEN} characters."
            )));
        }
        Ok(())
    }
}

/// First validation message of an error body, if any
pub(crate) fn rejection_detail(body: &serde_json::Value) -> Option<String> {
    body.get("detail")
        .and_then(|d| match d {
            serde_json::Value::Array(items) => items.first().and_then(|i| i.get("msg")),
            other => Some(other),
        })
        .and_then(serde_json::Value::as_str)
        .map(ToString::to_string)
}
