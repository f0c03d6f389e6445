use std::fmt;
use std::ops::Deref;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Longest device id the server will accept.
pub const MAX_DEVICE_ID_LEN: usize = 64;

#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct UserId(String);

impl UserId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Deref for UserId {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl From<String> for UserId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

/// Client-generated opaque device token, at most [`MAX_DEVICE_ID_LEN`] chars.
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(try_from = "String")]
pub struct DeviceId(String);

#[derive(Clone, Copy, Debug, Error)]
pub enum InvalidDeviceId {
    #[error("device id is empty")]
    Empty,
    #[error("device id exceeds {MAX_DEVICE_ID_LEN} characters")]
    TooLong,
}

impl DeviceId {
    pub fn new(id: impl Into<String>) -> Result<Self, InvalidDeviceId> {
        let id = id.into();

        if id.is_empty() {
            return Err(InvalidDeviceId::Empty);
        }

        if id.chars().count() > MAX_DEVICE_ID_LEN {
            return Err(InvalidDeviceId::TooLong);
        }

        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl FromStr for DeviceId {
    type Err = InvalidDeviceId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for DeviceId {
    type Error = InvalidDeviceId;

    fn try_from(id: String) -> Result<Self, Self::Error> {
        Self::new(id)
    }
}

/// The resolved identity scoping all per-user stored data.
///
/// Exactly one variant resolves per request. `Unresolved` is terminal: it is
/// never an error by itself, callers decide whether the operation they are
/// about to perform tolerates it.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum Owner {
    Authenticated { user_id: UserId },
    Anonymous { device_id: DeviceId },
    Unresolved,
}

impl Owner {
    pub fn authenticated(user_id: impl Into<UserId>) -> Self {
        Self::Authenticated {
            user_id: user_id.into(),
        }
    }

    pub const fn anonymous(device_id: DeviceId) -> Self {
        Self::Anonymous { device_id }
    }

    pub const fn is_resolved(&self) -> bool {
        !matches!(self, Self::Unresolved)
    }

    pub const fn user_id(&self) -> Option<&UserId> {
        match self {
            Self::Authenticated { user_id } => Some(user_id),
            _ => None,
        }
    }

    pub const fn device_id(&self) -> Option<&DeviceId> {
        match self {
            Self::Anonymous { device_id } => Some(device_id),
            _ => None,
        }
    }

    /// Key segment scoping this owner's rows in the persistence layer.
    ///
    /// Account and device scopes are disjoint namespaces so a claim can move
    /// rows between them without key collisions.
    pub fn scope(&self) -> Option<String> {
        match self {
            Self::Authenticated { user_id } => Some(format!("u:{user_id}")),
            Self::Anonymous { device_id } => Some(format!("d:{device_id}")),
            Self::Unresolved => None,
        }
    }
}
