use serde::{Deserialize, Serialize};
use std::{fmt::Display, ops::Deref};

/// Identifier handed to every preview record at construction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct PreviewId(String);

impl Display for PreviewId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Deref for PreviewId {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<PreviewId> for String {
    fn from(fr: PreviewId) -> Self {
        fr.0
    }
}

impl PreviewId {
    #[inline]
    pub fn generate() -> PreviewId {
        PreviewId(rusty_ulid::generate_ulid_string())
    }
}
