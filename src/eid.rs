use serde::{Deserialize, Serialize};
use std::{fmt::Display, ops::Deref};

/// Unique identifier used to name stored image files.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct Eid(String);

impl Display for Eid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Deref for Eid {
    type Target = String;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Eid> for String {
    fn from(fr: Eid) -> Self {
        fr.0
    }
}

impl Eid {
    #[inline]
    pub fn new() -> Eid {
        Eid(rusty_ulid::Ulid::generate().to_string().to_lowercase())
    }
}

impl Default for Eid {
    fn default() -> Self {
        Self::new()
    }
}
