//! Customer agreement grouping one or more accounts.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A customer contract. Only its id is used, as the key that selects the
/// agreement's accounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agreement {
    pub id: Uuid,
    pub name: String,
}

impl Agreement {
    pub fn new(id: Uuid, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}
