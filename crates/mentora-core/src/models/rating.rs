//! Session rating domain model.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rating {
    pub id: Uuid,
    pub session_id: Uuid,
    pub author_id: Uuid,
    /// Named criteria mapped to integer scores on `scale`.
    pub scores: BTreeMap<String, u8>,
    pub scale: u8,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRating {
    pub session_id: Uuid,
    pub author_id: Uuid,
    pub scores: BTreeMap<String, u8>,
    pub scale: u8,
}
