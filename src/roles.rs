//! Process-wide role cache: name <-> id over the `roles` table.
//!
//! Populated at most once per process through a one-shot initializer and
//! never refreshed; roles added or renamed after first load are not picked
//! up until restart. Role membership changes are rare and out of the hot
//! path, so staleness is accepted.

use std::collections::HashMap;

use serde_json::Value;
use tokio::sync::OnceCell;

use crate::supabase::{SupabaseClient, SupabaseError};

pub const ROLE_CLIENT: &str = "client";
pub const ROLE_ADMIN: &str = "admin";

#[derive(Debug, Default)]
pub struct RoleMap {
    by_name: HashMap<String, String>,
    by_id: HashMap<String, String>,
}

impl RoleMap {
    /// Build the bidirectional mapping from raw `roles` rows. Rows missing
    /// either field are skipped.
    pub fn from_rows(rows: &[Value]) -> Self {
        let mut map = RoleMap::default();
        for row in rows {
            let id = row.get("id").and_then(Value::as_str);
            let name = row.get("name").and_then(Value::as_str);
            if let (Some(id), Some(name)) = (id, name) {
                map.by_name.insert(name.to_string(), id.to_string());
                map.by_id.insert(id.to_string(), name.to_string());
            }
        }
        map
    }

    pub fn id_for(&self, name: &str) -> Option<&str> {
        self.by_name.get(name).map(String::as_str)
    }

    /// Role name for an id, defaulting to `"client"` when the id is not in
    /// the cached table.
    pub fn name_for(&self, id: &str) -> &str {
        self.by_id.get(id).map(String::as_str).unwrap_or(ROLE_CLIENT)
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

pub struct RoleCache {
    cell: OnceCell<RoleMap>,
}

impl RoleCache {
    pub fn new() -> Self {
        Self { cell: OnceCell::new() }
    }

    /// Idempotent load. The first successful call fetches all roles and
    /// populates both directions of the mapping; later calls return the
    /// cached map. A failed fetch leaves the cache empty so the next caller
    /// retries.
    pub async fn ensure_loaded(
        &self,
        supabase: &SupabaseClient,
    ) -> Result<&RoleMap, SupabaseError> {
        self.cell
            .get_or_try_init(|| async {
                let rows = supabase.select("roles", &[]).await?;
                let map = RoleMap::from_rows(&rows);
                if map.is_empty() {
                    // Cached all the same; lookups will default to "client"
                    // and the admin gate will deny until restart.
                    tracing::warn!("role table returned no usable rows");
                } else {
                    tracing::info!(roles = map.len(), "role cache loaded");
                }
                Ok(map)
            })
            .await
    }
}

impl Default for RoleCache {
    fn default() -> Self {
        Self::new()
    }
}
