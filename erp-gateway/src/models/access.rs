use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub full_name: String,
    pub email: String,
    /// Any further profile columns (phone, avatar_url, branch_id, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Role {
    pub id: String,
    pub name: String,
    pub level: i32,
}

/// A user's resolved role and module/feature grants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedAuth {
    pub profile: Profile,
    pub role: Role,
    pub modules: Vec<String>,
    pub features: Vec<String>,
}

/// Persisted wrapper around [`CachedAuth`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEnvelope {
    pub data: CachedAuth,
    /// Save time, epoch milliseconds.
    pub ts: i64,
    pub version: String,
}

impl CachedAuth {
    /// Whether the role is one of the configured `admin_roles`.
    pub fn has_role_in<S: AsRef<str>>(&self, admin_roles: &[S]) -> bool {
        admin_roles
            .iter()
            .any(|r| self.role.name.eq_ignore_ascii_case(r.as_ref()))
    }

    /// Access is never implied: a module must be granted explicitly.
    pub fn has_module(&self, module: &str) -> bool {
        self.modules.iter().any(|m| m == module)
    }

    pub fn has_feature(&self, feature: &str) -> bool {
        self.features.iter().any(|f| f == feature)
    }

    pub fn has_any_feature<S: AsRef<str>>(&self, features: &[S]) -> bool {
        features.iter().any(|f| self.has_feature(f.as_ref()))
    }
}
