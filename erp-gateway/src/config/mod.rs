use secrecy::Secret;
use serde::Deserialize;
use service_core::error::AppError;
use service_core::store::StoreSettings;

#[derive(Deserialize, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    #[serde(default)]
    pub observability: ObservabilitySettings,
    #[serde(default)]
    pub store: StoreSettings,
    pub identity: IdentitySettings,
    pub backend: BackendSettings,
    #[serde(default)]
    pub access: AccessSettings,
}

#[derive(Deserialize, Clone)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

#[derive(Deserialize, Clone)]
pub struct ObservabilitySettings {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// OTLP gRPC collector; empty disables span export.
    #[serde(default)]
    pub otlp_endpoint: String,
}

impl Default for ObservabilitySettings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            otlp_endpoint: String::new(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Client-credentials access to the external identity provider.
#[derive(Deserialize, Clone)]
pub struct IdentitySettings {
    /// Name used to namespace the stored token (e.g. `"crm"`).
    #[serde(default = "default_provider")]
    pub provider: String,
    pub token_url: String,
    pub client_id: String,
    pub client_secret: Secret<String>,
    #[serde(default)]
    pub scope: Option<String>,
}

fn default_provider() -> String {
    "backend".to_string()
}

#[derive(Deserialize, Clone)]
pub struct BackendSettings {
    pub url: String,
    #[serde(default = "default_categories_path")]
    pub categories_path: String,
    /// RPC returning a user's profile, role, modules and features.
    #[serde(default = "default_access_path")]
    pub access_path: String,
}

fn default_categories_path() -> String {
    "/api/categories".to_string()
}

fn default_access_path() -> String {
    "/api/users/{user_id}/access".to_string()
}

/// Permission checks.
#[derive(Deserialize, Clone, Default)]
pub struct AccessSettings {
    /// Role names (case-insensitive) that pass every module and feature
    /// check. Empty means every grant must be explicit.
    #[serde(default)]
    pub admin_roles: Vec<String>,
}

pub fn get_configuration() -> Result<Settings, AppError> {
    let base_path = std::env::current_dir()?;

    // Run either from the workspace root or from the crate directory
    let configuration_directory = if base_path.ends_with("erp-gateway") {
        base_path.join("config")
    } else {
        base_path.join("erp-gateway").join("config")
    };

    service_core::config::load(&configuration_directory)
}
