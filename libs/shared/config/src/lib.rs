use std::env;
use std::time::Duration;
use tracing::warn;

const DEFAULT_STORE_TIMEOUT_MS: u64 = 5_000;
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3004";

/// Where practitioners and appointments are persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Memory,
    Supabase,
}

impl StoreBackend {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "memory" | "in_memory" | "inmemory" => Some(Self::Memory),
            "supabase" | "postgrest" => Some(Self::Supabase),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub supabase_url: String,
    pub supabase_service_key: String,
    pub store_backend: StoreBackend,
    /// Upper bound for every store call and for acquiring a practitioner lock.
    pub store_timeout: Duration,
    pub bind_addr: String,
    /// JSON file used to seed the in-memory practitioner roster.
    pub roster_file: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            supabase_url: String::new(),
            supabase_service_key: String::new(),
            store_backend: StoreBackend::Memory,
            store_timeout: Duration::from_millis(DEFAULT_STORE_TIMEOUT_MS),
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            roster_file: None,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let supabase_url = env::var("SUPABASE_URL")
            .unwrap_or_else(|_| {
                warn!("SUPABASE_URL not set, using empty value");
                String::new()
            });
        let supabase_service_key = env::var("SUPABASE_SERVICE_KEY")
            .unwrap_or_else(|_| {
                warn!("SUPABASE_SERVICE_KEY not set, using empty value");
                String::new()
            });

        let store_backend = match env::var("STORE_BACKEND") {
            Ok(raw) => StoreBackend::parse(&raw).unwrap_or_else(|| {
                warn!("Unknown STORE_BACKEND '{}', falling back to memory", raw);
                StoreBackend::Memory
            }),
            Err(_) => StoreBackend::Memory,
        };

        let store_timeout = env::var("STORE_TIMEOUT_MS")
            .ok()
            .and_then(|raw| match raw.parse::<u64>() {
                Ok(ms) if ms > 0 => Some(ms),
                _ => {
                    warn!("Invalid STORE_TIMEOUT_MS '{}', using default", raw);
                    None
                }
            })
            .map(Duration::from_millis)
            .unwrap_or_else(|| Duration::from_millis(DEFAULT_STORE_TIMEOUT_MS));

        let bind_addr = env::var("BIND_ADDR")
            .unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());

        let roster_file = env::var("ROSTER_FILE").ok().filter(|p| !p.trim().is_empty());

        let config = Self {
            supabase_url,
            supabase_service_key,
            store_backend,
            store_timeout,
            bind_addr,
            roster_file,
        };

        if config.store_backend == StoreBackend::Supabase && !config.is_supabase_configured() {
            warn!("Supabase backend selected but SUPABASE_URL / SUPABASE_SERVICE_KEY are missing");
        }

        config
    }

    pub fn is_supabase_configured(&self) -> bool {
        !self.supabase_url.is_empty() && !self.supabase_service_key.is_empty()
    }
}
