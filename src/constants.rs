//! Application constants
//!
//! Single source of truth for endpoints, environment names and limits.

/// Default environment file path
pub const ENV_PATH: &str = ".env";

/// Google Maps Geocoding API base (v4beta)
pub const DEFAULT_GEOCODE_BASE_URL: &str = "https://geocode.googleapis.com/v4beta";

/// Response language requested from the geocoding provider
pub const GEOCODE_LANGUAGE: &str = "en";

/// Header naming the Google Cloud project billed for geocoding calls
pub const PROJECT_HEADER: &str = "X-Goog-User-Project";

/// Default Gemini model served through Vertex AI
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash-lite-001";

/// Upper bound on model/tool steps per chat request
pub const DEFAULT_MAX_STEPS: usize = 3;

/// Default REST bind address
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

/// OAuth scope requested for Vertex AI access tokens
pub const CLOUD_PLATFORM_SCOPE: &str = "https://www.googleapis.com/auth/cloud-platform";

pub const ENV_PROJECT_ID: &str = "GOOGLE_PROJECT_ID";
pub const ENV_CREDENTIALS_PATH: &str = "GOOGLE_CREDENTIALS_PATH";
pub const ENV_MAPS_ACCESS_TOKEN: &str = "GOOGLE_MAPS_ACCESS_TOKEN";
pub const ENV_PROJECT_REGION: &str = "GOOGLE_PROJECT_REGION";
pub const ENV_MODEL: &str = "CHAT_MODEL";
pub const ENV_SYSTEM_PROMPT: &str = "CHAT_SYSTEM_PROMPT";
pub const ENV_GEOCODE_BASE_URL: &str = "GEOCODE_BASE_URL";
pub const ENV_BIND_ADDR: &str = "BIND_ADDR";
pub const ENV_CORS_ORIGINS: &str = "CORS_ORIGINS";

/// Variables the process refuses to start without
pub const REQUIRED_ENV_VARS: [&str; 4] = [
    ENV_PROJECT_ID,
    ENV_CREDENTIALS_PATH,
    ENV_MAPS_ACCESS_TOKEN,
    ENV_PROJECT_REGION,
];
