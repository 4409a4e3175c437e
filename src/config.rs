/// Centralized configuration constants for wifiguard

// Timing
pub const CONNECT_POLL_ATTEMPTS: u32 = 10;
pub const CONNECT_POLL_INTERVAL_SECS: u64 = 1;
pub const DEFAULT_MONITOR_INTERVAL_SECS: u64 = 1800;
pub const NOTIFY_TIMEOUT_MS: u32 = 1300;

// Persisted state
pub const CONFIG_DIR_NAME: &str = "wifiguard";
pub const PROFILE_FILE_NAME: &str = "wifi_profiles.json";
pub const SETTINGS_FILE_NAME: &str = "user_settings.json";

/// Reserved key in the profile file that names the default network.
pub const DEFAULT_KEY: &str = "default";

pub const APP_NAME: &str = "wifiguard";
