//! Default configuration values
//!
//! Named constants for all tunable parameters

/// Default server host
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default server port
pub const DEFAULT_PORT: u16 = 7878;

/// Default generative model
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

/// Sampling temperature for extraction calls (kept low for literal output)
pub const DEFAULT_TEMPERATURE: f32 = 0.1;

/// Output token cap for extraction calls
pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 2048;

/// Pause between consecutive search queries, in milliseconds
pub const DEFAULT_QUERY_INTERVAL_MS: u64 = 1000;

/// The one environment variable that supplies the generative API key
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Config file name
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Application directory name (for XDG paths)
pub const APP_DIR_NAME: &str = "training-mapper";
