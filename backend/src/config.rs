//! Service configuration.
//!
//! Sources, lowest precedence first:
//! 1. hardcoded defaults (`Settings::default`)
//! 2. `./surat.toml` if present
//! 3. `SURAT_*` environment variables (`SURAT_PORT=9090`, `SURAT_FONTS_DIR=/usr/share/fonts/liberation`)

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

const CONFIG_FILE: &str = "surat.toml";
const ENV_PREFIX: &str = "SURAT_";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    /// Directory holding `<font_family>-Regular.ttf` and optional style variants.
    pub fonts_dir: PathBuf,
    pub font_family: String,
    /// Endpoint receiving generated letters.
    pub submit_url: String,
    /// Used when the operator request carries no bearer credential.
    pub bearer_token: Option<String>,
    /// Where `download_to_dir` writes artifacts.
    pub download_dir: PathBuf,
    pub json_limit_bytes: usize,
    pub upload_limit_bytes: usize,
    /// Sessions untouched for this long are closed.
    pub session_idle_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            fonts_dir: PathBuf::from("./fonts"),
            font_family: "LiberationSans".to_string(),
            submit_url: "http://127.0.0.1:5000/api/surat-keluar/".to_string(),
            bearer_token: None,
            download_dir: PathBuf::from("./pdfs"),
            json_limit_bytes: 10 * 1024 * 1024,
            upload_limit_bytes: 5 * 1024 * 1024,
            session_idle_secs: 60 * 60,
        }
    }
}

impl Settings {
    pub fn load() -> Result<Self, figment::Error> {
        Self::figment().extract()
    }

    fn figment() -> Figment {
        Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file(CONFIG_FILE))
            .merge(Env::prefixed(ENV_PREFIX))
    }

    pub fn bind_address(&self) -> (String, u16) {
        (self.host.clone(), self.port)
    }

    pub fn session_idle(&self) -> Duration {
        Duration::from_secs(self.session_idle_secs)
    }
}
