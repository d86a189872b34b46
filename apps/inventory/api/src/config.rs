use core_config::{AppInfo, FromEnv, app_info, env_or_default, server::ServerConfig};
use database::mongodb::MongoConfig;
use std::path::PathBuf;

pub use core_config::Environment;

pub const DEFAULT_UPLOAD_DIR: &str = "uploads";

/// Inventory API configuration, composed from the shared config components.
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub mongo: MongoConfig,
    pub server: ServerConfig,
    pub environment: Environment,
    /// Directory product images are written to (`UPLOAD_DIR`)
    pub upload_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let environment = Environment::from_env();
        let mongo = MongoConfig::from_env()?; // Required - will fail if not set
        let server = ServerConfig::from_env()?; // Uses defaults: HOST=0.0.0.0, PORT=8080
        let upload_dir = PathBuf::from(env_or_default("UPLOAD_DIR", DEFAULT_UPLOAD_DIR));

        Ok(Self {
            app: app_info!(),
            mongo,
            server,
            environment,
            upload_dir,
        })
    }
}
