use crate::config::AppConfig;
use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Json, Serialized, Toml},
    Figment,
};
use std::path::Path;

const ENV_PREFIX: &str = "CRASH_";

pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads application configuration by merging defaults, TOML, environment variables, and JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration files cannot be read or parsed.
    pub fn load() -> Result<AppConfig> {
        Self::extract(Self::base().merge(Toml::file("config/Config.toml")))
    }

    /// Loads application configuration from an explicit TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing or cannot be parsed.
    pub fn load_from(path: impl AsRef<Path>) -> Result<AppConfig> {
        let path = path.as_ref();
        if !path.exists() {
            anyhow::bail!("config file not found: {}", path.display());
        }
        tracing::info!(path = %path.display(), "loading configuration");
        Self::extract(Self::base().merge(Toml::file(path)))
    }

    /// Loads application configuration with a specific profile.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration files cannot be read or parsed.
    pub fn load_with_profile(profile: &str) -> Result<AppConfig> {
        Self::extract(
            Self::base()
                .merge(Toml::file("config/Config.toml"))
                .merge(Toml::file(format!("config/Config.{profile}.toml"))),
        )
    }

    fn base() -> Figment {
        Figment::from(Serialized::defaults(AppConfig::default()))
    }

    fn extract(figment: Figment) -> Result<AppConfig> {
        let config: AppConfig = figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .join(Json::file("config/Config.json"))
            .extract()
            .context("failed to load configuration")?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;
    use rust_decimal_macros::dec;

    #[test]
    fn load_without_files_returns_defaults() {
        Jail::expect_with(|_jail| {
            let config = ConfigLoader::load().map_err(|e| e.to_string())?;
            assert_eq!(config, AppConfig::default());
            Ok(())
        });
    }

    #[test]
    fn toml_file_overrides_defaults() {
        Jail::expect_with(|jail| {
            jail.create_dir("config")?;
            jail.create_file(
                "config/Config.toml",
                r#"
                [pipeline]
                history_capacity = 50

                [simulation]
                stake = "0.05"
                "#,
            )?;
            let config = ConfigLoader::load().map_err(|e| e.to_string())?;
            assert_eq!(config.pipeline.history_capacity, 50);
            assert_eq!(config.pipeline.queue_capacity, 256);
            assert_eq!(config.simulation.stake, dec!(0.05));
            Ok(())
        });
    }

    #[test]
    fn env_overrides_toml() {
        Jail::expect_with(|jail| {
            jail.create_dir("config")?;
            jail.create_file("config/Config.toml", "[server]\nport = 9000\n")?;
            jail.set_env("CRASH_SERVER__PORT", "9100");
            let config = ConfigLoader::load().map_err(|e| e.to_string())?;
            assert_eq!(config.server.port, 9100);
            Ok(())
        });
    }

    #[test]
    fn profile_file_layers_over_base() {
        Jail::expect_with(|jail| {
            jail.create_dir("config")?;
            jail.create_file("config/Config.toml", "[storage]\nretention = 2000\n")?;
            jail.create_file("config/Config.dev.toml", "[storage]\nwarm_start = 20\n")?;
            let config = ConfigLoader::load_with_profile("dev").map_err(|e| e.to_string())?;
            assert_eq!(config.storage.retention, 2000);
            assert_eq!(config.storage.warm_start, 20);
            Ok(())
        });
    }

    #[test]
    fn load_from_missing_file_fails() {
        Jail::expect_with(|_jail| {
            assert!(ConfigLoader::load_from("nope.toml").is_err());
            Ok(())
        });
    }
}
