use std::path::Path;

use ::config as config_rs;
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;

/// Typed settings read from `APP_*` variables, optionally seeded from a `.env` file.
///
/// Sections nest with `__`: `APP_GENERATOR__CHURN_FRACTION=0.3` sets
/// `generator.churn_fraction`, `APP_TRANSLATOR__API_KEY=...` enables the translator.
/// A usage profile is replaced as a whole, so all of its ranges must be given together.
pub trait EnvConfig: Sized + DeserializeOwned {
    const PREFIX: &'static str = "APP";
    const SEPARATOR: &'static str = "__";

    /// A `.env` next to the manifest wins over one in the working directory.
    fn load_dotenv() {
        let manifest_env = Path::new(env!("CARGO_MANIFEST_DIR")).join(".env");
        if dotenvy::from_filename(&manifest_env).is_err() {
            let _ = dotenvy::dotenv();
        }
    }

    fn environment() -> config_rs::Environment {
        config_rs::Environment::with_prefix(Self::PREFIX)
            .prefix_separator("_")
            .separator(Self::SEPARATOR)
            .try_parsing(true)
    }

    fn validate(&self) -> Result<()> {
        Ok(())
    }

    fn from_env() -> Result<Self> {
        Self::load_dotenv();

        let cfg = config_rs::Config::builder()
            .add_source(Self::environment())
            .build()
            .and_then(|settings| settings.try_deserialize::<Self>())
            .with_context(|| format!("failed to load {}_* settings", Self::PREFIX))?;

        cfg.validate()?;
        Ok(cfg)
    }
}
