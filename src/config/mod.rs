pub mod configs;
pub mod defaults;
pub mod envconfig;
pub mod validate;

pub use configs::{
    AppConfig, DatabaseConfig, GeneratorConfig, LoggingConfig, TranslatorConfig, UsageProfile,
    UsageRange,
};
pub use envconfig::EnvConfig;
