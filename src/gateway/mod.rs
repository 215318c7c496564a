pub mod anthropic;
pub mod error;
pub mod query_gateway;
pub mod tools;
pub mod translator;

pub use anthropic::AnthropicTranslator;
pub use error::GatewayError;
pub use query_gateway::{AnalysisResult, PlanText, QueryGateway};
pub use tools::{AnalystTools, SAFETY_REFUSAL, ToolDefinition};
pub use translator::{SqlTranslator, TranslationError, TranslatorProviderId, build_translator};
