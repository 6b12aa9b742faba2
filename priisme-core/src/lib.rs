pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod gateway;
pub mod image;
pub mod intake;
pub mod models;
pub mod normalize;
pub mod proxy_client;
pub mod render;
pub mod session;
pub mod store;

pub use auth::{AuthContext, AuthUser};
pub use config::PriismeConfig;
pub use error::PriismeError;
pub use gateway::{GatewayError, GatewaySettings, StyleModelClient};
pub use models::{NewAnalysisRecord, StoredAnalysis, StyleAnalysis};
pub use normalize::{parse_model_reply, strip_code_fences, ReplyParseError};
pub use proxy_client::{AnalysisProxy, HttpAnalysisProxy, ProxyCallError};
pub use render::ResultView;
pub use session::{Notice, StyleSession, SubmitOutcome};
pub use store::{AnalysisStore, MemoryAnalysisStore, PgAnalysisStore};
