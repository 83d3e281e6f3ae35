pub mod cache;
pub mod error;
pub mod executor;
pub mod loader;

pub use cache::{CacheStats, SpecCache};
pub use error::{ExecuteError, LoadError};
pub use executor::{
    ExecutionResponse, ExecutorConfig, ExecutorState, PreparedRequest, RequestExecutor,
    RequestParams, ResponseData, SecurityConfig,
};
pub use loader::{LoadConfig, LoadState, ReqwestFetcher, SpecFetcher, SpecInput, SpecLoader};
