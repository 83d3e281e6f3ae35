pub mod config;
pub mod context;
pub mod error;
pub mod model;
pub mod normalize;
pub mod parse;
pub mod query;
pub mod request;
pub mod search;

pub use context::{ContextError, SpecContext};
pub use error::{LookupError, NormalizeError, ParseError, ResolveError, UsageError};
pub use model::{HttpMethod, NormalizedEndpoint, NormalizedSchema, ParsedApiSpec};
pub use normalize::{normalize, normalize_spec, normalize_str};
pub use parse::parse_document;
