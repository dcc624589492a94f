//! Icon caching and custom icon mappings.

pub mod cache;
pub mod errors;
pub mod mappings;
pub mod types;

pub use cache::{cache_key, IconCache};
pub use errors::IconError;
pub use mappings::{CustomIconMap, IconMappingFile};
pub use types::{Icon, IconRef, IconSource};
