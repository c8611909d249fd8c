pub mod auth;
pub mod memory;
pub mod sanitizer;
pub mod seed;

pub use auth::MemoryAuth;
pub use memory::MemoryCatalog;
pub use sanitizer::AmmoniaSanitizer;
pub use seed::CatalogSeed;
