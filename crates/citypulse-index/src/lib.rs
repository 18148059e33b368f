pub mod client;
pub mod documents;
pub mod error;

pub use client::{BulkReport, ElasticClient};
pub use documents::{area_document, category_document, doc_id, parking_document};
pub use error::IndexError;

/// Index receiving enriched parking documents.
pub const PARKING_INDEX: &str = "seoul_parking";
/// Index receiving commercial-area summary documents.
pub const COMMERCIAL_INDEX: &str = "seoul_commercial";
/// Index receiving per-category commercial detail documents.
pub const COMMERCIAL_CATEGORIES_INDEX: &str = "seoul_commercial_categories";
