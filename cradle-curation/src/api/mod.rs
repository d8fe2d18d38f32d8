//! API handlers for cradle-curation

pub mod catalog;
pub mod content;
pub mod coverage;
pub mod health;
pub mod linking;
pub mod mappings;

pub use catalog::catalog_routes;
pub use content::content_routes;
pub use coverage::coverage_routes;
pub use health::health_routes;
pub use linking::linking_routes;
pub use mappings::mapping_routes;
