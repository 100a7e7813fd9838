//! Design-space expansion and case catalog for simulation campaigns.

mod catalog;
mod design;
mod expand;
pub mod freshness;
pub mod loader;

pub use catalog::{CampaignLayout, CaseCatalog, CasePaths, CatalogMeta, Seed, CASENAME, CASE_ID};
pub use design::{render_template, Attributes, DeriveFn, Derivation, DesignSpace};
pub use expand::expand;
pub use freshness::{freshness, Freshness};
pub use loader::{load_design, DesignFile};
