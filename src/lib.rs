//! Bootstrap helpers of fabric operator
//!
//! Provides toolset configmap bootstrap, which is run on every reconcile pass,
//! materialization of managed objects from templates, and few cluster queries.

pub mod config;
pub mod defaults;
pub mod kubemodel;
pub mod nodes;
pub mod store;
pub mod template;
pub mod toolset;

pub use config::{Config, ReadErrorPolicy};
pub use defaults::resolve;
pub use kubemodel::GroupVersionKind;
pub use nodes::external_addresses;
pub use store::{ObjectStore, StoreError};
pub use template::{DecodedObject, TemplateError, Templates};
pub use toolset::Toolset;
