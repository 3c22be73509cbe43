//! Token scopes: classification and the provider seam

pub mod category;
mod provider;

pub use category::{classify, effective_scope, Category};
pub use provider::{language_for_scope_suffix, ScanError, ScopeProvider, ScopeToken};
