//! Storage-facing layer
//!
//! - `query` - typed grouped-reduction query builder
//! - `traits` - collaborator traits for the indexing store and the address
//!   directory
//! - `types` - raw record and aggregate result types
//! - `memory` - in-memory backend (reference semantics, test fixture)
//! - `error` - unified store error

pub mod error;
pub mod memory;
pub mod query;
pub mod traits;
pub mod types;

pub use error::StoreError;
pub use query::{
    Field, GroupKey, GroupedQuery, Predicate, QueryError, Reducer, ReducerKind, RefField,
    ReferenceCountQuery, ValueExpr,
};
pub use traits::{AddressDirectory, Collection, LedgerStore, Source};
