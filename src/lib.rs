//! # declared-query
//!
//! Parses declared query templates (JPQL or native SQL) into a canonical query text plus an
//! ordered table of parameter bindings, and derives the matching count query for paging.
//!
//! ## Features
//!
//! - **Every Marker Style**: `?`, `?1`, `:name`, `?#{expr}`, `:#{expr}` and `:${expr}`
//! - **Literal Safety**: markers inside `'...'` or `"..."` are left untouched
//! - **Wildcards at Bind Time**: `%:name%` is emitted as `:name` and the binding records
//!   [`WildcardMode::Contains`], so the value is wrapped when it is bound
//! - **Binding Reuse**: repeated markers with the same treatment share one placeholder;
//!   a parameter used with different wildcards or inside `IN (...)` gets its own name
//! - **Count Queries**: `select count(...)` forms that keep every source origin
//! - **Parse Cache**: a concurrent [`QueryCache`] for repeatedly declared queries
//!
//! ## Quick Start
//!
//! Add to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! declared-query = "0.1"
//! ```
//!
//! ## Examples
//!
//! ### Parsing a Query
//!
//! ```rust
//! use declared_query::{BindingIdentifier, DeclaredQuery, WildcardMode};
//!
//! let query = DeclaredQuery::jpql(
//!     "select u from User u where u.lastname like %:name% or u.firstname = :name",
//! )
//! .parse()?;
//!
//! assert_eq!(
//!     query.query_text(),
//!     "select u from User u where u.lastname like :name or u.firstname = :name_1"
//! );
//!
//! let bindings = query.bindings();
//! assert_eq!(bindings.len(), 2);
//! assert_eq!(bindings[0].wildcard(), WildcardMode::Contains);
//! assert_eq!(bindings[1].identifier(), &BindingIdentifier::named("name_1"));
//! assert_eq!(bindings[0].prepare("smith"), "%smith%");
//! # Ok::<(), declared_query::Error>(())
//! ```
//!
//! ### Dynamic Expressions
//!
//! ```rust
//! use declared_query::DeclaredQuery;
//!
//! let query = DeclaredQuery::jpql("select u from User u where u.tenant = ?#{#tenant.id}")
//!     .parse()?;
//!
//! assert_eq!(query.query_text(), "select u from User u where u.tenant = ?1");
//! assert_eq!(query.bindings()[0].expression(), Some("#tenant.id"));
//! # Ok::<(), declared_query::Error>(())
//! ```
//!
//! ### Count Queries
//!
//! ```rust
//! use declared_query::{CountProjection, DeclaredQuery};
//!
//! let query = DeclaredQuery::jpql(
//!     "select distinct m.genre from Media m where m.user = ?1 order by m.genre asc",
//! )
//! .parse()?;
//! let count = query.derive_count_query(&CountProjection::Derived)?;
//!
//! assert_eq!(
//!     count.query_text(),
//!     "select count(distinct m.genre) from Media m where m.user = ?1"
//! );
//! # Ok::<(), declared_query::Error>(())
//! ```
//!
//! ## How It Works
//!
//! 1. **Scan**: walk the text once, tracking quotes, and classify every candidate marker
//! 2. **Decorate**: fold adjacent `%` into each marker and detect `IN` operands
//! 3. **Register**: fold the occurrences into bindings, reusing or renaming as needed
//! 4. **Rewrite**: replace each marker span with its binding's canonical placeholder
//!
//! Every step is a pure function of the declared text, so a parsed query can be shared
//! freely between threads.
//!
//! ## Limitations
//!
//! - Expressions are recorded as source text; evaluating them is up to the caller
//! - Clause boundaries for count queries are found textually, not by a full grammar
//!
//! ## License
//!
//! Licensed under either of Apache License, Version 2.0 or MIT license at your option.

pub mod binding;
pub mod builder;
pub mod cache;
mod charset;
pub mod count;
pub mod error;
pub mod query;
mod registry;
mod scanner;
mod structure;
mod wildcard;

pub use binding::{BindingIdentifier, ParameterBinding, ParameterOrigin, WildcardMode};
pub use cache::QueryCache;
pub use count::CountProjection;
pub use error::{Error, Result};
pub use query::{BindableQuery, DeclaredQuery};
pub use registry::SYNTHETIC_PREFIX;

/// Convenience re-exports for common use cases
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::{BindableQuery, CountProjection, DeclaredQuery, QueryCache};
}
