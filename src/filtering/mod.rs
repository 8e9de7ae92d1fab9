//! # Filter, Sort & Pagination Compilation
//!
//! Translates the flat key mini-language used by list endpoints into join
//! plans, predicate conditions and order terms.
//!
//! ## Key syntax
//!
//! ```text
//! lifecycle_state=active            exact match on the base entity
//! name_search=web                   case-insensitive substring match
//! tenant__name=acme                 exact match through the `tenant` association
//! asset_tags__tag_value_search=prod substring match through a join
//! compliance__policy__code=PCI      chained associations
//! ```
//!
//! Association segments are separated by `__`; the trailing segment is the
//! column name; a `_search` suffix selects substring matching. Every clause
//! joins the conjunction — there is no OR and no grouping.
//!
//! ## Pipeline
//!
//! [`field_path`] parses keys, [`joins`] plans the minimal join set,
//! [`conditions`] compiles the predicate conjunction, [`sort`] compiles
//! order terms and [`pagination`] does the page arithmetic. The
//! [`crate::query::ListQuery`] facade composes them per request.

pub mod conditions;
pub mod field_path;
pub mod joins;
pub mod pagination;
pub mod sort;

pub use conditions::{CompareOp, CompiledPredicates, FilterClause, build_condition, compile_predicates};
pub use field_path::{FieldPath, parse_field_path};
pub use joins::{JoinPlan, PlannedJoin, plan_joins};
pub use pagination::{DEFAULT_MAX_PAGE_SIZE, DEFAULT_PAGE_SIZE, PageWindow, plan_pagination};
pub use sort::{CompiledOrder, OrderTerm, compile_order, parse_direction};
