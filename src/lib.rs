pub mod errors;
pub mod filtering;
pub mod models;
pub mod query;
pub mod registry;

pub use errors::ListError;
pub use filtering::field_path::{FieldPath, parse_field_path};
pub use models::{ListParams, ListResult, PageRequest, PaginationInfo};
pub use query::ListQuery;
pub use registry::{Association, AssociationRegistry, Cardinality};
