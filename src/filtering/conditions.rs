use sea_orm::{
    Condition, Value as DbValue,
    sea_query::{Alias, Expr, ExprTrait, Func, LikeExpr, SimpleExpr},
};
use serde_json::{Map, Value};

use crate::errors::ListError;
use crate::filtering::field_path::parse_field_path;
use crate::registry::AssociationRegistry;

/// Comparison applied by one filter clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    /// Exact equality (IS NULL for null values, IN for arrays).
    Eq,
    /// Case-insensitive substring match.
    ILike,
}

/// One compiled clause of the predicate conjunction.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterClause {
    /// Table the column is qualified with: the base table for plain keys,
    /// the chain's terminal join alias for nested ones.
    pub table_alias: String,
    pub column: String,
    pub op: CompareOp,
    /// The raw value; strings are trimmed at compile time.
    pub value: Value,
}

/// Output of predicate compilation.
#[derive(Debug, Default)]
pub struct CompiledPredicates {
    /// Clauses in stable key order; combined with AND.
    pub clauses: Vec<FilterClause>,
    /// One message per dropped clause.
    pub warnings: Vec<String>,
}

/// Compile exact filters and search filters into a flat conjunction.
///
/// Malformed keys and unsupported value types drop only their own clause
/// and leave a warning. Blank search values never become a clause at all —
/// an accidental `LIKE '%%'` would match everything.
///
/// # Errors
///
/// [`ListError::UnknownAssociation`] when a key references an undeclared
/// association chain.
pub fn compile_predicates(
    registry: &AssociationRegistry,
    base_table: &str,
    filters: &Map<String, Value>,
    search: &Map<String, Value>,
) -> Result<CompiledPredicates, ListError> {
    let mut compiled = CompiledPredicates::default();

    for (key, value) in filters {
        compile_entry(registry, base_table, key, value, false, &mut compiled)?;
    }
    for (key, value) in search {
        compile_entry(registry, base_table, key, value, true, &mut compiled)?;
    }

    Ok(compiled)
}

fn compile_entry(
    registry: &AssociationRegistry,
    base_table: &str,
    key: &str,
    value: &Value,
    force_search: bool,
    compiled: &mut CompiledPredicates,
) -> Result<(), ListError> {
    let parsed = match parse_field_path(key) {
        Ok(parsed) => parsed,
        Err(err) => {
            compiled.warn(format!("ignored filter `{key}`: {err}"));
            return Ok(());
        }
    };

    let table_alias = if parsed.is_nested() {
        match registry.resolve_chain(&parsed.path) {
            Ok(chain) => chain.last().map_or(base_table, |a| a.join_alias),
            Err(name) => {
                return Err(ListError::UnknownAssociation {
                    key: key.to_string(),
                    name,
                });
            }
        }
    } else {
        base_table
    };

    if force_search || parsed.is_search {
        let Some(text) = value.as_str() else {
            compiled.warn(format!("ignored search `{key}`: value is not a string"));
            return Ok(());
        };
        let trimmed = text.trim();
        if trimmed.is_empty() {
            // never compile an empty LIKE pattern
            tracing::debug!(key, "discarding blank search value");
            return Ok(());
        }
        compiled.clauses.push(FilterClause {
            table_alias: table_alias.to_string(),
            column: parsed.field,
            op: CompareOp::ILike,
            value: Value::String(trimmed.to_string()),
        });
        return Ok(());
    }

    let value = match value {
        Value::String(s) => Value::String(s.trim().to_string()),
        Value::Object(_) => {
            compiled.warn(format!("ignored filter `{key}`: unsupported object value"));
            return Ok(());
        }
        other => other.clone(),
    };
    compiled.clauses.push(FilterClause {
        table_alias: table_alias.to_string(),
        column: parsed.field,
        op: CompareOp::Eq,
        value,
    });
    Ok(())
}

impl CompiledPredicates {
    fn warn(&mut self, message: String) {
        tracing::warn!("{message}");
        self.warnings.push(message);
    }
}

/// Combine compiled clauses into a Sea-ORM condition tree (flat AND).
#[must_use]
pub fn build_condition(clauses: &[FilterClause]) -> Condition {
    let mut condition = Condition::all();
    for clause in clauses {
        if let Some(expr) = clause_expr(clause) {
            condition = condition.add(expr);
        }
    }
    condition
}

/// Escape LIKE wildcards so user input only ever matches literally.
fn escape_like_wildcards(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

fn clause_expr(clause: &FilterClause) -> Option<SimpleExpr> {
    let column = Expr::col((
        Alias::new(&clause.table_alias),
        Alias::new(&clause.column),
    ));
    match clause.op {
        CompareOp::ILike => {
            let text = clause.value.as_str()?;
            let pattern = format!("%{}%", escape_like_wildcards(text).to_uppercase());
            Some(
                SimpleExpr::FunctionCall(Func::upper(column))
                    .like(LikeExpr::new(pattern).escape('\\')),
            )
        }
        CompareOp::Eq => match &clause.value {
            Value::String(s) => Some(column.eq(s.as_str())),
            Value::Number(n) => {
                if let Some(int_value) = n.as_i64() {
                    Some(column.eq(int_value))
                } else {
                    n.as_f64().map(|float_value| column.eq(float_value))
                }
            }
            Value::Bool(b) => Some(column.eq(*b)),
            Value::Null => Some(column.is_null()),
            Value::Array(items) => {
                let values: Vec<DbValue> = items
                    .iter()
                    .filter_map(|item| match item {
                        Value::String(s) => Some(DbValue::from(s.as_str())),
                        Value::Number(n) => n
                            .as_i64()
                            .map(DbValue::from)
                            .or_else(|| n.as_f64().map(DbValue::from)),
                        Value::Bool(b) => Some(DbValue::from(*b)),
                        _ => None,
                    })
                    .collect();
                if values.is_empty() {
                    None
                } else {
                    Some(column.is_in(values))
                }
            }
            Value::Object(_) => None,
        },
    }
}
