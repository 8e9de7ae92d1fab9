use sea_orm::sea_query::Order;

use crate::errors::ListError;
use crate::filtering::field_path::parse_field_path;
use crate::registry::AssociationRegistry;

/// One compiled ORDER BY term.
#[derive(Debug, Clone)]
pub struct OrderTerm {
    /// Table the column is qualified with (base table or join alias).
    pub table_alias: String,
    pub column: String,
    pub direction: Order,
}

/// Output of sort compilation.
#[derive(Debug, Default)]
pub struct CompiledOrder {
    pub terms: Vec<OrderTerm>,
    /// One message per skipped directive.
    pub warnings: Vec<String>,
}

/// Normalize a direction token: `"ASC"` (any case) or `"1"` is ascending,
/// anything else descending.
#[must_use]
pub fn parse_direction(token: &str) -> Order {
    let token = token.trim();
    if token.eq_ignore_ascii_case("ASC") || token == "1" {
        Order::Asc
    } else {
        Order::Desc
    }
}

/// Compile sort directives into qualified order terms.
///
/// When no usable directive is supplied, the result is the stable default
/// `created_at DESC, id DESC` on the base entity — without a deterministic
/// order, page boundaries drift between requests.
///
/// # Errors
///
/// [`ListError::UnknownAssociation`] when a sort key references an
/// undeclared association chain — same policy as predicate compilation, so
/// a dropped join can never leave a dangling order term.
pub fn compile_order(
    registry: &AssociationRegistry,
    base_table: &str,
    id_column: &str,
    created_at_column: &str,
    sort: &[(String, String)],
) -> Result<CompiledOrder, ListError> {
    let mut compiled = CompiledOrder::default();

    for (key, direction) in sort {
        let parsed = match parse_field_path(key) {
            Ok(parsed) => parsed,
            Err(err) => {
                compiled.warn(format!("ignored sort `{key}`: {err}"));
                continue;
            }
        };
        if parsed.is_search {
            compiled.warn(format!("ignored sort `{key}`: `_search` cannot be sorted"));
            continue;
        }

        let table_alias = if parsed.is_nested() {
            match registry.resolve_chain(&parsed.path) {
                Ok(chain) => chain.last().map_or(base_table, |a| a.join_alias),
                Err(name) => {
                    return Err(ListError::UnknownAssociation {
                        key: key.clone(),
                        name,
                    });
                }
            }
        } else {
            base_table
        };

        compiled.terms.push(OrderTerm {
            table_alias: table_alias.to_string(),
            column: parsed.field,
            direction: parse_direction(direction),
        });
    }

    if compiled.terms.is_empty() {
        compiled.terms.push(OrderTerm {
            table_alias: base_table.to_string(),
            column: created_at_column.to_string(),
            direction: Order::Desc,
        });
        compiled.terms.push(OrderTerm {
            table_alias: base_table.to_string(),
            column: id_column.to_string(),
            direction: Order::Desc,
        });
    }

    Ok(compiled)
}

impl CompiledOrder {
    fn warn(&mut self, message: String) {
        tracing::warn!("{message}");
        self.warnings.push(message);
    }
}
