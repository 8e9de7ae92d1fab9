use std::collections::HashSet;

use crate::errors::ListError;
use crate::registry::{Association, AssociationRegistry};

/// One join to attach to the base query.
#[derive(Debug, Clone, Copy)]
pub struct PlannedJoin<'a> {
    /// Alias the ON clause's parent side is qualified with: the base table
    /// for top-level associations, the parent association's alias below.
    pub parent_alias: &'a str,
    pub assoc: &'a Association,
}

/// The minimal, de-duplicated, ordered join set for one request.
#[derive(Debug, Default)]
pub struct JoinPlan<'a> {
    /// Joins in stable first-seen order: mandatory joins first, then
    /// filter/search/sort references in key order. Nested chains appear
    /// parent-before-child.
    pub joins: Vec<PlannedJoin<'a>>,
    /// True when any planned join can multiply base-entity rows, which
    /// forces `COUNT(DISTINCT id)` and a DISTINCT page fetch.
    pub distinct_required: bool,
}

impl<'a> JoinPlan<'a> {
    fn push(&mut self, seen: &mut HashSet<&'a str>, join: PlannedJoin<'a>) {
        if seen.insert(join.assoc.join_alias) {
            self.distinct_required |= join.assoc.cardinality.multiplies_rows();
            self.joins.push(join);
        }
    }
}

/// Plan the join set for the referenced association chains plus the
/// endpoint's mandatory joins.
///
/// The same association referenced by a filter and by a sort directive
/// produces exactly one join; repeated calls with the same input produce
/// the same output.
///
/// # Errors
///
/// [`ListError::Registry`] when a mandatory join name is undeclared or a
/// join alias collides with the base table (both developer
/// misconfigurations), [`ListError::UnknownAssociation`] when a user key
/// references an undeclared chain — the request fails rather than silently
/// dropping the filter.
pub fn plan_joins<'a>(
    registry: &'a AssociationRegistry,
    base_table: &'a str,
    referenced: &[(String, Vec<String>)],
    mandatory: &[&'static str],
) -> Result<JoinPlan<'a>, ListError> {
    let mut plan = JoinPlan::default();
    let mut seen = HashSet::new();

    for name in mandatory {
        let assoc = registry.resolve(name).ok_or_else(|| {
            ListError::registry(format!("mandatory join `{name}` is not declared"))
        })?;
        plan.push(
            &mut seen,
            PlannedJoin {
                parent_alias: base_table,
                assoc,
            },
        );
    }

    for (key, chain) in referenced {
        let mut parent_alias = base_table;
        let mut level = registry.entries();
        for segment in chain {
            let assoc = level
                .iter()
                .find(|a| a.name == segment.as_str())
                .ok_or_else(|| ListError::UnknownAssociation {
                    key: key.clone(),
                    name: segment.clone(),
                })?;
            plan.push(
                &mut seen,
                PlannedJoin {
                    parent_alias,
                    assoc,
                },
            );
            parent_alias = assoc.join_alias;
            level = assoc.nested.as_slice();
        }
    }

    for join in &plan.joins {
        if join.assoc.join_alias == base_table {
            return Err(ListError::registry(format!(
                "join alias `{base_table}` collides with the base table"
            )));
        }
    }

    Ok(plan)
}
