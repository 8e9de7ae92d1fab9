//! # Association Registry
//!
//! A static, declarative allow-list of the relationships a listing endpoint
//! may traverse. Filter, search and sort keys can only reach entities that
//! are explicitly declared here; nothing is discovered from schema metadata
//! at runtime, so arbitrary relation traversal is never possible from user
//! input.
//!
//! Cyclic relationship graphs (assets referencing compliance referencing
//! policies referencing assets, …) are expressed as separate descriptors per
//! direction, each with its own bounded `nested` chain. The planner only
//! walks declared chains; it never searches the graph.

use std::collections::HashSet;

use crate::errors::ListError;
use crate::filtering::field_path::PATH_SEPARATOR;

/// Join cardinality of one declared relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    OneToOne,
    OneToMany,
    ManyToMany,
}

impl Cardinality {
    /// Whether joining through this relationship can multiply base-entity
    /// rows, which forces distinct-count semantics.
    #[must_use]
    pub fn multiplies_rows(self) -> bool {
        matches!(self, Self::OneToMany | Self::ManyToMany)
    }
}

/// One declared relationship from a base entity (or a parent association)
/// to a target table.
#[derive(Debug, Clone)]
pub struct Association {
    /// Name used in filter/search/sort keys (`assoc__field`).
    pub name: &'static str,
    /// Table the join targets.
    pub target_table: &'static str,
    /// Alias the joined table is qualified with in generated SQL. Must be
    /// unique across the registry tree.
    pub join_alias: &'static str,
    /// Column on the parent side of the join (base table or parent alias).
    pub local_column: &'static str,
    /// Column on the target table matched against `local_column`.
    pub foreign_column: &'static str,
    /// Target columns projected into the page fetch as `alias__column`
    /// keys. Only honored for to-one joins; projecting a to-many join
    /// would multiply rows and defeat DISTINCT.
    pub projected_columns: &'static [&'static str],
    /// INNER join when true, LEFT join otherwise.
    pub required: bool,
    pub cardinality: Cardinality,
    /// Relationships reachable from this one (`assoc__nested__field`).
    pub nested: Vec<Association>,
}

impl Association {
    /// A new optional one-to-one association aliased by its own name.
    #[must_use]
    pub fn new(
        name: &'static str,
        target_table: &'static str,
        local_column: &'static str,
        foreign_column: &'static str,
    ) -> Self {
        Self {
            name,
            target_table,
            join_alias: name,
            local_column,
            foreign_column,
            projected_columns: &[],
            required: false,
            cardinality: Cardinality::OneToOne,
            nested: Vec::new(),
        }
    }

    #[must_use]
    pub fn alias(mut self, join_alias: &'static str) -> Self {
        self.join_alias = join_alias;
        self
    }

    #[must_use]
    pub fn one_to_many(mut self) -> Self {
        self.cardinality = Cardinality::OneToMany;
        self
    }

    #[must_use]
    pub fn many_to_many(mut self) -> Self {
        self.cardinality = Cardinality::ManyToMany;
        self
    }

    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    #[must_use]
    pub fn project(mut self, columns: &'static [&'static str]) -> Self {
        self.projected_columns = columns;
        self
    }

    #[must_use]
    pub fn nest(mut self, child: Association) -> Self {
        self.nested.push(child);
        self
    }
}

/// The relationship graph one resource type exposes to list queries.
///
/// Built once at service-construction time and never mutated afterwards,
/// so it is safe to share across threads without synchronization.
#[derive(Debug, Clone)]
pub struct AssociationRegistry {
    entries: Vec<Association>,
}

impl AssociationRegistry {
    /// Validates the declared graph and builds the registry.
    ///
    /// # Errors
    ///
    /// Returns [`ListError::Registry`] on empty names or columns, a `__`
    /// inside an association name (it would be unparseable in keys),
    /// duplicate names within one nesting level, or a join alias reused
    /// anywhere in the tree.
    pub fn new(entries: Vec<Association>) -> Result<Self, ListError> {
        let mut aliases = HashSet::new();
        validate_level(&entries, &mut aliases)?;
        Ok(Self { entries })
    }

    /// An empty registry for resources without traversable relationships.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Look up a top-level association by name.
    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<&Association> {
        self.entries.iter().find(|a| a.name == name)
    }

    /// Resolve a chain of association names, outer-to-inner.
    ///
    /// Each segment after the first resolves against the previous
    /// descriptor's `nested` set, so only declared chains are reachable.
    ///
    /// # Errors
    ///
    /// Returns the first segment that does not resolve.
    pub fn resolve_chain<'a>(&'a self, path: &[String]) -> Result<Vec<&'a Association>, String> {
        let mut chain = Vec::with_capacity(path.len());
        let mut current = self.entries.as_slice();
        for segment in path {
            let assoc = current
                .iter()
                .find(|a| a.name == segment.as_str())
                .ok_or_else(|| segment.clone())?;
            current = assoc.nested.as_slice();
            chain.push(assoc);
        }
        Ok(chain)
    }

    pub(crate) fn entries(&self) -> &[Association] {
        &self.entries
    }
}

fn validate_level(
    level: &[Association],
    aliases: &mut HashSet<&'static str>,
) -> Result<(), ListError> {
    let mut names = HashSet::new();
    for assoc in level {
        if assoc.name.is_empty() {
            return Err(ListError::registry("association with empty name"));
        }
        if assoc.name.contains(PATH_SEPARATOR) {
            return Err(ListError::registry(format!(
                "association name `{}` contains `{PATH_SEPARATOR}`",
                assoc.name
            )));
        }
        if assoc.target_table.is_empty()
            || assoc.join_alias.is_empty()
            || assoc.local_column.is_empty()
            || assoc.foreign_column.is_empty()
        {
            return Err(ListError::registry(format!(
                "association `{}` has an empty table, alias or column",
                assoc.name
            )));
        }
        if !names.insert(assoc.name) {
            return Err(ListError::registry(format!(
                "duplicate association name `{}`",
                assoc.name
            )));
        }
        if !aliases.insert(assoc.join_alias) {
            return Err(ListError::registry(format!(
                "join alias `{}` is used more than once",
                assoc.join_alias
            )));
        }
        validate_level(&assoc.nested, aliases)?;
    }
    Ok(())
}
