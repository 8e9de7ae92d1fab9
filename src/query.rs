//! # List Query Facade
//!
//! One [`ListQuery`] is built per resource type at service-construction
//! time, closing over that resource's association registry, mandatory
//! joins and page-size cap. Each [`ListQuery::list`] call is stateless:
//! it recompiles joins, predicates and order from the request, runs a
//! count query and a page fetch, and returns plain JSON rows. Safe to
//! share across tasks; the registry is read-only after construction.

use sea_orm::{
    Condition, ConnectionTrait, DatabaseConnection, FromQueryResult, JsonValue, Statement,
    sea_query::{Alias, Asterisk, Expr, ExprTrait, Func, JoinType, Query, SelectStatement},
};

use crate::errors::ListError;
use crate::filtering::conditions::{build_condition, compile_predicates};
use crate::filtering::field_path::parse_field_path;
use crate::filtering::joins::{JoinPlan, plan_joins};
use crate::filtering::pagination::{DEFAULT_MAX_PAGE_SIZE, PageWindow, plan_pagination};
use crate::filtering::sort::{OrderTerm, compile_order};
use crate::models::{ListParams, ListResult};
use crate::registry::AssociationRegistry;

/// Compiles and executes list queries for one resource type.
pub struct ListQuery {
    base_table: &'static str,
    id_column: &'static str,
    created_at_column: &'static str,
    registry: AssociationRegistry,
    mandatory_joins: Vec<&'static str>,
    max_page_size: u64,
}

impl ListQuery {
    /// A facade over `base_table` with the given relationship allow-list.
    ///
    /// Defaults: id column `id`, creation timestamp column `created_at`,
    /// no mandatory joins, page size capped at
    /// [`DEFAULT_MAX_PAGE_SIZE`](crate::filtering::pagination::DEFAULT_MAX_PAGE_SIZE).
    #[must_use]
    pub fn new(base_table: &'static str, registry: AssociationRegistry) -> Self {
        Self {
            base_table,
            id_column: "id",
            created_at_column: "created_at",
            registry,
            mandatory_joins: Vec::new(),
            max_page_size: DEFAULT_MAX_PAGE_SIZE,
        }
    }

    #[must_use]
    pub fn with_id_column(mut self, id_column: &'static str) -> Self {
        self.id_column = id_column;
        self
    }

    #[must_use]
    pub fn with_created_at_column(mut self, created_at_column: &'static str) -> Self {
        self.created_at_column = created_at_column;
        self
    }

    /// Associations joined on every request regardless of filters, e.g.
    /// tenant context.
    #[must_use]
    pub fn with_mandatory_joins(mut self, names: &[&'static str]) -> Self {
        self.mandatory_joins = names.to_vec();
        self
    }

    #[must_use]
    pub fn with_max_page_size(mut self, max_page_size: u64) -> Self {
        self.max_page_size = max_page_size;
        self
    }

    /// Run one list request: count matching base entities, then fetch the
    /// requested page.
    ///
    /// The count uses `COUNT(DISTINCT id)` whenever a planned join can
    /// multiply rows, so totals never inflate under to-many joins. Items
    /// come back as plain JSON objects keyed by column name; to-one joins
    /// additionally project their declared columns as `alias__column`.
    ///
    /// # Errors
    ///
    /// [`ListError::UnknownAssociation`] for keys referencing undeclared
    /// relationships, [`ListError::Registry`] for facade misconfiguration,
    /// [`ListError::Store`] when the underlying queries fail.
    pub async fn list(
        &self,
        db: &DatabaseConnection,
        params: &ListParams,
    ) -> Result<ListResult, ListError> {
        let mut warnings = Vec::new();

        let referenced = self.referenced_chains(params);
        let plan = plan_joins(
            &self.registry,
            self.base_table,
            &referenced,
            &self.mandatory_joins,
        )?;

        let predicates =
            compile_predicates(&self.registry, self.base_table, &params.filters, &params.search)?;
        warnings.extend(predicates.warnings);

        let order = compile_order(
            &self.registry,
            self.base_table,
            self.id_column,
            self.created_at_column,
            &params.sort,
        )?;
        warnings.extend(order.warnings);

        let condition = build_condition(&predicates.clauses);

        let total = self
            .fetch_total(db, self.build_count(&plan, condition.clone()))
            .await?;
        let window = plan_pagination(&params.pagination, self.max_page_size, total);

        let select = self.build_select(&plan, condition, &order.terms, &window);
        let stmt = db.get_database_backend().build(&select);
        tracing::debug!(sql = %stmt, "list page fetch");
        let items = JsonValue::find_by_statement(stmt).all(db).await?;

        Ok(ListResult {
            items,
            pagination: window.info,
            warnings,
        })
    }

    /// Association chains referenced by filter/search/sort keys, in
    /// first-seen order. Malformed keys are skipped here; the predicate
    /// and order compilers own their warnings.
    fn referenced_chains(&self, params: &ListParams) -> Vec<(String, Vec<String>)> {
        let filter_keys = params.filters.keys().chain(params.search.keys());
        let sort_keys = params.sort.iter().map(|(key, _)| key);
        filter_keys
            .chain(sort_keys)
            .filter_map(|key| {
                let parsed = parse_field_path(key).ok()?;
                parsed.is_nested().then(|| (key.clone(), parsed.path))
            })
            .collect()
    }

    fn apply_joins(&self, query: &mut SelectStatement, plan: &JoinPlan<'_>) {
        for join in &plan.joins {
            let join_type = if join.assoc.required {
                JoinType::InnerJoin
            } else {
                JoinType::LeftJoin
            };
            let on_condition = Expr::col((
                Alias::new(join.parent_alias),
                Alias::new(join.assoc.local_column),
            ))
            .equals((
                Alias::new(join.assoc.join_alias),
                Alias::new(join.assoc.foreign_column),
            ));
            query.join_as(
                join_type,
                Alias::new(join.assoc.target_table),
                Alias::new(join.assoc.join_alias),
                on_condition,
            );
        }
    }

    fn build_count(&self, plan: &JoinPlan<'_>, condition: Condition) -> SelectStatement {
        let mut query = Query::select();
        let id_column = Expr::col((Alias::new(self.base_table), Alias::new(self.id_column)));
        if plan.distinct_required {
            query.expr(Func::count_distinct(id_column));
        } else {
            query.expr(Func::count(id_column));
        }
        query.from(Alias::new(self.base_table));
        self.apply_joins(&mut query, plan);
        query.cond_where(condition);
        query
    }

    fn build_select(
        &self,
        plan: &JoinPlan<'_>,
        condition: Condition,
        order: &[OrderTerm],
        window: &PageWindow,
    ) -> SelectStatement {
        let mut query = Query::select();
        query.column((Alias::new(self.base_table), Asterisk));

        // to-one joins project their declared columns; to-many joins never
        // do, so DISTINCT keeps one row per base entity
        for join in &plan.joins {
            if join.assoc.cardinality.multiplies_rows() {
                continue;
            }
            for column in join.assoc.projected_columns {
                query.expr_as(
                    Expr::col((Alias::new(join.assoc.join_alias), Alias::new(*column))),
                    Alias::new(format!("{}__{column}", join.assoc.join_alias)),
                );
            }
        }

        query.from(Alias::new(self.base_table));
        self.apply_joins(&mut query, plan);
        query.cond_where(condition);

        if plan.distinct_required {
            query.distinct();
        }

        for (index, term) in order.iter().enumerate() {
            if plan.distinct_required && term.table_alias != self.base_table {
                // SELECT DISTINCT requires ORDER BY expressions in the list
                query.expr_as(
                    Expr::col((Alias::new(&term.table_alias), Alias::new(&term.column))),
                    Alias::new(format!("__sort_{index}")),
                );
            }
            query.order_by(
                (Alias::new(&term.table_alias), Alias::new(&term.column)),
                term.direction.clone(),
            );
        }

        if let Some(limit) = window.limit {
            query.limit(limit).offset(window.offset);
        }

        query
    }

    async fn fetch_total(
        &self,
        db: &DatabaseConnection,
        count: SelectStatement,
    ) -> Result<u64, ListError> {
        let stmt: Statement = db.get_database_backend().build(&count);
        tracing::debug!(sql = %stmt, "list count");
        let total = match db.query_one(stmt).await? {
            Some(row) => row.try_get_by::<i64, _>(0)?,
            None => 0,
        };
        Ok(u64::try_from(total).unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PageRequest;
    use crate::registry::{Association, AssociationRegistry};
    use sea_orm::sea_query::PostgresQueryBuilder;
    use serde_json::json;

    fn asset_query() -> ListQuery {
        let registry = AssociationRegistry::new(vec![
            Association::new("tenant", "tenant", "tenant_id", "id").project(&["name"]),
            Association::new("asset_tags", "asset_tag", "id", "asset_id").one_to_many(),
        ])
        .unwrap();
        ListQuery::new("asset", registry).with_mandatory_joins(&["tenant"])
    }

    fn params(value: serde_json::Value) -> ListParams {
        serde_json::from_value(value).unwrap()
    }

    fn build_sql(query: &ListQuery, params: &ListParams) -> (String, String) {
        let referenced = query.referenced_chains(params);
        let plan = plan_joins(
            &query.registry,
            query.base_table,
            &referenced,
            &query.mandatory_joins,
        )
        .unwrap();
        let predicates = compile_predicates(
            &query.registry,
            query.base_table,
            &params.filters,
            &params.search,
        )
        .unwrap();
        let order = compile_order(
            &query.registry,
            query.base_table,
            query.id_column,
            query.created_at_column,
            &params.sort,
        )
        .unwrap();
        let condition = build_condition(&predicates.clauses);
        let count = query
            .build_count(&plan, condition.clone())
            .to_string(PostgresQueryBuilder);
        let window = plan_pagination(&params.pagination, query.max_page_size, 0);
        let select = query
            .build_select(&plan, condition, &order.terms, &window)
            .to_string(PostgresQueryBuilder);
        (count, select)
    }

    #[test]
    fn plain_count_without_to_many_joins() {
        let query = asset_query();
        let (count, _) = build_sql(&query, &params(json!({"filters": {"name": "web"}})));
        assert!(count.contains(r#"COUNT("asset"."id")"#), "{count}");
        assert!(!count.contains("DISTINCT"), "{count}");
    }

    #[test]
    fn to_many_join_switches_to_distinct_count() {
        let query = asset_query();
        let (count, select) = build_sql(
            &query,
            &params(json!({"filters": {"asset_tags__tag_value": "prod"}})),
        );
        assert!(count.contains(r#"COUNT(DISTINCT "asset"."id")"#), "{count}");
        assert!(select.contains("SELECT DISTINCT"), "{select}");
    }

    #[test]
    fn filter_and_sort_share_one_join() {
        let query = asset_query();
        let (_, select) = build_sql(
            &query,
            &params(json!({
                "filters": {"asset_tags__tag_value": "prod"},
                "sort": [["asset_tags__tag_value", "ASC"]]
            })),
        );
        let occurrences = select.matches(r#"LEFT JOIN "asset_tag""#).count();
        assert_eq!(occurrences, 1, "{select}");
    }

    #[test]
    fn nested_predicate_is_join_qualified() {
        let query = asset_query();
        let (count, select) = build_sql(
            &query,
            &params(json!({"filters": {"asset_tags__tag_value": "prod"}})),
        );
        for sql in [&count, &select] {
            assert!(
                sql.contains(r#""asset_tags"."tag_value" = 'prod'"#),
                "{sql}"
            );
        }
    }

    #[test]
    fn mandatory_join_present_without_any_filter() {
        let query = asset_query();
        let (count, select) = build_sql(&query, &ListParams::default());
        for sql in [&count, &select] {
            assert!(
                sql.contains(r#"LEFT JOIN "tenant" AS "tenant""#),
                "{sql}"
            );
        }
    }

    #[test]
    fn to_one_projection_appears_in_select() {
        let query = asset_query();
        let (_, select) = build_sql(&query, &ListParams::default());
        assert!(
            select.contains(r#""tenant"."name" AS "tenant__name""#),
            "{select}"
        );
    }

    #[test]
    fn default_order_and_page_window() {
        let query = asset_query();
        let list_params = ListParams {
            pagination: PageRequest::page(2, 10),
            ..ListParams::default()
        };
        let (_, select) = build_sql(&query, &list_params);
        assert!(
            select.contains(r#"ORDER BY "asset"."created_at" DESC, "asset"."id" DESC"#),
            "{select}"
        );
        assert!(select.contains("LIMIT 10"), "{select}");
        assert!(select.contains("OFFSET 10"), "{select}");
    }

    #[test]
    fn disabled_pagination_has_no_limit() {
        let query = asset_query();
        let list_params = ListParams {
            pagination: PageRequest::disabled(),
            ..ListParams::default()
        };
        let (_, select) = build_sql(&query, &list_params);
        assert!(!select.contains("LIMIT"), "{select}");
    }

    #[test]
    fn unknown_association_fails_before_any_sql() {
        let query = asset_query();
        let list_params = params(json!({"filters": {"bogus__field": "x"}}));
        let referenced = query.referenced_chains(&list_params);
        let err = plan_joins(
            &query.registry,
            query.base_table,
            &referenced,
            &query.mandatory_joins,
        )
        .unwrap_err();
        assert!(matches!(err, ListError::UnknownAssociation { .. }));
    }
}
