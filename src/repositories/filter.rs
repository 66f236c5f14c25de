//! Filter expression compiler
//!
//! Translates string-keyed filter mappings such as `"name__ilike"` or
//! `"created_at__ge"` into SeaORM predicate clauses. Keys without an
//! operator suffix compare for equality. All clauses of one filter are
//! conjoined; there is no OR form.

use std::fmt;
use std::str::FromStr;

use sea_orm::sea_query::{Expr, Func, SimpleExpr, Value};
use sea_orm::{ColumnTrait, Condition, EntityTrait};

use super::descriptor::RecordDescriptor;
use super::values::render_value;
use crate::error::RepositoryError;

const OPERATOR_SEPARATOR: &str = "__";

/// Comparison applied by one filter entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Contains,
    In,
    NotIn,
    ILike,
    IsNot,
}

impl Operator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Eq => "eq",
            Operator::Ne => "ne",
            Operator::Lt => "lt",
            Operator::Le => "le",
            Operator::Gt => "gt",
            Operator::Ge => "ge",
            Operator::Contains => "contains",
            Operator::In => "in",
            Operator::NotIn => "not_in",
            Operator::ILike => "ilike",
            Operator::IsNot => "is_not",
        }
    }
}

impl FromStr for Operator {
    type Err = RepositoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let operator = match s {
            "eq" => Operator::Eq,
            "ne" => Operator::Ne,
            "lt" => Operator::Lt,
            "le" => Operator::Le,
            "gt" => Operator::Gt,
            "ge" => Operator::Ge,
            "contains" => Operator::Contains,
            "in" => Operator::In,
            "not_in" => Operator::NotIn,
            "ilike" => Operator::ILike,
            "is_not" => Operator::IsNot,
            other => {
                return Err(RepositoryError::UnknownOperator {
                    operator: other.to_string(),
                });
            }
        };
        Ok(operator)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Right-hand side of a filter entry.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    /// SQL `NULL`; `eq`, `ne` and `is_not` compile to `IS [NOT] NULL`.
    Null,
    Scalar(Value),
    /// Operand of `in` / `not_in`.
    List(Vec<Value>),
}

impl fmt::Display for FilterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterValue::Null => f.write_str("NULL"),
            FilterValue::Scalar(value) => f.write_str(&render_value(value)),
            FilterValue::List(values) => {
                let rendered: Vec<String> = values.iter().map(render_value).collect();
                write!(f, "[{}]", rendered.join(", "))
            }
        }
    }
}

/// An ordered filter mapping from field selector to value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filters {
    entries: Vec<(String, FilterValue)>,
}

impl Filters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `selector = value`, e.g. `.with("name__ilike", "temp%")`.
    pub fn with<K, V>(self, selector: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        self.push(selector, FilterValue::Scalar(value.into()))
    }

    /// Adds a list operand, e.g. `.with_list("id__in", ids)`.
    pub fn with_list<K, I, V>(self, selector: K, values: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let values = values.into_iter().map(Into::into).collect();
        self.push(selector, FilterValue::List(values))
    }

    /// Adds a `NULL` operand, e.g. `.with_null("units__is_not")`.
    pub fn with_null<K: Into<String>>(self, selector: K) -> Self {
        self.push(selector, FilterValue::Null)
    }

    pub fn push<K: Into<String>>(mut self, selector: K, value: FilterValue) -> Self {
        self.entries.push((selector.into(), value));
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FilterValue)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Display for Filters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, (selector, value)) in self.entries.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{selector}={value}")?;
        }
        Ok(())
    }
}

/// One compiled predicate over a single field.
#[derive(Debug, Clone)]
pub struct Clause {
    pub field: String,
    pub operator: Operator,
    pub expr: SimpleExpr,
}

/// Splits `"field__op"` on the first separator; a bare field means `eq`.
pub fn parse_selector(selector: &str) -> (&str, Option<&str>) {
    match selector.split_once(OPERATOR_SEPARATOR) {
        Some((field, operator)) => (field, Some(operator)),
        None => (selector, None),
    }
}

/// Compiles every entry of `filters` into a clause, in input order.
///
/// The field is resolved before the operator, so a selector that is wrong on
/// both counts reports `UnknownField`.
pub fn compile<E: EntityTrait>(
    descriptor: &RecordDescriptor<E>,
    filters: &Filters,
) -> Result<Vec<Clause>, RepositoryError> {
    filters
        .iter()
        .map(|(selector, value)| {
            let (field, operator) = parse_selector(selector);
            let column = descriptor.resolve(field)?;
            let operator = match operator {
                Some(name) => name.parse::<Operator>()?,
                None => Operator::Eq,
            };
            let expr = compile_clause::<E>(column, field, operator, value)?;

            Ok(Clause {
                field: field.to_string(),
                operator,
                expr,
            })
        })
        .collect()
}

/// Compiles `filters` and conjoins the clauses into one condition.
pub fn condition<E: EntityTrait>(
    descriptor: &RecordDescriptor<E>,
    filters: &Filters,
) -> Result<Condition, RepositoryError> {
    let clauses = compile(descriptor, filters)?;
    Ok(clauses
        .into_iter()
        .fold(Condition::all(), |condition, clause| condition.add(clause.expr)))
}

fn compile_clause<E: EntityTrait>(
    column: E::Column,
    field: &str,
    operator: Operator,
    value: &FilterValue,
) -> Result<SimpleExpr, RepositoryError> {
    let expr = match (operator, value) {
        (Operator::Eq, FilterValue::Null) => column.is_null(),
        (Operator::Ne | Operator::IsNot, FilterValue::Null) => column.is_not_null(),
        (Operator::Eq, FilterValue::Scalar(v)) if is_null(v) => column.is_null(),
        (Operator::Ne | Operator::IsNot, FilterValue::Scalar(v)) if is_null(v) => {
            column.is_not_null()
        }
        (Operator::Eq, FilterValue::Scalar(v)) => column.eq(v.clone()),
        (Operator::Ne, FilterValue::Scalar(v)) => column.ne(v.clone()),
        (Operator::Lt, FilterValue::Scalar(v)) => column.lt(v.clone()),
        (Operator::Le, FilterValue::Scalar(v)) => column.lte(v.clone()),
        (Operator::Gt, FilterValue::Scalar(v)) => column.gt(v.clone()),
        (Operator::Ge, FilterValue::Scalar(v)) => column.gte(v.clone()),
        (Operator::IsNot, FilterValue::Scalar(v)) => {
            Expr::col((column.entity_name(), column)).is_not(v.clone())
        }
        (Operator::In, FilterValue::List(values)) => column.is_in(values.iter().cloned()),
        (Operator::NotIn, FilterValue::List(values)) => column.is_not_in(values.iter().cloned()),
        (Operator::Contains, FilterValue::Scalar(v)) => {
            let needle = string_operand(field, operator, v)?;
            column.contains(&needle)
        }
        (Operator::ILike, FilterValue::Scalar(v)) => {
            let pattern = string_operand(field, operator, v)?;
            Expr::expr(Func::lower(Expr::col((column.entity_name(), column))))
                .like(pattern.to_lowercase())
        }
        (Operator::In | Operator::NotIn, _) => {
            return Err(invalid_operand(field, operator, "a list of values"));
        }
        (Operator::Contains | Operator::ILike, _) => {
            return Err(invalid_operand(field, operator, "a string"));
        }
        (_, _) => return Err(invalid_operand(field, operator, "a single value")),
    };
    Ok(expr)
}

/// A typed `None`, e.g. `Value::String(None)` from an `Option` field.
fn is_null(value: &Value) -> bool {
    *value == value.as_null()
}

fn string_operand(field: &str, operator: Operator, value: &Value) -> Result<String, RepositoryError> {
    match value {
        Value::String(Some(s)) => Ok(s.to_string()),
        _ => Err(invalid_operand(field, operator, "a string")),
    }
}

fn invalid_operand(field: &str, operator: Operator, expected: &'static str) -> RepositoryError {
    RepositoryError::InvalidOperand {
        field: field.to_string(),
        operator: operator.as_str(),
        expected,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::sensor;
    use sea_orm::{DbBackend, QueryFilter, QueryTrait};

    fn render(filters: &Filters) -> String {
        let condition = condition(&sensor::descriptor(), filters).expect("filters compile");
        sensor::Entity::find()
            .filter(condition)
            .build(DbBackend::Sqlite)
            .to_string()
    }

    #[test]
    fn test_bare_field_means_eq() {
        let clauses = compile(
            &sensor::descriptor(),
            &Filters::new().with("name", "temp1"),
        )
        .unwrap();

        assert_eq!(clauses.len(), 1);
        assert_eq!(clauses[0].field, "name");
        assert_eq!(clauses[0].operator, Operator::Eq);
        assert!(render(&Filters::new().with("name", "temp1")).contains(r#""sensors"."name" = 'temp1'"#));
    }

    #[test]
    fn test_split_on_first_separator() {
        assert_eq!(parse_selector("name"), ("name", None));
        assert_eq!(parse_selector("name__ilike"), ("name", Some("ilike")));
        assert_eq!(parse_selector("name__not__in"), ("name", Some("not__in")));
    }

    #[test]
    fn test_clause_order_follows_input() {
        let filters = Filters::new()
            .with("node_id__ne", "ns=9")
            .with("name", "temp1")
            .with_null("units__is_not");
        let clauses = compile(&sensor::descriptor(), &filters).unwrap();

        let fields: Vec<_> = clauses.iter().map(|c| c.field.as_str()).collect();
        assert_eq!(fields, vec!["node_id", "name", "units"]);
        assert_eq!(clauses[2].operator, Operator::IsNot);
    }

    #[test]
    fn test_unknown_field_fails() {
        let error = compile(&sensor::descriptor(), &Filters::new().with("colour", "red")).unwrap_err();
        assert!(matches!(error, RepositoryError::UnknownField { ref field, .. } if field == "colour"));
    }

    #[test]
    fn test_unknown_operator_fails() {
        let error = compile(
            &sensor::descriptor(),
            &Filters::new().with("name__between", "a"),
        )
        .unwrap_err();
        assert!(matches!(error, RepositoryError::UnknownOperator { ref operator } if operator == "between"));
    }

    #[test]
    fn test_unknown_field_reported_before_operator() {
        let error = compile(
            &sensor::descriptor(),
            &Filters::new().with("colour__between", "a"),
        )
        .unwrap_err();
        assert!(matches!(error, RepositoryError::UnknownField { .. }));
    }

    #[test]
    fn test_every_operator_parses() {
        for name in [
            "eq", "ne", "lt", "le", "gt", "ge", "contains", "in", "not_in", "ilike", "is_not",
        ] {
            let operator: Operator = name.parse().unwrap();
            assert_eq!(operator.as_str(), name);
        }
        assert!("like".parse::<Operator>().is_err());
    }

    #[test]
    fn test_comparison_operators_render() {
        let sql = render(
            &Filters::new()
                .with("name__gt", "a")
                .with("name__le", "z")
                .with("node_id__ne", "ns=3"),
        );
        assert!(sql.contains(r#""sensors"."name" > 'a'"#));
        assert!(sql.contains(r#""sensors"."name" <= 'z'"#));
        assert!(sql.contains(r#""sensors"."node_id" <> 'ns=3'"#));
        assert!(sql.contains(" AND "));
    }

    #[test]
    fn test_null_operands() {
        let sql = render(&Filters::new().with_null("units"));
        assert!(sql.contains(r#""sensors"."units" IS NULL"#));

        let sql = render(&Filters::new().with_null("units__is_not"));
        assert!(sql.contains(r#""sensors"."units" IS NOT NULL"#));
    }

    #[test]
    fn test_typed_none_compiles_like_null() {
        let sql = render(&Filters::new().with("units", None::<String>));
        assert!(sql.contains(r#""sensors"."units" IS NULL"#));

        let sql = render(&Filters::new().with("units__ne", None::<String>));
        assert!(sql.contains(r#""sensors"."units" IS NOT NULL"#));

        let sql = render(&Filters::new().with("units__is_not", None::<String>));
        assert!(sql.contains(r#""sensors"."units" IS NOT NULL"#));
    }

    #[test]
    fn test_list_operators() {
        let sql = render(&Filters::new().with_list("name__in", ["temp1", "temp2"]));
        assert!(sql.contains(r#""sensors"."name" IN ('temp1', 'temp2')"#));

        let sql = render(&Filters::new().with_list("name__not_in", ["temp3"]));
        assert!(sql.contains(r#""sensors"."name" NOT IN ('temp3')"#));
    }

    #[test]
    fn test_pattern_operators() {
        let sql = render(&Filters::new().with("name__contains", "emp"));
        assert!(sql.contains(r#""sensors"."name" LIKE '%emp%'"#));

        let sql = render(&Filters::new().with("name__ilike", "TEMP%"));
        assert!(sql.contains(r#"LOWER("sensors"."name") LIKE 'temp%'"#));
    }

    #[test]
    fn test_operand_shape_is_checked() {
        let error = compile(
            &sensor::descriptor(),
            &Filters::new().with("name__in", "temp1"),
        )
        .unwrap_err();
        assert!(matches!(error, RepositoryError::InvalidOperand { operator: "in", .. }));

        let error = compile(&sensor::descriptor(), &Filters::new().with("name__contains", 3)).unwrap_err();
        assert!(matches!(error, RepositoryError::InvalidOperand { operator: "contains", .. }));

        let error = compile(
            &sensor::descriptor(),
            &Filters::new().with_list("name", ["a", "b"]),
        )
        .unwrap_err();
        assert!(matches!(error, RepositoryError::InvalidOperand { operator: "eq", .. }));
    }

    #[test]
    fn test_empty_filters_match_everything() {
        let clauses = compile(&sensor::descriptor(), &Filters::new()).unwrap();
        assert!(clauses.is_empty());
        assert!(render(&Filters::new()).contains("WHERE TRUE"));
    }

    #[test]
    fn test_display_lists_selectors() {
        let filters = Filters::new()
            .with("name", "temp1")
            .with_null("units__is_not")
            .with_list("node_id__in", ["ns=1"]);
        assert_eq!(
            filters.to_string(),
            r#"name="temp1", units__is_not=NULL, node_id__in=["ns=1"]"#
        );
    }
}
