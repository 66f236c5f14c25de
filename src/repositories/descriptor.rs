//! Record descriptors
//!
//! A [`RecordDescriptor`] is the explicit metadata a repository needs about a
//! record type: a display name for errors, the field name → column table,
//! the uniqueness constraints usable as conflict targets and any client-side
//! default values applied on insert.

use std::collections::BTreeSet;
use std::fmt;

use sea_orm::sea_query::Value;
use sea_orm::{EntityTrait, IdenStatic, Iterable, PrimaryKeyToColumn};

use crate::error::RepositoryError;

/// Produces a value for a field omitted from an insert payload.
pub type DefaultFn = fn() -> Value;

/// Field, uniqueness and default metadata for one record type.
pub struct RecordDescriptor<E: EntityTrait> {
    name: &'static str,
    fields: Vec<(String, E::Column)>,
    unique_keys: Vec<Vec<E::Column>>,
    defaults: Vec<(E::Column, DefaultFn)>,
}

impl<E: EntityTrait> RecordDescriptor<E> {
    /// Describes every column of `E`, with the primary key as the first
    /// uniqueness constraint.
    pub fn new(name: &'static str) -> Self {
        let fields = E::Column::iter()
            .map(|column| (column.as_str().to_owned(), column))
            .collect();
        let primary_key = E::PrimaryKey::iter()
            .map(|key| key.into_column())
            .collect();

        Self {
            name,
            fields,
            unique_keys: vec![primary_key],
            defaults: Vec::new(),
        }
    }

    /// Declares an additional uniqueness constraint over `columns`.
    pub fn unique_key(mut self, columns: &[E::Column]) -> Self {
        self.unique_keys.push(columns.to_vec());
        self
    }

    /// Declares a value generated for `column` when an insert omits it.
    pub fn default_value(mut self, column: E::Column, value: DefaultFn) -> Self {
        self.defaults.push((column, value));
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Field names in column declaration order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    /// Looks up a column without raising.
    pub fn column(&self, field: &str) -> Option<E::Column> {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, column)| *column)
    }

    /// Resolves a field name, failing with `UnknownField` when absent.
    pub fn resolve(&self, field: &str) -> Result<E::Column, RepositoryError> {
        self.column(field)
            .ok_or_else(|| RepositoryError::UnknownField {
                record: self.name,
                field: field.to_string(),
            })
    }

    /// Resolves a list of field names in order.
    pub fn resolve_all<S: AsRef<str>>(&self, fields: &[S]) -> Result<Vec<E::Column>, RepositoryError> {
        fields.iter().map(|field| self.resolve(field.as_ref())).collect()
    }

    /// Resolves a conflict target, requiring it to match one declared
    /// uniqueness constraint regardless of column order.
    pub fn conflict_target<S: AsRef<str>>(
        &self,
        fields: &[S],
    ) -> Result<Vec<E::Column>, RepositoryError> {
        let columns = self.resolve_all(fields)?;
        let wanted: BTreeSet<&str> = columns.iter().map(|column| column.as_str()).collect();

        let matches = self.unique_keys.iter().any(|key| {
            key.len() == wanted.len() && key.iter().all(|column| wanted.contains(column.as_str()))
        });

        if !matches {
            return Err(RepositoryError::NoMatchingConstraint {
                record: self.name,
                fields: fields
                    .iter()
                    .map(|field| field.as_ref())
                    .collect::<Vec<_>>()
                    .join(", "),
            });
        }

        Ok(columns)
    }

    /// Columns forming the primary key.
    pub fn primary_key(&self) -> &[E::Column] {
        &self.unique_keys[0]
    }

    pub(crate) fn defaults(&self) -> impl Iterator<Item = (String, Value)> + '_ {
        self.defaults
            .iter()
            .map(|(column, value)| (column.as_str().to_owned(), value()))
    }
}

impl<E: EntityTrait> Clone for RecordDescriptor<E> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            fields: self.fields.clone(),
            unique_keys: self.unique_keys.clone(),
            defaults: self.defaults.clone(),
        }
    }
}

impl<E: EntityTrait> fmt::Debug for RecordDescriptor<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordDescriptor")
            .field("name", &self.name)
            .field("fields", &self.field_names().collect::<Vec<_>>())
            .field(
                "unique_keys",
                &self
                    .unique_keys
                    .iter()
                    .map(|key| key.iter().map(|c| c.as_str()).collect::<Vec<_>>())
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{opc_server, reading, sensor};

    #[test]
    fn test_fields_follow_entity_columns() {
        let descriptor = sensor::descriptor();
        let fields: Vec<_> = descriptor.field_names().collect();

        assert_eq!(descriptor.name(), "Sensor");
        assert!(fields.contains(&"id"));
        assert!(fields.contains(&"opc_server_id"));
        assert!(fields.contains(&"node_id"));
        assert!(descriptor.column("colour").is_none());
    }

    #[test]
    fn test_resolve_unknown_field() {
        let descriptor = sensor::descriptor();
        let error = descriptor.resolve("colour").unwrap_err();

        assert!(matches!(
            error,
            RepositoryError::UnknownField { record: "Sensor", ref field } if field == "colour"
        ));
    }

    #[test]
    fn test_conflict_target_is_order_insensitive() {
        let descriptor = sensor::descriptor();

        assert!(descriptor.conflict_target(&["opc_server_id", "name"]).is_ok());
        assert!(descriptor.conflict_target(&["name", "opc_server_id"]).is_ok());
        assert!(descriptor.conflict_target(&["id"]).is_ok());
    }

    #[test]
    fn test_conflict_target_must_be_a_constraint() {
        let descriptor = sensor::descriptor();
        let error = descriptor.conflict_target(&["name"]).unwrap_err();

        assert!(matches!(error, RepositoryError::NoMatchingConstraint { .. }));
        assert_eq!(
            error.to_string(),
            "no uniqueness constraint on Sensor covers fields [name]"
        );
    }

    #[test]
    fn test_composite_primary_key() {
        let descriptor = reading::descriptor();
        let key: Vec<_> = descriptor.primary_key().iter().map(|c| c.as_str()).collect();

        assert_eq!(key.len(), 2);
        assert!(key.contains(&"time"));
        assert!(key.contains(&"sensor_id"));
    }

    #[test]
    fn test_defaults_generate_fresh_values() {
        let descriptor = opc_server::descriptor();
        let first: Vec<_> = descriptor.defaults().collect();
        let second: Vec<_> = descriptor.defaults().collect();

        let id_of = |values: &[(String, Value)]| {
            values
                .iter()
                .find(|(name, _)| *name == "id")
                .map(|(_, value)| value.clone())
        };

        assert!(id_of(&first).is_some());
        assert_ne!(id_of(&first), id_of(&second));
    }
}
