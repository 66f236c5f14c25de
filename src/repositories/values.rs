//! Field → value payloads used by insert and update operations.

use std::fmt;

use sea_orm::sea_query::Value;

/// An ordered mapping from field name to the value written into it.
///
/// Setting the same field twice keeps the position of the first write and
/// the value of the last one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldValues {
    entries: Vec<(String, Value)>,
}

impl FieldValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`FieldValues::insert`].
    pub fn set<K, V>(mut self, field: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        self.insert(field, value);
        self
    }

    pub fn insert<K, V>(&mut self, field: K, value: V)
    where
        K: Into<String>,
        V: Into<Value>,
    {
        let field = field.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(name, _)| *name == field) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((field, value)),
        }
    }

    pub fn contains(&self, field: &str) -> bool {
        self.entries.iter().any(|(name, _)| name == field)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, value)| value)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for FieldValues
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut values = FieldValues::new();
        for (field, value) in iter {
            values.insert(field, value);
        }
        values
    }
}

impl fmt::Display for FieldValues {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, (field, value)) in self.entries.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{field}={}", render_value(value))?;
        }
        Ok(())
    }
}

/// Renders a value for error messages without the enum wrapper noise.
pub(crate) fn render_value(value: &Value) -> String {
    match value {
        Value::String(Some(s)) => format!("{s:?}"),
        Value::Uuid(Some(u)) => u.to_string(),
        Value::Bool(Some(b)) => b.to_string(),
        Value::BigInt(Some(n)) => n.to_string(),
        Value::Int(Some(n)) => n.to_string(),
        Value::Double(Some(n)) => n.to_string(),
        other => format!("{other:?}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_keeps_first_position() {
        let values = FieldValues::new()
            .set("name", "temp1")
            .set("node_id", "ns=1")
            .set("name", "temp2");

        assert_eq!(values.keys().collect::<Vec<_>>(), vec!["name", "node_id"]);
        assert_eq!(values.get("name"), Some(&Value::from("temp2")));
        assert_eq!(values.len(), 2);
    }

    #[test]
    fn test_display() {
        let values = FieldValues::new().set("name", "temp1").set("is_deleted", false);
        assert_eq!(values.to_string(), "name=\"temp1\", is_deleted=false");
    }

    #[test]
    fn test_from_iterator() {
        let values: FieldValues = vec![("units", "C"), ("name", "temp1")].into_iter().collect();
        assert!(values.contains("units"));
        assert!(!values.contains("description"));
    }
}
