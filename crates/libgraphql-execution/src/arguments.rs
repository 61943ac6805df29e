use crate::error::FieldError;
use crate::error::FieldResult;
use serde::de::DeserializeOwned;

/// Coerced argument values for one field invocation.
///
/// Arguments that were omitted and have no default are absent (as opposed
/// to being present with a `null` value).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Arguments {
    values: serde_json::Map<String, serde_json::Value>,
}
impl Arguments {
    pub(crate) fn from_map(values: serde_json::Map<String, serde_json::Value>) -> Self {
        Self { values }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Deserialize the argument named `name`. An absent argument
    /// deserializes from `null`, so asking for an `Option<T>` never fails
    /// for a missing argument.
    pub fn get<T: DeserializeOwned>(&self, name: &str) -> FieldResult<T> {
        let value = self.values
            .get(name)
            .cloned()
            .unwrap_or(serde_json::Value::Null);
        serde_json::from_value(value).map_err(|err| FieldError::new(format!(
            "Invalid value for argument `{name}`: {err}",
        )))
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &serde_json::Value)> {
        self.values.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn raw(&self, name: &str) -> Option<&serde_json::Value> {
        self.values.get(name)
    }

    /// Like [`Arguments::get()`], but `None` when the argument is absent or
    /// `null`.
    pub fn try_get<T: DeserializeOwned>(&self, name: &str) -> FieldResult<Option<T>> {
        match self.values.get(name) {
            None | Some(serde_json::Value::Null) => Ok(None),
            Some(_) => self.get::<T>(name).map(Some),
        }
    }
}
