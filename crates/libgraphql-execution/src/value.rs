use crate::error::FieldError;
use crate::error::FieldResult;
use futures::Stream;
use futures::StreamExt;
use futures::stream::BoxStream;
use parking_lot::Mutex;
use serde::Serialize;
use std::any::Any;
use std::sync::Arc;

/// The stream of source events returned by a subscription root field.
pub struct EventStream(Mutex<BoxStream<'static, FieldResult<FieldValue>>>);
impl EventStream {
    pub(crate) fn into_inner(self) -> BoxStream<'static, FieldResult<FieldValue>> {
        self.0.into_inner()
    }
}
impl std::fmt::Debug for EventStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("EventStream(..)")
    }
}

/// What a resolver hands back to the executor.
///
/// JSON values are completed directly against the field's declared type.
/// Lists may mix representations per item. `Opaque` values are never
/// serialized; they only exist to be handed to child resolvers as their
/// parent.
pub enum FieldValue {
    Json(serde_json::Value),
    List(Vec<FieldValue>),
    Null,
    Opaque(Arc<dyn Any + Send + Sync>),
    Stream(EventStream),

    /// A value annotated with its concrete object type, for fields whose
    /// declared type is an interface or union.
    WithType {
        inner: Box<FieldValue>,
        type_name: String,
    },
}
impl FieldValue {
    /// Serialize `value` into a [`FieldValue::Json`].
    pub fn from_serializable<T: Serialize>(value: &T) -> FieldResult<Self> {
        serde_json::to_value(value)
            .map(Self::Json)
            .map_err(|err| FieldError::new(format!(
                "Failed to serialize resolved value: {err}",
            )))
    }

    pub fn list(items: impl IntoIterator<Item = impl Into<FieldValue>>) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }

    pub fn opaque<T: Any + Send + Sync>(value: T) -> Self {
        Self::Opaque(Arc::new(value))
    }

    pub fn stream<S>(events: S) -> Self
    where
        S: Stream<Item = FieldResult<FieldValue>> + Send + 'static,
    {
        Self::Stream(EventStream(Mutex::new(events.boxed())))
    }

    pub fn typed(type_name: impl Into<String>, inner: impl Into<FieldValue>) -> Self {
        Self::WithType {
            inner: Box::new(inner.into()),
            type_name: type_name.into(),
        }
    }

    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Json(value) => Some(value),
            Self::WithType { inner, .. } => inner.as_json(),
            _ => None,
        }
    }

    /// Downcast an [`FieldValue::Opaque`] value (looking through any
    /// [`FieldValue::WithType`] wrapper).
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        match self {
            Self::Opaque(value) => value.downcast_ref::<T>(),
            Self::WithType { inner, .. } => inner.downcast_ref::<T>(),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        match self {
            Self::Json(serde_json::Value::Null) | Self::Null => true,
            Self::WithType { inner, .. } => inner.is_null(),
            _ => false,
        }
    }

    /// Strip any [`FieldValue::WithType`] wrappers.
    pub fn into_untyped(self) -> Self {
        match self {
            Self::WithType { inner, .. } => inner.into_untyped(),
            other => other,
        }
    }

    /// Short description used in error messages.
    pub(crate) fn kind_name(&self) -> &'static str {
        match self {
            Self::Json(serde_json::Value::Array(_)) => "a JSON array",
            Self::Json(serde_json::Value::Bool(_)) => "a boolean",
            Self::Json(serde_json::Value::Null) | Self::Null => "null",
            Self::Json(serde_json::Value::Number(_)) => "a number",
            Self::Json(serde_json::Value::Object(_)) => "a JSON object",
            Self::Json(serde_json::Value::String(_)) => "a string",
            Self::List(_) => "a list",
            Self::Opaque(_) => "an opaque value",
            Self::Stream(_) => "an event stream",
            Self::WithType { inner, .. } => inner.kind_name(),
        }
    }
}
impl std::fmt::Debug for FieldValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json(value) => f.debug_tuple("Json").field(value).finish(),
            Self::List(items) => f.debug_tuple("List").field(items).finish(),
            Self::Null => f.write_str("Null"),
            Self::Opaque(_) => f.write_str("Opaque(..)"),
            Self::Stream(stream) => stream.fmt(f),
            Self::WithType { inner, type_name } => f.debug_struct("WithType")
                .field("inner", inner)
                .field("type_name", type_name)
                .finish(),
        }
    }
}
impl std::convert::From<serde_json::Value> for FieldValue {
    fn from(value: serde_json::Value) -> Self {
        Self::Json(value)
    }
}
impl std::convert::From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Json(serde_json::Value::from(value))
    }
}
impl std::convert::From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Json(serde_json::Value::from(value))
    }
}
impl std::convert::From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Json(serde_json::Value::from(value))
    }
}
impl std::convert::From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        Self::Json(serde_json::Value::from(value))
    }
}
impl std::convert::From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Json(serde_json::Value::from(value))
    }
}
impl std::convert::From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Json(serde_json::Value::from(value))
    }
}
impl std::convert::From<Vec<FieldValue>> for FieldValue {
    fn from(items: Vec<FieldValue>) -> Self {
        Self::List(items)
    }
}
impl<T: Into<FieldValue>> std::convert::From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Self::Null)
    }
}
