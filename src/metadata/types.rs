use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// A metadata field that pages may declare once or several times.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    pub fn first(&self) -> Option<&T> {
        match self {
            Self::One(value) => Some(value),
            Self::Many(values) => values.first(),
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        match self {
            Self::One(value) => std::slice::from_ref(value).iter(),
            Self::Many(values) => values.iter(),
        }
    }

    /// Appends a value, promoting a single value to a list.
    pub fn push(self, value: T) -> Self {
        match self {
            Self::One(first) => Self::Many(vec![first, value]),
            Self::Many(mut values) => {
                values.push(value);
                Self::Many(values)
            }
        }
    }
}

impl OneOrMany<String> {
    pub fn into_value(self) -> Value {
        match self {
            Self::One(value) => Value::String(value),
            Self::Many(values) => Value::Array(values.into_iter().map(Value::String).collect()),
        }
    }
}

/// Link-preview metadata for one linked resource, as persisted in the cache.
///
/// Fields the page exposed beyond the typed ones are kept verbatim in `extra`
/// under their `og:`-stripped property names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataDocument {
    #[serde(default, deserialize_with = "null_as_default")]
    pub url: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,

    pub image: OneOrMany<String>,

    #[serde(rename = "video:url", default, skip_serializing_if = "Option::is_none")]
    pub video: Option<OneOrMany<String>>,

    /// Site-relative path of the generated thumbnail
    #[serde(
        rename = "urlcard:thumbnail_image",
        alias = "pelican:thumbnail_image",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub thumbnail_path: Option<String>,

    /// URL the document was fetched for
    #[serde(
        rename = "urlcard:source_url",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub source_url: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl MetadataDocument {
    /// First declared image, the only one cards use
    pub fn primary_image(&self) -> Option<&str> {
        self.image.first().map(String::as_str)
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
