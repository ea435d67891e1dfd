use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ExportError, ExportResult};

/// Ordered field name / value pairs of a record.
pub type Attributes = Vec<(String, String)>;

/// Anything the exporter can write as one line or one XML element.
///
/// The attribute order is the column order. All records of one collection are
/// expected to expose the same field names in the same order; the exporter
/// takes its headers from the first record and does not check the others.
pub trait Record {
    /// Name of the record kind, used as the XML element name.
    fn type_name(&self) -> &str;

    /// Current field values, already converted to strings.
    fn attributes(&self) -> Attributes;
}

/// One element yielded by a [`RecordCollection`].
pub enum Entry<'a> {
    Record(&'a dyn Record),
    /// An element that cannot be exported, with a short description.
    Malformed(&'a str),
}

/// An ordered source of records.
pub trait RecordCollection {
    /// Name of the collection kind, appended to the first record's type name
    /// to build the XML root element.
    fn type_name(&self) -> &str {
        "Collection"
    }

    /// Iterates the elements in a stable order.
    fn entries(&self) -> Box<dyn Iterator<Item = Entry<'_>> + '_>;

    fn first(&self) -> Option<Entry<'_>> {
        self.entries().next()
    }
}

impl<R: Record> RecordCollection for Vec<R> {
    fn entries(&self) -> Box<dyn Iterator<Item = Entry<'_>> + '_> {
        Box::new(self.iter().map(|record| Entry::Record(record as &dyn Record)))
    }
}

impl<R: Record> RecordCollection for [R] {
    fn entries(&self) -> Box<dyn Iterator<Item = Entry<'_>> + '_> {
        Box::new(self.iter().map(|record| Entry::Record(record as &dyn Record)))
    }
}

/// A named collection which may also carry elements that are not records,
/// for instance rows a data layer failed to hydrate.
///
/// # Examples
///
/// ```
/// use collection_export::core::record::{Collection, Model, RecordCollection};
///
/// let mut cars = Collection::new("Collection");
/// cars.push(Model::new("Car").with("id", "1"));
/// cars.push_malformed("row 2 could not be loaded");
///
/// assert_eq!(cars.len(), 2);
/// assert_eq!(cars.type_name(), "Collection");
/// ```
#[derive(Debug, Clone)]
pub struct Collection<R> {
    type_name: String,
    items: Vec<Result<R, String>>,
}

impl<R: Record> Collection<R> {
    pub fn new<S: Into<String>>(type_name: S) -> Self {
        Self {
            type_name: type_name.into(),
            items: Vec::new(),
        }
    }

    pub fn from_records<S, I>(type_name: S, records: I) -> Self
    where
        S: Into<String>,
        I: IntoIterator<Item = R>,
    {
        Self {
            type_name: type_name.into(),
            items: records.into_iter().map(Ok).collect(),
        }
    }

    pub fn push(&mut self, record: R) {
        self.items.push(Ok(record));
    }

    pub fn push_malformed<S: Into<String>>(&mut self, reason: S) {
        self.items.push(Err(reason.into()));
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<R: Record> FromIterator<R> for Collection<R> {
    fn from_iter<I: IntoIterator<Item = R>>(iter: I) -> Self {
        Collection::from_records("Collection", iter)
    }
}

impl<R: Record> RecordCollection for Collection<R> {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn entries(&self) -> Box<dyn Iterator<Item = Entry<'_>> + '_> {
        Box::new(self.items.iter().map(|item| match item {
            Ok(record) => Entry::Record(record as &dyn Record),
            Err(reason) => Entry::Malformed(reason.as_str()),
        }))
    }
}

/// A record held as plain strings.
///
/// # Examples
///
/// ```
/// use collection_export::core::record::{Model, Record};
///
/// let car = Model::new("Car").with("id", "1").with("make", "Porsche");
///
/// assert_eq!(car.type_name(), "Car");
/// assert_eq!(car.get("make"), Some("Porsche"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Model {
    type_name: String,
    attributes: Attributes,
}

impl Model {
    pub fn new<S: Into<String>>(type_name: S) -> Self {
        Self {
            type_name: type_name.into(),
            attributes: Vec::new(),
        }
    }

    /// Adds or replaces a field, builder style.
    pub fn with<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.set(key, value);
        self
    }

    /// Replaces the value of an existing field in place, or appends a new one.
    pub fn set<K: Into<String>, V: Into<String>>(&mut self, key: K, value: V) {
        let key = key.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(name, _)| *name == key) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }

    /// Builds a model from any serializable struct, named after the struct.
    ///
    /// ```
    /// use collection_export::core::record::{Model, Record};
    /// use serde::Serialize;
    ///
    /// #[derive(Serialize)]
    /// struct Car {
    ///     year: u16,
    ///     make: String,
    ///     sold: bool,
    /// }
    ///
    /// let car = Car { year: 1948, make: "Porsche".to_string(), sold: true };
    /// let model = Model::from_serialize(&car).unwrap();
    ///
    /// assert_eq!(model.type_name(), "Car");
    /// assert_eq!(
    ///     model.attributes(),
    ///     vec![
    ///         ("year".to_string(), "1948".to_string()),
    ///         ("make".to_string(), "Porsche".to_string()),
    ///         ("sold".to_string(), "1".to_string()),
    ///     ]
    /// );
    /// ```
    pub fn from_serialize<T: Serialize>(item: &T) -> ExportResult<Self> {
        let type_name = std::any::type_name::<T>()
            .split('<')
            .next()
            .and_then(|path| path.split("::").last())
            .unwrap_or("item");
        Self::from_serialize_as(type_name, item)
    }

    pub fn from_serialize_as<S: Into<String>, T: Serialize>(
        type_name: S,
        item: &T,
    ) -> ExportResult<Self> {
        let map = match serde_json::to_value(item)? {
            Value::Object(map) => map,
            other => {
                return Err(ExportError::Serialization(format!(
                    "expected a struct or map, got {}",
                    other
                )));
            }
        };

        let attributes = map
            .into_iter()
            .map(|(key, value)| (key, stringify(value)))
            .collect();

        Ok(Self {
            type_name: type_name.into(),
            attributes,
        })
    }
}

impl Record for Model {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn attributes(&self) -> Attributes {
        self.attributes.clone()
    }
}

fn stringify(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Bool(true) => "1".to_string(),
        Value::Bool(false) | Value::Null => String::new(),
        nested => nested.to_string(),
    }
}
