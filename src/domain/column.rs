//! Tabular data as handed over by the upload layer.
//!
//! A [`Dataset`] is an ordered mapping of column name to an ordered sequence
//! of [`Value`]s. Each [`Column`] is either numeric or categorical; the kind is
//! inferred the way a dataframe infers a dtype unless the caller declares it.

use std::collections::HashSet;
use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A single cell.
///
/// JSON mapping: numbers, strings and `null`. Any other JSON value (booleans,
/// arrays, objects) is kept as its JSON text in a `Category`, so it stays in
/// the dataset and is treated as an invalid cell by numeric operations.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Number(f64),
    Category(String),
    Missing,
}

/// A cell as seen by numeric arithmetic.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumericCell {
    /// Missing (`null` or NaN)
    Missing,
    /// Usable finite number
    Finite(f64),
    /// Present but not coercible to a finite number
    Invalid,
}

impl Value {
    /// Missing cells are `null` and NaN.
    #[must_use]
    pub fn is_missing(&self) -> bool {
        match self {
            Self::Missing => true,
            Self::Number(x) => x.is_nan(),
            Self::Category(_) => false,
        }
    }

    /// Coerce the cell for numeric use.
    ///
    /// Numeric strings are accepted so that a column declared numeric behaves
    /// like a coerced dataframe column.
    #[must_use]
    pub fn to_numeric(&self) -> NumericCell {
        match self {
            Self::Missing => NumericCell::Missing,
            Self::Number(x) if x.is_nan() => NumericCell::Missing,
            Self::Number(x) if x.is_finite() => NumericCell::Finite(*x),
            Self::Number(_) => NumericCell::Invalid,
            Self::Category(s) => match s.trim().parse::<f64>() {
                Ok(x) if x.is_finite() => NumericCell::Finite(x),
                _ => NumericCell::Invalid,
            },
        }
    }

    /// Key used for distinct-value grouping and histograms.
    ///
    /// `None` for missing cells.
    #[must_use]
    pub fn key(&self) -> Option<String> {
        if self.is_missing() {
            return None;
        }
        match self {
            Self::Number(x) => Some(number_key(*x)),
            Self::Category(s) => Some(s.clone()),
            Self::Missing => None,
        }
    }
}

/// Grouping key for a number; `-0.0` and `0.0` share one key.
pub(crate) fn number_key(x: f64) -> String {
    format!("{}", x + 0.0)
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match serde_json::Value::deserialize(deserializer)? {
            serde_json::Value::Null => Self::Missing,
            serde_json::Value::Number(n) => n.as_f64().map_or_else(|| Self::Category(n.to_string()), Self::Number),
            serde_json::Value::String(s) => Self::Category(s),
            other => Self::Category(other.to_string()),
        })
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Self::Number(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Category(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Category(s)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Missing, Into::into)
    }
}

/// Column dtype.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    Numeric,
    Categorical,
}

impl ColumnKind {
    /// Numeric when every non-missing value is a number. An all-missing
    /// column is numeric.
    #[must_use]
    pub fn infer(values: &[Value]) -> Self {
        let all_numbers = values
            .iter()
            .filter(|v| !v.is_missing())
            .all(|v| matches!(v, Value::Number(_)));
        if all_numbers {
            Self::Numeric
        } else {
            Self::Categorical
        }
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric => write!(f, "numeric"),
            Self::Categorical => write!(f, "categorical"),
        }
    }
}

/// A named, ordered sequence of values of one kind.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    values: Vec<Value>,
    kind: ColumnKind,
}

impl Column {
    /// Create a column, inferring its kind.
    pub fn new(name: impl Into<String>, values: Vec<Value>) -> Self {
        let kind = ColumnKind::infer(&values);
        Self {
            name: name.into(),
            values,
            kind,
        }
    }

    /// Create a column with a declared kind.
    ///
    /// A declared numeric column may contain cells that cannot be coerced;
    /// those are excluded from statistics and left untouched on release.
    pub fn with_kind(name: impl Into<String>, values: Vec<Value>, kind: ColumnKind) -> Self {
        Self {
            name: name.into(),
            values,
            kind,
        }
    }

    /// Convenience constructor for a numeric column with optional cells.
    pub fn numeric(name: impl Into<String>, values: impl IntoIterator<Item = Option<f64>>) -> Self {
        let values = values.into_iter().map(Value::from).collect();
        Self::with_kind(name, values, ColumnKind::Numeric)
    }

    /// Convenience constructor for a categorical column with optional cells.
    pub fn categorical<S: Into<String>>(
        name: impl Into<String>,
        values: impl IntoIterator<Item = Option<S>>,
    ) -> Self {
        let values = values
            .into_iter()
            .map(|v| v.map_or(Value::Missing, |s| Value::Category(s.into())))
            .collect();
        Self::with_kind(name, values, ColumnKind::Categorical)
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    #[must_use]
    pub fn kind(&self) -> ColumnKind {
        self.kind
    }

    #[must_use]
    pub fn is_numeric(&self) -> bool {
        self.kind == ColumnKind::Numeric
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Number of non-missing cells.
    #[must_use]
    pub fn non_missing_count(&self) -> usize {
        self.values.iter().filter(|v| !v.is_missing()).count()
    }

    /// Finite numeric values in column order.
    ///
    /// Cells that are present but not coercible are skipped and reported.
    #[must_use]
    pub fn numeric_values(&self) -> Vec<f64> {
        let mut invalid = 0usize;
        let out: Vec<f64> = self
            .values
            .iter()
            .filter_map(|v| match v.to_numeric() {
                NumericCell::Finite(x) => Some(x),
                NumericCell::Invalid => {
                    invalid += 1;
                    None
                }
                NumericCell::Missing => None,
            })
            .collect();
        if invalid > 0 {
            tracing::warn!(column = %self.name, invalid, "non-numeric cells excluded from computation");
        }
        out
    }

    /// Distinct non-missing values in first-seen order.
    #[must_use]
    pub fn categories(&self) -> Vec<Value> {
        let mut seen = HashSet::new();
        self.values
            .iter()
            .filter(|v| v.key().is_some_and(|k| seen.insert(k)))
            .cloned()
            .collect()
    }

    /// Build a new column of the same name and kind with replaced values.
    #[must_use]
    pub fn with_values(&self, values: Vec<Value>) -> Self {
        Self {
            name: self.name.clone(),
            values,
            kind: self.kind,
        }
    }
}

/// An ordered collection of uniquely named columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    columns: Vec<Column>,
}

impl Dataset {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a dataset from columns; a later column replaces an earlier one
    /// with the same name.
    #[must_use]
    pub fn from_columns(columns: impl IntoIterator<Item = Column>) -> Self {
        let mut dataset = Self::new();
        for column in columns {
            dataset.insert(column);
        }
        dataset
    }

    /// Insert a column, replacing any existing column with the same name in
    /// place.
    pub fn insert(&mut self, column: Column) {
        match self.columns.iter_mut().find(|c| c.name == column.name) {
            Some(existing) => *existing = column,
            None => self.columns.push(column),
        }
    }

    #[must_use]
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    #[must_use]
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Parse a dataset from a JSON object of column name to value array.
    ///
    /// # Errors
    /// Returns error if the JSON is malformed or a cell is not a number,
    /// string or `null`.
    pub fn from_json_str(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

impl Serialize for Dataset {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for column in &self.columns {
            map.serialize_entry(&column.name, &column.values)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Dataset {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct DatasetVisitor;

        impl<'de> Visitor<'de> for DatasetVisitor {
            type Value = Dataset;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an object mapping column names to arrays of values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Dataset, A::Error> {
                let mut dataset = Dataset::new();
                while let Some((name, values)) = access.next_entry::<String, Vec<Value>>()? {
                    dataset.insert(Column::new(name, values));
                }
                Ok(dataset)
            }
        }

        deserializer.deserialize_map(DatasetVisitor)
    }
}
