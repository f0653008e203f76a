//! Request parameters for API paths and query strings.
//!
//! The API only takes integer numbers, so every numeric value is rendered
//! without a fractional part. Dates go over the wire as Unix seconds.

use chrono::{DateTime, Utc};

/// Separator used when a vector value is rendered into a single slot.
pub const VECTOR_SEPARATOR: &str = ";";

/// A single parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Str(String),
    Int(i64),
    /// Rounded to the nearest integer when rendered.
    Float(f64),
    Date(DateTime<Utc>),
}

impl Scalar {
    /// Render the value the way the API expects it.
    pub fn to_param_string(&self) -> String {
        match self {
            Scalar::Str(s) => s.clone(),
            Scalar::Int(n) => n.to_string(),
            Scalar::Float(f) => format!("{:.0}", f.round()),
            Scalar::Date(d) => {
                // round to the nearest second
                let secs = d.timestamp() + i64::from(d.timestamp_subsec_millis() >= 500);
                secs.to_string()
            }
        }
    }
}

/// A parameter value: a scalar or a vector of scalars.
///
/// Vectors are joined with [`VECTOR_SEPARATOR`]. A vector bound to a path
/// placeholder is what [`fetch_all`](crate::StackExchangeApi::fetch_all)
/// splits into page-sized batches.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    One(Scalar),
    Many(Vec<Scalar>),
}

impl ParamValue {
    pub fn is_vector(&self) -> bool {
        matches!(self, ParamValue::Many(_))
    }

    /// Render the value, joining vector elements with `;`.
    pub fn to_param_string(&self) -> String {
        match self {
            ParamValue::One(s) => s.to_param_string(),
            ParamValue::Many(v) => v
                .iter()
                .map(Scalar::to_param_string)
                .collect::<Vec<_>>()
                .join(VECTOR_SEPARATOR),
        }
    }
}

impl From<Scalar> for ParamValue {
    fn from(value: Scalar) -> Self {
        ParamValue::One(value)
    }
}

impl From<Vec<Scalar>> for ParamValue {
    fn from(values: Vec<Scalar>) -> Self {
        ParamValue::Many(values)
    }
}

macro_rules! scalar_conversions {
    ($($t:ty => $conv:expr),* $(,)?) => {
        $(
            impl From<$t> for Scalar {
                fn from(value: $t) -> Self {
                    $conv(value)
                }
            }

            impl From<$t> for ParamValue {
                fn from(value: $t) -> Self {
                    ParamValue::One(Scalar::from(value))
                }
            }

            impl From<Vec<$t>> for ParamValue {
                fn from(values: Vec<$t>) -> Self {
                    ParamValue::Many(values.into_iter().map(Scalar::from).collect())
                }
            }

            impl From<&[$t]> for ParamValue {
                fn from(values: &[$t]) -> Self {
                    ParamValue::Many(values.iter().cloned().map(Scalar::from).collect())
                }
            }
        )*
    };
}

scalar_conversions! {
    String => Scalar::Str,
    &str => |s: &str| Scalar::Str(s.to_owned()),
    i32 => |n: i32| Scalar::Int(i64::from(n)),
    i64 => Scalar::Int,
    u32 => |n: u32| Scalar::Int(i64::from(n)),
    // beyond i64 the decimal text is sent as is
    u64 => |n: u64| i64::try_from(n).map_or_else(|_| Scalar::Str(n.to_string()), Scalar::Int),
    f64 => Scalar::Float,
    DateTime<Utc> => Scalar::Date,
}

/// Ordered parameter map.
///
/// Insertion order is kept so query strings are reproducible. Inserting an
/// existing name replaces its value in place.
///
/// ```rust
/// # use huginn::Parameters;
/// let params = Parameters::new()
///     .with("ids", vec![1u64, 2, 3])
///     .with("sort", "reputation");
/// assert_eq!(params.get("ids").unwrap().to_param_string(), "1;2;3");
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Parameters {
    entries: Vec<(String, ParamValue)>,
}

impl Parameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<ParamValue>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
