//! Compiler flag values.
//!
//! Flags are kept in declaration order. Each value is tagged as a switch
//! (present without value), a single scalar or a list of scalars. The
//! `externs` flag is parsed into its own [`Flag::Externs`] entry holding glob
//! patterns that are expanded when arguments are built.

use std::fmt;

use indexmap::IndexMap;
use serde::{
    Deserialize, Deserializer,
    de::{self, MapAccess, SeqAccess, Visitor},
};

/// Name of the flag whose values are glob patterns.
pub const EXTERNS: &str = "externs";
/// Flag naming the output chunks in module-output mode.
pub const MODULE: &str = "module";
/// Flag naming the output prefix in module-output mode.
pub const MODULE_OUTPUT_PATH_PREFIX: &str = "module_output_path_prefix";

/// A single flag value.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Bool(b) => write!(f, "{}", b),
            Scalar::Int(i) => write!(f, "{}", i),
            Scalar::Float(x) => write!(f, "{}", x),
            Scalar::Str(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::Str(s.to_string())
    }
}

impl From<String> for Scalar {
    fn from(s: String) -> Self {
        Scalar::Str(s)
    }
}

impl From<bool> for Scalar {
    fn from(b: bool) -> Self {
        Scalar::Bool(b)
    }
}

impl From<i64> for Scalar {
    fn from(i: i64) -> Self {
        Scalar::Int(i)
    }
}

/// The value of an ordinary compiler flag.
#[derive(Debug, Clone, PartialEq)]
pub enum FlagValue {
    /// Flag present with no value: `--flag`.
    Switch,
    /// One value: `--flag=value`.
    Scalar(Scalar),
    /// One `--flag=value` token per element.
    List(Vec<Scalar>),
}

impl FlagValue {
    /// Values in emission order. `None` stands for the bare switch.
    pub fn values(&self) -> Vec<Option<String>> {
        match self {
            FlagValue::Switch => vec![None],
            FlagValue::Scalar(s) => vec![Some(s.to_string())],
            FlagValue::List(items) => items.iter().map(|s| Some(s.to_string())).collect(),
        }
    }

    fn into_strings(self) -> Vec<String> {
        self.values().into_iter().flatten().collect()
    }
}

impl From<Scalar> for FlagValue {
    fn from(value: Scalar) -> Self {
        FlagValue::Scalar(value)
    }
}

impl From<&str> for FlagValue {
    fn from(value: &str) -> Self {
        FlagValue::Scalar(value.into())
    }
}

impl From<String> for FlagValue {
    fn from(value: String) -> Self {
        FlagValue::Scalar(value.into())
    }
}

impl From<bool> for FlagValue {
    fn from(value: bool) -> Self {
        FlagValue::Scalar(value.into())
    }
}

impl From<i64> for FlagValue {
    fn from(value: i64) -> Self {
        FlagValue::Scalar(value.into())
    }
}

impl<T: Into<Scalar>> From<Vec<T>> for FlagValue {
    fn from(values: Vec<T>) -> Self {
        FlagValue::List(values.into_iter().map(Into::into).collect())
    }
}

/// An entry in [`CompilerFlags`].
#[derive(Debug, Clone, PartialEq)]
pub enum Flag {
    /// An ordinary flag passed through as-is.
    Value(FlagValue),
    /// Glob patterns, one `--externs=<path>` per matched file.
    Externs(Vec<String>),
}

/// Ordered mapping of flag names to values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompilerFlags {
    entries: IndexMap<String, Flag>,
}

impl CompilerFlags {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a flag, replacing any previous value but keeping its position.
    ///
    /// Values for `externs` are stored as glob patterns; a switch is not a
    /// valid `externs` value and yields an error message.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        value: impl Into<FlagValue>,
    ) -> Result<(), String> {
        let name = name.into();
        let value = value.into();
        let flag = if name == EXTERNS {
            if value == FlagValue::Switch {
                return Err(format!("`{}` expects one or more glob patterns", EXTERNS));
            }
            Flag::Externs(value.into_strings())
        } else {
            Flag::Value(value)
        };
        self.entries.insert(name, flag);
        Ok(())
    }

    /// Set an ordinary flag, keeping the position of a previous value.
    ///
    /// Unlike [`insert`](Self::insert), `externs` is not special-cased here.
    pub(crate) fn set(&mut self, name: String, value: FlagValue) {
        self.entries.insert(name, Flag::Value(value));
    }

    /// Add glob patterns for `externs`.
    pub fn add_externs<I, S>(&mut self, patterns: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let entry = self
            .entries
            .entry(EXTERNS.to_string())
            .or_insert_with(|| Flag::Externs(Vec::new()));
        if let Flag::Externs(existing) = entry {
            existing.extend(patterns.into_iter().map(Into::into));
        }
    }

    pub fn get(&self, name: &str) -> Option<&Flag> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Flag)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether both module-output flags are declared.
    pub fn is_module_mode(&self) -> bool {
        self.contains(MODULE) && self.contains(MODULE_OUTPUT_PATH_PREFIX)
    }

    /// The declared module output prefix, if any.
    pub fn module_output_prefix(&self) -> Option<String> {
        match self.get(MODULE_OUTPUT_PATH_PREFIX)? {
            Flag::Value(FlagValue::Scalar(s)) => Some(s.to_string()),
            Flag::Value(FlagValue::List(items)) => {
                Some(items.first().map(|s| s.to_string()).unwrap_or_default())
            }
            Flag::Value(FlagValue::Switch) | Flag::Externs(_) => Some(String::new()),
        }
    }
}

impl<'de> Deserialize<'de> for Scalar {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ScalarVisitor;

        impl<'de> Visitor<'de> for ScalarVisitor {
            type Value = Scalar;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a string, number or boolean")
            }

            fn visit_bool<E: de::Error>(self, v: bool) -> Result<Scalar, E> {
                Ok(Scalar::Bool(v))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Scalar, E> {
                Ok(Scalar::Int(v))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Scalar, E> {
                i64::try_from(v)
                    .map(Scalar::Int)
                    .map_err(|_| E::custom(format!("integer {} is out of range", v)))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Scalar, E> {
                Ok(Scalar::Float(v))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Scalar, E> {
                Ok(Scalar::Str(v.to_string()))
            }

            fn visit_string<E: de::Error>(self, v: String) -> Result<Scalar, E> {
                Ok(Scalar::Str(v))
            }
        }

        deserializer.deserialize_any(ScalarVisitor)
    }
}

impl<'de> Deserialize<'de> for FlagValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct FlagValueVisitor;

        impl<'de> Visitor<'de> for FlagValueVisitor {
            type Value = FlagValue;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a scalar, a list of scalars, null or an empty table")
            }

            fn visit_bool<E: de::Error>(self, v: bool) -> Result<FlagValue, E> {
                Ok(FlagValue::Scalar(Scalar::Bool(v)))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<FlagValue, E> {
                Ok(FlagValue::Scalar(Scalar::Int(v)))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<FlagValue, E> {
                i64::try_from(v)
                    .map(|i| FlagValue::Scalar(Scalar::Int(i)))
                    .map_err(|_| E::custom(format!("integer {} is out of range", v)))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<FlagValue, E> {
                Ok(FlagValue::Scalar(Scalar::Float(v)))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<FlagValue, E> {
                Ok(FlagValue::Scalar(Scalar::Str(v.to_string())))
            }

            fn visit_string<E: de::Error>(self, v: String) -> Result<FlagValue, E> {
                Ok(FlagValue::Scalar(Scalar::Str(v)))
            }

            fn visit_unit<E: de::Error>(self) -> Result<FlagValue, E> {
                Ok(FlagValue::Switch)
            }

            fn visit_none<E: de::Error>(self) -> Result<FlagValue, E> {
                Ok(FlagValue::Switch)
            }

            fn visit_some<D: Deserializer<'de>>(self, d: D) -> Result<FlagValue, D::Error> {
                FlagValue::deserialize(d)
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<FlagValue, A::Error> {
                let mut items = Vec::new();
                while let Some(item) = seq.next_element::<Scalar>()? {
                    items.push(item);
                }
                Ok(FlagValue::List(items))
            }

            // TOML has no null, so an empty table marks a switch.
            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<FlagValue, A::Error> {
                if let Some(key) = map.next_key::<String>()? {
                    return Err(de::Error::custom(format!(
                        "unexpected key '{}': a switch flag must be an empty table",
                        key
                    )));
                }
                Ok(FlagValue::Switch)
            }
        }

        deserializer.deserialize_any(FlagValueVisitor)
    }
}

impl<'de> Deserialize<'de> for CompilerFlags {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = IndexMap::<String, FlagValue>::deserialize(deserializer)?;
        let mut flags = CompilerFlags::new();
        for (name, value) in raw {
            flags.insert(name, value).map_err(de::Error::custom)?;
        }
        Ok(flags)
    }
}
