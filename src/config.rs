//! Configuration options for the land-ice setup steps.
//!
//! The simulation driver owns a [`ConfigTable`] of named, typed options
//! (usually deserialized from its namelist or a JSON file). Setup code never
//! holds on to the table globally: it borrows it through a [`ConfigBinder`]
//! passed to whatever needs it.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::mesh_error::LandIceError;

/// Restart flag; `true` skips layer-fraction renormalization.
pub const CONFIG_DO_RESTART: &str = "config_do_restart";
/// Absolute tolerance on the layer-fraction sum (default `0.001`).
pub const CONFIG_LAYER_FRACTION_TOLERANCE: &str = "config_layer_fraction_tolerance";
/// `"warn"` (flag and correct) or `"error"` (strict fail).
pub const CONFIG_LAYER_FRACTION_POLICY: &str = "config_layer_fraction_policy";
/// `"error"`, `"warn"` or `"ignore"` for cell/edge incidence mismatches.
pub const CONFIG_EDGE_SIGN_POLICY: &str = "config_edge_sign_policy";

/// A single typed option value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Logical(bool),
    Integer(i64),
    Real(f64),
    Character(String),
}

impl ConfigValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            ConfigValue::Logical(_) => "logical",
            ConfigValue::Integer(_) => "integer",
            ConfigValue::Real(_) => "real",
            ConfigValue::Character(_) => "character",
        }
    }
}

impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigValue::Logical(v) => write!(f, "{v}"),
            ConfigValue::Integer(v) => write!(f, "{v}"),
            ConfigValue::Real(v) => write!(f, "{v}"),
            ConfigValue::Character(v) => write!(f, "'{v}'"),
        }
    }
}

impl From<bool> for ConfigValue {
    fn from(v: bool) -> Self {
        ConfigValue::Logical(v)
    }
}

impl From<i64> for ConfigValue {
    fn from(v: i64) -> Self {
        ConfigValue::Integer(v)
    }
}

impl From<f64> for ConfigValue {
    fn from(v: f64) -> Self {
        ConfigValue::Real(v)
    }
}

impl From<&str> for ConfigValue {
    fn from(v: &str) -> Self {
        ConfigValue::Character(v.to_string())
    }
}

/// Name → value table owned by the simulation driver.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigTable {
    options: BTreeMap<String, ConfigValue>,
}

impl ConfigTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `name` to `value`, returning the previous value if any.
    pub fn set(&mut self, name: &str, value: impl Into<ConfigValue>) -> Option<ConfigValue> {
        self.options.insert(name.to_string(), value.into())
    }

    /// Builder-style [`set`](Self::set).
    pub fn with(mut self, name: &str, value: impl Into<ConfigValue>) -> Self {
        self.set(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&ConfigValue> {
        self.options.get(name)
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    /// Options in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ConfigValue)> {
        self.options.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Read-only handle through which setup steps query configuration.
///
/// Binding is explicit: construct one per driver and hand it to every step
/// that needs options. No mutation of the table happens through the binder.
#[derive(Clone, Copy, Debug)]
pub struct ConfigBinder<'a> {
    table: &'a ConfigTable,
}

macro_rules! typed_getter {
    ($name:ident, $name_or:ident, $variant:ident, $ty:ty, $label:literal) => {
        #[doc = concat!("The ", $label, " option `name`.")]
        pub fn $name(&self, name: &str) -> Result<$ty, LandIceError> {
            match self.lookup(name)? {
                ConfigValue::$variant(v) => Ok(v.clone()),
                other => Err(LandIceError::ConfigTypeMismatch {
                    name: name.to_string(),
                    expected: $label,
                    found: other.type_name(),
                }),
            }
        }

        #[doc = concat!("The ", $label, " option `name`, or `default` when unset.")]
        pub fn $name_or(&self, name: &str, default: $ty) -> Result<$ty, LandIceError> {
            match self.table.get(name) {
                None => Ok(default),
                Some(_) => self.$name(name),
            }
        }
    };
}

impl<'a> ConfigBinder<'a> {
    /// Bind a configuration table.
    pub fn bind(table: &'a ConfigTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &'a ConfigTable {
        self.table
    }

    fn lookup(&self, name: &str) -> Result<&'a ConfigValue, LandIceError> {
        self.table
            .get(name)
            .ok_or_else(|| LandIceError::MissingConfig(name.to_string()))
    }

    typed_getter!(logical, logical_or, Logical, bool, "logical");
    typed_getter!(integer, integer_or, Integer, i64, "integer");
    typed_getter!(character, character_or, Character, String, "character");

    /// The real option `name`. Integer values are widened.
    pub fn real(&self, name: &str) -> Result<f64, LandIceError> {
        match self.lookup(name)? {
            ConfigValue::Real(v) => Ok(*v),
            ConfigValue::Integer(v) => Ok(*v as f64),
            other => Err(LandIceError::ConfigTypeMismatch {
                name: name.to_string(),
                expected: "real",
                found: other.type_name(),
            }),
        }
    }

    /// The real option `name`, or `default` when unset.
    pub fn real_or(&self, name: &str, default: f64) -> Result<f64, LandIceError> {
        match self.table.get(name) {
            None => Ok(default),
            Some(_) => self.real(name),
        }
    }

    /// Emit every option at info level.
    pub fn log_options(&self) {
        log::info!("");
        log::info!("  Land ice configuration ({} options):", self.table.len());
        for (name, value) in self.table.iter() {
            log::info!("    {name} = {value}");
        }
        log::info!("");
    }
}
