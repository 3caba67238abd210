use std::collections::BTreeMap;
use std::env;
use std::fmt;

use dotenv::dotenv;
use serde::{Deserialize, Serialize};

/// Value of an engine option, addressed by its string name.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum OptionValue {
    Bool(bool),
    Int(i64),
    Double(f64),
    String(String),
}

/// Type of an engine option as declared by the engine itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    Bool,
    Int,
    Double,
    String,
}

impl fmt::Display for OptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OptionKind::Bool => "bool",
            OptionKind::Int => "int",
            OptionKind::Double => "double",
            OptionKind::String => "string",
        };
        f.write_str(name)
    }
}

impl OptionValue {
    pub fn kind(&self) -> OptionKind {
        match self {
            OptionValue::Bool(_) => OptionKind::Bool,
            OptionValue::Int(_) => OptionKind::Int,
            OptionValue::Double(_) => OptionKind::Double,
            OptionValue::String(_) => OptionKind::String,
        }
    }

    /// Convert to the option's declared kind. Integers widen to doubles;
    /// every other mismatch is rejected.
    pub fn coerce(&self, kind: OptionKind) -> Option<OptionValue> {
        match (self, kind) {
            (OptionValue::Int(v), OptionKind::Double) => Some(OptionValue::Double(*v as f64)),
            (value, kind) if value.kind() == kind => Some(value.clone()),
            _ => None,
        }
    }
}

impl From<bool> for OptionValue {
    fn from(value: bool) -> Self {
        OptionValue::Bool(value)
    }
}

impl From<i64> for OptionValue {
    fn from(value: i64) -> Self {
        OptionValue::Int(value)
    }
}

impl From<i32> for OptionValue {
    fn from(value: i32) -> Self {
        OptionValue::Int(value.into())
    }
}

impl From<f64> for OptionValue {
    fn from(value: f64) -> Self {
        OptionValue::Double(value)
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        OptionValue::String(value.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(value: String) -> Self {
        OptionValue::String(value)
    }
}

/// Per-instance engine configuration, applied when a solver is created.
///
/// The engine's log sink is part of this: nothing is written to the terminal
/// unless `output_flag` and `log_to_console` are both enabled.
#[derive(Debug, Clone, PartialEq)]
pub struct SolverConfig {
    pub output_flag: bool,
    pub log_to_console: bool,
    pub log_file: Option<String>,
    pub options: BTreeMap<String, OptionValue>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            output_flag: false,
            log_to_console: false,
            log_file: None,
            options: BTreeMap::new(),
        }
    }
}

impl SolverConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read configuration from the environment (and a `.env` file if present).
    ///
    /// Recognised variables: `HIGHS_OUTPUT_FLAG`, `HIGHS_LOG_TO_CONSOLE`,
    /// `HIGHS_LOG_FILE`, `HIGHS_TIME_LIMIT`, `HIGHS_THREADS`, `HIGHS_PRESOLVE`.
    /// Values that fail to parse are ignored.
    pub fn from_env() -> Self {
        dotenv().ok();
        let mut config = SolverConfig::default();

        if let Some(flag) = env_parse::<bool>("HIGHS_OUTPUT_FLAG") {
            config.output_flag = flag;
        }
        if let Some(flag) = env_parse::<bool>("HIGHS_LOG_TO_CONSOLE") {
            config.log_to_console = flag;
        }
        if let Ok(path) = env::var("HIGHS_LOG_FILE") {
            config.log_file = Some(path);
        }
        if let Some(seconds) = env_parse::<f64>("HIGHS_TIME_LIMIT") {
            config = config.with_option("time_limit", seconds);
        }
        if let Some(threads) = env_parse::<i64>("HIGHS_THREADS") {
            config = config.with_option("threads", threads);
        }
        if let Ok(presolve) = env::var("HIGHS_PRESOLVE") {
            config = config.with_option("presolve", presolve);
        }

        config
    }

    pub fn with_output_flag(mut self, enabled: bool) -> Self {
        self.output_flag = enabled;
        self
    }

    pub fn with_log_to_console(mut self, enabled: bool) -> Self {
        self.log_to_console = enabled;
        self
    }

    pub fn with_log_file(mut self, path: impl Into<String>) -> Self {
        self.log_file = Some(path.into());
        self
    }

    pub fn with_option(mut self, name: impl Into<String>, value: impl Into<OptionValue>) -> Self {
        self.options.insert(name.into(), value.into());
        self
    }

    /// Options in the order they are handed to the engine: the log sink first.
    pub fn to_options(&self) -> Vec<(String, OptionValue)> {
        let mut options = vec![
            ("output_flag".to_string(), OptionValue::Bool(self.output_flag)),
            (
                "log_to_console".to_string(),
                OptionValue::Bool(self.log_to_console),
            ),
        ];
        if let Some(path) = &self.log_file {
            options.push(("log_file".to_string(), OptionValue::String(path.clone())));
        }
        options.extend(
            self.options
                .iter()
                .map(|(name, value)| (name.clone(), value.clone())),
        );
        options
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse::<T>().ok())
}

/// Options for a single solve call.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SolveOptions {
    /// Return normally for any terminal status; the caller inspects `status()`.
    #[serde(default)]
    pub allow_non_optimal: bool,
}

impl SolveOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allow_non_optimal(mut self) -> Self {
        self.allow_non_optimal = true;
        self
    }
}

/// Layout of a written solution report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SolutionStyle {
    #[default]
    Raw,
    Pretty,
}
