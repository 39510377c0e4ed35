//! Commandline flag store with `-noX` negation and TOML config layering.
//!
//! Tokens of the form `-name`, `-name=value`, `--name` or `--name=value`
//! are collected into a [`Store`], keyed by their canonical `-name`
//! form. Values stay strings until read through one of the typed
//! accessors:
//!
//! ```
//! let store = argmap::build(["-daemon", "--rpcport=8332", "-nolisten"]);
//!
//! assert!(store.get_bool("-daemon", false));
//! assert!(!store.get_bool("-listen", true));
//! assert_eq!(store.get_int("-rpcport", 0), 8332);
//! assert_eq!(store.get_string("-datadir", "/tmp"), "/tmp");
//! ```
mod error;
mod parser;
mod value;

pub use error::{Error, Result};
pub use stoml::{Table, Value};
pub use value::ArgValue;

use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use tracing::debug;

/// Build a [`Store`] from tokens (program name excluded)
pub fn build<I, S>(args: I) -> Store
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    parser::parse(args)
}

/// The `-noX` form of a flag name (`-BRD` -> `-noBRD`)
pub fn negated_name(name: &str) -> String {
    format!("-no{}", name.strip_prefix('-').unwrap_or(name))
}

/// Resolve a boolean flag from its positive and negated entries
///
/// The positive entry always wins when present, regardless of which
/// came later on the command line. The negated entry is only consulted
/// when the positive one is absent.
pub fn resolve_bool(
    positive: Option<&ArgValue>,
    negated: Option<&ArgValue>,
    default: bool,
) -> bool {
    match (positive, negated) {
        (Some(v), _) => v.as_bool(),
        (None, Some(v)) => !v.as_bool(),
        (None, None) => default,
    }
}

/// Parsed command-line flags
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Store {
    /// Last value seen per flag name
    values: BTreeMap<String, ArgValue>,
    /// Every value seen per flag name, in order
    multi: BTreeMap<String, Vec<ArgValue>>,
    /// Arguments from the first non-flag token onwards
    pub(crate) trailing: Vec<String>,
}

impl Store {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse flags from tokens (program name excluded)
    pub fn parse<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        parser::parse(args)
    }

    /// Parse flags from a full argv, dropping the program name
    pub fn from_argv<I, S>(argv: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        parser::parse(argv.into_iter().skip(1))
    }

    /// Parse flags from the process command line
    pub fn from_env() -> Self {
        Self::from_argv(env::args())
    }

    pub(crate) fn insert(&mut self, name: String, value: ArgValue) {
        self.multi
            .entry(name.clone())
            .or_default()
            .push(value.clone());
        self.values.insert(name, value);
    }

    /// Set a flag only if neither it nor its `-noX` form is present
    ///
    /// Returns true if the value was inserted.
    pub fn soft_set_arg(&mut self, name: &str, value: impl Into<ArgValue>) -> bool {
        if self.values.contains_key(name) || self.values.contains_key(&negated_name(name)) {
            debug!("Not soft-setting {}, already given on the command line", name);
            return false;
        }
        self.insert(name.to_string(), value.into());
        true
    }

    /// Set a boolean flag (`"1"`/`"0"`) only if it is not already given
    pub fn soft_set_bool_arg(&mut self, name: &str, value: bool) -> bool {
        self.soft_set_arg(name, value)
    }

    /// Layer a TOML table underneath the command line
    ///
    /// Keys become `-key` (nested tables as `-section.key`). Entries
    /// already given on the command line, directly or as `-noX`, are
    /// left untouched.
    pub fn with_toml(mut self, table: &Table) -> Self {
        self.merge_toml(table, "");
        self
    }

    /// Layer a TOML file underneath the command line
    pub fn with_toml_file<P: AsRef<Path>>(self, path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Err(e) = fs::metadata(path) {
            if e.kind() == ErrorKind::NotFound {
                return Err(Error::MissingConfig {
                    path: path.display().to_string(),
                });
            }
            return Err(e.into());
        }
        debug!("Loading config file {}", path.display());
        let table = stoml::parse_file(path)?;
        Ok(self.with_toml(&table))
    }

    /// Layer a TOML file if it exists (does not error if missing)
    pub fn with_toml_file_optional<P: AsRef<Path>>(self, path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            debug!("No config file at {}, skipping", path.display());
            return Ok(self);
        }
        self.with_toml_file(path)
    }

    fn merge_toml(&mut self, table: &Table, prefix: &str) {
        for (key, value) in table.iter() {
            let full_key = if prefix.is_empty() {
                key.to_string()
            } else {
                format!("{}.{}", prefix, key)
            };

            // Recursively handle nested tables
            if let Some(inner) = value.as_table() {
                self.merge_toml(inner, &full_key);
                continue;
            }

            let name = format!("-{}", full_key);
            if self.values.contains_key(&name)
                || self.values.contains_key(&negated_name(&name))
            {
                debug!("Config key {} already set on the command line", name);
                continue;
            }

            match value.as_array() {
                Some(items) => {
                    for item in items.iter() {
                        self.insert(name.clone(), toml_to_arg(item));
                    }
                }
                None => self.insert(name, toml_to_arg(value)),
            }
        }
    }

    /// Boolean flag with `-noX` negation
    ///
    /// `-X` reads as its value (only `0` is false); otherwise `-noX`
    /// reads as the inverse of its value; otherwise `default`.
    pub fn get_bool(&self, name: &str, default: bool) -> bool {
        resolve_bool(
            self.values.get(name),
            self.values.get(&negated_name(name)),
            default,
        )
    }

    /// String flag, verbatim. Negation does not apply.
    pub fn get_string(&self, name: &str, default: &str) -> String {
        self.values
            .get(name)
            .map(|v| v.as_str().to_string())
            .unwrap_or_else(|| default.to_string())
    }

    /// Integer flag
    ///
    /// `default` is only used when the flag is absent; a present value
    /// that is not a number reads as 0.
    pub fn get_int(&self, name: &str, default: i64) -> i64 {
        self.values.get(name).map_or(default, ArgValue::as_int)
    }

    /// Check if a flag was provided
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Get the last value given for a flag
    pub fn get(&self, name: &str) -> Option<&ArgValue> {
        self.values.get(name)
    }

    /// Every value given for a flag, in command-line order
    pub fn get_all(&self, name: &str) -> Vec<&str> {
        self.get_all_values(name)
            .iter()
            .map(ArgValue::as_str)
            .collect()
    }

    /// Every raw value given for a flag, in command-line order
    pub fn get_all_values(&self, name: &str) -> &[ArgValue] {
        self.multi.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Arguments from the first non-flag token onwards
    pub fn trailing(&self) -> &[String] {
        &self.trailing
    }

    /// Iterate over flags and their last values, sorted by name
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ArgValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of distinct flag names
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if no flags were given
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

fn toml_to_arg(value: &Value) -> ArgValue {
    match value {
        Value::String(s) => ArgValue::Given(s.clone()),
        Value::Boolean(b) => ArgValue::from(*b),
        Value::Integer(n) => ArgValue::from(*n),
        other => ArgValue::Given(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Write;

    use tempfile::NamedTempFile;

    fn fixture(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn negated_name_strips_one_dash() {
        assert_eq!(negated_name("-BRD"), "-noBRD");
        assert_eq!(negated_name("BRD"), "-noBRD");
    }

    #[test]
    fn resolve_positive_wins() {
        let one = ArgValue::from("1");
        let zero = ArgValue::from("0");
        assert!(resolve_bool(Some(&one), Some(&one), false));
        assert!(!resolve_bool(Some(&zero), Some(&zero), true));
        assert!(resolve_bool(Some(&ArgValue::Bare), Some(&ArgValue::Bare), false));
    }

    #[test]
    fn resolve_negated_and_default() {
        assert!(!resolve_bool(None, Some(&ArgValue::Bare), true));
        assert!(resolve_bool(None, Some(&ArgValue::from("0")), false));
        assert!(resolve_bool(None, None, true));
        assert!(!resolve_bool(None, None, false));
    }

    #[test]
    fn from_argv_drops_program_name() {
        let store = Store::from_argv(["bitcoind", "-daemon"]);
        assert_eq!(store.len(), 1);
        assert!(store.get_bool("-daemon", false));
        assert!(!store.contains("-bitcoind"));
    }

    #[test]
    fn soft_set_keeps_existing() {
        let mut store = build(["-port=1"]);
        assert!(!store.soft_set_arg("-port", "2"));
        assert_eq!(store.get_int("-port", 0), 1);

        assert!(store.soft_set_arg("-host", "localhost"));
        assert_eq!(store.get_string("-host", ""), "localhost");

        assert!(store.soft_set_bool_arg("-listen", false));
        assert!(!store.get_bool("-listen", true));
        assert!(!store.soft_set_bool_arg("-listen", true));
        assert_eq!(store.get_all("-listen"), vec!["0"]);
    }

    #[test]
    fn iter_sorted_by_name() {
        let store = build(["-zeta", "-alpha=1", "-mid=x"]);
        let names: Vec<&str> = store.iter().map(|(k, _)| k).collect();
        assert_eq!(names, vec!["-alpha", "-mid", "-zeta"]);
    }

    #[test]
    fn toml_layers_under_command_line() {
        let file = fixture(
            "port = 9000\nverbose = true\nname = \"node\"\n\n[server]\nhost = \"0.0.0.0\"\nworkers = 4\n",
        );
        let store = build(["-port=8080"]).with_toml_file(file.path()).unwrap();

        assert_eq!(store.get_int("-port", 0), 8080);
        assert!(store.get_bool("-verbose", false));
        assert_eq!(store.get_string("-name", ""), "node");
        assert_eq!(store.get_string("-server.host", ""), "0.0.0.0");
        assert_eq!(store.get_int("-server.workers", 0), 4);
    }

    #[test]
    fn toml_respects_command_line_negation() {
        let file = fixture("listen = true\nupnp = false\n");
        let store = build(["-nolisten"]).with_toml_file(file.path()).unwrap();

        assert!(!store.contains("-listen"));
        assert!(!store.get_bool("-listen", true));
        assert!(!store.get_bool("-upnp", true));
    }

    #[test]
    fn toml_arrays_fill_multi_values() {
        let file = fixture("connect = [\"a\", \"b\", \"c\"]\n");
        let store = Store::new().with_toml_file(file.path()).unwrap();

        assert_eq!(store.get_all("-connect"), vec!["a", "b", "c"]);
        assert_eq!(store.get_string("-connect", ""), "c");
    }

    #[test]
    fn soft_set_respects_negation() {
        let mut store = build(["-nolisten"]);
        assert!(!store.soft_set_bool_arg("-listen", true));
        assert!(!store.contains("-listen"));
        assert!(!store.get_bool("-listen", true));

        // -nolisten=0 asks for listening; a soft default must not undo it
        let mut store = build(["-connect=a", "-nolisten=0"]);
        assert!(!store.soft_set_bool_arg("-listen", false));
        assert!(store.get_bool("-listen", false));

        assert!(!store.soft_set_arg("-connect", "b"));
        assert_eq!(store.get_all("-connect"), vec!["a"]);
    }

    #[test]
    fn toml_scalar_rendering() {
        let file = fixture("ratio = 2.5
ports = [8333, 18333]
matrix = [[1, 2], [3]]
");
        let store = Store::new().with_toml_file(file.path()).unwrap();

        assert!(store.get_string("-ratio", "").starts_with("2.5"));
        assert_eq!(store.get_int("-ratio", 0), 2);
        assert_eq!(store.get_all("-ports"), vec!["8333", "18333"]);
        assert_eq!(store.get_int("-ports", 0), 18333);

        let rows = store.get_all("-matrix");
        assert_eq!(rows.len(), 2);
        assert!(rows[0].contains('1') && rows[0].contains('2'));
        assert!(rows[1].contains('3'));
    }

    #[test]
    fn malformed_toml_file() {
        let file = fixture("port = = 1\n[server\n");
        let err = build(["-a"]).with_toml_file(file.path()).unwrap_err();
        assert!(matches!(err, Error::Toml(_)));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn unreadable_toml_path() {
        let err = Store::new().with_toml_file("bad\0path.toml").unwrap_err();
        assert!(matches!(err, Error::Io(_)));
        assert!(!err.is_missing_config());
    }

    #[test]
    fn missing_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.toml");
        let err = Store::new().with_toml_file(&path).unwrap_err();
        assert!(err.is_missing_config());

        let store = build(["-a"]).with_toml_file_optional(&path).unwrap();
        assert_eq!(store, build(["-a"]));
    }
}
