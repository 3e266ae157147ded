//! Properties-style configuration store.
//!
//! The format is the classic one: one `key = value` (or `key: value`, or
//! `key value`) entry per line, `#` and `!` comment lines, values trimmed.
//! Typed lookups go through [`ConfigValue`]; a value that does not parse is
//! logged and treated as absent.

use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use miette::{NamedSource, SourceSpan};
use pest::Parser;
use pest::error::InputLocation;
use pest_derive::Parser;

use crate::errors::ConfigError;
use crate::log::{debug, info, warn};

#[derive(Parser)]
#[grammar = "config.pest"]
struct PropertiesParser;

/// Built-in defaults, written out by [`ConfigStore::load_or_init`].
pub const DEFAULTS: &str = include_str!("../assets/rcore.properties");

/// Key of the executor's worker thread count.
pub const EXECUTOR_POOLSIZE: &str = "rcore.executor.poolsize";
/// Key of the executor's queue capacity.
pub const EXECUTOR_QUEUE: &str = "rcore.executor.queue";
/// Key of the development-mode flag.
pub const TESTING: &str = "rcore.testing";

const STORE_HEADER: &str = "# Automatically generated configuration";

/// Ordered key/value configuration, optionally backed by a file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigStore {
    entries: IndexMap<String, String>,
    path: Option<PathBuf>,
}

impl ConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in defaults, without a backing file.
    pub fn defaults() -> Result<Self, ConfigError> {
        Self::parse(DEFAULTS, "rcore.properties")
    }

    /// Parse properties text. `name` labels the source in diagnostics.
    pub fn parse(source: &str, name: &str) -> Result<Self, ConfigError> {
        let file = PropertiesParser::parse(Rule::file, source).map_err(|e| {
            let span: SourceSpan = match e.location {
                InputLocation::Pos(pos) => (pos, 0).into(),
                InputLocation::Span((start, end)) => (start, end - start).into(),
            };
            ConfigError::Syntax {
                src: NamedSource::new(name, source.to_owned()),
                span,
                message: e.variant.message().into_owned(),
            }
        })?;

        let mut entries = IndexMap::new();
        for pair in file.flatten().filter(|p| p.as_rule() == Rule::entry) {
            let mut inner = pair.into_inner();
            let Some(key) = inner.next() else {
                continue;
            };
            let value = inner.next().map_or("", |v| v.as_str().trim());
            entries.insert(key.as_str().to_owned(), value.to_owned());
        }
        debug!(name, entries = entries.len(), "configuration parsed");

        Ok(Self { entries, path: None })
    }

    /// Read the store from `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let mut store = Self::parse(&source, &path.display().to_string())?;
        store.path = Some(path.to_owned());
        Ok(store)
    }

    /// Read the store from `path`, first creating it from [`DEFAULTS`] when
    /// it does not exist.
    pub fn load_or_init(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path.exists() {
            return Self::load(path);
        }

        let mut store = Self::defaults()?;
        store.path = Some(path.to_owned());
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
                path: parent.display().to_string(),
                source,
            })?;
        }
        store.store()?;
        info!(path = %path.display(), "configuration initialized from defaults");
        Ok(store)
    }

    /// Write all entries to the backing file.
    pub fn store(&self) -> Result<(), ConfigError> {
        let path = self.path.as_deref().ok_or(ConfigError::NoPath)?;
        fs::write(path, self.to_properties()).map_err(|source| ConfigError::Write {
            path: path.display().to_string(),
            source,
        })
    }

    /// Render the entries in properties format.
    pub fn to_properties(&self) -> String {
        let mut out = String::from(STORE_HEADER);
        out.push('\n');
        for (key, value) in &self.entries {
            out.push_str(key);
            out.push('=');
            out.push_str(value);
            out.push('\n');
        }
        out
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn set_path(&mut self, path: impl Into<PathBuf>) {
        self.path = Some(path.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.entries.shift_remove(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The value of `key` converted to `T`. Absent keys and values that do
    /// not convert yield `None`; the latter are logged.
    pub fn get_typed<T: ConfigValue>(&self, key: &str) -> Option<T> {
        let raw = self.get(key)?;
        let value = T::from_config(raw);
        if value.is_none() {
            warn!(key, raw, target_type = std::any::type_name::<T>(), "configuration value does not convert");
        }
        value
    }

    pub fn set_typed<T: ConfigValue>(&mut self, key: impl Into<String>, value: &T) {
        self.set(key, value.to_config());
    }
}

/// Scalar types readable from a [`ConfigStore`].
pub trait ConfigValue: Sized {
    fn from_config(raw: &str) -> Option<Self>;

    fn to_config(&self) -> String;
}

impl ConfigValue for String {
    fn from_config(raw: &str) -> Option<Self> {
        Some(raw.to_owned())
    }

    fn to_config(&self) -> String {
        self.clone()
    }
}

impl ConfigValue for bool {
    /// `true` in any case is true; everything else is false.
    fn from_config(raw: &str) -> Option<Self> {
        Some(raw.trim().eq_ignore_ascii_case("true"))
    }

    fn to_config(&self) -> String {
        self.to_string()
    }
}

macro_rules! parsed_config_values {
    ($($ty:ty),* $(,)?) => {
        $(
            impl ConfigValue for $ty {
                fn from_config(raw: &str) -> Option<Self> {
                    raw.trim().parse().ok()
                }

                fn to_config(&self) -> String {
                    self.to_string()
                }
            }
        )*
    };
}

parsed_config_values!(i16, i32, i64, u32, usize, f32, f64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn separators_and_comments() {
        let store = ConfigStore::parse(
            "# comment\n! also comment\n\na = 1\nb:2\n  c   three words  \nempty\nd = x = y\r\n",
            "test",
        )
        .unwrap();
        let entries: Vec<_> = store.keys().map(|k| (k, store.get(k).unwrap())).collect();
        assert_eq!(
            entries,
            [("a", "1"), ("b", "2"), ("c", "three words"), ("empty", ""), ("d", "x = y")]
        );
    }

    #[test]
    fn syntax_error_points_at_offending_line() {
        let err = ConfigStore::parse("a = 1\n= orphan\n", "broken.properties").unwrap_err();
        match err {
            ConfigError::Syntax { span, .. } => assert_eq!(span.offset(), 6),
            other => panic!("expected a syntax error, got {other:?}"),
        }
    }

    #[test]
    fn defaults_parse() {
        let store = ConfigStore::defaults().unwrap();
        assert_eq!(store.get_typed::<usize>(EXECUTOR_POOLSIZE), Some(2));
        assert_eq!(store.get_typed::<usize>(EXECUTOR_QUEUE), Some(64));
        assert_eq!(store.get_typed::<bool>(TESTING), Some(false));
        assert!(store.path().is_none());
    }

    #[test]
    fn typed_lookup() {
        let mut store = ConfigStore::new();
        store.set("n", " 42 ");
        store.set("f", "2.5");
        store.set("flag", "TRUE");
        store.set("junk", "many");

        assert_eq!(store.get_typed::<i32>("n"), Some(42));
        assert_eq!(store.get_typed::<i16>("n"), Some(42));
        assert_eq!(store.get_typed::<f64>("f"), Some(2.5));
        assert_eq!(store.get_typed::<bool>("flag"), Some(true));
        assert_eq!(store.get_typed::<bool>("junk"), Some(false));
        assert_eq!(store.get_typed::<u32>("junk"), None);
        assert_eq!(store.get_typed::<String>("missing"), None);

        store.set_typed("n", &7_i64);
        assert_eq!(store.get("n"), Some("7"));
    }

    #[test]
    fn store_without_path_fails() {
        assert!(matches!(ConfigStore::new().store(), Err(ConfigError::NoPath)));
    }

    #[test]
    fn load_or_init_writes_defaults_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("rcore.properties");

        let mut first = ConfigStore::load_or_init(&path).unwrap();
        assert!(path.exists());
        assert_eq!(first.get(EXECUTOR_QUEUE), Some("64"));

        first.set(EXECUTOR_QUEUE, "8");
        first.store().unwrap();

        let second = ConfigStore::load_or_init(&path).unwrap();
        assert_eq!(second.get(EXECUTOR_QUEUE), Some("8"));
        assert_eq!(second.path(), Some(path.as_path()));

        let written = fs::read_to_string(&path).unwrap();
        insta::assert_snapshot!(written, @r"
        # Automatically generated configuration
        rcore.executor.poolsize=2
        rcore.executor.queue=8
        rcore.testing=false
        ");
    }
}
