//! Reading config files into a [`ProjectConfig`].
//!
//! YAML is parsed with `yaml-rust2` and bridged to a JSON tree so both formats
//! share one set of serde impls.

use std::future::Future;
use std::path::{Path, PathBuf};

use serde_json::{Map, Number, Value};
use yaml_rust2::yaml::Hash;
use yaml_rust2::{Yaml, YamlEmitter, YamlLoader};

use crate::error::{ConfigError, SyntaxError};
use crate::types::ProjectConfig;

/// The trait for loading configuration data.
pub trait Loader {
    /// Loads the configuration data.
    fn load(&self) -> impl Future<Output = Result<ProjectConfig, ConfigError>> + Send;
}

/// A [`Loader`] that reads a config file, picking the format from its extension.
///
/// Supports `.json`, `.yml` and `.yaml`.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn name(&self) -> String {
        self.path.display().to_string()
    }
}

impl Loader for FileStore {
    async fn load(&self) -> Result<ProjectConfig, ConfigError> {
        let extension = self.path.extension().and_then(|ext| ext.to_str());
        if !matches!(extension, Some("json" | "yml" | "yaml")) {
            return Err(ConfigError::UnsupportedFormat {
                path: self.path.clone(),
            });
        }

        let source = std::fs::read_to_string(&self.path).map_err(|source| ConfigError::Io {
            path: self.path.clone(),
            source,
        })?;

        tracing::debug!(path = %self.path.display(), bytes = source.len(), "loading config");

        match extension {
            Some("json") => parse_json_named(&self.name(), &source),
            _ => parse_yaml_named(&self.name(), &source),
        }
    }
}

/// Parse a JSON config document.
pub fn parse_json(source: &str) -> Result<ProjectConfig, ConfigError> {
    parse_json_named("config.json", source)
}

/// Parse a YAML config document. Only the first document of a stream is used.
pub fn parse_yaml(source: &str) -> Result<ProjectConfig, ConfigError> {
    parse_yaml_named("config.yml", source)
}

fn parse_json_named(name: &str, source: &str) -> Result<ProjectConfig, ConfigError> {
    serde_json::from_str(source).map_err(|err| {
        if err.is_syntax() || err.is_eof() {
            SyntaxError::at(name, source, err.line(), err.column(), err.to_string()).into()
        } else {
            ConfigError::Shape(err)
        }
    })
}

fn parse_yaml_named(name: &str, source: &str) -> Result<ProjectConfig, ConfigError> {
    let documents = YamlLoader::load_from_str(source).map_err(|err| {
        let marker = err.marker();
        SyntaxError::at(
            name,
            source,
            marker.line(),
            marker.col() + 1,
            err.info().to_owned(),
        )
    })?;

    let document = documents.into_iter().next().unwrap_or(Yaml::Null);
    let tree = yaml_to_json(document)?;
    Ok(serde_json::from_value(tree)?)
}

/// Render a config as YAML.
pub fn to_yaml(config: &ProjectConfig) -> Result<String, ConfigError> {
    let tree = serde_json::to_value(config)?;
    let yaml = json_to_yaml(tree);

    let mut out = String::new();
    YamlEmitter::new(&mut out)
        .dump(&yaml)
        .map_err(|e| ConfigError::Emit(e.to_string()))?;
    out.push('\n');
    Ok(out)
}

fn yaml_to_json(yaml: Yaml) -> Result<Value, ConfigError> {
    Ok(match yaml {
        Yaml::Null => Value::Null,
        Yaml::Boolean(b) => Value::Bool(b),
        Yaml::Integer(i) => Value::Number(i.into()),
        Yaml::Real(text) => text
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number)
            // `.nan`/`.inf` have no JSON form; keep the literal.
            .unwrap_or(Value::String(text)),
        Yaml::String(s) => Value::String(s),
        Yaml::Array(items) => Value::Array(
            items
                .into_iter()
                .map(yaml_to_json)
                .collect::<Result<_, _>>()?,
        ),
        Yaml::Hash(hash) => {
            let mut map = Map::with_capacity(hash.len());
            for (key, value) in hash {
                map.insert(yaml_key(key)?, yaml_to_json(value)?);
            }
            Value::Object(map)
        }
        Yaml::Alias(_) => {
            return Err(ConfigError::UnsupportedYaml("aliases".to_owned()));
        }
        Yaml::BadValue => {
            return Err(ConfigError::UnsupportedYaml("invalid value".to_owned()));
        }
    })
}

fn yaml_key(key: Yaml) -> Result<String, ConfigError> {
    match key {
        Yaml::String(s) | Yaml::Real(s) => Ok(s),
        Yaml::Integer(i) => Ok(i.to_string()),
        Yaml::Boolean(b) => Ok(b.to_string()),
        Yaml::Null => Ok("null".to_owned()),
        other => Err(ConfigError::UnsupportedYaml(format!(
            "non-scalar mapping key {other:?}"
        ))),
    }
}

fn json_to_yaml(value: Value) -> Yaml {
    match value {
        Value::Null => Yaml::Null,
        Value::Bool(b) => Yaml::Boolean(b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => Yaml::Integer(i),
            None => Yaml::Real(n.to_string()),
        },
        Value::String(s) => Yaml::String(s),
        Value::Array(items) => Yaml::Array(items.into_iter().map(json_to_yaml).collect()),
        Value::Object(map) => {
            let mut hash = Hash::new();
            for (key, value) in map {
                hash.insert(Yaml::String(key), json_to_yaml(value));
            }
            Yaml::Hash(hash)
        }
    }
}
