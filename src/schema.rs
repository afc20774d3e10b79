// harborctl - CLI for the Harbor container registry API
// Copyright (C) 2026 harborctl contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Self-describing serialization of command results.
//!
//! A [`SchemaEnvelope`] wraps the plain-JSON projection of a result with
//! just enough type identity (`module` + `type`) to deserialize it back into
//! the original typed model later. The decode side is a closed registry of
//! known output types, built once and immutable afterwards; it is not a
//! general dynamic-typing mechanism.

use crate::models::{
    self, ApiModel, Artifact, Project, Registry, Repository, SystemInfo, UserResp,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::{fs, io};
use thiserror::Error;

pub const SCHEMA_VERSION: &str = "1.0.0";

/// Wire format: `{version, type, module, data}`. `data` is byte-identical to
/// the plain `json` output of the same result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaEnvelope {
    pub version: String,
    #[serde(rename = "type")]
    pub type_name: String,
    pub module: String,
    pub data: Value,
}

impl SchemaEnvelope {
    pub fn new(type_name: &str, data: Value) -> Self {
        Self {
            version: SCHEMA_VERSION.to_string(),
            type_name: type_name.to_string(),
            module: models::MODULE.to_string(),
            data,
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, SchemaError> {
        let contents = fs::read_to_string(path).map_err(|source| SchemaError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&contents).map_err(|source| SchemaError::Malformed {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("reading schema file {path}: {source}")]
    Read {
        path: PathBuf,
        source: io::Error,
    },
    #[error("schema file {path} is not a valid envelope: {source}")]
    Malformed {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("no decoder registered for {module}.{type_name}")]
    UnknownType { module: String, type_name: String },
    #[error("unsupported schema version {version} (supported: {SCHEMA_VERSION})")]
    Version { version: String },
    #[error("data does not validate as {type_name}: {source}")]
    Payload {
        type_name: &'static str,
        source: serde_json::Error,
    },
}

/// A successfully decoded envelope payload.
#[derive(Debug)]
pub struct Decoded {
    pub type_name: String,
    pub items: Vec<Box<dyn ApiModel>>,
    /// Whether the payload was a single instance rather than a sequence.
    pub single: bool,
}

type DecodeFn = fn(&Value) -> Result<(Vec<Box<dyn ApiModel>>, bool), SchemaError>;

fn short_type_name<T>() -> &'static str {
    let full = std::any::type_name::<T>();
    full.rsplit("::").next().unwrap_or(full)
}

fn decode_as<T>(data: &Value) -> Result<(Vec<Box<dyn ApiModel>>, bool), SchemaError>
where
    T: ApiModel + DeserializeOwned + 'static,
{
    let payload_err = |source| SchemaError::Payload {
        type_name: short_type_name::<T>(),
        source,
    };
    match data {
        Value::Array(elements) => {
            let mut items: Vec<Box<dyn ApiModel>> = Vec::with_capacity(elements.len());
            for element in elements {
                let item: T = serde_json::from_value(element.clone()).map_err(payload_err)?;
                items.push(Box::new(item));
            }
            Ok((items, false))
        }
        other => {
            let item: T = serde_json::from_value(other.clone()).map_err(payload_err)?;
            Ok((vec![Box::new(item)], true))
        }
    }
}

/// Closed map from `(module, type)` to a decode function.
pub struct DecodeRegistry {
    entries: HashMap<String, DecodeFn>,
}

fn registry_key(module: &str, type_name: &str) -> String {
    format!("{module}:{type_name}")
}

impl DecodeRegistry {
    fn new() -> Self {
        let mut entries: HashMap<String, DecodeFn> = HashMap::new();
        let mut register = |type_name: &str, func: DecodeFn| {
            entries.insert(registry_key(models::MODULE, type_name), func);
        };
        register("Project", decode_as::<Project>);
        register("Repository", decode_as::<Repository>);
        register("Artifact", decode_as::<Artifact>);
        register("Registry", decode_as::<Registry>);
        register("UserResp", decode_as::<UserResp>);
        register("SystemInfo", decode_as::<SystemInfo>);
        Self { entries }
    }

    pub fn global() -> &'static Self {
        static REGISTRY: OnceLock<DecodeRegistry> = OnceLock::new();
        REGISTRY.get_or_init(DecodeRegistry::new)
    }

    pub fn decode(&self, envelope: &SchemaEnvelope) -> Result<Decoded, SchemaError> {
        if !version_compatible(&envelope.version) {
            return Err(SchemaError::Version {
                version: envelope.version.clone(),
            });
        }
        let func = self
            .entries
            .get(&registry_key(&envelope.module, &envelope.type_name))
            .ok_or_else(|| SchemaError::UnknownType {
                module: envelope.module.clone(),
                type_name: envelope.type_name.clone(),
            })?;
        let (items, single) = func(&envelope.data)?;
        Ok(Decoded {
            type_name: envelope.type_name.clone(),
            items,
            single,
        })
    }
}

/// Accept any envelope whose major version matches ours.
fn version_compatible(version: &str) -> bool {
    let major = |v: &str| v.split('.').next().map(str::to_string);
    major(version) == major(SCHEMA_VERSION)
}
