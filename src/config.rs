// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Module argument and return layout.
//!
//! Specify the layout of the JSON documents exchanged with the automation
//! host to simplify the process of serialization and deserialization. File
//! I/O is left to the caller to figure out.
//!
//! # Module Arguments
//!
//! The host hands over a JSON object holding two required string
//! parameters: `content` and `path`. The object may also arrive wrapped in an
//! `ANSIBLE_MODULE_ARGS` envelope. Keys starting with `_ansible_` belong to
//! the host itself, and are ignored except for `_ansible_check_mode`, which
//! switches on check mode. Any other key is rejected, whether it sits inside
//! the envelope or next to it.
//!
//! # Module Return
//!
//! A single JSON object is handed back. Successful runs report `changed` and
//! `is_ok`. Failed runs report `failed`, `changed`, and a `msg` describing
//! what went wrong.

use crate::sync::{SyncRequest, SyncResult};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{
    collections::BTreeMap,
    fmt::{Display, Error as FmtError, Formatter, Result as FmtResult},
    path::PathBuf,
    str::FromStr,
};

/// Parameters a caller may supply.
pub const SUPPORTED_PARAMETERS: [&str; 2] = ["content", "path"];

const ENVELOPE_KEY: &str = "ANSIBLE_MODULE_ARGS";
const INTERNAL_PREFIX: &str = "_ansible_";

/// Module arguments layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleArgs {
    /// Exact content of the target file.
    pub content: String,

    /// Path to the target file.
    pub path: PathBuf,

    /// Host requested a dry run.
    pub check_mode: bool,
}

impl FromStr for ModuleArgs {
    type Err = ConfigError;

    fn from_str(data: &str) -> Result<Self, Self::Err> {
        let Value::Object(mut object) = serde_json::from_str::<Value>(data)? else {
            return Err(ConfigError::NotAnObject);
        };

        // INVARIANT: Only host-internal keys may sit next to the envelope.
        if let Some(inner) = object.remove(ENVELOPE_KEY) {
            let unsupported = unsupported_keys(object.keys());
            if !unsupported.is_empty() {
                return Err(ConfigError::Unsupported(unsupported));
            }

            object = match inner {
                Value::Object(inner) => inner,
                _ => return Err(ConfigError::NotAnObject),
            };
        }

        let raw: RawModuleArgs = serde_json::from_value(Value::Object(object))?;

        let unsupported = unsupported_keys(raw.rest.keys());
        if !unsupported.is_empty() {
            return Err(ConfigError::Unsupported(unsupported));
        }

        match (
            into_text("content", raw.content)?,
            into_text("path", raw.path)?,
        ) {
            (Some(content), Some(path)) => Ok(Self {
                content,
                path: PathBuf::from(path),
                check_mode: raw.check_mode,
            }),
            (content, path) => {
                let mut missing = Vec::new();
                if content.is_none() {
                    missing.push("content".into());
                }
                if path.is_none() {
                    missing.push("path".into());
                }
                Err(ConfigError::MissingRequired(missing))
            }
        }
    }
}

impl From<ModuleArgs> for SyncRequest {
    fn from(args: ModuleArgs) -> Self {
        SyncRequest::new(args.path, args.content).check_mode(args.check_mode)
    }
}

#[derive(Debug, Deserialize)]
struct RawModuleArgs {
    content: Option<Value>,
    path: Option<Value>,

    #[serde(rename = "_ansible_check_mode", default)]
    check_mode: bool,

    #[serde(flatten)]
    rest: BTreeMap<String, Value>,
}

fn unsupported_keys<'a>(keys: impl IntoIterator<Item = &'a String>) -> Vec<String> {
    keys.into_iter()
        .filter(|key| !key.starts_with(INTERNAL_PREFIX))
        .cloned()
        .collect()
}

/// Convert string parameter value into text.
///
/// Numbers keep their exact JSON text. Booleans are rendered as `True` and
/// `False`, matching what the host hands to modules for `type: str`
/// parameters. A `null` counts as not supplied.
fn into_text(name: &str, value: Option<Value>) -> Result<Option<String>> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(string)) => Ok(Some(string)),
        Some(Value::Number(number)) => Ok(Some(number.to_string())),
        Some(Value::Bool(true)) => Ok(Some("True".into())),
        Some(Value::Bool(false)) => Ok(Some("False".into())),
        Some(Value::Array(_) | Value::Object(_)) => Err(ConfigError::InvalidType(name.into())),
    }
}

/// Module return layout.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum ModuleReturn {
    /// Module failed outright.
    Fail {
        failed: bool,
        changed: bool,
        msg: String,
    },

    /// Module ran to completion.
    Exit { changed: bool, is_ok: bool },
}

impl ModuleReturn {
    /// Construct failed return with message.
    pub fn fail(msg: impl Into<String>) -> Self {
        Self::Fail {
            failed: true,
            changed: false,
            msg: msg.into(),
        }
    }

    /// Check if return reports failure.
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Fail { failed: true, .. })
    }
}

impl From<SyncResult> for ModuleReturn {
    fn from(result: SyncResult) -> Self {
        Self::Exit {
            changed: result.changed,
            is_ok: result.success,
        }
    }
}

impl Display for ModuleReturn {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        fmt.write_str(
            serde_json::to_string(self)
                .map_err(ConfigError::Json)?
                .as_str(),
        )
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to deserialize or serialize JSON.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Module arguments are not a JSON object.
    #[error("module arguments must be a JSON object")]
    NotAnObject,

    /// Required parameters were not supplied.
    #[error("missing required arguments: {}", .0.join(", "))]
    MissingRequired(Vec<String>),

    /// Parameter is a list or a dictionary instead of a string.
    #[error("argument {0} must be a string, number, or boolean")]
    InvalidType(String),

    /// Unknown parameters were supplied.
    #[error(
        "unsupported parameters: {}; supported parameters include: {}",
        .0.join(", "),
        SUPPORTED_PARAMETERS.join(", ")
    )]
    Unsupported(Vec<String>),
}

impl From<ConfigError> for FmtError {
    fn from(_: ConfigError) -> Self {
        FmtError
    }
}

/// Friendly result alias :3
type Result<T, E = ConfigError> = std::result::Result<T, E>;
