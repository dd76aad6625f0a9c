// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Host invocation boundary.
//!
//! The automation host runs contentsync as a standalone executable. It writes
//! the module arguments into a JSON file, passes the path of that file as the
//! only command-line argument, and reads back a single JSON object from
//! standard output. Everything the host needs to know, including failures,
//! travels through that returned object.

use crate::{
    config::{ConfigError, ModuleArgs, ModuleReturn},
    sync::{FileContentSync, SyncError},
};

use std::{
    error::Error as StdError,
    fs::read_to_string,
    path::{Path, PathBuf},
};
use tracing::{debug, instrument};

/// Execute module against arguments file supplied by host.
///
/// Never fails. Any error is folded into a failed [`ModuleReturn`] whose
/// message carries the full error chain.
pub fn execute(syncer: &FileContentSync, args_path: impl AsRef<Path>) -> ModuleReturn {
    try_execute(syncer, args_path).unwrap_or_else(|err| ModuleReturn::fail(error_chain(&err)))
}

/// Execute module against arguments file supplied by host.
///
/// # Errors
///
/// - Return [`ModuleError::ReadArgs`] if arguments file cannot be read.
/// - Return [`ModuleError::Config`] if module arguments are invalid.
/// - Return [`ModuleError::Sync`] if target file cannot be synchronized.
#[instrument(skip(syncer, args_path), level = "debug")]
pub fn try_execute(syncer: &FileContentSync, args_path: impl AsRef<Path>) -> Result<ModuleReturn> {
    let args_path = args_path.as_ref();
    debug!("read module arguments from {:?}", args_path.display());
    let data = read_to_string(args_path).map_err(|err| ModuleError::ReadArgs {
        source: err,
        args_path: args_path.to_path_buf(),
    })?;

    run(syncer, data.parse::<ModuleArgs>()?)
}

/// Run module with already parsed arguments.
///
/// # Errors
///
/// - Return [`ModuleError::Sync`] if target file cannot be synchronized.
pub fn run(syncer: &FileContentSync, args: ModuleArgs) -> Result<ModuleReturn> {
    Ok(syncer.sync(args.into())?.into())
}

/// Render error and all of its sources on one line.
pub fn error_chain(err: &dyn StdError) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(cause.to_string().as_str());
        source = cause.source();
    }

    message
}

/// Module execution error types.
#[derive(Debug, thiserror::Error)]
pub enum ModuleError {
    /// Arguments file cannot be read.
    #[error("failed to read module arguments at {:?}", args_path.display())]
    ReadArgs {
        #[source]
        source: std::io::Error,
        args_path: PathBuf,
    },

    /// Module arguments are invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Target file cannot be synchronized.
    #[error(transparent)]
    Sync(#[from] SyncError),
}

/// Friendly result alias :3
pub type Result<T, E = ModuleError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::WritePolicy;
    use indoc::indoc;
    use pretty_assertions::assert_eq;
    use sealed_test::prelude::*;
    use std::fs::{create_dir, write};

    #[sealed_test]
    fn execute_syncs_target() -> anyhow::Result<()> {
        write("args.json", r#"{"content": "hello world", "path": "t1"}"#)?;

        let result = execute(&FileContentSync::default(), "args.json");
        let expect = ModuleReturn::Exit {
            changed: true,
            is_ok: true,
        };
        assert_eq!(result, expect);
        assert_eq!(read_to_string("t1")?, "hello world");

        let result = execute(&FileContentSync::default(), "args.json");
        let expect = ModuleReturn::Exit {
            changed: false,
            is_ok: true,
        };
        assert_eq!(result, expect);

        Ok(())
    }

    #[sealed_test]
    fn execute_honors_check_mode() -> anyhow::Result<()> {
        write(
            "args.json",
            indoc! {r#"
                {
                    "content": "hello world",
                    "path": "t1",
                    "_ansible_check_mode": true
                }
            "#},
        )?;

        let result = execute(&FileContentSync::new(WritePolicy::SkipUnchanged), "args.json");
        let expect = ModuleReturn::Exit {
            changed: true,
            is_ok: false,
        };
        assert_eq!(result, expect);
        assert!(!Path::new("t1").exists());

        Ok(())
    }

    #[sealed_test]
    fn execute_reports_missing_args_file() {
        let result = execute(&FileContentSync::default(), "nope.json");
        assert!(result.is_failure());

        let ModuleReturn::Fail { msg, .. } = result else {
            panic!("expected failed return");
        };
        assert!(msg.starts_with(r#"failed to read module arguments at "nope.json": "#));
    }

    #[sealed_test]
    fn execute_reports_invalid_args() -> anyhow::Result<()> {
        write("args.json", r#"{"path": "t1"}"#)?;

        let result = execute(&FileContentSync::default(), "args.json");
        assert_eq!(
            result,
            ModuleReturn::fail("missing required arguments: content")
        );

        Ok(())
    }

    #[sealed_test]
    fn execute_reports_sync_failure_with_cause() -> anyhow::Result<()> {
        create_dir("target")?;
        write("args.json", r#"{"content": "hello", "path": "target"}"#)?;

        let result = execute(&FileContentSync::default(), "args.json");
        let ModuleReturn::Fail {
            failed,
            changed,
            msg,
        } = result
        else {
            panic!("expected failed return");
        };
        assert!(failed);
        assert!(!changed);
        assert!(msg.starts_with(r#"failed to read target file at "target": "#));

        Ok(())
    }

    #[test]
    fn error_chain_joins_sources() {
        let err = SyncError::WriteTarget {
            source: std::io::Error::other("disk full"),
            path: "motd".into(),
        };
        let result = error_chain(&ModuleError::from(err));
        assert_eq!(result, r#"failed to write target file at "motd": disk full"#);
    }
}
