// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Idempotent file content synchronization.
//!
//! Contentsync ensures that a single target file holds exactly some desired
//! text content, and reports back whether the file needed to change. It is
//! meant to be driven by a configuration-management host that hands over a
//! file of JSON arguments, and expects a JSON record in return.
//!
//! The library is split into the [`sync`] core that actually inspects and
//! writes the target file, the [`config`] layout of host arguments and
//! returns, and the [`module`] boundary gluing the two together.

pub mod config;
pub mod module;
pub mod sync;

pub use config::{ModuleArgs, ModuleReturn};
pub use sync::{sync, FileContentSync, SyncRequest, SyncResult, WritePolicy};
