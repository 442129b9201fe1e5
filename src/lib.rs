//! KnightOS SDK project provisioning.
//!
//! `knightos init` turns a directory into a KnightOS project: it rebuilds the
//! SDK control directory, installs a kernel image, materialises a project
//! template, installs the template's packages and optionally creates a
//! version-control repository.
//!
//! The public API is organised into layers:
//!
//! - **[`config`]**: `package.config`, template manifests, user defaults and
//!   the merged [`ProjectSettings`](config::ProjectSettings)
//! - **[`resources`]**: idempotent `check + apply` file primitives
//! - **[`tasks`]**: the named provisioning steps
//! - **[`commands`]**: subcommand orchestration (`init`)
//!
//! Domain components ([`workspace`], [`kernel`], [`template`], [`packages`],
//! [`vcs`]) sit beneath the tasks and take their collaborators as trait
//! objects so the pipeline can run without network or host tools.
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod exec;
pub mod kernel;
pub mod logging;
pub mod packages;
pub mod platform;
pub mod resources;
pub mod tasks;
pub mod template;
pub mod vcs;
pub mod workspace;
