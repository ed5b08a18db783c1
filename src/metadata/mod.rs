//! Metadata primitives shared by the emit and Edit-and-Continue layers.
//!
//! This module provides the small vocabulary of binary-metadata concepts this
//! subsystem needs without owning any file format itself: row tokens, assembly
//! identity, and the diagnostics sink through which all user-reachable
//! conditions are reported.
//!
//! # Key Components
//!
//! - [`token::Token`] - table id + row index handle for emitted rows
//! - [`token::TableId`] - the closed set of tables the delta ledgers track
//! - [`identity::AssemblyIdentity`] - name/version/culture/public-key-token
//!   identity used for assembly references
//! - [`diagnostics::EmitDiagnostics`] - lock-free per-pass diagnostics sink

pub mod diagnostics;
pub mod identity;
pub mod token;
