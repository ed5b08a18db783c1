#![doc(html_no_source)]
#![deny(missing_docs)]
#![allow(dead_code)]
#![allow(clippy::too_many_arguments)]

//! # cilemit
//!
//! The metadata-reference translation and incremental re-emission layer of a
//! managed-code compiler backend. `cilemit` turns an in-memory symbol graph
//! (types, methods, fields, modules, assemblies produced by semantic analysis)
//! into the closed set of binary-metadata reference shapes a table writer can
//! serialize, and supports re-emitting only the *changed* subset of a program
//! across a sequence of live edit sessions (Edit-and-Continue / hot reload).
//!
//! ## Features
//!
//! - **Closed reference taxonomy** - Every reachable symbol shape classifies
//!   into exactly one [`emit::MetadataRef`] variant, exhaustively matchable
//! - **Referential stability** - Translating the same symbol twice within one
//!   [`emit::EmitContext`] yields interchangeable values, backed by a
//!   lock-free memo cache
//! - **Identity resolution** - Assembly/module identity with override mapping
//!   and module self-reference suppression
//! - **Structural symbol matching** - Name/arity/signature matching between
//!   independently represented symbol universes (byte-decoded vs. live)
//! - **Generation chains** - Append-only [`enc::EmitBaseline`] snapshots with
//!   per-table added-row ledgers and cross-generation anonymous-type identity
//!
//! ## Quick Start
//!
//! Add `cilemit` to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! cilemit = "0.1"
//! ```
//!
//! ### Using the Prelude
//!
//! For convenient access to the most commonly used types, import the prelude:
//!
//! ```rust
//! use cilemit::prelude::*;
//! use std::sync::Arc;
//!
//! let universe = Arc::new(SymbolUniverse::new());
//! let object = TypeSymbolBuilder::new(&universe)
//!     .namespace("System")
//!     .name("Object")
//!     .build();
//! let ty = TypeSymbolBuilder::new(&universe)
//!     .namespace("Demo")
//!     .name("Widget")
//!     .base_type(&object)
//!     .build();
//!
//! let ctx = EmitContext::new("Demo.dll");
//! let translator = ReferenceTranslator::new();
//! let reference = translator.translate_type(&ty, &ctx)?;
//! assert!(matches!(reference, MetadataRef::NamespaceTypeDef(_)));
//! # Ok::<(), cilemit::Error>(())
//! ```
//!
//! ### Delta Emission
//!
//! A full build produces generation 0; each edit session consumes the prior
//! baseline plus a set of [`enc::SemanticEdit`] records and produces the next
//! baseline together with the definitions that must be re-serialized:
//!
//! ```rust,ignore
//! use cilemit::prelude::*;
//!
//! let baseline = EmitBaseline::initial(decoded_universe, module_id);
//! let (delta, next_baseline) = DeltaBuilder::new(baseline, compilation, edits)
//!     .build_generation(&ctx)?;
//! assert_eq!(next_baseline.ordinal(), 1);
//! ```
//!
//! ## Architecture
//!
//! `cilemit` is organized into five modules:
//!
//! - [`prelude`] - Convenient re-exports of commonly used types and traits
//! - [`metadata`] - Tokens, assembly identity, and the emit diagnostics sink
//! - [`symbols`] - The immutable symbol-graph view consumed from the
//!   semantic-analysis layer, plus builders for constructing universes
//! - [`emit`] - The reference classifier/translator, identity resolver, and
//!   per-pass emit context
//! - [`enc`] - Edit-and-Continue: semantic edits, symbol matching, the
//!   anonymous-type registry, baselines, and the delta builder
//!
//! ## Boundaries
//!
//! The parser/binder/semantic-analysis pipeline that produces symbols, the
//! low-level table writer, and the image packager are external collaborators.
//! This crate consumes an opaque symbol graph and produces in-memory reference
//! objects; it never parses source text or lays out a physical image.
//!
//! ## Concurrency
//!
//! One [`emit::EmitContext`] is single-threaded per pass. Drivers that
//! parallelize independent passes give each pass its own context; the
//! translation memo cache and the diagnostics sink are the only shared
//! structures and both are lock-free.

#[macro_use]
mod error;

pub mod emit;
pub mod enc;
pub mod metadata;
pub mod prelude;
pub mod symbols;

pub use error::Error;

/// Result type alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;
