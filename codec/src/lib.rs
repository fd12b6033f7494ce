//! Freeze/thaw codec for live module graphs.
//!
//! A live graph of [`Node`](hoard_types::Node)s is frozen into JSON-safe
//! [`FrozenRecord`]s and later thawed back into an equivalent live graph.
//!
//! # Architecture
//!
//! ```text
//! SchemaRegistry (one per SchemaVersion, built from a TypeProvider)
//! ├── SchemaDefinition: type name + ordered FieldSpecs + Binding
//! │   └── FieldSpec: name + optional FieldCodec + Stage
//! │
//! FreezeSession / ThawSession (one per module snapshot)
//! ├── registry: &SchemaRegistry
//! └── context: TraversalContext (owner, parent, SessionState accumulators)
//! ```
//!
//! Types unknown to the active registry are skipped on both sides; that is
//! how records written by one schema version are read by another.

mod codecs;
mod context;
mod error;
mod extensions;
mod freeze;
mod provider;
mod record;
mod registry;
mod schema;
mod thaw;

pub use codecs::{
    ACTIVE_EXPORTS, CONTEXT_MARKER, CONTEXT_MODULE, DEDUP_IMPORT, FieldCodec, FreezeFn, IDENTITY,
    LOCAL_MODULE, NODE, NODE_LIST, PARENT_BLOCK, PATTERN, RELATIVE_PATH, STAR_EXPORTS, ThawFn,
    absolute_request, relative_request,
};
pub use context::{MAX_LOCAL_MODULES, SessionState, TraversalContext};
pub use error::{CodecError, ConstructionError, Error};
pub use extensions::EXTENSION_KEYS;
pub use freeze::FreezeSession;
pub use provider::{Args, Binding, BuildFn, BuiltinTypes, TypeProvider};
pub use record::FrozenRecord;
pub use registry::{DEFAULT_MAX_DEPTH, SchemaDefinition, SchemaRegistry};
pub use schema::{AfterThawFn, FieldSpec, SchemaDecl, SchemaVersion, Stage, declarations};
pub use thaw::ThawSession;
