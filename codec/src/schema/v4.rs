//! Schemas for the v4 data model.

use super::{FieldSpec, SchemaDecl, register_star_export};
use crate::codecs::{
    ACTIVE_EXPORTS, CONTEXT_MODULE, DEDUP_IMPORT, LOCAL_MODULE, NODE_LIST, PARENT_BLOCK, PATTERN,
    RELATIVE_PATH, STAR_EXPORTS,
};

pub(super) const SCHEMAS: &[SchemaDecl] = &[
    SchemaDecl::new(
        "ModuleDependency",
        &[
            FieldSpec::with("request", RELATIVE_PATH),
            FieldSpec::with("user_request", RELATIVE_PATH),
            FieldSpec::plain("range"),
        ],
    ),
    SchemaDecl::new(
        "ConstDependency",
        &[
            FieldSpec::plain("expression"),
            FieldSpec::plain("range"),
            FieldSpec::plain("requirements"),
        ],
    ),
    SchemaDecl::new(
        "ContextDependency",
        &[
            FieldSpec::with("request", RELATIVE_PATH),
            FieldSpec::plain("recursive"),
            FieldSpec::with("pattern", PATTERN),
            FieldSpec::plain("mode"),
            FieldSpec::plain("range"),
        ],
    ),
    SchemaDecl::new(
        "AsyncBlock",
        &[
            FieldSpec::plain("chunk_name"),
            FieldSpec::with("request", RELATIVE_PATH),
            FieldSpec::with("module", CONTEXT_MODULE),
            FieldSpec::attached("dependencies", NODE_LIST),
            FieldSpec::attached("blocks", NODE_LIST),
        ],
    ),
    SchemaDecl::new(
        "ImportDependency",
        &[
            FieldSpec::with("request", RELATIVE_PATH),
            FieldSpec::with("block", PARENT_BLOCK),
            FieldSpec::with("origin_module", CONTEXT_MODULE),
            FieldSpec::plain("range"),
        ],
    ),
    SchemaDecl::new(
        "LocalModuleDependency",
        &[
            FieldSpec::with("local_module", LOCAL_MODULE),
            FieldSpec::plain("range"),
        ],
    ),
    SchemaDecl::new(
        "HarmonyImportDependency",
        &[
            FieldSpec::with("request", RELATIVE_PATH),
            FieldSpec::plain("source_order"),
            FieldSpec::plain("range"),
            FieldSpec::with("origin_module", CONTEXT_MODULE),
        ],
    ),
    SchemaDecl::new(
        "HarmonyImportSpecifierDependency",
        &[
            FieldSpec::with("import_dependency", DEDUP_IMPORT),
            FieldSpec::plain("id"),
            FieldSpec::plain("name"),
            FieldSpec::plain("range"),
            FieldSpec::with("origin_module", CONTEXT_MODULE),
        ],
    ),
    SchemaDecl::new(
        "HarmonyReexportDependency",
        &[
            FieldSpec::with("import_dependency", DEDUP_IMPORT),
            FieldSpec::plain("id"),
            FieldSpec::plain("name"),
            FieldSpec::with("active_exports", ACTIVE_EXPORTS),
            FieldSpec::with("other_star_exports", STAR_EXPORTS),
            FieldSpec::with("origin_module", CONTEXT_MODULE),
        ],
    )
    .after_thaw(register_star_export),
    SchemaDecl::new(
        "HarmonyCompatibilityDependency",
        &[FieldSpec::with("origin_module", CONTEXT_MODULE)],
    ),
];
