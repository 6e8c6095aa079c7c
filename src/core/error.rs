//! Failures while building translation tables or translating identifiers.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Reading one of the input files failed.
    #[error(transparent)]
    Read(#[from] crate::io::Error),

    /// The metadata document does not contain a single data block.
    #[error("the mmCIF document contains no data block")]
    EmptyDocument,

    /// Assemblies are defined but there is no operator list to resolve them with.
    #[error("structure {structure} defines assemblies but has no pdbx_struct_oper_list table")]
    MissingOperatorTable { structure: String },

    /// A table lacks a column that is needed to read it.
    #[error("structure {structure}: table {table} has no column {column}")]
    MissingColumn {
        structure: String,
        table: &'static str,
        column: &'static str,
    },

    /// The operator expression is a generated (parenthesized) expression, which is only accepted
    /// under [`AssemblyPolicy::Synthesize`](crate::core::AssemblyPolicy::Synthesize).
    #[error(
        "structure {structure} looks like a large generated assembly: assembly {assembly} uses \
         the operator expression {expression:?}"
    )]
    UnsupportedAssemblyExpression {
        structure: String,
        assembly: String,
        expression: String,
    },

    /// An operator expression names an operator that is not in the operator list.
    #[error("structure {structure}: assembly {assembly} refers to unknown operator {token:?}")]
    UnknownOperator {
        structure: String,
        assembly: String,
        token: String,
    },

    /// No operator is known for a residue of a biological assembly.
    #[error("no operator is known for structure {pdb}, assembly {assembly}, model {model}")]
    LookupMiss {
        pdb: String,
        assembly: String,
        model: String,
    },

    /// A structure filename fits neither `<id>.pdb` nor `<id>.pdb<assembly>`.
    #[error(
        "the filename {filename:?} does not follow the <id>.pdb or <id>.pdb<n> convention: \
         {details}"
    )]
    MalformedFilename {
        filename: PathBuf,
        details: &'static str,
    },
}
