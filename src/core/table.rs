//! The operator lookup table: structure id → assembly id → operator token → operator name.
//!
//! A table is built from the `pdbx_struct_assembly_gen` and `pdbx_struct_oper_list` categories
//! of an mmCIF file, or loaded from a precomputed tab-separated file.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use log::{debug, warn};

use super::config::{AssemblyPolicy, Options};
use super::{Error, IDENTITY_OPERATOR};
use crate::io;
use crate::io::cif::{Block, Document};

const ASSEMBLY_GEN: &str = "pdbx_struct_assembly_gen";
const OPER_LIST: &str = "pdbx_struct_oper_list";

/// The operators of a single structure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operators {
    /// Assembly id → operator token → operator name.
    Explicit(BTreeMap<String, BTreeMap<String, String>>),
    /// The structure defines no assemblies, so every copy is the asymmetric unit itself.
    AlwaysIdentity,
    /// The structure uses generated operator expressions. Every lookup answers with the token
    /// behind `prefix` rather than a real operator name.
    Synthesized { prefix: String },
}

impl Operators {
    /// Collect `(assembly, token, name)` entries. A repeated (assembly, token) pair keeps the last
    /// name.
    pub fn explicit<A, T, N>(entries: impl IntoIterator<Item = (A, T, N)>) -> Self
    where
        A: Into<String>,
        T: Into<String>,
        N: Into<String>,
    {
        let mut assemblies: BTreeMap<String, BTreeMap<String, String>> = BTreeMap::new();
        for (assembly, token, name) in entries {
            assemblies
                .entry(assembly.into())
                .or_default()
                .insert(token.into(), name.into());
        }
        Self::Explicit(assemblies)
    }

    /// Returns the name of the operator behind `token` in `assembly`.
    pub fn resolve(&self, assembly: &str, token: &str) -> Option<String> {
        match self {
            Self::Explicit(assemblies) => assemblies.get(assembly)?.get(token).cloned(),
            Self::AlwaysIdentity => Some(IDENTITY_OPERATOR.to_string()),
            Self::Synthesized { prefix } => Some(format!("{prefix}{token}")),
        }
    }

    /// Build the operators of one mmCIF data block.
    pub fn from_block(block: &Block, options: &Options) -> Result<Self, Error> {
        let structure = block.name();

        let Some(assembly_gen) = block.table(ASSEMBLY_GEN) else {
            debug!("{structure} has no {ASSEMBLY_GEN}, every operator is {IDENTITY_OPERATOR}");
            return Ok(Self::AlwaysIdentity);
        };

        let oper_list = block
            .table(OPER_LIST)
            .filter(|table| !table.is_empty())
            .ok_or_else(|| Error::MissingOperatorTable {
                structure: structure.to_string(),
            })?;

        let missing_column = |table: &'static str, column: &'static str| Error::MissingColumn {
            structure: structure.to_string(),
            table,
            column,
        };
        for column in ["id", "name"] {
            if !oper_list.has_column(column) {
                return Err(missing_column(OPER_LIST, column));
            }
        }
        for column in ["assembly_id", "oper_expression"] {
            if !assembly_gen.has_column(column) {
                return Err(missing_column(ASSEMBLY_GEN, column));
            }
        }

        // Operator id → operator name, as given by the operator list.
        let names: HashMap<&str, &str> = oper_list
            .rows()
            .filter_map(|row| Some((row.get("id")?, row.get("name")?)))
            .collect();

        let mut entries = Vec::new();
        for row in assembly_gen.rows() {
            let assembly = row
                .get("assembly_id")
                .ok_or_else(|| missing_column(ASSEMBLY_GEN, "assembly_id"))?;
            let expression = row
                .get("oper_expression")
                .ok_or_else(|| missing_column(ASSEMBLY_GEN, "oper_expression"))?;

            if expression.contains('(') {
                return match options.assembly_policy {
                    AssemblyPolicy::Synthesize => {
                        warn!(
                            "{structure} assembly {assembly} has the generated operator \
                             expression {expression:?}, operator names will be synthesized"
                        );
                        Ok(Self::Synthesized {
                            prefix: options.synthesized_prefix.clone(),
                        })
                    }
                    AssemblyPolicy::Reject => Err(Error::UnsupportedAssemblyExpression {
                        structure: structure.to_string(),
                        assembly: assembly.to_string(),
                        expression: expression.to_string(),
                    }),
                };
            }

            for token in expression.split(',').map(str::trim) {
                let name = names.get(token).ok_or_else(|| Error::UnknownOperator {
                    structure: structure.to_string(),
                    assembly: assembly.to_string(),
                    token: token.to_string(),
                })?;
                entries.push((assembly, token, *name));
            }
        }

        Ok(Self::explicit(entries))
    }
}

/// Operator names for any number of structures.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TranslationTable {
    structures: BTreeMap<String, Operators>,
}

impl TranslationTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the operators of structure `pdb`, replacing any that were there.
    pub fn insert(&mut self, pdb: impl Into<String>, operators: Operators) {
        self.structures.insert(pdb.into(), operators);
    }

    pub fn get(&self, pdb: &str) -> Option<&Operators> {
        self.structures.get(pdb)
    }

    pub fn structures(&self) -> impl Iterator<Item = (&str, &Operators)> {
        self.structures.iter().map(|(pdb, ops)| (pdb.as_str(), ops))
    }

    /// Returns the operator name for `token` of `assembly` in structure `pdb`.
    pub fn resolve(&self, pdb: &str, assembly: &str, token: &str) -> Option<String> {
        self.structures.get(pdb)?.resolve(assembly, token)
    }

    /// Build the table for the structure in an mmCIF document.
    ///
    /// A document should hold exactly one data block. When there are more, only the first is
    /// used.
    pub fn from_document(document: &Document, options: &Options) -> Result<Self, Error> {
        let (block, rest) = document
            .blocks()
            .split_first()
            .ok_or(Error::EmptyDocument)?;
        if !rest.is_empty() {
            warn!(
                "the mmCIF document has {} data blocks, only {} is used",
                document.blocks().len(),
                block.name()
            );
        }

        let mut table = Self::new();
        table.insert(block.name(), Operators::from_block(block, options)?);
        Ok(table)
    }

    /// Read an mmCIF file and build its table.
    pub fn open_cif(path: impl AsRef<Path>, options: &Options) -> Result<Self, Error> {
        let document = Document::open(path)?;
        Self::from_document(&document, options)
    }

    /// Parse a precomputed table.
    ///
    /// Each line holds the tab-separated fields `pdb assembly model operator-name
    /// operator-fraction`. The fraction is optional and not used. Fields may be quoted. Blank
    /// lines are skipped.
    pub fn parse_tsv(tsv: &str) -> Result<Self, io::Error> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .flexible(true)
            .from_reader(tsv.as_bytes());
        let line_of = |position: Option<&csv::Position>| {
            position.map_or(0, |position| position.line() as usize)
        };

        let mut entries: BTreeMap<String, Vec<(String, String, String)>> = BTreeMap::new();
        for record in reader.records() {
            let record = record.map_err(|err| {
                io::Error::parse("TSV", None, line_of(err.position()), err.to_string())
            })?;
            let fields: Vec<&str> = record.iter().collect();
            let [pdb, assembly, model, name, ..] = fields[..] else {
                return Err(io::Error::parse(
                    "TSV",
                    None,
                    line_of(record.position()),
                    format!("expected at least 4 tab-separated fields, found {}", fields.len()),
                ));
            };
            entries
                .entry(pdb.to_string())
                .or_default()
                .push((assembly.to_string(), model.to_string(), name.to_string()));
        }

        let mut table = Self::new();
        for (pdb, entries) in entries {
            table.insert(pdb, Operators::explicit(entries));
        }
        Ok(table)
    }

    /// Read a precomputed table from a tab-separated file.
    pub fn open_tsv(path: impl AsRef<Path>) -> Result<Self, io::Error> {
        let path = path.as_ref();
        let tsv = std::fs::read_to_string(path)
            .map_err(|err| io::Error::from_io(err, Some(path.to_path_buf())))?;
        Self::parse_tsv(&tsv).map_err(|err| err.with_path(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "\
data_1D4R
#
loop_
_pdbx_struct_oper_list.id
_pdbx_struct_oper_list.type
_pdbx_struct_oper_list.name
_pdbx_struct_oper_list.symmetry_operation
1 'identity operation'         1_555 x,y,z
2 'crystal symmetry operation' 6_555 x-y,-y,-z+1/3
#
";

    fn build(cif: &str, options: &Options) -> Result<TranslationTable, Error> {
        TranslationTable::from_document(&Document::parse(cif).unwrap(), options)
    }

    fn with_assemblies(rows: &str) -> String {
        format!(
            "{HEADER}loop_\n_pdbx_struct_assembly_gen.assembly_id\n\
             _pdbx_struct_assembly_gen.oper_expression\n\
             _pdbx_struct_assembly_gen.asym_id_list\n{rows}"
        )
    }

    #[test]
    fn explicit_operator_lists() {
        let cif = with_assemblies("1 1 A,B\n2 '1,2' A,B\n");
        let table = build(&cif, &Options::default()).unwrap();

        let mut expected = TranslationTable::new();
        expected.insert(
            "1D4R",
            Operators::explicit([("1", "1", "1_555"), ("2", "1", "1_555"), ("2", "2", "6_555")]),
        );
        assert_eq!(table, expected);
        assert_eq!(table.resolve("1D4R", "2", "2").as_deref(), Some("6_555"));
        assert_eq!(table.resolve("1D4R", "1", "2"), None);
        assert_eq!(table.resolve("2AW7", "1", "1"), None);
    }

    #[test]
    fn single_item_assembly_gen() {
        let cif = format!(
            "{HEADER}_pdbx_struct_assembly_gen.assembly_id 1\n\
             _pdbx_struct_assembly_gen.oper_expression 1,2\n"
        );
        let table = build(&cif, &Options::default()).unwrap();
        assert_eq!(table.resolve("1D4R", "1", "1").as_deref(), Some("1_555"));
        assert_eq!(table.resolve("1D4R", "1", "2").as_deref(), Some("6_555"));
    }

    #[test]
    fn duplicate_rows_keep_the_last_name() {
        let operators = Operators::explicit([("1", "1", "1_555"), ("1", "1", "2_555")]);
        assert_eq!(operators.resolve("1", "1").as_deref(), Some("2_555"));
    }

    #[test]
    fn no_assemblies_means_identity() {
        let cif = "data_2AW7\n_entry.id 2AW7\n";
        let table = build(cif, &Options::default()).unwrap();
        assert_eq!(table.get("2AW7"), Some(&Operators::AlwaysIdentity));
        for (assembly, model) in [("1", "1"), ("2", "7"), ("anything", "60")] {
            assert_eq!(
                table.resolve("2AW7", assembly, model).as_deref(),
                Some(IDENTITY_OPERATOR)
            );
        }
    }

    #[test]
    fn assemblies_need_an_operator_list() {
        let cif = "data_XXXX\n_pdbx_struct_assembly_gen.assembly_id 1\n\
                   _pdbx_struct_assembly_gen.oper_expression 1\n";
        let err = build(cif, &Options::default()).unwrap_err();
        assert!(matches!(err, Error::MissingOperatorTable { structure } if structure == "XXXX"));

        let empty = "data_XXXX\n_pdbx_struct_assembly_gen.assembly_id 1\n\
                     _pdbx_struct_assembly_gen.oper_expression 1\n\
                     loop_\n_pdbx_struct_oper_list.id\n_pdbx_struct_oper_list.name\n";
        let err = build(empty, &Options::default()).unwrap_err();
        assert!(matches!(err, Error::MissingOperatorTable { .. }));
    }

    #[test]
    fn unknown_tokens_fail() {
        let cif = with_assemblies("1 1,3 A\n");
        let err = build(&cif, &Options::default()).unwrap_err();
        assert!(matches!(err, Error::UnknownOperator { token, .. } if token == "3"));
    }

    #[test]
    fn generated_expressions_follow_the_policy() {
        let cif = with_assemblies("1 1,2 A\n2 '(1-60)' A\n");

        let table = build(&cif, &Options::default()).unwrap();
        assert_eq!(
            table.get("1D4R"),
            Some(&Operators::Synthesized {
                prefix: "P_".to_string()
            })
        );
        // Every lookup is synthesized, including those of the explicit first assembly.
        assert_eq!(table.resolve("1D4R", "1", "1").as_deref(), Some("P_1"));
        assert_eq!(table.resolve("1D4R", "2", "37").as_deref(), Some("P_37"));

        let reject = Options {
            assembly_policy: AssemblyPolicy::Reject,
            ..Default::default()
        };
        let err = build(&cif, &reject).unwrap_err();
        assert!(matches!(
            err,
            Error::UnsupportedAssemblyExpression { assembly, expression, .. }
                if assembly == "2" && expression == "(1-60)"
        ));
    }

    #[test]
    fn missing_columns_are_reported() {
        let cif = "data_XXXX\n_pdbx_struct_assembly_gen.assembly_id 1\n\
                   _pdbx_struct_assembly_gen.oper_expression 1\n\
                   _pdbx_struct_oper_list.id 1\n";
        let err = build(cif, &Options::default()).unwrap_err();
        assert!(matches!(err, Error::MissingColumn { column: "name", .. }));
    }

    #[test]
    fn empty_documents_fail() {
        let err = build("# nothing here\n", &Options::default()).unwrap_err();
        assert!(matches!(err, Error::EmptyDocument));
    }

    #[test]
    fn tsv_tables() {
        let tsv = "1D4R\t1\t1\t1_555\tx,y,z\n\
                   1D4R\t2\t1\t1_555\tx,y,z\n\
                   \n\
                   1D4R\t2\t2\t6_555\tx-y,-y,-z+1/3\n\
                   2AW7\t1\t1\t1_555\n";
        let table = TranslationTable::parse_tsv(tsv).unwrap();
        assert_eq!(table.structures().count(), 2);
        assert_eq!(table.resolve("1D4R", "2", "2").as_deref(), Some("6_555"));
        assert_eq!(table.resolve("2AW7", "1", "1").as_deref(), Some("1_555"));
        assert_eq!(table.resolve("2AW7", "1", "2"), None);

        let err = TranslationTable::parse_tsv("1D4R\t1\t1_555\n").unwrap_err();
        assert!(matches!(err, io::Error::Parse { line_number: 1, .. }));

        let short_third_line = "1D4R\t1\t1\t1_555\n1D4R\t2\t1\t1_555\n1D4R\t2\n";
        let err = TranslationTable::parse_tsv(short_third_line).unwrap_err();
        assert!(matches!(err, io::Error::Parse { line_number: 3, .. }));
    }

    #[test]
    fn tsv_fields_may_be_quoted() {
        let tsv = "1D4R\t2\t2\t\"6_555\"\t\"x-y,-y,-z+1/3\"\n\"1D4R\"\t\"2\"\t1\t1_555\n";
        let table = TranslationTable::parse_tsv(tsv).unwrap();
        assert_eq!(table.resolve("1D4R", "2", "2").as_deref(), Some("6_555"));
        assert_eq!(table.resolve("1D4R", "2", "1").as_deref(), Some("1_555"));
    }

    #[test]
    fn assembly_gen_needs_both_columns() {
        let cif = format!("{HEADER}_pdbx_struct_assembly_gen.assembly_id 1\n");
        let err = build(&cif, &Options::default()).unwrap_err();
        assert!(matches!(
            err,
            Error::MissingColumn { table: ASSEMBLY_GEN, column: "oper_expression", .. }
        ));
    }
}
