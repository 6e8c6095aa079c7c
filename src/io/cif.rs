//! A small PDBx/mmCIF reader exposing blocks, categories, and rows.
//!
//! Every category becomes a [`Table`], whether it was written as a `loop_` or as a list of
//! single `_category.item value` pairs (which yields a table with one row). Values are kept as
//! written, so `?` and `.` are returned verbatim.

use std::path::Path;

use super::Error;

const FORMAT: &str = "mmCIF";

/// A parsed mmCIF document.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Document {
    blocks: Vec<Block>,
}

impl Document {
    /// Parse an mmCIF document from its text.
    pub fn parse(cif: &str) -> Result<Self, Error> {
        let tokens = tokenize(cif)?;
        let mut builder = Builder::default();
        for (ln, token) in tokens {
            builder.push(ln, token)?;
        }
        builder.finish()
    }

    /// Read and parse the mmCIF file at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let cif = std::fs::read_to_string(path)
            .map_err(|err| Error::from_io(err, Some(path.to_path_buf())))?;
        Self::parse(&cif).map_err(|err| err.with_path(path))
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }
}

/// A `data_` block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    name: String,
    tables: Vec<Table>,
}

impl Block {
    /// The block name, i.e. the text after `data_`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Look up a category by name, without the leading underscore.
    ///
    /// Returns `None` when the category does not occur in this block at all, which is distinct
    /// from a present table without rows.
    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|table| table.name == name)
    }

    fn table_mut(&mut self, name: &str) -> &mut Table {
        match self.tables.iter().position(|table| table.name == name) {
            Some(idx) => &mut self.tables[idx],
            None => {
                self.tables.push(Table::new(name.to_string(), Vec::new()));
                // Just pushed, so the last element is this table.
                let last = self.tables.len() - 1;
                &mut self.tables[last]
            }
        }
    }
}

/// All values of one category, organized as rows aligned to the column names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    name: String,
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    fn new(name: String, columns: Vec<String>) -> Self {
        Self {
            name,
            columns,
            rows: Vec::new(),
        }
    }

    /// Column names without the `_category.` prefix.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, index: usize) -> Option<Row<'_>> {
        self.rows.get(index).map(|values| Row {
            columns: &self.columns,
            values,
        })
    }

    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> {
        self.rows.iter().map(|values| Row {
            columns: &self.columns,
            values,
        })
    }
}

/// A borrowed row of a [`Table`].
#[derive(Debug, Clone, Copy)]
pub struct Row<'t> {
    columns: &'t [String],
    values: &'t [String],
}

impl<'t> Row<'t> {
    /// The value in `column`, if the table has such a column.
    pub fn get(&self, column: &str) -> Option<&'t str> {
        let idx = self.columns.iter().position(|c| c == column)?;
        self.values.get(idx).map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    /// `data_<name>`
    DataBlock(String),
    /// `loop_`
    Loop,
    /// `_category.item`, stored without the leading underscore.
    Tag(String),
    Value(String),
}

/// Split the document into tokens, each paired with the line it starts on.
fn tokenize(cif: &str) -> Result<Vec<(usize, Token)>, Error> {
    let mut tokens = Vec::new();
    // A semicolon-delimited text field that is still open, with its starting line.
    let mut text: Option<(usize, Vec<&str>)> = None;

    for (ln, line) in cif.lines().enumerate() {
        let ln = ln + 1;
        if let Some((start, mut lines)) = text.take() {
            match line.strip_prefix(';') {
                Some(rest) => {
                    if lines.first().is_some_and(|first| first.is_empty()) {
                        lines.remove(0);
                    }
                    tokens.push((start, Token::Value(lines.join("\n"))));
                    split_line(rest, ln, &mut tokens)?;
                }
                None => {
                    lines.push(line);
                    text = Some((start, lines));
                }
            }
            continue;
        }

        match line.strip_prefix(';') {
            Some(rest) => text = Some((ln, vec![rest])),
            None => split_line(line, ln, &mut tokens)?,
        }
    }

    if let Some((start, _)) = text {
        return Err(Error::parse(FORMAT, None, start, "unterminated text field"));
    }

    Ok(tokens)
}

/// Tokenize a single line outside of a text field.
fn split_line(line: &str, ln: usize, tokens: &mut Vec<(usize, Token)>) -> Result<(), Error> {
    let bytes = line.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        if i >= bytes.len() || bytes[i] == b'#' {
            break;
        }

        if bytes[i] == b'\'' || bytes[i] == b'"' {
            // A quote only closes a value when it is followed by whitespace or the line end, so
            // that values like 'C1'' survive.
            let q = bytes[i];
            let start = i + 1;
            let mut end = start;
            loop {
                if end >= bytes.len() {
                    return Err(Error::parse(FORMAT, None, ln, "unterminated quoted value"));
                }
                if bytes[end] == q
                    && (end + 1 == bytes.len() || bytes[end + 1].is_ascii_whitespace())
                {
                    break;
                }
                end += 1;
            }
            tokens.push((ln, Token::Value(line[start..end].to_string())));
            i = end + 1;
            continue;
        }

        let start = i;
        while i < bytes.len() && !bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        let word = &line[start..i];
        let is_block = word
            .get(..5)
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case("data_"));
        let token = if is_block {
            Token::DataBlock(word[5..].to_string())
        } else if word.eq_ignore_ascii_case("loop_") {
            Token::Loop
        } else if let Some(tag) = word.strip_prefix('_') {
            Token::Tag(tag.to_string())
        } else {
            Token::Value(word.to_string())
        };
        tokens.push((ln, token));
    }

    Ok(())
}

/// Split `category.item` into its two halves.
fn split_tag(tag: &str) -> (&str, &str) {
    tag.split_once('.').unwrap_or(("", tag))
}

#[derive(Default)]
enum Pending {
    #[default]
    Nothing,
    Loop {
        line: usize,
        category: String,
        columns: Vec<String>,
        values: Vec<String>,
    },
    Item {
        line: usize,
        tag: String,
    },
}

#[derive(Default)]
struct Builder {
    blocks: Vec<Block>,
    pending: Pending,
}

impl Builder {
    fn push(&mut self, ln: usize, token: Token) -> Result<(), Error> {
        match token {
            Token::DataBlock(name) => {
                self.flush()?;
                self.blocks.push(Block {
                    name,
                    tables: Vec::new(),
                });
            }
            Token::Loop => {
                self.flush()?;
                self.pending = Pending::Loop {
                    line: ln,
                    category: String::new(),
                    columns: Vec::new(),
                    values: Vec::new(),
                };
            }
            Token::Tag(tag) => {
                // Tags directly after `loop_` are its header.
                if let Pending::Loop {
                    category,
                    columns,
                    values,
                    ..
                } = &mut self.pending
                {
                    let (cat, column) = split_tag(&tag);
                    if values.is_empty() && (columns.is_empty() || cat == category.as_str()) {
                        if columns.is_empty() {
                            *category = cat.to_string();
                        }
                        columns.push(column.to_string());
                        return Ok(());
                    }
                }
                self.flush()?;
                self.pending = Pending::Item { line: ln, tag };
            }
            Token::Value(value) => match std::mem::take(&mut self.pending) {
                Pending::Item { tag, .. } => self.insert_item(ln, &tag, value)?,
                Pending::Loop {
                    line,
                    category,
                    columns,
                    mut values,
                } => {
                    if columns.is_empty() {
                        return Err(Error::parse(FORMAT, None, line, "loop_ without columns"));
                    }
                    values.push(value);
                    self.pending = Pending::Loop {
                        line,
                        category,
                        columns,
                        values,
                    };
                }
                Pending::Nothing => {
                    return Err(Error::parse(
                        FORMAT,
                        None,
                        ln,
                        format!("value {value:?} without a preceding tag"),
                    ))
                }
            },
        }
        Ok(())
    }

    fn current_block(&mut self, ln: usize) -> Result<&mut Block, Error> {
        self.blocks
            .last_mut()
            .ok_or_else(|| Error::parse(FORMAT, None, ln, "data found before any data_ block"))
    }

    fn insert_item(&mut self, ln: usize, tag: &str, value: String) -> Result<(), Error> {
        let (category, column) = split_tag(tag);
        let table = self.current_block(ln)?.table_mut(category);
        match table.rows.len() {
            0 => table.rows.push(Vec::new()),
            1 => {}
            _ => {
                return Err(Error::parse(
                    FORMAT,
                    None,
                    ln,
                    format!("single item _{tag} for the looped category {category}"),
                ))
            }
        }
        table.columns.push(column.to_string());
        table.rows[0].push(value);
        Ok(())
    }

    /// Store whatever is pending into the current block.
    fn flush(&mut self) -> Result<(), Error> {
        match std::mem::take(&mut self.pending) {
            Pending::Nothing => Ok(()),
            Pending::Item { line, tag } => Err(Error::parse(
                FORMAT,
                None,
                line,
                format!("missing value for _{tag}"),
            )),
            Pending::Loop {
                line,
                category,
                columns,
                values,
            } => {
                let ncols = columns.len();
                if ncols == 0 {
                    return Err(Error::parse(FORMAT, None, line, "loop_ without columns"));
                }
                if values.len() % ncols != 0 {
                    return Err(Error::parse(
                        FORMAT,
                        None,
                        line,
                        format!(
                            "loop for {category} has {} values for {ncols} columns",
                            values.len()
                        ),
                    ));
                }
                let mut table = Table::new(category, columns);
                let mut values = values.into_iter();
                while values.len() > 0 {
                    table.rows.push(values.by_ref().take(ncols).collect());
                }

                let block = self.current_block(line)?;
                match block.tables.iter_mut().find(|t| t.name == table.name) {
                    Some(existing) => *existing = table,
                    None => block.tables.push(table),
                }
                Ok(())
            }
        }
    }

    fn finish(mut self) -> Result<Document, Error> {
        self.flush()?;
        Ok(Document {
            blocks: self.blocks,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ASSEMBLIES: &str = "\
data_1D4R
#
_entry.id   1D4R
#
loop_
_pdbx_struct_assembly_gen.assembly_id
_pdbx_struct_assembly_gen.oper_expression
_pdbx_struct_assembly_gen.asym_id_list
1 1   A,B,C
2 1,2 A,B,C
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

    #[test]
    fn loops_become_tables() {
        let doc = Document::parse(ASSEMBLIES).unwrap();
        assert_eq!(doc.blocks().len(), 1);
        let block = &doc.blocks()[0];
        assert_eq!(block.name(), "1D4R");

        let gen = block.table("pdbx_struct_assembly_gen").unwrap();
        assert_eq!(
            gen.columns(),
            ["assembly_id", "oper_expression", "asym_id_list"]
        );
        assert_eq!(gen.row_count(), 2);
        let row = gen.row(1).unwrap();
        assert_eq!(row.get("assembly_id"), Some("2"));
        assert_eq!(row.get("oper_expression"), Some("1,2"));
        assert_eq!(row.get("missing"), None);

        let opers = block.table("pdbx_struct_oper_list").unwrap();
        let types: Vec<_> = opers.rows().map(|r| r.get("type").unwrap()).collect();
        assert_eq!(types, ["identity operation", "crystal symmetry operation"]);
    }

    #[test]
    fn single_items_form_one_row() {
        let cif = "\
data_2AW7
_pdbx_struct_assembly_gen.assembly_id       1
_pdbx_struct_assembly_gen.oper_expression   1
_pdbx_struct_assembly_gen.asym_id_list
;A,B,C,
D,E
;
";
        let doc = Document::parse(cif).unwrap();
        let gen = doc.blocks()[0].table("pdbx_struct_assembly_gen").unwrap();
        assert_eq!(gen.row_count(), 1);
        let row = gen.row(0).unwrap();
        assert_eq!(row.get("oper_expression"), Some("1"));
        assert_eq!(row.get("asym_id_list"), Some("A,B,C,\nD,E"));
    }

    #[test]
    fn absent_and_empty_tables_differ() {
        let cif = "\
data_XXXX
loop_
_pdbx_struct_oper_list.id
_pdbx_struct_oper_list.name
";
        let doc = Document::parse(cif).unwrap();
        let block = &doc.blocks()[0];
        assert!(block.table("pdbx_struct_assembly_gen").is_none());
        let opers = block.table("pdbx_struct_oper_list").unwrap();
        assert!(opers.is_empty());
        assert!(opers.has_column("name"));
    }

    #[test]
    fn quotes_close_only_before_whitespace() {
        let cif = "data_X\n_atom.name \"C1'\"  # comment\n_atom.alt 'it''s'\n";
        let doc = Document::parse(cif).unwrap();
        let row = doc.blocks()[0].table("atom").unwrap().row(0).unwrap();
        assert_eq!(row.get("name"), Some("C1'"));
        assert_eq!(row.get("alt"), Some("it''s"));
    }

    #[test]
    fn malformed_documents_are_rejected() {
        let ragged = "data_X\nloop_\n_a.x\n_a.y\n1 2 3\n";
        assert!(matches!(
            Document::parse(ragged),
            Err(Error::Parse { line_number: 2, .. })
        ));

        let orphan = "_a.x 1\n";
        assert!(Document::parse(orphan).is_err());

        let unterminated = "data_X\n_a.x\n;never closed\n";
        assert!(matches!(
            Document::parse(unterminated),
            Err(Error::Parse { line_number: 3, .. })
        ));

        let dangling = "data_X\n_a.x\ndata_Y\n";
        assert!(Document::parse(dangling).is_err());
    }
}
