//! Recover the model → chain → residue hierarchy from a PDB file.
//!
//! Only `MODEL`, `ENDMDL`, `ATOM`, and `HETATM` records are read, and of the atoms only their
//! names are kept. Chains are keyed by their identifier and residues by their hetero flag,
//! sequence number, and insertion code, so a chain or residue that reappears later in the file
//! is merged into its first occurrence. Everything is kept in order of first appearance.

use std::collections::HashMap;
use std::ops::Range;
use std::path::Path;

use super::Error;

const FORMAT: &str = "PDB";

/// Water residue names that get their own hetero flag.
const WATER_NAMES: [&str; 2] = ["HOH", "WAT"];

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Structure {
    models: Vec<Model>,
}

impl Structure {
    /// Parse a structure from the text of a PDB file.
    pub fn parse(pdb: &str) -> Result<Self, Error> {
        let mut models: Vec<Model> = Vec::new();
        let mut in_model = false;

        for (ln, line) in pdb.lines().enumerate() {
            let ln = ln + 1;
            if line.starts_with("MODEL") {
                models.push(Model::new(models.len()));
                in_model = true;
            } else if line.starts_with("ENDMDL") {
                in_model = false;
            } else if line.starts_with("ATOM") || line.starts_with("HETATM") {
                // Atoms outside of any MODEL record open an implicit model.
                if !in_model {
                    models.push(Model::new(models.len()));
                    in_model = true;
                }
                let atom = AtomRecord::from_pdb_atom_line(line)
                    .map_err(|details| Error::parse(FORMAT, None, ln, details))?;
                if let Some(model) = models.last_mut() {
                    model.add(atom);
                }
            }
        }

        Ok(Self { models })
    }

    /// Read and parse the PDB file at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let pdb = std::fs::read_to_string(path)
            .map_err(|err| Error::from_io(err, Some(path.to_path_buf())))?;
        Self::parse(&pdb).map_err(|err| err.with_path(path))
    }

    pub fn models(&self) -> &[Model] {
        &self.models
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Model {
    /// Zero-based serial index of the model within the file.
    index: usize,
    chains: Vec<Chain>,
}

impl Model {
    fn new(index: usize) -> Self {
        Self {
            index,
            chains: Vec::new(),
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn chains(&self) -> &[Chain] {
        &self.chains
    }

    fn add(&mut self, atom: AtomRecord) {
        let chain = match self.chains.iter().position(|c| c.id == atom.chain) {
            Some(idx) => &mut self.chains[idx],
            None => {
                self.chains.push(Chain::new(atom.chain.clone()));
                let last = self.chains.len() - 1;
                &mut self.chains[last]
            }
        };
        chain.add(atom);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chain {
    id: String,
    residues: Vec<Residue>,
    lookup: HashMap<ResidueKey, usize>,
}

impl Chain {
    fn new(id: String) -> Self {
        Self {
            id,
            residues: Vec::new(),
            lookup: HashMap::new(),
        }
    }

    /// The chain identifier exactly as written in column 22, which may be a space.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn residues(&self) -> &[Residue] {
        &self.residues
    }

    fn add(&mut self, atom: AtomRecord) {
        let key = ResidueKey {
            kind: atom.kind,
            hetero_name: (atom.kind == ResidueKind::Hetero).then(|| atom.resname.clone()),
            number: atom.resnum,
            insertion: atom.insertion.clone(),
        };
        let idx = *self.lookup.entry(key).or_insert_with(|| {
            self.residues.push(Residue {
                name: atom.resname.clone(),
                kind: atom.kind,
                number: atom.resnum,
                insertion: atom.insertion.clone(),
                atoms: Vec::new(),
            });
            self.residues.len() - 1
        });
        self.residues[idx].atoms.push(atom.name);
    }
}

/// Whether a residue came from `ATOM` records, `HETATM` records, or is a water.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResidueKind {
    Standard,
    Hetero,
    Water,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ResidueKey {
    kind: ResidueKind,
    /// Hetero residues sharing a number are told apart by name.
    hetero_name: Option<String>,
    number: i32,
    insertion: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Residue {
    name: String,
    kind: ResidueKind,
    number: i32,
    insertion: String,
    atoms: Vec<String>,
}

impl Residue {
    /// The residue name as written in columns 18–20, padding included.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ResidueKind {
        self.kind
    }

    pub fn number(&self) -> i32 {
        self.number
    }

    /// The insertion code as written in column 27, which is a space when unset.
    pub fn insertion(&self) -> &str {
        &self.insertion
    }

    pub fn atoms(&self) -> impl Iterator<Item = &str> {
        self.atoms.iter().map(String::as_str)
    }

    /// Returns whether this residue contains an atom called `name`.
    pub fn has_atom(&self, name: &str) -> bool {
        self.atoms.iter().any(|atom| atom == name)
    }
}

/// The fields of an `ATOM` or `HETATM` record this reader cares about.
struct AtomRecord {
    name: String,
    resname: String,
    chain: String,
    resnum: i32,
    insertion: String,
    kind: ResidueKind,
}

impl AtomRecord {
    // COLUMNS        DATA  TYPE    FIELD        DEFINITION
    // -------------------------------------------------------------------------------------
    //  1 -  6        Record name   "ATOM  "
    // 13 - 16        Atom          name         Atom  name.
    // 18 - 20        Residue name  resName      Residue name.
    // 22             Character     chainID      Chain identifier.
    // 23 - 26        Integer       resSeq       Residue sequence number.
    // 27             AChar         iCode        Code for insertion of residues.
    fn from_pdb_atom_line(line: &str) -> Result<Self, String> {
        let resname = column(line, 17..20).to_string();
        let resseq = column(line, 22..26).trim();
        let resnum = resseq
            .parse()
            .map_err(|_| format!("could not parse residue number {resseq:?}"))?;
        let kind = if !line.starts_with("HETATM") {
            ResidueKind::Standard
        } else if WATER_NAMES.contains(&resname.trim()) {
            ResidueKind::Water
        } else {
            ResidueKind::Hetero
        };

        Ok(Self {
            name: column(line, 12..16).trim().to_string(),
            resname,
            chain: padded(column(line, 21..22)),
            resnum,
            insertion: padded(column(line, 26..27)),
            kind,
        })
    }
}

/// Returns the part of `line` within `range`, cut short if the line is shorter.
fn column(line: &str, range: Range<usize>) -> &str {
    let end = range.end.min(line.len());
    let start = range.start.min(end);
    line.get(start..end).unwrap_or("")
}

/// Single-character columns that were cut off by a short line read as a blank.
fn padded(value: &str) -> String {
    if value.is_empty() {
        " ".to_string()
    } else {
        value.to_string()
    }
}
