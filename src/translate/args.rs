use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use idtranslate::core::{AssemblyPolicy, Options, ResidueFilter};

use crate::output::Format;

/// Translate legacy PDB residue ids into operator-aware unit ids.
///
/// Prints the (old id, new id) pair of every residue in the structure file. The operator of each
/// residue is looked up through the assembly and operator tables of the matching mmCIF file.
#[derive(Debug, Parser)]
#[command(about, version = idtranslate::core::version::VERSION)]
pub struct Args {
    /// Legacy structure file.
    ///
    /// Named `<id>.pdb` for the asymmetric unit and `<id>.pdb<n>` for biological assembly `n`.
    pub pdb_file: PathBuf,

    /// mmCIF file of the same structure.
    #[arg(required_unless_present = "table")]
    pub cif_file: Option<PathBuf>,

    /// Use a precomputed tab-separated translation table instead of an mmCIF file.
    ///
    /// Each line holds `pdb assembly model operator-name operator-fraction`.
    #[arg(long, conflicts_with = "cif_file")]
    pub table: Option<PathBuf>,

    /// JSON file with translation options.
    ///
    /// Options given on the command line take precedence.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Fail on generated operator expressions such as `(1-60)` instead of making up operator
    /// names for them.
    #[arg(long)]
    pub reject_generated: bool,

    /// Only translate residues that contain an atom with this name, e.g. "C1'".
    #[arg(long)]
    pub marker_atom: Option<String>,

    /// Separator between the fields of the new ids.
    #[arg(long)]
    pub separator: Option<String>,

    /// How to print the pairs.
    #[arg(long, value_enum, default_value_t)]
    pub format: Format,

    /// Report progress and timings.
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// The options from the config file, if any, with the command line options applied on top.
    pub fn options(&self) -> Result<Options> {
        let mut options = match &self.config {
            Some(path) => Options::open(path)?,
            None => Options::default(),
        };
        if self.reject_generated {
            options.assembly_policy = AssemblyPolicy::Reject;
        }
        if let Some(name) = &self.marker_atom {
            options.residue_filter = ResidueFilter::MarkerAtom(name.clone());
        }
        if let Some(separator) = &self.separator {
            options.separator = separator.clone();
        }
        Ok(options)
    }
}
