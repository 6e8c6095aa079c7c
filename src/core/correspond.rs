use std::path::Path;

use log::info;
use serde::Serialize;

use super::config::Options;
use super::extract::old_residue_ids;
use super::table::TranslationTable;
use super::translate::translate;
use super::Error;
use crate::io::pdb::Structure;

/// A legacy id string and the new-style id string of the same residue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Correspondence {
    pub old: String,
    pub new: String,
}

/// Pair up the old and new id strings of every residue in `structure`.
///
/// `filename` is the name the structure was read from, which tells the structure id and whether
/// it is an asymmetric unit or a biological assembly.
pub fn correspondences(
    structure: &Structure,
    filename: &Path,
    table: &TranslationTable,
    options: &Options,
) -> Result<Vec<Correspondence>, Error> {
    let old_ids = old_residue_ids(structure, filename, &options.residue_filter)?;
    let new_ids = translate(&old_ids, table)?;
    debug_assert_eq!(old_ids.len(), new_ids.len());

    let pairs = old_ids
        .iter()
        .zip(&new_ids)
        .map(|(old, new)| Correspondence {
            old: old.to_string(),
            new: new.to_id_string(&options.separator),
        })
        .collect();
    Ok(pairs)
}

/// Read a legacy structure and its mmCIF metadata and pair up their residue ids.
pub fn get_id_correspondences(
    pdb_file: impl AsRef<Path>,
    cif_file: impl AsRef<Path>,
    options: &Options,
) -> Result<Vec<Correspondence>, Error> {
    let (pdb_file, cif_file) = (pdb_file.as_ref(), cif_file.as_ref());

    info!("Building translation table from {cif_file:?}.");
    let table = TranslationTable::open_cif(cif_file, options)?;

    info!("Reading structure {pdb_file:?}.");
    let structure = Structure::open(pdb_file)?;

    correspondences(&structure, pdb_file, &table, options)
}
