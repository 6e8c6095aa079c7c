//! Legacy residue ids from a parsed PDB structure.

use std::path::Path;

use super::config::ResidueFilter;
use super::ids::{LegacyResidueId, SourceKind};
use super::Error;
use crate::io::pdb::Structure;

/// Read the structure id and source kind off a legacy filename.
///
/// `1d4r.pdb` is the asymmetric unit of `1d4r`, and `1d4r.pdb2` is its second biological
/// assembly.
pub fn classify_filename(filename: &Path) -> Result<(String, SourceKind), Error> {
    let malformed = |details| Error::MalformedFilename {
        filename: filename.to_path_buf(),
        details,
    };

    let stem = filename
        .file_stem()
        .and_then(|stem| stem.to_str())
        .ok_or_else(|| malformed("the name has no stem"))?;
    let extension = filename
        .extension()
        .and_then(|ext| ext.to_str())
        .ok_or_else(|| malformed("the name has no extension"))?;

    let suffix = match extension.get(..3) {
        Some(pdb) if pdb.eq_ignore_ascii_case("pdb") => &extension[3..],
        _ => return Err(malformed("the extension does not start with pdb")),
    };

    // The assembly is named by the last character of the filename only, so `.pdb12` is
    // assembly 2.
    let kind = if suffix.is_empty() {
        SourceKind::AsymmetricUnit
    } else if suffix.bytes().all(|b| b.is_ascii_digit()) {
        SourceKind::BiologicalAssembly(suffix[suffix.len() - 1..].to_string())
    } else {
        return Err(malformed("the assembly number after pdb is not a number"));
    };

    Ok((stem.to_string(), kind))
}

/// Collect the id of every residue in `structure` that passes `filter`.
///
/// The ids are in file order: by model, then by chain, then by residue.
pub fn old_residue_ids(
    structure: &Structure,
    filename: &Path,
    filter: &ResidueFilter,
) -> Result<Vec<LegacyResidueId>, Error> {
    let (pdb, kind) = classify_filename(filename)?;

    let mut ids = Vec::new();
    for model in structure.models() {
        // Models are counted from zero in the reader, but from one in the ids.
        let model_number = model.index() + 1;
        for chain in model.chains() {
            for residue in chain.residues().iter().filter(|r| filter.accepts(r)) {
                ids.push(LegacyResidueId {
                    pdb: pdb.clone(),
                    kind: kind.clone(),
                    model: model_number,
                    chain: chain.id().to_string(),
                    number: residue.number(),
                    unit: residue.name().trim().to_string(),
                    insertion: residue.insertion().trim_end().to_string(),
                });
            }
        }
    }

    Ok(ids)
}
