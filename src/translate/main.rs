//! Print the correspondence between the legacy and the new residue ids of a structure.
use std::io::{self, Write};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use idtranslate::core::{correspondences, TranslationTable};
use idtranslate::io::pdb::Structure;
use log::{info, warn};

use crate::args::Args;
use crate::output::write_correspondences;

mod args;
mod output;

fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let options = args.options()?;

    let start = Instant::now();
    let table = match (&args.table, &args.cif_file) {
        (Some(path), _) => {
            info!("Loading translation table {path:?}...");
            TranslationTable::open_tsv(path)
                .with_context(|| format!("Could not load translation table {path:?}"))?
        }
        (None, Some(path)) => {
            info!("Building translation table from {path:?}...");
            TranslationTable::open_cif(path, &options)
                .with_context(|| format!("Could not build a translation table from {path:?}"))?
        }
        (None, None) => anyhow::bail!("Either an mmCIF file or a --table is required"),
    };
    info!("Took {:.3} s.", start.elapsed().as_secs_f32());

    info!("Loading structure {:?}...", args.pdb_file);
    let start = Instant::now();
    let structure = Structure::open(&args.pdb_file)
        .with_context(|| format!("Could not read structure {:?}", args.pdb_file))?;
    info!("Took {:.3} s.", start.elapsed().as_secs_f32());

    let pairs = correspondences(&structure, &args.pdb_file, &table, &options)
        .with_context(|| format!("Could not translate the residue ids of {:?}", args.pdb_file))?;
    if pairs.is_empty() {
        warn!("{:?} contains no residues to translate", args.pdb_file);
    }
    info!("Translated {} residue ids.", pairs.len());

    let mut writer = io::BufWriter::new(io::stdout().lock());
    write_correspondences(&mut writer, &pairs, args.format)?;
    writer.flush()?;

    Ok(())
}
