//! Translate legacy PDB residue identifiers into operator-aware unit identifiers.
//!
//! Legacy ids come from PDB-format files, where an asymmetric unit (`1abc.pdb`) and a biological
//! assembly (`1abc.pdb2`) are told apart by the file extension only. The new ids name the
//! symmetry operator that produced every copy, which is looked up through the
//! `pdbx_struct_assembly_gen` and `pdbx_struct_oper_list` tables of the matching mmCIF file.
pub mod core;
pub mod io;
