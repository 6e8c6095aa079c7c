use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

fn synthesized_prefix_default() -> String {
    "P_".to_string()
}

fn separator_default() -> String {
    "_".to_string()
}

/// Settings that decide how ambiguous inputs are treated and how ids are written.
///
/// Can be read from a JSON file, where every key is optional:
///
/// ```json
/// {
///     "assembly_policy": "reject",
///     "synthesized_prefix": "P_",
///     "residue_filter": { "marker_atom": "C1'" },
///     "separator": "_"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Options {
    #[serde(default)]
    pub assembly_policy: AssemblyPolicy,
    /// Prefix of the operator names made up under [`AssemblyPolicy::Synthesize`].
    #[serde(default = "synthesized_prefix_default")]
    pub synthesized_prefix: String,
    #[serde(default)]
    pub residue_filter: ResidueFilter,
    /// Separator between the fields of a new-style id.
    #[serde(default = "separator_default")]
    pub separator: String,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            assembly_policy: Default::default(),
            synthesized_prefix: synthesized_prefix_default(),
            residue_filter: Default::default(),
            separator: separator_default(),
        }
    }
}

impl Options {
    /// Read options from a JSON file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)
            .with_context(|| format!("Could not open config file {path:?}"))?;
        serde_json::from_reader(std::io::BufReader::new(file))
            .with_context(|| format!("Could not parse config file {path:?}"))
    }
}

/// What to do with an assembly whose operator expression is generated, such as `(1-60)` or
/// `(1-5)(6-10)`.
///
/// These show up for icosahedral and other very large point-group assemblies.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssemblyPolicy {
    /// Make up an operator name for every lookup against the structure by prefixing the operator
    /// token, e.g. `P_7`. The resulting names are not real operator names.
    #[default]
    Synthesize,
    /// Treat the structure as unsupported and fail.
    Reject,
}

/// Which residues of a legacy structure receive an id.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResidueFilter {
    /// Every residue.
    #[default]
    All,
    /// Only residues that contain an atom with this name, e.g. `C1'` for nucleotides.
    MarkerAtom(String),
}

impl ResidueFilter {
    pub fn accepts(&self, residue: &crate::io::pdb::Residue) -> bool {
        match self {
            Self::All => true,
            Self::MarkerAtom(name) => residue.has_atom(name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_is_default() {
        let options: Options = serde_json::from_str("{}").unwrap();
        assert_eq!(options, Options::default());
        assert_eq!(options.assembly_policy, AssemblyPolicy::Synthesize);
        assert_eq!(options.residue_filter, ResidueFilter::All);
        assert_eq!(options.separator, "_");
        assert_eq!(options.synthesized_prefix, "P_");
    }

    #[test]
    fn full_config() {
        let json = r#"{
            "assembly_policy": "reject",
            "synthesized_prefix": "G_",
            "residue_filter": { "marker_atom": "C1'" },
            "separator": "|"
        }"#;
        let options: Options = serde_json::from_str(json).unwrap();
        assert_eq!(
            options,
            Options {
                assembly_policy: AssemblyPolicy::Reject,
                synthesized_prefix: "G_".to_string(),
                residue_filter: ResidueFilter::MarkerAtom("C1'".to_string()),
                separator: "|".to_string(),
            }
        );
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(serde_json::from_str::<Options>(r#"{"strict": true}"#).is_err());
    }
}
