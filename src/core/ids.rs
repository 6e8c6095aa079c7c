//! Legacy and new-style residue identifiers, and their string forms.

use std::fmt;

use serde::Serialize;

use super::IDENTITY_OPERATOR;

/// Whether a legacy structure file holds the asymmetric unit or one of the biological
/// assemblies.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum SourceKind {
    /// `AU`, from a `.pdb` file.
    AsymmetricUnit,
    /// `BA<n>`, from a `.pdb<n>` file, carrying the assembly id `n`.
    BiologicalAssembly(String),
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AsymmetricUnit => write!(f, "AU"),
            Self::BiologicalAssembly(assembly) => write!(f, "BA{assembly}"),
        }
    }
}

/// A residue as named by a legacy PDB file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct LegacyResidueId {
    pub pdb: String,
    pub kind: SourceKind,
    /// One-based model number.
    pub model: usize,
    pub chain: String,
    pub number: i32,
    /// Residue name.
    pub unit: String,
    /// Insertion code, empty when unset.
    pub insertion: String,
}

/// A residue as named with an explicit symmetry operator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct NewResidueId {
    pub pdb: String,
    pub model: usize,
    pub chain: String,
    pub unit: String,
    pub number: i32,
    pub insertion: String,
    /// Only set for residues of biological assemblies.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operator: Option<String>,
}

impl NewResidueId {
    /// Render this id with `separator` between the fields.
    ///
    /// The fields are `pdb model chain unit number insertion operator`. The operator is left off
    /// when it is unset or the identity operator, and in that case an empty insertion code is
    /// left off as well.
    pub fn to_id_string(&self, separator: &str) -> String {
        let model = self.model.to_string();
        let number = self.number.to_string();
        let mut fields = vec![
            self.pdb.as_str(),
            model.as_str(),
            self.chain.as_str(),
            self.unit.as_str(),
            number.as_str(),
        ];

        let operator = self
            .operator
            .as_deref()
            .filter(|&operator| operator != IDENTITY_OPERATOR);
        match operator {
            Some(operator) => fields.extend([self.insertion.as_str(), operator]),
            None if !self.insertion.is_empty() => fields.push(&self.insertion),
            None => {}
        }

        fields.join(separator)
    }
}

impl fmt::Display for LegacyResidueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self {
            pdb,
            kind,
            model,
            chain,
            number,
            unit,
            insertion,
        } = self;
        write!(f, "{pdb}_{kind}_{model}_{chain}_{number}_{unit}_{insertion}")
    }
}

impl fmt::Display for NewResidueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_id_string("_"))
    }
}

/// The legacy id string, e.g. `2AW7_AU_1_A_1_A_`.
pub fn as_old_id(id: &LegacyResidueId) -> String {
    id.to_string()
}

/// The new-style id string with the default separator, e.g. `1D4R_2_A_C_2_a_6_555`.
pub fn as_new_id(id: &NewResidueId) -> String {
    id.to_string()
}
