pub mod config;
pub mod correspond;
pub mod error;
pub mod extract;
pub mod ids;
pub mod table;
pub mod translate;
pub mod version;

pub use config::{AssemblyPolicy, Options, ResidueFilter};
pub use correspond::{correspondences, get_id_correspondences, Correspondence};
pub use error::Error;
pub use extract::old_residue_ids;
pub use ids::{as_new_id, as_old_id, LegacyResidueId, NewResidueId, SourceKind};
pub use table::{Operators, TranslationTable};
pub use translate::translate;

/// Name of the symmetry operator that leaves the asymmetric unit in place.
pub const IDENTITY_OPERATOR: &str = "1_555";
