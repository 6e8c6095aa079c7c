use super::ids::{LegacyResidueId, NewResidueId, SourceKind};
use super::table::TranslationTable;
use super::Error;

/// Rewrite legacy ids into new-style ids, in the same order.
///
/// Residues of the asymmetric unit carry no operator. For a residue of biological assembly `n`,
/// the model number is the operator token, so its operator is `table[pdb][n][model]`.
pub fn translate(
    old_ids: &[LegacyResidueId],
    table: &TranslationTable,
) -> Result<Vec<NewResidueId>, Error> {
    old_ids.iter().map(|id| translate_one(id, table)).collect()
}

fn translate_one(id: &LegacyResidueId, table: &TranslationTable) -> Result<NewResidueId, Error> {
    let LegacyResidueId {
        pdb,
        kind,
        model,
        chain,
        number,
        unit,
        insertion,
    } = id;

    let operator = match kind {
        SourceKind::AsymmetricUnit => None,
        SourceKind::BiologicalAssembly(assembly) => {
            let model = model.to_string();
            let name = table
                .resolve(pdb, assembly, &model)
                .ok_or_else(|| Error::LookupMiss {
                    pdb: pdb.clone(),
                    assembly: assembly.clone(),
                    model,
                })?;
            Some(name)
        }
    };

    Ok(NewResidueId {
        pdb: pdb.clone(),
        model: *model,
        chain: chain.clone(),
        unit: unit.clone(),
        number: *number,
        insertion: insertion.clone(),
        operator,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::table::Operators;

    fn table() -> TranslationTable {
        let mut table = TranslationTable::new();
        table.insert(
            "1D4R",
            Operators::explicit([("1", "1", "1_555"), ("2", "1", "1_555"), ("2", "2", "6_555")]),
        );
        table
    }

    fn old(
        pdb: &str,
        kind: SourceKind,
        model: usize,
        number: i32,
        unit: &str,
        insertion: &str,
    ) -> LegacyResidueId {
        LegacyResidueId {
            pdb: pdb.to_string(),
            kind,
            model,
            chain: "A".to_string(),
            number,
            unit: unit.to_string(),
            insertion: insertion.to_string(),
        }
    }

    fn ba(assembly: &str) -> SourceKind {
        SourceKind::BiologicalAssembly(assembly.to_string())
    }

    #[test]
    fn asymmetric_units_get_no_operator() {
        let ids = [
            old("2AW7", SourceKind::AsymmetricUnit, 1, 1, "A", ""),
            old("2AW7", SourceKind::AsymmetricUnit, 1, 2, "C", ""),
        ];
        // The table is never consulted for asymmetric units.
        let new = translate(&ids, &TranslationTable::new()).unwrap();
        assert_eq!(new.len(), 2);
        for (old, new) in ids.iter().zip(&new) {
            assert_eq!(new.operator, None);
            assert_eq!(
                (&new.pdb, new.model, &new.chain, new.number, &new.unit, &new.insertion),
                (&old.pdb, old.model, &old.chain, old.number, &old.unit, &old.insertion)
            );
        }
    }

    #[test]
    fn assemblies_resolve_through_the_table() {
        let ids = [
            old("1D4R", ba("1"), 1, 3, "A", ""),
            old("1D4R", ba("2"), 2, 2, "C", "a"),
        ];
        let new = translate(&ids, &table()).unwrap();
        assert_eq!(new[0].operator.as_deref(), Some("1_555"));
        assert_eq!(
            new[1],
            NewResidueId {
                pdb: "1D4R".to_string(),
                model: 2,
                chain: "A".to_string(),
                unit: "C".to_string(),
                number: 2,
                insertion: "a".to_string(),
                operator: Some("6_555".to_string()),
            }
        );
        assert_eq!(new[0].to_string(), "1D4R_1_A_A_3");
        assert_eq!(new[1].to_string(), "1D4R_2_A_C_2_a_6_555");
    }

    #[test]
    fn order_is_preserved() {
        let ids = [
            old("1D4R", ba("2"), 2, 9, "G", ""),
            old("2AW7", SourceKind::AsymmetricUnit, 1, 1, "A", ""),
            old("1D4R", ba("2"), 1, 4, "U", ""),
        ];
        let new = translate(&ids, &table()).unwrap();
        let numbers: Vec<_> = new.iter().map(|id| id.number).collect();
        assert_eq!(numbers, [9, 1, 4]);
    }

    #[test]
    fn lookup_misses_fail() {
        let missing_model = [old("1D4R", ba("1"), 2, 1, "A", "")];
        let err = translate(&missing_model, &table()).unwrap_err();
        assert!(matches!(
            err,
            Error::LookupMiss { pdb, assembly, model }
                if pdb == "1D4R" && assembly == "1" && model == "2"
        ));

        let missing_structure = [old("9XYZ", ba("1"), 1, 1, "A", "")];
        assert!(translate(&missing_structure, &table()).is_err());
    }
}
