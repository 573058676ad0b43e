//! Crime statistics of the block's locality and the citywide ranking.

use avm_analysis_models::{Observation, SecurityContext, SecurityRankRow, SecuritySnapshot};
use avm_catastro::DatasetStore;

/// Security snapshot of `locality_id` plus every locality ranked by crime
/// count, lowest first.
///
/// The current locality's ranking row is flagged and annotated with its
/// risk level. An unknown locality yields [`Observation::NoData`] and an
/// unflagged ranking.
#[must_use]
pub fn security_context(store: &DatasetStore, locality_id: &str) -> SecurityContext {
    let snapshot: Observation<SecuritySnapshot> = store
        .locality(locality_id)
        .map(|l| SecuritySnapshot {
            locality_id: l.id.clone(),
            locality_name: l.name.clone(),
            crime_count: l.crime_count,
            risk_level: l.risk_level.clone(),
        })
        .into();

    if snapshot.is_no_data() {
        log::warn!("No security data for locality {locality_id}");
    }

    let mut ranking: Vec<SecurityRankRow> = store
        .localities()
        .iter()
        .map(|l| {
            let is_current = l.id == locality_id;
            SecurityRankRow {
                locality_name: l.name.clone(),
                crime_count: l.crime_count,
                is_current,
                annotation: is_current.then(|| l.risk_level.clone()),
            }
        })
        .collect();
    ranking.sort_by_key(|row| row.crime_count);

    SecurityContext { snapshot, ranking }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::tests::{block, store};

    #[test]
    fn ranks_ascending_and_flags_current() {
        let store = store(vec![block("a", -74.1, 4.6, None, None)], vec![]);
        let ctx = security_context(&store, "1");

        let snapshot = ctx.snapshot.as_option().unwrap();
        assert_eq!(snapshot.crime_count, 120);
        assert_eq!(snapshot.risk_level, "Medio");

        let names: Vec<&str> = ctx.ranking.iter().map(|r| r.locality_name.as_str()).collect();
        assert_eq!(names, ["USME", "CHAPINERO"]);
        assert!(ctx.ranking[1].is_current);
        assert_eq!(ctx.ranking[1].annotation.as_deref(), Some("Medio"));
        assert!(ctx.ranking[0].annotation.is_none());
    }

    #[test]
    fn unknown_locality_has_no_snapshot() {
        let store = store(vec![block("a", -74.1, 4.6, None, None)], vec![]);
        let ctx = security_context(&store, "404");

        assert!(ctx.snapshot.is_no_data());
        assert!(ctx.ranking.iter().all(|r| !r.is_current));
    }
}
