use std::collections::BTreeSet;

use geojson::{Feature, FeatureCollection};

use crate::models::Selection;
use crate::schema::Cooperative;

/// Malformed source rows carry the spreadsheet column header as a value.
pub const COMMUNE_HEADER_ARTIFACT: &str = "Commune";

/// Deduplicated, ascending list of commune names found in the cooperative
/// layer. Empty values and the header artifact are dropped.
pub fn commune_names(cooperatives: &FeatureCollection) -> Vec<String> {
    let mut names = BTreeSet::new();
    for feature in &cooperatives.features {
        let Some(coop) = Cooperative::from_feature(feature) else {
            continue;
        };
        if let Some(commune) = coop.commune() {
            if commune != COMMUNE_HEADER_ARTIFACT {
                names.insert(commune.to_string());
            }
        }
    }
    names.into_iter().collect()
}

/// Cooperatives passing every active predicate, sorted by canonical name
/// (case-insensitive, ascending).
///
/// A feature passes iff its commune equals the selected one (bypassed by the
/// "All" sentinel), its name contains `coop_query` and its representative
/// name contains `representative_query`, both case-insensitively. Empty
/// queries always match. Features with no resolvable name are excluded.
pub fn filter_features(cooperatives: &FeatureCollection, selection: &Selection) -> Vec<Feature> {
    let coop_query = selection.coop_query.to_lowercase();
    let representative_query = selection.representative_query.to_lowercase();

    let mut matches: Vec<Feature> = cooperatives
        .features
        .iter()
        .filter(|feature| {
            let Some(coop) = Cooperative::from_feature(feature) else {
                return false;
            };
            let Some(name) = coop.name() else {
                return false;
            };
            if !selection.all_communes() && coop.commune() != Some(selection.commune.as_str()) {
                return false;
            }
            if !coop_query.is_empty() && !name.to_lowercase().contains(&coop_query) {
                return false;
            }
            if !representative_query.is_empty()
                && !coop
                    .representative()
                    .unwrap_or("")
                    .to_lowercase()
                    .contains(&representative_query)
            {
                return false;
            }
            true
        })
        .cloned()
        .collect();

    matches.sort_by_cached_key(|feature| {
        Cooperative::from_feature(feature)
            .and_then(|coop| coop.name())
            .map(str::to_lowercase)
            .unwrap_or_default()
    });
    matches
}
