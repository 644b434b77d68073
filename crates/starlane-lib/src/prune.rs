//! Category and affiliation exclusions applied before any graph work.

use std::collections::BTreeSet;

use tracing::debug;

use crate::star::StarNode;

/// Remove excluded stars, preserving input order.
///
/// A star is dropped when the first letter of its category code is listed in
/// `category_exclusions`, or when its affiliation tag is listed in
/// `affiliation_exclusions`. Stars without a category or affiliation are never
/// dropped on that account.
pub fn prune_stars<'a>(
    stars: &'a [StarNode],
    category_exclusions: &BTreeSet<String>,
    affiliation_exclusions: &BTreeSet<String>,
) -> Vec<&'a StarNode> {
    let pruned: Vec<&StarNode> = stars
        .iter()
        .filter(|star| !is_excluded(star, category_exclusions, affiliation_exclusions))
        .collect();

    debug!(
        before = stars.len(),
        after = pruned.len(),
        "pruned stars by exclusions"
    );
    pruned
}

fn is_excluded(
    star: &StarNode,
    category_exclusions: &BTreeSet<String>,
    affiliation_exclusions: &BTreeSet<String>,
) -> bool {
    if let Some(letter) = star.category_letter() {
        let mut buf = [0u8; 4];
        if category_exclusions.contains(&*letter.encode_utf8(&mut buf)) {
            return true;
        }
    }

    star.affiliation_tag()
        .is_some_and(|tag| affiliation_exclusions.contains(tag))
}
