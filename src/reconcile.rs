//! Order reconciliation for set-like lists.
//!
//! The Platform API treats some lists as unordered and may return their
//! elements in any order. State keeps the configured order whenever the
//! server holds the same elements, so a reordered echo never shows up as
//! drift.

use tracing::debug;

use crate::value::AttrValue;

/// Reconcile a server-returned list against the prior list.
///
/// If both hold the same elements with the same multiplicities, the prior
/// order wins; otherwise the response order is taken as-is.
pub fn reconcile_set_order(prior: &[AttrValue], response: Vec<AttrValue>) -> Vec<AttrValue> {
    if same_elements(prior, &response) {
        prior.to_vec()
    } else {
        debug!(
            prior = prior.len(),
            response = response.len(),
            "set-like list differs from prior; taking server order"
        );
        response
    }
}

/// Whether two lists are equal as multisets.
pub fn same_elements(a: &[AttrValue], b: &[AttrValue]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut remaining: Vec<&AttrValue> = b.iter().collect();
    for item in a {
        match remaining.iter().position(|candidate| *candidate == item) {
            Some(pos) => {
                remaining.swap_remove(pos);
            },
            None => return false,
        }
    }
    true
}
