use serde::{Deserialize, Serialize};

/// One grouping `(L, Rg)` of an alignment, in label form, as handed to the
/// isotactic-decision procedure.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AlignmentPair {
    pub lhs: Vec<String>,
    pub rhs: Vec<String>,
}

/// An alignment: the groupings of a relation up to some maximum complexity,
/// ordered from highest complexity downward (the decision procedure is
/// sensitive to this order).
pub type Alignment = Vec<AlignmentPair>;

/// The JSON exchange document consumed by the external decision tool:
/// `{"alignment": [{"lhs": [...], "rhs": [...]}, ...]}`.
#[derive(Serialize)]
pub struct AlignmentDocument<'a> {
    pub alignment: &'a Alignment,
}
