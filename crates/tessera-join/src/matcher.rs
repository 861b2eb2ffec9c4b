use crate::set::LogicalValueSet;

/// True if the local and foreign value sets share a member under join
/// equality.
///
/// Symmetric in its arguments; the asymmetry between join sides lives in how
/// each set was resolved.
pub fn matches(local: &LogicalValueSet<'_>, foreign: &LogicalValueSet<'_>) -> bool {
    let (small, large) = if local.len() <= foreign.len() {
        (local, foreign)
    } else {
        (foreign, local)
    };
    small.keys().any(|key| large.contains_key(key))
}
