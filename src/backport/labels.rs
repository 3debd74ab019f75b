use super::types::TargetBranch;
use std::collections::BTreeSet;

pub const DEFAULT_LABEL_PREFIX: &str = "backport-";

/// Target branches named by `<prefix><branch>` labels.
///
/// Duplicates collapse and the set iterates in name order, so branches are
/// always processed in the same sequence.
pub fn resolve_target_branches<I, S>(labels: I, prefix: &str) -> BTreeSet<TargetBranch>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    labels
        .into_iter()
        .filter_map(|label| {
            label
                .as_ref()
                .strip_prefix(prefix)
                .filter(|branch| !branch.is_empty())
                .map(TargetBranch::new)
        })
        .collect()
}
