//! Chain reachability between two links of the kinematic tree

use std::collections::HashSet;

use crate::kinematics::KinematicTree;

/// Whether `base` and `tip` form a chain through the tree.
///
/// The tip's ancestors (itself included) are collected first; if `base` is
/// among them the chain is a plain ancestor → descendant path. Otherwise the
/// base's ancestors are walked until one of them is shared with the tip.
/// Links on sibling branches below a common trunk are therefore accepted too.
///
/// Both links must already be known to exist in `tree`.
pub fn forms_chain<T: KinematicTree + ?Sized>(tree: &T, base: &str, tip: &str) -> bool {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut current = Some(tip);
    while let Some(link) = current {
        if link == base {
            return true;
        }
        seen.insert(link);
        current = tree.parent_link(link);
    }

    let mut current = Some(base);
    while let Some(link) = current {
        if seen.contains(link) {
            return true;
        }
        current = tree.parent_link(link);
    }
    false
}
