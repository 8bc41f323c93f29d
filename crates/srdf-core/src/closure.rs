//! Subgroup closure
//!
//! Groups may include other groups by name. A group is usable only if every
//! group it includes is usable, so anything that reaches an unknown name, a
//! self reference or a cycle drops out. The usable set is the fixed point of
//! "add every group whose subgroups are all already usable", which does not
//! depend on declaration order.

use std::collections::HashSet;

/// Outcome of closing the subgroup reference graph
#[derive(Debug, Clone, Default)]
pub struct SubgroupClosure<'a> {
    /// Resolved group names in the order they became resolvable
    order: Vec<&'a str>,
    resolved: HashSet<&'a str>,
}

impl<'a> SubgroupClosure<'a> {
    /// Resolve `(group name, subgroup names)` pairs.
    ///
    /// Worst case is quadratic in the number of groups, which is fine for a
    /// one-off load.
    pub fn resolve<I, S>(groups: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a [S])>,
        S: AsRef<str> + 'a,
    {
        let groups: Vec<(&'a str, &'a [S])> = groups.into_iter().collect();
        let mut closure = Self::default();

        let mut changed = true;
        while changed {
            changed = false;
            for (name, subgroups) in &groups {
                if closure.resolved.contains(name) {
                    continue;
                }
                let ready = subgroups
                    .iter()
                    .all(|s| closure.resolved.contains(s.as_ref()));
                if ready {
                    closure.resolved.insert(*name);
                    closure.order.push(*name);
                    changed = true;
                }
            }
        }
        closure
    }

    pub fn contains(&self, name: &str) -> bool {
        self.resolved.contains(name)
    }

    /// Resolved names, dependencies before dependents
    pub fn order(&self) -> &[&'a str] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
