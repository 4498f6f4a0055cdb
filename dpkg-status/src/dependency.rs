// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/*! Debian package dependency expressions.

The `Depends` field of a binary package is a comma-delimited list of
dependencies. Each dependency is one or more `|`-delimited alternatives, any of which
satisfies it. Each alternative is a package name optionally followed by a
parenthesized version constraint. e.g. `libc6 (>= 2.4), debconf | debconf-2.0`.

This module only tracks package *names*. Version constraints are recognized so they
can be discarded; they are never evaluated.
*/

use {
    serde::Serialize,
    std::{
        collections::BTreeSet,
        fmt::{Display, Formatter},
    },
};

/// A single dependency expressed as an ordered list of alternative package names.
///
/// The dependency is satisfied if any one of the named packages is installed.
/// Order is the textual order of alternatives, so two groups with the same names in a
/// different order are distinct.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct AlternativeGroup {
    packages: Vec<String>,
}

impl AlternativeGroup {
    /// Construct an instance from package names.
    pub fn new(packages: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            packages: packages.into_iter().map(|p| p.into()).collect(),
        }
    }

    /// Parse a single dependency whose whitespace has already been removed.
    ///
    /// Everything from the first `(` of an alternative onwards is a version constraint
    /// and is dropped. Empty alternatives are ignored. Returns [None] if no names remain.
    fn parse_compact(s: &str) -> Option<Self> {
        let packages = s
            .split('|')
            .map(|alternative| match alternative.split_once('(') {
                Some((name, _version)) => name,
                None => alternative,
            })
            .filter(|name| !name.is_empty())
            .map(|name| name.to_string())
            .collect::<Vec<_>>();

        if packages.is_empty() {
            None
        } else {
            Some(Self { packages })
        }
    }

    /// Iterate over package names in this group, in textual order.
    pub fn iter_packages(&self) -> impl Iterator<Item = &str> {
        self.packages.iter().map(|p| p.as_str())
    }

    /// Whether the named package is one of the alternatives.
    pub fn contains(&self, package: &str) -> bool {
        self.packages.iter().any(|p| p == package)
    }

    /// The number of alternatives.
    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}

impl Display for AlternativeGroup {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.packages.join(" | "))
    }
}

/// The parsed value of a `Depends` field.
///
/// A set of [AlternativeGroup]. Identical groups are stored once.
#[derive(Clone, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct DependencySet {
    groups: BTreeSet<AlternativeGroup>,
}

impl DependencySet {
    /// Parse a `Depends` field value.
    ///
    /// All whitespace is removed before tokenizing, including whitespace inside
    /// version constraints. An empty (or whitespace only) value yields an empty set.
    /// This never fails: unrecognized content is treated as part of a package name.
    pub fn parse(value: &str) -> Self {
        let compact = value
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>();

        Self {
            groups: compact
                .split(',')
                .filter_map(AlternativeGroup::parse_compact)
                .collect(),
        }
    }

    /// Parse an optional field value. An absent field yields an empty set.
    pub fn from_field(value: Option<&str>) -> Self {
        value.map(Self::parse).unwrap_or_default()
    }

    /// Add a group to this set.
    ///
    /// Returns whether the group was not already present.
    pub fn insert(&mut self, group: AlternativeGroup) -> bool {
        self.groups.insert(group)
    }

    /// Iterate over alternative groups.
    ///
    /// Groups are emitted in a stable sorted order, not their textual order.
    pub fn iter_groups(&self) -> impl Iterator<Item = &AlternativeGroup> {
        self.groups.iter()
    }

    /// The set of all package names mentioned in any group.
    ///
    /// This flattens the group structure: a package appearing as any alternative is
    /// included.
    pub fn package_names(&self) -> BTreeSet<&str> {
        self.groups
            .iter()
            .flat_map(|group| group.iter_packages())
            .collect()
    }

    /// Whether the named package is mentioned in any group.
    pub fn contains_package(&self, package: &str) -> bool {
        self.groups.iter().any(|group| group.contains(package))
    }

    /// The number of distinct groups.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

impl FromIterator<AlternativeGroup> for DependencySet {
    fn from_iter<T: IntoIterator<Item = AlternativeGroup>>(iter: T) -> Self {
        Self {
            groups: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(names: &[&str]) -> AlternativeGroup {
        AlternativeGroup::new(names.iter().copied())
    }

    #[test]
    fn parse_alternatives_and_versions() {
        let deps = DependencySet::parse("a, b | c, d(>=1.0)");

        assert_eq!(
            deps,
            DependencySet::from_iter([group(&["a"]), group(&["b", "c"]), group(&["d"])])
        );
    }

    #[test]
    fn parse_real_depends() {
        let deps = DependencySet::parse(
            "libc6 (>= 2.34), libgcc-s1 (>= 3.0), debconf (>= 0.5) | debconf-2.0, zlib1g (>= 1:1.1.4)",
        );

        assert_eq!(deps.len(), 4);
        assert!(deps.iter_groups().any(|g| g == &group(&["debconf", "debconf-2.0"])));
        assert_eq!(
            deps.package_names().into_iter().collect::<Vec<_>>(),
            vec!["debconf", "debconf-2.0", "libc6", "libgcc-s1", "zlib1g"]
        );
    }

    #[test]
    fn whitespace_is_stripped_everywhere() {
        assert_eq!(
            DependencySet::parse(" a \t|\n b ( >= 1 ) ,c"),
            DependencySet::from_iter([group(&["a", "b"]), group(&["c"])])
        );
    }

    #[test]
    fn architecture_qualifier_kept_in_name() {
        let deps = DependencySet::parse("python3:any (>= 3.9)");

        assert!(deps.contains_package("python3:any"));
        assert!(!deps.contains_package("python3"));
    }

    #[test]
    fn duplicate_groups_deduplicated() {
        let deps = DependencySet::parse("a | b, a|b, a (>= 2) | b");
        assert_eq!(deps.len(), 1);
    }

    #[test]
    fn alternative_order_is_significant() {
        let deps = DependencySet::parse("a | b, b | a");

        assert_eq!(deps.len(), 2);
        assert!(deps.iter_groups().all(|g| g.len() == 2));
    }

    #[test]
    fn absent_and_empty_values() {
        assert!(DependencySet::from_field(None).is_empty());
        assert!(DependencySet::from_field(Some("")).is_empty());
        assert!(DependencySet::parse("  \n ").is_empty());
    }

    #[test]
    fn empty_alternatives_dropped() {
        assert_eq!(
            DependencySet::parse("a,,b|,|c|"),
            DependencySet::from_iter([group(&["a"]), group(&["b"]), group(&["c"])])
        );
        assert!(DependencySet::parse("(>= 1.0)").is_empty());
    }

    #[test]
    fn contains_package_ignores_group_structure() {
        let deps = DependencySet::parse("a | b, c");

        assert!(deps.contains_package("a"));
        assert!(deps.contains_package("b"));
        assert!(deps.contains_package("c"));
        assert!(!deps.contains_package("d"));
    }

    #[test]
    fn display_group() {
        assert_eq!(group(&["a", "b"]).to_string(), "a | b");
    }

    #[test]
    fn serialize_as_nested_lists() {
        let deps = DependencySet::parse("b | c, a");

        assert_eq!(
            serde_json::to_string(&deps).unwrap(),
            r#"[["a"],["b","c"]]"#
        );
    }
}
