// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/*! Querying the dpkg status database.

The path based functions in this module ([get_all_packages()], [get_package()] and
[get_package_and_reverse_dependencies()]) read and parse the status file anew on every
call. Nothing is cached between calls.
*/

use {
    crate::{
        control::iter_paragraphs,
        error::{DpkgStatusError, Result},
        package::PackageRecord,
    },
    log::{debug, trace, warn},
    std::{
        collections::{BTreeSet, HashMap},
        path::Path,
    },
};

/// Location of the dpkg status database on a Debian system.
pub const DEFAULT_STATUS_PATH: &str = "/var/lib/dpkg/status";

/// Read the content of a status file.
///
/// I/O errors are returned with the underlying [std::io::Error] intact.
pub fn read_status_file(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();

    let data = std::fs::read_to_string(path)
        .map_err(|e| DpkgStatusError::StatusFileRead(format!("{}", path.display()), e))?;
    debug!("read {} bytes from {}", data.len(), path.display());

    Ok(data)
}

/// Parse the content of a status file into package records.
///
/// Records are returned in file order. Paragraphs without a package name are dropped.
pub fn parse_status_content(data: &str) -> Vec<PackageRecord> {
    let mut paragraphs = 0;

    let records = iter_paragraphs(data)
        .inspect(|_| paragraphs += 1)
        .map(PackageRecord::from_paragraph)
        .filter(|record| {
            if !record.has_name() {
                trace!("skipping paragraph without package name");
            }

            record.has_name()
        })
        .collect::<Vec<_>>();

    debug!(
        "parsed {} packages from {} paragraphs",
        records.len(),
        paragraphs
    );

    records
}

/// An indexed collection of package records.
///
/// Instances hold every named record from a status file in file order, plus an index
/// by package name. If several records share a name, the index refers to the last one.
#[derive(Clone, Debug, Default)]
pub struct PackageStore {
    packages: Vec<PackageRecord>,
    by_name: HashMap<String, usize>,
}

impl PackageStore {
    /// Construct an instance by reading and parsing a status file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::from_status_str(&read_status_file(path)?))
    }

    /// Construct an instance from the content of a status file.
    pub fn from_status_str(data: &str) -> Self {
        Self::from_packages(parse_status_content(data))
    }

    /// Construct an instance from records.
    ///
    /// Records without a name are discarded.
    pub fn from_packages(packages: impl IntoIterator<Item = PackageRecord>) -> Self {
        let packages = packages
            .into_iter()
            .filter(|p| p.has_name())
            .collect::<Vec<_>>();

        let mut by_name = HashMap::with_capacity(packages.len());
        for (i, package) in packages.iter().enumerate() {
            if by_name.insert(package.name().to_string(), i).is_some() {
                warn!(
                    "package {} appears multiple times; using last occurrence",
                    package.name()
                );
            }
        }

        Self { packages, by_name }
    }

    /// The number of records, including records sharing a name.
    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    /// Iterate over all records in file order.
    pub fn iter_packages(&self) -> impl Iterator<Item = &PackageRecord> {
        self.packages.iter()
    }

    /// Obtain all records in file order, consuming self.
    pub fn into_packages(self) -> Vec<PackageRecord> {
        self.packages
    }

    /// Find the record with the given name.
    pub fn package(&self, name: &str) -> Option<&PackageRecord> {
        self.by_name.get(name).map(|i| &self.packages[*i])
    }

    /// Find names of packages depending on the given package.
    ///
    /// A package is a reverse dependency if the name appears as any alternative of
    /// any of its dependencies. Every record is considered, including records
    /// shadowed in the name index and the named package itself.
    pub fn reverse_dependencies(&self, name: &str) -> BTreeSet<String> {
        self.packages
            .iter()
            .filter(|p| p.depends_on(name))
            .map(|p| p.name().to_string())
            .collect()
    }

    /// Find a record and its reverse dependencies.
    ///
    /// If no record has the given name, the reverse dependency scan is not performed
    /// and an empty set is returned.
    pub fn package_and_reverse_dependencies(
        &self,
        name: &str,
    ) -> (Option<&PackageRecord>, BTreeSet<String>) {
        match self.package(name) {
            Some(package) => (Some(package), self.reverse_dependencies(name)),
            None => (None, BTreeSet::new()),
        }
    }
}

/// Obtain all packages in a status file, in file order.
pub fn get_all_packages(path: impl AsRef<Path>) -> Result<Vec<PackageRecord>> {
    Ok(PackageStore::load(path)?.into_packages())
}

/// Obtain the package with the given name from a status file.
///
/// `Ok(None)` is returned if no package has that name.
pub fn get_package(path: impl AsRef<Path>, name: &str) -> Result<Option<PackageRecord>> {
    Ok(PackageStore::load(path)?.package(name).cloned())
}

/// Obtain a package and the names of packages depending on it from a status file.
///
/// If no package has the given name, `(None, {})` is returned.
pub fn get_package_and_reverse_dependencies(
    path: impl AsRef<Path>,
    name: &str,
) -> Result<(Option<PackageRecord>, BTreeSet<String>)> {
    let store = PackageStore::load(path)?;
    let (package, reverse) = store.package_and_reverse_dependencies(name);

    Ok((package.cloned(), reverse))
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        indoc::indoc,
        std::{io::ErrorKind, path::PathBuf},
        tempfile::TempDir,
    };

    const SAMPLE: &str = include_str!("testdata/status-sample");

    fn write_status(dir: &TempDir, content: &str) -> PathBuf {
        let path = dir.path().join("status");
        std::fs::write(&path, content).unwrap();

        path
    }

    fn names(records: &[PackageRecord]) -> Vec<&str> {
        records.iter().map(|r| r.name()).collect()
    }

    fn set(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parse_sample() {
        let records = parse_status_content(SAMPLE);

        assert_eq!(
            names(&records),
            vec![
                "libc6",
                "libgcc-s1",
                "gcc-12-base",
                "debconf",
                "adduser",
                "passwd",
                "libcrypt1",
                "openssh-client",
                "cdebconf",
            ]
        );

        let openssh = &records[7];
        assert_eq!(openssh.version(), "1:9.2p1-2+deb12u2");
        assert_eq!(openssh.dependencies().len(), 7);
    }

    #[test]
    fn unnamed_paragraphs_dropped() {
        let records = parse_status_content(indoc! {"

            Package: a
            Version: 1

            Version: 2
            Depends: a

            Package:
            Depends: a


            Package: b

        "});

        assert_eq!(names(&records), vec!["a", "b"]);
    }

    #[test]
    fn store_lookup() {
        let store = PackageStore::from_status_str(SAMPLE);

        assert_eq!(store.len(), 9);
        assert_eq!(store.package("debconf").unwrap().section(), "admin");
        assert!(store.package("nonexistent").is_none());
        assert!(store.package("").is_none());
    }

    #[test]
    fn reverse_dependencies_simple() {
        let store = PackageStore::from_status_str("Package: a\nDepends: b\n\nPackage: b\n");

        let (package, reverse) = store.package_and_reverse_dependencies("b");
        assert_eq!(package.unwrap().name(), "b");
        assert_eq!(reverse, set(&["a"]));

        let (package, reverse) = store.package_and_reverse_dependencies("a");
        assert_eq!(package.unwrap().name(), "a");
        assert!(reverse.is_empty());
    }

    #[test]
    fn reverse_dependencies_sample() {
        let store = PackageStore::from_status_str(SAMPLE);

        assert_eq!(
            store.reverse_dependencies("libc6"),
            set(&["libcrypt1", "libgcc-s1", "openssh-client", "passwd"])
        );
        // Only reachable as the second alternative of `debconf | debconf-2.0`.
        assert_eq!(
            store.reverse_dependencies("debconf-2.0"),
            set(&["adduser"])
        );
    }

    #[test]
    fn reverse_dependencies_skipped_for_unknown_package() {
        // `ghost` is depended upon but is not itself in the database.
        let store = PackageStore::from_status_str("Package: a\nDepends: ghost\n");

        assert_eq!(store.reverse_dependencies("ghost"), set(&["a"]));
        assert_eq!(
            store.package_and_reverse_dependencies("ghost"),
            (None, BTreeSet::new())
        );
    }

    #[test]
    fn self_dependency_is_reported() {
        let store = PackageStore::from_status_str("Package: x\nDepends: x, y\n\nPackage: y");

        let (_, reverse) = store.package_and_reverse_dependencies("x");
        assert_eq!(reverse, set(&["x"]));
    }

    #[test]
    fn duplicate_names_last_wins() {
        let store = PackageStore::from_status_str(indoc! {"
            Package: dup
            Version: 1
            Depends: z

            Package: z

            Package: dup
            Version: 2
        "});

        assert_eq!(store.len(), 3);
        assert_eq!(store.package("dup").unwrap().version(), "2");
        // The shadowed record still participates in the reverse scan.
        assert_eq!(store.reverse_dependencies("z"), set(&["dup"]));
        assert_eq!(
            store
                .iter_packages()
                .map(|p| p.version())
                .collect::<Vec<_>>(),
            vec!["1", "", "2"]
        );
    }

    #[test]
    fn from_packages_filters_unnamed() {
        let store = PackageStore::from_packages([
            PackageRecord::from_paragraph("Version: 1"),
            PackageRecord::from_paragraph("Package: a"),
        ]);

        assert_eq!(store.len(), 1);
        assert!(store.package("").is_none());
    }

    #[test]
    fn path_queries() -> Result<()> {
        let dir = tempfile::tempdir().unwrap();
        let path = write_status(&dir, SAMPLE);

        let all = get_all_packages(&path)?;
        assert_eq!(all.len(), 9);
        assert_eq!(all[0].name(), "libc6");

        let passwd = get_package(&path, "passwd")?.unwrap();
        assert_eq!(passwd.priority(), "required");
        assert!(get_package(&path, "nonexistent")?.is_none());

        let (package, reverse) = get_package_and_reverse_dependencies(&path, "passwd")?;
        assert_eq!(package.unwrap(), passwd);
        assert_eq!(reverse, set(&["adduser", "openssh-client"]));

        assert_eq!(
            get_package_and_reverse_dependencies(&path, "nonexistent")?,
            (None, BTreeSet::new())
        );

        Ok(())
    }

    #[test]
    fn path_queries_reread_file() -> Result<()> {
        let dir = tempfile::tempdir().unwrap();
        let path = write_status(&dir, "Package: a\n");
        assert!(get_package(&path, "b")?.is_none());

        write_status(&dir, "Package: a\n\nPackage: b\n");
        assert!(get_package(&path, "b")?.is_some());

        Ok(())
    }

    #[test]
    fn missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("does-not-exist");

        let err = get_all_packages(&path).unwrap_err();
        assert_eq!(err.io_error().kind(), ErrorKind::NotFound);
        assert!(err.to_string().contains("does-not-exist"));

        assert!(matches!(
            get_package(&path, "a"),
            Err(DpkgStatusError::StatusFileRead(..))
        ));
        assert!(get_package_and_reverse_dependencies(&path, "a").is_err());
    }

    #[test]
    fn error_source_is_io_error() {
        use std::error::Error;

        let err = read_status_file("/nonexistent/dpkg/status").unwrap_err();
        let source = err.source().unwrap();
        assert!(source.downcast_ref::<std::io::Error>().is_some());
    }
}
