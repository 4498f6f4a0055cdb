// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/*! Package records in the dpkg status database. */

use {
    crate::{control::ControlParagraph, dependency::DependencySet},
    serde::Serialize,
    std::fmt::{Display, Formatter},
};

/// A package described by one paragraph of the dpkg status database.
///
/// See <https://www.debian.org/doc/debian-policy/ch-controlfields.html#binary-package-control-files-debian-control>.
///
/// Field values are stored raw and unvalidated. A field missing from the paragraph is
/// represented by an empty string. The original paragraph text is retained.
///
/// Records built from paragraphs lacking a `Package` field have an empty name. The
/// builder does not reject them; [crate::status::PackageStore] filters them out.
#[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize)]
pub struct PackageRecord {
    name: String,
    status: String,
    priority: String,
    section: String,
    installed_size: String,
    maintainer: String,
    architecture: String,
    version: String,
    description: String,
    dependencies: DependencySet,
    raw_paragraph: String,
}

impl PackageRecord {
    /// Build a record from the raw text of a paragraph.
    pub fn from_paragraph(paragraph: &str) -> Self {
        Self::from_control_paragraph(&ControlParagraph::parse(paragraph), paragraph)
    }

    /// Build a record from an already parsed paragraph and its original text.
    pub fn from_control_paragraph(cf: &ControlParagraph, raw_paragraph: &str) -> Self {
        Self {
            name: cf.field_str_or_empty("Package").to_string(),
            status: cf.field_str_or_empty("Status").to_string(),
            priority: cf.field_str_or_empty("Priority").to_string(),
            section: cf.field_str_or_empty("Section").to_string(),
            installed_size: cf.field_str_or_empty("Installed-Size").to_string(),
            maintainer: cf.field_str_or_empty("Maintainer").to_string(),
            architecture: cf.field_str_or_empty("Architecture").to_string(),
            version: cf.field_str_or_empty("Version").to_string(),
            description: cf.field_str_or_empty("Description").to_string(),
            dependencies: DependencySet::from_field(cf.field_str("Depends")),
            raw_paragraph: raw_paragraph.to_string(),
        }
    }

    /// The `Package` field.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether this record has a non-empty name.
    pub fn has_name(&self) -> bool {
        !self.name.is_empty()
    }

    /// The `Status` field.
    pub fn status(&self) -> &str {
        &self.status
    }

    /// The `Priority` field.
    pub fn priority(&self) -> &str {
        &self.priority
    }

    /// The `Section` field.
    pub fn section(&self) -> &str {
        &self.section
    }

    /// The `Installed-Size` field, unparsed.
    pub fn installed_size(&self) -> &str {
        &self.installed_size
    }

    /// The `Maintainer` field.
    pub fn maintainer(&self) -> &str {
        &self.maintainer
    }

    /// The `Architecture` field.
    pub fn architecture(&self) -> &str {
        &self.architecture
    }

    /// The `Version` field, unparsed.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// The `Description` field with continuation lines folded.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// The `Depends` field, parsed to a [DependencySet].
    pub fn dependencies(&self) -> &DependencySet {
        &self.dependencies
    }

    /// Whether this package depends on the named package in any alternative.
    pub fn depends_on(&self, package: &str) -> bool {
        self.dependencies.contains_package(package)
    }

    /// The original paragraph text this record was built from.
    pub fn raw_paragraph(&self) -> &str {
        &self.raw_paragraph
    }
}

impl Display for PackageRecord {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "PackageRecord(name={:?}, status={:?}, priority={:?}, section={:?}, installed_size={:?}, architecture={:?})",
            self.name,
            self.status,
            self.priority,
            self.section,
            self.installed_size,
            self.architecture
        )
    }
}
