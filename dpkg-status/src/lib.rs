// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/*! dpkg status database primitives.

This crate parses and queries the dpkg *status* database (typically
`/var/lib/dpkg/status`), the file in which `dpkg` records every package known to a
Debian-flavored system.

The canonical home of this crate is <https://github.com/indygreg/PyOxidizer>. Please file issues
and pull requests there.

# A Tour of Functionality

The status database is a *control file*: blank line delimited *paragraphs* of
`Name: value` fields. Low-level control file primitives are defined in the [control]
module. [control::iter_paragraphs()] splits file content into paragraphs and
[control::ControlParagraph::parse()] turns a paragraph into its fields, folding
continuation lines.

The `Depends` field uses a small language to express dependencies between packages.
The [dependency] module parses it into a [dependency::DependencySet] of
[dependency::AlternativeGroup]. Version constraints are discarded.

[package::PackageRecord] represents one package of the database. It is built from a
paragraph via [package::PackageRecord::from_paragraph()].

The [status] module answers queries against a status file. [status::get_all_packages()],
[status::get_package()] and [status::get_package_and_reverse_dependencies()] are the
entry points. Each call reads and parses the file again. [status::PackageStore] provides
the same queries over content already in memory.

Parsing is lenient and never fails. The only error (see [error]) is failure to read the
status file, which is kept distinct from a package not being found.
*/

pub mod control;
pub mod dependency;
pub mod error;
pub mod package;
pub mod status;
