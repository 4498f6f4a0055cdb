// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/*! Defines primitives in control files.

The dpkg status database is a control file: a series of *paragraphs* separated by
blank lines, each paragraph holding `Name: value` *fields*. A field's value may be
continued on following lines that begin with a space or tab.

See <https://www.debian.org/doc/debian-policy/ch-controlfields.html>
for the canonical source of truth for how control files work. Parsing here is
deliberately lenient: nothing in this module can fail.
*/

use std::{
    borrow::Cow,
    collections::HashMap,
    fmt::{Display, Formatter},
};

/// The delimiter between paragraphs in a control file.
pub const PARAGRAPH_DELIMITER: &str = "\n\n";

/// Split the content of a control file into paragraph strings.
///
/// Splitting occurs on every blank line (two consecutive newlines). No trimming is
/// performed, so leading and trailing empty paragraphs are emitted as-is. Consumers
/// are expected to tolerate them: they parse to a [ControlParagraph] without fields.
pub fn iter_paragraphs(data: &str) -> impl Iterator<Item = &str> {
    data.split(PARAGRAPH_DELIMITER)
}

/// Fold continuation lines into their logical line.
///
/// A newline followed by a space or tab is replaced by a single space. Any further
/// indentation on the continuation line is preserved.
pub fn fold_continuations(paragraph: &str) -> Cow<'_, str> {
    if !paragraph.contains("\n ") && !paragraph.contains("\n\t") {
        return Cow::Borrowed(paragraph);
    }

    let mut folded = String::with_capacity(paragraph.len());
    let mut chars = paragraph.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '\n' && matches!(chars.peek(), Some(' ') | Some('\t')) {
            chars.next();
            folded.push(' ');
        } else {
            folded.push(c);
        }
    }

    Cow::Owned(folded)
}

/// Split a logical line into a trimmed field name and value.
///
/// The split occurs at the first colon. A line without a colon yields the whole
/// trimmed line as the name and an empty value. Blank lines yield [None].
fn split_field(line: &str) -> Option<(&str, &str)> {
    if line.trim().is_empty() {
        return None;
    }

    Some(match line.split_once(':') {
        Some((name, value)) => (name.trim(), value.trim()),
        None => (line.trim(), ""),
    })
}

/// A field in a control file.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ControlField<'a> {
    name: Cow<'a, str>,
    value: Cow<'a, str>,
}

impl<'a> ControlField<'a> {
    /// Construct an instance from a field name and value.
    pub fn new(name: Cow<'a, str>, value: Cow<'a, str>) -> Self {
        Self { name, value }
    }

    /// The name of this field.
    pub fn name(&self) -> &str {
        self.name.as_ref()
    }

    /// Obtain the value as a [&str].
    ///
    /// Continuation lines have already been folded into the value.
    pub fn value_str(&self) -> &str {
        self.value.as_ref()
    }

    /// Obtain an iterator of words in the value.
    pub fn iter_words(&self) -> Box<(dyn Iterator<Item = &str> + '_)> {
        Box::new(self.value.as_ref().split_ascii_whitespace())
    }

    /// Convert into an instance not borrowing from its source.
    pub fn into_owned(self) -> ControlField<'static> {
        ControlField {
            name: Cow::Owned(self.name.into_owned()),
            value: Cow::Owned(self.value.into_owned()),
        }
    }
}

impl<'a> Display for ControlField<'a> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}: {}", self.name, self.value)
    }
}

/// A paragraph in a control file.
///
/// A paragraph is an ordered series of control fields.
///
/// Field names are case sensitive. A paragraph only holds a single occurrence of a
/// field: setting a field that already exists replaces the old value, so the last
/// occurrence in the source text wins.
#[derive(Clone, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ControlParagraph<'a> {
    fields: Vec<ControlField<'a>>,
}

impl<'a> ControlParagraph<'a> {
    /// Parse the text of a single paragraph.
    ///
    /// Continuation lines are folded, then every logical line is split at its first
    /// colon into a name and value. Malformed lines never error. A line without a
    /// colon becomes a field named after the whole line with an empty value.
    pub fn parse(paragraph: &'a str) -> Self {
        let mut res = Self::default();

        match fold_continuations(paragraph) {
            Cow::Borrowed(s) => {
                for (name, value) in s.lines().filter_map(split_field) {
                    res.set_field_from_string(Cow::Borrowed(name), Cow::Borrowed(value));
                }
            }
            Cow::Owned(s) => {
                for (name, value) in s.lines().filter_map(split_field) {
                    res.set_field_from_string(
                        Cow::Owned(name.to_string()),
                        Cow::Owned(value.to_string()),
                    );
                }
            }
        }

        res
    }

    /// Whether the paragraph is empty.
    ///
    /// Empty is defined by the lack of any fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// The number of distinct fields in this paragraph.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Set the value of a field via a [ControlField].
    ///
    /// If a field with the same name already exists, the old value will be replaced by
    /// the incoming value.
    pub fn set_field(&mut self, field: ControlField<'a>) {
        self.fields.retain(|cf| cf.name != field.name);
        self.fields.push(field);
    }

    /// Set the value of a field defined via strings.
    pub fn set_field_from_string(&mut self, name: Cow<'a, str>, value: Cow<'a, str>) {
        self.set_field(ControlField::new(name, value));
    }

    /// Whether a named field is present in this paragraph.
    pub fn has_field(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    /// Iterate over fields in this paragraph.
    ///
    /// Iteration order is insertion order. A replaced field moves to the end.
    pub fn iter_fields(&self) -> impl Iterator<Item = &ControlField<'a>> {
        self.fields.iter()
    }

    /// Obtain the field with a given name in this paragraph.
    pub fn field(&self, name: &str) -> Option<&'_ ControlField<'a>> {
        self.fields.iter().find(|f| f.name.as_ref() == name)
    }

    /// Obtain the raw string value of the named field.
    pub fn field_str(&self, name: &str) -> Option<&str> {
        self.field(name).map(|f| f.value_str())
    }

    /// Obtain the string value of the named field, or an empty string if absent.
    pub fn field_str_or_empty(&self, name: &str) -> &str {
        self.field_str(name).unwrap_or_default()
    }

    /// Convert this paragraph to a [HashMap].
    pub fn as_str_hash_map(&self) -> HashMap<&str, &str> {
        HashMap::from_iter(
            self.fields
                .iter()
                .map(|field| (field.name.as_ref(), field.value_str())),
        )
    }

    /// Convert into an instance not borrowing from its source.
    pub fn into_owned(self) -> ControlParagraph<'static> {
        ControlParagraph {
            fields: self.fields.into_iter().map(|f| f.into_owned()).collect(),
        }
    }
}

impl<'a> Display for ControlParagraph<'a> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for field in &self.fields {
            write!(f, "{}", field)?;
        }

        Ok(())
    }
}
