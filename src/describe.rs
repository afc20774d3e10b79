// harborctl - CLI for the Harbor container registry API
// Copyright (C) 2026 harborctl contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Field-level introspection of API response models.
//!
//! Every renderable model implements [`Describe`], which yields its fields in
//! declaration order as [`FieldDescriptor`]s. The table renderers consume
//! these descriptors instead of the concrete types, so a new model only has
//! to implement `Describe` to get generic table output.

use std::fmt;

/// A single scalar cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Bool(bool),
    Int(i64),
    Uint(u64),
    Float(f64),
    Str(String),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Bool(v) => write!(f, "{v}"),
            Scalar::Int(v) => write!(f, "{v}"),
            Scalar::Uint(v) => write!(f, "{v}"),
            Scalar::Float(v) => write!(f, "{v:.2}"),
            Scalar::Str(v) => write!(f, "{v}"),
        }
    }
}

impl From<bool> for Scalar {
    fn from(v: bool) -> Self {
        Scalar::Bool(v)
    }
}

impl From<i64> for Scalar {
    fn from(v: i64) -> Self {
        Scalar::Int(v)
    }
}

impl From<i32> for Scalar {
    fn from(v: i32) -> Self {
        Scalar::Int(v.into())
    }
}

impl From<u64> for Scalar {
    fn from(v: u64) -> Self {
        Scalar::Uint(v)
    }
}

impl From<f64> for Scalar {
    fn from(v: f64) -> Self {
        Scalar::Float(v)
    }
}

impl From<&str> for Scalar {
    fn from(v: &str) -> Self {
        Scalar::Str(v.to_string())
    }
}

impl From<String> for Scalar {
    fn from(v: String) -> Self {
        Scalar::Str(v)
    }
}

impl From<&String> for Scalar {
    fn from(v: &String) -> Self {
        Scalar::Str(v.clone())
    }
}

/// The value of one described field.
///
/// Absent values are an explicit [`FieldValue::Null`], never a missing entry,
/// so a field list always mirrors the full declaration of its model.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Scalar(Scalar),
    ScalarList(Vec<Scalar>),
    /// Fields of a nested model instance, extracted eagerly.
    Nested(Vec<FieldDescriptor>),
    /// One field list per element of a nested sequence. Length is preserved,
    /// including zero.
    NestedList(Vec<Vec<FieldDescriptor>>),
}

/// One declared field of a model instance.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    pub name: &'static str,
    pub value: FieldValue,
    /// Declared type of the field (e.g. `str`, `int`, `ProjectMetadata`).
    pub type_id: &'static str,
    pub nullable: bool,
    pub description: Option<&'static str>,
}

impl FieldDescriptor {
    pub fn scalar(name: &'static str, type_id: &'static str, value: impl Into<Scalar>) -> Self {
        Self {
            name,
            value: FieldValue::Scalar(value.into()),
            type_id,
            nullable: false,
            description: None,
        }
    }

    /// A nullable scalar field; `None` maps to an explicit null value.
    pub fn optional<S: Into<Scalar>>(
        name: &'static str,
        type_id: &'static str,
        value: Option<S>,
    ) -> Self {
        Self {
            name,
            value: match value {
                Some(v) => FieldValue::Scalar(v.into()),
                None => FieldValue::Null,
            },
            type_id,
            nullable: true,
            description: None,
        }
    }

    pub fn scalar_list<S: Into<Scalar>>(
        name: &'static str,
        type_id: &'static str,
        values: impl IntoIterator<Item = S>,
    ) -> Self {
        Self {
            name,
            value: FieldValue::ScalarList(values.into_iter().map(Into::into).collect()),
            type_id,
            nullable: false,
            description: None,
        }
    }

    pub fn nested(
        name: &'static str,
        type_id: &'static str,
        fields: Vec<FieldDescriptor>,
    ) -> Self {
        Self {
            name,
            value: FieldValue::Nested(fields),
            type_id,
            nullable: false,
            description: None,
        }
    }

    /// A nullable nested field; `None` maps to an explicit null value.
    pub fn optional_nested(
        name: &'static str,
        type_id: &'static str,
        fields: Option<Vec<FieldDescriptor>>,
    ) -> Self {
        Self {
            name,
            value: match fields {
                Some(f) => FieldValue::Nested(f),
                None => FieldValue::Null,
            },
            type_id,
            nullable: true,
            description: None,
        }
    }

    pub fn nested_list(
        name: &'static str,
        type_id: &'static str,
        items: Vec<Vec<FieldDescriptor>>,
    ) -> Self {
        Self {
            name,
            value: FieldValue::NestedList(items),
            type_id,
            nullable: false,
            description: None,
        }
    }

    /// Attach a human-readable description (builder style).
    pub fn describe(mut self, text: &'static str) -> Self {
        self.description = Some(text);
        self
    }
}

/// Static introspection capability for renderable models.
///
/// Implementations must return every declared field exactly once, in
/// declaration order, and must be pure functions of the instance.
pub trait Describe {
    /// The model's type name, used as the lookup key for compact rendering
    /// and schema decoding.
    fn type_name(&self) -> &'static str;

    /// All fields of this instance, in declaration order, with descriptions.
    fn fields(&self) -> Vec<FieldDescriptor>;
}

/// Extract the field tree of a model, optionally stripping descriptions.
pub fn extract(model: &dyn Describe, with_description: bool) -> Vec<FieldDescriptor> {
    let mut fields = model.fields();
    if !with_description {
        strip_descriptions(&mut fields);
    }
    fields
}

fn strip_descriptions(fields: &mut [FieldDescriptor]) {
    for field in fields {
        field.description = None;
        match &mut field.value {
            FieldValue::Nested(inner) => strip_descriptions(inner),
            FieldValue::NestedList(items) => {
                for item in items {
                    strip_descriptions(item);
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Sample;

    impl Describe for Sample {
        fn type_name(&self) -> &'static str {
            "Sample"
        }

        fn fields(&self) -> Vec<FieldDescriptor> {
            vec![
                FieldDescriptor::scalar("name", "str", "p1").describe("the name"),
                FieldDescriptor::optional("owner", "str", Option::<&str>::None),
                FieldDescriptor::nested(
                    "meta",
                    "Meta",
                    vec![FieldDescriptor::scalar("level", "int", 3i64).describe("nesting level")],
                ),
                FieldDescriptor::nested_list("items", "Item", vec![]),
            ]
        }
    }

    #[test]
    fn fields_preserve_declaration_order() {
        let fields = extract(&Sample, true);
        let names: Vec<_> = fields.iter().map(|f| f.name).collect();
        assert_eq!(names, vec!["name", "owner", "meta", "items"]);
    }

    #[test]
    fn absent_values_map_to_explicit_null() {
        let fields = extract(&Sample, true);
        assert_eq!(fields[1].value, FieldValue::Null);
        assert!(fields[1].nullable);
    }

    #[test]
    fn empty_nested_list_keeps_zero_length() {
        let fields = extract(&Sample, true);
        assert_eq!(fields[3].value, FieldValue::NestedList(vec![]));
    }

    #[test]
    fn extract_strips_descriptions_recursively() {
        let fields = extract(&Sample, false);
        assert!(fields[0].description.is_none());
        let FieldValue::Nested(inner) = &fields[2].value else {
            panic!("expected nested field");
        };
        assert!(inner[0].description.is_none());
    }

    #[test]
    fn extraction_is_deterministic() {
        assert_eq!(extract(&Sample, true), extract(&Sample, true));
    }
}
