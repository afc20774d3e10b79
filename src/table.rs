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

//! Generic table rendering.
//!
//! [`build_tree`] turns any described field tree into a tree of titled
//! [`RenderNode`]s, bounded by a [`DepthBudget`]. Nested tables carry their
//! full dotted path as title (`Project.metadata`) so output stays
//! unambiguous when two fields share a local name at different levels.
//! [`TextTable`] is the plain-text drawing backend.

use crate::describe::{self, Describe, FieldDescriptor, FieldValue};
use crate::format::NONE_STR;

pub const EMPTY_LIST_STR: &str = "<empty list>";

/// Remaining number of nesting levels the renderer may expand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepthBudget {
    Unbounded,
    Limit(u32),
}

impl DepthBudget {
    /// Map the `table.max_depth` config value: negative disables the limit,
    /// `0` renders only the top level.
    pub fn from_config(max_depth: i64) -> Self {
        if max_depth < 0 {
            DepthBudget::Unbounded
        } else {
            DepthBudget::Limit(max_depth as u32)
        }
    }

    /// Budget for one level down, or `None` if descent is exhausted.
    fn descend(self) -> Option<DepthBudget> {
        match self {
            DepthBudget::Unbounded => Some(DepthBudget::Unbounded),
            DepthBudget::Limit(0) => None,
            DepthBudget::Limit(n) => Some(DepthBudget::Limit(n - 1)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldRow {
    pub name: String,
    pub value: String,
    pub description: Option<String>,
}

/// One titled table plus its nested sub-tables.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderNode {
    /// Dot-separated path from the root type, e.g. `Project.metadata`.
    pub title: String,
    pub rows: Vec<FieldRow>,
    pub children: Vec<RenderNode>,
}

/// Build the render tree for a described model. Field order is the
/// extractor's order and is never re-sorted.
pub fn build_tree(fields: &[FieldDescriptor], title: String, budget: DepthBudget) -> RenderNode {
    let mut rows = Vec::with_capacity(fields.len());
    let mut children = Vec::new();

    for field in fields {
        let value = match &field.value {
            FieldValue::Null => NONE_STR.to_string(),
            FieldValue::Scalar(s) => s.to_string(),
            FieldValue::ScalarList(items) => {
                if items.is_empty() {
                    EMPTY_LIST_STR.to_string()
                } else {
                    items
                        .iter()
                        .map(ToString::to_string)
                        .collect::<Vec<_>>()
                        .join(", ")
                }
            }
            FieldValue::Nested(inner) => match budget.descend() {
                None => format!("<{} (max depth)>", field.name),
                Some(child_budget) => {
                    let child_title = format!("{title}.{}", field.name);
                    children.push(build_tree(inner, child_title.clone(), child_budget));
                    format!("<see nested: {child_title}>")
                }
            },
            FieldValue::NestedList(items) => {
                if items.is_empty() {
                    EMPTY_LIST_STR.to_string()
                } else {
                    match budget.descend() {
                        None => format!("<{}: {} items (max depth)>", field.name, items.len()),
                        Some(child_budget) => {
                            let base_title = format!("{title}.{}", field.name);
                            for (idx, item) in items.iter().enumerate() {
                                children.push(build_tree(
                                    item,
                                    format!("{base_title}[{idx}]"),
                                    child_budget,
                                ));
                            }
                            format!("<see nested: {base_title} ({} items)>", items.len())
                        }
                    }
                }
            }
        };
        rows.push(FieldRow {
            name: field.name.to_string(),
            value,
            description: field.description.map(ToString::to_string),
        });
    }

    RenderNode {
        title,
        rows,
        children,
    }
}

/// Build and draw all tables for one model instance. Sub-tables are emitted
/// after their parent, in field order.
pub fn auto_tables(
    item: &dyn Describe,
    budget: DepthBudget,
    with_description: bool,
) -> Vec<TextTable> {
    let fields = describe::extract(item, with_description);
    let tree = build_tree(&fields, item.type_name().to_string(), budget);
    let mut tables = Vec::new();
    draw_tree(&tree, with_description, &mut tables);
    tables
}

fn draw_tree(node: &RenderNode, with_description: bool, out: &mut Vec<TextTable>) {
    let columns: Vec<String> = if with_description {
        vec!["Field".into(), "Value".into(), "Description".into()]
    } else {
        vec!["Field".into(), "Value".into()]
    };
    let mut table = TextTable::with_title(node.title.clone(), columns);
    for row in &node.rows {
        let mut cells = vec![row.name.clone(), row.value.clone()];
        if with_description {
            cells.push(row.description.clone().unwrap_or_default());
        }
        table.add_row(cells);
    }
    out.push(table);
    for child in &node.children {
        draw_tree(child, with_description, out);
    }
}

/// A plain-text table with aligned columns and a dashed header separator.
#[derive(Debug, Clone, PartialEq)]
pub struct TextTable {
    pub title: Option<String>,
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl TextTable {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            title: None,
            columns,
            rows: Vec::new(),
        }
    }

    pub fn with_title(title: String, columns: Vec<String>) -> Self {
        Self {
            title: Some(title),
            columns,
            rows: Vec::new(),
        }
    }

    pub fn add_row(&mut self, row: Vec<String>) {
        debug_assert_eq!(row.len(), self.columns.len());
        self.rows.push(row);
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn render(&self) -> String {
        let mut widths: Vec<usize> = self.columns.iter().map(String::len).collect();
        for row in &self.rows {
            for (idx, cell) in row.iter().enumerate() {
                widths[idx] = widths[idx].max(cell.len());
            }
        }

        let mut out = String::new();
        if let Some(title) = &self.title {
            out.push_str(title);
            out.push('\n');
        }
        for (i, col) in self.columns.iter().enumerate() {
            if i > 0 {
                out.push_str("  ");
            }
            out.push_str(&format!("{:width$}", col, width = widths[i]));
        }
        while out.ends_with(' ') {
            out.pop();
        }
        out.push('\n');
        for (i, width) in widths.iter().enumerate() {
            if i > 0 {
                out.push_str("  ");
            }
            out.push_str(&"-".repeat(*width));
        }
        out.push('\n');
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                if i > 0 {
                    out.push_str("  ");
                }
                out.push_str(&format!("{:width$}", cell, width = widths[i]));
            }
            // Trailing padding on the last column serves no purpose.
            while out.ends_with(' ') {
                out.pop();
            }
            out.push('\n');
        }
        out
    }
}

/// Render a sequence of tables separated by blank lines.
pub fn render_tables(tables: &[TextTable]) -> String {
    tables
        .iter()
        .map(TextTable::render)
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    struct SampleProject;

    impl Describe for SampleProject {
        fn type_name(&self) -> &'static str {
            "Project"
        }

        fn fields(&self) -> Vec<FieldDescriptor> {
            vec![
                FieldDescriptor::scalar("name", "str", "p1"),
                FieldDescriptor::scalar("public", "bool", false),
                FieldDescriptor::nested(
                    "metadata",
                    "Metadata",
                    vec![
                        FieldDescriptor::scalar("severity", "str", "high"),
                        FieldDescriptor::scalar("auto_scan", "bool", true),
                    ],
                ),
            ]
        }
    }

    struct DeepNest;

    impl Describe for DeepNest {
        fn type_name(&self) -> &'static str {
            "Outer"
        }

        fn fields(&self) -> Vec<FieldDescriptor> {
            vec![FieldDescriptor::nested(
                "mid",
                "Mid",
                vec![FieldDescriptor::nested(
                    "inner",
                    "Inner",
                    vec![FieldDescriptor::scalar("leaf", "int", 1i64)],
                )],
            )]
        }
    }

    #[test]
    fn unbounded_depth_yields_parent_and_child_tables() {
        let tables = auto_tables(&SampleProject, DepthBudget::Unbounded, false);
        assert_eq!(tables.len(), 2);
        assert_eq!(tables[0].title.as_deref(), Some("Project"));
        assert_eq!(tables[1].title.as_deref(), Some("Project.metadata"));

        let root = tables[0].render();
        assert!(root.contains("name"));
        assert!(root.contains("p1"));
        assert!(root.contains("public"));
        assert!(root.contains("false"));
        assert!(root.contains("<see nested: Project.metadata>"));

        let child = tables[1].render();
        assert!(child.contains("severity"));
        assert!(child.contains("high"));
        assert!(child.contains("auto_scan"));
        assert!(child.contains("true"));
    }

    #[test]
    fn zero_depth_yields_exactly_one_table() {
        let tables = auto_tables(&SampleProject, DepthBudget::Limit(0), false);
        assert_eq!(tables.len(), 1);
        assert!(tables[0].render().contains("<metadata (max depth)>"));
    }

    #[test]
    fn depth_limit_bounds_title_segments() {
        let tables = auto_tables(&DeepNest, DepthBudget::Limit(1), false);
        assert_eq!(tables.len(), 2);
        assert_eq!(tables[1].title.as_deref(), Some("Outer.mid"));
        assert!(tables[1].render().contains("<inner (max depth)>"));

        for table in &tables {
            let segments = table.title.as_deref().unwrap().split('.').count();
            assert!(segments <= 2, "title exceeds depth budget");
        }
    }

    #[test]
    fn nested_list_children_are_indexed() {
        struct WithList;
        impl Describe for WithList {
            fn type_name(&self) -> &'static str {
                "Artifact"
            }
            fn fields(&self) -> Vec<FieldDescriptor> {
                vec![FieldDescriptor::nested_list(
                    "tags",
                    "Tag",
                    vec![
                        vec![FieldDescriptor::scalar("name", "str", "latest")],
                        vec![FieldDescriptor::scalar("name", "str", "v1")],
                    ],
                )]
            }
        }

        let tables = auto_tables(&WithList, DepthBudget::Unbounded, false);
        assert_eq!(tables.len(), 3);
        assert_eq!(tables[1].title.as_deref(), Some("Artifact.tags[0]"));
        assert_eq!(tables[2].title.as_deref(), Some("Artifact.tags[1]"));
        assert!(
            tables[0]
                .render()
                .contains("<see nested: Artifact.tags (2 items)>")
        );
    }

    #[test]
    fn empty_list_renders_explicit_marker() {
        struct EmptyList;
        impl Describe for EmptyList {
            fn type_name(&self) -> &'static str {
                "Artifact"
            }
            fn fields(&self) -> Vec<FieldDescriptor> {
                vec![
                    FieldDescriptor::nested_list("tags", "Tag", vec![]),
                    FieldDescriptor::optional("digest", "str", Option::<&str>::None),
                ]
            }
        }

        let tables = auto_tables(&EmptyList, DepthBudget::Unbounded, false);
        assert_eq!(tables.len(), 1);
        let rendered = tables[0].render();
        assert!(rendered.contains(EMPTY_LIST_STR));
        assert!(rendered.contains(NONE_STR));
    }

    #[test]
    fn rendering_is_idempotent() {
        let first = render_tables(&auto_tables(&SampleProject, DepthBudget::Unbounded, true));
        let second = render_tables(&auto_tables(&SampleProject, DepthBudget::Unbounded, true));
        assert_eq!(first, second);
    }

    #[test]
    fn description_column_is_optional() {
        let with = auto_tables(&SampleProject, DepthBudget::Limit(0), true);
        let without = auto_tables(&SampleProject, DepthBudget::Limit(0), false);
        assert!(with[0].render().contains("Description"));
        assert!(!without[0].render().contains("Description"));
    }

    #[test]
    fn text_table_aligns_columns() {
        let mut table = TextTable::new(vec!["Name".into(), "Status".into()]);
        table.add_row(vec!["a".into(), "healthy".into()]);
        table.add_row(vec!["longer-name".into(), "ok".into()]);
        let rendered = table.render();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[0], "Name         Status");
        assert_eq!(lines[1], "-----------  -------");
        assert_eq!(lines[2], "a            healthy");
        assert_eq!(lines[3], "longer-name  ok");
    }
}
