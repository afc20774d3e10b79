//! Hand-authored compact table layouts for well-known types.
//!
//! A compact table shows multiple instances of a model as rows of one table
//! with a curated column set, instead of one field tree per instance. The
//! registry is keyed by type name; an unknown type is not an error, it just
//! means the caller falls back to generic rendering. Adding a compact form
//! only requires registering a new function here.

use crate::format::{bool_str, boolstr_str, bytes_to_str, int_str, plural_str, str_str};
use crate::models::{ApiModel, Artifact, Project, Registry, Repository, SystemInfo, UserResp};
use crate::table::TextTable;
use std::collections::HashMap;
use std::sync::OnceLock;

type CompactFn = fn(&[&dyn ApiModel]) -> Option<TextTable>;

/// Lookup table from type name to compact render function, built once per
/// process and immutable thereafter.
pub struct CompactRegistry {
    entries: HashMap<&'static str, CompactFn>,
}

impl CompactRegistry {
    fn new() -> Self {
        let mut entries: HashMap<&'static str, CompactFn> = HashMap::new();
        entries.insert("Project", project_table);
        entries.insert("Repository", repository_table);
        entries.insert("Artifact", artifact_table);
        entries.insert("Registry", registry_table);
        entries.insert("UserResp", userresp_table);
        entries.insert("SystemInfo", systeminfo_table);
        Self { entries }
    }

    pub fn global() -> &'static Self {
        static REGISTRY: OnceLock<CompactRegistry> = OnceLock::new();
        REGISTRY.get_or_init(CompactRegistry::new)
    }

    /// Render `items` compactly, or `None` if no compact form exists for
    /// this type (the caller should fall back to generic rendering).
    pub fn render(&self, type_name: &str, items: &[&dyn ApiModel]) -> Option<TextTable> {
        let func = self.entries.get(type_name)?;
        func(items)
    }

    pub fn has(&self, type_name: &str) -> bool {
        self.entries.contains_key(type_name)
    }
}

fn downcast_all<'a, T: 'static>(items: &'a [&dyn ApiModel]) -> Option<Vec<&'a T>> {
    items
        .iter()
        .map(|item| item.as_any().downcast_ref::<T>())
        .collect()
}

fn project_table(items: &[&dyn ApiModel]) -> Option<TextTable> {
    let projects = downcast_all::<Project>(items)?;
    let mut table = TextTable::with_title(
        plural_str("Project", projects.len()),
        vec![
            "ID".into(),
            "Name".into(),
            "Public".into(),
            "Repositories".into(),
            "Created".into(),
        ],
    );
    for project in projects {
        let public = match &project.metadata {
            Some(metadata) => boolstr_str(metadata.public.as_deref()),
            None => "Unknown".to_string(),
        };
        table.add_row(vec![
            int_str(project.project_id),
            project.name.clone(),
            public,
            int_str(project.repo_count),
            str_str(project.creation_time.as_deref()),
        ]);
    }
    Some(table)
}

fn repository_table(items: &[&dyn ApiModel]) -> Option<TextTable> {
    let repos = downcast_all::<Repository>(items)?;
    let mut table = TextTable::with_title(
        plural_str("Repository", repos.len()),
        vec![
            "Project".into(),
            "Name".into(),
            "Artifacts".into(),
            "Pulls".into(),
            "Created".into(),
        ],
    );
    for repo in repos {
        table.add_row(vec![
            repo.project_name().to_string(),
            repo.name.clone(),
            int_str(repo.artifact_count),
            int_str(repo.pull_count),
            str_str(repo.creation_time.as_deref()),
        ]);
    }
    Some(table)
}

fn artifact_table(items: &[&dyn ApiModel]) -> Option<TextTable> {
    let artifacts = downcast_all::<Artifact>(items)?;
    let mut table = TextTable::with_title(
        plural_str("Artifact", artifacts.len()),
        vec![
            "Digest".into(),
            "Tags".into(),
            "Size".into(),
            "Media Type".into(),
            "Pushed".into(),
        ],
    );
    for artifact in artifacts {
        let size = match artifact.size {
            Some(size) => bytes_to_str(size),
            None => str_str(None),
        };
        table.add_row(vec![
            str_str(artifact.digest.as_deref()),
            artifact.tag_names().join(", "),
            size,
            str_str(artifact.media_type.as_deref()),
            str_str(artifact.push_time.as_deref()),
        ]);
    }
    Some(table)
}

fn registry_table(items: &[&dyn ApiModel]) -> Option<TextTable> {
    let registries = downcast_all::<Registry>(items)?;
    let mut table = TextTable::with_title(
        plural_str("Registry", registries.len()),
        vec![
            "ID".into(),
            "URL".into(),
            "Name".into(),
            "Type".into(),
            "Insecure".into(),
            "Status".into(),
            "Created".into(),
        ],
    );
    for registry in registries {
        table.add_row(vec![
            int_str(registry.id),
            str_str(registry.url.as_deref()),
            registry.name.clone(),
            str_str(registry.kind.as_deref()),
            bool_str(registry.insecure),
            str_str(registry.status.as_deref()),
            str_str(registry.creation_time.as_deref()),
        ]);
    }
    Some(table)
}

fn userresp_table(items: &[&dyn ApiModel]) -> Option<TextTable> {
    let users = downcast_all::<UserResp>(items)?;
    let mut table = TextTable::with_title(
        plural_str("User", users.len()),
        vec!["ID".into(), "Username".into(), "Full Name".into()],
    );
    for user in users {
        table.add_row(vec![
            int_str(user.user_id),
            user.username.clone(),
            str_str(user.realname.as_deref()),
        ]);
    }
    Some(table)
}

fn systeminfo_table(items: &[&dyn ApiModel]) -> Option<TextTable> {
    let infos = downcast_all::<SystemInfo>(items)?;
    let mut table = TextTable::with_title(
        "Storage".to_string(),
        vec![
            "Total Capacity".into(),
            "Free Space".into(),
            "Used Space".into(),
        ],
    );
    for info in infos {
        let volumes = info.storage.as_deref().unwrap_or_default();
        if volumes.is_empty() {
            table.add_row(vec![bytes_to_str(0), bytes_to_str(0), bytes_to_str(0)]);
            continue;
        }
        // One volume per row. Used space is derived from total and free.
        for volume in volumes {
            let total = volume.total.unwrap_or(0);
            let free = volume.free.unwrap_or(0);
            let used = total.saturating_sub(free);
            table.add_row(vec![
                bytes_to_str(total),
                bytes_to_str(free),
                bytes_to_str(used),
            ]);
        }
    }
    Some(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ProjectMetadata, Storage};

    #[test]
    fn lookup_misses_report_no_compact_form() {
        let registry = CompactRegistry::global();
        assert!(!registry.has("Tag"));
        assert!(registry.render("Tag", &[]).is_none());
    }

    #[test]
    fn project_rows_follow_input_order() {
        let first = Project {
            project_id: Some(2),
            name: "beta".into(),
            metadata: Some(ProjectMetadata {
                public: Some("true".into()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let second = Project {
            project_id: Some(1),
            name: "alpha".into(),
            ..Default::default()
        };
        let items: Vec<&dyn ApiModel> = vec![&first, &second];
        let table = CompactRegistry::global()
            .render("Project", &items)
            .unwrap();
        assert_eq!(table.title.as_deref(), Some("Projects"));
        let rendered = table.render();
        let beta = rendered.find("beta").unwrap();
        let alpha = rendered.find("alpha").unwrap();
        assert!(beta < alpha, "row order must match input order");
        assert!(rendered.contains("Unknown"));
    }

    #[test]
    fn systeminfo_derives_used_space() {
        let info = SystemInfo {
            storage: Some(vec![Storage {
                total: Some(2_000_000_000),
                free: Some(500_000_000),
            }]),
        };
        let items: Vec<&dyn ApiModel> = vec![&info];
        let table = CompactRegistry::global()
            .render("SystemInfo", &items)
            .unwrap();
        let rendered = table.render();
        assert!(rendered.contains("2.00 GB"));
        assert!(rendered.contains("500.00 MB"));
        assert!(rendered.contains("1.50 GB"));
    }

    #[test]
    fn systeminfo_without_volumes_renders_zero_row() {
        let info = SystemInfo { storage: None };
        let items: Vec<&dyn ApiModel> = vec![&info];
        let table = CompactRegistry::global()
            .render("SystemInfo", &items)
            .unwrap();
        assert!(table.render().contains("0 B"));
    }

    #[test]
    fn artifact_sizes_are_humanized() {
        let artifact = Artifact {
            digest: Some("sha256:abc".into()),
            size: Some(15_000_000),
            tags: Some(vec![crate::models::Tag {
                name: "latest".into(),
                ..Default::default()
            }]),
            ..Default::default()
        };
        let items: Vec<&dyn ApiModel> = vec![&artifact];
        let table = CompactRegistry::global()
            .render("Artifact", &items)
            .unwrap();
        let rendered = table.render();
        assert!(rendered.contains("15.00 MB"));
        assert!(rendered.contains("latest"));
    }
}
