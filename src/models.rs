//! Typed models for Harbor API responses.
//!
//! Each renderable model implements [`Describe`] by hand so the generic table
//! builder can walk its fields in declaration order, and [`ApiModel`] so the
//! formatter can validate it and the compact registry can downcast it.

use crate::describe::{Describe, FieldDescriptor};
use serde::{Deserialize, Serialize};
use std::any::Any;
use thiserror::Error;

/// Namespace recorded in schema envelopes alongside the type name.
pub const MODULE: &str = "harborctl.models";

pub const SEVERITIES: &[&str] = &["none", "low", "medium", "high", "critical"];

#[derive(Debug, Error)]
#[error("{type_name}.{field}: {reason}")]
pub struct ValidationError {
    pub type_name: &'static str,
    pub field: &'static str,
    pub reason: String,
}

/// A model that can be rendered by the output formatter.
///
/// `as_any` exists so compact render functions can recover their concrete
/// type from a `&dyn ApiModel` slice.
pub trait ApiModel: Describe + std::fmt::Debug {
    fn validate(&self) -> Result<(), ValidationError> {
        Ok(())
    }

    fn as_any(&self) -> &dyn Any;
}

fn check_boolstr(
    type_name: &'static str,
    field: &'static str,
    value: Option<&str>,
) -> Result<(), ValidationError> {
    match value {
        None | Some("true") | Some("false") => Ok(()),
        Some(other) => Err(ValidationError {
            type_name,
            field,
            reason: format!("expected \"true\" or \"false\", got {other:?}"),
        }),
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Project {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<i64>,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repo_count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creation_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ProjectMetadata>,
}

/// Project metadata.
///
/// Harbor returns these booleans as the strings `"true"`/`"false"`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProjectMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_content_trust: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prevent_vul: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_scan: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retention_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Repository {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<i64>,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifact_count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pull_count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creation_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_time: Option<String>,
}

impl Repository {
    /// Repository names are `<project>/<repo>`; the project half.
    pub fn project_name(&self) -> &str {
        self.name.split('/').next().unwrap_or(&self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Artifact {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repository_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub push_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pull_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<Tag>>,
}

impl Artifact {
    pub fn tag_names(&self) -> Vec<String> {
        self.tags
            .as_deref()
            .unwrap_or_default()
            .iter()
            .map(|t| t.name.clone())
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Tag {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub push_time: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Registry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insecure: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creation_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credential: Option<RegistryCredential>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RegistryCredential {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_secret: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UserResp {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub realname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sysadmin_flag: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creation_time: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SystemInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage: Option<Vec<Storage>>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Storage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub free: Option<u64>,
}

impl Describe for Project {
    fn type_name(&self) -> &'static str {
        "Project"
    }

    fn fields(&self) -> Vec<FieldDescriptor> {
        vec![
            FieldDescriptor::optional("project_id", "int", self.project_id)
                .describe("Numeric project ID"),
            FieldDescriptor::scalar("name", "str", &self.name).describe("Project name"),
            FieldDescriptor::optional("owner_name", "str", self.owner_name.as_ref())
                .describe("Name of the project owner"),
            FieldDescriptor::optional("repo_count", "int", self.repo_count)
                .describe("Number of repositories in the project"),
            FieldDescriptor::optional("creation_time", "str", self.creation_time.as_ref()),
            FieldDescriptor::optional("update_time", "str", self.update_time.as_ref()),
            FieldDescriptor::optional_nested(
                "metadata",
                "ProjectMetadata",
                self.metadata.as_ref().map(Describe::fields),
            )
            .describe("Project-level settings"),
        ]
    }
}

impl ApiModel for Project {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError {
                type_name: "Project",
                field: "name",
                reason: "must not be empty".to_string(),
            });
        }
        if let Some(metadata) = &self.metadata {
            metadata.validate()?;
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Describe for ProjectMetadata {
    fn type_name(&self) -> &'static str {
        "ProjectMetadata"
    }

    fn fields(&self) -> Vec<FieldDescriptor> {
        vec![
            FieldDescriptor::optional("public", "str", self.public.as_ref())
                .describe("Whether the project is publicly accessible"),
            FieldDescriptor::optional(
                "enable_content_trust",
                "str",
                self.enable_content_trust.as_ref(),
            )
            .describe("Only allow signed images to be pulled"),
            FieldDescriptor::optional("prevent_vul", "str", self.prevent_vul.as_ref())
                .describe("Block pulls of images with vulnerabilities"),
            FieldDescriptor::optional("severity", "str", self.severity.as_ref())
                .describe("Severity threshold for blocking pulls"),
            FieldDescriptor::optional("auto_scan", "str", self.auto_scan.as_ref())
                .describe("Scan images automatically on push"),
            FieldDescriptor::optional("retention_id", "str", self.retention_id.as_ref()),
        ]
    }
}

impl ProjectMetadata {
    fn validate(&self) -> Result<(), ValidationError> {
        check_boolstr("ProjectMetadata", "public", self.public.as_deref())?;
        check_boolstr(
            "ProjectMetadata",
            "enable_content_trust",
            self.enable_content_trust.as_deref(),
        )?;
        check_boolstr("ProjectMetadata", "prevent_vul", self.prevent_vul.as_deref())?;
        check_boolstr("ProjectMetadata", "auto_scan", self.auto_scan.as_deref())?;
        if let Some(severity) = self.severity.as_deref() {
            if !SEVERITIES.contains(&severity) {
                return Err(ValidationError {
                    type_name: "ProjectMetadata",
                    field: "severity",
                    reason: format!("unknown severity {severity:?}"),
                });
            }
        }
        Ok(())
    }
}

impl Describe for Repository {
    fn type_name(&self) -> &'static str {
        "Repository"
    }

    fn fields(&self) -> Vec<FieldDescriptor> {
        vec![
            FieldDescriptor::optional("id", "int", self.id),
            FieldDescriptor::optional("project_id", "int", self.project_id),
            FieldDescriptor::scalar("name", "str", &self.name)
                .describe("Repository name, prefixed with the project name"),
            FieldDescriptor::optional("description", "str", self.description.as_ref()),
            FieldDescriptor::optional("artifact_count", "int", self.artifact_count)
                .describe("Number of artifacts in the repository"),
            FieldDescriptor::optional("pull_count", "int", self.pull_count)
                .describe("Number of pulls from the repository"),
            FieldDescriptor::optional("creation_time", "str", self.creation_time.as_ref()),
            FieldDescriptor::optional("update_time", "str", self.update_time.as_ref()),
        ]
    }
}

impl ApiModel for Repository {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError {
                type_name: "Repository",
                field: "name",
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Describe for Artifact {
    fn type_name(&self) -> &'static str {
        "Artifact"
    }

    fn fields(&self) -> Vec<FieldDescriptor> {
        vec![
            FieldDescriptor::optional("id", "int", self.id),
            FieldDescriptor::optional("repository_id", "int", self.repository_id),
            FieldDescriptor::optional("digest", "str", self.digest.as_ref())
                .describe("Content digest of the artifact"),
            FieldDescriptor::optional("size", "int", self.size).describe("Size in bytes"),
            FieldDescriptor::optional("media_type", "str", self.media_type.as_ref()),
            FieldDescriptor::optional("push_time", "str", self.push_time.as_ref()),
            FieldDescriptor::optional("pull_time", "str", self.pull_time.as_ref()),
            FieldDescriptor::nested_list(
                "tags",
                "Tag",
                self.tags
                    .as_deref()
                    .unwrap_or_default()
                    .iter()
                    .map(Describe::fields)
                    .collect(),
            )
            .describe("Tags attached to the artifact"),
        ]
    }
}

impl ApiModel for Artifact {
    fn validate(&self) -> Result<(), ValidationError> {
        if let Some(digest) = self.digest.as_deref() {
            if !digest.contains(':') {
                return Err(ValidationError {
                    type_name: "Artifact",
                    field: "digest",
                    reason: format!("expected `<algorithm>:<hex>`, got {digest:?}"),
                });
            }
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Describe for Tag {
    fn type_name(&self) -> &'static str {
        "Tag"
    }

    fn fields(&self) -> Vec<FieldDescriptor> {
        vec![
            FieldDescriptor::optional("id", "int", self.id),
            FieldDescriptor::scalar("name", "str", &self.name),
            FieldDescriptor::optional("push_time", "str", self.push_time.as_ref()),
        ]
    }
}

impl Describe for Registry {
    fn type_name(&self) -> &'static str {
        "Registry"
    }

    fn fields(&self) -> Vec<FieldDescriptor> {
        vec![
            FieldDescriptor::optional("id", "int", self.id),
            FieldDescriptor::scalar("name", "str", &self.name),
            FieldDescriptor::optional("url", "str", self.url.as_ref()),
            FieldDescriptor::optional("type", "str", self.kind.as_ref())
                .describe("Registry provider type (harbor, docker-hub, ...)"),
            FieldDescriptor::optional("insecure", "bool", self.insecure)
                .describe("Whether certificate verification is disabled"),
            FieldDescriptor::optional("description", "str", self.description.as_ref()),
            FieldDescriptor::optional("status", "str", self.status.as_ref()),
            FieldDescriptor::optional("creation_time", "str", self.creation_time.as_ref()),
            FieldDescriptor::optional("update_time", "str", self.update_time.as_ref()),
            FieldDescriptor::optional_nested(
                "credential",
                "RegistryCredential",
                self.credential.as_ref().map(Describe::fields),
            ),
        ]
    }
}

impl ApiModel for Registry {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Describe for RegistryCredential {
    fn type_name(&self) -> &'static str {
        "RegistryCredential"
    }

    fn fields(&self) -> Vec<FieldDescriptor> {
        vec![
            FieldDescriptor::optional("type", "str", self.kind.as_ref()),
            FieldDescriptor::optional("access_key", "str", self.access_key.as_ref()),
            FieldDescriptor::optional("access_secret", "str", self.access_secret.as_ref()),
        ]
    }
}

impl Describe for UserResp {
    fn type_name(&self) -> &'static str {
        "UserResp"
    }

    fn fields(&self) -> Vec<FieldDescriptor> {
        vec![
            FieldDescriptor::optional("user_id", "int", self.user_id),
            FieldDescriptor::scalar("username", "str", &self.username),
            FieldDescriptor::optional("realname", "str", self.realname.as_ref()),
            FieldDescriptor::optional("email", "str", self.email.as_ref()),
            FieldDescriptor::optional("sysadmin_flag", "bool", self.sysadmin_flag)
                .describe("Whether the user is a system administrator"),
            FieldDescriptor::optional("creation_time", "str", self.creation_time.as_ref()),
        ]
    }
}

impl ApiModel for UserResp {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.username.trim().is_empty() {
            return Err(ValidationError {
                type_name: "UserResp",
                field: "username",
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Describe for SystemInfo {
    fn type_name(&self) -> &'static str {
        "SystemInfo"
    }

    fn fields(&self) -> Vec<FieldDescriptor> {
        vec![
            FieldDescriptor::nested_list(
                "storage",
                "Storage",
                self.storage
                    .as_deref()
                    .unwrap_or_default()
                    .iter()
                    .map(Describe::fields)
                    .collect(),
            )
            .describe("Storage volumes of the registry host"),
        ]
    }
}

impl ApiModel for SystemInfo {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Describe for Storage {
    fn type_name(&self) -> &'static str {
        "Storage"
    }

    fn fields(&self) -> Vec<FieldDescriptor> {
        vec![
            FieldDescriptor::optional("total", "int", self.total)
                .describe("Total capacity in bytes"),
            FieldDescriptor::optional("free", "int", self.free).describe("Free space in bytes"),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metadata_rejects_non_boolean_strings() {
        let project = Project {
            name: "library".into(),
            metadata: Some(ProjectMetadata {
                public: Some("yes".into()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let err = project.validate().unwrap_err();
        assert_eq!(err.field, "public");
        assert!(err.to_string().contains("ProjectMetadata.public"));
    }

    #[test]
    fn metadata_rejects_unknown_severity() {
        let metadata = ProjectMetadata {
            severity: Some("catastrophic".into()),
            ..Default::default()
        };
        let err = metadata.validate().unwrap_err();
        assert_eq!(err.field, "severity");
    }

    #[test]
    fn valid_project_passes_validation() {
        let project = Project {
            name: "library".into(),
            metadata: Some(ProjectMetadata {
                public: Some("true".into()),
                severity: Some("high".into()),
                auto_scan: Some("false".into()),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert!(project.validate().is_ok());
    }

    #[test]
    fn repository_project_name_is_first_segment() {
        let repo = Repository {
            name: "library/nginx".into(),
            ..Default::default()
        };
        assert_eq!(repo.project_name(), "library");
    }

    #[test]
    fn artifact_digest_must_carry_algorithm() {
        let artifact = Artifact {
            digest: Some("deadbeef".into()),
            ..Default::default()
        };
        assert!(artifact.validate().is_err());
    }

    #[test]
    fn optional_fields_are_skipped_when_serializing() {
        let project = Project {
            name: "library".into(),
            ..Default::default()
        };
        let json = serde_json::to_string(&project).unwrap();
        assert_eq!(json, r#"{"name":"library"}"#);
    }
}
