//! Structured professional profile parsed from the résumé

use attest_domain::{normalize_subject, Period, Tenure};
use serde::{Deserialize, Serialize};

/// One employment entry from the experience section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleEntry {
    /// Organisation name
    pub employer: String,

    /// Job title, if the entry gave one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,

    /// Date text exactly as written
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dates: Option<String>,

    /// Parsed date range; `None` when the dates did not parse
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period: Option<Period>,

    /// Free-text lines under the entry header
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub description: Vec<String>,
}

impl RoleEntry {
    /// Start an entry for `employer`
    pub fn new(employer: impl Into<String>) -> Self {
        Self {
            employer: employer.into(),
            role: None,
            dates: None,
            period: None,
            description: Vec::new(),
        }
    }

    /// Duration of the role, when the dates parsed
    pub fn tenure(&self) -> Option<Tenure> {
        self.period.map(|p| p.tenure())
    }
}

/// One portfolio project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectEntry {
    /// Project name
    pub name: String,

    /// `Type:` field
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_type: Option<String>,

    /// `Challenge:` field
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub challenge: Option<String>,

    /// `Solution:` field
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solution: Option<String>,

    /// `Outcome:` field
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome: Option<String>,

    /// URL from a `[REPO: <url>]` tag
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo: Option<String>,

    /// Other lines in the project block
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
}

impl ProjectEntry {
    /// Start an entry named `name`
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            project_type: None,
            challenge: None,
            solution: None,
            outcome: None,
            repo: None,
            notes: Vec::new(),
        }
    }

    /// Architecture fields that are present, in résumé order
    pub fn architecture(&self) -> Vec<(&'static str, &str)> {
        [
            ("type", &self.project_type),
            ("challenge", &self.challenge),
            ("solution", &self.solution),
            ("outcome", &self.outcome),
        ]
        .into_iter()
        .filter_map(|(label, value)| value.as_deref().map(|v| (label, v)))
        .collect()
    }
}

/// Summary, experience, projects and skills
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Professional summary paragraph
    pub summary: String,

    /// Employment history in résumé order
    pub experience: Vec<RoleEntry>,

    /// Portfolio projects in résumé order
    pub projects: Vec<ProjectEntry>,

    /// Skills, de-duplicated case-insensitively
    pub skills: Vec<String>,
}

impl Profile {
    /// Whether nothing at all was extracted
    pub fn is_empty(&self) -> bool {
        self.summary.is_empty()
            && self.experience.is_empty()
            && self.projects.is_empty()
            && self.skills.is_empty()
    }
}

/// Result of a project architecture lookup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ProjectAudit {
    /// The project is on the résumé
    Found {
        /// The matched project
        project: ProjectEntry,
    },

    /// No project matched
    NotFound {
        /// Name that was asked for
        requested: String,
        /// Projects that do exist
        available: Vec<String>,
    },
}

/// Look up a project for an architecture deep-dive
///
/// Matching is case-insensitive. An exact name match wins; otherwise the
/// first project whose name contains, or is contained in, the request.
pub fn audit_project(profile: &Profile, name: &str) -> ProjectAudit {
    let wanted = normalize_subject(name);
    let exact = profile
        .projects
        .iter()
        .find(|p| normalize_subject(&p.name) == wanted);
    let found = exact.or_else(|| {
        if wanted.is_empty() {
            return None;
        }
        profile.projects.iter().find(|p| {
            let known = normalize_subject(&p.name);
            known.contains(&wanted) || wanted.contains(&known)
        })
    });

    match found {
        Some(project) => ProjectAudit::Found {
            project: project.clone(),
        },
        None => {
            tracing::debug!("Project audit miss for '{}'", name);
            ProjectAudit::NotFound {
                requested: name.to_string(),
                available: profile.projects.iter().map(|p| p.name.clone()).collect(),
            }
        }
    }
}
