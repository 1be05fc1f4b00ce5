//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use attest_domain::{AuditStatus, Fact, FactKind, FactSet, PolicyAction, VerificationOutcome, VerificationResult};
use attest_gatekeeper::{EmploymentVerification, Evaluation};
use attest_knowledge::{AvailabilityReport, Profile, ProjectAudit, ReloadStats};
use colored::*;
use serde::Serialize;
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Format extracted facts, optionally restricted to one kind.
    pub fn format_facts(&self, facts: &FactSet, kind: Option<FactKind>) -> Result<String> {
        let selected: Vec<&Fact> = facts
            .iter()
            .filter(|f| kind.is_none_or(|k| f.kind == k))
            .collect();

        if self.format == OutputFormat::Json {
            return json(&selected);
        }
        if selected.is_empty() {
            return Ok(self.colorize("No facts found.", "yellow"));
        }

        let rows = selected
            .iter()
            .map(|f| [f.kind.to_string(), f.subject.clone(), f.value.clone()])
            .collect();
        Ok(format!(
            "{}\n{}",
            render_table(["Kind", "Subject", "Value"], rows),
            self.info(&format!("{} fact(s)", selected.len()))
        ))
    }

    /// Format a full pipeline evaluation: verdict, claims and audit trail.
    pub fn format_evaluation(&self, evaluation: &Evaluation<'_>) -> Result<String> {
        if self.format == OutputFormat::Json {
            return json(evaluation);
        }

        let decision = &evaluation.decision;
        let verdict = format!(
            "{} ({} verified, {} filtered)",
            decision.action, decision.facts_verified_count, decision.claims_filtered_count
        );
        let mut out = vec![match decision.action {
            PolicyAction::Pass => self.success(&verdict),
            PolicyAction::Filter => self.warning(&verdict),
            PolicyAction::Block => self.error(&verdict),
        }];

        if !evaluation.results.is_empty() {
            out.push(self.format_results(&evaluation.results));
        }

        let audit = evaluation
            .audit
            .entries()
            .iter()
            .map(|e| {
                [
                    e.timestamp.format("%H:%M:%S%.3f").to_string(),
                    e.action.clone(),
                    e.status.to_string(),
                    e.details.clone(),
                ]
            })
            .collect();
        out.push(render_table(["Time", "Action", "Status", "Details"], audit));

        if decision.contact_requested {
            out.push(self.info("Contact form requested"));
        }
        if decision.session_terminated {
            out.push(self.error("Session terminated"));
        }
        if evaluation.audit.contains_status(AuditStatus::Warn) {
            out.push(self.warning("Some checks raised warnings"));
        }
        out.push(String::new());
        out.push(decision.final_text.clone());

        Ok(out.join("\n"))
    }

    /// Format an employment check.
    pub fn format_employment(&self, check: &EmploymentVerification<'_>) -> Result<String> {
        if self.format == OutputFormat::Json {
            return json(check);
        }

        let mut fields = vec![("Employer", &check.employer)];
        fields.extend(check.role.as_ref().map(|r| ("Role", r)));
        fields.extend(check.dates.as_ref().map(|r| ("Dates", r)));

        let rows = fields
            .into_iter()
            .map(|(field, result)| {
                [
                    field.to_string(),
                    result.claim.asserted_value.to_string(),
                    result.outcome.to_string(),
                    result.matched_fact.map(|f| f.value.clone()).unwrap_or_default(),
                ]
            })
            .collect();

        let summary = if check.verified() {
            self.success("Employment record verified")
        } else {
            self.warning("Employment record not verified")
        };
        Ok(format!(
            "{}\n{}",
            render_table(["Field", "Claimed", "Outcome", "Résumé"], rows),
            summary
        ))
    }

    /// Format the structured profile.
    pub fn format_profile(&self, profile: &Profile) -> Result<String> {
        if self.format == OutputFormat::Json {
            return json(profile);
        }
        if profile.is_empty() {
            return Ok(self.colorize("No profile information found.", "yellow"));
        }

        let mut out = Vec::new();
        if !profile.summary.is_empty() {
            out.push(self.colorize("Summary", "cyan"));
            out.push(profile.summary.clone());
        }

        if !profile.experience.is_empty() {
            out.push(self.colorize("Experience", "cyan"));
            let rows = profile
                .experience
                .iter()
                .map(|r| {
                    [
                        r.employer.clone(),
                        r.role.clone().unwrap_or_default(),
                        r.dates.clone().unwrap_or_default(),
                        r.tenure().map(|t| t.to_string()).unwrap_or_default(),
                    ]
                })
                .collect();
            out.push(render_table(["Employer", "Role", "Dates", "Tenure"], rows));
        }

        if !profile.projects.is_empty() {
            out.push(self.colorize("Projects", "cyan"));
            let rows = profile
                .projects
                .iter()
                .map(|p| {
                    [
                        p.name.clone(),
                        p.project_type.clone().unwrap_or_default(),
                        p.repo.clone().unwrap_or_default(),
                    ]
                })
                .collect();
            out.push(render_table(["Name", "Type", "Repository"], rows));
        }

        if !profile.skills.is_empty() {
            out.push(self.colorize("Skills", "cyan"));
            out.push(profile.skills.join(", "));
        }

        Ok(out.join("\n"))
    }

    /// Format the availability report.
    pub fn format_availability(&self, report: &AvailabilityReport) -> Result<String> {
        if self.format == OutputFormat::Json {
            return json(report);
        }

        let mut rows = vec![
            ["Status".to_string(), report.status.clone()],
            ["Available from".to_string(), report.available_from.clone()],
            ["Timezone".to_string(), report.timezone.clone()],
        ];
        if !report.preferred_engagement.is_empty() {
            rows.push([
                "Preferred engagement".to_string(),
                report.preferred_engagement.join(", "),
            ]);
        }
        for (engagement, rate) in &report.rate_card {
            let rate = rate
                .as_str()
                .map(str::to_string)
                .unwrap_or_else(|| rate.to_string());
            rows.push([format!("Rate ({})", engagement), rate]);
        }

        let mut out = render_table(["Field", "Value"], rows);
        if !report.configured {
            out.push('\n');
            out.push_str(&self.warning("No availability record configured"));
        }
        Ok(out)
    }

    /// Format a project architecture audit.
    pub fn format_project(&self, audit: &ProjectAudit) -> Result<String> {
        if self.format == OutputFormat::Json {
            return json(audit);
        }

        match audit {
            ProjectAudit::Found { project } => {
                let mut rows = vec![["name".to_string(), project.name.clone()]];
                rows.extend(
                    project
                        .architecture()
                        .into_iter()
                        .map(|(label, value)| [label.to_string(), value.to_string()]),
                );
                if let Some(repo) = &project.repo {
                    rows.push(["repository".to_string(), repo.clone()]);
                }
                Ok(render_table(["Field", "Value"], rows))
            }
            ProjectAudit::NotFound {
                requested,
                available,
            } => {
                let mut out = self.warning(&format!("No project named '{}'", requested));
                if !available.is_empty() {
                    out.push('\n');
                    out.push_str(&self.info(&format!("Available: {}", available.join(", "))));
                }
                Ok(out)
            }
        }
    }

    /// Format reload worker counters.
    pub fn reload_summary(&self, stats: ReloadStats, version: u64) -> String {
        self.info(&format!(
            "{} check(s), {} reload(s); snapshot version {}",
            stats.checks, stats.reloads, version
        ))
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    fn format_results(&self, results: &[VerificationResult<'_>]) -> String {
        let rows = results
            .iter()
            .map(|r| {
                let outcome = match r.outcome {
                    VerificationOutcome::Verified => "✓ VERIFIED",
                    VerificationOutcome::Unverified => "? UNVERIFIED",
                    VerificationOutcome::Contradicted => "✗ CONTRADICTED",
                };
                [
                    r.claim.kind.to_string(),
                    r.claim.span.text.clone(),
                    outcome.to_string(),
                    r.matched_fact.map(|f| f.value.clone()).unwrap_or_default(),
                ]
            })
            .collect();
        render_table(["Kind", "Claim", "Outcome", "Résumé"], rows)
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            "cyan" => text.cyan().bold().to_string(),
            _ => text.to_string(),
        }
    }
}

fn json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

fn render_table<const N: usize>(header: [&str; N], rows: Vec<[String; N]>) -> String {
    let mut builder = Builder::default();
    builder.push_record(header);
    for row in rows {
        builder.push_record(row);
    }

    let mut table = builder.build();
    table
        .with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Alignment::center()));

    table.to_string()
}
