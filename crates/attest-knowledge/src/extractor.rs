//! Résumé parsing and fact extraction

use crate::availability::Availability;
use crate::error::Result;
use crate::profile::{Profile, ProjectEntry, RoleEntry};
use crate::sections::{is_bullet, sections_of, split_sections, strip_bullet, Section, SectionKind};
use attest_domain::{Fact, FactKind, FactSet, Period};
use regex::Regex;

/// Longest string accepted as a single skill
const MAX_SKILL_LEN: usize = 60;

/// Words that stand in for an open end date
const ONGOING: &[&str] = &["current", "present", "now"];

/// Turns résumé text into a [`Profile`] and a [`FactSet`]
///
/// Pure with respect to its inputs. Anything that fails to parse is logged
/// and left out; extraction itself never fails.
///
/// # Examples
///
/// ```
/// use attest_knowledge::{Availability, Extractor};
/// use attest_domain::FactKind;
///
/// let extractor = Extractor::new().unwrap();
/// let resume = "EXPERIENCE\nCompany: Acme Corp\nRole: Staff Engineer\nDates: 2019 - 2022\n";
/// let facts = extractor.extract(resume, &Availability::unknown());
///
/// assert_eq!(facts.count(FactKind::DateRange), 1);
/// assert_eq!(facts.lookup(FactKind::Role, "staff engineer").next().unwrap().value, "Acme Corp");
/// ```
#[derive(Debug, Clone)]
pub struct Extractor {
    company: Regex,
    caps_header: Regex,
    field: Regex,
    project_tag: Regex,
    repo_tag: Regex,
}

impl Extractor {
    /// Compile the extraction patterns
    pub fn new() -> Result<Self> {
        Ok(Self {
            company: Regex::new(r"(?i)^company\s*:\s*(.+)$")?,
            caps_header: Regex::new(r"^([A-Z][A-Z0-9&.'/ -]*[A-Z0-9.])\s*\(([^()]+)\)$")?,
            field: Regex::new(r"^([A-Za-z][A-Za-z /]{0,24}?)\s*:\s*(.*)$")?,
            project_tag: Regex::new(r"(?i)^\[PROJECT:\s*(.+?)\s*\]\s*(.*)$")?,
            repo_tag: Regex::new(r"(?i)\[REPO:\s*([^\]\s]+)\s*\]")?,
        })
    }

    /// Extract the fact set for one knowledge-source snapshot
    pub fn extract(&self, source_text: &str, availability: &Availability) -> FactSet {
        let profile = self.extract_profile(source_text);
        facts_from(&profile, availability)
    }

    /// Parse the résumé into summary, experience, projects and skills
    pub fn extract_profile(&self, source_text: &str) -> Profile {
        let sections = split_sections(source_text);
        if sections.is_empty() && !source_text.trim().is_empty() {
            tracing::warn!("Knowledge source has no recognisable section headings");
        }
        for kind in [SectionKind::Summary, SectionKind::Experience, SectionKind::Projects, SectionKind::Skills] {
            if sections_of(&sections, kind).next().is_none() {
                tracing::warn!("Section {} missing from knowledge source", kind.label());
            }
        }

        Profile {
            summary: parse_summary(&joined_lines(&sections, SectionKind::Summary)),
            experience: self.parse_experience(&joined_lines(&sections, SectionKind::Experience)),
            // each block is parsed on its own so a title opening one is not read as a note
            projects: sections_of(&sections, SectionKind::Projects)
                .flat_map(|s| self.parse_projects(&s.lines))
                .collect(),
            skills: self.parse_skills(&joined_lines(&sections, SectionKind::Skills)),
        }
    }

    fn parse_experience(&self, lines: &[&str]) -> Vec<RoleEntry> {
        let mut entries = Vec::new();
        let mut current: Option<RoleEntry> = None;

        for raw in lines {
            let line = raw.trim();
            if line.is_empty() {
                continue;
            }

            if let Some(caps) = self.company.captures(line) {
                entries.extend(current.take());
                current = Some(RoleEntry::new(caps[1].trim()));
                continue;
            }

            if let Some(entry) = parse_pipe_header(line).or_else(|| self.parse_caps_header(line)) {
                entries.extend(current.take());
                current = Some(entry);
                continue;
            }

            let Some(entry) = current.as_mut() else {
                tracing::debug!("Ignoring experience line outside an entry: {}", line);
                continue;
            };

            match self.field(line) {
                Some((key, value)) if matches!(key.as_str(), "role" | "title" | "position") => {
                    entry.role = Some(value.to_string());
                }
                Some((key, value)) if matches!(key.as_str(), "dates" | "period" | "duration") => {
                    entry.dates = Some(value.to_string());
                    entry.period = parse_period_logged(&entry.employer, value);
                }
                _ => entry.description.push(strip_bullet(line).to_string()),
            }
        }

        entries.extend(current);
        entries
    }

    /// `EMPLOYER (Role, dates)`; either part of the context may be missing
    fn parse_caps_header(&self, line: &str) -> Option<RoleEntry> {
        if is_bullet(line) {
            return None;
        }
        let caps = self.caps_header.captures(line)?;
        let mut entry = RoleEntry::new(caps[1].trim());

        for part in caps[2].split([',', ';', '|']).map(str::trim).filter(|p| !p.is_empty()) {
            if entry.dates.is_none() {
                if let Some(period) = Period::parse(part) {
                    entry.dates = Some(part.to_string());
                    entry.period = Some(period);
                    continue;
                }
                if ONGOING.contains(&part.to_lowercase().as_str()) {
                    entry.dates = Some(part.to_string());
                    continue;
                }
            }
            if entry.role.is_none() {
                entry.role = Some(part.to_string());
            } else {
                entry.description.push(part.to_string());
            }
        }

        Some(entry)
    }

    fn parse_projects(&self, lines: &[&str]) -> Vec<ProjectEntry> {
        let mut projects = Vec::new();
        let mut current: Option<ProjectEntry> = None;
        let mut after_blank = true;

        for raw in lines {
            let line = raw.trim();
            if line.is_empty() {
                after_blank = true;
                continue;
            }
            let starts_block = after_blank;
            after_blank = false;

            let repo = self.repo_tag.captures(line).map(|c| c[1].to_string());
            let without_repo = self.repo_tag.replace_all(line, "");
            let text = without_repo.trim();

            if let Some(caps) = self.project_tag.captures(line) {
                projects.extend(current.take());
                let name = self.repo_tag.replace_all(&caps[1], "").trim().to_string();
                let mut project = ProjectEntry::new(name);
                project.repo = repo;
                current = Some(project);
                continue;
            }

            let field = self.field(text);
            let is_title = starts_block
                && field.is_none()
                && !is_bullet(line)
                && !text.is_empty();

            if is_title {
                projects.extend(current.take());
                let name = text.trim_end_matches(|c: char| c == ':' || c == '-').trim();
                let mut project = ProjectEntry::new(name);
                project.repo = repo;
                current = Some(project);
                continue;
            }

            let Some(project) = current.as_mut() else {
                tracing::debug!("Ignoring project line outside a block: {}", line);
                continue;
            };

            if project.repo.is_none() {
                project.repo = repo;
            }

            match field {
                Some((key, value)) => {
                    let value = Some(value.to_string()).filter(|v| !v.is_empty());
                    match key.as_str() {
                        "type" => project.project_type = value,
                        "challenge" => project.challenge = value,
                        "solution" => project.solution = value,
                        "outcome" => project.outcome = value,
                        _ => project.notes.push(text.to_string()),
                    }
                }
                None if !text.is_empty() => project.notes.push(strip_bullet(text).to_string()),
                None => {}
            }
        }

        projects.extend(current);
        projects
    }

    fn parse_skills(&self, lines: &[&str]) -> Vec<String> {
        let mut skills: Vec<String> = Vec::new();

        for raw in lines {
            let line = strip_bullet(raw);
            if line.is_empty() {
                continue;
            }
            let items = match self.field(line) {
                Some((_, rest)) => rest,
                None => line,
            };

            for item in items.split([',', ';', '|', '•']) {
                let item = item.trim().trim_end_matches('.').trim();
                if item.is_empty() || item.len() > MAX_SKILL_LEN {
                    continue;
                }
                if !skills.iter().any(|s| s.eq_ignore_ascii_case(item)) {
                    skills.push(item.to_string());
                }
            }
        }

        skills
    }

    /// Split a `Key: value` line, lower-casing the key
    fn field<'l>(&self, line: &'l str) -> Option<(String, &'l str)> {
        let caps = self.field.captures(line)?;
        let key = caps.get(1)?.as_str().trim().to_lowercase();
        let value = caps.get(2)?.as_str().trim();
        Some((key, value))
    }
}

/// Body lines of every section of `kind`, in document order
fn joined_lines<'a>(sections: &[Section<'a>], kind: SectionKind) -> Vec<&'a str> {
    sections_of(sections, kind)
        .flat_map(|s| s.lines.iter().copied())
        .collect()
}

fn parse_summary(lines: &[&str]) -> String {
    lines
        .iter()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// `role | employer | dates` or `employer | dates`
fn parse_pipe_header(line: &str) -> Option<RoleEntry> {
    let parts: Vec<&str> = line.split('|').map(str::trim).collect();
    match parts.as_slice() {
        [role, employer, dates] if !employer.is_empty() => {
            let mut entry = RoleEntry::new(*employer);
            entry.role = Some(role.to_string()).filter(|r| !r.is_empty());
            entry.dates = Some(dates.to_string());
            entry.period = parse_period_logged(employer, dates);
            Some(entry)
        }
        [employer, dates] if !employer.is_empty() => {
            let period = Period::parse(dates)?;
            let mut entry = RoleEntry::new(*employer);
            entry.dates = Some(dates.to_string());
            entry.period = Some(period);
            Some(entry)
        }
        _ => None,
    }
}

fn parse_period_logged(employer: &str, dates: &str) -> Option<Period> {
    let period = Period::parse(dates);
    if period.is_none() {
        tracing::warn!("Unparseable dates '{}' for {}; DATE_RANGE omitted", dates, employer);
    }
    period
}

/// Flatten a profile and availability record into facts
pub fn facts_from(profile: &Profile, availability: &Availability) -> FactSet {
    let mut facts = Vec::new();

    for entry in &profile.experience {
        facts.push(Fact::new(FactKind::Employer, &entry.employer, &entry.employer));
        if let Some(role) = &entry.role {
            facts.push(Fact::new(FactKind::Role, role, &entry.employer));
        }
        if let Some(period) = entry.period {
            facts.push(Fact::date_range(&entry.employer, period));
        }
    }

    for project in &profile.projects {
        let value = project.project_type.as_deref().unwrap_or(&project.name);
        facts.push(Fact::new(FactKind::Project, &project.name, value));
        if let Some(url) = &project.repo {
            facts.push(Fact::new(FactKind::RepoLink, &project.name, url));
        }
    }

    for skill in &profile.skills {
        facts.push(Fact::new(FactKind::Skill, skill, skill));
    }

    facts.extend(availability.facts());

    let facts = FactSet::new(facts);
    tracing::debug!(
        "Extracted {} facts ({} employers, {} projects, {} skills)",
        facts.len(),
        facts.count(FactKind::Employer),
        facts.count(FactKind::Project),
        facts.count(FactKind::Skill)
    );
    facts
}

#[cfg(test)]
mod tests {
    use super::*;
    use attest_domain::{PeriodDate, PeriodEnd, Tenure};

    fn extractor() -> Extractor {
        Extractor::new().unwrap()
    }

    #[test]
    fn test_company_blocks() {
        let text = "EXPERIENCE\n\
            Company: Acme Corp\n\
            Role: Staff Engineer\n\
            Dates: Jan 2019 - Mar 2022\n\
            - Led the platform team\n\
            \n\
            Company: Globex\n\
            Title: Consultant\n\
            Period: 2022 - Present\n";
        let profile = extractor().extract_profile(text);

        assert_eq!(profile.experience.len(), 2);
        let acme = &profile.experience[0];
        assert_eq!(acme.role.as_deref(), Some("Staff Engineer"));
        assert_eq!(acme.tenure(), Some(Tenure::Closed { months: 38 }));
        assert_eq!(acme.description, vec!["Led the platform team"]);
        assert_eq!(profile.experience[1].tenure(), Some(Tenure::Ongoing));
    }

    #[test]
    fn test_pipe_headers() {
        let text = "WORK EXPERIENCE\n\
            Senior Engineer | Initech | 2015 – 2018\n\
            Built things.\n\
            Hooli | 2012 - 2015\n";
        let profile = extractor().extract_profile(text);

        assert_eq!(profile.experience.len(), 2);
        assert_eq!(profile.experience[0].employer, "Initech");
        assert_eq!(profile.experience[0].role.as_deref(), Some("Senior Engineer"));
        assert_eq!(profile.experience[1].employer, "Hooli");
        assert!(profile.experience[1].role.is_none());
        assert_eq!(
            profile.experience[1].period.unwrap().end,
            PeriodEnd::Date(PeriodDate::year(2015))
        );
    }

    #[test]
    fn test_bad_dates_keep_entry_without_range() {
        let text = "EXPERIENCE\nCompany: Acme\nDates: a while ago\n";
        let facts = extractor().extract(text, &Availability::unknown());

        assert_eq!(facts.count(FactKind::Employer), 1);
        assert_eq!(facts.count(FactKind::DateRange), 0);
    }

    #[test]
    fn test_projects_tagged_and_plain() {
        let text = "PROJECT PORTFOLIO\n\
            [PROJECT: Atlas Engine]\n\
            Type: Governance runtime\n\
            Challenge: Hallucinated claims\n\
            Solution: Claim verification\n\
            Outcome: Zero false claims\n\
            [REPO: https://github.com/jane/atlas]\n\
            \n\
            Ledger Sync [REPO: https://github.com/jane/ledger]\n\
            - Offline-first sync engine\n";
        let profile = extractor().extract_profile(text);

        assert_eq!(profile.projects.len(), 2);
        let atlas = &profile.projects[0];
        assert_eq!(atlas.name, "Atlas Engine");
        assert_eq!(atlas.outcome.as_deref(), Some("Zero false claims"));
        assert_eq!(atlas.repo.as_deref(), Some("https://github.com/jane/atlas"));

        let ledger = &profile.projects[1];
        assert_eq!(ledger.name, "Ledger Sync");
        assert_eq!(ledger.repo.as_deref(), Some("https://github.com/jane/ledger"));
        assert_eq!(ledger.notes, vec!["Offline-first sync engine"]);
    }

    #[test]
    fn test_skills_labels_and_dedup() {
        let text = "TECHNICAL SKILLS\n\
            Languages: Rust, Python, TypeScript\n\
            - Kubernetes; Docker\n\
            - rust\n";
        let profile = extractor().extract_profile(text);
        assert_eq!(profile.skills, vec!["Rust", "Python", "TypeScript", "Kubernetes", "Docker"]);
    }

    #[test]
    fn test_facts_from_profile() {
        let text = "EXPERIENCE\n\
            Staff Engineer | Acme Corp | 2019 - 2022\n\
            PROJECTS\n\
            [PROJECT: Atlas] [REPO: https://github.com/x/y]\n\
            SKILLS\n\
            Rust\n";
        let facts = extractor().extract(text, &Availability::unknown());

        assert_eq!(facts.lookup(FactKind::Employer, "Acme").count(), 1);
        assert_eq!(facts.lookup(FactKind::Role, "Staff Engineer").next().unwrap().value, "Acme Corp");
        assert_eq!(facts.lookup(FactKind::RepoLink, "atlas").next().unwrap().value, "https://github.com/x/y");
        assert_eq!(facts.lookup(FactKind::Project, "Atlas").next().unwrap().value, "Atlas");
        assert_eq!(facts.count(FactKind::Skill), 1);
        assert_eq!(facts.count(FactKind::Availability), 0);
    }

    #[test]
    fn test_missing_sections_yield_empty_parts() {
        let profile = extractor().extract_profile("PROFESSIONAL SUMMARY\nBuilds reliable systems.\n");
        assert_eq!(profile.summary, "Builds reliable systems.");
        assert!(profile.experience.is_empty());
        assert!(profile.projects.is_empty());
    }

    #[test]
    fn test_framed_headings_and_deep_dives() {
        let text = "====================\n\
            IDENTITY\n\
            ====================\n\
            Name: Test Candidate\n\
            Title: Solution Architect\n\
            \n\
            ====================\n\
            PROFESSIONAL EXPERIENCE\n\
            ====================\n\
            Company: GeneDx\n\
            Role: Solution Architect\n\
            Period: 2022 - 2024\n\
            \n\
            ====================\n\
            PROJECT DEEP DIVES\n\
            ====================\n\
            [PROJECT: Atlas Engine]\n\
            Type: Governance runtime\n\
            Challenge: Hallucinated claims\n\
            Solution: Claim verification\n\
            Outcome: Zero false claims\n\
            [REPO: https://github.com/x/y]\n\
            \n\
            [PROJECT: VoiceVerdict]\n\
            Type: Voice analytics\n";
        let facts = extractor().extract(text, &Availability::unknown());

        assert_eq!(facts.count(FactKind::Project), 2);
        assert_eq!(
            facts.lookup(FactKind::RepoLink, "Atlas Engine").next().unwrap().value,
            "https://github.com/x/y"
        );
        assert_eq!(facts.lookup(FactKind::Employer, "GeneDx").count(), 1);
        assert_eq!(facts.count(FactKind::DateRange), 1);
        // IDENTITY fields are not employment
        assert_eq!(facts.count(FactKind::Employer), 1);
    }

    #[test]
    fn test_project_tag_inside_experience() {
        let text = "EXPERIENCE\n\
            Company: Acme Corp\n\
            Role: Staff Engineer\n\
            [PROJECT: Atlas Engine] [REPO: https://github.com/x/y]\n\
            Type: Governance runtime\n\
            \n\
            Dates: 2019 - 2022\n";
        let profile = extractor().extract_profile(text);

        assert_eq!(profile.projects.len(), 1);
        assert_eq!(profile.projects[0].repo.as_deref(), Some("https://github.com/x/y"));
        assert_eq!(profile.experience.len(), 1);
        assert_eq!(profile.experience[0].dates.as_deref(), Some("2019 - 2022"));
        assert!(profile.experience[0].description.is_empty());
    }

    #[test]
    fn test_caps_header_with_context() {
        let text = "PROFESSIONAL EXPERIENCE\n\
            NEURAFLASH (Senior Consultant, 2019 - 2022)\n\
            - Led Salesforce rollouts\n\
            - AWS (Lambda, S3)\n\
            INDEPENDENT AI ENGINEER (Current)\n";
        let profile = extractor().extract_profile(text);

        assert_eq!(profile.experience.len(), 2);
        let neuraflash = &profile.experience[0];
        assert_eq!(neuraflash.employer, "NEURAFLASH");
        assert_eq!(neuraflash.role.as_deref(), Some("Senior Consultant"));
        assert_eq!(neuraflash.dates.as_deref(), Some("2019 - 2022"));
        assert_eq!(neuraflash.tenure(), Some(Tenure::Closed { months: 36 }));
        assert_eq!(neuraflash.description, vec!["Led Salesforce rollouts", "AWS (Lambda, S3)"]);

        let independent = &profile.experience[1];
        assert!(independent.role.is_none());
        assert_eq!(independent.dates.as_deref(), Some("Current"));
        assert!(independent.period.is_none());

        let facts = facts_from(&profile, &Availability::unknown());
        assert_eq!(facts.lookup(FactKind::Role, "Senior Consultant").next().unwrap().value, "NEURAFLASH");
        assert_eq!(facts.count(FactKind::DateRange), 1);
    }

    #[test]
    fn test_bare_caps_line_keeps_experience_open() {
        let text = "EXPERIENCE\n\
            Company: Acme Corp\n\
            Role: Staff Engineer\n\
            \n\
            IBM\n\
            Company: Globex\n\
            Role: Consultant\n";
        let facts = extractor().extract(text, &Availability::unknown());

        assert_eq!(facts.count(FactKind::Employer), 2);
        assert_eq!(facts.lookup(FactKind::Employer, "Globex").count(), 1);
        assert_eq!(facts.lookup(FactKind::Role, "Consultant").next().unwrap().value, "Globex");
    }

    #[test]
    fn test_empty_source() {
        let facts = extractor().extract("", &Availability::unknown());
        assert!(facts.is_empty());
    }
}
