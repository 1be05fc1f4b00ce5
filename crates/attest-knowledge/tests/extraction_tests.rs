//! End-to-end extraction over a realistic résumé

use attest_domain::traits::FactSource;
use attest_domain::{FactKind, PeriodDate, Tenure};
use attest_knowledge::{
    audit_project, extract, extract_profile, Availability, KnowledgeBase, KnowledgeConfig,
    ProjectAudit,
};
use std::fs;

const RESUME: &str = "\
JANE DOE
Staff Software Engineer
==================================================

PROFESSIONAL SUMMARY
Systems engineer with a decade of experience building reliable
data platforms and developer tooling.

CORE EXPERTISE
- Rust, Go, Python
- Distributed Systems
- Kubernetes

PROFESSIONAL EXPERIENCE

Company: Acme Corp
Role: Staff Engineer
Dates: Jan 2019 - Mar 2022
- Led a team of six on the ingestion platform

Company: Globex
Title: Principal Engineer
Dates: Apr 2022 - Present

Senior Engineer | Initech | 2015 – 2018
Payments reconciliation.

PROJECT PORTFOLIO

[PROJECT: Atlas Engine]
Type: Governance runtime
Challenge: Language models invent employment history
Solution: Claim verification against a curated knowledge source
Outcome: No unverified claims reach visitors
[REPO: https://github.com/jane/atlas]

[PROJECT: Ledger Sync]
Type: Offline-first sync engine

EDUCATION
BSc Computer Science, 2014
";

const AVAILABILITY: &str = r#"{
    "status": "available",
    "available_from": "2026-12-01",
    "preferred_engagement": ["contract"],
    "rate_card": {"contract": "$180/hr"}
}"#;

#[test]
fn test_one_range_fact_per_dated_role() {
    let facts = extract(RESUME, &Availability::unknown()).unwrap();

    assert_eq!(facts.count(FactKind::Employer), 3);
    assert_eq!(facts.count(FactKind::Role), 3);
    assert_eq!(facts.count(FactKind::DateRange), 3);
}

#[test]
fn test_tenure_from_dates() {
    let profile = extract_profile(RESUME).unwrap();
    let tenures: Vec<_> = profile.experience.iter().map(|e| e.tenure()).collect();

    assert_eq!(
        tenures,
        vec![
            Some(Tenure::Closed { months: 38 }),
            Some(Tenure::Ongoing),
            Some(Tenure::Closed { months: 36 }),
        ]
    );
    let globex = &profile.experience[1];
    assert_eq!(globex.period.unwrap().months_as_of(PeriodDate::month(2026, 4)), 48);
}

#[test]
fn test_sections_parsed() {
    let profile = extract_profile(RESUME).unwrap();

    assert!(profile.summary.starts_with("Systems engineer"));
    assert_eq!(
        profile.skills,
        vec!["Rust", "Go", "Python", "Distributed Systems", "Kubernetes"]
    );
    assert_eq!(profile.projects.len(), 2);
    assert_eq!(profile.experience[0].description, vec!["Led a team of six on the ingestion platform"]);
}

#[test]
fn test_repo_tag_becomes_fact() {
    let facts = extract(RESUME, &Availability::unknown()).unwrap();
    let link = facts.lookup(FactKind::RepoLink, "Atlas Engine").next().unwrap();

    assert_eq!(link.value, "https://github.com/jane/atlas");
    assert_eq!(facts.lookup(FactKind::RepoLink, "Ledger Sync").count(), 0);
}

#[test]
fn test_project_audit() {
    let profile = extract_profile(RESUME).unwrap();

    match audit_project(&profile, "atlas") {
        ProjectAudit::Found { project } => {
            assert_eq!(project.solution.as_deref(), Some("Claim verification against a curated knowledge source"));
        }
        other => panic!("expected Atlas Engine, got {:?}", other),
    }
    match audit_project(&profile, "Quantum Toaster") {
        ProjectAudit::NotFound { available, .. } => {
            assert_eq!(available, vec!["Atlas Engine", "Ledger Sync"]);
        }
        other => panic!("expected a miss, got {:?}", other),
    }
}

#[test]
fn test_availability_facts_only_when_known() {
    let known = Availability::from_json(AVAILABILITY).unwrap();
    let facts = extract(RESUME, &known).unwrap();
    assert_eq!(facts.lookup(FactKind::Availability, "status").next().unwrap().value, "available");
    assert_eq!(facts.lookup(FactKind::Availability, "rate").next().unwrap().value, "contract: $180/hr");

    let facts = extract(RESUME, &Availability::unknown()).unwrap();
    assert_eq!(facts.count(FactKind::Availability), 0);
}

#[test]
fn test_knowledge_base_from_files() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("resume.txt"), RESUME).unwrap();
    fs::write(dir.path().join("availability.json"), AVAILABILITY).unwrap();

    let config = KnowledgeConfig {
        resume_path: dir.path().join("resume.txt"),
        availability_path: dir.path().join("availability.json"),
        ..Default::default()
    };
    let kb = KnowledgeBase::open(&config).unwrap();
    let report = kb.availability_report();

    assert_eq!(report.status, "available");
    assert_eq!(report.timezone, "US/Pacific");
    assert_eq!(kb.fact_set().count(FactKind::Project), 2);
}

#[test]
fn test_broken_availability_does_not_break_profile() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("resume.txt"), RESUME).unwrap();
    fs::write(dir.path().join("availability.json"), "{ \"status\": ").unwrap();

    let config = KnowledgeConfig {
        resume_path: dir.path().join("resume.txt"),
        availability_path: dir.path().join("availability.json"),
        ..Default::default()
    };
    let kb = KnowledgeBase::open(&config).unwrap();

    assert_eq!(kb.availability_report().status, "unknown");
    assert_eq!(kb.snapshot().profile().experience.len(), 3);
}
