//! Verifier - classifies claims against the fact set

use crate::config::GovernanceConfig;
use attest_domain::{
    normalize_subject, AssertedValue, Claim, Fact, FactKind, FactSet, Period, PeriodDate,
    TenureClaim, TextSpan, VerificationResult,
};
use chrono::NaiveDate;
use serde::Serialize;

/// Calendar formats accepted for availability dates
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%B %d, %Y", "%B %d %Y", "%b %d, %Y", "%b %d %Y", "%m/%d/%Y"];

/// Deterministic claim verifier
///
/// Holds only the reference date and tolerance, so a verifier can be
/// shared across threads and reused for any number of fact sets.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Verifier {
    as_of: PeriodDate,
    tolerance_years: f64,
}

impl Verifier {
    /// Create a verifier measuring ongoing roles up to `as_of`
    pub fn new(as_of: PeriodDate, tolerance_years: f64) -> Self {
        Self {
            as_of,
            tolerance_years,
        }
    }

    /// Create a verifier from governance configuration
    pub fn from_config(config: &GovernanceConfig) -> Self {
        Self::new(config.reference_date(), config.tenure_tolerance_years)
    }

    /// Reference date for ongoing roles
    pub fn as_of(&self) -> PeriodDate {
        self.as_of
    }

    /// Verify every claim, one result per claim in input order
    pub fn verify<'f>(&self, claims: &[Claim], facts: &'f FactSet) -> Vec<VerificationResult<'f>> {
        claims
            .iter()
            .map(|claim| self.verify_claim(claim.clone(), facts))
            .collect()
    }

    /// Verify a single claim
    pub fn verify_claim<'f>(&self, claim: Claim, facts: &'f FactSet) -> VerificationResult<'f> {
        let candidates: Vec<&'f Fact> = facts.lookup(claim.kind, &claim.subject).collect();
        let Some(&first) = candidates.first() else {
            return VerificationResult::unverified(claim);
        };

        let supporting = match claim.kind {
            FactKind::Employer | FactKind::Skill | FactKind::Project => Some(first),
            FactKind::Role => match &claim.asserted_value {
                AssertedValue::Text(employer) => {
                    let employer = normalize_subject(employer);
                    candidates
                        .iter()
                        .copied()
                        .find(|f| normalize_subject(&f.value) == employer)
                }
                _ => None,
            },
            FactKind::DateRange => self.supporting_range(&claim.asserted_value, &candidates),
            FactKind::RepoLink => match &claim.asserted_value {
                AssertedValue::Text(value) if value.contains("://") => {
                    let wanted = canonical_url(value);
                    candidates
                        .iter()
                        .copied()
                        .find(|f| canonical_url(&f.value) == wanted)
                }
                _ => Some(first),
            },
            FactKind::Availability => match &claim.asserted_value {
                AssertedValue::Text(value) => candidates
                    .iter()
                    .copied()
                    .find(|f| availability_matches(value, &f.value)),
                _ => None,
            },
        };

        match supporting {
            Some(fact) => VerificationResult::verified(claim, fact),
            None => VerificationResult::contradicted(claim, first),
        }
    }

    fn supporting_range<'f>(&self, asserted: &AssertedValue, candidates: &[&'f Fact]) -> Option<&'f Fact> {
        let dated: Vec<(&'f Fact, Period)> = candidates
            .iter()
            .filter_map(|f| fact_period(f).map(|p| (*f, p)))
            .collect();

        match asserted {
            AssertedValue::Period(claimed) => self.matching_period(claimed, &dated),
            AssertedValue::Tenure(claimed) => self.matching_tenure(claimed, &dated),
            AssertedValue::Text(text) => {
                let claimed = Period::parse(text)
                    .or_else(|| PeriodDate::parse(text).map(Period::single))?;
                self.matching_period(&claimed, &dated)
            }
        }
    }

    fn matching_period<'f>(&self, claimed: &Period, dated: &[(&'f Fact, Period)]) -> Option<&'f Fact> {
        dated
            .iter()
            .find(|(_, actual)| {
                if claimed.is_single() {
                    actual.contains(claimed.start, self.as_of)
                } else {
                    actual.agrees_with(claimed, self.as_of)
                }
            })
            .map(|(fact, _)| *fact)
    }

    fn matching_tenure<'f>(&self, claimed: &TenureClaim, dated: &[(&'f Fact, Period)]) -> Option<&'f Fact> {
        let accepts = |actual_years: f64| {
            if claimed.at_least {
                actual_years >= claimed.years - self.tolerance_years
            } else {
                (claimed.years - actual_years).abs() <= self.tolerance_years
            }
        };

        if let Some((fact, _)) = dated
            .iter()
            .find(|(_, period)| accepts(period.years_as_of(self.as_of)))
        {
            return Some(*fact);
        }

        // Several stints at one employer: compare against the total
        let total_months: i32 = dated.iter().map(|(_, p)| p.months_as_of(self.as_of)).sum();
        if dated.len() > 1 && accepts(total_months as f64 / 12.0) {
            return dated.first().map(|(fact, _)| *fact);
        }
        None
    }
}

/// Per-field outcome of an employment check
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmploymentVerification<'f> {
    /// Was the employer found
    pub employer: VerificationResult<'f>,
    /// Does the role belong to that employer
    pub role: Option<VerificationResult<'f>>,
    /// Do the dates match the employer's range
    pub dates: Option<VerificationResult<'f>>,
}

impl EmploymentVerification<'_> {
    /// Whether every supplied field verified
    pub fn verified(&self) -> bool {
        self.employer.is_verified()
            && self.role.as_ref().is_none_or(|r| r.is_verified())
            && self.dates.as_ref().is_none_or(|r| r.is_verified())
    }
}

/// Check an employment record field by field
///
/// `dates` may be a range (`2019 - 2022`), a single date or a tenure such
/// as `3 years`.
pub fn verify_employment<'f>(
    verifier: &Verifier,
    employer: &str,
    role: Option<&str>,
    dates: Option<&str>,
    facts: &'f FactSet,
) -> EmploymentVerification<'f> {
    let employer = employer.trim();
    let whole = |text: &str| TextSpan {
        start: 0,
        end: text.len(),
        text: text.to_string(),
    };

    let employer_claim = Claim::new(
        FactKind::Employer,
        employer,
        AssertedValue::Text(employer.to_string()),
        whole(employer),
    );

    let role = role.map(str::trim).filter(|r| !r.is_empty()).map(|role| {
        let claim = Claim::new(
            FactKind::Role,
            role,
            AssertedValue::Text(employer.to_string()),
            whole(role),
        );
        verifier.verify_claim(claim, facts)
    });

    let dates = dates.map(str::trim).filter(|d| !d.is_empty()).map(|dates| {
        let asserted = parse_tenure(dates)
            .map(AssertedValue::Tenure)
            .unwrap_or_else(|| AssertedValue::Text(dates.to_string()));
        let claim = Claim::new(FactKind::DateRange, employer, asserted, whole(dates));
        verifier.verify_claim(claim, facts)
    });

    let result = EmploymentVerification {
        employer: verifier.verify_claim(employer_claim, facts),
        role,
        dates,
    };
    tracing::debug!("Employment check for '{}': verified={}", employer, result.verified());
    result
}

/// Parse "3 years", "3+ years", "over 3 years"
fn parse_tenure(text: &str) -> Option<TenureClaim> {
    let lower = text.to_lowercase();
    let (at_least, rest) = ["over ", "more than ", "at least "]
        .iter()
        .find_map(|p| lower.strip_prefix(p).map(|r| (true, r.to_string())))
        .unwrap_or((false, lower.clone()));

    let mut words = rest.split_whitespace();
    let figure = words.next()?;
    let unit = words.next()?;
    if words.next().is_some() || !unit.starts_with("year") && !unit.starts_with("yr") {
        return None;
    }
    let (figure, plus) = match figure.strip_suffix('+') {
        Some(f) => (f, true),
        None => (figure, false),
    };
    Some(TenureClaim {
        years: figure.parse().ok()?,
        at_least: at_least || plus,
    })
}

fn fact_period(fact: &Fact) -> Option<Period> {
    fact.period.or_else(|| Period::parse(&fact.value))
}

fn canonical_url(url: &str) -> String {
    let lower = url.trim().to_lowercase();
    let trimmed = lower.trim_end_matches('/');
    let trimmed = trimmed.strip_suffix(".git").unwrap_or(trimmed);
    trimmed.trim_end_matches('/').to_string()
}

fn availability_matches(claimed: &str, actual: &str) -> bool {
    if claimed.trim().eq_ignore_ascii_case(actual.trim()) {
        return true;
    }
    match (loose_date(claimed), loose_date(actual)) {
        (Some(a), Some(b)) => a.agrees_with(&b),
        _ => false,
    }
}

fn loose_date(text: &str) -> Option<PeriodDate> {
    let text = text.trim();
    let cleaned: String = text
        .split_whitespace()
        .map(|w| {
            // "1st," -> "1,"
            let digits = w.trim_end_matches(|c: char| c.is_ascii_alphabetic() || c == ',');
            if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) && digits.len() <= 2 {
                let comma = if w.ends_with(',') { "," } else { "" };
                format!("{}{}", digits, comma)
            } else {
                w.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ");

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(&cleaned, fmt).ok())
        .map(PeriodDate::from_naive)
        .or_else(|| PeriodDate::parse(&cleaned))
}

#[cfg(test)]
mod tests {
    use super::*;
    use attest_domain::{PeriodEnd, VerificationOutcome};

    fn span(text: &str) -> TextSpan {
        TextSpan { start: 0, end: text.len(), text: text.to_string() }
    }

    fn claim(kind: FactKind, subject: &str, value: AssertedValue) -> Claim {
        Claim::new(kind, subject, value, span(subject))
    }

    fn text(s: &str) -> AssertedValue {
        AssertedValue::Text(s.to_string())
    }

    fn facts() -> FactSet {
        FactSet::new(vec![
            Fact::new(FactKind::Employer, "Acme Corp", "Acme Corp"),
            Fact::new(FactKind::Role, "Staff Engineer", "Acme Corp"),
            Fact::date_range("Acme Corp", Period::parse("2019 - 2022").unwrap()),
            Fact::new(FactKind::Employer, "Globex", "Globex"),
            Fact::date_range("Globex", Period::parse("Apr 2022 - Present").unwrap()),
            Fact::new(FactKind::Skill, "Rust", "Rust"),
            Fact::new(FactKind::Project, "Atlas Engine", "Governance runtime"),
            Fact::new(FactKind::RepoLink, "Atlas Engine", "https://github.com/jane/atlas"),
            Fact::new(FactKind::Availability, "status", "available"),
            Fact::new(FactKind::Availability, "start_date", "2026-12-01"),
        ])
    }

    fn verifier() -> Verifier {
        Verifier::new(PeriodDate::month(2026, 4), 1.0)
    }

    fn outcome(c: Claim) -> VerificationOutcome {
        let facts = facts();
        verifier().verify_claim(c, &facts).outcome
    }

    #[test]
    fn test_employer_case_insensitive() {
        assert_eq!(outcome(claim(FactKind::Employer, "ACME corp.", text("ACME corp."))), VerificationOutcome::Verified);
        assert_eq!(outcome(claim(FactKind::Employer, "Initech", text("Initech"))), VerificationOutcome::Unverified);
    }

    #[test]
    fn test_role_employer() {
        assert_eq!(
            outcome(claim(FactKind::Role, "staff engineer", text("Acme, Inc."))),
            VerificationOutcome::Verified
        );
        assert_eq!(
            outcome(claim(FactKind::Role, "Staff Engineer", text("Globex"))),
            VerificationOutcome::Contradicted
        );
        assert_eq!(
            outcome(claim(FactKind::Role, "CTO", text("Acme Corp"))),
            VerificationOutcome::Unverified
        );
    }

    #[test]
    fn test_period_claims() {
        let contradicted = Period::parse("2019 - 2024").unwrap();
        assert_eq!(
            outcome(claim(FactKind::DateRange, "Acme Corp", AssertedValue::Period(contradicted))),
            VerificationOutcome::Contradicted
        );

        let exact = Period::parse("Jan 2019 - Dec 2022").unwrap();
        assert_eq!(
            outcome(claim(FactKind::DateRange, "Acme Corp", AssertedValue::Period(exact))),
            VerificationOutcome::Verified
        );

        let inside = Period::single(PeriodDate::year(2020));
        assert_eq!(
            outcome(claim(FactKind::DateRange, "Acme Corp", AssertedValue::Period(inside))),
            VerificationOutcome::Verified
        );

        let ongoing = Period::new(PeriodDate::month(2022, 4), PeriodEnd::Present);
        assert_eq!(
            outcome(claim(FactKind::DateRange, "Globex", AssertedValue::Period(ongoing))),
            VerificationOutcome::Verified
        );
    }

    #[test]
    fn test_tenure_tolerance() {
        let tenure = |years: f64, at_least: bool| {
            AssertedValue::Tenure(TenureClaim { years, at_least })
        };
        // 2019 - 2022 at year granularity is 3 years
        assert_eq!(outcome(claim(FactKind::DateRange, "Acme Corp", tenure(3.0, false))), VerificationOutcome::Verified);
        assert_eq!(outcome(claim(FactKind::DateRange, "Acme Corp", tenure(4.0, false))), VerificationOutcome::Verified);
        assert_eq!(outcome(claim(FactKind::DateRange, "Acme Corp", tenure(5.0, false))), VerificationOutcome::Contradicted);
        assert_eq!(outcome(claim(FactKind::DateRange, "Acme Corp", tenure(2.0, true))), VerificationOutcome::Verified);
        assert_eq!(outcome(claim(FactKind::DateRange, "Acme Corp", tenure(10.0, true))), VerificationOutcome::Contradicted);

        // Apr 2022 to Apr 2026
        assert_eq!(outcome(claim(FactKind::DateRange, "Globex", tenure(4.0, false))), VerificationOutcome::Verified);
        assert_eq!(outcome(claim(FactKind::DateRange, "Hooli", tenure(4.0, false))), VerificationOutcome::Unverified);
    }

    #[test]
    fn test_repo_links() {
        let facts = facts();
        let result = verifier().verify_claim(
            claim(FactKind::RepoLink, "atlas engine", text("https://GitHub.com/jane/atlas.git/")),
            &facts,
        );
        assert_eq!(result.outcome, VerificationOutcome::Verified);
        assert_eq!(result.matched_fact.unwrap().value, "https://github.com/jane/atlas");

        assert_eq!(
            outcome(claim(FactKind::RepoLink, "Atlas Engine", text("https://github.com/jane/other"))),
            VerificationOutcome::Contradicted
        );
        assert_eq!(
            outcome(claim(FactKind::RepoLink, "Atlas Engine", text("Atlas Engine"))),
            VerificationOutcome::Verified
        );
    }

    #[test]
    fn test_availability() {
        assert_eq!(outcome(claim(FactKind::Availability, "status", text("Available"))), VerificationOutcome::Verified);
        assert_eq!(outcome(claim(FactKind::Availability, "status", text("booked"))), VerificationOutcome::Contradicted);
        assert_eq!(
            outcome(claim(FactKind::Availability, "start_date", text("December 2026"))),
            VerificationOutcome::Verified
        );
        assert_eq!(
            outcome(claim(FactKind::Availability, "start_date", text("December 1st, 2026"))),
            VerificationOutcome::Verified
        );
        assert_eq!(
            outcome(claim(FactKind::Availability, "start_date", text("March 2027"))),
            VerificationOutcome::Contradicted
        );

        let empty = FactSet::empty();
        let result = verifier().verify_claim(claim(FactKind::Availability, "status", text("available")), &empty);
        assert_eq!(result.outcome, VerificationOutcome::Unverified);
    }

    #[test]
    fn test_results_keep_input_order() {
        let facts = facts();
        let claims = vec![
            claim(FactKind::Skill, "Haskell", text("Haskell")),
            claim(FactKind::Skill, "rust", text("rust")),
        ];
        let results = verifier().verify(&claims, &facts);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].claim.subject, "Haskell");
        assert_eq!(results[0].outcome, VerificationOutcome::Unverified);
        assert_eq!(results[1].outcome, VerificationOutcome::Verified);
    }

    #[test]
    fn test_verify_employment() {
        let facts = facts();
        let v = verifier();

        let ok = verify_employment(&v, "Acme Corp", Some("Staff Engineer"), Some("2019 - 2022"), &facts);
        assert!(ok.verified());

        let tenure = verify_employment(&v, "Acme Corp", None, Some("3 years"), &facts);
        assert!(tenure.verified());

        let wrong = verify_employment(&v, "Acme Corp", None, Some("2015 - 2022"), &facts);
        assert!(!wrong.verified());
        assert_eq!(wrong.dates.unwrap().outcome, VerificationOutcome::Contradicted);

        let unknown = verify_employment(&v, "Hooli", Some("CEO"), None, &facts);
        assert_eq!(unknown.employer.outcome, VerificationOutcome::Unverified);
        assert!(unknown.role.is_some());
        assert!(unknown.dates.is_none());
    }

    #[test]
    fn test_parse_tenure() {
        assert_eq!(parse_tenure("3 years"), Some(TenureClaim { years: 3.0, at_least: false }));
        assert_eq!(parse_tenure("over 2.5 years"), Some(TenureClaim { years: 2.5, at_least: true }));
        assert_eq!(parse_tenure("5+ yrs"), Some(TenureClaim { years: 5.0, at_least: true }));
        assert_eq!(parse_tenure("2019 - 2022"), None);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn kind_strategy() -> impl Strategy<Value = FactKind> {
        prop::sample::select(FactKind::ALL.to_vec())
    }

    proptest! {
        /// Verifying twice yields identical results
        #[test]
        fn prop_verify_is_idempotent(
            subjects in prop::collection::vec(("[A-Za-z ]{1,12}", kind_strategy()), 0..8),
            start in 1990i32..2025,
            len in 0i32..10,
        ) {
            let facts = FactSet::new(vec![
                Fact::new(FactKind::Employer, "Acme", "Acme"),
                Fact::date_range("Acme", Period::new(
                    PeriodDate::year(start),
                    attest_domain::PeriodEnd::Date(PeriodDate::year(start + len)),
                )),
            ]);
            let claims: Vec<Claim> = subjects
                .iter()
                .map(|(s, kind)| Claim::new(*kind, s.as_str(), AssertedValue::Text(s.clone()), TextSpan {
                    start: 0, end: s.len(), text: s.clone(),
                }))
                .collect();
            let verifier = Verifier::new(PeriodDate::year(2026), 1.0);

            let first = verifier.verify(&claims, &facts);
            let second = verifier.verify(&claims, &facts);
            prop_assert_eq!(first.len(), claims.len());
            prop_assert_eq!(first, second);
        }
    }
}
