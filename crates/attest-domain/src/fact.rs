//! Facts - atomic ground truth derived from the knowledge source

use crate::period::Period;
use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Legal-entity suffixes dropped from the end of a subject before matching
const LEGAL_SUFFIXES: &[&str] = &["inc", "corp", "corporation", "llc", "ltd", "co"];

/// Category shared by facts and claims
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FactKind {
    /// An organisation the person worked for
    Employer,
    /// A job title, tied to an employer
    Role,
    /// When the person worked for an employer
    DateRange,
    /// A portfolio project
    Project,
    /// A skill or technology
    Skill,
    /// A source repository URL for a project
    RepoLink,
    /// An availability field (status, start date, rate, timezone)
    Availability,
}

impl FactKind {
    /// All kinds, in declaration order
    pub const ALL: [FactKind; 7] = [
        FactKind::Employer,
        FactKind::Role,
        FactKind::DateRange,
        FactKind::Project,
        FactKind::Skill,
        FactKind::RepoLink,
        FactKind::Availability,
    ];

    /// Upper-case wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            FactKind::Employer => "EMPLOYER",
            FactKind::Role => "ROLE",
            FactKind::DateRange => "DATE_RANGE",
            FactKind::Project => "PROJECT",
            FactKind::Skill => "SKILL",
            FactKind::RepoLink => "REPO_LINK",
            FactKind::Availability => "AVAILABILITY",
        }
    }

    /// Parse a wire name, ignoring case and accepting `-` for `_`
    pub fn parse(s: &str) -> Option<Self> {
        let wanted = s.trim().to_uppercase().replace('-', "_");
        Self::ALL.into_iter().find(|kind| kind.as_str() == wanted)
    }
}

impl fmt::Display for FactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalise a subject for matching
///
/// Lower-cases, collapses whitespace, trims trailing punctuation and drops
/// trailing legal suffixes.
///
/// # Examples
///
/// ```
/// use attest_domain::normalize_subject;
///
/// assert_eq!(normalize_subject("  Acme   Corp. "), "acme");
/// assert_eq!(normalize_subject("Initech, Inc."), "initech");
/// assert_eq!(normalize_subject("Rust"), "rust");
/// ```
pub fn normalize_subject(subject: &str) -> String {
    let collapsed = subject
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();
    let mut trimmed = trim_trailing_punctuation(&collapsed);

    while let Some((head, last)) = trimmed.rsplit_once(' ') {
        let head = trim_trailing_punctuation(head);
        if !LEGAL_SUFFIXES.contains(&last) || head.is_empty() {
            break;
        }
        trimmed = head;
    }
    trimmed.to_string()
}

fn trim_trailing_punctuation(s: &str) -> &str {
    s.trim_end_matches(|c: char| {
        c.is_whitespace() || (c.is_ascii_punctuation() && c != '+' && c != '#')
    })
}

/// An atomic piece of verified truth
///
/// Facts never change after extraction; a new knowledge-source snapshot
/// produces a new [`FactSet`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fact {
    /// What kind of datum this is
    pub kind: FactKind,

    /// Identifying string (employer, role, project or skill name)
    pub subject: String,

    /// Associated datum (employer, URL, status, rendered period)
    pub value: String,

    /// Structured period for DATE_RANGE facts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period: Option<Period>,
}

impl Fact {
    /// Create a fact without a period
    pub fn new(kind: FactKind, subject: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            kind,
            subject: subject.into(),
            value: value.into(),
            period: None,
        }
    }

    /// Create a DATE_RANGE fact for a subject
    pub fn date_range(subject: impl Into<String>, period: Period) -> Self {
        Self {
            kind: FactKind::DateRange,
            subject: subject.into(),
            value: period.to_string(),
            period: Some(period),
        }
    }

    /// Normalised subject used as the lookup key
    pub fn key(&self) -> String {
        normalize_subject(&self.subject)
    }
}

/// An immutable, indexed collection of facts
///
/// Built once per knowledge-source snapshot. There is no way to add or
/// remove facts afterwards; reloads construct a fresh set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FactSet {
    facts: Vec<Fact>,
    index: HashMap<(FactKind, String), Vec<usize>>,
}

impl FactSet {
    /// Build a fact set from a list of facts
    pub fn new(facts: Vec<Fact>) -> Self {
        let mut index: HashMap<(FactKind, String), Vec<usize>> = HashMap::new();
        for (i, fact) in facts.iter().enumerate() {
            index.entry((fact.kind, fact.key())).or_default().push(i);
        }
        Self { facts, index }
    }

    /// An empty fact set (knowledge source unavailable)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Facts of `kind` whose subject matches `subject` after normalisation
    pub fn lookup<'a>(&'a self, kind: FactKind, subject: &str) -> impl Iterator<Item = &'a Fact> + 'a {
        self.index
            .get(&(kind, normalize_subject(subject)))
            .into_iter()
            .flatten()
            .map(move |&i| &self.facts[i])
    }

    /// All facts of one kind, in extraction order
    pub fn of_kind(&self, kind: FactKind) -> impl Iterator<Item = &Fact> + '_ {
        self.facts.iter().filter(move |fact| fact.kind == kind)
    }

    /// Iterate all facts in extraction order
    pub fn iter(&self) -> std::slice::Iter<'_, Fact> {
        self.facts.iter()
    }

    /// Number of facts
    pub fn len(&self) -> usize {
        self.facts.len()
    }

    /// Whether the set holds no facts at all
    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }

    /// Number of facts of one kind
    pub fn count(&self, kind: FactKind) -> usize {
        self.of_kind(kind).count()
    }
}

impl FromIterator<Fact> for FactSet {
    fn from_iter<I: IntoIterator<Item = Fact>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a FactSet {
    type Item = &'a Fact;
    type IntoIter = std::slice::Iter<'a, Fact>;

    fn into_iter(self) -> Self::IntoIter {
        self.facts.iter()
    }
}

impl Serialize for FactSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(&self.facts)
    }
}

impl<'de> Deserialize<'de> for FactSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Vec::<Fact>::deserialize(deserializer).map(Self::new)
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: normalising twice changes nothing
        #[test]
        fn test_normalize_idempotent(subject in "[A-Za-z ,.]{0,40}") {
            let once = normalize_subject(&subject);
            prop_assert_eq!(normalize_subject(&once), once);
        }

        /// Property: case and spacing never affect lookup
        #[test]
        fn test_lookup_ignores_case_and_spacing(name in "[A-Za-z]{1,12}( [A-Za-z]{1,12}){0,2}") {
            let facts = FactSet::new(vec![Fact::new(FactKind::Employer, name.clone(), name.clone())]);
            let noisy = format!("  {}  ", name.to_uppercase().replace(' ', "   "));
            prop_assert_eq!(facts.lookup(FactKind::Employer, &noisy).count(), 1);
        }
    }
}
