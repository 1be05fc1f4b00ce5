//! Claim Scanner - declarative pattern rules over candidate text
//!
//! Each [`ScanRule`] pairs a claim kind with a regex and an extraction
//! [`Template`] that says how the named capture groups become a [`Claim`].
//! Rules are compiled once per scanner; scanning holds no state between
//! calls, so the same text always yields the same claims.
//!
//! Capture groups used by the templates:
//!
//! | group     | meaning                                   |
//! |-----------|-------------------------------------------|
//! | `subject` | employer, role, project or field subject  |
//! | `value`   | second half of a pair, or a field value   |
//! | `start`   | first date of a range                     |
//! | `end`     | last date of a range (optional)           |
//! | `years`   | tenure figure                             |
//! | `plus`    | `+` after the figure                      |
//! | `over`    | "over", "more than", "at least"           |
//! | `list`    | comma/and separated items                 |

use crate::error::{GovernanceError, Result};
use attest_domain::{AssertedValue, Claim, FactKind, Period, PeriodDate, TenureClaim, TextSpan};
use regex::{Captures, Regex};
use std::cmp::Reverse;

/// One capitalised word of a proper name
const NAME_TOKEN: &str = r"[A-Z](?:[\w&'’-]|\.\w)*";

/// A résumé-style date: `2019`, `Jan 2019`, `January 2019`, `01/2019`
const DATE: &str = r"(?:\d{1,2}/\d{4}|(?:[A-Z][a-z]{2,8}\.?\s+)?\d{4})";

/// The closing date of a range, possibly open-ended
const END_DATE: &str =
    r"(?:\d{1,2}/\d{4}|(?:[A-Z][a-z]{2,8}\.?\s+)?\d{4}|(?i:present|now|today|current))";

/// Separator between the two dates of a range
const RANGE_SEP: &str = r"\s*(?:-|–|—|(?i:to|and|until|through))\s*";

/// Tenure figure with optional lower-bound markers
const YEARS: &str =
    r"(?:(?P<over>(?i:over|more\s+than|at\s+least))\s+)?\b(?P<years>\d+(?:\.\d+)?)(?P<plus>\+)?\s*(?i:years?|yrs?)";

/// Words a claim subject may not start with
const STOP_WORDS: &[&str] = &[
    "i", "me", "my", "we", "our", "us", "you", "your", "he", "she", "his", "her", "they",
    "them", "their", "it", "its", "this", "that", "these", "those", "there", "here", "what",
    "which", "who", "where", "when", "the", "a", "an", "at", "in", "on", "for", "with", "from", "to",
    "of", "by", "as", "some", "several", "various", "many", "multiple", "other", "least",
    "since", "between", "during", "until", "after", "before", "january", "february", "march",
    "april", "may", "june", "july", "august", "september", "october", "november", "december",
];

/// Words that end a skills list
const LIST_END: &str = r"(?i)\s+(?:for|since|at|over|across|including|to|from|during|while|when|where|which|that|as|with|in|through|by|because|but)\b";

/// Separators between list items
const LIST_SEP: &str = r"(?i)\s*,\s*(?:(?:and|or)\s+)?|\s+(?:and|or|&)\s+";

const MAX_ITEM_WORDS: usize = 4;
const MAX_ITEM_LEN: usize = 40;

/// Build a proper-name fragment captured under `group`
fn name(group: &str) -> String {
    format!(
        r"\b(?P<{group}>{token}(?:[ \t]+(?:{token}|&|of|de))*)",
        group = group,
        token = NAME_TOKEN
    )
}

/// How a rule's captures become a claim
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Template {
    /// `subject`; the asserted value is the subject itself
    Named,
    /// `subject` and `value` as text
    Pair,
    /// `subject` with `start` and optional `end` dates
    Period,
    /// `subject` with `years`, `plus` and `over`
    Tenure,
    /// `list`; one claim per item, subject and value the item
    List,
    /// Fixed subject; `value` as text
    Field(&'static str),
}

/// A declarative scan rule
#[derive(Debug, Clone)]
pub struct ScanRule {
    /// Rule name, used in errors and logs
    pub name: String,
    /// Kind of the claims this rule produces
    pub kind: FactKind,
    /// Regex with the named groups its template needs
    pub pattern: String,
    /// Extraction template
    pub template: Template,
}

impl ScanRule {
    /// Create a rule
    pub fn new(
        name: impl Into<String>,
        kind: FactKind,
        pattern: impl Into<String>,
        template: Template,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            pattern: pattern.into(),
            template,
        }
    }
}

/// The built-in rule table
pub fn builtin_rules() -> Vec<ScanRule> {
    let org = name("subject");
    let work_verbs = r"(?i:worked|works|working|work|served|serving|interned|consulted)";
    let stint_verbs = r"(?i:worked|was|served|employed|working|interned|consulted)";

    vec![
        ScanRule::new(
            "tenure",
            FactKind::DateRange,
            format!(
                r"{years}\s+(?i:(?:of\s+(?:[\w-]+\s+){{0,3}}?experience\s+)?at|for)\s+(?:(?i:the)\s+)?{org}",
                years = YEARS,
                org = org
            ),
            Template::Tenure,
        ),
        ScanRule::new(
            "trailing-tenure",
            FactKind::DateRange,
            format!(
                r"\b(?i:at|for)\s+(?:(?i:the)\s+)?{org}\s+(?i:for)\s+{years}\b",
                org = org,
                years = YEARS
            ),
            Template::Tenure,
        ),
        ScanRule::new(
            "employment-period",
            FactKind::DateRange,
            format!(
                r"\b{verbs}\s+(?i:at|for|with|by)\s+(?:(?i:the)\s+)?{org},?\s+(?i:from|between)\s+(?P<start>{date}){sep}(?P<end>{end})",
                verbs = stint_verbs,
                org = org,
                date = DATE,
                sep = RANGE_SEP,
                end = END_DATE
            ),
            Template::Period,
        ),
        ScanRule::new(
            "employment-year",
            FactKind::DateRange,
            format!(
                r"\b{verbs}\s+(?i:at|for|with|by)\s+(?:(?i:the)\s+)?{org}\s+(?i:in|during)\s+(?P<start>{date})\b",
                verbs = stint_verbs,
                org = org,
                date = DATE
            ),
            Template::Period,
        ),
        ScanRule::new(
            "parenthesised-period",
            FactKind::DateRange,
            format!(
                r"{org}\s*\(\s*(?P<start>{date}){sep}(?P<end>{end})\s*\)",
                org = org,
                date = DATE,
                sep = RANGE_SEP,
                end = END_DATE
            ),
            Template::Period,
        ),
        ScanRule::new(
            "employer-dates",
            FactKind::DateRange,
            format!(
                r"(?:\b(?i:at|for)\s+(?:(?i:the)\s+)?)?{org}(?:\s*[,:])?\s+(?:(?i:from|between)\s+)?(?P<start>{date}){sep}(?P<end>{end})\b",
                org = org,
                date = DATE,
                sep = RANGE_SEP,
                end = END_DATE
            ),
            Template::Period,
        ),
        ScanRule::new(
            "dates-at-employer",
            FactKind::DateRange,
            format!(
                r"\b(?P<start>{date}){sep}(?P<end>{end})\s+(?i:at|for)\s+(?:(?i:the)\s+)?{org}",
                date = DATE,
                sep = RANGE_SEP,
                end = END_DATE,
                org = org
            ),
            Template::Period,
        ),
        ScanRule::new(
            "employment",
            FactKind::Employer,
            format!(r"\b{verbs}\s+(?i:at|for)\s+(?:(?i:the)\s+)?{org}", verbs = work_verbs, org = org),
            Template::Named,
        ),
        ScanRule::new(
            "employed-by",
            FactKind::Employer,
            format!(r"\b(?i:employed)\s+(?i:by|at)\s+(?:(?i:the)\s+)?{org}", org = org),
            Template::Named,
        ),
        ScanRule::new(
            "joined",
            FactKind::Employer,
            format!(r"\b(?i:joined|joining|joins)\s+(?:(?i:the)\s+)?{org}", org = org),
            Template::Named,
        ),
        ScanRule::new(
            "role",
            FactKind::Role,
            format!(
                r"\b(?i:as)\s+(?i:an?|the)\s+(?P<subject>[A-Za-z][\w&/+-]*(?:[ \t]+[\w&/+-]+){{0,5}}?)\s+(?i:at|for|with)\s+(?:(?i:the)\s+)?{org}",
                org = name("value")
            ),
            Template::Pair,
        ),
        ScanRule::new(
            "project",
            FactKind::Project,
            format!(
                r"\b(?i:built|created|developed|architected|designed|launched|shipped|wrote|authored)\s+(?:(?i:the)\s+)?{org}",
                org = org
            ),
            Template::Named,
        ),
        ScanRule::new(
            "repository-link",
            FactKind::RepoLink,
            format!(r"{org}\s*\(\s*(?P<value>https?://[^\s)]+)\s*\)", org = org),
            Template::Pair,
        ),
        ScanRule::new(
            "repository-sentence",
            FactKind::RepoLink,
            format!(
                r"\b(?i:repo|repository|source\s+code|code)\s+(?i:for|of)\s+(?:(?i:the)\s+)?{org}\s*(?:(?i:is(?:\s+(?:at|on))?|lives\s+at)|:)\s*(?P<value>https?://[^\s)]+)",
                org = org
            ),
            Template::Pair,
        ),
        ScanRule::new(
            "repository-mention",
            FactKind::RepoLink,
            format!(r"{org}\s+(?i:repo|repository|source\s+code|codebase)\b", org = org),
            Template::Named,
        ),
        ScanRule::new(
            "skills",
            FactKind::Skill,
            r"\b(?i:experience\s+(?:with|in)|proficient\s+(?:in|with)|skilled\s+in|expertise\s+in|fluent\s+in|specializ(?:e|es|ed|ing)\s+in|expert\s+in|background\s+in)\s+(?P<list>[^.;:!?\n()]+)",
            Template::List,
        ),
        ScanRule::new(
            "available-from",
            FactKind::Availability,
            r"\b(?i:available|free)\s+(?i:from|starting(?:\s+(?:from|on|in))?|as\s+of|beginning|after)\s+(?P<value>\d{4}-\d{2}-\d{2}|\d{1,2}/\d{4}|[A-Z][a-z]{2,8}\.?\s+(?:\d{1,2}(?:st|nd|rd|th)?,?\s+)?\d{4}|\d{4})",
            Template::Field("start_date"),
        ),
        ScanRule::new(
            "availability-status",
            FactKind::Availability,
            r"\b(?i:currently|presently|now)\s+(?P<value>(?i:available|unavailable|booked))\b",
            Template::Field("status"),
        ),
    ]
}

#[derive(Debug, Clone)]
struct CompiledRule {
    rule: ScanRule,
    regex: Regex,
}

/// A claim plus what is needed to resolve overlaps
#[derive(Debug)]
struct Candidate {
    rule: usize,
    slot: Option<&'static str>,
    claim: Claim,
}

impl Candidate {
    fn conflicts_with(&self, other: &Candidate) -> bool {
        self.claim.kind == other.claim.kind
            && self.slot == other.slot
            && self.claim.span.overlaps(&other.claim.span)
    }
}

/// Extracts claims from candidate text
#[derive(Debug, Clone)]
pub struct ClaimScanner {
    rules: Vec<CompiledRule>,
    list_end: Regex,
    list_sep: Regex,
}

impl ClaimScanner {
    /// Scanner with the built-in rule table
    pub fn new() -> Result<Self> {
        Self::with_rules(builtin_rules())
    }

    /// Scanner with a custom rule table
    ///
    /// Rule order matters only for ties: when two same-kind matches
    /// overlap with equal length, the earlier rule wins.
    pub fn with_rules(rules: Vec<ScanRule>) -> Result<Self> {
        let rules = rules
            .into_iter()
            .map(|rule| {
                let regex = Regex::new(&rule.pattern).map_err(|source| GovernanceError::Pattern {
                    rule: rule.name.clone(),
                    source,
                })?;
                Ok(CompiledRule { rule, regex })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            rules,
            list_end: Regex::new(LIST_END)?,
            list_sep: Regex::new(LIST_SEP)?,
        })
    }

    /// The rules this scanner applies, in priority order
    pub fn rules(&self) -> impl Iterator<Item = &ScanRule> {
        self.rules.iter().map(|c| &c.rule)
    }

    /// Extract every claim in `text`, ordered by span start
    ///
    /// Among overlapping matches of the same kind the longest wins;
    /// overlapping matches of different kinds are all kept. Text with no
    /// recognisable pattern yields an empty vector.
    pub fn scan(&self, text: &str) -> Vec<Claim> {
        let mut candidates = Vec::new();
        for (index, compiled) in self.rules.iter().enumerate() {
            for caps in compiled.regex.captures_iter(text) {
                match compiled.rule.template {
                    Template::List => self.list_items(index, compiled.rule.kind, &caps, text, &mut candidates),
                    template => {
                        if let Some(claim) = build_claim(compiled.rule.kind, template, &caps, text) {
                            let slot = match template {
                                Template::Field(field) => Some(field),
                                _ => None,
                            };
                            candidates.push(Candidate { rule: index, slot, claim });
                        }
                    }
                }
            }
        }

        let claims = resolve_overlaps(candidates);
        tracing::debug!("Scanned {} bytes, {} claims", text.len(), claims.len());
        claims
    }

    fn list_items(
        &self,
        rule: usize,
        kind: FactKind,
        caps: &Captures<'_>,
        text: &str,
        out: &mut Vec<Candidate>,
    ) {
        let Some(list) = caps.name("list") else {
            return;
        };
        let raw = list.as_str();
        let cut = self.list_end.find(raw).map_or(raw.len(), |m| m.start());
        let raw = &raw[..cut];

        let mut bounds = Vec::new();
        let mut pos = 0;
        for sep in self.list_sep.find_iter(raw) {
            bounds.push((pos, sep.start()));
            pos = sep.end();
        }
        bounds.push((pos, raw.len()));

        for (from, to) in bounds {
            let piece = &raw[from..to];
            let lead = piece.len() - piece.trim_start().len();
            let item = trim_punctuation(piece.trim());
            if item.is_empty()
                || item.len() > MAX_ITEM_LEN
                || item.split_whitespace().count() > MAX_ITEM_WORDS
                || starts_with_stop_word(item)
            {
                continue;
            }
            let start = list.start() + from + lead;
            if let Some(span) = TextSpan::from_source(text, start, start + item.len()) {
                out.push(Candidate {
                    rule,
                    slot: None,
                    claim: Claim::new(kind, item, AssertedValue::Text(item.to_string()), span),
                });
            }
        }
    }
}

fn build_claim(kind: FactKind, template: Template, caps: &Captures<'_>, text: &str) -> Option<Claim> {
    let whole = caps.get(0)?;
    let matched = trim_punctuation(whole.as_str());
    let span = TextSpan::from_source(text, whole.start(), whole.start() + matched.len())?;

    let (subject, asserted) = match template {
        Template::Named => {
            let subject = clean_subject(caps.name("subject")?.as_str())?;
            (subject.clone(), AssertedValue::Text(subject))
        }
        Template::Pair => {
            let subject = clean_subject(caps.name("subject")?.as_str())?;
            let value = clean_value(caps.name("value")?.as_str())?;
            (subject, AssertedValue::Text(value))
        }
        Template::Period => {
            let subject = clean_subject(caps.name("subject")?.as_str())?;
            let start = caps.name("start")?.as_str();
            let period = match caps.name("end") {
                Some(end) => Period::parse(&format!("{} - {}", start, end.as_str()))?,
                None => Period::single(PeriodDate::parse(start)?),
            };
            (subject, AssertedValue::Period(period))
        }
        Template::Tenure => {
            let subject = clean_subject(caps.name("subject")?.as_str())?;
            let years: f64 = caps.name("years")?.as_str().parse().ok()?;
            let at_least = caps.name("plus").is_some() || caps.name("over").is_some();
            (subject, AssertedValue::Tenure(TenureClaim { years, at_least }))
        }
        Template::Field(field) => {
            let value = clean_value(caps.name("value")?.as_str())?;
            (field.to_string(), AssertedValue::Text(value))
        }
        Template::List => return None,
    };

    Some(Claim::new(kind, subject, asserted, span))
}

/// Keep the best of each group of conflicting candidates, then order by position
fn resolve_overlaps(mut candidates: Vec<Candidate>) -> Vec<Claim> {
    candidates.sort_by_key(|c| {
        (
            Reverse(c.claim.span.len()),
            c.rule,
            c.claim.span.start,
        )
    });

    let mut kept: Vec<Candidate> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        if !kept.iter().any(|k| k.conflicts_with(&candidate)) {
            kept.push(candidate);
        }
    }

    kept.sort_by_key(|c| (c.claim.span.start, c.rule));
    kept.into_iter().map(|c| c.claim).collect()
}

fn trim_punctuation(s: &str) -> &str {
    s.trim_end_matches(|c: char| c.is_whitespace() || matches!(c, '.' | ',' | ';' | ':' | '!' | '?'))
}

fn clean_subject(raw: &str) -> Option<String> {
    let mut subject = raw.trim();
    loop {
        let before = subject;
        subject = trim_punctuation(subject).trim_end_matches(')');
        for suffix in ["'s", "’s", " of", " de", " &"] {
            if let Some(stripped) = subject.strip_suffix(suffix) {
                subject = stripped.trim_end();
            }
        }
        if subject == before {
            break;
        }
    }

    if let Some(rest) = strip_prefix_ignore_case(subject, "the ") {
        subject = rest.trim_start();
    }

    if subject.is_empty() || starts_with_stop_word(subject) {
        return None;
    }
    Some(subject.to_string())
}

fn strip_prefix_ignore_case<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    let head = s.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix).then(|| &s[prefix.len()..])
}

fn clean_value(raw: &str) -> Option<String> {
    let value = trim_punctuation(raw.trim()).trim_end_matches(')');
    (!value.is_empty()).then(|| value.to_string())
}

fn starts_with_stop_word(s: &str) -> bool {
    s.split_whitespace()
        .next()
        .is_some_and(|first| STOP_WORDS.contains(&first.to_lowercase().as_str()))
}
