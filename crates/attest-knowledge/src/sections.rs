//! Splitting résumé text into heading-delimited sections

/// Sections the extractor understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionKind {
    /// Professional summary paragraph
    Summary,
    /// Employment history
    Experience,
    /// Portfolio projects
    Projects,
    /// Skill lists
    Skills,
    /// Any other heading; its body is ignored
    Other,
}

impl SectionKind {
    /// Classify a heading
    ///
    /// Known aliases match exactly. Otherwise a heading whose first or last
    /// word names a section kind is taken as that kind, so `PROJECT DEEP
    /// DIVES` and `SELECTED PROJECTS` both open project sections. `None`
    /// means the line is not a heading the extractor knows.
    fn from_heading(heading: &str) -> Option<Self> {
        let kind = match heading {
            "PROFESSIONAL SUMMARY" | "SUMMARY" => SectionKind::Summary,
            "EXPERIENCE" | "PROFESSIONAL EXPERIENCE" | "WORK EXPERIENCE" => SectionKind::Experience,
            "PROJECTS" | "PROJECT PORTFOLIO" => SectionKind::Projects,
            "SKILLS" | "CORE EXPERTISE" | "TECHNICAL SKILLS" => SectionKind::Skills,
            "EDUCATION" | "CERTIFICATIONS" | "AWARDS" | "PUBLICATIONS" | "LANGUAGES" | "INTERESTS"
            | "REFERENCES" | "IDENTITY" | "CONTACT" | "VOLUNTEER EXPERIENCE" => SectionKind::Other,
            _ => return Self::from_keyword(heading),
        };
        Some(kind)
    }

    fn from_keyword(heading: &str) -> Option<Self> {
        let mut words = heading.split_whitespace();
        let first = words.next()?;
        let last = words.last().unwrap_or(first);

        [first, last].into_iter().find_map(|word| match word {
            "PROJECT" | "PROJECTS" => Some(SectionKind::Projects),
            "EXPERIENCE" | "EMPLOYMENT" => Some(SectionKind::Experience),
            "SKILLS" | "EXPERTISE" => Some(SectionKind::Skills),
            "SUMMARY" => Some(SectionKind::Summary),
            _ => None,
        })
    }

    /// Heading used in log messages
    pub fn label(&self) -> &'static str {
        match self {
            SectionKind::Summary => "PROFESSIONAL SUMMARY",
            SectionKind::Experience => "EXPERIENCE",
            SectionKind::Projects => "PROJECTS",
            SectionKind::Skills => "SKILLS",
            SectionKind::Other => "OTHER",
        }
    }
}

/// One heading and the lines beneath it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section<'a> {
    /// Classified heading
    pub kind: SectionKind,
    /// Heading text as it appeared (without trailing colon)
    pub heading: &'a str,
    /// Body lines, untrimmed, rule lines removed
    pub lines: Vec<&'a str>,
}

impl<'a> Section<'a> {
    fn new(kind: SectionKind, heading: &'a str) -> Self {
        Self {
            kind,
            heading,
            lines: Vec::new(),
        }
    }
}

/// Split text by section headings
///
/// Lines before the first heading are dropped. A heading-shaped line is made
/// only of upper-case letters, spaces, `&`, `/` and `-`, optionally ending in
/// `:`. It opens a section when it is a heading [`SectionKind`] recognises or
/// when a rule line (`====`) sits directly above or below it; any other
/// heading-shaped line, such as a bare `IBM`, stays in the current section.
///
/// A `[PROJECT: ...]` tag outside a projects section opens a projects section
/// of its own that runs to the next blank line, after which the enclosing
/// section continues. The same kind can therefore appear more than once.
pub fn split_sections(text: &str) -> Vec<Section<'_>> {
    let lines: Vec<&str> = text.lines().collect();
    let mut sections: Vec<Section<'_>> = Vec::new();
    // unnamed preamble, dropped below
    let mut current = Section::new(SectionKind::Other, "");
    let mut resume: Option<(SectionKind, &str)> = None;

    for (index, &line) in lines.iter().enumerate() {
        if is_rule_line(line) {
            continue;
        }

        if let Some((kind, heading)) = section_heading(&lines, index) {
            resume = None;
            sections.push(std::mem::replace(&mut current, Section::new(kind, heading)));
            continue;
        }

        if is_project_tag(line) && current.kind != SectionKind::Projects {
            let enclosing = std::mem::replace(&mut current, Section::new(SectionKind::Projects, line.trim()));
            resume = Some((enclosing.kind, enclosing.heading));
            sections.push(enclosing);
            current.lines.push(line);
            continue;
        }

        if line.trim().is_empty() {
            if let Some((kind, heading)) = resume.take() {
                sections.push(std::mem::replace(&mut current, Section::new(kind, heading)));
            }
        }
        current.lines.push(line);
    }

    sections.push(current);
    sections.retain(|s| !s.heading.is_empty());
    sections
}

fn section_heading<'a>(lines: &[&'a str], index: usize) -> Option<(SectionKind, &'a str)> {
    let heading = heading_text(lines[index])?;
    if let Some(kind) = SectionKind::from_heading(heading) {
        return Some((kind, heading));
    }

    let framed = index.checked_sub(1).is_some_and(|prev| is_rule_line(lines[prev]))
        || lines.get(index + 1).is_some_and(|next| is_rule_line(next));
    framed.then_some((SectionKind::Other, heading))
}

fn is_project_tag(line: &str) -> bool {
    line.trim_start()
        .get(..9)
        .is_some_and(|head| head.eq_ignore_ascii_case("[project:"))
}

/// Every section of `kind`, in document order
pub fn sections_of<'s, 'a>(
    sections: &'s [Section<'a>],
    kind: SectionKind,
) -> impl Iterator<Item = &'s Section<'a>> {
    sections.iter().filter(move |s| s.kind == kind)
}

fn heading_text(line: &str) -> Option<&str> {
    let trimmed = line.trim();
    let heading = trimmed.strip_suffix(':').unwrap_or(trimmed).trim_end();

    let letters = heading.chars().filter(|c| c.is_ascii_alphabetic()).count();
    if letters < 3 {
        return None;
    }
    heading
        .chars()
        .all(|c| c.is_ascii_uppercase() || matches!(c, ' ' | '&' | '/' | '-'))
        .then_some(heading)
}

fn is_rule_line(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.len() >= 3 && trimmed.chars().all(|c| matches!(c, '=' | '-' | '_' | '*'))
}

/// Strip a leading bullet marker
pub fn strip_bullet(line: &str) -> &str {
    let trimmed = line.trim();
    for marker in ["- ", "* ", "• ", "· ", "– "] {
        if let Some(rest) = trimmed.strip_prefix(marker) {
            return rest.trim_start();
        }
    }
    trimmed
}

/// Whether a line begins with a bullet marker
pub fn is_bullet(line: &str) -> bool {
    strip_bullet(line).len() != line.trim().len()
}
