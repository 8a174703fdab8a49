//! Deterministic extraction rules: the fallback tier of every sub-extraction.
//!
//! Pure functions over compiled vocabulary tables. No LLM calls, no I/O, so the
//! same input always yields the same output.

use std::collections::HashMap;
use std::ops::Range;

use anyhow::{Context, Result};
use lazy_static::lazy_static;
use regex::Regex;

use crate::generation::vocabulary::{LevelKeywords, SkillTerm, Vocabulary};
use crate::models::requirements::{DegreeLevel, EducationRequirement, JobLevel, RequiredSkill};

lazy_static! {
    /// "<N>+ years (of) experience" and its reorderings, tried in order.
    static ref EXPERIENCE_PATTERNS: Vec<Regex> = vec![
        Regex::new(r"(?i)(\d+)\+?\s*(?:years|yrs)(?:\s*of\s*|\s+)(?:experience|exp)").unwrap(),
        Regex::new(r"(?i)(?:experience|exp)(?:\s*of\s*|\s+)(\d+)\+?\s*(?:years|yrs)").unwrap(),
        Regex::new(r"(?i)(\d+)\+?\s*(?:years|yrs)\s*(?:experience|exp)").unwrap(),
        Regex::new(r"(?i)(?:minimum|min)\s+(?:of\s+)?(\d+)\+?\s*(?:years|yrs)").unwrap(),
    ];
    /// Last resort: any "<N> years".
    static ref LOOSE_YEARS: Regex = Regex::new(r"(?i)(\d+)\+?\s*(?:years|yrs)").unwrap();
}

const REQUIRED_MARKERS: &[&str] = &["required", "must have", "must hold"];

/// Case-insensitive whole-term matcher.
///
/// Whitespace inside a term also matches hyphens, and a trailing plural `s`
/// is accepted. Word boundaries are ASCII alphanumerics so that terms ending
/// in punctuation (`C++`, `Node.js`) still match.
#[derive(Debug, Clone)]
pub struct TermMatcher {
    regex: Regex,
}

impl TermMatcher {
    pub fn new(term: &str) -> Result<Self> {
        let body = term
            .split_whitespace()
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join(r"[\s\-]+");
        let pattern = format!(r"(?i)(?:^|[^A-Za-z0-9_])(?P<term>{body}s?)(?:$|[^A-Za-z0-9_])");
        let regex =
            Regex::new(&pattern).with_context(|| format!("invalid vocabulary term: {term}"))?;
        Ok(Self { regex })
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }

    /// Byte ranges of every (non-overlapping) occurrence.
    pub fn find_all<'t>(&'t self, text: &'t str) -> impl Iterator<Item = Range<usize>> + 't {
        self.regex
            .captures_iter(text)
            .filter_map(|caps| caps.name("term").map(|m| m.range()))
    }

    pub fn first(&self, text: &str) -> Option<Range<usize>> {
        self.find_all(text).next()
    }
}

/// Vocabulary tables compiled into matchers.
#[derive(Debug, Clone)]
pub struct RuleSet {
    skills: Vec<(SkillTerm, TermMatcher)>,
    degrees: Vec<(DegreeLevel, Vec<TermMatcher>)>,
    fields: Vec<(String, TermMatcher)>,
    important_terms: Vec<(String, TermMatcher)>,
    title_levels: Vec<LevelKeywords>,
    education_window: usize,
    max_keywords: usize,
}

impl RuleSet {
    pub fn compile(vocabulary: &Vocabulary, education_window: usize, max_keywords: usize) -> Result<Self> {
        let skills = vocabulary
            .skills
            .iter()
            .map(|term| Ok((term.clone(), TermMatcher::new(&term.name)?)))
            .collect::<Result<Vec<_>>>()?;

        let degrees = vocabulary
            .degrees
            .iter()
            .map(|d| {
                let matchers = d
                    .patterns
                    .iter()
                    .map(|p| TermMatcher::new(p))
                    .collect::<Result<Vec<_>>>()?;
                Ok((d.level, matchers))
            })
            .collect::<Result<Vec<_>>>()?;

        let named = |terms: &[String]| -> Result<Vec<(String, TermMatcher)>> {
            terms
                .iter()
                .map(|t| Ok((t.clone(), TermMatcher::new(t)?)))
                .collect()
        };

        Ok(Self {
            skills,
            degrees,
            fields: named(&vocabulary.fields[..])?,
            important_terms: named(&vocabulary.important_terms[..])?,
            title_levels: vocabulary
                .title_levels
                .iter()
                .map(|l| LevelKeywords {
                    level: l.level,
                    keywords: l.keywords.iter().map(|k| k.to_lowercase()).collect(),
                })
                .collect(),
            education_window,
            max_keywords,
        })
    }

    // ────────────────────────────────────────────────────────────────────────
    // Skills
    // ────────────────────────────────────────────────────────────────────────

    /// Every vocabulary skill mentioned in `text`, with its default relevance.
    pub fn skills(&self, text: &str) -> Vec<RequiredSkill> {
        let found = self
            .skills
            .iter()
            .filter(|(_, matcher)| matcher.is_match(text))
            .map(|(term, _)| RequiredSkill {
                name: term.name.clone(),
                category: term.category,
                relevance: term.relevance,
                years_required: None,
            })
            .collect();
        dedup_skills(found)
    }

    // ────────────────────────────────────────────────────────────────────────
    // Education
    // ────────────────────────────────────────────────────────────────────────

    /// One requirement per (degree level, nearby field of study).
    ///
    /// A degree mention with no field inside the window yields a requirement
    /// with an empty field, which matches any field.
    pub fn education(&self, text: &str) -> Vec<EducationRequirement> {
        let mut results: Vec<EducationRequirement> = Vec::new();

        for (level, matchers) in &self.degrees {
            for range in matchers.iter().flat_map(|m| m.find_all(text)) {
                let window = surrounding(text, range, self.education_window);
                let window_lower = window.to_lowercase();
                let required = REQUIRED_MARKERS.iter().any(|m| window_lower.contains(m))
                    || matches!(level, DegreeLevel::HighSchool | DegreeLevel::Bachelor);

                let fields = self.fields_in(window);
                let fields = if fields.is_empty() {
                    vec![String::new()]
                } else {
                    fields
                };

                for field in fields {
                    let candidate = EducationRequirement {
                        level: level.label().to_string(),
                        field,
                        required,
                    };
                    merge_education(&mut results, candidate);
                }
            }
        }

        // A field-less requirement adds nothing once the same level names a field.
        let with_field: Vec<String> = results
            .iter()
            .filter(|r| !r.field.is_empty())
            .map(|r| r.level.clone())
            .collect();
        results.retain(|r| !r.field.is_empty() || !with_field.contains(&r.level));
        results
    }

    /// Vocabulary fields found in `window`, dropping ones subsumed by a longer hit.
    fn fields_in(&self, window: &str) -> Vec<String> {
        let found: Vec<&String> = self
            .fields
            .iter()
            .filter(|(_, matcher)| matcher.is_match(window))
            .map(|(name, _)| name)
            .collect();

        found
            .iter()
            .filter(|f| {
                let lower = f.to_lowercase();
                !found.iter().any(|other| {
                    other.len() > f.len() && other.to_lowercase().contains(&lower)
                })
            })
            .map(|f| f.to_string())
            .collect()
    }

    // ────────────────────────────────────────────────────────────────────────
    // Level, keywords, summary
    // ────────────────────────────────────────────────────────────────────────

    /// Level pinned by a title keyword. Levels are checked in table order.
    pub fn level_from_title(&self, title: &str) -> Option<JobLevel> {
        let title = title.to_lowercase();
        self.title_levels
            .iter()
            .find(|l| l.keywords.iter().any(|k| title.contains(k.as_str())))
            .map(|l| l.level)
    }

    /// Important terms present in `text`, in order of first appearance.
    pub fn keywords(&self, text: &str) -> Vec<String> {
        let mut hits: Vec<(usize, usize, &String)> = self
            .important_terms
            .iter()
            .enumerate()
            .filter_map(|(i, (term, matcher))| matcher.first(text).map(|r| (r.start, i, term)))
            .collect();
        hits.sort_by_key(|(pos, i, _)| (*pos, *i));
        sanitize_keywords(
            hits.into_iter().map(|(_, _, term)| term.clone()).collect(),
            self.max_keywords,
        )
    }
}

/// Strict experience patterns.
pub fn experience_years_strict(text: &str) -> Option<u32> {
    EXPERIENCE_PATTERNS
        .iter()
        .find_map(|re| re.captures(text)?.get(1)?.as_str().parse().ok())
}

/// Simplified "<N> years" pattern, used after the model gave no answer.
pub fn experience_years_loose(text: &str) -> Option<u32> {
    LOOSE_YEARS
        .captures(text)
        .and_then(|caps| caps.get(1)?.as_str().parse().ok())
}

/// Templated analysis used when no narrative could be generated.
pub fn summary_template(title: &str, company: &str) -> String {
    format!(
        "{title} position at {company}. The skills, experience and education listed \
         here were identified from the posting text; review the original posting for \
         responsibilities, team culture and benefits."
    )
}

/// Case-insensitive dedup keeping the highest-relevance instance in the
/// position of the first appearance.
pub fn dedup_skills(skills: Vec<RequiredSkill>) -> Vec<RequiredSkill> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut out: Vec<RequiredSkill> = Vec::with_capacity(skills.len());

    for skill in skills {
        let key = skill.name.trim().to_lowercase();
        match index.get(&key) {
            Some(&i) => {
                if skill.relevance > out[i].relevance {
                    out[i] = skill;
                }
            }
            None => {
                index.insert(key, out.len());
                out.push(skill);
            }
        }
    }
    out
}

/// Trims, drops empties, dedups case-insensitively and caps the list.
pub fn sanitize_keywords(keywords: Vec<String>, max: usize) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    let mut out = Vec::new();
    for keyword in keywords {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            continue;
        }
        let key = keyword.to_lowercase();
        if seen.contains(&key) {
            continue;
        }
        seen.push(key);
        out.push(keyword.to_string());
        if out.len() == max {
            break;
        }
    }
    out
}

fn merge_education(results: &mut Vec<EducationRequirement>, candidate: EducationRequirement) {
    match results
        .iter_mut()
        .find(|r| r.level == candidate.level && r.field.eq_ignore_ascii_case(&candidate.field))
    {
        Some(existing) => existing.required |= candidate.required,
        None => results.push(candidate),
    }
}

/// `text` around `range`, widened by `radius` bytes on each side (char-safe).
fn surrounding(text: &str, range: Range<usize>, radius: usize) -> &str {
    let mut start = range.start.saturating_sub(radius);
    while !text.is_char_boundary(start) {
        start -= 1;
    }
    let mut end = (range.end + radius).min(text.len());
    while !text.is_char_boundary(end) {
        end += 1;
    }
    &text[start..end]
}
