//! Heuristic metric calculators: pure, deterministic, no external calls.
//!
//! Every calculator returns an integer score in 0..=100. A score of 0 can mean
//! either "no signal found" or "genuinely no match"; the fallback adapter treats
//! both the same way.

use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::job::JobFacts;
use crate::models::resume::{months_between, parse_resume_date, ResumeDocument, WorkExperience};
use crate::text::{first_token, word_count, WordMatcher};

/// Keyword occurrences per résumé word that earns a full Keyword Match score.
pub const KEYWORD_DENSITY_TARGET: f64 = 0.05;

const CONCISE_MIN_WORDS: usize = 8;
const CONCISE_MAX_WORDS: usize = 30;
const EDUCATION_RECENCY_YEARS: i32 = 10;

/// Rounds and clamps a raw score into 0..=100. NaN scores 0.
pub fn to_score(raw: f64) -> u32 {
    if raw.is_nan() {
        return 0;
    }
    raw.round().clamp(0.0, 100.0) as u32
}

// ────────────────────────────────────────────────────────────────────────────
// Keyword Match
// ────────────────────────────────────────────────────────────────────────────

/// Whole-word, case-insensitive job-keyword occurrences divided by résumé word
/// count, scaled so `KEYWORD_DENSITY_TARGET` maps to 100.
pub fn keyword_match(resume: &ResumeDocument, keywords: &[String]) -> u32 {
    let text = resume.flatten_text();
    let words = word_count(&text);
    if words == 0 || keywords.is_empty() {
        return 0;
    }
    let occurrences: usize = keywords
        .iter()
        .filter_map(|k| WordMatcher::new(k))
        .map(|m| m.count(&text))
        .sum();
    let density = occurrences as f64 / words as f64;
    to_score(density / KEYWORD_DENSITY_TARGET * 100.0)
}

// ────────────────────────────────────────────────────────────────────────────
// Experience Alignment
// ────────────────────────────────────────────────────────────────────────────

/// Ordered seniority ladder. Position is the level used for distance scoring.
const LEVELS: [&str; 6] = ["junior", "mid", "senior", "staff", "principal", "director"];

static LEVEL_PATTERNS: Lazy<Vec<(usize, Regex)>> = Lazy::new(|| {
    [
        (5, r"(?i)\b(director|head of|vp|vice president)\b"),
        (4, r"(?i)\bprincipal\b"),
        (3, r"(?i)\bstaff\b"),
        (2, r"(?i)\b(senior|sr\.?|lead)\b"),
        (1, r"(?i)\b(mid[- ]level|intermediate)\b"),
        (0, r"(?i)\b(junior|jr\.?|intern|graduate|entry[- ]level)\b"),
    ]
    .into_iter()
    .map(|(level, pattern)| (level, Regex::new(pattern).expect("static seniority regex")))
    .collect()
});

static YEARS_REQUIRED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(\d{1,2})\+?\s*(?:years|yrs)").expect("static years regex"));

/// Highest-ranked seniority pattern found in `text`, if any.
pub fn detect_level(text: &str) -> Option<usize> {
    LEVEL_PATTERNS
        .iter()
        .find(|(_, re)| re.is_match(text))
        .map(|(level, _)| *level)
}

fn level_for_years(years: f64) -> usize {
    match years {
        y if y < 2.0 => 0,
        y if y < 5.0 => 1,
        y if y < 8.0 => 2,
        y if y < 12.0 => 3,
        _ => 4,
    }
}

/// Level the job asks for: the extracted seniority, else seniority language in
/// the description, else a "N+ years" requirement.
fn required_level(job: &JobFacts, description: &str) -> Option<usize> {
    if let Some(level) = LEVELS.iter().position(|l| *l == job.seniority) {
        return Some(level);
    }
    if let Some(level) = detect_level(&job.target_title).or_else(|| detect_level(description)) {
        return Some(level);
    }
    YEARS_REQUIRED
        .captures(description)
        .and_then(|c| c[1].parse::<f64>().ok())
        .map(level_for_years)
}

/// Total months across all datable roles. Overlapping roles are counted once
/// per role, which only matters for concurrent positions.
fn years_of_experience(work: &[WorkExperience], today: NaiveDate) -> f64 {
    let months: i32 = work
        .iter()
        .filter_map(|w| w.span(today))
        .map(|(start, end)| months_between(start, end).max(0))
        .sum();
    f64::from(months) / 12.0
}

/// Level the résumé demonstrates: the most recent title's seniority language,
/// else total years of experience.
fn resume_level(resume: &ResumeDocument, today: NaiveDate) -> Option<usize> {
    if let Some(level) = resume.work.first().and_then(|w| detect_level(&w.title)) {
        return Some(level);
    }
    let years = years_of_experience(&resume.work, today);
    (years > 0.0).then(|| level_for_years(years))
}

/// 100 for a level match, minus 25 per step of distance. When the job gives no
/// seniority signal there is nothing to penalise against and the score is a
/// neutral 75.
pub fn experience_alignment(
    resume: &ResumeDocument,
    job: &JobFacts,
    description: &str,
    today: NaiveDate,
) -> u32 {
    let Some(required) = required_level(job, description) else {
        return 75;
    };
    let Some(actual) = resume_level(resume, today) else {
        return 0;
    };
    let distance = required.abs_diff(actual) as f64;
    to_score(100.0 - 25.0 * distance)
}

// ────────────────────────────────────────────────────────────────────────────
// Bullet Strength
// ────────────────────────────────────────────────────────────────────────────

const ACTION_VERBS: &[&str] = &[
    "accelerated", "achieved", "architected", "automated", "built", "championed", "created",
    "cut", "delivered", "designed", "developed", "drove", "eliminated", "engineered",
    "established", "expanded", "grew", "implemented", "improved", "increased", "launched",
    "led", "managed", "mentored", "migrated", "optimized", "owned", "pioneered", "reduced",
    "refactored", "saved", "scaled", "shipped", "spearheaded", "streamlined", "transformed",
];

static QUANTIFIED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d|%|\$|€|£").expect("static quantification regex"));

fn starts_with_action_verb(bullet: &str) -> bool {
    let Some(token) = first_token(bullet) else {
        return false;
    };
    let verb = token
        .trim_matches(|c: char| !c.is_alphabetic())
        .to_lowercase();
    ACTION_VERBS.contains(&verb.as_str()) || (verb.len() > 4 && verb.ends_with("ed"))
}

/// Per bullet: action-verb opening 40, quantification 40, conciseness 20.
pub fn bullet_score(bullet: &str) -> u32 {
    let mut score = 0;
    if starts_with_action_verb(bullet) {
        score += 40;
    }
    if QUANTIFIED.is_match(bullet) {
        score += 40;
    }
    if (CONCISE_MIN_WORDS..=CONCISE_MAX_WORDS).contains(&word_count(bullet)) {
        score += 20;
    }
    score
}

/// Mean bullet score across all work bullets; 0 with no bullets.
pub fn bullet_strength(resume: &ResumeDocument) -> u32 {
    let scores: Vec<u32> = resume.bullets().map(|(_, _, b)| bullet_score(b)).collect();
    if scores.is_empty() {
        return 0;
    }
    to_score(f64::from(scores.iter().sum::<u32>()) / scores.len() as f64)
}

// ────────────────────────────────────────────────────────────────────────────
// Skills Match
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkillsCoverage {
    pub score: u32,
    /// Job keywords found in neither the skills list nor any work bullet, in job order.
    pub missing: Vec<String>,
}

/// A skills entry must name the keyword exactly (ignoring case); a bullet only
/// needs to mention it as a whole word.
fn demonstrates(resume: &ResumeDocument, keyword: &str) -> bool {
    let wanted = keyword.trim().to_lowercase();
    if resume
        .skills
        .iter()
        .any(|s| s.trim().to_lowercase() == wanted)
    {
        return true;
    }
    WordMatcher::new(keyword)
        .is_some_and(|m| resume.bullets().any(|(_, _, b)| m.is_match(b)))
}

/// Share of the job's keywords the résumé demonstrates in its skills or bullets.
pub fn skills_match(resume: &ResumeDocument, keywords: &[String]) -> SkillsCoverage {
    if keywords.is_empty() {
        return SkillsCoverage {
            score: 0,
            missing: Vec::new(),
        };
    }
    let missing: Vec<String> = keywords
        .iter()
        .filter(|k| !demonstrates(resume, k))
        .cloned()
        .collect();
    let matched = keywords.len() - missing.len();
    SkillsCoverage {
        score: to_score(matched as f64 / keywords.len() as f64 * 100.0),
        missing,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Education & Certifications
// ────────────────────────────────────────────────────────────────────────────

/// Education present 50, a named degree +15, finished within ten years +10,
/// any certification +25.
pub fn education_certifications(resume: &ResumeDocument, today: NaiveDate) -> u32 {
    let mut score = 0;
    if !resume.education.is_empty() {
        score += 50;

        if resume
            .education
            .iter()
            .any(|e| e.degree.as_deref().is_some_and(|d| !d.trim().is_empty()))
        {
            score += 15;
        }

        let recent = resume.education.iter().any(|e| {
            e.to
                .as_deref()
                .and_then(|raw| parse_resume_date(raw, true, today))
                .is_some_and(|end| today.year() - end.year() <= EDUCATION_RECENCY_YEARS)
        });
        if recent {
            score += 10;
        }
    }
    if resume.certifications.iter().any(|c| !c.name.trim().is_empty()) {
        score += 25;
    }
    score.min(100)
}

// ────────────────────────────────────────────────────────────────────────────
// Formatting & Structure
// ────────────────────────────────────────────────────────────────────────────

/// Fraction of structural checks the document passes.
pub fn formatting_structure(resume: &ResumeDocument) -> u32 {
    let work = &resume.work;
    let checks = [
        !resume.name.trim().is_empty(),
        !resume.contact.email.trim().is_empty(),
        resume.contact.phone.is_some() || resume.contact.link.is_some(),
        !resume.summary.trim().is_empty(),
        !resume.skills.is_empty(),
        !work.is_empty(),
        !work.is_empty()
            && work
                .iter()
                .all(|w| !w.company.trim().is_empty() && !w.title.trim().is_empty()),
        !work.is_empty() && work.iter().all(|w| w.from.is_some()),
        !work.is_empty() && work.iter().all(|w| !w.bullets.is_empty()),
        !resume.education.is_empty(),
    ];
    let passed = checks.iter().filter(|c| **c).count();
    to_score(passed as f64 / checks.len() as f64 * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::resume::{Certification, ContactInfo, Education};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
    }

    fn keywords(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn resume_with(skills: &[&str], bullets: &[&str]) -> ResumeDocument {
        ResumeDocument {
            name: "Ada".into(),
            skills: skills.iter().map(|s| s.to_string()).collect(),
            work: vec![WorkExperience {
                company: "Acme".into(),
                title: "Senior Backend Engineer".into(),
                from: Some("2016-01".into()),
                to: Some("Present".into()),
                bullets: bullets.iter().map(|s| s.to_string()).collect(),
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_skills_match_scenario_python_only_vs_full_stack() {
        let jd = keywords(&["Python", "Kubernetes", "PostgreSQL"]);
        let python_only = resume_with(&["Python"], &["Built Python services"]);
        let all_three = resume_with(
            &["Python", "Kubernetes", "PostgreSQL"],
            &["Built Python services on Kubernetes backed by PostgreSQL"],
        );

        let partial = skills_match(&python_only, &jd);
        let full = skills_match(&all_three, &jd);
        assert!(partial.score < full.score);
        assert_eq!(partial.missing, vec!["Kubernetes", "PostgreSQL"]);
        assert!(!partial.missing.contains(&"Python".to_string()));
        assert!(full.missing.is_empty());
    }

    #[test]
    fn test_keywords_inside_longer_words_do_not_match() {
        let jd = keywords(&["Java", "Go"]);
        let r = resume_with(
            &["JavaScript", "MongoDB"],
            &["Built good dashboards going to Google"],
        );

        let coverage = skills_match(&r, &jd);
        assert_eq!(coverage.score, 0);
        assert_eq!(coverage.missing, vec!["Java", "Go"]);
        assert_eq!(keyword_match(&r, &jd), 0);

        let real = resume_with(&["Java"], &["Wrote Go services"]);
        let coverage = skills_match(&real, &jd);
        assert_eq!(coverage.score, 100);
        assert!(coverage.missing.is_empty());
        assert!(keyword_match(&real, &jd) > 0);
    }

    #[test]
    fn test_skills_match_counts_bullets_too() {
        let r = resume_with(&[], &["Ran Kubernetes clusters"]);
        let coverage = skills_match(&r, &keywords(&["Kubernetes"]));
        assert_eq!(coverage.score, 100);
    }

    #[test]
    fn test_keyword_match_scales_density_and_caps() {
        let r = resume_with(&[], &["python python python python"]);
        assert_eq!(keyword_match(&r, &keywords(&["Python"])), 100);

        let none = resume_with(&[], &["Wrote Go services"]);
        assert_eq!(keyword_match(&none, &keywords(&["Python"])), 0);
        assert_eq!(keyword_match(&none, &[]), 0);
    }

    #[test]
    fn test_keyword_match_is_monotonic_in_mentions() {
        let jd = keywords(&["Python", "Kubernetes", "PostgreSQL"]);
        let filler = ["worked on many internal systems across several teams for years"; 5].join(" ");
        let one = resume_with(&[], &[&format!("Python {filler}")]);
        let three = resume_with(&[], &[&format!("Python Kubernetes PostgreSQL {filler}")]);
        assert!(keyword_match(&one, &jd) < keyword_match(&three, &jd));
    }

    #[test]
    fn test_bullet_score_components() {
        assert_eq!(
            bullet_score("Reduced checkout latency by 40% across twelve regional services"),
            100
        );
        assert_eq!(bullet_score("responsible for stuff"), 0);
        assert_eq!(bullet_score("Led the team"), 40);
    }

    #[test]
    fn test_bullet_strength_averages_and_handles_empty() {
        let r = resume_with(&[], &["Led the team", "responsible for stuff"]);
        assert_eq!(bullet_strength(&r), 20);
        assert_eq!(bullet_strength(&ResumeDocument::default()), 0);
    }

    #[test]
    fn test_experience_alignment_exact_and_distant() {
        let senior_job = JobFacts {
            seniority: "senior".into(),
            ..Default::default()
        };
        let r = resume_with(&[], &["x"]);
        assert_eq!(experience_alignment(&r, &senior_job, "", today()), 100);

        let director_job = JobFacts {
            seniority: "director".into(),
            ..Default::default()
        };
        assert_eq!(experience_alignment(&r, &director_job, "", today()), 25);
    }

    #[test]
    fn test_experience_alignment_detects_from_description_and_years() {
        let job = JobFacts {
            seniority: "unknown".into(),
            ..Default::default()
        };
        let mut r = resume_with(&[], &["x"]);
        r.work[0].title = "Software Engineer".into();
        r.work[0].from = Some("2021-06".into());
        // Three years of experience reads as mid-level; the posting asks for 5+ years.
        assert_eq!(
            experience_alignment(&r, &job, "You have 5+ years of backend experience", today()),
            75
        );
        assert_eq!(experience_alignment(&r, &job, "Great team", today()), 75);
    }

    #[test]
    fn test_detect_level_prefers_highest_rank() {
        assert_eq!(detect_level("Senior Staff Engineer"), Some(3));
        assert_eq!(detect_level("Sr. Developer"), Some(2));
        assert_eq!(detect_level("Engineer"), None);
    }

    #[test]
    fn test_education_certifications_components() {
        let mut r = ResumeDocument::default();
        assert_eq!(education_certifications(&r, today()), 0);

        r.education.push(Education {
            institution: "MIT".into(),
            degree: Some("BSc".into()),
            to: Some("2018".into()),
            ..Default::default()
        });
        assert_eq!(education_certifications(&r, today()), 75);

        r.certifications.push(Certification {
            name: "CKA".into(),
            ..Default::default()
        });
        assert_eq!(education_certifications(&r, today()), 100);
    }

    #[test]
    fn test_formatting_structure_counts_checks() {
        assert_eq!(formatting_structure(&ResumeDocument::default()), 0);

        let mut r = resume_with(&["Python"], &["Built things"]);
        r.contact = ContactInfo {
            email: "ada@example.com".into(),
            phone: Some("555".into()),
            ..Default::default()
        };
        r.summary = "Engineer".into();
        r.education.push(Education::default());
        assert_eq!(formatting_structure(&r), 100);
    }
}
