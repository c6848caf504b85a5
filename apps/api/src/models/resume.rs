//! Structured résumé document produced by the parse stage.
//!
//! `work[i].bullets` ordering is significant: rewriting replaces bullet text
//! index-for-index and never reorders or drops bullets.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactInfo {
    /// Required by the parse contract. An empty string is surfaced as a red flag.
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkExperience {
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub to: Option<String>,
    #[serde(default)]
    pub bullets: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Education {
    #[serde(default)]
    pub institution: String,
    #[serde(default)]
    pub degree: Option<String>,
    #[serde(default)]
    pub field: Option<String>,
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub to: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Award {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub issuer: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Certification {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub issuer: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub bullets: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeDocument {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub contact: ContactInfo,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub work: Vec<WorkExperience>,
    #[serde(default)]
    pub education: Vec<Education>,
    #[serde(default)]
    pub awards: Vec<Award>,
    #[serde(default)]
    pub certifications: Vec<Certification>,
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub languages: Vec<String>,
}

impl ResumeDocument {
    pub fn bullet_count(&self) -> usize {
        self.work.iter().map(|w| w.bullets.len()).sum()
    }

    /// All work bullets in document order: work index ascending, then bullet index.
    pub fn bullets(&self) -> impl Iterator<Item = (usize, usize, &str)> + '_ {
        self.work.iter().enumerate().flat_map(|(wi, w)| {
            w.bullets
                .iter()
                .enumerate()
                .map(move |(bi, b)| (wi, bi, b.as_str()))
        })
    }

    /// Plain-text rendering used for keyword counting and embeddings.
    pub fn flatten_text(&self) -> String {
        let mut parts: Vec<&str> = Vec::new();
        push_nonempty(&mut parts, &self.name);
        push_nonempty(&mut parts, &self.summary);
        parts.extend(self.skills.iter().map(String::as_str));
        for w in &self.work {
            push_nonempty(&mut parts, &w.title);
            push_nonempty(&mut parts, &w.company);
            parts.extend(w.bullets.iter().map(String::as_str));
        }
        for e in &self.education {
            push_nonempty(&mut parts, &e.institution);
            parts.extend(e.degree.as_deref());
            parts.extend(e.field.as_deref());
        }
        for c in &self.certifications {
            push_nonempty(&mut parts, &c.name);
        }
        for a in &self.awards {
            push_nonempty(&mut parts, &a.title);
        }
        for p in &self.projects {
            push_nonempty(&mut parts, &p.name);
            parts.extend(p.description.as_deref());
            parts.extend(p.bullets.iter().map(String::as_str));
        }
        parts.extend(self.languages.iter().map(String::as_str));
        parts.join("\n")
    }
}

fn push_nonempty<'a>(parts: &mut Vec<&'a str>, s: &'a str) {
    if !s.trim().is_empty() {
        parts.push(s);
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Free-form résumé dates
// ────────────────────────────────────────────────────────────────────────────

const PRESENT_MARKERS: &[&str] = &["present", "current", "now", "today", "ongoing"];

/// Parses the loose date strings résumés use ("2019-03", "Mar 2019", "03/2019",
/// "2019", "Present"). Dates resolve to the first of the month; a bare year
/// resolves to January for a start date and December for an end date.
/// "Present"-style markers resolve to `today`.
pub fn parse_resume_date(raw: &str, is_end: bool, today: NaiveDate) -> Option<NaiveDate> {
    let cleaned = raw.trim().trim_end_matches('.').replace('.', "");
    if cleaned.is_empty() {
        return None;
    }
    let lower = cleaned.to_lowercase();
    if PRESENT_MARKERS.iter().any(|m| lower == *m) {
        return Some(first_of_month(today));
    }

    if let Ok(d) = NaiveDate::parse_from_str(&cleaned, "%Y-%m-%d") {
        return Some(first_of_month(d));
    }
    if let Ok(d) = NaiveDate::parse_from_str(&format!("{cleaned}-01"), "%Y-%m-%d") {
        return Some(d);
    }
    if let Ok(d) = NaiveDate::parse_from_str(&format!("01/{cleaned}"), "%d/%m/%Y") {
        return Some(d);
    }
    if let Ok(d) = NaiveDate::parse_from_str(&format!("1 {cleaned}"), "%d %b %Y") {
        return Some(d);
    }
    if let Ok(year) = cleaned.parse::<i32>() {
        let month = if is_end { 12 } else { 1 };
        return NaiveDate::from_ymd_opt(year, month, 1);
    }
    None
}

fn first_of_month(d: NaiveDate) -> NaiveDate {
    d.with_day(1).unwrap_or(d)
}

/// Whole months from `start` to `end` (negative if `end` precedes `start`).
pub fn months_between(start: NaiveDate, end: NaiveDate) -> i32 {
    (end.year() - start.year()) * 12 + end.month() as i32 - start.month() as i32
}

impl WorkExperience {
    /// Start and end month of this role. A missing end date means the role is current.
    pub fn span(&self, today: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
        let start = parse_resume_date(self.from.as_deref()?, false, today)?;
        let end = match self.to.as_deref() {
            Some(raw) => parse_resume_date(raw, true, today)?,
            None => first_of_month(today),
        };
        Some((start, end))
    }
}
