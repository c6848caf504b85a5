//! Red-flag extraction: human-readable quality warnings about a résumé.
//!
//! Independent of scoring. Runs against the optimized résumé only, and an
//! empty list is the normal result for a clean document. Overlapping roles are
//! not flagged.

use std::collections::HashSet;

use chrono::NaiveDate;

use crate::models::resume::{months_between, ResumeDocument, WorkExperience};
use crate::text::word_count;

/// Months between roles that count as an unexplained gap.
pub const GAP_THRESHOLD_MONTHS: i32 = 6;
pub const MAX_BULLET_WORDS: usize = 40;

fn entry_label(index: usize, work: &WorkExperience) -> String {
    match (work.title.trim(), work.company.trim()) {
        ("", "") => format!("Work entry {}", index + 1),
        (title, "") => title.to_string(),
        ("", company) => company.to_string(),
        (title, company) => format!("{title} at {company}"),
    }
}

pub fn extract_red_flags(resume: &ResumeDocument, today: NaiveDate) -> Vec<String> {
    let mut flags = Vec::new();

    if resume.contact.email.trim().is_empty() {
        flags.push("Missing email address in contact details".to_string());
    }
    let has_phone = resume
        .contact
        .phone
        .as_deref()
        .is_some_and(|p| !p.trim().is_empty());
    let has_link = resume
        .contact
        .link
        .as_deref()
        .is_some_and(|l| !l.trim().is_empty());
    if !has_phone && !has_link {
        flags.push("No phone number or profile link to reach the candidate".to_string());
    }
    if resume.summary.trim().is_empty() {
        flags.push("Professional summary is empty".to_string());
    }

    for (i, work) in resume.work.iter().enumerate() {
        if work.bullets.is_empty() {
            flags.push(format!("{} has no bullet points", entry_label(i, work)));
        }
        if work.span(today).is_none() {
            flags.push(format!("{} is missing employment dates", entry_label(i, work)));
        }
        for bullet in &work.bullets {
            let words = word_count(bullet);
            if words > MAX_BULLET_WORDS {
                flags.push(format!(
                    "A bullet under {} runs {words} words (over {MAX_BULLET_WORDS})",
                    entry_label(i, work)
                ));
            }
        }
    }

    flags.extend(employment_gaps(resume, today));
    flags.extend(duplicate_bullets(resume));
    flags
}

/// Gaps longer than `GAP_THRESHOLD_MONTHS` between consecutive roles, ordered
/// by start date. Roles without parseable dates are skipped.
fn employment_gaps(resume: &ResumeDocument, today: NaiveDate) -> Vec<String> {
    let mut spans: Vec<(NaiveDate, NaiveDate, String)> = resume
        .work
        .iter()
        .enumerate()
        .filter_map(|(i, w)| {
            w.span(today)
                .map(|(start, end)| (start, end, entry_label(i, w)))
        })
        .collect();
    spans.sort_by_key(|(start, _, _)| *start);

    let mut gaps = Vec::new();
    let mut iter = spans.into_iter();
    let Some((_, mut latest_end, mut latest_label)) = iter.next() else {
        return gaps;
    };
    for (start, end, label) in iter {
        let gap = months_between(latest_end, start);
        if gap > GAP_THRESHOLD_MONTHS {
            gaps.push(format!(
                "Unexplained employment gap of {gap} months between {latest_label} ({}) and {label} ({})",
                latest_end.format("%b %Y"),
                start.format("%b %Y"),
            ));
        }
        if end > latest_end {
            latest_end = end;
            latest_label = label;
        }
    }
    gaps
}

fn duplicate_bullets(resume: &ResumeDocument) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut reported = HashSet::new();
    let mut flags = Vec::new();
    for (_, _, bullet) in resume.bullets() {
        let key = bullet.trim().to_lowercase();
        if !seen.insert(key.clone()) && reported.insert(key) {
            flags.push(format!("Duplicate bullet: \"{}\"", bullet.trim()));
        }
    }
    flags
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::resume::ContactInfo;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
    }

    fn role(company: &str, from: &str, to: &str) -> WorkExperience {
        WorkExperience {
            company: company.into(),
            title: "Engineer".into(),
            from: Some(from.into()),
            to: Some(to.into()),
            bullets: vec![format!("Shipped the {company} platform")],
        }
    }

    fn clean_resume(work: Vec<WorkExperience>) -> ResumeDocument {
        ResumeDocument {
            name: "Ada".into(),
            contact: ContactInfo {
                email: "ada@example.com".into(),
                link: Some("https://github.com/ada".into()),
                ..Default::default()
            },
            summary: "Backend engineer".into(),
            work,
            ..Default::default()
        }
    }

    #[test]
    fn test_three_year_gap_is_flagged() {
        let resume = clean_resume(vec![
            role("Acme", "2021-01", "Present"),
            role("Beta", "2015-01", "2018-01"),
        ]);
        let flags = extract_red_flags(&resume, today());
        assert_eq!(flags.len(), 1);
        assert!(flags[0].contains("gap"));
        assert!(flags[0].contains("36 months"));
    }

    #[test]
    fn test_clean_resume_has_no_flags() {
        let resume = clean_resume(vec![
            role("Acme", "2020-03", "Present"),
            role("Beta", "2017-01", "2020-02"),
        ]);
        let flags = extract_red_flags(&resume, today());
        assert!(flags.is_empty());
        assert_eq!(serde_json::to_string(&flags).unwrap(), "[]");
    }

    #[test]
    fn test_overlapping_roles_are_not_flagged() {
        let resume = clean_resume(vec![
            role("Acme", "2019-01", "Present"),
            role("Side project", "2020-01", "2021-01"),
            role("Beta", "2016-01", "2019-06"),
        ]);
        assert!(extract_red_flags(&resume, today()).is_empty());
    }

    #[test]
    fn test_short_gap_is_tolerated() {
        let resume = clean_resume(vec![
            role("Acme", "2020-06", "Present"),
            role("Beta", "2017-01", "2020-01"),
        ]);
        assert!(extract_red_flags(&resume, today()).is_empty());
    }

    #[test]
    fn test_contact_and_summary_flags() {
        let mut resume = clean_resume(vec![role("Acme", "2020-01", "Present")]);
        resume.contact = ContactInfo::default();
        resume.summary = " ".into();
        let flags = extract_red_flags(&resume, today());
        assert_eq!(flags.len(), 3);
        assert!(flags.iter().any(|f| f.contains("email")));
        assert!(flags.iter().any(|f| f.contains("phone")));
        assert!(flags.iter().any(|f| f.contains("summary")));
    }

    #[test]
    fn test_work_entry_flags() {
        let mut undated = role("Acme", "2020-01", "Present");
        undated.from = None;
        undated.bullets.clear();
        let mut wordy = role("Beta", "2018-01", "2019-12");
        wordy.bullets = vec!["word ".repeat(45), "Shipped it".into(), "shipped it".into()];

        let flags = extract_red_flags(&clean_resume(vec![undated, wordy]), today());
        assert!(flags.contains(&"Engineer at Acme has no bullet points".to_string()));
        assert!(flags.contains(&"Engineer at Acme is missing employment dates".to_string()));
        assert!(flags.iter().any(|f| f.contains("45 words")));
        assert!(flags.iter().any(|f| f.starts_with("Duplicate bullet")));
    }
}
