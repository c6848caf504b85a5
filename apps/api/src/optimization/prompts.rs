// All LLM prompt constants for the optimization pipeline.
// Reuses cross-cutting fragments from llm_client::prompts.
//
// Every system prompt is distinct: test doubles route replies by system prompt.

/// System prompt for job-description extraction.
pub const JD_EXTRACT_SYSTEM: &str = "You are an expert job description analyst. \
    Extract the target role, company, seniority and the concrete keywords a résumé \
    should contain to pass screening for this posting.";

/// JD extraction prompt. Replace `{json_instruction}` and `{jd_text}`.
pub const JD_EXTRACT_PROMPT_TEMPLATE: &str = r#"{json_instruction}

Return a JSON object with this EXACT schema (no extra fields):
{
  "targetTitle": "Senior Backend Engineer",
  "targetCompany": "Acme",
  "seniority": "senior",
  "keywords": ["Python", "Kubernetes", "PostgreSQL"],
  "requirements": ["5+ years building backend services"]
}

Rules:
- KEYWORDS are concrete skills, tools, languages, frameworks and domain terms. Use the posting's own spelling. No duplicates.
- REQUIREMENTS are short phrases for the explicit must-haves.
- SENIORITY is one of "junior", "mid", "senior", "staff", "principal", "director", or "unknown".
- Use "" for a title or company the posting does not state.

JOB DESCRIPTION:
{jd_text}"#;

/// System prompt for turning raw résumé text into the structured document.
pub const RESUME_PARSE_SYSTEM: &str = "You are a meticulous résumé parser. \
    Convert raw résumé text into a structured document without rewording anything.";

/// Résumé parse prompt. Replace `{json_instruction}`, `{factuality_instruction}`, `{resume_text}`.
pub const RESUME_PARSE_PROMPT_TEMPLATE: &str = r#"{json_instruction}
{factuality_instruction}

Return a JSON object with this EXACT schema:
{
  "name": "Ada Lovelace",
  "contact": {"email": "ada@example.com", "phone": "+1 555 0100", "link": "https://github.com/ada", "location": "London"},
  "summary": "Backend engineer ...",
  "skills": ["Python", "PostgreSQL"],
  "work": [
    {"company": "Acme", "title": "Software Engineer", "from": "2020-01", "to": "Present",
     "bullets": ["Built the billing service", "Reduced p99 latency by 40%"]}
  ],
  "education": [{"institution": "MIT", "degree": "BSc", "field": "Computer Science", "from": "2014", "to": "2018"}],
  "awards": [{"title": "...", "issuer": "...", "date": "..."}],
  "certifications": [{"name": "...", "issuer": "...", "date": "..."}],
  "projects": [{"name": "...", "description": "...", "bullets": ["..."]}],
  "languages": ["English"]
}

Rules:
- Copy bullet text verbatim, one array element per bullet, in the order they appear.
- Keep work entries in the order they appear.
- Dates use "YYYY-MM" when the month is known, "YYYY" otherwise, and "Present" for current roles.
- Omit optional sections that are absent by returning empty arrays.

RÉSUMÉ:
{resume_text}"#;

/// System prompt for routing job keywords onto bullets.
pub const KEYWORD_MAP_SYSTEM: &str = "You are a résumé strategist. \
    Decide which existing résumé bullets can truthfully carry which job keywords.";

/// Keyword mapping prompt. Replace `{json_instruction}`, `{max_per_keyword}`,
/// `{keywords_json}`, `{bullets_json}`.
pub const KEYWORD_MAP_PROMPT_TEMPLATE: &str = r#"{json_instruction}

Return a JSON object with this EXACT schema:
{
  "assignments": [
    {"workIndex": 0, "bulletIndex": 1, "assignedKeywords": ["Kubernetes"]}
  ]
}

Rules:
- Only assign a keyword to a bullet whose underlying work plausibly involved it.
- Each keyword may be assigned to AT MOST {max_per_keyword} bullets in total.
- Only list bullets that receive at least one keyword.
- Use the exact keyword spelling from the list.

JOB KEYWORDS:
{keywords_json}

BULLETS (workIndex, bulletIndex, text):
{bullets_json}"#;

/// System prompt for rewriting one bullet.
pub const BULLET_REWRITE_SYSTEM: &str = "You are an expert résumé writer. \
    Rewrite a single résumé bullet so it is specific, results-oriented and opens \
    with a strong action verb.";

/// Bullet rewrite prompt. Replace `{json_instruction}`, `{factuality_instruction}`,
/// `{target_title}`, `{bullet}`, `{keywords_json}`, `{used_verbs_json}`.
pub const BULLET_REWRITE_PROMPT_TEMPLATE: &str = r#"{json_instruction}
{factuality_instruction}

Return a JSON object with this EXACT schema:
{"rewrittenBullet": "Cut checkout latency 40% by moving pricing to PostgreSQL"}

Rules:
- One sentence, at most 30 words, no trailing period.
- Work in these keywords where they are truthful: {keywords_json}
- Do NOT open with any of these verbs, already used elsewhere in the résumé: {used_verbs_json}
- Keep any numbers the original bullet contains.

TARGET ROLE: {target_title}

ORIGINAL BULLET:
{bullet}"#;

/// System prompt for the summary rewrite.
pub const SUMMARY_REWRITE_SYSTEM: &str = "You are an expert résumé writer. \
    Write a professional summary tailored to one job posting.";

/// Summary rewrite prompt. Replace `{json_instruction}`, `{factuality_instruction}`,
/// `{target_title}`, `{target_company}`, `{keywords_json}`, `{summary}`, `{bullets_json}`.
pub const SUMMARY_REWRITE_PROMPT_TEMPLATE: &str = r#"{json_instruction}
{factuality_instruction}

Return a JSON object with this EXACT schema:
{"summary": "Backend engineer with six years ..."}

Rules:
- Two to four sentences.
- Ground every claim in the rewritten bullets below.
- Mention the most relevant of these keywords where truthful: {keywords_json}

TARGET ROLE: {target_title} at {target_company}

CURRENT SUMMARY:
{summary}

REWRITTEN BULLETS:
{bullets_json}"#;

/// System prompt for the skills rewrite.
pub const SKILLS_REWRITE_SYSTEM: &str = "You are an expert résumé writer. \
    Curate and order a skills section for one job posting.";

/// Skills rewrite prompt. Replace `{json_instruction}`, `{factuality_instruction}`,
/// `{keywords_json}`, `{skills_json}`, `{summary}`.
pub const SKILLS_REWRITE_PROMPT_TEMPLATE: &str = r#"{json_instruction}
{factuality_instruction}

Return a JSON object with this EXACT schema:
{"skills": ["Python", "Kubernetes"]}

Rules:
- Order the most relevant skills for the posting first.
- Only keep or add a skill if the candidate's material supports it.
- Use the posting's spelling for matching keywords: {keywords_json}

CURRENT SKILLS:
{skills_json}

OPTIMIZED SUMMARY:
{summary}"#;
