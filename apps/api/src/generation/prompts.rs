// All LLM prompt constants and output schemas for the generation module.
// Reuses cross-cutting fragments from llm_client::prompts.

use serde_json::{json, Value};

// ────────────────────────────────────────────────────────────────────────────
// Job analysis
// ────────────────────────────────────────────────────────────────────────────

pub const ANALYST_SYSTEM: &str = "You are an expert job analyst who extracts key \
    information from job descriptions accurately.";

pub const MARKET_ANALYST_SYSTEM: &str = "You are an expert job market analyst and career \
    coach. Provide insightful, accurate, and concise analysis of job postings.";

/// Replace `{title}` and `{description}`.
pub const SKILLS_PROMPT_TEMPLATE: &str = r#"Extract all skills mentioned in the following job description.

Job Title: {title}

Job Description:
{description}

For each skill:
1. Identify if it is a technical skill (programming languages, tools, platforms), a soft skill (communication, leadership), or domain knowledge (industry-specific).
2. Assign a relevance score (1-10) based on how important it appears to be for the role.
3. If years of experience with the skill are mentioned, note that as well.

Focus on extracting actual skills rather than general job requirements."#;

/// Replace `{description}`.
pub const EXPERIENCE_PROMPT_TEMPLATE: &str = r#"Extract the minimum years of experience required from this job description:

{description}

Return the number of years (e.g. 5). If no specific years of experience are mentioned, return null."#;

/// Replace `{description}`.
pub const EDUCATION_PROMPT_TEMPLATE: &str = r#"Extract education requirements from this job description:

{description}

For each education requirement, identify:
1. The degree level (e.g. Bachelor's, Master's, PhD, High School)
2. The field of study (e.g. Computer Science, Engineering, Business); use an empty string if any field is accepted
3. Whether it is required (true) or only preferred (false)

If no education requirements are specified, return an empty array."#;

/// Replace `{title}` and `{description}`.
pub const JOB_LEVEL_PROMPT_TEMPLATE: &str = r#"Determine the job level/seniority based on this job title and description:

Title: {title}

Description:
{description}

Select the most appropriate level from:
- entry (0-2 years experience, junior roles)
- mid (3-5 years experience, regular individual contributor)
- senior (5-8 years experience, senior individual contributor)
- principal (8+ years experience, staff/principal/architect roles)
- executive (management, director, VP level)"#;

/// Replace `{description}`.
pub const KEYWORDS_PROMPT_TEMPLATE: &str = r#"Extract 10-15 important keywords from this job description that would be valuable to include in a resume. Focus on industry terms, technologies, methodologies, and specific skills mentioned.

Job Description:
{description}"#;

/// Replace `{title}`, `{company}`, `{location}` and `{description}`.
pub const ANALYSIS_SUMMARY_PROMPT_TEMPLATE: &str = r#"Provide a comprehensive analysis of this job posting:

Job Title: {title}
Company: {company}
Location: {location}

Description:
{description}

Your analysis should include:
1. The main responsibilities of the role
2. Key technical skills required
3. Experience level expected
4. Company culture indicators
5. Job benefits and perks (if mentioned)
6. Any red flags or concerns

Keep your analysis concise but insightful."#;

pub fn skills_schema() -> Value {
    json!({
        "type": "object",
        "required": ["skills"],
        "properties": {
            "skills": {
                "type": "array",
                "items": {
                    "type": "object",
                    "required": ["name", "category", "relevance"],
                    "properties": {
                        "name": {"type": "string"},
                        "category": {"type": "string", "enum": ["technical", "soft", "domain"]},
                        "relevance": {"type": "integer", "minimum": 1, "maximum": 10},
                        "years_required": {"type": ["integer", "null"], "minimum": 0}
                    }
                }
            }
        }
    })
}

pub fn experience_schema() -> Value {
    json!({
        "type": "object",
        "required": ["years"],
        "properties": {
            "years": {"type": ["integer", "null"], "minimum": 0}
        }
    })
}

pub fn education_schema() -> Value {
    json!({
        "type": "object",
        "required": ["education"],
        "properties": {
            "education": {
                "type": "array",
                "items": {
                    "type": "object",
                    "required": ["level", "field", "required"],
                    "properties": {
                        "level": {"type": "string"},
                        "field": {"type": "string"},
                        "required": {"type": "boolean"}
                    }
                }
            }
        }
    })
}

pub fn job_level_schema() -> Value {
    json!({
        "type": "object",
        "required": ["level"],
        "properties": {
            "level": {
                "type": "string",
                "enum": ["entry", "mid", "senior", "principal", "executive"]
            }
        }
    })
}

pub fn keywords_schema() -> Value {
    json!({
        "type": "object",
        "required": ["keywords"],
        "properties": {
            "keywords": {"type": "array", "items": {"type": "string"}}
        }
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Resume content
// ────────────────────────────────────────────────────────────────────────────

pub const SUMMARY_WRITER_SYSTEM: &str = "You are an expert resume writer who creates \
    tailored, professional summaries that highlight a candidate's most relevant \
    qualifications for specific jobs.";

pub const ACHIEVEMENT_WRITER_SYSTEM: &str = "You are an expert resume writer who tailors \
    achievement bullets to highlight relevance for specific jobs.";

/// Replace `{title}`, `{company}`, `{skills}`, `{level}`, `{experience}`,
/// `{summary}` and `{grounding}`.
pub const RESUME_SUMMARY_PROMPT_TEMPLATE: &str = r#"Write a professional summary for a resume tailored to this job:

Job Title: {title}
Company: {company}
Key Skills Needed: {skills}
Job Level: {level}

The person has experience as: {experience}

Their current summary is:
{summary}

Write a concise, powerful 3-4 sentence professional summary that:
1. Highlights their relevant experience and skills for this specific position
2. Uses strong action verbs and industry-specific terminology
3. Quantifies achievements where possible
4. Positions them as an ideal candidate for this specific role

The summary should be written in first person and should not exceed 100 words.
{grounding}

Return only the summary text."#;

/// Replace `{title}`, `{skills}`, `{achievements}` and `{grounding}`.
pub const ACHIEVEMENTS_PROMPT_TEMPLATE: &str = r#"Rewrite these professional achievements to highlight relevance for this specific job:

Job Title: {title}
Key Skills Required: {skills}

Original Achievements:
{achievements}

Rewrite each achievement to:
1. Emphasize skills and experiences most relevant to the target job
2. Use similar terminology to the job description
3. Preserve every existing metric exactly (numbers, percentages, amounts)
4. Start with a strong action verb
5. Be concise and impactful

Keep approximately the same number of achievements. Each bullet should be one sentence and no more than 20 words.
{grounding}

Return one bullet per line, each starting with "- "."#;
