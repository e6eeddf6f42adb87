// Prompt text for résumé-to-job matching.
// The schema block here is the contract `parser` accepts.

/// System prompt for match analysis — enforces JSON-only output.
pub const MATCH_SYSTEM: &str = "You are an expert career counselor. \
    Always respond with valid JSON in the exact format requested.";

const PREAMBLE: &str = "You are an expert career counselor and recruiter with 20+ years of experience.
Analyze how well this resume matches the job description and provide actionable insights.";

const ANALYSIS_INSTRUCTIONS: &str = r#"ANALYSIS INSTRUCTIONS:
1. Carefully compare the resume against the job requirements
2. Look for matching skills, experience, education, and qualifications
3. Identify gaps and missing requirements
4. Consider experience level (junior, mid, senior) compatibility
5. Evaluate education requirements vs candidate background

RECOMMENDATION CRITERIA:
- APPLY: 70%+ match, most requirements met, good fit
- DECENT_CHANCE: 40-69% match, some gaps but worth trying
- AVOID: <40% match, major gaps, poor fit or overqualified

Please provide your analysis in this exact JSON format:
{
    "recommendation": "APPLY" | "AVOID" | "DECENT_CHANCE",
    "match_score": <integer 0-100>,
    "confidence_score": <integer 0-100>,
    "strengths": ["Matching qualifications, e.g. Strong Python skills"],
    "weaknesses": ["Missing requirements, e.g. Limited experience in X"],
    "missing_skills": ["Specific skills from the job not in the resume"],
    "experience_match": "How the experience level matches the requirements",
    "education_match": "How the education matches the requirements",
    "detailed_reasoning": "Detailed explanation of the recommendation with specific examples"
}

ANALYSIS:"#;

/// Renders the user prompt for one résumé/job pair.
///
/// Both texts are embedded verbatim. Pure and infallible: empty inputs give
/// empty sections.
pub fn build_match_prompt(resume_text: &str, job_text: &str) -> String {
    format!(
        "{PREAMBLE}\n\nRESUME:\n{resume_text}\n\nJOB DESCRIPTION:\n{job_text}\n\n{ANALYSIS_INSTRUCTIONS}\n"
    )
}
