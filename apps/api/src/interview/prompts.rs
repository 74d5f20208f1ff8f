// Interview LLM prompt templates.
// All prompts for the interview module are defined here.

pub const TOPIC_PICK_SYSTEM: &str = "\
You are a technical recruiter. \
You read resumes and decide which technical skill matters most for a target role.";

pub const TOPIC_PICK_PROMPT: &str = r#"RESUME:
{resume_text}...

TARGET JOB:
{job_description}

TASK: Identify the TOP 1 single most important technical skill.
Return JSON: {"topics": ["<skill>"]}"#;

pub const QUESTION_SYSTEM: &str = "\
You are a technical interviewer running a live, spoken mock interview.";

pub const QUESTION_PROMPT: &str = r#"CONTEXT:
- Job Role: {job_description}
- Topic: {topic}
- Difficulty: {difficulty}/3 (1=Easy, 3=Hard)
- Question Count: {question_number}

TASK:
Ask ONE direct interview question about {topic}.
- STRICTLY 1 or 2 sentences max."#;

pub const GRADE_SYSTEM: &str = "\
You are a strict but fair technical interviewer grading a spoken answer. \
The answer was transcribed by speech recognition; ignore filler words and transcription noise.";

pub const GRADE_PROMPT: &str = r#"Question: "{question}"
User Answer: "{answer}"
Task: Check if the answer is factually correct.
Return JSON: {"is_correct": true|false, "feedback": "<one sentence reason>"}"#;
