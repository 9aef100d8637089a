/// A canned answer served when its keywords appear in the question
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FallbackRule {
    pub topic: &'static str,
    pub keywords: &'static [&'static str],
    pub response: &'static str,
}

impl FallbackRule {
    /// `lowered` must already be lower-case
    #[inline]
    pub fn matches(&self, lowered: &str) -> bool {
        self.keywords.iter().any(|keyword| lowered.contains(keyword))
    }
}

pub const COURSES_ANSWER: &str = "Atomcamp Courses:

Core Programs:
- Python for Data Science - Master Python programming fundamentals
- Machine Learning Fundamentals - Learn ML algorithms and applications
- Deep Learning with TensorFlow - Build neural networks and AI models
- Data Visualization - Create clear charts with Matplotlib and Seaborn
- SQL for Data Analysis - Database querying and data manipulation
- Statistics for Data Science - Statistical analysis and hypothesis testing

Learning Tracks:
- Beginner Track (3 months) - Perfect for newcomers
- Intermediate Track (6 months) - Build real-world projects
- Advanced Track (9 months) - Industry-ready with job placement

Would you like details about any specific course?";

pub const CAREERS_ANSWER: &str = "Career Services at Atomcamp:

Job Placement Support:
- Resume building and optimization
- Technical interview preparation
- Portfolio development guidance
- Direct connections with hiring partners
- Mock interviews with industry experts

Career Growth:
- Average salary increase: 150-300%
- 95% job placement rate within 6 months
- Access to exclusive job opportunities
- Ongoing career mentorship
- Industry networking events

Ready to transform your career in data science?";

/// Evaluated in order; the first matching rule wins
pub const FALLBACK_RULES: &[FallbackRule] = &[
    FallbackRule {
        topic: "courses",
        keywords: &["course", "courses", "learn", "study"],
        response: COURSES_ANSWER,
    },
    FallbackRule {
        topic: "careers",
        keywords: &["career", "job", "placement"],
        response: CAREERS_ANSWER,
    },
];

/// First rule whose keywords occur in `message`, ignoring case
#[inline]
pub fn classify(message: &str) -> Option<&'static FallbackRule> {
    let lowered = message.to_lowercase();
    FALLBACK_RULES.iter().find(|rule| rule.matches(&lowered))
}

/// Answer for questions no rule recognises
#[inline]
pub fn generic_answer(message: &str) -> String {
    format!(
        "Thank you for your question about \"{}\"!

As an Atomcamp AI assistant, I'm here to help you with:

Course Information - Learn about our data science programs
Career Guidance - Job placement and career growth
Technical Topics - Python, ML, AI, and data analysis
Getting Started - How to begin your data science journey

Would you like me to elaborate on any specific aspect?",
        message
    )
}
