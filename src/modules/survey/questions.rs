use once_cell::sync::Lazy;
use std::collections::BTreeMap;

use crate::db::Level;
use crate::error::AppError;

/// One question on a level's form. An empty `options` slice means free text;
/// a non-empty one renders as a multi-select.
#[derive(Debug, Clone, Copy)]
pub struct Question {
    pub id: &'static str,
    pub prompt: &'static str,
    pub required: bool,
    pub options: &'static [&'static str],
}

static BEGINNER_QUESTIONS: &[Question] = &[
    Question {
        id: "experience",
        prompt: "What is your programming experience so far?",
        required: true,
        options: &[],
    },
    Question {
        id: "goals",
        prompt: "What do you want to get out of this course?",
        required: true,
        options: &[],
    },
    Question {
        id: "topics",
        prompt: "Which topics interest you the most?",
        required: true,
        options: &[
            "machine learning",
            "nlp",
            "computer vision",
            "web development",
            "data engineering",
        ],
    },
    Question {
        id: "expectations",
        prompt: "Anything else you expect from the sessions?",
        required: false,
        options: &[],
    },
];

static ADVANCED_QUESTIONS: &[Question] = &[
    Question {
        id: "experience",
        prompt: "Which languages and stacks do you work with professionally?",
        required: true,
        options: &[],
    },
    Question {
        id: "challenges",
        prompt: "What is the hardest problem you are working on right now?",
        required: true,
        options: &[],
    },
    Question {
        id: "topics",
        prompt: "Which advanced topics should we cover?",
        required: true,
        options: &[
            "machine learning",
            "mlops",
            "distributed systems",
            "performance tuning",
            "research papers",
        ],
    },
    Question {
        id: "expectations",
        prompt: "What would make this course worth your time?",
        required: false,
        options: &[],
    },
];

// Static form configuration, loaded once rather than scattered across
// handlers.
static QUESTION_SETS: Lazy<BTreeMap<Level, &'static [Question]>> = Lazy::new(|| {
    BTreeMap::from([
        (Level::Beginner, BEGINNER_QUESTIONS),
        (Level::Advanced, ADVANCED_QUESTIONS),
    ])
});

pub fn question_set(level: Level) -> &'static [Question] {
    QUESTION_SETS[&level]
}

/// Check that every required question of the level's form has a non-blank
/// answer among the posted keys.
pub fn validate_required(
    level: Level,
    answers: &BTreeMap<String, Vec<String>>,
) -> Result<(), AppError> {
    for question in question_set(level) {
        if !question.required {
            continue;
        }
        let answered = answers
            .get(question.id)
            .map(|values| values.iter().any(|value| !value.trim().is_empty()))
            .unwrap_or(false);
        if !answered {
            return Err(AppError::MalformedPayload(format!(
                "Missing required answer: {}",
                question.id
            )));
        }
    }
    Ok(())
}
