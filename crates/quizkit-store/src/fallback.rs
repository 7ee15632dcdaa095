//! Default questions for quizzes stored without question content.
//!
//! The platform's catalog may list a quiz before its questions are
//! authored. When a store is configured to use defaults, such quizzes are
//! served with this introductory unconscious-bias set instead of being
//! rejected.

use quizkit_core::model::Question;

/// The built-in default question set.
pub fn default_questions() -> Vec<Question> {
    vec![
        Question::new(
            "What is unconscious bias?",
            &[
                "Deliberate discrimination",
                "Social stereotypes formed outside conscious awareness",
                "Personal preferences",
                "Cultural traditions",
            ],
            1,
        ),
        Question::new(
            "Which of the following is a way to combat unconscious bias?",
            &[
                "Ignore it completely",
                "Acknowledge and reflect on our biases",
                "Only interact with similar people",
                "Make quick decisions",
            ],
            1,
        ),
        Question::new(
            "How can organizations reduce unconscious bias in hiring?",
            &[
                "Only hire based on gut feeling",
                "Skip the interview process",
                "Use standardized questions and blind resume reviews",
                "Make decisions quickly",
            ],
            2,
        ),
    ]
}
