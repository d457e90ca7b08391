use std::collections::HashMap;

use crate::models::question::{Question, QuestionKind};

pub const TEXT_MAX_CHARS: usize = 500;
pub const TEXTAREA_MAX_CHARS: usize = 2000;

/// Separator used when a multiselect answer carries several chosen options.
const MULTISELECT_SEPARATOR: &str = ", ";

#[derive(Debug, Clone)]
pub struct ValidationReport {
    pub valid: bool,
    pub field_errors: HashMap<String, String>,
}

/// Checks a submitted answer set against a question list. Required answers
/// must be non-blank; text kinds are length-capped; select kinds must pick
/// from the question's options. Pure function, no side effects.
pub fn validate_answers(
    answers: &HashMap<String, String>,
    questions: &[Question],
) -> ValidationReport {
    let mut field_errors = HashMap::new();

    for question in questions {
        let answer = answers.get(&question.id).map(|a| a.as_str());

        if question.required && answer.map_or(true, |a| a.trim().is_empty()) {
            field_errors.insert(question.id.clone(), "This field is required".to_string());
            continue;
        }

        let Some(answer) = answer.filter(|a| !a.is_empty()) else {
            continue;
        };

        match question.kind {
            QuestionKind::Text => {
                if answer.chars().count() > TEXT_MAX_CHARS {
                    field_errors.insert(
                        question.id.clone(),
                        format!("Answer is too long (max {} characters)", TEXT_MAX_CHARS),
                    );
                }
            }
            QuestionKind::Textarea => {
                if answer.chars().count() > TEXTAREA_MAX_CHARS {
                    field_errors.insert(
                        question.id.clone(),
                        format!("Answer is too long (max {} characters)", TEXTAREA_MAX_CHARS),
                    );
                }
            }
            QuestionKind::Select => {
                if !is_known_option(question, answer) {
                    field_errors.insert(
                        question.id.clone(),
                        "Answer is not one of the available options".to_string(),
                    );
                }
            }
            QuestionKind::Multiselect => {
                let invalid = answer
                    .split(MULTISELECT_SEPARATOR)
                    .any(|chosen| !is_known_option(question, chosen));
                if invalid {
                    field_errors.insert(
                        question.id.clone(),
                        "Answer contains options that are not available".to_string(),
                    );
                }
            }
        }
    }

    ValidationReport {
        valid: field_errors.is_empty(),
        field_errors,
    }
}

fn is_known_option(question: &Question, value: &str) -> bool {
    question
        .options
        .as_ref()
        .map_or(false, |opts| opts.iter().any(|o| o == value))
}
