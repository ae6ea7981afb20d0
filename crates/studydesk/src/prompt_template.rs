use serde::Serialize;
use tera::{Context, Error as TeraError, Tera};

/// Instruction placed before the material to summarize
pub const SUMMARIZE: &str = include_str!("prompts/summarize.md");
/// Instruction placed before the material to turn into flashcards
pub const FLASHCARDS: &str = include_str!("prompts/flashcards.md");
pub const STUDY_PLAN: &str = include_str!("prompts/study_plan.md");
/// System instruction for the tutor chat session
pub const TUTOR_SYSTEM: &str = include_str!("prompts/tutor_system.md");
/// Question sent when a review topic is picked in the tutor chat
pub const TOPIC_QUESTION: &str = include_str!("prompts/topic_question.md");

pub fn load_prompt<T: Serialize>(template: &str, context_data: &T) -> Result<String, TeraError> {
    let mut tera = Tera::default();
    tera.add_raw_template("inline_template", template)?;
    let context = Context::from_serialize(context_data)?;
    let rendered = tera.render("inline_template", &context)?;
    Ok(rendered)
}

/// Render one of the bundled prompts, dropping the template file's trailing newline
pub fn render_prompt<T: Serialize>(template: &str, context_data: &T) -> Result<String, TeraError> {
    Ok(load_prompt(template, context_data)?.trim_end().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use serde_json::json;
    use std::collections::HashMap;

    #[test]
    fn test_load_prompt() {
        let template = "Hello, {{ name }}! You are {{ age }} years old.";
        let mut context = HashMap::new();
        context.insert("name".to_string(), "Alice".to_string());
        context.insert("age".to_string(), 30.to_string());

        let result = load_prompt(template, &context).unwrap();
        assert_eq!(result, "Hello, Alice! You are 30 years old.");
    }

    #[test]
    fn test_load_prompt_missing_variable() {
        let template = "Hello, {{ name }}! You are {{ age }} years old.";
        let mut context = HashMap::new();
        context.insert("name".to_string(), "Alice".to_string());
        // 'age' is missing from context
        let result = load_prompt(template, &context);
        assert!(result.is_err());
    }

    #[test]
    fn test_topic_question_is_not_escaped() {
        let rendered = render_prompt(TOPIC_QUESTION, &json!({ "topic": "F = m * a & <friends>" })).unwrap();
        assert_eq!(
            rendered,
            "Can you please explain \"F = m * a & <friends>\" in more detail?"
        );
    }

    #[test]
    fn test_study_plan_prompt() {
        let rendered = render_prompt(
            STUDY_PLAN,
            &json!({
                "subjects": "Calculus, Physics",
                "exam_date": "2024-06-01",
                "study_hours": "3"
            }),
        )
        .unwrap();

        let expected = indoc! {"
            Create a detailed study plan for a student.
            Subjects/Topics: Calculus, Physics
            Exam Date: 2024-06-01
            Daily study hours available: 3 hours
            The plan should be structured, realistic, and cover all topics. Break it down day-by-day or week-by-week leading up to the exam. Include suggestions for revision and breaks. Present the output as plain text with clear headings and lists."};
        assert_eq!(rendered, expected);
    }

    #[test]
    fn test_static_prompts_render() {
        let empty: HashMap<String, String> = HashMap::new();
        assert!(render_prompt(SUMMARIZE, &empty).unwrap().ends_with("key information:"));
        assert!(render_prompt(TUTOR_SYSTEM, &empty).unwrap().starts_with("You are a friendly"));
        let cards = render_prompt(FLASHCARDS, &json!({ "minimum_cards": 5 })).unwrap();
        assert!(cards.contains("at least 5 flashcards"));
    }
}
