use std::sync::Arc;

use serde::Serialize;

use super::{gateway_error, ProviderHandle};
use crate::errors::{ToolError, ToolResult};
use crate::models::message::Message;
use crate::prompt_template::{render_prompt, STUDY_PLAN};
use crate::providers::base::{CompletionOptions, ModelTier, Provider};
use crate::state::SubmissionState;

pub const MISSING_FIELDS_ERROR: &str = "Please fill in all the fields to generate a plan.";
pub const INVALID_HOURS_ERROR: &str = "Daily study hours must be a positive number.";
pub const PLAN_ERROR: &str = "Failed to generate study plan. Please try again.";
pub const INIT_ERROR: &str =
    "Failed to initialize the study planner. Please check your API key and refresh.";

/// The planner form. Values are embedded in the prompt exactly as entered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PlanRequest {
    pub subjects: String,
    pub exam_date: String,
    pub study_hours: String,
}

impl PlanRequest {
    pub fn new(
        subjects: impl Into<String>,
        exam_date: impl Into<String>,
        study_hours: impl Into<String>,
    ) -> Self {
        Self {
            subjects: subjects.into(),
            exam_date: exam_date.into(),
            study_hours: study_hours.into(),
        }
    }

    pub fn is_complete(&self) -> bool {
        [&self.subjects, &self.exam_date, &self.study_hours]
            .iter()
            .all(|field| !field.trim().is_empty())
    }

    pub fn validate(&self) -> ToolResult<()> {
        if !self.is_complete() {
            return Err(ToolError::Validation(MISSING_FIELDS_ERROR.to_string()));
        }
        match self.study_hours.trim().parse::<f32>() {
            Ok(hours) if hours.is_finite() && hours > 0.0 => Ok(()),
            _ => Err(ToolError::Validation(INVALID_HOURS_ERROR.to_string())),
        }
    }

    pub fn prompt(&self) -> Result<String, tera::Error> {
        render_prompt(STUDY_PLAN, self)
    }
}

pub struct PlanJob {
    provider: Arc<dyn Provider>,
    prompt: String,
}

impl PlanJob {
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub async fn run(self) -> ToolResult<String> {
        let message = Message::user().with_text(self.prompt);
        let (reply, _usage) = self
            .provider
            .complete("", &[message], &CompletionOptions::text(ModelTier::Reasoning))
            .await
            .map_err(|e| gateway_error("planner", PLAN_ERROR, e))?;

        Ok(reply.text())
    }
}

#[derive(Debug)]
pub struct StudyPlanner {
    provider: ProviderHandle,
    form: PlanRequest,
    state: SubmissionState<String>,
    plan: Option<String>,
}

impl StudyPlanner {
    pub fn new(provider: ProviderHandle) -> Self {
        Self {
            provider,
            form: PlanRequest::default(),
            state: SubmissionState::default(),
            plan: None,
        }
    }

    pub fn set_subjects(&mut self, subjects: impl Into<String>) {
        self.form.subjects = subjects.into();
    }

    pub fn set_exam_date(&mut self, exam_date: impl Into<String>) {
        self.form.exam_date = exam_date.into();
    }

    pub fn set_study_hours(&mut self, study_hours: impl Into<String>) {
        self.form.study_hours = study_hours.into();
    }

    pub fn set_form(&mut self, form: PlanRequest) {
        self.form = form;
    }

    pub fn form(&self) -> &PlanRequest {
        &self.form
    }

    pub fn state(&self) -> &SubmissionState<String> {
        &self.state
    }

    /// The latest plan. A new success replaces it, a failure leaves it in place.
    pub fn plan(&self) -> Option<&str> {
        self.plan.as_deref()
    }

    pub fn can_submit(&self) -> bool {
        !self.state.is_pending() && self.form.is_complete()
    }

    pub fn begin(&mut self) -> ToolResult<PlanJob> {
        if self.state.is_pending() {
            return Err(ToolError::Busy);
        }
        self.form.validate().map_err(|e| self.state.fail(e))?;
        let provider = self
            .provider
            .get(INIT_ERROR)
            .map_err(|e| self.state.fail(e))?;
        let prompt = self
            .form
            .prompt()
            .map_err(|e| self.state.fail(gateway_error("planner", PLAN_ERROR, e)))?;

        self.state.begin()?;
        Ok(PlanJob { provider, prompt })
    }

    pub fn finish(&mut self, outcome: ToolResult<String>) {
        if let Ok(plan) = &outcome {
            self.plan = Some(plan.clone());
        }
        self.state.settle(outcome);
    }

    pub async fn submit(&mut self) -> ToolResult<String> {
        let job = self.begin()?;
        let outcome = job.run().await;
        self.finish(outcome.clone());
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::mock::MockProvider;

    fn planner(mock: &MockProvider) -> StudyPlanner {
        StudyPlanner::new(ProviderHandle::ready(Arc::new(mock.clone())))
    }

    #[tokio::test]
    async fn test_plan_embeds_form_values() {
        let mock = MockProvider::with_texts(vec!["# Week 1\n- Limits"]);
        let mut tool = planner(&mock);
        tool.set_subjects("Calculus, Physics");
        tool.set_exam_date("2024-06-01");
        tool.set_study_hours("3");

        let plan = tool.submit().await.unwrap();
        assert_eq!(plan, "# Week 1\n- Limits");
        assert_eq!(tool.plan(), Some("# Week 1\n- Limits"));

        let calls = mock.calls();
        assert_eq!(calls.len(), 1);
        let prompt = calls[0].messages[0].text();
        assert!(prompt.contains("Subjects/Topics: Calculus, Physics"));
        assert!(prompt.contains("Exam Date: 2024-06-01"));
        assert!(prompt.contains("Daily study hours available: 3 hours"));
        assert_eq!(calls[0].options.tier, ModelTier::Reasoning);
    }

    #[tokio::test]
    async fn test_missing_field_blocks_submission() {
        let mock = MockProvider::default();
        let mut tool = planner(&mock);
        tool.set_subjects("Chemistry");
        tool.set_exam_date("2024-06-01");
        assert!(!tool.can_submit());

        let err = tool.submit().await.unwrap_err();
        assert_eq!(err, ToolError::Validation(MISSING_FIELDS_ERROR.to_string()));
        assert!(mock.calls().is_empty());
    }

    #[test]
    fn test_hours_must_be_positive() {
        for hours in ["zero", "0", "-2", "NaN"] {
            let form = PlanRequest::new("History", "2024-06-01", hours);
            assert_eq!(
                form.validate(),
                Err(ToolError::Validation(INVALID_HOURS_ERROR.to_string())),
                "hours {:?}",
                hours
            );
        }
        assert!(PlanRequest::new("History", "2024-06-01", "1.5").validate().is_ok());
    }

    #[tokio::test]
    async fn test_new_plan_replaces_old_and_failure_keeps_it() {
        let mock = MockProvider::with_results(vec![
            Ok(Message::assistant().with_text("plan A")),
            Ok(Message::assistant().with_text("plan B")),
            Err("timeout".to_string()),
        ]);
        let mut tool = planner(&mock);
        tool.set_form(PlanRequest::new("Biology", "2024-07-15", "2"));

        tool.submit().await.unwrap();
        tool.submit().await.unwrap();
        assert_eq!(tool.plan(), Some("plan B"));

        let err = tool.submit().await.unwrap_err();
        assert_eq!(err, ToolError::Gateway(PLAN_ERROR.to_string()));
        assert_eq!(tool.plan(), Some("plan B"));
        assert_eq!(tool.state().error(), Some(PLAN_ERROR));
    }

    #[tokio::test]
    async fn test_incomplete_form_is_reported_before_a_missing_provider() {
        let mut tool = StudyPlanner::new(ProviderHandle::unavailable("no api key"));
        tool.set_subjects("Chemistry");

        let err = tool.submit().await.unwrap_err();
        assert_eq!(err, ToolError::Validation(MISSING_FIELDS_ERROR.to_string()));

        tool.set_form(PlanRequest::new("Chemistry", "2024-06-01", "2"));
        let err = tool.submit().await.unwrap_err();
        assert_eq!(err, ToolError::Initialization(INIT_ERROR.to_string()));
    }
}
