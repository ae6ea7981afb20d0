use anyhow::Result;
use cliclack::input;

use studydesk::errors::ToolResult;
use studydesk::tools::planner::StudyPlanner;
use studydesk::tools::ProviderHandle;

use crate::prompt::Theme;
use crate::render::{busy, print_markdown, print_tool_error};

pub async fn execute(
    provider: ProviderHandle,
    subjects: Option<String>,
    exam_date: Option<String>,
    hours: Option<String>,
) -> Result<()> {
    let mut planner = StudyPlanner::new(provider);
    planner.set_subjects(subjects.unwrap_or_default());
    planner.set_exam_date(exam_date.unwrap_or_default());
    planner.set_study_hours(hours.unwrap_or_default());
    run(&mut planner).await
}

fn ask(label: &str, placeholder: &str, current: &str) -> Result<String> {
    if !current.trim().is_empty() {
        return Ok(current.to_string());
    }
    Ok(input(label).placeholder(placeholder).interact()?)
}

/// Ask for whichever form fields are still blank
pub fn gather(planner: &mut StudyPlanner) -> Result<()> {
    let form = planner.form().clone();
    planner.set_subjects(ask(
        "Subjects/Topics",
        "Calculus, Physics",
        &form.subjects,
    )?);
    planner.set_exam_date(ask("Exam date", "2024-06-01", &form.exam_date)?);
    planner.set_study_hours(ask("Daily study hours", "3", &form.study_hours)?);
    Ok(())
}

pub fn show(outcome: &ToolResult<String>) -> Result<()> {
    match outcome {
        Ok(plan) => print_markdown(plan, Theme::Dark),
        Err(e) => print_tool_error(e),
    }
}

pub async fn run(planner: &mut StudyPlanner) -> Result<()> {
    gather(planner)?;
    let outcome = busy("Planning...", planner.submit()).await;
    show(&outcome)
}
