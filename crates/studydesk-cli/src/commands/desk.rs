use std::future::Future;
use std::pin::Pin;

use anyhow::Result;
use cliclack::{confirm, intro, outro, select};
use console::style;
use tokio::task::JoinHandle;

use studydesk::desk::{StudyDesk, View};
use studydesk::errors::{ToolError, ToolResult};
use studydesk::tools::planner::{StudyPlanner, PLAN_ERROR};
use studydesk::tools::summarizer::{Summarizer, SUMMARY_ERROR};
use studydesk::tools::ProviderHandle;

use super::{plan, summarize};
use crate::render::{busy, print_tool_error};

type TextJob = Pin<Box<dyn Future<Output = ToolResult<String>> + Send>>;

/// The tools whose requests may keep running while the user is elsewhere on the desk
trait BackgroundTool {
    const NOUN: &'static str;
    const PROGRESS: &'static str;

    fn gather(&mut self) -> Result<()>;
    fn show(outcome: &ToolResult<String>) -> Result<()>;
    fn start(&mut self) -> ToolResult<TextJob>;
    fn finish(&mut self, outcome: ToolResult<String>);
}

impl BackgroundTool for Summarizer {
    const NOUN: &'static str = "summary";
    const PROGRESS: &'static str = "Summarizing...";

    fn gather(&mut self) -> Result<()> {
        summarize::gather(self)
    }

    fn show(outcome: &ToolResult<String>) -> Result<()> {
        summarize::show(outcome)
    }

    fn start(&mut self) -> ToolResult<TextJob> {
        Ok(Box::pin(self.begin()?.run()))
    }

    fn finish(&mut self, outcome: ToolResult<String>) {
        Summarizer::finish(self, outcome)
    }
}

impl BackgroundTool for StudyPlanner {
    const NOUN: &'static str = "study plan";
    const PROGRESS: &'static str = "Planning...";

    fn gather(&mut self) -> Result<()> {
        plan::gather(self)
    }

    fn show(outcome: &ToolResult<String>) -> Result<()> {
        plan::show(outcome)
    }

    fn start(&mut self) -> ToolResult<TextJob> {
        Ok(Box::pin(self.begin()?.run()))
    }

    fn finish(&mut self, outcome: ToolResult<String>) {
        StudyPlanner::finish(self, outcome)
    }
}

/// A spawned request and, once collected, its unread outcome
struct Background {
    failure: &'static str,
    handle: Option<JoinHandle<ToolResult<String>>>,
    unread: Option<ToolResult<String>>,
}

impl Background {
    fn new(failure: &'static str) -> Self {
        Background {
            failure,
            handle: None,
            unread: None,
        }
    }

    fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    fn spawn(&mut self, job: TextJob) {
        self.handle = Some(tokio::spawn(job));
    }

    /// Take the outcome if the job is done. With `wait` set, wait for it.
    async fn collect(&mut self, wait: bool) -> Option<ToolResult<String>> {
        let handle = self.handle.take()?;
        if !wait && !handle.is_finished() {
            self.handle = Some(handle);
            return None;
        }
        let outcome = handle.await.unwrap_or_else(|e| {
            tracing::error!(error = %e, "background request did not complete");
            Err(ToolError::Gateway(self.failure.to_string()))
        });
        Some(outcome)
    }
}

/// Apply a finished background outcome to its controller and flag it as unread
async fn settle<T: BackgroundTool>(tool: &mut T, job: &mut Background) -> Result<()> {
    if let Some(outcome) = job.collect(false).await {
        tool.finish(outcome.clone());
        job.unread = Some(outcome);
        cliclack::log::info(format!("Your {} is ready.", T::NOUN))?;
    }
    Ok(())
}

async fn wait_and_show<T: BackgroundTool>(tool: &mut T, job: &mut Background) -> Result<()> {
    if let Some(outcome) = busy(T::PROGRESS, job.collect(true)).await {
        tool.finish(outcome.clone());
        T::show(&outcome)?;
    }
    Ok(())
}

async fn background_view<T: BackgroundTool>(tool: &mut T, job: &mut Background) -> Result<()> {
    if job.is_running() {
        let wait = confirm(format!("Your {} is still being written. Wait for it?", T::NOUN))
            .initial_value(true)
            .interact()?;
        if wait {
            wait_and_show(tool, job).await?;
        }
        return Ok(());
    }

    if let Some(outcome) = job.unread.take() {
        T::show(&outcome)?;
        if !confirm(format!("Start a new {}?", T::NOUN)).interact()? {
            return Ok(());
        }
    }

    tool.gather()?;
    match tool.start() {
        Ok(work) => job.spawn(work),
        Err(e) => return print_tool_error(&e),
    }

    let wait = confirm("Wait here for the result?")
        .initial_value(true)
        .interact()?;
    if wait {
        wait_and_show(tool, job).await
    } else {
        cliclack::log::info("Working on it in the background. Come back any time.")?;
        Ok(())
    }
}

fn job_hint(card_description: &str, job: &Background) -> String {
    if job.is_running() {
        "working in the background".to_string()
    } else if job.unread.is_some() {
        "result ready".to_string()
    } else {
        card_description.to_string()
    }
}

pub async fn execute(provider: ProviderHandle) -> Result<()> {
    let mut desk = StudyDesk::new(provider);
    let mut summary = Background::new(SUMMARY_ERROR);
    let mut plan = Background::new(PLAN_ERROR);
    intro(style(" studydesk ").on_cyan().black())?;

    loop {
        settle(desk.summarizer(), &mut summary).await?;
        settle(desk.planner(), &mut plan).await?;

        let topics = desk.review_topics();
        let mut picker = select("Where to?");
        for card in desk.dashboard() {
            let hint = match card.view {
                View::Summarizer => job_hint(card.description, &summary),
                View::Planner => job_hint(card.description, &plan),
                View::Doubts if !topics.is_empty() => format!("{} topics to review", topics.len()),
                _ => card.description.to_string(),
            };
            picker = picker.item(card.view, card.title, hint);
        }
        let view = picker.item(View::Dashboard, "Leave", "").interact()?;

        desk.switch_to(view);
        match view {
            View::Dashboard => break,
            View::Summarizer => background_view(desk.summarizer(), &mut summary).await?,
            View::Flashcards => super::flashcards::run(desk.flashcards()).await?,
            View::Planner => background_view(desk.planner(), &mut plan).await?,
            View::Doubts => super::chat::run(desk.tutor()).await?,
        }
        desk.switch_to(View::Dashboard);
    }

    outro("Good luck with your studies!")?;
    Ok(())
}
