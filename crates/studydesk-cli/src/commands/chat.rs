use anyhow::Result;

use studydesk::review::ReviewBoard;
use studydesk::tools::tutor::TutorController;
use studydesk::tools::ProviderHandle;

use crate::prompt::cliclack::CliclackPrompt;
use crate::session::Session;

pub async fn execute(provider: ProviderHandle) -> Result<()> {
    let board = ReviewBoard::new();
    let mut tutor = TutorController::new(provider, board.reader());
    run(&mut tutor).await
}

pub async fn run(tutor: &mut TutorController) -> Result<()> {
    Session::new(tutor, Box::new(CliclackPrompt::new()))
        .start()
        .await
}
