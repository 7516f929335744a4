use std::{io::Write, pin::pin, time::Duration};

use crossterm::{
    QueueableCommand,
    cursor::MoveTo,
    execute,
    style::Print,
    terminal::{Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use launchpad_sdk::{page::Page, source::ChainSource, sync::Synchronizer};
use tokio_util::sync::CancellationToken;

pub(crate) async fn render<S: ChainSource>(
    page: &Page,
    sync: &Synchronizer<S>,
    interval: Duration,
    num_refreshes: Option<u64>,
    cancellation_token: CancellationToken,
) -> anyhow::Result<()> {
    let mut refreshes = pin!(sync.refreshes(interval, tokio::time::sleep));
    let mut refreshes_left = num_refreshes;

    let mut stdout = std::io::stdout();

    execute!(stdout, EnterAlternateScreen, Clear(ClearType::All), MoveTo(0, 0))?;

    loop {
        if refreshes_left.is_some_and(|count| count == 0) {
            break;
        }

        let event = tokio::select! {
            _ = cancellation_token.cancelled() => break,
            event = refreshes.next() => match event {
                Some(event) => event,
                None => break,
            },
        };

        stdout.queue(Clear(ClearType::All))?;
        stdout.queue(MoveTo(0, 0))?;
        stdout.queue(Print(super::listings::format(page, &sync.snapshot(), &event)))?;
        stdout.flush()?;

        if let Some(ref mut count) = refreshes_left {
            *count -= 1;
        }
    }

    execute!(stdout, LeaveAlternateScreen)?;

    Ok(())
}
