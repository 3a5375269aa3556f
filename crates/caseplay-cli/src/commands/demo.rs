//! Demo command - autoplay through the subjects.

use std::sync::Arc;

use anyhow::Result;
use caseplay_core::ReferenceData;
use caseplay_engine::{Engine, EngineConfig};
use caseplay_events::ReplayEvent;
use tracing::info;

use crate::presenter::Presenter;
use crate::theme::Theme;

/// Run the initial investigation, then let autoplay cycle subjects.
///
/// Stops after `cycles` autoplay runs have completed, on Ctrl-C, or right
/// after the initial run when autoplay is off.
pub(crate) async fn run_demo(
    config: EngineConfig,
    reference: Arc<ReferenceData>,
    cycles: Option<u32>,
    autoplay: bool,
) -> Result<()> {
    let period = config.autoplay.period;
    let presenter = Presenter::new(Arc::clone(&reference)).without_progress();
    let engine = Engine::start(config.with_autoplay(autoplay), reference)?;
    let mut events = engine.events();

    if autoplay {
        println!(
            "{}",
            Theme::info(&format!(
                "Autoplay every {}s. Press Ctrl-C to stop.",
                period.as_secs()
            ))
        );
    }

    engine.request_run_once().await?;

    let mut completed: u32 = 0;
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = &mut ctrl_c => {
                println!();
                println!("{}", Theme::warning("Interrupted"));
                break;
            }
            event = events.recv() => {
                let Some(event) = event else { break };
                presenter.render(&event);

                if let ReplayEvent::RunCompleted { .. } = event.as_ref() {
                    presenter.summary(&engine.snapshot());
                    completed = completed.saturating_add(1);
                    let autoplay_runs = completed.saturating_sub(1);
                    if !autoplay || cycles.is_some_and(|n| autoplay_runs >= n) {
                        break;
                    }
                }
            }
        }
    }

    info!(runs = completed, "Demo finished");
    engine.shutdown().await;
    Ok(())
}
