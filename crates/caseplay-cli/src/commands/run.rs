//! Run command - play the investigation once.

use std::sync::Arc;

use anyhow::{Result, bail};
use caseplay_core::ReferenceData;
use caseplay_engine::{Engine, EngineConfig};
use caseplay_events::ReplayEvent;

use crate::presenter::Presenter;

/// Play one run and stream it to the terminal.
///
/// Uses the configured initial subject unless `subject` is given.
pub(crate) async fn run_once(
    config: EngineConfig,
    reference: Arc<ReferenceData>,
    subject: Option<String>,
) -> Result<()> {
    let presenter = Presenter::new(Arc::clone(&reference));
    let engine = Engine::start(config.with_autoplay(false), reference)?;
    let mut events = engine.events();

    let token = match subject {
        Some(subject) => engine.select_subject(subject).await?,
        None => engine.request_run_once().await?,
    };

    while let Some(event) = events.recv().await {
        presenter.render(&event);
        if matches!(event.as_ref(), ReplayEvent::RunCompleted { token: t, .. } if *t == token) {
            break;
        }
    }

    let Some(snapshot) = engine.wait_for_completion(token).await? else {
        bail!("run {token} was superseded");
    };
    presenter.summary(&snapshot);

    engine.shutdown().await;
    Ok(())
}
