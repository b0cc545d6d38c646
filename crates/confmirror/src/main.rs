//! confmirror binary: configuration-refresh sidecar.

use clap::Parser;
use crossbeam_channel::bounded;
use tracing::info;
use tracing_subscriber::EnvFilter;

use confmirror::{ChangeSource, Coordinator, Error, Pipeline, ReloadNotifier, Settings};

fn main() -> confmirror::Result<()> {
    let settings = Settings::parse();

    let default_level = if settings.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    info!("confmirror configuration watcher");
    info!(
        watch = %settings.watch_path.display(),
        target = %settings.target_path.display(),
        quiet_period = ?settings.process_delay_time,
        "starting"
    );

    // SIGINT/SIGTERM feed the coordinator's shutdown arm; one slot is
    // enough since a single message terminates the loop.
    let (shutdown_tx, shutdown_rx) = bounded::<()>(1);
    ctrlc::set_handler(move || {
        let _ = shutdown_tx.try_send(());
    })
    .map_err(Error::SignalHandler)?;

    let (source, changes) = ChangeSource::subscribe(&settings.watch_path)?;

    let pipeline = Pipeline::new(&settings);
    let notifier = ReloadNotifier::new(settings.prometheus_url.clone());

    Coordinator::new(settings.process_delay_time).run(&changes, &shutdown_rx, || {
        pipeline.run();
        notifier.notify();
    });

    drop(source);
    info!("shut down cleanly");
    Ok(())
}
