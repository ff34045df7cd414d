//! The default command: print state, connect pairs, optionally keep running.

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use seqlink_core::{Connector, ConnectorConfig, Sequencer};

use crate::cli::{ConnectArgs, GlobalOpts};
use crate::config;
use crate::error::CliError;
use crate::output;

/// Resolve config and pairs, then open the sequencer and run a session.
///
/// Pairs are loaded before the sequencer is opened so a bad pairs file
/// fails fast.
#[cfg_attr(not(feature = "alsa"), allow(clippy::unused_async))]
pub async fn handle(args: &ConnectArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let config = config::resolve(args, global)?;
    if config.pairs.is_empty() && !args.info {
        return Err(CliError::NoPairs);
    }
    debug!(pairs = config.pairs.len(), client = %config.client_name, "configuration resolved");

    #[cfg(feature = "alsa")]
    {
        let seq = seqlink_api::alsa::AlsaSequencer::open(&config.client_name)
            .map_err(seqlink_core::CoreError::from)?;
        session(seq, &config, args, global).await
    }

    #[cfg(not(feature = "alsa"))]
    {
        Err(seqlink_core::CoreError::from(seqlink_api::Error::BackendUnavailable("alsa")).into())
    }
}

/// Everything after the sequencer is open.
#[cfg_attr(not(feature = "alsa"), allow(dead_code))]
async fn session<S: Sequencer>(
    seq: S,
    config: &ConnectorConfig,
    args: &ConnectArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let mut connector = Connector::with_config(seq, config)?;

    if args.info {
        let rendered = output::render_state(global.output, &connector.describe())?;
        output::print_output(&rendered);
    }

    if connector.pairs().is_empty() {
        connector.close();
        return Ok(());
    }

    let report = connector.reconcile_once();
    debug!(
        requested = report.requested(),
        connected = report.connected(),
        "initial pass done"
    );

    if args.run {
        let events = match connector.listen(&config.listener_port) {
            Ok(events) => events,
            Err(e) => {
                connector.close();
                return Err(e.into());
            }
        };

        let cancel = CancellationToken::new();
        let on_signal = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                on_signal.cancel();
            }
        });

        let stats = match connector.run(events, cancel).await {
            Ok(stats) => stats,
            Err(e) => {
                connector.close();
                return Err(e.into());
            }
        };
        info!(
            events = stats.events,
            passes = stats.passes,
            connected = stats.connected,
            "stopped"
        );
    }

    connector.close();
    Ok(())
}
