use crate::command::CommandStrategy;
use pokemate_config::Config;
use pokemate_core::{Dispatcher, DispatcherConfig, Event, LatencyMonitor};
use pokemate_gateway::{Gateway, RestClient};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::info;

/// Events queued ahead of the dispatcher before producers block.
const EVENT_QUEUE_DEPTH: usize = 256;

/// Input for the run command.
pub struct RunInput {
    /// Optional bot token (overrides config)
    pub token: Option<String>,
    /// Optional health endpoint port (overrides config)
    pub port: Option<u16>,
}

/// Strategy for running the companion.
pub struct RunStrategy;

impl CommandStrategy for RunStrategy {
    type Input = RunInput;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let config = Config::load()?;
        info!("Loaded config from ~/pokemate/config.json");

        // Get token from input or config
        let token = if let Some(t) = input.token {
            t
        } else if !config.discord.token.is_empty() {
            config.discord.token.clone()
        } else {
            anyhow::bail!("Discord bot token not configured. Set \"discord.token\" in config");
        };

        let port = input.port.unwrap_or(config.health.port);
        tokio::spawn(crate::health::serve(port));

        // Verify the token against the REST API before opening the
        // gateway, retrying until the network cooperates.
        let rest = RestClient::new(token.clone());
        rest.test_connection().await;

        let latency = LatencyMonitor::default();
        let (events, receiver) = mpsc::channel(EVENT_QUEUE_DEPTH);

        let gateway = Gateway::new(token, rest.clone(), events.clone(), latency.clone());
        tokio::spawn(gateway.run());

        spawn_ticker(
            events.clone(),
            Duration::from_secs(config.watcher.spawn_sweep_secs),
            Event::SpawnSweep,
        );
        spawn_ticker(
            events,
            Duration::from_secs(config.watcher.reminder_sweep_secs),
            Event::ReminderSweep,
        );

        let dispatcher = Dispatcher::new(
            DispatcherConfig {
                prefix: config.discord.prefix.clone(),
                automation_ids: config.discord.automation_ids.clone(),
                admin_roles: config.discord.admin_roles.clone(),
                spawn_ttl_secs: config.watcher.spawn_ttl_secs,
            },
            rest,
            latency,
        );

        info!("Companion is running. Press Ctrl+C to stop.");
        tokio::select! {
            () = dispatcher.run(receiver) => {}
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown signal received");
            }
        }

        Ok(())
    }
}

/// Feed a periodic maintenance event into the queue. The first tick of
/// an interval completes immediately, so it is consumed up front.
fn spawn_ticker(events: mpsc::Sender<Event>, period: Duration, event: Event) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.tick().await;
        loop {
            ticker.tick().await;
            if events.send(event.clone()).await.is_err() {
                return;
            }
        }
    });
}
