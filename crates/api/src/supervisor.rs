//! Collection lifecycle
//!
//! Owns the running evaluation loop, swaps it out on SIGHUP and stops it
//! on shutdown. A reload builds the new collection before the old one is
//! stopped, so a broken settings or alerts file leaves the old loop running.

use crate::settings::{load_alert_definitions, Settings, SettingsError};
use alerting::{Alert, AlertsCollection, CollectionConfig, StatusBoard};
use metric_source::{GraphiteFetcher, MetricFetcher};
use metrics_sink::{CarbonSink, MetricsSink, NullSink};
use notifier::{LogNotifier, Notifier, SmtpConfig, SmtpNotifier};
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Everything needed to start one generation of the evaluation loop
pub struct CollectionPlan {
    pub config: CollectionConfig,
    pub alerts: Vec<Alert>,
    pub notifier: Arc<dyn Notifier>,
    pub sink: Arc<dyn MetricsSink>,
}

impl CollectionPlan {
    /// Build collaborators and alerts from settings, reading the alerts file
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let fetcher: Arc<dyn MetricFetcher> = Arc::new(GraphiteFetcher::new(
            &settings.graphite.base_url,
            &settings.graphite.window,
            settings.fetch_timeout(),
        )?);

        let notifier: Arc<dyn Notifier> = match &settings.smtp.server {
            Some(server) => Arc::new(SmtpNotifier::new(SmtpConfig {
                server: server.clone(),
                port: settings.smtp.port,
                user: settings.smtp.user.clone(),
                password: settings.smtp.password.clone(),
                from: settings.smtp.from.clone(),
                email_on_error: settings.smtp.email_on_error,
            })?),
            None => {
                warn!("No SMTP server configured, notifications are only logged");
                Arc::new(LogNotifier)
            }
        };

        let sink: Arc<dyn MetricsSink> = match &settings.carbon.address {
            Some(address) => Arc::new(CarbonSink::new(
                address,
                &settings.carbon.metric_prefix,
                Duration::from_secs(settings.carbon.timeout_secs),
            )),
            None => Arc::new(NullSink),
        };

        let definitions = load_alert_definitions(&settings.alerts_file, &settings.email_to)?;
        let alerts = definitions
            .into_iter()
            .map(|definition| {
                let name = definition.name.clone();
                Alert::new(definition, fetcher.clone())
                    .map_err(|source| SettingsError::InvalidAlert { name, source })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            config: CollectionConfig {
                global_throttle: settings.global_throttle,
                recipient: settings.email_to.clone(),
                check_interval: settings.check_interval(),
                fetch_timeout: settings.fetch_timeout(),
                graphite_base: Some(settings.graphite.base_url.clone()),
            },
            alerts,
            notifier,
            sink,
        })
    }

    pub fn into_collection(self, board: StatusBoard) -> AlertsCollection {
        let mut collection = AlertsCollection::new(self.config, self.notifier, self.sink, board);
        for alert in self.alerts {
            collection.add_alert(alert);
        }
        collection
    }
}

struct Generation {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

/// Runs at most one collection at a time and publishes to a shared board
pub struct Supervisor {
    board: StatusBoard,
    running: Option<Generation>,
}

impl Supervisor {
    pub fn new(board: StatusBoard) -> Self {
        Self {
            board,
            running: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    /// Spawn the evaluation loop for `plan`, stopping any loop still running
    pub async fn start(&mut self, plan: CollectionPlan) {
        self.stop().await;
        let mut collection = plan.into_collection(self.board.clone());
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let handle = tokio::spawn(async move {
            collection.run(token).await;
        });
        self.running = Some(Generation { cancel, handle });
    }

    /// Cancel the running loop and wait for its current cycle to finish
    pub async fn stop(&mut self) {
        if let Some(generation) = self.running.take() {
            generation.cancel.cancel();
            if let Err(e) = generation.handle.await {
                error!("Evaluation loop ended abnormally: {}", e);
            }
        }
    }

    /// Stop the running loop and start `plan` in its place
    pub async fn replace(&mut self, plan: CollectionPlan) {
        self.stop().await;
        self.board.clear();
        self.start(plan).await;
    }

    /// Re-read settings and alerts; on any error the running loop is kept
    pub async fn reload(&mut self, config_path: &str) -> bool {
        let plan = Settings::from_file(config_path)
            .map_err(anyhow::Error::from)
            .and_then(|settings| CollectionPlan::from_settings(&settings));

        match plan {
            Ok(plan) => {
                info!("Reloading with {} alerts", plan.alerts.len());
                self.replace(plan).await;
                true
            }
            Err(e) => {
                error!("Reload failed, keeping current alerts: {:#}", e);
                false
            }
        }
    }

    /// Serve signals until shutdown: SIGHUP reloads, Ctrl-C or SIGTERM returns
    pub async fn supervise(&mut self, config_path: &str) {
        #[cfg(unix)]
        let mut hangup = match signal::unix::signal(signal::unix::SignalKind::hangup()) {
            Ok(s) => Some(s),
            Err(e) => {
                error!(error = %e, "Failed to install SIGHUP handler, reload disabled");
                None
            }
        };

        let shutdown = shutdown_signal();
        tokio::pin!(shutdown);

        loop {
            #[cfg(unix)]
            let hup = async {
                match hangup.as_mut() {
                    Some(s) => {
                        s.recv().await;
                    }
                    None => std::future::pending::<()>().await,
                }
            };

            #[cfg(not(unix))]
            let hup = std::future::pending::<()>();

            tokio::select! {
                () = &mut shutdown => break,
                () = hup => {
                    info!("SIGHUP received, reloading {}", config_path);
                    self.reload(config_path).await;
                }
            }
        }

        info!("Shutdown signal received");
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut s) => {
                s.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
