//! Notification kinds and their rendered text

/// Kind label of a regular alert
const ALERT_KIND: &str = "Alert";

/// A message the watcher wants delivered
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    /// One metric crossed its threshold
    Alert {
        name: String,
        metric: String,
        kind: String,
        status: String,
        message: String,
        /// Last 24 hours with the threshold overlaid
        daily_graph_url: Option<String>,
        /// Last 7 days with the threshold overlaid
        weekly_graph_url: Option<String>,
        runbook_link: Option<String>,
        recipient: String,
    },
    /// One metric returned to normal
    Recovery {
        name: String,
        metric: String,
        /// Direction the value has returned to (the inverse of the alarm)
        returned: String,
        threshold: f64,
        recipient: String,
    },
    /// Individual alerts were cut off by the per-cycle budget
    Throttled {
        failures: usize,
        budget: usize,
        recipient: String,
    },
    /// Individual recoveries were cut off by the per-cycle budget
    RecoveryThrottled {
        recoveries: usize,
        budget: usize,
        recipient: String,
    },
    /// Metrics could not be fetched this cycle
    EncounteredErrors { errors: usize, recipient: String },
}

impl Notification {
    pub fn recipient(&self) -> &str {
        match self {
            Notification::Alert { recipient, .. }
            | Notification::Recovery { recipient, .. }
            | Notification::Throttled { recipient, .. }
            | Notification::RecoveryThrottled { recipient, .. }
            | Notification::EncounteredErrors { recipient, .. } => recipient,
        }
    }

    /// Reports about the watcher itself rather than a watched metric.
    ///
    /// These are only mailed when error mail is enabled.
    pub fn is_error_report(&self) -> bool {
        matches!(
            self,
            Notification::RecoveryThrottled { .. } | Notification::EncounteredErrors { .. }
        )
    }

    /// Only the default `Alert` kind is mailed as an alert; every other kind is a notice.
    pub fn subject(&self) -> String {
        match self {
            Notification::Alert { name, kind, .. } => {
                if kind == ALERT_KIND {
                    format!("[ALERT] {}", name)
                } else {
                    format!("[NOTICE] {}", name)
                }
            }
            Notification::Recovery { name, .. } => format!("[RECOVERED] {}", name),
            Notification::Throttled { .. } => "[ALERT] Hound is throttled".to_string(),
            Notification::RecoveryThrottled { .. } => "[ALERT] Hound is recovered".to_string(),
            Notification::EncounteredErrors { .. } => {
                "[ERROR] Hound encountered errors".to_string()
            }
        }
    }

    pub fn body(&self) -> String {
        match self {
            Notification::Alert {
                name,
                metric,
                status,
                message,
                daily_graph_url,
                weekly_graph_url,
                runbook_link,
                ..
            } => {
                let mut body = format!(
                    "{} [{}] has triggered an alert\nStatus:\t{}\nMessage:\t{}\n",
                    name, metric, status, message
                );
                if let (Some(daily), Some(weekly)) = (daily_graph_url, weekly_graph_url) {
                    body.push_str(&format!(
                        "\nDaily Graph: <{}>\nWeekly Graph: <{}>\n",
                        daily, weekly
                    ));
                }
                if let Some(link) = runbook_link.as_deref().filter(|l| !l.is_empty()) {
                    body.push_str(&format!("\nRunbook link:\n{}\n", link));
                }
                body
            }
            Notification::Recovery {
                name,
                metric,
                returned,
                threshold,
                ..
            } => format!(
                "{} [{}] has returned {} {:.6}",
                name, metric, returned, threshold
            ),
            Notification::Throttled {
                failures, budget, ..
            } => format!(
                "{} metrics were not OK.\nHound stopped sending messages after {}.\n\
                 This probably indicates an infrastructure problem (network, graphite, etc)",
                failures, budget
            ),
            Notification::RecoveryThrottled {
                recoveries, budget, ..
            } => format!(
                "{} metrics recovered.\nHound stopped sending individual messages after {}.\n",
                recoveries, budget
            ),
            Notification::EncounteredErrors { errors, .. } => format!(
                "{} metrics had errors. If this is more than a couple, it usually means \
                 that Graphite has fallen behind. It doesn't necessarily mean that there \
                 are problems with the services, but it means that Hound is temporarily \
                 blind wrt these metrics.",
                errors
            ),
        }
    }
}
