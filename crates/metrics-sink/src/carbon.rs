//! Carbon plaintext protocol sink

use crate::{CycleReport, MetricsSink};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tracing::debug;

/// Render a report as Carbon plaintext lines (`<path> <value> <timestamp>`)
pub fn render_plaintext(prefix: &str, report: &CycleReport) -> String {
    let ts = report.timestamp.timestamp();
    [
        ("alerts_sent", report.alerts_sent),
        ("recoveries_sent", report.recoveries_sent),
        ("failures", report.failures),
        ("errors", report.errors),
        ("successes", report.successes),
        ("global_backoff", report.global_backoff),
    ]
    .iter()
    .map(|(name, value)| format!("{}{} {} {}\n", prefix, name, value, ts))
    .collect()
}

/// Sink writing to a Carbon line receiver over TCP
#[derive(Debug, Clone)]
pub struct CarbonSink {
    /// Receiver address (e.g., "carbon.local:2003")
    address: String,
    /// Prefix prepended to every metric path
    prefix: String,
    /// Bound on connect plus write
    timeout: Duration,
}

impl CarbonSink {
    pub fn new(address: &str, prefix: &str, timeout: Duration) -> Self {
        Self {
            address: address.to_string(),
            prefix: prefix.to_string(),
            timeout,
        }
    }
}

impl MetricsSink for CarbonSink {
    fn publish(&self, report: &CycleReport) {
        let payload = render_plaintext(&self.prefix, report);
        let address = self.address.clone();
        let timeout = self.timeout;

        tokio::spawn(async move {
            let send = async {
                let mut stream = TcpStream::connect(&address).await?;
                stream.write_all(payload.as_bytes()).await?;
                stream.shutdown().await
            };
            match tokio::time::timeout(timeout, send).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => debug!("carbon export to {} skipped: {}", address, e),
                Err(_) => debug!("carbon export to {} timed out", address),
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono::Utc;
    use tokio::io::AsyncReadExt;
    use tokio::net::TcpListener;

    fn report() -> CycleReport {
        CycleReport {
            alerts_sent: 2,
            recoveries_sent: 1,
            failures: 3,
            errors: 0,
            successes: 7,
            global_backoff: 0,
            global_throttle: 10,
            timestamp: Utc.timestamp_opt(1_500_000_000, 0).unwrap(),
        }
    }

    #[test]
    fn test_render_plaintext() {
        let text = render_plaintext("hound.", &report());
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 6);
        assert_eq!(lines[0], "hound.alerts_sent 2 1500000000");
        assert_eq!(lines[4], "hound.successes 7 1500000000");
        assert_eq!(lines[5], "hound.global_backoff 0 1500000000");
    }

    #[tokio::test]
    async fn test_publish_over_tcp() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap().to_string();

        let sink = CarbonSink::new(&address, "hound.", Duration::from_secs(5));
        sink.publish(&report());

        let (mut socket, _) = listener.accept().await.unwrap();
        let mut received = String::new();
        socket.read_to_string(&mut received).await.unwrap();
        assert_eq!(received, render_plaintext("hound.", &report()));
    }

    #[tokio::test]
    async fn test_unreachable_carbon_is_silent() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap().to_string();
        drop(listener);

        let sink = CarbonSink::new(&address, "hound.", Duration::from_millis(200));
        sink.publish(&report());
        tokio::time::sleep(Duration::from_millis(300)).await;
    }
}
