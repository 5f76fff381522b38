use std::{fmt, str::FromStr, sync::Arc};

use {
    serde::{Deserialize, Serialize},
    tracing::{debug, info, warn},
};

use crate::{
    error::{Error, Result},
    queue::PendingQueue,
    sink::DeliverySink,
    unit::DeliveryUnit,
};

/// How relayed messages reach the sink. One deployment runs exactly one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelayMode {
    /// Send every unit as soon as its event is translated.
    #[default]
    Immediate,
    /// Append units to the pending queue; a flush trigger sends them.
    Queued,
    /// Re-read channel history on an interval and send what is new.
    Poll,
}

impl RelayMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Immediate => "immediate",
            Self::Queued => "queued",
            Self::Poll => "poll",
        }
    }
}

impl fmt::Display for RelayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RelayMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "immediate" | "direct" => Ok(Self::Immediate),
            "queued" | "queue" | "batch" | "batched" => Ok(Self::Queued),
            "poll" | "polling" => Ok(Self::Poll),
            other => Err(Error::unavailable(format!("unknown relay mode: {other}"))),
        }
    }
}

/// Per-call tally of what happened to a batch of units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchOutcome {
    pub sent: usize,
    pub failed: usize,
    pub queued: usize,
}

impl DispatchOutcome {
    pub fn attempted(&self) -> usize {
        self.sent + self.failed
    }
}

/// Send units one after another, logging and counting failures.
///
/// A failed unit never stops the ones after it.
pub async fn send_all(sink: &dyn DeliverySink, units: &[DeliveryUnit]) -> DispatchOutcome {
    let mut outcome = DispatchOutcome::default();
    for (index, unit) in units.iter().enumerate() {
        match sink.deliver(unit).await {
            Ok(()) => {
                debug!(index, kind = unit.kind(), "unit delivered");
                outcome.sent += 1;
            },
            Err(e) => {
                warn!(index, kind = unit.kind(), error = %e, "failed to deliver unit");
                outcome.failed += 1;
            },
        }
    }
    outcome
}

/// Decides, per translated event, whether units go straight to the sink or
/// wait in the pending queue.
pub enum DispatchPolicy {
    Immediate { sink: Arc<dyn DeliverySink> },
    Queued { queue: Arc<PendingQueue> },
}

impl DispatchPolicy {
    pub fn immediate(sink: Arc<dyn DeliverySink>) -> Self {
        Self::Immediate { sink }
    }

    pub fn queued(queue: Arc<PendingQueue>) -> Self {
        Self::Queued { queue }
    }

    pub fn mode(&self) -> RelayMode {
        match self {
            Self::Immediate { .. } => RelayMode::Immediate,
            Self::Queued { .. } => RelayMode::Queued,
        }
    }

    pub async fn dispatch(&self, units: Vec<DeliveryUnit>) -> DispatchOutcome {
        match self {
            Self::Immediate { sink } => {
                let outcome = send_all(sink.as_ref(), &units).await;
                info!(
                    sent = outcome.sent,
                    failed = outcome.failed,
                    "relayed message"
                );
                outcome
            },
            Self::Queued { queue } => {
                let queued = units.len();
                let pending = queue.append(units).await;
                debug!(queued, pending, "queued units for next flush");
                DispatchOutcome {
                    queued,
                    ..DispatchOutcome::default()
                }
            },
        }
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, rstest::rstest};

    use crate::testing::{RecordingSink, Sent};

    #[rstest]
    #[case("immediate", RelayMode::Immediate)]
    #[case("Queued", RelayMode::Queued)]
    #[case(" batch ", RelayMode::Queued)]
    #[case("poll", RelayMode::Poll)]
    fn parse_mode(#[case] input: &str, #[case] expected: RelayMode) {
        assert_eq!(input.parse::<RelayMode>().unwrap(), expected);
    }

    #[test]
    fn parse_unknown_mode_fails() {
        assert!("sometimes".parse::<RelayMode>().is_err());
    }

    #[test]
    fn mode_serde_uses_snake_case() {
        assert_eq!(
            serde_json::to_string(&RelayMode::Queued).unwrap(),
            "\"queued\""
        );
        let mode: RelayMode = serde_json::from_str("\"poll\"").unwrap();
        assert_eq!(mode, RelayMode::Poll);
    }

    #[tokio::test]
    async fn immediate_failure_does_not_block_later_units() {
        let sink = Arc::new(RecordingSink::failing_on("second"));
        let policy = DispatchPolicy::immediate(sink.clone());

        let outcome = policy
            .dispatch(vec![
                DeliveryUnit::text("first"),
                DeliveryUnit::text("second"),
                DeliveryUnit::text("third"),
            ])
            .await;

        assert_eq!(outcome, DispatchOutcome {
            sent: 2,
            failed: 1,
            queued: 0,
        });
        assert_eq!(sink.sent(), vec![
            Sent::Text("first".into()),
            Sent::Text("second".into()),
            Sent::Text("third".into()),
        ]);
    }

    #[tokio::test]
    async fn queued_mode_makes_no_sink_calls() {
        let queue = Arc::new(PendingQueue::new());
        let policy = DispatchPolicy::queued(Arc::clone(&queue));

        let outcome = policy
            .dispatch(vec![DeliveryUnit::text("a"), DeliveryUnit::text("b")])
            .await;

        assert_eq!(outcome.queued, 2);
        assert_eq!(outcome.attempted(), 0);
        assert_eq!(queue.len().await, 2);
        assert_eq!(policy.mode(), RelayMode::Queued);
    }
}
