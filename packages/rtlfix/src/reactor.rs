//! Mutation-driven correction.
//!
//! While running, the reactor observes the `<body>` subtree for insertions, removals and text
//! changes, collects the records through a [`Debouncer`] and walks only the changed regions
//! once a batch is due. It also owns the fallback scan timer, so stopping the reactor cancels
//! every pending piece of work.

use std::time::{Duration, Instant};

use rtlfix_dom::{BaseDocument, MutationRecord, ObserverId, ObserverOptions};

use crate::FixerConfig;
use crate::activation::ActivationState;
use crate::debounce::Debouncer;
use crate::scan::scan;
use crate::walker::{WalkStats, check_and_fix, invalidate};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReactorState {
    Stopped,
    /// `<body>` did not exist yet. Another attempt is made at `retry_at`.
    WaitingForBody { attempts: u32, retry_at: Instant },
    Running { observer: ObserverId, root: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    Started,
    AlreadyRunning,
    Inactive,
    WaitingForBody,
}

/// What a call to [`MutationReactor::poll`] did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollReport {
    /// The observer was attached to a `<body>` that appeared late, and the document scanned
    pub late_scan: Option<WalkStats>,
    /// Attaching was abandoned because `<body>` never appeared
    pub gave_up: bool,
    /// A debounced batch was processed
    pub batch: Option<WalkStats>,
    /// The fallback scan ran
    pub fallback_scan: Option<WalkStats>,
}

impl PollReport {
    pub fn did_work(&self) -> bool {
        self.late_scan.is_some() || self.batch.is_some() || self.fallback_scan.is_some()
    }
}

pub struct MutationReactor {
    state: ReactorState,
    debouncer: Debouncer<MutationRecord>,
    fallback_scan_at: Option<Instant>,
    body_retry_interval: Duration,
    body_retry_limit: u32,
}

impl MutationReactor {
    pub fn new(config: &FixerConfig) -> Self {
        Self {
            state: ReactorState::Stopped,
            debouncer: Debouncer::new(config.debounce(), config.max_batch_delay()),
            fallback_scan_at: None,
            body_retry_interval: config.body_retry_interval(),
            body_retry_limit: config.body_retry_limit,
        }
    }

    pub fn state(&self) -> ReactorState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, ReactorState::Running { .. })
    }

    pub fn fallback_scan_at(&self) -> Option<Instant> {
        self.fallback_scan_at
    }

    /// Subscribe to mutations of `<body>`. If there is no body yet, attaching is retried from
    /// [`Self::poll`] a bounded number of times.
    pub fn start(&mut self, doc: &mut BaseDocument, activation: ActivationState, now: Instant) -> StartOutcome {
        if !activation.is_active() {
            return StartOutcome::Inactive;
        }
        match self.state {
            ReactorState::Running { .. } => return StartOutcome::AlreadyRunning,
            ReactorState::WaitingForBody { .. } => return StartOutcome::WaitingForBody,
            ReactorState::Stopped => {}
        }

        if self.try_attach(doc) {
            StartOutcome::Started
        } else {
            #[cfg(feature = "tracing")]
            tracing::debug!("no <body> yet; retrying in {:?}", self.body_retry_interval);
            self.state = ReactorState::WaitingForBody {
                attempts: 0,
                retry_at: now + self.body_retry_interval,
            };
            StartOutcome::WaitingForBody
        }
    }

    fn try_attach(&mut self, doc: &mut BaseDocument) -> bool {
        let Some(body) = doc.body_id() else {
            return false;
        };
        let observer = doc.observe(body, ObserverOptions::content_changes());
        self.state = ReactorState::Running { observer, root: body };

        #[cfg(feature = "tracing")]
        tracing::debug!("observing mutations of node {body}");

        true
    }

    pub fn schedule_fallback_scan(&mut self, at: Instant) {
        self.fallback_scan_at = Some(at);
    }

    /// Unsubscribe and cancel the pending batch and fallback scan. Returns whether anything
    /// was running or pending.
    pub fn stop(&mut self, doc: &mut BaseDocument) -> bool {
        let was_stopped = self.state == ReactorState::Stopped && self.fallback_scan_at.is_none();
        if let ReactorState::Running { observer, .. } = self.state {
            doc.disconnect(observer);
        }
        let _dropped = self.debouncer.cancel();
        self.fallback_scan_at = None;
        self.state = ReactorState::Stopped;

        #[cfg(feature = "tracing")]
        if !was_stopped {
            tracing::debug!("mutation reactor stopped, {_dropped} pending records dropped");
        }

        !was_stopped
    }

    /// The next instant at which [`Self::poll`] has work to do.
    pub fn deadline(&self) -> Option<Instant> {
        let retry_at = match self.state {
            ReactorState::WaitingForBody { retry_at, .. } => Some(retry_at),
            _ => None,
        };
        [retry_at, self.debouncer.deadline(), self.fallback_scan_at]
            .into_iter()
            .flatten()
            .min()
    }

    /// Drain observed records and run whatever work is due at `now`.
    pub fn poll(&mut self, doc: &mut BaseDocument, activation: ActivationState, now: Instant) -> PollReport {
        let mut report = PollReport::default();
        if !activation.is_active() {
            return report;
        }

        if let ReactorState::WaitingForBody { attempts, retry_at } = self.state {
            if retry_at <= now {
                if self.try_attach(doc) {
                    report.late_scan = Some(scan(doc, 0, activation));
                } else if attempts + 1 >= self.body_retry_limit {
                    #[cfg(feature = "tracing")]
                    tracing::warn!("no <body> after {} attempts; not observing mutations", attempts + 1);
                    self.state = ReactorState::Stopped;
                    report.gave_up = true;
                } else {
                    self.state = ReactorState::WaitingForBody {
                        attempts: attempts + 1,
                        retry_at: now + self.body_retry_interval,
                    };
                }
            }
        }

        if let ReactorState::Running { observer, .. } = self.state {
            let records = doc.take_records(observer);
            self.debouncer.push(records, now);
            if let Some(batch) = self.debouncer.take_due(now) {
                report.batch = Some(process_batch(doc, batch));
            }
        }

        if self.fallback_scan_at.is_some_and(|at| at <= now) {
            self.fallback_scan_at = None;
            report.fallback_scan = Some(scan(doc, 0, activation));
        }

        report
    }
}

/// Walk the regions touched by a batch of records, in delivery order.
pub fn process_batch(doc: &mut BaseDocument, batch: Vec<MutationRecord>) -> WalkStats {
    let mut stats = WalkStats::default();
    let _records = batch.len();

    for record in batch {
        match record {
            MutationRecord::ChildList {
                target,
                added_nodes,
                removed_nodes,
            } => {
                // Losing a text child changes the target's text as much as gaining one
                let lost_text = removed_nodes
                    .iter()
                    .any(|&id| doc.get_node(id).is_some_and(|node| node.is_text_node()));
                if lost_text {
                    invalidate(doc, target);
                    stats.merge(check_and_fix(doc, target));
                }
                for node_id in added_nodes {
                    stats.merge(check_and_fix(doc, node_id));
                }
            }
            MutationRecord::CharacterData { target, .. } => {
                stats.merge(check_and_fix(doc, target));
            }
            MutationRecord::Attributes { .. } => {}
        }
    }

    #[cfg(feature = "tracing")]
    tracing::debug!(
        "processed batch of {_records} records: {} visited, {} styled, {} failed",
        stats.visited,
        stats.styled,
        stats.failed
    );

    stats
}
