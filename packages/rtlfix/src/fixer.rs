use std::time::Instant;

use rtlfix_dom::{BaseDocument, Node, NodeFlags, TreeTraverser};
use rtlfix_traits::settings::{Acknowledgement, ContentMessage, SettingsProvider, StateUpdate};
use rtlfix_traits::site::SiteId;
use serde_json::Value;

use crate::activation::{ActivationPolicy, ActivationState, Transition};
use crate::corrector::revert_fix;
use crate::reactor::{MutationReactor, PollReport};
use crate::scan::scan;
use crate::settings::{SettingsSnapshot, fetch_settings};
use crate::{FixerConfig, SettingsError};

/// Direction correction for one page.
///
/// The fixer is driven from outside: the host feeds it the initial settings, forwards pushed
/// messages, and calls [`DirectionFixer::poll`] whenever the deadline it returned has passed.
/// Until settings have been received the fixer is inactive and never touches the document.
pub struct DirectionFixer {
    config: FixerConfig,
    policy: ActivationPolicy,
    settings: Option<SettingsSnapshot>,
    /// Updates pushed before the first snapshot, folded together
    early_update: StateUpdate,
    reactor: MutationReactor,
    shut_down: bool,
}

impl DirectionFixer {
    pub fn new(config: FixerConfig, site: SiteId) -> Self {
        let reactor = MutationReactor::new(&config);
        Self {
            config,
            policy: ActivationPolicy::new(site),
            settings: None,
            early_update: StateUpdate::default(),
            reactor,
            shut_down: false,
        }
    }

    /// A fixer for the site `doc` was loaded from. The site is captured once and never updated.
    pub fn for_document(config: FixerConfig, doc: &BaseDocument) -> Self {
        Self::new(config, doc.site_id())
    }

    /// Fetch the first snapshot from `provider` with the configured backoff. The result is
    /// meant for [`initialize`](Self::initialize); the document stays free for the host to
    /// mutate while the request is retried.
    pub async fn request_settings<P: SettingsProvider>(
        &self,
        provider: &P,
    ) -> Result<SettingsSnapshot, SettingsError> {
        fetch_settings(provider, &self.config.retry).await
    }

    pub fn config(&self) -> &FixerConfig {
        &self.config
    }

    pub fn site(&self) -> &SiteId {
        self.policy.site()
    }

    pub fn settings(&self) -> Option<&SettingsSnapshot> {
        self.settings.as_ref()
    }

    pub fn activation(&self) -> ActivationState {
        if self.shut_down {
            return ActivationState::Inactive;
        }
        self.policy.evaluate(self.settings.as_ref())
    }

    pub fn is_active(&self) -> bool {
        self.activation().is_active()
    }

    pub fn reactor(&self) -> &MutationReactor {
        &self.reactor
    }

    /// Apply the first settings snapshot, with any updates pushed while it was outstanding
    /// applied on top. A failed retrieval leaves the fixer inactive.
    pub fn initialize(
        &mut self,
        doc: &mut BaseDocument,
        settings: Result<SettingsSnapshot, SettingsError>,
        now: Instant,
    ) -> ActivationState {
        match settings {
            Ok(snapshot) => {
                let early = std::mem::take(&mut self.early_update);
                let snapshot = snapshot.apply(&early).unwrap_or(snapshot);
                self.reconcile(doc, snapshot, now);
            }
            Err(_err) => {
                #[cfg(feature = "tracing")]
                tracing::warn!("settings unavailable, staying inactive: {_err}");
            }
        }
        self.activation()
    }

    /// Handle a pushed message. The acknowledgement only reflects whether the message was
    /// understood.
    ///
    /// Updates received before [`initialize`](Self::initialize) are held back and applied on
    /// top of the first snapshot. Until then the fixer stays inactive.
    pub fn handle_message(&mut self, doc: &mut BaseDocument, message: &Value, now: Instant) -> Acknowledgement {
        let update = match ContentMessage::from_value(message) {
            Ok(ContentMessage::UpdateState(update)) => update,
            Err(_err) => {
                #[cfg(feature = "tracing")]
                tracing::debug!("ignoring unrecognised message: {_err}");
                return Acknowledgement::rejected();
            }
        };
        if self.shut_down {
            return Acknowledgement::accepted();
        }

        let Some(current) = &self.settings else {
            fold_update(&mut self.early_update, update);
            return Acknowledgement::accepted();
        };
        if let Some(next) = current.apply(&update) {
            self.reconcile(doc, next, now);
        }
        Acknowledgement::accepted()
    }

    fn reconcile(&mut self, doc: &mut BaseDocument, next: SettingsSnapshot, now: Instant) {
        if self.shut_down {
            return;
        }
        let transition = self.policy.transition(self.settings.as_ref(), &next);
        self.settings = Some(next);

        match transition {
            Transition::Activated { unexcluded } => {
                #[cfg(feature = "tracing")]
                tracing::info!("direction correction active on {:?}", self.site().as_str());
                // Nothing was observed while inactive, so earlier verdicts may be stale
                if unexcluded {
                    self.revert_all(doc);
                } else {
                    invalidate_all(doc);
                }
                self.activate(doc, now);
            }
            Transition::Deactivated { disabled, excluded } => {
                #[cfg(feature = "tracing")]
                tracing::info!(
                    "direction correction inactive on {:?} (disabled: {disabled}, excluded: {excluded})",
                    self.site().as_str()
                );
                self.reactor.stop(doc);
                let revert = (disabled && self.config.revert_on_disable)
                    || (excluded && self.config.revert_on_exclude);
                if revert {
                    self.revert_all(doc);
                }
            }
            Transition::Unchanged => {}
        }
    }

    fn activate(&mut self, doc: &mut BaseDocument, now: Instant) {
        let activation = self.activation();
        scan(doc, 0, activation);
        self.reactor.start(doc, activation, now);
        if let Some(delay) = self.config.fallback_scan_delay() {
            self.reactor.schedule_fallback_scan(now + delay);
        }
    }

    /// Run the work due at `now` and return when the fixer next needs to be polled.
    pub fn poll(&mut self, doc: &mut BaseDocument, now: Instant) -> Option<Instant> {
        self.poll_with_report(doc, now).1
    }

    /// [`poll`](Self::poll), also reporting what was done.
    pub fn poll_with_report(&mut self, doc: &mut BaseDocument, now: Instant) -> (PollReport, Option<Instant>) {
        if self.shut_down {
            return (PollReport::default(), None);
        }
        let report = self.reactor.poll(doc, self.activation(), now);
        (report, self.reactor.deadline())
    }

    /// Revert every styled element and clear every mark and `CHECKED` flag. Returns the number
    /// of elements whose styling was reverted.
    pub fn revert_all(&mut self, doc: &mut BaseDocument) -> usize {
        let processed: Vec<usize> = TreeTraverser::new(doc)
            .filter(|&id| doc.get_node(id).is_some_and(Node::is_processed))
            .collect();

        let mut reverted = 0;
        for node_id in processed {
            let styled = doc
                .get_node(node_id)
                .and_then(|node| node.mark.as_ref())
                .is_some_and(|mark| mark.is_styled());
            match revert_fix(doc, node_id) {
                Ok(()) => reverted += usize::from(styled),
                Err(_err) => {
                    #[cfg(feature = "tracing")]
                    tracing::warn!("failed to revert node {node_id}: {_err}");
                    if let Some(node) = doc.get_node_mut(node_id) {
                        node.mark = None;
                        node.flags.remove(NodeFlags::CHECKED);
                    }
                }
            }
        }

        #[cfg(feature = "tracing")]
        tracing::debug!("reverted {reverted} elements");

        reverted
    }

    /// The page is going away: stop observing and cancel every timer. The fixer stays inert
    /// afterwards.
    pub fn shutdown(&mut self, doc: &mut BaseDocument) {
        self.reactor.stop(doc);
        self.shut_down = true;
    }
}

fn fold_update(into: &mut StateUpdate, update: StateUpdate) {
    if update.is_enabled.is_some() {
        into.is_enabled = update.is_enabled;
    }
    if update.excluded_sites.is_some() {
        into.excluded_sites = update.excluded_sites;
    }
}

/// Clear every mark and `CHECKED` flag except `Styled` marks.
fn invalidate_all(doc: &mut BaseDocument) {
    let ids: Vec<usize> = TreeTraverser::new(doc).collect();
    for node_id in ids {
        if let Some(node) = doc.get_node_mut(node_id) {
            node.invalidate();
        }
    }
}
