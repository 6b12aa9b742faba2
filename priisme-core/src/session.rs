//! Client-side analysis flow.
//!
//! A [`StyleSession`] owns what the style page shows: the photo intake, the
//! active result and the saved history. Authentication is passed in as an
//! [`AuthContext`]; the proxy and the history store are trait objects.
//!
//! Saving a finished analysis runs as a spawned task. Its failure is logged
//! and never reaches the user. Saves that have finished are collected at the
//! next `submit` or `load_history`, and a successful one refreshes the
//! history; [`StyleSession::finish_pending_saves`] waits for the rest.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::auth::AuthContext;
use crate::intake::{PhotoIntake, SelectedFile};
use crate::models::{NewAnalysisRecord, StoredAnalysis, StyleAnalysis};
use crate::proxy_client::AnalysisProxy;
use crate::store::AnalysisStore;

/// Records fetched when the history is loaded.
pub const HISTORY_FETCH_LIMIT: i64 = 5;

/// Records offered in the "previous analyses" listing.
pub const HISTORY_DISPLAY_LIMIT: usize = 3;

const FAILURE_FALLBACK: &str = "Please try again with a different photo.";

// ============================================================================
// Analyzing flag
// ============================================================================

/// Shared "an analysis is in flight" flag.
#[derive(Debug, Clone, Default)]
pub struct AnalyzingFlag(Arc<AtomicBool>);

impl AnalyzingFlag {
    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Raise the flag until the returned guard is dropped.
    pub fn begin(&self) -> AnalyzingGuard {
        self.0.store(true, Ordering::SeqCst);
        AnalyzingGuard(Arc::clone(&self.0))
    }
}

/// Clears the analyzing flag on drop, whatever way the call settled.
#[derive(Debug)]
pub struct AnalyzingGuard(Arc<AtomicBool>);

impl Drop for AnalyzingGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

// ============================================================================
// Notices and outcomes
// ============================================================================

/// User-facing notification raised by the flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    SignInRequired,
    AnalysisComplete,
    AnalysisFailed { message: String },
}

impl Notice {
    pub fn title(&self) -> &str {
        match self {
            Notice::SignInRequired => "Sign in required",
            Notice::AnalysisComplete => "Analysis Complete!",
            Notice::AnalysisFailed { .. } => "Analysis Failed",
        }
    }

    pub fn description(&self) -> &str {
        match self {
            Notice::SignInRequired => "Please sign in to use AI Style Analysis",
            Notice::AnalysisComplete => "Your personalized style profile is ready.",
            Notice::AnalysisFailed { message } => message,
        }
    }

    pub fn is_destructive(&self) -> bool {
        !matches!(self, Notice::AnalysisComplete)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// No signed-in user: nothing was sent; the client should go to `redirect`.
    SignInRequired {
        notice: Notice,
        redirect: &'static str,
    },
    Completed {
        notice: Notice,
    },
    Failed {
        notice: Notice,
    },
}

impl SubmitOutcome {
    pub fn notice(&self) -> &Notice {
        match self {
            SubmitOutcome::SignInRequired { notice, .. }
            | SubmitOutcome::Completed { notice }
            | SubmitOutcome::Failed { notice } => notice,
        }
    }
}

// ============================================================================
// StyleSession
// ============================================================================

pub struct StyleSession {
    auth: AuthContext,
    proxy: Arc<dyn AnalysisProxy>,
    store: Arc<dyn AnalysisStore>,
    analyzing: AnalyzingFlag,
    intake: PhotoIntake,
    active: Option<StyleAnalysis>,
    history: Vec<StoredAnalysis>,
    pending_saves: Vec<JoinHandle<Option<StoredAnalysis>>>,
}

impl StyleSession {
    pub fn new(
        auth: AuthContext,
        proxy: Arc<dyn AnalysisProxy>,
        store: Arc<dyn AnalysisStore>,
    ) -> Self {
        let analyzing = AnalyzingFlag::default();
        Self {
            auth,
            proxy,
            store,
            intake: PhotoIntake::new(analyzing.clone()),
            analyzing,
            active: None,
            history: Vec::new(),
            pending_saves: Vec::new(),
        }
    }

    pub fn auth(&self) -> &AuthContext {
        &self.auth
    }

    pub fn is_analyzing(&self) -> bool {
        self.analyzing.is_set()
    }

    pub fn analyzing_flag(&self) -> AnalyzingFlag {
        self.analyzing.clone()
    }

    pub fn intake(&self) -> &PhotoIntake {
        &self.intake
    }

    pub fn intake_mut(&mut self) -> &mut PhotoIntake {
        &mut self.intake
    }

    pub fn active_result(&self) -> Option<&StyleAnalysis> {
        self.active.as_ref()
    }

    /// Everything fetched by the last history load, newest first.
    pub fn history(&self) -> &[StoredAnalysis] {
        &self.history
    }

    /// The entries offered for selection.
    pub fn history_listing(&self) -> &[StoredAnalysis] {
        &self.history[..self.history.len().min(HISTORY_DISPLAY_LIMIT)]
    }

    /// Fetch the most recent saved analyses. With no active result, the
    /// newest one becomes the active result.
    pub async fn load_history(&mut self) {
        self.collect_finished_saves().await;

        let Some(user) = self.auth.user() else {
            return;
        };

        match self.store.recent(user.id, HISTORY_FETCH_LIMIT).await {
            Ok(records) => {
                tracing::debug!(count = records.len(), "Loaded previous analyses");
                self.history = records;
                if self.active.is_none() {
                    self.active = self.history.first().map(StoredAnalysis::analysis);
                }
            }
            Err(e) => tracing::warn!(error = %e, "Failed to load previous analyses"),
        }
    }

    /// Run an intake selection and, if the file was accepted, analyze it.
    pub async fn submit_file(&mut self, file: SelectedFile) -> Option<SubmitOutcome> {
        let encoded = self.intake.select_file(file)?;
        Some(self.submit(encoded).await)
    }

    /// Send an encoded image to the proxy and make the reply the active result.
    pub async fn submit(&mut self, image: String) -> SubmitOutcome {
        let Some(user_id) = self.auth.user().map(|u| u.id) else {
            tracing::info!("Analysis requested without a signed-in user");
            return SubmitOutcome::SignInRequired {
                notice: Notice::SignInRequired,
                redirect: AuthContext::SIGN_IN_PATH,
            };
        };

        if self.collect_finished_saves().await > 0 {
            self.load_history().await;
        }

        let _analyzing = self.analyzing.begin();
        self.active = None;

        let payload = match self.proxy.analyze(&image).await {
            Ok(payload) => payload,
            Err(e) => {
                tracing::error!(error = %e, "Analysis error");
                let message = e.to_string();
                let message = if message.trim().is_empty() {
                    FAILURE_FALLBACK.to_string()
                } else {
                    message
                };
                return SubmitOutcome::Failed {
                    notice: Notice::AnalysisFailed { message },
                };
            }
        };

        let analysis = StyleAnalysis::from_value(&payload);
        for issue in analysis.vocabulary_issues() {
            tracing::debug!(%issue, "Analysis outside the documented vocabulary");
        }

        self.spawn_save(NewAnalysisRecord::from_analysis(user_id, &analysis));
        self.active = Some(analysis);

        SubmitOutcome::Completed {
            notice: Notice::AnalysisComplete,
        }
    }

    fn spawn_save(&mut self, record: NewAnalysisRecord) {
        let store = Arc::clone(&self.store);
        self.pending_saves.push(tokio::spawn(async move {
            match store.insert(record).await {
                Ok(stored) => Some(stored),
                Err(e) => {
                    tracing::error!(error = %e, "Failed to save analysis");
                    None
                }
            }
        }));
    }

    /// Wait for outstanding saves; reload the history if any succeeded.
    /// Returns how many saves succeeded.
    pub async fn finish_pending_saves(&mut self) -> usize {
        let saved = settle_saves(std::mem::take(&mut self.pending_saves)).await;
        if saved > 0 {
            self.load_history().await;
        }
        saved
    }

    /// Saves spawned but not yet collected, finished or not.
    pub fn pending_save_count(&self) -> usize {
        self.pending_saves.len()
    }

    /// Saves still running.
    pub fn saves_in_flight(&self) -> usize {
        self.pending_saves.iter().filter(|h| !h.is_finished()).count()
    }

    /// Drop the handles of saves that already finished. Returns how many of
    /// them succeeded; running saves are left alone.
    async fn collect_finished_saves(&mut self) -> usize {
        let (finished, running): (Vec<_>, Vec<_>) = std::mem::take(&mut self.pending_saves)
            .into_iter()
            .partition(JoinHandle::is_finished);
        self.pending_saves = running;
        settle_saves(finished).await
    }

    /// Back to the upload state. Saved history is kept.
    pub fn start_new_analysis(&mut self) {
        self.active = None;
    }

    /// Show a saved analysis without contacting the proxy. Returns false when
    /// `index` is outside the fetched history.
    pub fn select_history(&mut self, index: usize) -> bool {
        match self.history.get(index) {
            Some(record) => {
                self.active = Some(record.analysis());
                true
            }
            None => false,
        }
    }
}

async fn settle_saves(handles: Vec<JoinHandle<Option<StoredAnalysis>>>) -> usize {
    let mut saved = 0;
    for handle in handles {
        match handle.await {
            Ok(Some(_)) => saved += 1,
            Ok(None) => {}
            Err(e) => tracing::error!(error = %e, "Save task did not complete"),
        }
    }
    saved
}
