use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, error, info, warn};

use jobhawk_core::types::{ApiError, Credential, CredentialRefresher, JobApi, Notifier};
use jobhawk_store::ledger::effective_count;
use jobhawk_store::{CredentialStore, PreferenceStore, SubmissionLedger};

use crate::error::Result;

/// Orchestrates one sweep across all known users.
///
/// Wiring is all `Arc`s: the stores are shared with the front end, and the
/// remote API / refresher / notifier come in behind their traits so tests
/// can substitute them.
pub struct ApplicationEngine {
    credentials: Arc<CredentialStore>,
    prefs: Arc<PreferenceStore>,
    ledger: Arc<SubmissionLedger>,
    api: Arc<dyn JobApi>,
    refresher: Arc<dyn CredentialRefresher>,
    notifier: Arc<dyn Notifier>,
    /// Throttle after every apply attempt, successful or not.
    apply_pause: Duration,
}

impl ApplicationEngine {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        credentials: Arc<CredentialStore>,
        prefs: Arc<PreferenceStore>,
        ledger: Arc<SubmissionLedger>,
        api: Arc<dyn JobApi>,
        refresher: Arc<dyn CredentialRefresher>,
        notifier: Arc<dyn Notifier>,
        apply_pause: Duration,
    ) -> Self {
        Self {
            credentials,
            prefs,
            ledger,
            api,
            refresher,
            notifier,
            apply_pause,
        }
    }

    /// One sweep over every stored credential. Per-user failures are
    /// logged and isolated; this never returns an error.
    pub async fn run_once(&self) {
        let creds = match self.credentials.all() {
            Ok(creds) => creds,
            Err(e) => {
                error!("credential enumeration failed: {e}");
                return;
            }
        };

        debug!(users = creds.len(), "sweep started");
        for cred in creds {
            let user_id = cred.user_id;
            if let Err(e) = self.process_user(cred).await {
                warn!(user_id, "user sweep failed: {e}");
            }
        }
        debug!("sweep complete");
    }

    async fn process_user(&self, cred: Credential) -> Result<()> {
        let user_id = cred.user_id;

        let cred = if cred.is_expired(Utc::now()) {
            match self.refresher.refresh(user_id).await {
                Some(fresh) => fresh,
                None => {
                    debug!(user_id, "credential unrecoverable, skipping user");
                    return Ok(());
                }
            }
        } else {
            cred
        };

        let prefs = self.prefs.get(user_id)?;
        if !prefs.enabled {
            return Ok(());
        }

        // The edit layer guarantees enabled rows carry a resume; re-check
        // anyway so a hand-edited row can never submit without one.
        let Some(resume_id) = prefs.resume_id.clone() else {
            warn!(user_id, "enabled user has no resume selected, skipping");
            return Ok(());
        };

        // Quota check happens once before the search call: an exhausted
        // user costs no API traffic at all. The in-memory counter is
        // authoritative for the rest of this user's loop.
        let (count, last_applied) = self.ledger.applied_count(user_id)?;
        let mut applied_today = effective_count(count, last_applied, Utc::now());
        if applied_today >= prefs.daily_quota {
            debug!(user_id, applied_today, "daily quota exhausted, skipping search");
            return Ok(());
        }

        let postings = self.api.search(&cred.access_token, &prefs).await?;
        debug!(user_id, postings = postings.len(), "postings fetched");

        let mut applied_this_run = 0u32;
        // Provider order is authoritative — no re-sorting.
        for posting in postings {
            // Re-read preferences so a concurrent edit (the user disabling
            // mid-sweep, or lowering the quota) is observed.
            let fresh = self.prefs.get(user_id)?;
            if !fresh.enabled {
                debug!(user_id, "auto-apply disabled mid-sweep, stopping");
                break;
            }
            if applied_today >= fresh.daily_quota {
                debug!(user_id, applied_today, "daily quota reached, stopping");
                break;
            }

            // Never auto-submit where a prescreening test is mandatory;
            // the ledger keeps us from double-submitting.
            if posting.requires_test || self.ledger.is_applied(user_id, &posting.id)? {
                continue;
            }

            match self
                .api
                .apply(
                    &cred.access_token,
                    &posting.id,
                    &resume_id,
                    &prefs.cover_letter,
                )
                .await
            {
                Ok(()) => {
                    // Record only on confirmed success, and persist the
                    // counter immediately so a crash mid-sweep does not
                    // lose quota accounting.
                    self.ledger.mark_applied(user_id, &posting.id)?;
                    applied_today += 1;
                    self.ledger.set_applied_count(user_id, applied_today)?;
                    applied_this_run += 1;
                    info!(user_id, posting_id = %posting.id, "applied");
                }
                Err(ApiError::TestRequired) => {
                    debug!(user_id, posting_id = %posting.id, "test required, skipped");
                }
                Err(e) => {
                    // Not recorded in the ledger — retried on a future sweep.
                    warn!(user_id, posting_id = %posting.id, "apply failed: {e}");
                    self.notifier
                        .notify(
                            user_id,
                            &format!("Could not apply to {} ({}): {e}", posting.name, posting.url),
                        )
                        .await;
                }
            }

            tokio::time::sleep(self.apply_pause).await;
        }

        if applied_this_run > 0 {
            self.notifier
                .notify(user_id, &format!("Applied to {applied_this_run} postings"))
                .await;
        }
        Ok(())
    }
}
