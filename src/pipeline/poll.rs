// src/pipeline/poll.rs

//! Polling orchestrator: fetch once per school, fan out to subscribed
//! servers under the bounded check gate, sleep, repeat.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use crate::config::ConfigService;
use crate::pipeline::check::{CheckOutcome, check_server};
use crate::services::{Extractor, Notifier, PageSource};
use crate::storage::RunStateStore;
use crate::utils::CheckGate;

pub struct Orchestrator {
    config: Arc<ConfigService>,
    pages: Arc<dyn PageSource>,
    extractor: Arc<dyn Extractor>,
    store: Arc<dyn RunStateStore>,
    notifier: Arc<dyn Notifier>,
    gate: CheckGate,
}

impl Orchestrator {
    pub fn new(
        config: Arc<ConfigService>,
        pages: Arc<dyn PageSource>,
        extractor: Arc<dyn Extractor>,
        store: Arc<dyn RunStateStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            config,
            pages,
            extractor,
            store,
            notifier,
            gate: CheckGate::default(),
        }
    }

    /// Poll until the shutdown signal fires.
    ///
    /// Cancellation between cycles (or mid-cycle via task drop) leaves
    /// stored state intact: run-state records are only ever replaced
    /// whole, after a successful notify.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        loop {
            self.run_cycle().await;

            let interval = self.config.snapshot().await.bot.poll_interval_secs;
            tokio::select! {
                _ = tokio::time::sleep(Duration::from_secs(interval)) => {}
                _ = shutdown.changed() => {
                    log::info!("Shutdown signal received; update checks stopped");
                    return;
                }
            }
        }
    }

    /// One full pass over all schools and their subscribed servers.
    pub async fn run_cycle(&self) {
        let snapshot = self.config.snapshot().await;

        if snapshot.schools.is_empty() {
            log::warn!("No schools defined in the configuration file; nothing to check");
            return;
        }

        for (school_id, school) in &snapshot.schools {
            if school.url.trim().is_empty() {
                log::warn!("No URL configured for school {school_id}; skipping");
                continue;
            }

            // One fetch per school per cycle, shared by every subscriber.
            let page = match self.pages.fetch(&school.url, &school.encoding).await {
                Ok(text) if !text.trim().is_empty() => text,
                Ok(_) => {
                    log::warn!("Empty page content for school {school_id}; skipping");
                    continue;
                }
                Err(e) => {
                    log::warn!("Failed to fetch page for school {school_id}: {e}");
                    continue;
                }
            };

            let subscribers: Vec<String> = snapshot
                .servers
                .iter()
                .filter(|(_, server)| server.school_id == *school_id)
                .map(|(id, _)| id.clone())
                .collect();

            if subscribers.is_empty() {
                continue;
            }

            let page = page.as_str();
            let checks = subscribers.into_iter().map(|server_id| async move {
                let _permit = self.gate.acquire().await;
                self.check_one(&server_id, page, school).await;
            });

            futures::future::join_all(checks).await;
        }
    }

    /// Run one server check, isolating its failures from the batch.
    async fn check_one(&self, server_id: &str, page: &str, school: &crate::models::SchoolConfig) {
        let result = check_server(
            server_id,
            page,
            school,
            &self.config,
            self.extractor.as_ref(),
            self.store.as_ref(),
            self.notifier.as_ref(),
        )
        .await;

        match result {
            Ok(CheckOutcome::Notified {
                entries_changed,
                increment,
            }) => {
                log::info!(
                    "Update sent to server {server_id} (entries changed: {entries_changed}, +{increment})"
                );
            }
            Ok(CheckOutcome::Unchanged | CheckOutcome::Skipped(_)) => {}
            Err(e) if e.is_transport() => {
                log::error!(
                    "Failed to deliver all messages to server {server_id}; checksums left unchanged: {e}"
                );
            }
            Err(e) => {
                log::error!("Error while processing update for server {server_id}: {e}");
            }
        }
    }
}
