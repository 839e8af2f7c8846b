// src/pipeline/check.rs

//! Per-server update check: extract, diff against stored checksums,
//! notify and persist.

use crate::config::ConfigService;
use crate::error::Result;
use crate::models::{RunState, SchoolConfig};
use crate::pipeline::checksum::{checksum_sections, checksum_text};
use crate::pipeline::stats::accumulate;
use crate::services::{Extractor, Notifier};
use crate::storage::RunStateStore;

/// Why a server was skipped without an update check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The server has not configured a notification channel yet.
    NoChannel,
}

/// Outcome of one per-server check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    /// Server not ready; nothing was done.
    Skipped(SkipReason),
    /// Both checksums matched the stored run state; state untouched.
    Unchanged,
    /// An update was sent and the run state persisted.
    Notified {
        /// Whether the substitution entries changed (vs. extra info only)
        entries_changed: bool,
        /// How much the substitution count grew this cycle
        increment: u64,
    },
}

/// Check one server against freshly fetched page content.
///
/// The sequence is strictly ordered: checksum, then notify, then
/// persist. A transport failure while sending propagates before the
/// persist, so the stored checksums stay put and the next cycle retries
/// the same diff (at-least-once redelivery).
pub async fn check_server(
    server_id: &str,
    page: &str,
    school: &SchoolConfig,
    config: &ConfigService,
    extractor: &dyn Extractor,
    store: &dyn RunStateStore,
    notifier: &dyn Notifier,
) -> Result<CheckOutcome> {
    let server = config.server(server_id).await;
    if server.channel_id.is_empty() {
        return Ok(CheckOutcome::Skipped(SkipReason::NoChannel));
    }

    let previous = store.load(server_id).await?;

    let (extra, sections) = extractor.extract(
        page,
        &server.selected_classes,
        &server.selected_teachers,
        &school.all_classes(),
    );

    let extra_checksum = checksum_text(&extra);
    let entries_checksum = checksum_sections(&sections);

    if previous.matches(&extra_checksum, &entries_checksum) {
        return Ok(CheckOutcome::Unchanged);
    }

    let entries_changed = entries_checksum != previous.entries_checksum;
    if entries_changed {
        log::debug!("Substitution content changed for server {server_id}; sending update");
    } else {
        log::debug!("Extra info changed for server {server_id}; sending extra-only update");
    }

    notifier
        .send_update(
            &server.channel_id,
            server_id,
            &extra,
            entries_changed.then_some(sections.as_slice()),
        )
        .await?;

    if server.send_lucky_numbers && school.has_lucky_numbers {
        notifier
            .send_lucky_numbers(&server.channel_id, server_id, &extra, school)
            .await?;
    }

    let (substitution_count, teacher_stats) = if entries_changed {
        accumulate(
            previous.substitution_count,
            &previous.teacher_stats,
            &sections,
        )
    } else {
        (previous.substitution_count, previous.teacher_stats.clone())
    };

    let increment = substitution_count - previous.substitution_count;
    let state = RunState {
        extra_checksum,
        entries_checksum,
        substitution_count,
        teacher_stats,
        last_report: previous.last_report.clone(),
    };
    store.save(server_id, &state).await?;

    Ok(CheckOutcome::Notified {
        entries_changed,
        increment,
    })
}

#[cfg(test)]
pub(crate) mod testing {
    //! Mock collaborators shared by pipeline tests.

    use std::collections::HashMap;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use async_trait::async_trait;
    use tokio::sync::Mutex;

    use crate::error::{AppError, Result};
    use crate::models::{RunState, SchoolConfig, Section};
    use crate::services::{Extractor, Notifier, PageSource};
    use crate::storage::RunStateStore;

    /// Extractor returning fixed content regardless of input.
    pub struct StaticExtractor {
        pub extra: String,
        pub sections: Vec<Section>,
    }

    impl Extractor for StaticExtractor {
        fn extract(
            &self,
            _page: &str,
            _selected_classes: &[String],
            _selected_teachers: &[String],
            _all_classes: &[String],
        ) -> (String, Vec<Section>) {
            (self.extra.clone(), self.sections.clone())
        }
    }

    /// In-memory run-state store.
    #[derive(Default)]
    pub struct MemoryStore {
        pub records: Mutex<HashMap<String, RunState>>,
    }

    #[async_trait]
    impl RunStateStore for MemoryStore {
        async fn load(&self, server_id: &str) -> Result<RunState> {
            Ok(self
                .records
                .lock()
                .await
                .get(server_id)
                .cloned()
                .unwrap_or_default())
        }

        async fn save(&self, server_id: &str, state: &RunState) -> Result<()> {
            self.records
                .lock()
                .await
                .insert(server_id.to_string(), state.clone());
            Ok(())
        }
    }

    /// Notifier recording calls, optionally failing every send.
    #[derive(Default)]
    pub struct RecordingNotifier {
        pub updates: AtomicUsize,
        pub lucky: AtomicUsize,
        pub fail: AtomicBool,
        pub last_sections: Mutex<Option<Vec<Section>>>,
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn send_update(
            &self,
            channel_id: &str,
            _server_id: &str,
            _extra: &str,
            sections: Option<&[Section]>,
        ) -> Result<()> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(AppError::transport(
                    format!("send to {channel_id}"),
                    "simulated outage",
                ));
            }
            self.updates.fetch_add(1, Ordering::SeqCst);
            *self.last_sections.lock().await = sections.map(<[Section]>::to_vec);
            Ok(())
        }

        async fn send_lucky_numbers(
            &self,
            _channel_id: &str,
            _server_id: &str,
            _extra: &str,
            _school: &SchoolConfig,
        ) -> Result<()> {
            self.lucky.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    /// Page source serving one fixed page for every URL.
    pub struct StaticPage(pub Arc<String>);

    #[async_trait]
    impl PageSource for StaticPage {
        async fn fetch(&self, _url: &str, _encoding: &str) -> Result<String> {
            Ok(self.0.as_str().to_string())
        }
    }
}
