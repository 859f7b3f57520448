//! Fetch, translate and write loop across content types and locales.

use std::time::Duration;

use cobipedia_core::{find_content_type, AppConfig, ContentTypeProfile, SourceEntry, CONTENT_TYPES};
use cobipedia_strapi::ContentStore;
use cobipedia_translate::Translator;

use crate::error::PipelineError;
use crate::fetcher::fetch_source_entries;
use crate::ledger::{Checkpoint, ProgressLedger};
use crate::payload::build_payload;
use crate::writer::Writer;

/// Successful translations between mid-pass ledger flushes.
pub const CHECKPOINT_EVERY: usize = 10;

/// Parameters of one translation run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub dry_run: bool,
    /// Skip entries the loaded ledger already marks complete.
    pub resume: bool,
    /// Cap on entries processed per content type; `Some(0)` means no cap.
    pub limit: Option<usize>,
    /// Process only this target locale.
    pub locale_filter: Option<String>,
    /// Process only this content type (by command-line name).
    pub type_filter: Option<String>,
    pub source_locale: String,
    pub target_locales: Vec<String>,
    pub page_size: u32,
    /// Pause after each translation call.
    pub model_delay: Duration,
    /// Pause after each write and between fetched pages.
    pub write_delay: Duration,
}

impl RunOptions {
    /// Defaults from configuration: no filters, no limit, live writes.
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            dry_run: false,
            resume: false,
            limit: None,
            locale_filter: None,
            type_filter: None,
            source_locale: config.source_locale.clone(),
            target_locales: config.target_locales.clone(),
            page_size: config.page_size,
            model_delay: Duration::from_millis(config.model_delay_ms),
            write_delay: Duration::from_millis(config.write_delay_ms),
        }
    }

    fn locales(&self) -> Vec<String> {
        match &self.locale_filter {
            Some(locale) if *locale == self.source_locale => {
                tracing::error!(
                    locale = %locale,
                    "target locale equals the source locale; nothing to translate"
                );
                Vec::new()
            }
            Some(locale) => vec![locale.clone()],
            None => self.target_locales.clone(),
        }
    }
}

/// Per-locale counts for one content type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocaleTally {
    pub locale: String,
    pub translated: usize,
    pub skipped: usize,
    pub errors: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeOutcome {
    Completed(Vec<LocaleTally>),
    /// The source listing failed; the message is the fetch error.
    FetchFailed(String),
    NoEntries,
    /// The type filter named no registered content type.
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeReport {
    pub content_type: String,
    pub outcome: TypeOutcome,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub types: Vec<TypeReport>,
}

impl RunReport {
    /// Sums of (translated, skipped, errors) over every locale pass.
    #[must_use]
    pub fn totals(&self) -> (usize, usize, usize) {
        self.types
            .iter()
            .filter_map(|t| match &t.outcome {
                TypeOutcome::Completed(tallies) => Some(tallies),
                _ => None,
            })
            .flatten()
            .fold((0, 0, 0), |(tr, sk, er), t| {
                (tr + t.translated, sk + t.skipped, er + t.errors)
            })
    }
}

/// Drives one run. Work is strictly sequential: one network call in flight.
pub struct Orchestrator<'a> {
    store: &'a dyn ContentStore,
    translator: &'a dyn Translator,
    checkpoint: &'a mut dyn Checkpoint,
    options: RunOptions,
}

impl<'a> Orchestrator<'a> {
    pub fn new(
        store: &'a dyn ContentStore,
        translator: &'a dyn Translator,
        checkpoint: &'a mut dyn Checkpoint,
        options: RunOptions,
    ) -> Self {
        Self {
            store,
            translator,
            checkpoint,
            options,
        }
    }

    /// Processes every selected content type in registry order.
    ///
    /// A failed source listing abandons only that content type. Translate and
    /// write failures are recorded in `ledger` and do not stop the run.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Ledger`] if a checkpoint cannot be saved.
    pub async fn run(&mut self, ledger: &mut ProgressLedger) -> Result<RunReport, PipelineError> {
        let mut report = RunReport::default();

        let profiles: Vec<&'static ContentTypeProfile> = match &self.options.type_filter {
            None => CONTENT_TYPES.iter().collect(),
            Some(name) => {
                if let Some(profile) = find_content_type(name) {
                    vec![profile]
                } else {
                    tracing::error!(content_type = %name, "unknown content type");
                    report.types.push(TypeReport {
                        content_type: name.clone(),
                        outcome: TypeOutcome::Unknown,
                    });
                    Vec::new()
                }
            }
        };

        for profile in profiles {
            let outcome = self.run_type(profile, ledger).await?;
            report.types.push(TypeReport {
                content_type: profile.name.to_string(),
                outcome,
            });
        }

        Ok(report)
    }

    async fn run_type(
        &mut self,
        profile: &ContentTypeProfile,
        ledger: &mut ProgressLedger,
    ) -> Result<TypeOutcome, PipelineError> {
        tracing::info!(content_type = profile.name, "fetching source entries");
        let mut entries = match fetch_source_entries(
            self.store,
            profile,
            &self.options.source_locale,
            self.options.page_size,
            self.options.write_delay,
        )
        .await
        {
            Ok(entries) => entries,
            Err(e) => {
                tracing::error!(content_type = profile.name, error = %e, "fetch failed; skipping content type");
                return Ok(TypeOutcome::FetchFailed(e.to_string()));
            }
        };

        if entries.is_empty() {
            tracing::info!(content_type = profile.name, "no entries found");
            return Ok(TypeOutcome::NoEntries);
        }
        if let Some(limit) = self.options.limit.filter(|n| *n > 0) {
            entries.truncate(limit);
        }
        tracing::info!(content_type = profile.name, count = entries.len(), "entries to process");

        let mut tallies = Vec::new();
        for locale in self.options.locales() {
            let tally = self.run_locale(profile, &entries, &locale, ledger).await?;
            tracing::info!(
                content_type = profile.name,
                locale = %locale,
                translated = tally.translated,
                skipped = tally.skipped,
                errors = tally.errors,
                "locale pass finished"
            );
            tallies.push(tally);
        }
        Ok(TypeOutcome::Completed(tallies))
    }

    async fn run_locale(
        &mut self,
        profile: &ContentTypeProfile,
        entries: &[SourceEntry],
        locale: &str,
        ledger: &mut ProgressLedger,
    ) -> Result<LocaleTally, PipelineError> {
        let mut tally = LocaleTally {
            locale: locale.to_string(),
            ..LocaleTally::default()
        };

        for entry in entries {
            let id = entry.document_id.as_str();

            if self.options.resume && ledger.is_completed(profile.name, locale, id) {
                tally.skipped += 1;
                continue;
            }

            if !entry.has_translatable_content(profile) {
                tracing::debug!(content_type = profile.name, locale, document_id = id, "nothing to translate");
                ledger.mark_completed(profile.name, locale, id);
                tally.skipped += 1;
                continue;
            }

            match self.translate_and_write(profile, entry, locale).await {
                Ok(()) => {
                    ledger.mark_completed(profile.name, locale, id);
                    tally.translated += 1;
                    tracing::info!(
                        content_type = profile.name,
                        locale,
                        document_id = id,
                        name = %entry.display_name(profile),
                        "translated"
                    );
                    if tally.translated % CHECKPOINT_EVERY == 0 {
                        self.checkpoint.save(ledger)?;
                    }
                }
                Err(e) => {
                    tracing::warn!(
                        content_type = profile.name,
                        locale,
                        document_id = id,
                        error = %e,
                        "entry failed"
                    );
                    ledger.mark_error(profile.name, locale, id, &e.to_string());
                    tally.errors += 1;
                }
            }
        }

        self.checkpoint.save(ledger)?;
        Ok(tally)
    }

    async fn translate_and_write(
        &self,
        profile: &ContentTypeProfile,
        entry: &SourceEntry,
        locale: &str,
    ) -> Result<(), PipelineError> {
        let translated = self
            .translator
            .translate(profile, entry, &self.options.source_locale, locale)
            .await;
        pause(self.options.model_delay).await;
        let translation = translated?;

        let payload = build_payload(profile, entry, &translation);
        Writer::new(self.store, self.options.dry_run)
            .write(profile, &entry.document_id, locale, payload)
            .await
            .map_err(PipelineError::Write)?;
        if !self.options.dry_run {
            pause(self.options.write_delay).await;
        }
        Ok(())
    }
}

async fn pause(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

#[cfg(test)]
#[path = "orchestrator_test.rs"]
mod tests;
