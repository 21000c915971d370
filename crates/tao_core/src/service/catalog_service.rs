//! Catalog use-case service.
//!
//! # Responsibility
//! - Add one record and enrich it immediately (single scan).
//! - Bulk-import records from newline separated names.
//! - Derive catalog statistics (concept distribution, sync coverage).
//!
//! # Invariants
//! - A failed single scan still leaves the created record in the store,
//!   unclassified.
//! - Imported records keep input order at the front of the listing.

use crate::ai::Classifier;
use crate::model::record::{Record, RecordId, RecordStatus, ValidationError};
use crate::repo::record_repo::{RecordListQuery, RecordRepository};
use crate::service::{ServiceError, ServiceResult};
use crate::sync::progress::{emit, ProgressEvent, ProgressLog};
use log::{info, warn};
use std::collections::BTreeMap;

/// Platform assigned to bulk-imported records.
pub const IMPORT_PLATFORM: &str = "Retro";
/// Placeholder labels that carry no meaning in concept statistics.
pub const IGNORED_CONCEPTS: &[&str] = &["Retro", "General"];
/// Number of entries returned by [`CatalogService::concept_stats`].
pub const MAX_CONCEPTS: usize = 8;

/// Share of one category/tag among all counted labels.
#[derive(Debug, Clone, PartialEq)]
pub struct ConceptShare {
    pub name: String,
    /// Percentage in `0..=100`.
    pub percent: f64,
}

/// Catalog facade over a record repository.
///
/// The classifier is a per-call argument of [`CatalogService::add_record`].
pub struct CatalogService<R, L> {
    repo: R,
    progress: L,
}

impl<R, L> CatalogService<R, L>
where
    R: RecordRepository,
    L: ProgressLog,
{
    /// Creates a service using the provided repository and progress sink.
    pub fn new(repo: R, progress: L) -> Self {
        Self { repo, progress }
    }

    /// Creates one record and classifies it right away with `classifier`.
    ///
    /// Returns the stored record, enriched when the classifier succeeded.
    pub async fn add_record<C>(
        &self,
        classifier: &C,
        name: &str,
        platform: &str,
    ) -> ServiceResult<Record>
    where
        C: Classifier + ?Sized,
    {
        let name = name.trim();
        if name.is_empty() {
            return Err(ServiceError::Validation(ValidationError::EmptyName));
        }

        let mut record = Record::new(name, platform.trim());
        self.repo.create_record(&record)?;
        emit(&self.progress, ProgressEvent::SingleScanStarted { name });

        match classifier.classify(name).await {
            Ok(enrichment) => {
                self.repo.apply_enrichment(record.id, &enrichment)?;
                record.apply_enrichment(&enrichment);
                info!(
                    "event=record_add module=service status=ok record_id={} classified=true",
                    record.id
                );
                emit(
                    &self.progress,
                    ProgressEvent::SingleScanSucceeded {
                        name,
                        score: enrichment.score,
                    },
                );
            }
            Err(err) => {
                warn!(
                    "event=record_add module=service status=error record_id={} error_code={} error={err}",
                    record.id,
                    err.code()
                );
                emit(&self.progress, ProgressEvent::SingleScanFailed { name });
            }
        }

        Ok(record)
    }

    /// Creates one unclassified record per non-blank line of `text`.
    ///
    /// The batch is stored atomically: on error no line is imported.
    pub fn mass_import(&self, text: &str) -> ServiceResult<Vec<Record>> {
        let records: Vec<Record> = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|name| Record::new(name, IMPORT_PLATFORM))
            .collect();

        self.repo.create_records(&records)?;

        info!(
            "event=record_import module=service status=ok count={}",
            records.len()
        );
        emit(
            &self.progress,
            ProgressEvent::RecordsImported {
                count: records.len(),
            },
        );
        Ok(records)
    }

    /// Lists records in catalog order.
    pub fn list_records(&self, query: &RecordListQuery) -> ServiceResult<Vec<Record>> {
        Ok(self.repo.list_records(query)?)
    }

    /// Loads one record; unknown ids map to [`ServiceError::NotFound`].
    pub fn get_record(&self, id: RecordId) -> ServiceResult<Record> {
        self.repo.get_record(id)?.ok_or(ServiceError::NotFound(id))
    }

    /// Updates user-owned fields; enrichment attributes are left as stored.
    pub fn update_user_fields(
        &self,
        id: RecordId,
        notes: Option<String>,
        status: Option<RecordStatus>,
    ) -> ServiceResult<Record> {
        let mut record = self.get_record(id)?;
        if let Some(notes) = notes {
            record.notes = notes;
        }
        if let Some(status) = status {
            record.status = status;
        }
        self.repo.update_record(&record)?;
        Ok(record)
    }

    /// Top category/tag shares across the catalog.
    pub fn concept_stats(&self) -> ServiceResult<Vec<ConceptShare>> {
        let records = self.repo.list_records(&RecordListQuery::default())?;
        Ok(concept_shares(&records))
    }

    /// Percentage of records that are classified; 0 for an empty catalog.
    pub fn sync_coverage(&self) -> ServiceResult<f64> {
        let records = self.repo.list_records(&RecordListQuery::default())?;
        Ok(coverage_percent(&records))
    }
}

fn concept_shares(records: &[Record]) -> Vec<ConceptShare> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for record in records {
        let labels = record
            .tags
            .iter()
            .map(String::as_str)
            .chain(record.category.as_deref());
        for label in labels {
            if label.is_empty() || IGNORED_CONCEPTS.contains(&label) {
                continue;
            }
            *counts.entry(label).or_default() += 1;
        }
    }

    let total = counts.values().sum::<usize>().max(1) as f64;
    let mut shares: Vec<ConceptShare> = counts
        .into_iter()
        .map(|(name, count)| ConceptShare {
            name: name.to_string(),
            percent: count as f64 / total * 100.0,
        })
        .collect();
    // BTreeMap order already breaks ties by name; the sort is stable.
    shares.sort_by(|left, right| right.percent.total_cmp(&left.percent));
    shares.truncate(MAX_CONCEPTS);
    shares
}

fn coverage_percent(records: &[Record]) -> f64 {
    if records.is_empty() {
        return 0.0;
    }
    let classified = records.iter().filter(|record| record.is_classified()).count();
    classified as f64 / records.len() as f64 * 100.0
}

#[cfg(test)]
mod tests {
    use super::{concept_shares, coverage_percent};
    use crate::model::record::Record;

    fn tagged(category: &str, tags: &[&str]) -> Record {
        let mut record = Record::new("game", "PC");
        record.category = Some(category.to_string());
        record.tags = tags.iter().map(|tag| tag.to_string()).collect();
        record.description = Some("known".to_string());
        record
    }

    #[test]
    fn concept_shares_ignore_placeholders_and_sort_by_share() {
        let records = vec![
            tagged("Horror", &["Fog", "Retro"]),
            tagged("Horror", &["General"]),
            tagged("RPG", &["Fog"]),
        ];

        let shares = concept_shares(&records);
        let names: Vec<&str> = shares.iter().map(|share| share.name.as_str()).collect();
        assert_eq!(names, vec!["Fog", "Horror", "RPG"]);
        assert!((shares[0].percent - 40.0).abs() < 1e-9);
        assert!((shares[2].percent - 20.0).abs() < 1e-9);
    }

    #[test]
    fn concept_shares_keep_top_eight() {
        let tags: Vec<String> = (0..12).map(|index| format!("tag{index:02}")).collect();
        let tag_refs: Vec<&str> = tags.iter().map(String::as_str).collect();
        let shares = concept_shares(&[tagged("", &tag_refs)]);
        assert_eq!(shares.len(), 8);
        assert_eq!(shares[0].name, "tag00");
    }

    #[test]
    fn coverage_is_zero_for_empty_catalog() {
        assert_eq!(coverage_percent(&[]), 0.0);
        let records = vec![tagged("RPG", &[]), Record::new("pending", "PS2")];
        assert!((coverage_percent(&records) - 50.0).abs() < 1e-9);
    }
}
