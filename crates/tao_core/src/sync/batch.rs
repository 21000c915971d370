//! Pending selection and batch planning.

use crate::model::record::Record;

/// One slice of the pending snapshot processed concurrently.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Batch<'a> {
    /// 1-based position of this batch.
    pub number: usize,
    /// Total number of batches in the run.
    pub total: usize,
    pub records: &'a [Record],
    /// Items attempted once this batch and all earlier ones are done.
    pub attempted_after: usize,
}

impl Batch<'_> {
    pub fn is_last(&self) -> bool {
        self.number == self.total
    }
}

/// Returns unclassified records in store order.
pub fn select_pending(records: &[Record]) -> Vec<Record> {
    records
        .iter()
        .filter(|record| !record.is_classified())
        .cloned()
        .collect()
}

/// `ceil(pending / batch_size)`; a zero `batch_size` is treated as 1.
pub fn batch_count(pending: usize, batch_size: usize) -> usize {
    pending.div_ceil(batch_size.max(1))
}

/// Splits `pending` into consecutive batches of at most `batch_size`.
pub fn plan_batches(pending: &[Record], batch_size: usize) -> Vec<Batch<'_>> {
    let batch_size = batch_size.max(1);
    let total = batch_count(pending.len(), batch_size);
    let mut attempted = 0;

    pending
        .chunks(batch_size)
        .enumerate()
        .map(|(index, records)| {
            attempted += records.len();
            Batch {
                number: index + 1,
                total,
                records,
                attempted_after: attempted,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{batch_count, plan_batches, select_pending};
    use crate::model::record::Record;

    fn records(count: usize) -> Vec<Record> {
        (0..count)
            .map(|index| Record::new(format!("game {index}"), "PC"))
            .collect()
    }

    #[test]
    fn batch_sizes_follow_ceiling_rule() {
        for pending in 0..=20 {
            let items = records(pending);
            let batches = plan_batches(&items, 3);
            assert_eq!(batches.len(), batch_count(pending, 3));
            assert_eq!(batches.len(), pending.div_ceil(3));

            if let Some(last) = batches.last() {
                let expected_last = if pending % 3 == 0 { 3 } else { pending % 3 };
                assert_eq!(last.records.len(), expected_last);
                assert!(last.is_last());
                assert_eq!(last.attempted_after, pending);
            }
        }
    }

    #[test]
    fn batches_preserve_order_and_running_counter() {
        let items = records(7);
        let batches = plan_batches(&items, 3);

        let sizes: Vec<usize> = batches.iter().map(|batch| batch.records.len()).collect();
        assert_eq!(sizes, vec![3, 3, 1]);
        let counters: Vec<usize> = batches.iter().map(|batch| batch.attempted_after).collect();
        assert_eq!(counters, vec![3, 6, 7]);

        let flattened: Vec<&str> = batches
            .iter()
            .flat_map(|batch| batch.records.iter().map(|record| record.name.as_str()))
            .collect();
        let original: Vec<&str> = items.iter().map(|record| record.name.as_str()).collect();
        assert_eq!(flattened, original);
    }

    #[test]
    fn zero_batch_size_degrades_to_single_items() {
        let items = records(2);
        assert_eq!(plan_batches(&items, 0).len(), 2);
    }

    #[test]
    fn select_pending_skips_classified_records() {
        let mut items = records(3);
        items[1].description = Some("already known".to_string());

        let pending = select_pending(&items);
        assert_eq!(pending.len(), 2);
        assert_eq!(pending[0].id, items[0].id);
        assert_eq!(pending[1].id, items[2].id);
    }
}
