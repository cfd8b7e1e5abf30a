//! Storage for salary records.
//!
//! Records are indexed by id and by pay period. Mutations go through
//! [`RecordStore::update`], which runs the caller's check-and-mutate closure
//! while holding the record's write guard, so status transitions behave as
//! compare-and-swap operations.

use dashmap::DashMap;
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::models::{PeriodKey, SalaryRecord, SalaryStatus};

/// Salary records indexed by id and pay period.
#[derive(Debug, Default)]
pub struct RecordStore {
    records: DashMap<Uuid, SalaryRecord>,
    by_period: DashMap<PeriodKey, Vec<Uuid>>,
}

impl RecordStore {
    /// Stores a new record.
    pub fn insert(&self, record: SalaryRecord) {
        let key = record.key();
        let id = record.id;
        self.records.insert(id, record);
        self.by_period.entry(key).or_default().push(id);
    }

    /// Returns one record.
    pub fn get(&self, id: Uuid) -> EngineResult<SalaryRecord> {
        self.records
            .get(&id)
            .map(|r| r.value().clone())
            .ok_or_else(|| EngineError::not_found("salary record", id))
    }

    /// Returns the period's record that has not been rejected, if any.
    pub fn live_for(&self, key: &PeriodKey) -> Option<SalaryRecord> {
        let ids = self.by_period.get(key).map(|ids| ids.value().clone())?;
        ids.into_iter()
            .filter_map(|id| self.records.get(&id).map(|r| r.value().clone()))
            .find(|r| r.status != SalaryStatus::Rejected)
    }

    /// Runs `f` against the stored record under its write guard.
    ///
    /// `f` must check before it mutates: on error the record is expected to
    /// be unchanged.
    pub fn update<T, F>(&self, id: Uuid, f: F) -> EngineResult<T>
    where
        F: FnOnce(&mut SalaryRecord) -> EngineResult<T>,
    {
        let mut record = self
            .records
            .get_mut(&id)
            .ok_or_else(|| EngineError::not_found("salary record", id))?;
        let result = f(record.value_mut());
        debug_assert!(record.is_balanced());
        result
    }

    /// Returns records matching `predicate`, ordered by period, employee and
    /// calculation time.
    pub fn filter<P>(&self, predicate: P) -> Vec<SalaryRecord>
    where
        P: Fn(&SalaryRecord) -> bool,
    {
        let mut records: Vec<SalaryRecord> = self
            .records
            .iter()
            .filter(|r| predicate(r.value()))
            .map(|r| r.value().clone())
            .collect();
        records.sort_by(|a, b| {
            (a.year, a.month, a.user_id, a.calculated_at).cmp(&(
                b.year,
                b.month,
                b.user_id,
                b.calculated_at,
            ))
        });
        records
    }

    /// Returns every record of a period, including rejected ones.
    pub fn history_for(&self, key: &PeriodKey) -> Vec<SalaryRecord> {
        self.filter(|r| r.key() == *key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal::Decimal;

    use crate::models::{AttendanceFacts, CalculatedPay};

    fn record(key: PeriodKey) -> SalaryRecord {
        let pay = CalculatedPay {
            base_salary: Decimal::from(8_000_000),
            grade_code: "G1".to_string(),
            line_items: Vec::new(),
            new_advances: Vec::new(),
            facts: AttendanceFacts::default(),
            rules_snapshot_at: Utc::now(),
        };
        SalaryRecord::pending(key, pay, Utc::now()).unwrap()
    }

    #[test]
    fn test_live_record_skips_rejected() {
        let store = RecordStore::default();
        let key = PeriodKey::new(Uuid::new_v4(), 3, 2026).unwrap();
        let mut rejected = record(key);
        rejected.status = SalaryStatus::Rejected;
        let live = record(key);
        store.insert(rejected.clone());
        store.insert(live.clone());

        assert_eq!(store.live_for(&key).map(|r| r.id), Some(live.id));
        assert_eq!(store.history_for(&key).len(), 2);
    }

    #[test]
    fn test_failed_update_leaves_record_unchanged() {
        let store = RecordStore::default();
        let original = record(PeriodKey::new(Uuid::new_v4(), 3, 2026).unwrap());
        store.insert(original.clone());

        let result: EngineResult<()> = store.update(original.id, |_| {
            Err(EngineError::validation("status", "refused"))
        });

        assert!(result.is_err());
        assert_eq!(store.get(original.id).unwrap(), original);
    }

    #[test]
    fn test_filter_orders_by_period() {
        let store = RecordStore::default();
        let user = Uuid::new_v4();
        for month in [9, 2, 5] {
            store.insert(record(PeriodKey::new(user, month, 2026).unwrap()));
        }

        let months: Vec<_> = store.filter(|_| true).into_iter().map(|r| r.month).collect();
        assert_eq!(months, [2, 5, 9]);
    }

    #[test]
    fn test_unknown_record_not_found() {
        let store = RecordStore::default();
        assert!(matches!(
            store.update(Uuid::new_v4(), |_| Ok(())),
            Err(EngineError::NotFound { .. })
        ));
    }
}
