//! Storage for salary rules.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use tracing::info;
use uuid::Uuid;

use crate::calculation::RuleSnapshot;
use crate::error::{EngineError, EngineResult};
use crate::models::{RuleDefinition, SalaryRule};

/// The organization's rule set, kept in creation order.
#[derive(Debug, Default)]
pub struct RuleBook {
    rules: RwLock<Vec<SalaryRule>>,
}

impl RuleBook {
    /// Creates a rule book seeded with `definitions`, in order.
    pub fn from_definitions(
        definitions: &[RuleDefinition],
        now: DateTime<Utc>,
    ) -> EngineResult<Self> {
        let book = Self::default();
        for definition in definitions {
            book.create(definition.clone(), now)?;
        }
        Ok(book)
    }

    /// Returns every rule in creation order.
    pub fn list(&self) -> Vec<SalaryRule> {
        self.rules.read().clone()
    }

    /// Returns one rule.
    pub fn get(&self, id: Uuid) -> EngineResult<SalaryRule> {
        self.rules
            .read()
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or_else(|| EngineError::not_found("salary rule", id))
    }

    /// Validates and appends a new rule.
    pub fn create(&self, definition: RuleDefinition, now: DateTime<Utc>) -> EngineResult<SalaryRule> {
        definition.validate()?;
        let rule = SalaryRule::from_definition(definition, now);
        self.rules.write().push(rule.clone());
        info!(rule_id = %rule.id, rule = %rule.name, "Salary rule created");
        Ok(rule)
    }

    /// Replaces a rule's editable fields, keeping its position.
    pub fn update(
        &self,
        id: Uuid,
        definition: RuleDefinition,
        now: DateTime<Utc>,
    ) -> EngineResult<SalaryRule> {
        definition.validate()?;
        let mut rules = self.rules.write();
        let rule = rules
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| EngineError::not_found("salary rule", id))?;
        rule.apply_definition(definition, now);
        info!(rule_id = %id, "Salary rule updated");
        Ok(rule.clone())
    }

    /// Removes a rule. Stored salary records keep their line items.
    pub fn delete(&self, id: Uuid) -> EngineResult<SalaryRule> {
        let mut rules = self.rules.write();
        let position = rules
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| EngineError::not_found("salary rule", id))?;
        let removed = rules.remove(position);
        info!(rule_id = %id, "Salary rule deleted");
        Ok(removed)
    }

    /// Captures the current rule set.
    pub fn snapshot(&self, now: DateTime<Utc>) -> RuleSnapshot {
        RuleSnapshot::new(now, self.list())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RuleAmount, RuleKind, TriggerKind};
    use rust_decimal::Decimal;

    fn definition(name: &str) -> RuleDefinition {
        RuleDefinition {
            kind: RuleKind::Bonus,
            name: name.to_string(),
            description: String::new(),
            amount: RuleAmount::Fixed(Decimal::from(100)),
            trigger_kind: TriggerKind::Custom,
            trigger_threshold: 1,
            is_active: true,
        }
    }

    #[test]
    fn test_rules_keep_creation_order_after_update() {
        let now = Utc::now();
        let book =
            RuleBook::from_definitions(&[definition("a"), definition("b"), definition("c")], now)
                .unwrap();
        let first = book.list()[0].id;

        book.update(first, definition("a2"), now).unwrap();

        let names: Vec<_> = book.list().into_iter().map(|r| r.name).collect();
        assert_eq!(names, ["a2", "b", "c"]);
    }

    #[test]
    fn test_snapshot_is_unaffected_by_later_deletes() {
        let now = Utc::now();
        let book = RuleBook::from_definitions(&[definition("a")], now).unwrap();
        let snapshot = book.snapshot(now);

        book.delete(snapshot.rules[0].id).unwrap();

        assert_eq!(snapshot.rules.len(), 1);
        assert!(book.list().is_empty());
    }

    #[test]
    fn test_unknown_rule_is_not_found() {
        let book = RuleBook::default();
        assert!(matches!(
            book.delete(Uuid::new_v4()),
            Err(EngineError::NotFound { .. })
        ));
    }
}
