//! The authenticated caller of an engine operation.

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Role of an authenticated caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Full access, including disbursement.
    Admin,
    /// Runs payroll: calculates, reviews and adjusts.
    Manager,
    /// Reads data and requests advances.
    Employee,
}

/// What an action requires of the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Calculate, review, adjust and configure payroll.
    ManagePayroll,
    /// Mark approved salaries as paid.
    Disburse,
}

impl Role {
    /// Returns true if the role grants `capability`.
    pub fn grants(&self, capability: Capability) -> bool {
        match capability {
            Capability::ManagePayroll => matches!(self, Role::Admin | Role::Manager),
            Capability::Disburse => matches!(self, Role::Admin),
        }
    }
}

/// An authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// Identifier recorded in audit fields.
    pub id: String,
    /// The caller's role.
    pub role: Role,
}

impl Actor {
    /// Creates an actor.
    pub fn new(id: impl Into<String>, role: Role) -> Self {
        Self {
            id: id.into(),
            role,
        }
    }

    /// Fails with [`EngineError::Forbidden`] unless the actor holds `capability`.
    pub fn require(&self, capability: Capability, action: &str) -> EngineResult<()> {
        if self.role.grants(capability) {
            Ok(())
        } else {
            Err(EngineError::Forbidden {
                actor: self.id.clone(),
                action: action.to_string(),
            })
        }
    }
}
