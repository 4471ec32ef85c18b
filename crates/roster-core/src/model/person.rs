//! Person records
//!
//! A `Person` is created exactly once, when the store assigns its id, and is
//! never mutated afterwards. `NewPerson` carries the caller-supplied fields
//! before an id exists.

use serde::{Deserialize, Serialize};

/// A stored person record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    /// Store-assigned id, strictly increasing across inserts
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub age: i64,
}

/// Fields supplied by the caller of `insert`
///
/// No validation is applied: empty names and negative ages are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPerson {
    pub first_name: String,
    pub last_name: String,
    pub age: i64,
}

impl NewPerson {
    /// Create a new unsaved person
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>, age: i64) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            age,
        }
    }

    /// Attach a store-assigned id
    pub fn with_id(self, id: i64) -> Person {
        Person {
            id,
            first_name: self.first_name,
            last_name: self.last_name,
            age: self.age,
        }
    }
}

impl Person {
    /// "First Last" display form used by list views
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

impl std::fmt::Display for Person {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{} {} ({})", self.id, self.full_name(), self.age)
    }
}

/// The full ordered list of records at one point in time, newest first
pub type Snapshot = Vec<Person>;
