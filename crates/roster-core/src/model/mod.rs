//! Domain models

mod person;

pub use person::{NewPerson, Person, Snapshot};
