//! SQLite repository implementation
//!
//! Plain SQL over the `people` table. Callers own locking and notification;
//! see `PersonStore`.

#![allow(clippy::result_large_err)]

use crate::errors::{from_rusqlite, Result};
use roster_core::model::{NewPerson, Person};
use rusqlite::{Connection, Row, Transaction};

/// SQLite repository for person records
pub struct SqliteRepo;

impl SqliteRepo {
    /// Append a person within a transaction and return the assigned id
    pub fn insert_person_tx(tx: &Transaction, person: &NewPerson) -> Result<i64> {
        tx.execute(
            "INSERT INTO people (first_name, last_name, age) VALUES (?1, ?2, ?3)",
            rusqlite::params![person.first_name, person.last_name, person.age],
        )
        .map_err(from_rusqlite)?;

        Ok(tx.last_insert_rowid())
    }

    /// Append a person in its own transaction and return the assigned id
    pub fn insert_person(conn: &mut Connection, person: &NewPerson) -> Result<i64> {
        let tx = conn.transaction().map_err(from_rusqlite)?;
        let id = Self::insert_person_tx(&tx, person)?;
        tx.commit().map_err(from_rusqlite)?;
        Ok(id)
    }

    /// All people, newest (highest id) first
    pub fn list_people_desc(conn: &Connection) -> Result<Vec<Person>> {
        let mut stmt = conn
            .prepare("SELECT id, first_name, last_name, age FROM people ORDER BY id DESC")
            .map_err(from_rusqlite)?;

        let people = stmt
            .query_map([], person_from_row)
            .map_err(from_rusqlite)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(from_rusqlite)?;

        Ok(people)
    }

    /// Number of stored people
    pub fn count_people(conn: &Connection) -> Result<i64> {
        conn.query_row("SELECT COUNT(*) FROM people", [], |row| row.get(0))
            .map_err(from_rusqlite)
    }
}

fn person_from_row(row: &Row<'_>) -> rusqlite::Result<Person> {
    Ok(Person {
        id: row.get(0)?,
        first_name: row.get(1)?,
        last_name: row.get(2)?,
        age: row.get(3)?,
    })
}
