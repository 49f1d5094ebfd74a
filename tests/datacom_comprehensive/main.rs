//! DataCom Comprehensive Test Suite
//!
//! Exercises the public facade end to end against the in-memory transports.
//!
//! ## Modules
//!
//! - `scenarios`: the documented list and batch scenarios
//! - `properties`: property tests for reconciliation and key matching
//! - `config`: configuration files and connection factories
//! - `threads`: clients used from several threads
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test --test datacom_comprehensive
//! cargo test --test datacom_comprehensive properties::
//! ```

use datacom::{entity, Entity, Record};

#[derive(Debug, Clone, PartialEq)]
pub struct Person {
    pub id: i64,
    pub name: String,
}

entity!(Person { id: Int, name: String });

/// Shorthand constructor.
pub fn person(id: i64, name: &str) -> Person {
    Person {
        id,
        name: name.to_string(),
    }
}

/// `person(id, name)` as a record.
pub fn person_record(id: i64, name: &str) -> Record {
    person(id, name).to_record()
}

mod config;
mod properties;
mod scenarios;
mod threads;
