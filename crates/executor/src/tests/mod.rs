//! Test modules for the executor crate.


use datacom_core::{entity, Entity, Record, Schema};

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Person {
    pub id: i64,
    pub name: String,
}

entity!(Person { id: Int, name: String });

pub(crate) fn person(id: i64, name: &str) -> Person {
    Person {
        id,
        name: name.to_string(),
    }
}

pub(crate) fn person_schema() -> Schema {
    Person::schema().clone()
}

pub(crate) fn person_record(id: i64, name: &str) -> Record {
    person(id, name).to_record()
}
