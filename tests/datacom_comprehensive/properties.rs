//! Property tests over the public facade.

use datacom::{BackendKind, Batch, DataClient, MemoryKv, MemorySql, Statement, Table};
use proptest::prelude::*;

use crate::{person, person_record, Person};

fn people() -> impl Strategy<Value = Vec<Person>> {
    prop::collection::vec((0i64..6, "[a-c]{1,2}"), 0..10)
        .prop_map(|rows| rows.into_iter().map(|(id, name)| person(id, &name)).collect())
}

proptest! {
    #[test]
    fn update_overwrites_every_match(existing in people(), id in 0i64..6) {
        let store = MemoryKv::redis();
        let mut client = DataClient::new(store);
        if !existing.is_empty() {
            client.insert_many(&existing, "people").unwrap();
        }
        let hits = existing.iter().filter(|p| p.id == id).count() as u64;

        let n = client.update(&person(id, "zz"), "people", &["id"]).unwrap();
        prop_assert_eq!(n, hits.max(1));

        let after: Vec<Person> = client.fetch_range("people", 0, -1).unwrap();
        let expected_len = existing.len() + usize::from(hits == 0);
        prop_assert_eq!(after.len(), expected_len);
        prop_assert!(after.iter().filter(|p| p.id == id).all(|p| p.name == "zz"));
    }

    #[test]
    fn delete_removes_every_match(existing in people(), id in 0i64..6) {
        let mut client = DataClient::new(MemoryKv::etcd());
        if !existing.is_empty() {
            client.insert_many(&existing, "people").unwrap();
        }
        let hits = existing.iter().filter(|p| p.id == id).count() as u64;

        prop_assert_eq!(client.delete(&person(id, ""), "people", &["id"]).unwrap(), hits);
        let after: Vec<Person> = client.fetch_range("people", 0, -1).unwrap();
        prop_assert!(after.iter().all(|p| p.id != id));
        prop_assert_eq!(after.len() as u64, existing.len() as u64 - hits);
    }

    #[test]
    fn inserted_record_is_found_by_its_own_keys(id in any::<i64>(), name in "\\PC{0,12}") {
        let mut client = DataClient::new(MemoryKv::redis());
        let p = person(id, &name);
        client.insert(&p, "people").unwrap();
        prop_assert_eq!(client.update(&p, "people", &["id", "name"]).unwrap(), 1);
        let after: Vec<Person> = client.fetch_range("people", 0, -1).unwrap();
        prop_assert_eq!(after, vec![p]);
    }

    #[test]
    fn put_table_twice_changes_nothing_the_second_time(existing in people()) {
        let mut client = DataClient::new(MemoryKv::etcd());
        let rows = existing.iter().map(|p| person_record(p.id, &p.name)).collect();
        let table = Table::from_records(rows).with_key_columns(&["id", "name"]);
        client.put_table("people", table.clone()).unwrap();
        prop_assert_eq!(client.put_table("people", table).unwrap(), 0);
    }

    #[test]
    fn failed_batch_commits_nothing(len in 1usize..6, failing in 0usize..6) {
        let failing = failing % len;
        let store = MemorySql::new(BackendKind::Sqlite);
        store.fail_when(format!("t{};", failing));
        let mut client = DataClient::new(store.clone());
        let batch = (0..len).fold(Batch::new(), |b, i| {
            b.push(Statement::new(format!("DELETE FROM t{};", i)))
        });
        prop_assert!(client.execute_transaction(batch).is_err());
        prop_assert!(store.journal().is_empty());
        prop_assert_eq!(store.commits(), 0);
    }
}
