//! Documented end-to-end scenarios.

use datacom::{
    BackendKind, Batch, DataClient, Error, HookStage, MemoryKv, MemorySql, Statement, Table,
};
use serde_json::json;

use crate::{person, person_record, Person};

#[test]
fn list_store_insert_update_delete() {
    for store in [MemoryKv::redis(), MemoryKv::etcd()] {
        let mut client = DataClient::new(store.clone());

        assert_eq!(client.insert(&person(1, "a"), "people").unwrap(), 1);
        assert_eq!(store.entries("people").unwrap(), vec![r#"{"id":1,"name":"a"}"#]);

        assert_eq!(client.update(&person(1, "b"), "people", &["id"]).unwrap(), 1);
        assert_eq!(store.entries("people").unwrap(), vec![r#"{"id":1,"name":"b"}"#]);

        assert_eq!(client.delete(&person(1, "b"), "people", &["id"]).unwrap(), 1);
        assert!(store.entries("people").unwrap().is_empty());
    }
}

#[test]
fn update_with_no_match_appends_once() {
    let mut client = DataClient::new(MemoryKv::redis());
    client.insert(&person(1, "a"), "people").unwrap();
    assert_eq!(client.update(&person(5, "e"), "people", &["id"]).unwrap(), 1);
    assert_eq!(client.update(&person(5, "f"), "people", &["id"]).unwrap(), 1);
    let people: Vec<Person> = client.fetch_range("people", 0, -1).unwrap();
    assert_eq!(people, vec![person(1, "a"), person(5, "f")]);
}

#[test]
fn batch_after_hook_rejection_leaves_no_trace() {
    let store = MemorySql::new(BackendKind::Sqlite);
    let mut client = DataClient::new(store.clone());
    let batch = Batch::new()
        .push(Statement::new("INSERT INTO a (x) VALUES (@x)").bind("x", 1i64))
        .push(Statement::new("INSERT INTO a (x) VALUES (@x)").bind("x", 2i64))
        .after(|_| Err("reject".into()));

    match client.execute_transaction(batch) {
        Err(Error::CommandRejected { stage, reason, .. }) => {
            assert_eq!(stage, HookStage::After);
            assert_eq!(reason, "reject");
        }
        other => panic!("expected CommandRejected, got {:?}", other),
    }
    assert!(store.journal().is_empty());
    assert_eq!(store.rollbacks(), 1);
}

#[test]
fn batch_failure_at_any_position_rolls_back_everything() {
    for failing in 0..4 {
        let store = MemorySql::new(BackendKind::PostgreSql);
        store.fail_when(format!("t{}", failing));
        let mut client = DataClient::new(store.clone());
        let batch = (0..4).fold(Batch::new(), |b, i| {
            b.push(Statement::new(format!("DELETE FROM t{}", i)))
        });
        assert!(client.execute_transaction(batch).is_err());
        assert!(store.journal().is_empty(), "failing at {}", failing);
    }
}

#[test]
fn before_hook_rejection_skips_the_command() {
    let store = MemorySql::new(BackendKind::MySql);
    let mut client = DataClient::new(store.clone());
    let batch = Batch::new()
        .push(Statement::new("DELETE FROM audit"))
        .before(|| Err("audit is append-only".into()));
    let err = client.execute_transaction(batch).unwrap_err();
    assert_eq!(
        err,
        Error::CommandRejected {
            stage: HookStage::Before,
            reason: "audit is append-only".into(),
            command: "DELETE FROM audit".into(),
        }
    );
    assert_eq!(
        err.to_string(),
        "[before hook rejected] audit is append-only [command] DELETE FROM audit"
    );
}

#[test]
fn hooks_see_affected_counts() {
    let store = MemorySql::new(BackendKind::SqlServer);
    store.set_rows_affected(3);
    let mut client = DataClient::new(store.clone());
    let batch = Batch::new()
        .push(Statement::new("UPDATE stock SET qty=0"))
        .after(|n| if n == 3 { Ok(()) } else { Err("unexpected count".into()) });
    assert_eq!(client.execute_transaction(batch).unwrap(), 3);
    assert_eq!(store.commits(), 1);
}

#[test]
fn unsupported_combinations_are_reported() {
    let mut client = DataClient::new(MemoryKv::etcd());
    assert!(matches!(
        client.execute_raw("DELETE FROM x"),
        Err(Error::UnsupportedOperation { .. })
    ));
    let mut client = DataClient::new(MemorySql::new(BackendKind::Odbc));
    assert!(matches!(
        client.fetch::<Person>("people", 0),
        Err(Error::UnsupportedOperation { .. })
    ));
}

#[test]
fn cassandra_get_returns_rows_as_json_array() {
    let store = MemorySql::cassandra("ks");
    store.set_table(
        "SELECT * FROM ks.people",
        Table::from_records(vec![person_record(1, "a"), person_record(2, "b")]),
    );
    let mut client = DataClient::new(store);
    let text = client.get("people").unwrap().unwrap();
    let rows: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(rows, json!([{"id": 1, "name": "a"}, {"id": 2, "name": "b"}]));
}

#[test]
fn list_store_table_is_stored_as_json() {
    let store = MemoryKv::etcd();
    let mut client = DataClient::new(store.clone());
    let table = Table::from_records(vec![person_record(1, "a")]).with_key_columns(&["id"]);
    client.put_table("people_table", table.clone()).unwrap();
    let stored: serde_json::Value =
        serde_json::from_str(&store.value("people_table").unwrap()).unwrap();
    assert_eq!(stored["key_columns"], json!(["id"]));
    assert_eq!(stored["rows"], json!([{"id": 1, "name": "a"}]));
    assert_eq!(client.get_table("people_table").unwrap(), Some(table));
}
