//! Clients used from several threads.

use std::thread;

use datacom::{DataClient, MemoryKv};

use crate::{person, Person};

#[test]
fn clients_sharing_a_store_see_each_others_writes() {
    let store = MemoryKv::redis();
    let handles: Vec<_> = (0..4)
        .map(|t| {
            let store = store.clone();
            thread::spawn(move || {
                let mut client = DataClient::new(store);
                for i in 0..5 {
                    client.set(&format!("k{}-{}", t, i), "v").unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let mut client = DataClient::new(store);
    for t in 0..4 {
        for i in 0..5 {
            assert_eq!(client.get(&format!("k{}-{}", t, i)).unwrap().as_deref(), Some("v"));
        }
    }
}

#[test]
fn client_moves_between_threads() {
    let mut client = DataClient::new(MemoryKv::etcd());
    client.insert(&person(1, "a"), "people").unwrap();
    let mut client = thread::spawn(move || {
        client.insert(&person(2, "b"), "people").unwrap();
        client
    })
    .join()
    .unwrap();
    let people: Vec<Person> = client.fetch_range("people", 0, -1).unwrap();
    assert_eq!(people.len(), 2);
}
