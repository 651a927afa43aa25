//! Tests for serialized access to the subscription log

use std::sync::{Arc, Barrier};
use std::thread;

use fanout_core::Workspace;
use fanout_test_utils::TestWorkspace;

#[test]
fn concurrent_subscribes_are_all_recorded() {
    let ws = TestWorkspace::new().with_client("app");
    let count = 8;
    for i in 0..count {
        ws.write_shared(&format!("lib/f{i}.ts"), "x");
    }
    let workspace = Workspace::open(ws.root()).unwrap();
    let barrier = Arc::new(Barrier::new(count));

    let handles: Vec<_> = (0..count)
        .map(|i| {
            let workspace = workspace.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                workspace.share(&format!("lib/f{i}.ts"), "app")
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap().unwrap();
    }

    let log = workspace.load_log().unwrap();
    let mut files = log.client("app").unwrap().files().to_vec();
    files.sort();
    let expected: Vec<String> = (0..count).map(|i| format!("lib/f{i}.ts")).collect();
    assert_eq!(files, expected);
}

#[test]
fn concurrent_duplicate_subscribes_admit_exactly_one() {
    let ws = TestWorkspace::new().with_client("app");
    ws.write_shared("comp/x.ts", "x");
    let workspace = Workspace::open(ws.root()).unwrap();
    let barrier = Arc::new(Barrier::new(4));

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let workspace = workspace.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                workspace.share("comp", "app").is_ok()
            })
        })
        .collect();

    let successes = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .filter(|ok| *ok)
        .count();

    assert_eq!(successes, 1);
    let log = workspace.load_log().unwrap();
    assert_eq!(log.client("app").unwrap().modules(), ["comp/".to_string()]);
}

#[test]
fn reads_never_see_a_torn_log() {
    let ws = TestWorkspace::new().with_client("app");
    for i in 0..20 {
        ws.write_shared(&format!("lib/f{i}.ts"), "x");
    }
    let workspace = Workspace::open(ws.root()).unwrap();

    let writer = {
        let workspace = workspace.clone();
        thread::spawn(move || {
            for i in 0..20 {
                workspace.share(&format!("lib/f{i}.ts"), "app").unwrap();
            }
        })
    };

    for _ in 0..50 {
        workspace.load_log().unwrap();
    }
    writer.join().unwrap();

    assert_eq!(workspace.load_log().unwrap().client("app").unwrap().files().len(), 20);
}
