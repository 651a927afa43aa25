//! End-to-end integration test for the share flow
//!
//! This test exercises the complete flow: subscribe module -> mirror ->
//! subscribe file -> mirror -> delete upstream -> reconcile.

use fanout_core::{ShareKind, Workspace};
use fanout_test_utils::TestWorkspace;
use serde_json::json;

#[test]
fn share_module_then_file_then_propagate_deletion() {
    let ws = TestWorkspace::new().with_client("app");
    ws.write_shared("lib/a.ts", "export const a = 1;");
    ws.write_shared("comp/x.ts", "export const x = 1;");
    std::fs::create_dir_all(ws.mirror_root("app")).unwrap();
    let workspace = Workspace::open(ws.root()).unwrap();
    let subscriber = workspace.subscriber();

    // Module subscription
    subscriber.subscribe("comp", "app", ShareKind::Module).unwrap();
    let log: serde_json::Value = serde_json::from_str(&ws.read("clients/shared/.log")).unwrap();
    assert_eq!(log["app"]["module"], json!(["comp/"]));
    assert_eq!(log["app"]["file"], json!([]));
    ws.assert_file_content("clients/app/src/shared/comp/x.ts", "export const x = 1;");

    // File subscription creates intermediate directories
    subscriber.subscribe("lib/a.ts", "app", ShareKind::File).unwrap();
    let log: serde_json::Value = serde_json::from_str(&ws.read("clients/shared/.log")).unwrap();
    assert_eq!(log["app"]["file"], json!(["lib/a.ts"]));
    ws.assert_file_content("clients/app/src/shared/lib/a.ts", "export const a = 1;");

    // Deletion upstream propagates on the next pass
    ws.remove_shared("comp/x.ts");
    let report = workspace.sync_client("app").unwrap();
    assert_eq!(report.removed, vec!["comp/x.ts".to_string()]);
    ws.assert_file_not_exists("clients/app/src/shared/comp/x.ts");
    ws.assert_file_exists("clients/app/src/shared/lib/a.ts");

    // And the tree is now stable
    assert!(workspace.sync_all().unwrap().is_noop());
}
