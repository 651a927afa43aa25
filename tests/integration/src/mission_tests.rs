//! Mission-based Integration Tests
//!
//! Production scenarios for sharing code between client applications, one
//! mission per user-visible capability.

use std::time::{Duration, Instant};

use fanout_core::{Error, FanoutConfig, SessionRegistry, Workspace};
use fanout_fs::NormalizedPath;
use fanout_test_utils::TestWorkspace;

fn open(ws: &TestWorkspace) -> Workspace {
    Workspace::open(ws.root()).unwrap()
}

// =============================================================================
// Mission 1: Sharing
// =============================================================================

mod m1_sharing {
    use super::*;

    #[test]
    fn m1_1_share_module_with_two_clients() {
        let ws = TestWorkspace::new().with_client("web").with_client("admin");
        ws.write_shared("library/server/address.ts", "addr");
        ws.write_shared("library/server/routes/index.ts", "routes");
        let workspace = open(&ws);

        workspace.share("library/server", "web").unwrap();
        workspace.share("library/server", "admin").unwrap();

        for client in ["web", "admin"] {
            ws.assert_file_content(
                &format!("clients/{client}/src/shared/library/server/routes/index.ts"),
                "routes",
            );
        }
    }

    #[test]
    fn m1_2_share_file_at_shared_root() {
        let ws = TestWorkspace::new().with_client("web");
        ws.write_shared("index.ts", "root");
        let workspace = open(&ws);

        let outcome = workspace.share("/index.ts", "web").unwrap();

        assert_eq!(outcome.path, "index.ts");
        ws.assert_file_content("clients/web/src/shared/index.ts", "root");
    }

    #[test]
    fn m1_3_module_supersedes_earlier_files() {
        let ws = TestWorkspace::new().with_client("web");
        ws.write_shared("a/b/c.ts", "c");
        ws.write_shared("a/b/d.ts", "d");
        let workspace = open(&ws);

        workspace.share("a/b/c.ts", "web").unwrap();
        workspace.share("a/b/d.ts", "web").unwrap();
        let outcome = workspace.share("a/b/", "web").unwrap();

        assert_eq!(outcome.pruned.files.len(), 2);
        let log = workspace.load_log().unwrap();
        let record = log.client("web").unwrap();
        assert!(record.files().is_empty());
        assert_eq!(record.modules(), ["a/b/".to_string()]);
    }

    #[test]
    fn m1_4_rejections_do_not_touch_log() {
        let ws = TestWorkspace::new().with_client("web");
        ws.write_shared("a/nested/x.ts", "x");
        let workspace = open(&ws);
        workspace.share("a", "web").unwrap();
        let before = ws.read("clients/shared/.log");

        assert!(matches!(
            workspace.share("a/nested", "web"),
            Err(Error::AlreadyShared { .. })
        ));
        assert!(matches!(
            workspace.share("a/nested/x.ts", "web"),
            Err(Error::AlreadyShared { .. })
        ));
        assert!(matches!(
            workspace.share("missing", "web"),
            Err(Error::NotFound { .. })
        ));
        assert!(matches!(
            workspace.share("a", "nobody"),
            Err(Error::UnknownClient { .. })
        ));

        assert_eq!(ws.read("clients/shared/.log"), before);
    }
}

// =============================================================================
// Mission 2: Keeping mirrors current
// =============================================================================

mod m2_reconcile {
    use super::*;

    #[test]
    fn m2_1_upstream_edit_then_sync() {
        let ws = TestWorkspace::new().with_client("web");
        let shared = ws.write_shared("comp/button.ts", "v1");
        ws.age(&shared, 60);
        let workspace = open(&ws);
        workspace.share("comp", "web").unwrap();

        ws.write_shared("comp/button.ts", "v2");
        let summary = workspace.sync_all().unwrap();

        assert_eq!(summary.copied(), 1);
        ws.assert_file_content("clients/web/src/shared/comp/button.ts", "v2");
    }

    #[test]
    fn m2_2_new_file_in_module_appears() {
        let ws = TestWorkspace::new().with_client("web");
        let first = ws.write_shared("comp/a.ts", "a");
        ws.age(&first, 60);
        let workspace = open(&ws);
        workspace.share("comp", "web").unwrap();

        ws.write_shared("comp/new/b.ts", "b");
        workspace.sync_all().unwrap();

        ws.assert_file_content("clients/web/src/shared/comp/new/b.ts", "b");
    }

    #[test]
    fn m2_3_deleted_single_file_survives_in_mirror() {
        let ws = TestWorkspace::new().with_client("web");
        ws.write_shared("lib/a.ts", "a");
        let workspace = open(&ws);
        workspace.share("lib/a.ts", "web").unwrap();

        ws.remove_shared("lib/a.ts");
        let report = workspace.sync_client("web").unwrap();

        assert_eq!(report.skipped, vec!["lib/a.ts".to_string()]);
        ws.assert_file_exists("clients/web/src/shared/lib/a.ts");
    }

    #[test]
    fn m2_4_repeated_sync_is_stable() {
        let ws = TestWorkspace::new().with_client("web");
        ws.write_shared("comp/a.ts", "a");
        ws.write_shared("lib/b.ts", "b");
        let workspace = open(&ws);
        workspace.share("comp", "web").unwrap();
        workspace.share("lib/b.ts", "web").unwrap();
        let snapshot = ws.snapshot(&ws.mirror_root("web"));

        for _ in 0..3 {
            assert!(workspace.sync_all().unwrap().is_noop());
        }
        assert_eq!(ws.snapshot(&ws.mirror_root("web")), snapshot);
    }
}

// =============================================================================
// Mission 3: Live sync while clients run
// =============================================================================

mod m3_watch {
    use super::*;

    #[test]
    fn m3_1_edits_flow_until_last_session_ends() {
        let ws = TestWorkspace::new().with_client("web").with_client("admin");
        let shared = ws.write_shared("comp/a.ts", "v1");
        ws.age(&shared, 60);
        let config = FanoutConfig {
            poll_interval_ms: 10,
            ..FanoutConfig::default()
        };
        let workspace = Workspace::with_config(NormalizedPath::new(ws.root()), config);
        workspace.share("comp", "web").unwrap();
        workspace.share("comp", "admin").unwrap();

        let registry = SessionRegistry::new();
        let web = registry.start("web");
        let admin = registry.start("admin");
        let handle = workspace.scheduler(registry.clone()).spawn().unwrap();

        ws.write_shared("comp/a.ts", "v2");
        let deadline = Instant::now() + Duration::from_secs(10);
        let caught_up = loop {
            let done = ["web", "admin"].iter().all(|c| {
                std::fs::read_to_string(ws.mirror_path(c, "comp/a.ts")).is_ok_and(|s| s == "v2")
            });
            if done || Instant::now() > deadline {
                break done;
            }
            std::thread::sleep(Duration::from_millis(10));
        };

        drop(web);
        assert!(registry.is_active("admin"));
        drop(admin);
        let passes = handle.join().unwrap().unwrap();

        assert!(caught_up);
        assert!(passes >= 1);
    }
}

// =============================================================================
// Mission 4: Custom layout
// =============================================================================

mod m4_layout {
    use super::*;

    #[test]
    fn m4_1_config_file_moves_shared_tree_and_log() {
        let ws = TestWorkspace::new();
        ws.write(
            "fanout.toml",
            "shared_dir = \"common\"\nclients_dir = \"apps\"\nmirror_subdir = \"vendor\"\nlog_file = \"subscriptions.json\"\n",
        );
        ws.write("common/util.ts", "util");
        std::fs::create_dir_all(ws.path("apps/web")).unwrap();
        let workspace = open(&ws);

        workspace.share("util.ts", "web").unwrap();

        ws.assert_file_content("apps/web/vendor/util.ts", "util");
        let log: serde_json::Value =
            serde_json::from_str(&ws.read("common/subscriptions.json")).unwrap();
        assert_eq!(log["web"]["path"], "apps/web/vendor");
    }
}
