use fanout_fs::{Error, NormalizedPath, SharePath, validate_segment};
use rstest::rstest;

#[test]
fn test_normalize_backslashes_to_forward() {
    let path = NormalizedPath::new("clients\\shared\\comp");
    assert_eq!(path.as_str(), "clients/shared/comp");
}

#[test]
fn test_join_paths() {
    let base = NormalizedPath::new("clients/app");
    assert_eq!(base.join("src/shared").as_str(), "clients/app/src/shared");
}

#[test]
fn test_join_empty_segment_is_identity() {
    let base = NormalizedPath::new("clients/app");
    assert_eq!(base.join(""), base);
}

#[test]
fn test_parent_and_file_name() {
    let path = NormalizedPath::new("clients/shared/comp/x.ts");
    assert_eq!(path.file_name(), Some("x.ts"));
    assert_eq!(path.parent().unwrap().as_str(), "clients/shared/comp");
}

#[rstest]
#[case("comp", "comp/")]
#[case("comp/", "comp/")]
#[case("/library/server", "library/server/")]
#[case("./library//server/", "library/server/")]
#[case("library\\server", "library/server/")]
fn test_module_normalization(#[case] raw: &str, #[case] expected: &str) {
    assert_eq!(SharePath::module(raw).unwrap().as_str(), expected);
}

#[rstest]
#[case("lib/a.ts", "lib/a.ts")]
#[case("/lib/a.ts", "lib/a.ts")]
#[case("a.ts", "a.ts")]
#[case("/a.ts", "a.ts")]
#[case("library/server/address.ts", "library/server/address.ts")]
fn test_file_normalization(#[case] raw: &str, #[case] expected: &str) {
    assert_eq!(SharePath::file(raw).unwrap().as_str(), expected);
}

#[rstest]
#[case("")]
#[case("/")]
#[case("./")]
#[case("../outside")]
#[case("comp/../../etc")]
fn test_invalid_share_paths(#[case] raw: &str) {
    assert!(matches!(SharePath::module(raw), Err(Error::InvalidPath { .. })));
    assert!(matches!(SharePath::file(raw), Err(Error::InvalidPath { .. })));
}

#[rstest]
#[case("app", true)]
#[case("donation-site", true)]
#[case("", false)]
#[case("..", false)]
#[case("a/b", false)]
#[case("a\\b", false)]
fn test_validate_segment(#[case] name: &str, #[case] ok: bool) {
    assert_eq!(validate_segment(name).is_ok(), ok);
}

#[test]
fn test_file_path_is_never_module() {
    let file = SharePath::file("comp/x.ts").unwrap();
    assert!(!file.is_module());
    assert!(!file.covers("comp/x.ts"));
    assert_eq!(file.file_name(), "x.ts");
}
