//! Integration tests for the `shelf` CLI.
//!
//! Each test creates a temp workspace, runs `shelf` as a subprocess,
//! and verifies stdout and/or the files under `.shelf/`.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Get the path to the built `shelf` binary.
fn shelf_bin() -> PathBuf {
    // cargo test builds to target/debug/
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("shelf");
    path
}

const CONFIG: &str = r#"[shelf]
name = "test-shelf"

[browse]
page_size = 20
"#;

/// Create a small workspace: an HR folder with a Payroll subfolder, a
/// Finance folder whose only subfolder is reached through an untagged
/// `2024` folder, and one prompt library.
fn create_test_workspace(root: &Path) {
    create_workspace_with_config(root, CONFIG);
}

fn create_workspace_with_config(root: &Path, config: &str) {
    let shelf_dir = root.join(".shelf");
    fs::create_dir_all(&shelf_dir).unwrap();
    fs::write(shelf_dir.join("shelf.toml"), config).unwrap();

    fs::write(
        shelf_dir.join("tags.json"),
        r#"[
  {"id": "t1", "name": "HR", "path": "", "type": "document", "item_ids": ["d1", "d2"]},
  {"id": "t2", "name": "Payroll", "path": "HR", "type": "document", "item_ids": ["d2", "d3"]},
  {"id": "t3", "name": "Finance", "path": null, "type": "document", "item_ids": ["d4"]},
  {"id": "t4", "name": "Budgets", "path": "Finance/2024", "type": "document", "item_ids": ["d5"]},
  {"id": "p1", "name": "Summaries", "path": "", "type": "prompt", "item_ids": ["pa"]}
]"#,
    )
    .unwrap();

    fs::write(
        shelf_dir.join("items.json"),
        r#"[
  {"id": "d1", "name": "Handbook", "tag_ids": ["t1"]},
  {"id": "d2", "name": "Salary bands", "tag_ids": ["t1", "t2"]},
  {"id": "d3", "name": "Payslip template", "tag_ids": ["t2"]},
  {"id": "d4", "name": "Ledger", "tag_ids": ["t3"]},
  {"id": "d5", "name": "Q1 budget", "tag_ids": ["t4"]},
  {"id": "pa", "name": "Summarize", "tag_ids": ["p1"]}
]"#,
    )
    .unwrap();
}

/// Run `shelf` with the given args in the given directory, returning (stdout, stderr, success).
fn run_shelf(dir: &Path, args: &[&str]) -> (String, String, bool) {
    let output = Command::new(shelf_bin())
        .args(args)
        .current_dir(dir)
        .env_remove("SHELF_LOG")
        .output()
        .expect("failed to run shelf");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

/// Run `shelf` expecting success, return stdout.
fn run_shelf_ok(dir: &Path, args: &[&str]) -> String {
    let (stdout, stderr, success) = run_shelf(dir, args);
    if !success {
        panic!(
            "shelf {:?} failed:\nstdout: {}\nstderr: {}",
            args, stdout, stderr
        );
    }
    stdout
}

/// Run `shelf` expecting failure, return stderr.
fn run_shelf_err(dir: &Path, args: &[&str]) -> String {
    let (stdout, stderr, success) = run_shelf(dir, args);
    if success {
        panic!("shelf {:?} unexpectedly succeeded:\nstdout: {}", args, stdout);
    }
    stderr
}

fn read_json(root: &Path, file: &str) -> serde_json::Value {
    let text = fs::read_to_string(root.join(".shelf").join(file)).unwrap();
    serde_json::from_str(&text).unwrap()
}

fn item_tags(root: &Path, item_id: &str) -> Vec<String> {
    let items = read_json(root, "items.json");
    let item = items
        .as_array()
        .unwrap()
        .iter()
        .find(|i| i["id"] == item_id)
        .unwrap();
    item["tag_ids"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap().to_string())
        .collect()
}

// ---------------------------------------------------------------------------
// Tree and read command tests
// ---------------------------------------------------------------------------

#[test]
fn test_tree_collapsed_by_default() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_workspace(tmp.path());

    let out = run_shelf_ok(tmp.path(), &["tree"]);
    assert_eq!(out, "▸ [ ] Finance (2)\n▸ [ ] HR (3)\n");
}

#[test]
fn test_tree_all() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_workspace(tmp.path());

    let out = run_shelf_ok(tmp.path(), &["tree", "--all"]);
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(
        lines,
        vec![
            "▾ [ ] Finance (2)",
            "  ▾ [ ] 2024 (1)",
            "    ▾ [ ] Budgets (1)",
            "      [ ] Q1 budget (d5)",
            "  [ ] Ledger (d4)",
            "▾ [ ] HR (3)",
            "  ▾ [ ] Payroll (2)",
            "    [ ] Salary bands (d2)",
            "    [ ] Payslip template (d3)",
            "  [ ] Handbook (d1)",
            "  [ ] Salary bands (d2)",
        ]
    );
}

#[test]
fn test_tree_other_library() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_workspace(tmp.path());

    let out = run_shelf_ok(tmp.path(), &["tree", "--type", "prompt"]);
    assert_eq!(out, "▸ [ ] Summaries (1)\n");
}

#[test]
fn test_tree_unknown_library_type() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_workspace(tmp.path());

    let err = run_shelf_err(tmp.path(), &["tree", "--type", "videos"]);
    assert!(err.contains("unknown library type"));
}

#[test]
fn test_tree_json() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_workspace(tmp.path());

    let out = run_shelf_ok(tmp.path(), &["tree", "--json"]);
    let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
    let folders = parsed.as_array().unwrap();
    assert_eq!(folders.len(), 2);
    assert_eq!(folders[1]["full"], "HR");
    assert_eq!(folders[1]["count"], 3);
    assert_eq!(folders[1]["state"], "unchecked");
    assert_eq!(folders[1]["children"][0]["full"], "HR/Payroll");
}

#[test]
fn test_search_expands_matching_folders() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_workspace(tmp.path());

    let out = run_shelf_ok(tmp.path(), &["tree", "--search", "BUDGET"]);
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(
        lines,
        vec![
            "▾ [ ] Finance (2)",
            "  ▾ [ ] 2024 (1)",
            "    ▾ [ ] Budgets (1)",
            "      [ ] Q1 budget (d5) *",
            "  [ ] Ledger (d4)",
            "▸ [ ] HR (3)",
        ]
    );

    // Expansion sticks after the search
    let out = run_shelf_ok(tmp.path(), &["tree"]);
    assert!(out.contains("    ▾ [ ] Budgets (1)"));
    assert!(out.contains("▸ [ ] HR (3)"));
}

#[test]
fn test_saved_search_follows_item_changes() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_workspace(tmp.path());

    run_shelf_ok(tmp.path(), &["tree", "--search", "budget"]);
    fs::write(
        tmp.path().join(".shelf/items.json"),
        r#"[
  {"id": "d1", "name": "Budget handbook", "tag_ids": ["t1"]},
  {"id": "d2", "name": "Salary bands", "tag_ids": ["t1", "t2"]},
  {"id": "d3", "name": "Payslip template", "tag_ids": ["t2"]},
  {"id": "d4", "name": "Ledger", "tag_ids": ["t3"]},
  {"id": "d5", "name": "Q1 forecast", "tag_ids": ["t4"]}
]"#,
    )
    .unwrap();

    let out = run_shelf_ok(tmp.path(), &["tree"]);
    assert_eq!(
        out,
        "▸ [ ] Finance (2)\n\
         ▾ [ ] HR (3)\n\
         \x20 ▸ [ ] Payroll (2)\n\
         \x20 [ ] Budget handbook (d1) *\n\
         \x20 [ ] Salary bands (d2)\n"
    );

    // An empty query ends the search but keeps what it opened
    let out = run_shelf_ok(tmp.path(), &["tree", "--search", ""]);
    assert!(out.contains("▾ [ ] HR (3)"));
    assert!(!out.contains('*'));

    run_shelf_ok(tmp.path(), &["expand", "Finance"]);
    let out = run_shelf_ok(tmp.path(), &["tree"]);
    assert!(out.contains("▾ [ ] Finance (2)"));
    assert!(out.contains("▾ [ ] HR (3)"));
    assert!(!out.contains('*'));
}

#[test]
fn test_search_replaces_manual_expansion() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_workspace(tmp.path());

    run_shelf_ok(tmp.path(), &["expand", "HR"]);
    let out = run_shelf_ok(tmp.path(), &["tree", "--search", "ledger"]);
    assert!(out.contains("▾ [ ] Finance (2)"));
    assert!(out.contains("▸ [ ] HR (3)"));
}

#[test]
fn test_invalid_search_pattern() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_workspace(tmp.path());

    let err = run_shelf_err(tmp.path(), &["tree", "--search", "("]);
    assert!(err.contains("invalid search pattern"));
}

#[test]
fn test_expand_and_collapse() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_workspace(tmp.path());

    assert_eq!(run_shelf_ok(tmp.path(), &["expand", "HR"]), "expanded HR\n");
    let out = run_shelf_ok(tmp.path(), &["tree"]);
    assert!(out.contains("▾ [ ] HR (3)"));
    assert!(out.contains("  ▸ [ ] Payroll (2)"));
    assert!(out.contains("  [ ] Handbook (d1)"));

    run_shelf_ok(tmp.path(), &["collapse", "HR"]);
    let out = run_shelf_ok(tmp.path(), &["tree"]);
    assert_eq!(out, "▸ [ ] Finance (2)\n▸ [ ] HR (3)\n");
}

#[test]
fn test_expand_missing_folder() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_workspace(tmp.path());

    let err = run_shelf_err(tmp.path(), &["expand", "Legal"]);
    assert!(err.contains("no folder \"Legal\""));
}

#[test]
fn test_ls() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_workspace(tmp.path());

    let out = run_shelf_ok(tmp.path(), &["ls", "HR"]);
    assert_eq!(
        out,
        "▸ [ ] Payroll (2)\n[ ] Handbook (d1)\n[ ] Salary bands (d2)\n"
    );
}

#[test]
fn test_ls_untagged_folder() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_workspace(tmp.path());

    let out = run_shelf_ok(tmp.path(), &["ls", "Finance/2024"]);
    assert_eq!(out, "▸ [ ] Budgets (1)\n");
}

#[test]
fn test_count() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_workspace(tmp.path());

    assert_eq!(run_shelf_ok(tmp.path(), &["count", "HR"]), "HR: 3\n");
    assert_eq!(run_shelf_ok(tmp.path(), &["count", "/HR//Payroll/"]), "HR/Payroll: 2\n");
    assert_eq!(run_shelf_ok(tmp.path(), &["count", "Finance/2024"]), "Finance/2024: 1\n");
}

#[test]
fn test_count_json() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_workspace(tmp.path());

    let out = run_shelf_ok(tmp.path(), &["count", "Finance", "--json"]);
    let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(parsed["total"], 2);
    assert_eq!(parsed["ids"], serde_json::json!(["d4", "d5"]));
}

#[test]
fn test_browse_pages() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_workspace(tmp.path());

    let out = run_shelf_ok(tmp.path(), &["browse", "HR", "--limit", "1"]);
    assert_eq!(out, "[ ] Handbook (d1)\nshowing 1 of 2 (--pages 2 for more)\n");

    let out = run_shelf_ok(tmp.path(), &["browse", "HR", "--limit", "1", "--all"]);
    assert_eq!(out, "[ ] Handbook (d1)\n[ ] Salary bands (d2)\n2 items\n");
}

#[test]
fn test_browse_untagged_folder_needs_subtree() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_workspace(tmp.path());

    let err = run_shelf_err(tmp.path(), &["browse", "Finance/2024"]);
    assert!(err.contains("has no tag of its own"));

    let out = run_shelf_ok(tmp.path(), &["browse", "Finance/2024", "--subtree"]);
    assert_eq!(out, "[ ] Q1 budget (d5)\n1 item\n");
}

#[test]
fn test_browse_json() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_workspace(tmp.path());

    let out = run_shelf_ok(tmp.path(), &["browse", "HR", "--subtree", "--json"]);
    let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(parsed["total"], 3);
    assert_eq!(parsed["loaded"], 3);
    assert_eq!(parsed["items"][2]["id"], "d3");
}

#[test]
fn test_browse_subtree_marks_only_selections_inside_it() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_workspace(tmp.path());

    // d2 is selected under HR, which is outside the Payroll subtree
    run_shelf_ok(tmp.path(), &["select", "d2", "--tag", "t1"]);
    run_shelf_ok(tmp.path(), &["select", "d3", "--tag", "t2"]);
    let out = run_shelf_ok(tmp.path(), &["browse", "HR/Payroll", "--subtree"]);
    assert_eq!(out, "[ ] Salary bands (d2)\n[x] Payslip template (d3)\n2 items\n");

    let out = run_shelf_ok(tmp.path(), &["browse", "HR", "--subtree"]);
    assert_eq!(
        out,
        "[ ] Handbook (d1)\n[x] Salary bands (d2)\n[x] Payslip template (d3)\n3 items\n"
    );
}

#[test]
fn test_browse_zero_limit() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_workspace(tmp.path());

    let err = run_shelf_err(tmp.path(), &["browse", "HR", "--limit", "0"]);
    assert!(err.contains("page size must be at least 1"));
}

// ---------------------------------------------------------------------------
// Selection tests
// ---------------------------------------------------------------------------

#[test]
fn test_select_folder_toggles() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_workspace(tmp.path());

    let out = run_shelf_ok(tmp.path(), &["select-folder", "HR"]);
    assert_eq!(out, "[x] HR (2/2 selected)\n");
    let out = run_shelf_ok(tmp.path(), &["selection"]);
    assert_eq!(out, "d1  under HR (t1)\nd2  under HR (t1)\n");

    // Selected under HR, so not selected in Payroll
    let out = run_shelf_ok(tmp.path(), &["tree", "--all"]);
    assert!(out.contains("▾ [x] HR (3)"));
    assert!(out.contains("  ▾ [ ] Payroll (2)"));
    assert!(out.contains("  [x] Handbook (d1)"));
    assert!(out.contains("    [ ] Salary bands (d2)"));

    let out = run_shelf_ok(tmp.path(), &["select-folder", "HR"]);
    assert_eq!(out, "[ ] HR (0/2 selected)\n");
    assert_eq!(run_shelf_ok(tmp.path(), &["selection"]), "nothing selected\n");
}

#[test]
fn test_partial_folder_selection_clears() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_workspace(tmp.path());

    run_shelf_ok(tmp.path(), &["select", "d3", "--tag", "t2"]);
    let out = run_shelf_ok(tmp.path(), &["tree", "--all"]);
    assert!(out.contains("  ▾ [-] Payroll (2)"));

    // Any selected item means the folder toggle clears
    let out = run_shelf_ok(tmp.path(), &["select-folder", "HR/Payroll"]);
    assert_eq!(out, "[ ] HR/Payroll (0/2 selected)\n");
}

#[test]
fn test_select_folder_without_tag_is_noop() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_workspace(tmp.path());

    let out = run_shelf_ok(tmp.path(), &["select-folder", "Finance/2024"]);
    assert!(out.contains("nothing to select"));
    assert_eq!(run_shelf_ok(tmp.path(), &["selection"]), "nothing selected\n");
}

#[test]
fn test_select_item_not_in_tag() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_workspace(tmp.path());

    let out = run_shelf_ok(tmp.path(), &["select", "d1", "--tag", "t3"]);
    assert_eq!(out, "d1 is not in Finance; nothing to do\n");
    assert_eq!(run_shelf_ok(tmp.path(), &["selection"]), "nothing selected\n");
}

#[test]
fn test_select_moves_context() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_workspace(tmp.path());

    run_shelf_ok(tmp.path(), &["select", "d2", "--tag", "t1"]);
    let out = run_shelf_ok(tmp.path(), &["select", "d2", "--tag", "t2"]);
    assert_eq!(out, "selected d2 under HR/Payroll\n");
    assert_eq!(
        run_shelf_ok(tmp.path(), &["selection"]),
        "d2  under HR/Payroll (t2)\n"
    );

    let out = run_shelf_ok(tmp.path(), &["select", "d2", "--tag", "t2"]);
    assert_eq!(out, "deselected d2 under HR/Payroll\n");
}

#[test]
fn test_selection_shows_current_tag_name() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_workspace(tmp.path());

    run_shelf_ok(tmp.path(), &["select", "d3", "--tag", "t2"]);
    let state = read_json(tmp.path(), ".state.json");
    assert_eq!(state["selection"]["entries"]["d3"]["item_ids"], serde_json::json!([]));

    fs::write(
        tmp.path().join(".shelf/tags.json"),
        r#"[
  {"id": "t1", "name": "HR", "path": "", "type": "document", "item_ids": ["d1", "d2"]},
  {"id": "t2", "name": "Compensation", "path": "HR", "type": "document", "item_ids": ["d2", "d3"]}
]"#,
    )
    .unwrap();
    assert_eq!(
        run_shelf_ok(tmp.path(), &["selection"]),
        "d3  under HR/Compensation (t2)\n"
    );
    let out = run_shelf_ok(tmp.path(), &["selection", "--json"]);
    let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(parsed[0]["folder"], "HR/Compensation");
}

#[test]
fn test_selection_json_and_clear() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_workspace(tmp.path());

    run_shelf_ok(tmp.path(), &["select", "d4", "--tag", "t3"]);
    let out = run_shelf_ok(tmp.path(), &["selection", "--json"]);
    let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(
        parsed,
        serde_json::json!([{"item_id": "d4", "tag_id": "t3", "folder": "Finance"}])
    );

    assert_eq!(run_shelf_ok(tmp.path(), &["clear"]), "cleared 1 selected item\n");
    assert_eq!(run_shelf_ok(tmp.path(), &["selection", "--json"]).trim(), "[]");
}

// ---------------------------------------------------------------------------
// Library mutation tests
// ---------------------------------------------------------------------------

#[test]
fn test_remove_selected() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_workspace(tmp.path());

    run_shelf_ok(tmp.path(), &["select-folder", "HR"]);
    let out = run_shelf_ok(tmp.path(), &["remove"]);
    assert_eq!(out, "removed: 2 applied\n");

    assert!(item_tags(tmp.path(), "d1").is_empty());
    assert_eq!(item_tags(tmp.path(), "d2"), vec!["t2"]);
    assert_eq!(run_shelf_ok(tmp.path(), &["count", "HR"]), "HR: 2\n");
    assert_eq!(run_shelf_ok(tmp.path(), &["selection"]), "nothing selected\n");
}

#[test]
fn test_remove_nothing_selected() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_workspace(tmp.path());

    let err = run_shelf_err(tmp.path(), &["remove"]);
    assert!(err.contains("nothing selected"));
}

#[test]
fn test_remove_json() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_workspace(tmp.path());

    run_shelf_ok(tmp.path(), &["select", "d3", "--tag", "t2"]);
    let out = run_shelf_ok(tmp.path(), &["remove", "--json"]);
    let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(
        parsed,
        serde_json::json!({"action": "removed", "applied": 1, "already_gone": 0})
    );
}

#[test]
fn test_share_selected() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_workspace(tmp.path());

    run_shelf_ok(tmp.path(), &["select", "d4", "--tag", "t3"]);
    let out = run_shelf_ok(tmp.path(), &["share", "t1"]);
    assert_eq!(out, "shared: 1 applied\n");

    assert_eq!(item_tags(tmp.path(), "d4"), vec!["t3", "t1"]);
    assert_eq!(run_shelf_ok(tmp.path(), &["count", "HR"]), "HR: 4\n");
    assert_eq!(run_shelf_ok(tmp.path(), &["selection"]), "nothing selected\n");
}

#[test]
fn test_share_unknown_target() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_workspace(tmp.path());

    run_shelf_ok(tmp.path(), &["select", "d4", "--tag", "t3"]);
    let err = run_shelf_err(tmp.path(), &["share", "t99"]);
    assert!(err.contains("no tag \"t99\""));
}

#[test]
fn test_rm_folder() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_workspace(tmp.path());

    run_shelf_ok(tmp.path(), &["expand", "Finance"]);
    run_shelf_ok(tmp.path(), &["select", "d5", "--tag", "t4"]);
    let out = run_shelf_ok(tmp.path(), &["rm-folder", "Finance"]);
    assert_eq!(out, "deleted: 2 applied\n");

    assert_eq!(run_shelf_ok(tmp.path(), &["tree"]), "▸ [ ] HR (3)\n");
    assert!(item_tags(tmp.path(), "d5").is_empty());
    assert_eq!(run_shelf_ok(tmp.path(), &["selection"]), "nothing selected\n");
    let tags = read_json(tmp.path(), "tags.json");
    assert_eq!(tags.as_array().unwrap().len(), 3);
}

#[test]
fn test_rm_folder_not_permitted() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_workspace_with_config(
        tmp.path(),
        "[shelf]\nname = \"locked\"\n\n[permissions]\ndelete_folders = false\n",
    );

    let err = run_shelf_err(tmp.path(), &["rm-folder", "Finance"]);
    assert!(err.contains("error: You are not allowed to do this (delete folder Finance)"));
    let tags = read_json(tmp.path(), "tags.json");
    assert_eq!(tags.as_array().unwrap().len(), 5);
}

#[test]
fn test_remove_not_permitted_keeps_selection() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_workspace_with_config(
        tmp.path(),
        "[shelf]\nname = \"locked\"\n\n[permissions]\nremove_items = false\nshare_items = false\n",
    );

    run_shelf_ok(tmp.path(), &["select", "d1", "--tag", "t1"]);
    let err = run_shelf_err(tmp.path(), &["remove"]);
    assert!(err.contains("You are not allowed to do this"));
    assert_eq!(item_tags(tmp.path(), "d1"), vec!["t1"]);
    assert_eq!(run_shelf_ok(tmp.path(), &["selection"]), "d1  under HR (t1)\n");
}

// ---------------------------------------------------------------------------
// Session memory tests
// ---------------------------------------------------------------------------

#[test]
fn test_context_set_and_show() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_workspace(tmp.path());

    let out = run_shelf_ok(
        tmp.path(),
        &["context", "set", "s1", "--library", "t1,t2", "--policy", "text"],
    );
    assert!(out.contains("libraries: t1, t2"));
    assert!(out.contains("policy:    text"));
    assert!(
        tmp.path()
            .join(".shelf/sessions/chat-ctx-s1.json")
            .exists()
    );

    let out = run_shelf_ok(tmp.path(), &["context", "show", "s1"]);
    assert!(out.contains("session:   s1"));
    assert!(out.contains("prompts:   -"));
    assert!(out.contains("saved:"));

    // Updating one field keeps the others
    let out = run_shelf_ok(tmp.path(), &["context", "set", "s1", "--prompt", "pa"]);
    assert!(out.contains("libraries: t1, t2"));
    assert!(out.contains("prompts:   pa"));
}

#[test]
fn test_context_sessions_are_separate() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_workspace(tmp.path());

    run_shelf_ok(tmp.path(), &["context", "set", "s1", "--library", "t1"]);
    let out = run_shelf_ok(tmp.path(), &["context", "show", "s2"]);
    assert_eq!(out, "session s2 has no saved context\n");
    assert_eq!(run_shelf_ok(tmp.path(), &["context", "show", "s2", "--json"]).trim(), "null");
}

#[test]
fn test_context_corrupt_memory_starts_empty() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_workspace(tmp.path());

    let sessions = tmp.path().join(".shelf/sessions");
    fs::create_dir_all(&sessions).unwrap();
    fs::write(sessions.join("chat-ctx-s1.json"), "{ not json").unwrap();

    let out = run_shelf_ok(tmp.path(), &["context", "show", "s1"]);
    assert_eq!(out, "session s1 has no saved context\n");
}

#[test]
fn test_context_bad_policy() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_workspace(tmp.path());

    let err = run_shelf_err(tmp.path(), &["context", "set", "s1", "--policy", "fuzzy"]);
    assert!(err.contains("unknown search policy"));
}

// ---------------------------------------------------------------------------
// Workspace tests
// ---------------------------------------------------------------------------

#[test]
fn test_init_then_empty_tree() {
    let tmp = tempfile::TempDir::new().unwrap();

    let out = run_shelf_ok(tmp.path(), &["init", "--name", "KB"]);
    assert!(out.contains("Initialized shelf workspace: KB"));
    assert!(tmp.path().join(".shelf/shelf.toml").exists());
    assert!(tmp.path().join(".shelf/tags.json").exists());

    let out = run_shelf_ok(tmp.path(), &["tree"]);
    assert_eq!(out, "no folders in the document library\n");

    let err = run_shelf_err(tmp.path(), &["init"]);
    assert!(err.contains("already exists"));
    run_shelf_ok(tmp.path(), &["init", "--force"]);
}

#[test]
fn test_not_a_workspace() {
    let tmp = tempfile::TempDir::new().unwrap();

    let err = run_shelf_err(tmp.path(), &["tree"]);
    assert!(err.contains("not a shelf workspace"));
}

#[test]
fn test_dir_flag_and_subdirectory_discovery() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_workspace(tmp.path());
    let other = tempfile::TempDir::new().unwrap();

    let ws = tmp.path().to_str().unwrap();
    let out = run_shelf_ok(other.path(), &["-C", ws, "count", "HR"]);
    assert_eq!(out, "HR: 3\n");

    let sub = tmp.path().join("notes/drafts");
    fs::create_dir_all(&sub).unwrap();
    assert_eq!(run_shelf_ok(&sub, &["count", "HR"]), "HR: 3\n");
}

#[test]
fn test_stale_selection_is_pruned() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_workspace(tmp.path());

    run_shelf_ok(tmp.path(), &["select", "d1", "--tag", "t1"]);
    fs::write(
        tmp.path().join(".shelf/items.json"),
        r#"[{"id": "d2", "name": "Salary bands", "tag_ids": ["t1", "t2"]}]"#,
    )
    .unwrap();
    assert_eq!(run_shelf_ok(tmp.path(), &["selection"]), "nothing selected\n");
}
