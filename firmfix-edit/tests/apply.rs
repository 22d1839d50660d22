use camino::{Utf8Path, Utf8PathBuf};
use firmfix_edit::{ApplyOptions, apply_fixes, execute_fixes, preview_patch};
use firmfix_types::{AppliedFix, Fix, Issue, IssueKind, Severity};
use fs_err as fs;
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use tempfile::TempDir;

fn temp_root() -> (TempDir, Utf8PathBuf) {
    let dir = TempDir::new().expect("temp dir");
    let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf8 temp path");
    (dir, root)
}

fn write(root: &Utf8Path, rel: &str, contents: &str) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent");
    }
    fs::write(path, contents).expect("write fixture");
}

fn read(root: &Utf8Path, rel: &str) -> String {
    fs::read_to_string(root.join(rel)).expect("read back")
}

fn fix(file: &str, line: u32, suggestion: &str) -> Fix {
    Fix {
        error: Issue::new(IssueKind::Syntax, Severity::Error, file, line, "Missing semicolon"),
        suggestion: suggestion.to_string(),
        confidence: 0.8,
    }
}

fn ten_lines() -> String {
    (1..=10).map(|i| format!("int v{i};\n")).collect()
}

#[test]
fn line_past_end_is_skipped() {
    let (_tmp, root) = temp_root();
    write(&root, "main.c", &ten_lines());

    let applied = apply_fixes(&root, &[fix("main.c", 1000, "int z;")], &ApplyOptions::default());

    assert!(applied.is_empty());
    assert_eq!(read(&root, "main.c"), ten_lines());
}

#[test]
fn replaces_the_reported_line_with_trimmed_suggestion() {
    let (_tmp, root) = temp_root();
    write(&root, "src/led.c", "int x\nint y;\n");

    let applied = apply_fixes(
        &root,
        &[fix("src/led.c", 1, "  int x = 0;\n")],
        &ApplyOptions::default(),
    );

    assert_eq!(
        applied,
        vec![AppliedFix {
            file: "src/led.c".to_string(),
            line: 1,
            old: "int x".to_string(),
            new: "int x = 0;".to_string(),
        }]
    );
    assert_eq!(read(&root, "src/led.c"), "int x = 0;\nint y;\n");
}

#[test]
fn missing_file_is_skipped_and_others_still_apply() {
    let (_tmp, root) = temp_root();
    write(&root, "a.c", "int a\n");

    let applied = apply_fixes(
        &root,
        &[fix("gone.c", 1, "int g;"), fix("a.c", 1, "int a;")],
        &ApplyOptions::default(),
    );

    assert_eq!(applied.len(), 1);
    assert_eq!(applied[0].file, "a.c");
    assert_eq!(read(&root, "a.c"), "int a;\n");
}

#[test]
fn later_fix_on_same_line_wins() {
    let (_tmp, root) = temp_root();
    write(&root, "a.c", "int a\nint b;\n");

    let applied = apply_fixes(
        &root,
        &[fix("a.c", 1, "int a = 1;"), fix("a.c", 1, "int a = 2;")],
        &ApplyOptions::default(),
    );

    assert_eq!(applied.len(), 2);
    assert_eq!(applied[1].old, "int a = 1;");
    assert_eq!(read(&root, "a.c"), "int a = 2;\nint b;\n");
}

#[test]
fn multi_line_suggestion_keeps_later_line_numbers() {
    let (_tmp, root) = temp_root();
    write(&root, "a.c", "one\ntwo\nthree\n");

    apply_fixes(
        &root,
        &[fix("a.c", 1, "uno\nuno_bis"), fix("a.c", 3, "tres")],
        &ApplyOptions::default(),
    );

    assert_eq!(read(&root, "a.c"), "uno\nuno_bis\ntwo\ntres\n");
}

#[test]
fn reapplying_the_same_fixes_is_idempotent() {
    let (_tmp, root) = temp_root();
    write(&root, "a.c", "int a\nint b\n");
    let fixes = [fix("a.c", 1, "int a;"), fix("a.c", 2, "int b;")];

    apply_fixes(&root, &fixes, &ApplyOptions::default());
    let first = read(&root, "a.c");
    let second_audit = apply_fixes(&root, &fixes, &ApplyOptions::default());

    assert_eq!(read(&root, "a.c"), first);
    assert!(second_audit.iter().all(|a| a.old == a.new));
}

#[test]
fn dry_run_writes_nothing_and_records_nothing() {
    let (_tmp, root) = temp_root();
    write(&root, "a.c", "int a\n");

    let applied = apply_fixes(&root, &[fix("a.c", 1, "int a;")], &ApplyOptions { dry_run: true });

    assert_eq!(applied, Vec::new());
    assert_eq!(read(&root, "a.c"), "int a\n");
}

#[test]
fn fixes_outside_the_root_are_never_written() {
    let (_tmp, root) = temp_root();
    let (_other_tmp, other) = temp_root();
    write(&root, "a.c", "int a\n");
    write(&other, "common.h", "int shared\n");
    let outside = other.join("common.h");
    let sibling = format!("../{}/common.h", other.file_name().expect("temp dir name"));

    let applied = apply_fixes(
        &root,
        &[
            fix(outside.as_str(), 1, "int shared = 0;"),
            fix(&sibling, 1, "int shared = 1;"),
            fix("a.c", 1, "int a;"),
        ],
        &ApplyOptions::default(),
    );

    assert_eq!(applied.len(), 1);
    assert_eq!(applied[0].file, "a.c");
    assert_eq!(read(&other, "common.h"), "int shared\n");
    assert_eq!(read(&root, "a.c"), "int a;\n");
}

#[test]
fn absolute_path_inside_the_root_is_applied() {
    let (_tmp, root) = temp_root();
    write(&root, "a.c", "int a\n");
    let inside = root.join("a.c");

    let applied = apply_fixes(&root, &[fix(inside.as_str(), 1, "int a;")], &ApplyOptions::default());

    assert_eq!(applied.len(), 1);
    assert_eq!(read(&root, "a.c"), "int a;\n");
}

#[test]
fn missing_trailing_newline_is_preserved() {
    let (_tmp, root) = temp_root();
    write(&root, "a.c", "int a\nint b");

    apply_fixes(&root, &[fix("a.c", 2, "int b;")], &ApplyOptions::default());

    assert_eq!(read(&root, "a.c"), "int a\nint b;");
}

#[test]
fn preview_patch_describes_change_without_writing() {
    let (_tmp, root) = temp_root();
    write(&root, "a.c", "int a\nint b;\n");

    let patch = preview_patch(&root, &[fix("a.c", 1, "int a;")]);

    assert!(patch.starts_with("--- a/a.c\n+++ b/a.c\n"));
    assert!(patch.contains("-int a\n"));
    assert!(patch.contains("+int a;\n"));
    assert_eq!(read(&root, "a.c"), "int a\nint b;\n");
}

#[test]
fn execute_tracks_before_and_after_per_file() {
    let (_tmp, root) = temp_root();
    write(&root, "a.c", "x\n");
    write(&root, "b.c", "y\n");

    let outcome = execute_fixes(&root, &[fix("a.c", 1, "x;"), fix("b.c", 5, "nope")]);

    assert_eq!(outcome.before.len(), 2);
    let changed: Vec<&Utf8PathBuf> = outcome.changed_files().map(|(p, _)| p).collect();
    assert_eq!(changed, vec![&Utf8PathBuf::from("a.c")]);
}

proptest! {
    #[test]
    fn only_in_range_lines_are_applied(lines in 1u32..30, targets in proptest::collection::vec(0u32..40, 0..10)) {
        let (_tmp, root) = temp_root();
        let contents: String = (1..=lines).map(|i| format!("l{i}\n")).collect();
        write(&root, "p.c", &contents);
        let fixes: Vec<Fix> = targets.iter().map(|&t| fix("p.c", t, "patched")).collect();

        let applied = apply_fixes(&root, &fixes, &ApplyOptions::default());

        let expected = targets.iter().filter(|&&t| t >= 1 && t <= lines).count();
        prop_assert_eq!(applied.len(), expected);
        prop_assert_eq!(read(&root, "p.c").lines().count(), lines as usize);
    }
}
