use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use parts_sandbox::model::FileStatus;
use parts_sandbox::query::QueryService;
use parts_sandbox::refresh;
use parts_sandbox::store::AliasStore;
use parts_sandbox::SandboxError;
use rust_xlsxwriter::Workbook;
use tempfile::tempdir;

/// Writes a Quote Master workbook whose "Master Part List" sheet holds the
/// given header and string rows.
fn write_quote_master(path: &Path, header: &[&str], rows: &[&[&str]]) {
    write_sheet(path, "Master Part List", header, rows);
}

fn write_sheet(path: &Path, sheet: &str, header: &[&str], rows: &[&[&str]]) {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet).expect("sheet name");

    for (col, label) in header.iter().enumerate() {
        worksheet
            .write_string(0, col as u16, *label)
            .expect("header cell");
    }
    for (row_idx, row) in rows.iter().enumerate() {
        for (col, cell) in row.iter().enumerate() {
            worksheet
                .write_string((row_idx + 1) as u32, col as u16, *cell)
                .expect("data cell");
        }
    }
    workbook.save(path).expect("workbook saved");
}

#[test]
fn mixed_batch_merges_valid_files_and_warns_on_the_rest() {
    let dir = tempdir().expect("temporary directory");
    write_quote_master(
        &dir.path().join("good.xlsx"),
        &["Part Number", "EAU", "alias", "value"],
        &[
            &["TEST001", "100", "test_part_1", "TEST001"],
            &["TEST002", "200", "test_part_2", "TEST002"],
        ],
    );
    write_quote_master(
        &dir.path().join("no_columns.xlsx"),
        &["Part Number", "Description"],
        &[&["TEST003", "A part without aliases"]],
    );

    let mut store = AliasStore::open(&dir.path().join("parts_sandbox.db")).expect("store opened");
    let summary = refresh::refresh_all(&mut store, dir.path()).expect("refresh ran");

    assert!(summary.success, "missing columns are warnings, not failures");
    assert!(!summary.is_clean());
    assert_eq!(summary.total_merged, 2);
    assert!(summary.outcomes.iter().any(|outcome| {
        outcome.file.ends_with("no_columns.xlsx") && outcome.status == FileStatus::MissingColumns
    }));

    let hits = store.search("TEST").expect("search");
    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].alias, "test_part_1");
}

#[test]
fn refresh_is_idempotent() {
    let dir = tempdir().expect("temporary directory");
    write_quote_master(
        &dir.path().join("quotes.xlsx"),
        &["alias", "value"],
        &[&["a1", "V1"], &["a2", "V2"]],
    );

    let mut store = AliasStore::open(&dir.path().join("parts_sandbox.db")).expect("store opened");
    let first = refresh::refresh_all(&mut store, dir.path()).expect("first refresh");
    assert_eq!(first.total_merged, 2);

    let after_first = store.load_aliases().expect("mapping loaded");
    let second = refresh::refresh_all(&mut store, dir.path()).expect("second refresh");
    let after_second = store.load_aliases().expect("mapping loaded");

    assert_eq!(second.total_merged, 0);
    assert_eq!(after_first, after_second);
}

#[test]
fn existing_store_values_win_over_incoming_ones() {
    let dir = tempdir().expect("temporary directory");
    write_quote_master(
        &dir.path().join("quotes.xlsx"),
        &["alias", "value"],
        &[&["A001", "V2"]],
    );

    let mut store = AliasStore::open(&dir.path().join("parts_sandbox.db")).expect("store opened");
    let mut seeded = BTreeMap::new();
    seeded.insert("A001".to_string(), "V1".to_string());
    store.persist(&seeded, &[], &[]).expect("seed persisted");

    let summary = refresh::refresh_all(&mut store, dir.path()).expect("refresh ran");
    assert_eq!(summary.total_merged, 0);
    assert_eq!(
        store.load_aliases().expect("mapping loaded").get("A001"),
        Some(&"V1".to_string())
    );
}

#[test]
fn in_batch_duplicates_keep_the_first_file_in_processing_order() {
    let dir = tempdir().expect("temporary directory");
    // Candidates are processed in sorted name order, so a_ wins over b_.
    write_quote_master(
        &dir.path().join("a_first.xlsx"),
        &["alias", "value"],
        &[&["A002", "X"]],
    );
    write_quote_master(
        &dir.path().join("b_second.xlsx"),
        &["alias", "value"],
        &[&["A002", "Y"]],
    );

    let mut store = AliasStore::open(&dir.path().join("parts_sandbox.db")).expect("store opened");
    let summary = refresh::refresh_all(&mut store, dir.path()).expect("refresh ran");

    assert_eq!(summary.total_merged, 1);
    assert_eq!(
        store.load_aliases().expect("mapping loaded").get("A002"),
        Some(&"X".to_string())
    );
}

#[test]
fn missing_sheet_is_a_warning_and_unreadable_file_a_failure() {
    let dir = tempdir().expect("temporary directory");
    write_sheet(
        &dir.path().join("wrong_sheet.xlsx"),
        "Totally Different",
        &["alias", "value"],
        &[&["a1", "V1"]],
    );
    fs::write(dir.path().join("corrupt.xlsx"), b"not a workbook").expect("corrupt fixture");
    write_quote_master(
        &dir.path().join("good.xlsx"),
        &["alias", "value"],
        &[&["a1", "V1"]],
    );

    let mut store = AliasStore::open(&dir.path().join("parts_sandbox.db")).expect("store opened");
    let summary = refresh::refresh_all(&mut store, dir.path()).expect("refresh ran");

    assert!(!summary.success, "a read error fails the batch result");
    assert!(summary.outcomes.iter().any(|outcome| {
        outcome.file.ends_with("wrong_sheet.xlsx") && outcome.status == FileStatus::MissingSheet
    }));
    assert!(summary.outcomes.iter().any(|outcome| {
        outcome.file.ends_with("corrupt.xlsx")
            && matches!(outcome.status, FileStatus::ReadError(_))
    }));
    // The healthy file still contributed.
    assert_eq!(summary.total_merged, 1);
    assert_eq!(store.search("V1").expect("search").len(), 1);
}

#[test]
fn forecast_comes_from_ingested_quote_masters() {
    let dir = tempdir().expect("temporary directory");
    write_quote_master(
        &dir.path().join("quotes.xlsx"),
        &["Part Number", "Description", "EAU", "alias", "value"],
        &[
            &["TEST001", "Test Part 1", "100", "test_part_1", "TEST001"],
            &["TEST002", "Test Part 2", "200", "test_part_2", "TEST002"],
        ],
    );

    let mut store = AliasStore::open(&dir.path().join("parts_sandbox.db")).expect("store opened");
    refresh::refresh_all(&mut store, dir.path()).expect("refresh ran");

    let service = QueryService::new(&store);
    assert_eq!(service.eau_forecast("TEST001").expect("lookup").eau, 100.0);
    assert_eq!(service.eau_forecast("TEST002").expect("lookup").eau, 200.0);
    // Soft miss: an unknown part reports a zero forecast instead of failing.
    assert_eq!(service.eau_forecast("ABSENT").expect("lookup").eau, 0.0);
}

#[test]
fn store_contents_survive_reopening() {
    let dir = tempdir().expect("temporary directory");
    let store_path = dir.path().join("parts_sandbox.db");
    write_quote_master(
        &dir.path().join("quotes.xlsx"),
        &["alias", "value"],
        &[&["test_part", "TEST123"]],
    );

    {
        let mut store = AliasStore::open(&store_path).expect("store opened");
        refresh::refresh_all(&mut store, dir.path()).expect("refresh ran");
    }

    let reopened = AliasStore::open(&store_path).expect("store reopened");
    let hits = reopened.search("TEST123").expect("search");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].alias, "test_part");
}

#[test]
fn discovery_excludes_the_store_file_itself() {
    let dir = tempdir().expect("temporary directory");
    write_quote_master(
        &dir.path().join("quotes.xlsx"),
        &["alias", "value"],
        &[&["a1", "V1"]],
    );
    // A store deliberately parked under the candidate extension must not feed
    // itself on refresh.
    let store = AliasStore::open(&dir.path().join("parts_sandbox.xlsx")).expect("store opened");

    let service = QueryService::new(&store);
    let files = service.list_candidate_files(dir.path()).expect("listing");
    assert_eq!(files, vec!["quotes.xlsx".to_string()]);
}

#[test]
fn missing_directory_fails_discovery() {
    let dir = tempdir().expect("temporary directory");
    let mut store = AliasStore::open(&dir.path().join("parts_sandbox.db")).expect("store opened");

    let missing = dir.path().join("no_such_dir");
    let result = refresh::refresh_all(&mut store, &missing);
    assert!(matches!(result, Err(SandboxError::DirectoryNotFound(_))));
}

#[test]
fn single_file_update_merges_like_a_batch_of_one() {
    let dir = tempdir().expect("temporary directory");
    let file = dir.path().join("quotes.xlsx");
    write_quote_master(
        &file,
        &["Part Number", "EAU", "alias", "value"],
        &[&["TEST001", "100", "test_part_1", "TEST001"]],
    );

    let mut store = AliasStore::open(&dir.path().join("parts_sandbox.db")).expect("store opened");
    let summary = refresh::update_from_file(&mut store, &file).expect("update ran");

    assert!(summary.success);
    assert_eq!(summary.total_merged, 1);
    assert_eq!(store.search("test_part_1").expect("search").len(), 1);
    assert_eq!(store.eau_forecast("TEST001").expect("lookup").eau, 100.0);
}
