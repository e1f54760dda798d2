//! Record store tests
//!
//! Editor and list behaviour against real databases, including the
//! no-write guarantee for unchanged drafts.

use pocket_core::{format_timestamp, Clock, ManualClock, TagColor, VaultConfig};
use pocket_storage_sqlite::{
    CredentialTable, Database, ListItems, NoteEditor, NoteField, NoteTable, RecordKind,
    RecordTable, SortOrder, Vault,
};
use rusqlite::Connection;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

fn install_update_log(conn: &Connection, table: &str) {
    conn.execute_batch(&format!(
        r#"
        CREATE TABLE IF NOT EXISTS write_log (tbl TEXT NOT NULL);
        CREATE TRIGGER log_{table}_update AFTER UPDATE ON {table}
        BEGIN
            INSERT INTO write_log (tbl) VALUES ('{table}');
        END;
        "#
    ))
    .unwrap();
}

fn update_count(conn: &Connection) -> i64 {
    conn.query_row("SELECT COUNT(*) FROM write_log", [], |row| row.get(0))
        .unwrap()
}

fn memory_vault(clock: Arc<ManualClock>) -> Vault {
    Vault::open_in_memory(&VaultConfig::default(), clock).unwrap()
}

#[test]
fn test_unmodified_note_save_issues_no_write() {
    let db = Database::open_in_memory().unwrap();
    install_update_log(db.conn(), "notes");
    let clock = Arc::new(ManualClock::new());
    let mut editor = NoteEditor::new(clock.clone());

    editor.set_text(NoteField::Body, "groceries");
    assert!(editor.save(db.conn()).unwrap());

    assert!(!editor.save(db.conn()).unwrap());
    assert!(!editor.save(db.conn()).unwrap());
    assert_eq!(update_count(db.conn()), 0);

    clock.advance(Duration::from_secs(1));
    editor.set_tag(TagColor::Blue);
    assert!(editor.save(db.conn()).unwrap());
    assert_eq!(update_count(db.conn()), 1);
}

#[test]
fn test_unmodified_credential_save_issues_no_write() {
    let clock = Arc::new(ManualClock::new());
    let vault = memory_vault(clock);
    install_update_log(vault.conn(), "credentials");
    let mut editor = vault.credential_editor();

    editor.set_field(0, "alice");
    editor.save(vault.conn()).unwrap();
    assert!(!editor.save(vault.conn()).unwrap());
    assert!(!editor.set_field(0, "alice"));
    assert!(!editor.save(vault.conn()).unwrap());

    assert_eq!(update_count(vault.conn()), 0);
}

#[test]
fn test_blank_credential_is_titled_with_date() {
    let clock = Arc::new(ManualClock::new());
    let vault = memory_vault(clock.clone());
    let mut editor = vault.credential_editor();

    assert!(editor.save(vault.conn()).unwrap());

    let expected = format_timestamp(&clock.wall_now());
    assert_eq!(editor.draft().title, expected);
    let stored = CredentialTable::get(vault.conn(), editor.draft().id.unwrap())
        .unwrap()
        .unwrap();
    assert_eq!(stored.title, expected);
}

#[test]
fn test_list_sort_orders() {
    let clock = Arc::new(ManualClock::new());
    let vault = memory_vault(clock.clone());

    for title in ["banana", "apple", "cherry"] {
        let mut editor = vault.note_editor();
        editor.update_if_needed(vault.conn(), title, NoteField::Title);
        clock.advance(Duration::from_secs(10));
    }

    let mut list = vault.record_list().unwrap();
    assert_eq!(list.kind(), RecordKind::Note);
    assert_eq!(list.sort(), SortOrder::DateDescending);
    assert_eq!(list.titles(), vec!["cherry", "apple", "banana"]);

    list.set_sort(vault.conn(), vault.settings(), 0).unwrap();
    assert_eq!(list.titles(), vec!["banana", "apple", "cherry"]);

    list.set_sort(vault.conn(), vault.settings(), 5).unwrap();
    assert_eq!(list.sort(), SortOrder::TitleAscending);
    assert_eq!(list.titles(), vec!["apple", "banana", "cherry"]);
    assert_eq!(vault.settings().sort_option(), 5);
}

#[test]
fn test_delete_many_and_delete_all() {
    let clock = Arc::new(ManualClock::new());
    let vault = memory_vault(clock.clone());
    for i in 0..4 {
        let mut editor = vault.credential_editor();
        editor.set_title(&format!("site {i}"));
        editor.save(vault.conn()).unwrap();
        clock.advance(Duration::from_secs(1));
    }
    vault.settings().set_selected_tab(2).unwrap();

    let mut list = vault.record_list().unwrap();
    assert!(matches!(list.items(), ListItems::Credentials(v) if v.len() == 4));

    assert_eq!(list.delete_many(vault.conn(), &[1, 3, 42]).unwrap(), 2);
    assert_eq!(list.items().len(), 2);
    assert_eq!(CredentialTable::count(vault.conn()).unwrap(), 2);

    assert_eq!(list.delete_all(vault.conn()).unwrap(), 2);
    assert!(list.items().is_empty());
    assert_eq!(CredentialTable::count(vault.conn()).unwrap(), 0);
}

#[test]
fn test_vault_persists_records_and_settings() {
    let dir = TempDir::new().unwrap();
    let config = VaultConfig {
        database_path: Some(dir.path().join("vault").join("pocket.sqlite3")),
        ..Default::default()
    };

    {
        let vault = Vault::open(&config).unwrap();
        let mut editor = vault.note_editor();
        assert!(editor.update_if_needed(vault.conn(), "persisted", NoteField::Body));
        vault.settings().set_timeout_index(4).unwrap();
        vault.settings().set_default_field_locks([true, false, true, false]).unwrap();
    }

    let vault = Vault::open(&config).unwrap();
    assert_eq!(NoteTable::count(vault.conn()).unwrap(), 1);
    assert_eq!(vault.settings().timeout_index(), 4);
    assert_eq!(
        vault.credential_editor().draft().locks(),
        [true, false, true, false]
    );
}
