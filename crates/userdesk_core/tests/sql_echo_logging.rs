use std::path::Path;
use userdesk_core::{
    flush_logging, init_logging, SqliteUserRepository, StoreLocation, StoreOptions, UserDraft,
    UserRepository, UserStore,
};

// One test per binary: the logger is process-global.
#[test]
fn echoed_sql_and_transactions_reach_the_log_file_after_flush() {
    let log_dir = tempfile::tempdir().unwrap();
    init_logging("debug", log_dir.path()).unwrap();

    let store = UserStore::open(StoreLocation::Memory, StoreOptions { echo_sql: true }).unwrap();
    let repo = SqliteUserRepository::try_new(&store).unwrap();
    let created = repo
        .create_user(&UserDraft::new("Ana", "ana@x.com").unwrap())
        .unwrap();
    repo.list_users().unwrap();

    flush_logging();
    let written = read_logs(log_dir.path());

    assert!(written.contains("event=sql_echo"), "missing echo in:\n{written}");
    assert!(written.contains("INSERT INTO Users (name, email) VALUES (?1, ?2);"));
    assert!(written.contains("event=db_tx module=db op=user_create status=ok"));
    assert!(written.contains(&format!("event=user_create module=repo status=ok id={}", created.id)));
    assert!(!written.contains("ana@x.com"), "log lines must not carry user data");
}

fn read_logs(dir: &Path) -> String {
    std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| std::fs::read_to_string(entry.unwrap().path()).unwrap())
        .collect()
}
