use tempdir::TempDir;
use versemark_store::config::StoreConfig;
use versemark_store::db::{Column, Database};

use crate::RocksDB;

#[test]
fn test_rocksdb() {
    let dir = TempDir::new("_versemark_store_rocksdb").expect("tempdir should be created");

    let dir_path = dir
        .path()
        .to_owned()
        .try_into()
        .expect("path conversion should succeed");

    let config = StoreConfig::new(dir_path);

    let db = RocksDB::open(&config).expect("db should open");

    for b1 in 0..10 {
        for b2 in 0..10 {
            let bytes = [b1, b2];

            db.put(Column::Markings, &bytes, &bytes)
                .expect("put should succeed");

            assert!(
                db.has(Column::Markings, &bytes).expect("has should succeed"),
                "inserted key should exist"
            );
            assert_eq!(
                &*db.get(Column::Markings, &bytes)
                    .expect("get should succeed")
                    .expect("key should exist"),
                &bytes[..]
            );
        }
    }

    assert_eq!(
        None,
        db.get(Column::Markings, &[]).expect("get should succeed")
    );

    let all = db
        .scan_prefix(Column::Markings, &[])
        .expect("scan should succeed");
    assert_eq!(all.len(), 100, "every inserted entry should be scanned");

    let under_three = db
        .scan_prefix(Column::Markings, &[3])
        .expect("scan should succeed");
    assert_eq!(under_three.len(), 10, "prefix scan should be bounded");
    assert!(under_three.iter().all(|(key, _)| key[0] == 3));

    db.delete(Column::Markings, &[3, 4])
        .expect("delete should succeed");
    assert!(
        !db.has(Column::Markings, &[3, 4])
            .expect("has should succeed"),
        "deleted key should be gone"
    );

    assert!(
        db.scan_prefix(Column::Notes, &[])
            .expect("scan should succeed")
            .is_empty(),
        "columns should be isolated"
    );
}
