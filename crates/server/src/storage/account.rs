use versemark_primitives::owner::UserId;
use versemark_store::{Column, Store};

/// Every column that can hold account-scoped rows.
const OWNER_SCOPED: [Column; 6] = [
    Column::Markings,
    Column::Notes,
    Column::Palette,
    Column::WordMemory,
    Column::Preferences,
    Column::Backups,
];

/// Cascade-delete every row the account owns, across every resource family.
pub fn delete_account(store: &Store, user_id: &UserId) -> eyre::Result<u64> {
    let scope = format!("u:{user_id}");

    let mut deleted = 0_u64;

    for col in OWNER_SCOPED {
        for (key, _) in store.scan_prefix(col, scope.as_bytes())? {
            let suffix = &key[scope.len()..];
            if !(suffix.is_empty() || suffix.starts_with(b"/")) {
                continue;
            }

            store.delete(col, &key)?;
            deleted = deleted.saturating_add(1);
        }
    }

    Ok(deleted)
}

#[cfg(test)]
mod tests {
    use versemark_primitives::chapter::ChapterId;
    use versemark_primitives::markings::WordMarkings;
    use versemark_primitives::owner::Owner;

    use super::super::{markings, singleton_key, upsert_record};
    use super::*;

    #[test]
    fn delete_cascades_across_resource_families() {
        let store = Store::in_memory();
        let alice = Owner::authenticated("alice");
        let chapter = ChapterId::new("KJV", 43, 3);

        let _ = markings::put_markings(&store, "u:alice", &chapter, WordMarkings::new(), &alice)
            .unwrap();
        let _ = upsert_record(
            &store,
            Column::Preferences,
            &singleton_key("u:alice"),
            serde_json::json!({"fontSize": 14}),
            &alice,
        )
        .unwrap();
        let _ = upsert_record(
            &store,
            Column::Notes,
            &singleton_key("u:alicia"),
            serde_json::json!([]),
            &Owner::authenticated("alicia"),
        )
        .unwrap();

        let deleted = delete_account(&store, &UserId::from("alice")).unwrap();
        assert_eq!(deleted, 2);

        assert!(markings::get_markings(&store, "u:alice", &chapter)
            .unwrap()
            .is_none());
        assert!(
            store
                .has(Column::Notes, &singleton_key("u:alicia"))
                .unwrap(),
            "lookalike account must be untouched"
        );
    }
}
