//! Integration tests for import, deduplication, purge and snapshot history.

use doi_engagement::engagement::SnapshotFields;
use doi_engagement::identifier::Candidate;
use doi_engagement::{
    AppContext, Database, DatabaseOptions, ImportSummary, UrlStore, UrlVariant,
};

async fn context() -> AppContext {
    AppContext::new(Database::new_in_memory().await.unwrap())
}

fn fields(url_id: i64, url: &str, shares: Option<i64>) -> SnapshotFields {
    SnapshotFields {
        url_id,
        url: url.to_string(),
        response: format!(r#"{{"engagement":{{"share_count":{}}}}}"#, shares.unwrap_or(0)),
        reactions: None,
        shares,
        comments: None,
        plugin_comments: None,
    }
}

#[tokio::test]
async fn test_import_new_pair_then_reimport_is_idempotent() {
    let ctx = context().await;
    let candidates = [Candidate::new("10.1000/xyz123", Some("http://example.org/a"))];

    let first = ctx
        .identifiers
        .add_batch("<test>", "", &candidates)
        .await
        .unwrap();
    assert_eq!(
        first,
        ImportSummary {
            batch_id: first.batch_id,
            identifiers_added: 1,
            identifiers_already_present: 0,
            urls_added: 1,
            urls_already_present: 0,
            rejected: 0,
        }
    );

    let second = ctx
        .identifiers
        .add_batch("<test>", "", &candidates)
        .await
        .unwrap();
    assert_eq!(
        second,
        ImportSummary {
            batch_id: second.batch_id,
            identifiers_added: 0,
            identifiers_already_present: 1,
            urls_added: 0,
            urls_already_present: 1,
            rejected: 0,
        }
    );
    assert_ne!(first.batch_id, second.batch_id);
    assert_eq!(ctx.identifiers.count().await.unwrap(), 1);
    assert_eq!(ctx.urls.count().await.unwrap(), 1);
    assert_eq!(ctx.identifiers.count_batches().await.unwrap(), 2);
}

#[tokio::test]
async fn test_import_from_delimited_payload_counts_rejections() {
    let ctx = context().await;
    let payload = "doi,url\n10.1000/xyz123,http://example.org/a\nnot-a-doi,\n10.1002/anie.201915678,\n";

    let summary = ctx
        .identifiers
        .import("<file dois.csv>", payload, b',')
        .await
        .unwrap();

    assert_eq!(summary.identifiers_added, 2);
    assert_eq!(summary.urls_added, 1);
    assert_eq!(summary.rejected, 1);

    let batch = &ctx.identifiers.list_batches().await.unwrap()[0];
    assert_eq!(batch.source, "<file dois.csv>");
    assert_eq!(batch.raw_payload, payload);
}

#[tokio::test]
async fn test_url_owned_by_other_identifier_is_already_present() {
    let ctx = context().await;
    let summary = ctx
        .identifiers
        .add_batch(
            "<test>",
            "",
            &[
                Candidate::new("10.1000/first", Some("https://shared.example/article")),
                Candidate::new("10.1000/second", Some("https://shared.example/article")),
            ],
        )
        .await
        .unwrap();
    assert_eq!(summary.identifiers_added, 2);
    assert_eq!(summary.urls_added, 1);
    assert_eq!(summary.urls_already_present, 1);

    let first = ctx.identifiers.get_by_doi("10.1000/first").await.unwrap().unwrap();
    let record = ctx
        .urls
        .get_by_url("https://shared.example/article")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record.identifier_id, first.id);
    assert_eq!(record.variant().unwrap(), UrlVariant::ExternalImport);
}

#[tokio::test]
async fn test_purge_identifiers_cascades_to_urls_and_snapshots() {
    let ctx = context().await;
    ctx.identifiers
        .add_batch(
            "<test>",
            "",
            &[Candidate::new("10.1000/xyz123", Some("http://example.org/a"))],
        )
        .await
        .unwrap();
    let record = ctx.urls.get_by_url("http://example.org/a").await.unwrap().unwrap();
    ctx.snapshots
        .append(&fields(record.id, &record.url, Some(1)))
        .await
        .unwrap();

    let removed = ctx.identifiers.purge_all().await.unwrap();

    assert_eq!(removed, 1);
    assert_eq!(ctx.urls.count().await.unwrap(), 0);
    assert_eq!(ctx.snapshots.count().await.unwrap(), 0);
    assert_eq!(ctx.identifiers.count_batches().await.unwrap(), 1);
}

#[tokio::test]
async fn test_purge_urls_keeps_identifiers() {
    let ctx = context().await;
    ctx.identifiers
        .add_batch(
            "<test>",
            "",
            &[Candidate::new("10.1000/xyz123", Some("http://example.org/a"))],
        )
        .await
        .unwrap();
    let record = ctx.urls.get_by_url("http://example.org/a").await.unwrap().unwrap();
    ctx.snapshots
        .append(&fields(record.id, &record.url, None))
        .await
        .unwrap();

    assert_eq!(ctx.urls.purge_all().await.unwrap(), 1);
    assert_eq!(ctx.identifiers.count().await.unwrap(), 1);
    assert_eq!(ctx.snapshots.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_snapshot_history_is_append_only_and_ordered() {
    let ctx = context().await;
    ctx.identifiers
        .add_batch(
            "<test>",
            "",
            &[Candidate::new("10.1000/xyz123", Some("http://example.org/a"))],
        )
        .await
        .unwrap();
    let record = ctx.urls.get_by_url("http://example.org/a").await.unwrap().unwrap();

    for shares in [Some(1), Some(5), None] {
        ctx.snapshots
            .append(&fields(record.id, &record.url, shares))
            .await
            .unwrap();
    }

    let history = ctx.snapshots.history(record.id).await.unwrap();
    assert_eq!(history.len(), 3);
    assert_eq!(
        history.iter().map(|s| s.shares).collect::<Vec<_>>(),
        vec![Some(1), Some(5), None]
    );
    assert!(
        history
            .windows(2)
            .all(|pair| pair[0].captured_at <= pair[1].captured_at)
    );
    assert_eq!(ctx.snapshots.count_for_url(record.id).await.unwrap(), 3);
}

#[tokio::test]
async fn test_file_database_persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("engagement.db");

    {
        let db = Database::new(&path, &doi_engagement::DatabaseOptions::default())
            .await
            .unwrap();
        let ctx = AppContext::new(db);
        ctx.identifiers
            .add_batch("<test>", "", &[Candidate::new("10.1000/xyz123", None)])
            .await
            .unwrap();
        ctx.close().await;
    }

    let db = Database::new(&path, &doi_engagement::DatabaseOptions::default())
        .await
        .unwrap();
    let ctx = AppContext::new(db);
    assert!(
        ctx.identifiers
            .get_by_doi("10.1000/xyz123")
            .await
            .unwrap()
            .is_some()
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_add_if_absent_creates_single_row() {
    let temp_dir = tempfile::tempdir().unwrap();
    let db = Database::new(&temp_dir.path().join("race.db"), &DatabaseOptions::default())
        .await
        .unwrap();
    let identifier_id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO identifier (doi) VALUES ('10.1000/xyz123') RETURNING id",
    )
    .fetch_one(db.pool())
    .await
    .unwrap();
    let urls = UrlStore::new(db.clone());

    let mut handles = Vec::new();
    for _ in 0..16 {
        let urls = urls.clone();
        handles.push(tokio::spawn(async move {
            urls.add_if_absent(
                "https://example.org/race",
                identifier_id,
                UrlVariant::ExternalImport,
            )
            .await
        }));
    }

    let mut outcomes = Vec::new();
    for handle in handles {
        outcomes.push(handle.await.unwrap().unwrap());
    }

    assert_eq!(outcomes.iter().filter(|outcome| outcome.created).count(), 1);
    let first_id = outcomes[0].id;
    assert!(outcomes.iter().all(|outcome| outcome.id == first_id));
    assert_eq!(urls.count().await.unwrap(), 1);
}
