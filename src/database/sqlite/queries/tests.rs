use super::*;
use crate::database::sqlite::Database;
use tempfile::TempDir;

async fn create_test_pool() -> (TempDir, SqlitePool) {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let database = Database::with_max_connections(temp_dir.path().join("test.db"), 1)
        .await
        .expect("Failed to create test database");

    (temp_dir, database.pool().clone())
}

fn new_article(title: &str, summary: &str) -> NewArticle {
    NewArticle {
        title: title.to_string(),
        summary: summary.to_string(),
        published: "2024-01-15T09:00:00".to_string(),
        pdf_link: format!("https://example.com/{}.pdf", title.to_lowercase()),
        ..NewArticle::default()
    }
}

#[tokio::test]
async fn collection_crud_operations() {
    let (_temp_dir, pool) = create_test_pool().await;

    let created = CollectionQueries::create(&pool, "papers")
        .await
        .expect("Failed to create collection");
    assert_eq!(created.name, "papers");

    let again = CollectionQueries::create(&pool, "papers")
        .await
        .expect("Creating an existing collection should succeed");
    assert_eq!(again, created);

    CollectionQueries::create(&pool, "archive")
        .await
        .expect("Failed to create collection");

    let names = CollectionQueries::list_names(&pool)
        .await
        .expect("Failed to list names");
    assert_eq!(names, vec!["archive", "papers"]);

    assert!(
        CollectionQueries::exists(&pool, "papers")
            .await
            .expect("Failed to check existence")
    );
    assert!(
        CollectionQueries::delete(&pool, "papers")
            .await
            .expect("Failed to delete collection")
    );
    assert!(
        !CollectionQueries::delete(&pool, "papers")
            .await
            .expect("Deleting twice should not error")
    );
    assert!(
        CollectionQueries::get(&pool, "papers")
            .await
            .expect("Failed to get collection")
            .is_none()
    );
}

#[tokio::test]
async fn articles_keep_insertion_order() {
    let (_temp_dir, pool) = create_test_pool().await;
    CollectionQueries::create(&pool, "papers")
        .await
        .expect("Failed to create collection");

    let inserted = ArticleQueries::insert_batch(
        &pool,
        "papers",
        vec![
            new_article("Zeta", "last alphabetically"),
            new_article("Alpha", "first alphabetically"),
            new_article("Mu", "in the middle"),
        ],
    )
    .await
    .expect("Failed to insert articles");
    assert_eq!(inserted.len(), 3);

    let listed = ArticleQueries::list_by_collection(&pool, "papers")
        .await
        .expect("Failed to list articles");

    assert_eq!(listed, inserted);
    let titles: Vec<&str> = listed.iter().map(|a| a.title.as_str()).collect();
    assert_eq!(titles, vec!["Zeta", "Alpha", "Mu"]);
}

#[tokio::test]
async fn provided_ids_are_preserved() {
    let (_temp_dir, pool) = create_test_pool().await;
    CollectionQueries::create(&pool, "papers")
        .await
        .expect("Failed to create collection");

    let mut article = new_article("Known", "has an id");
    article.id = Some("2401.00001".to_string());

    let inserted = ArticleQueries::insert_batch(&pool, "papers", vec![article])
        .await
        .expect("Failed to insert article");
    assert_eq!(inserted[0].id, "2401.00001");

    let generated = ArticleQueries::insert_batch(&pool, "papers", vec![new_article("X", "y")])
        .await
        .expect("Failed to insert article");
    assert!(Uuid::parse_str(&generated[0].id).is_ok());
}

#[tokio::test]
async fn same_id_in_two_collections() {
    let (_temp_dir, pool) = create_test_pool().await;
    for name in ["papers", "papers-2021"] {
        CollectionQueries::create(&pool, name)
            .await
            .expect("Failed to create collection");
    }

    for name in ["papers", "papers-2021"] {
        let mut article = new_article("Shared", "imported twice");
        article.id = Some("arxiv-1".to_string());
        ArticleQueries::insert_batch(&pool, name, vec![article])
            .await
            .expect("Ids only need to be unique within a collection");
    }

    for name in ["papers", "papers-2021"] {
        let listed = ArticleQueries::list_by_collection(&pool, name)
            .await
            .expect("Failed to list articles");
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, "arxiv-1");
        assert_eq!(listed[0].collection, name);
    }
}

#[tokio::test]
async fn failed_batch_is_rolled_back() {
    let (_temp_dir, pool) = create_test_pool().await;
    CollectionQueries::create(&pool, "papers")
        .await
        .expect("Failed to create collection");

    let mut first = new_article("First", "ok");
    first.id = Some("dup".to_string());
    let mut second = new_article("Second", "duplicate id");
    second.id = Some("dup".to_string());

    let result = ArticleQueries::insert_batch(&pool, "papers", vec![first, second]).await;
    assert!(result.is_err());

    let count = ArticleQueries::count(&pool, "papers")
        .await
        .expect("Failed to count articles");
    assert_eq!(count, 0);
}

#[tokio::test]
async fn collections_are_isolated() {
    let (_temp_dir, pool) = create_test_pool().await;
    CollectionQueries::create(&pool, "a")
        .await
        .expect("Failed to create collection");
    CollectionQueries::create(&pool, "b")
        .await
        .expect("Failed to create collection");

    ArticleQueries::insert_batch(&pool, "a", vec![new_article("One", "in a")])
        .await
        .expect("Failed to insert");
    ArticleQueries::insert_batch(
        &pool,
        "b",
        vec![new_article("Two", "in b"), new_article("Three", "in b")],
    )
    .await
    .expect("Failed to insert");

    let summaries = CollectionQueries::list_with_counts(&pool)
        .await
        .expect("Failed to list summaries");
    let counts: Vec<(String, i64)> = summaries
        .into_iter()
        .map(|s| (s.name, s.article_count))
        .collect();
    assert_eq!(counts, vec![("a".to_string(), 1), ("b".to_string(), 2)]);
}

#[tokio::test]
async fn list_published_applies_inclusive_bounds() {
    let (_temp_dir, pool) = create_test_pool().await;
    CollectionQueries::create(&pool, "papers")
        .await
        .expect("Failed to create collection");

    let dated = |title: &str, published: &str| NewArticle {
        title: title.to_string(),
        published: published.to_string(),
        ..NewArticle::default()
    };

    ArticleQueries::insert_batch(
        &pool,
        "papers",
        vec![
            dated("Start", "2020-01-01T00:00:00"),
            dated("End", "2020-12-31T23:59:59"),
            dated("After", "2021-01-01T00:00:00"),
        ],
    )
    .await
    .expect("Failed to insert");

    let range = PublishedRange {
        from: Some("2020-01-01T00:00:00".to_string()),
        to: Some("2020-12-31T23:59:59".to_string()),
    };
    let in_range = ArticleQueries::list_published(&pool, "papers", &range)
        .await
        .expect("Failed to list by date");
    let titles: Vec<&str> = in_range.iter().map(|a| a.title.as_str()).collect();
    assert_eq!(titles, vec!["Start", "End"]);

    let upper_only = PublishedRange {
        from: None,
        to: Some("2020-06-30T23:59:59".to_string()),
    };
    let before = ArticleQueries::list_published(&pool, "papers", &upper_only)
        .await
        .expect("Failed to list by date");
    assert_eq!(before.len(), 1);
    assert_eq!(before[0].title, "Start");
}
