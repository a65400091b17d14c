//! End-to-end import through SQLite

use roistot_common::db::{
    init_database, init_memory_database, Author, List, Publication, PublicationKind, SqliteStore, Story,
    StoryPublication, StoryVillain, Version, VersionRepository, Villain,
};
use roistot_common::ContentHasher;
use roistot_importer::{read_table_file, Importer};
use sqlx::SqlitePool;
use std::io::Write;

const HEADER: &[&str] = &[
    "Järjestysluku",
    "Tarina",
    "Kertoi",
    "Vuosi",
    "Alkaen",
    "Päättyen",
];

fn row(cells: &[&str]) -> Vec<String> {
    cells.iter().map(|c| c.to_string()).collect()
}

fn scenario_row() -> Vec<String> {
    row(&["5", "Episode 5", "Doe, John; Roe, Jane", "1978", "11", "2"])
}

async fn count(pool: &SqlitePool, table: &str, version: &Version) -> i64 {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {} WHERE version = ?", table))
        .bind(version.id)
        .fetch_one(pool)
        .await
        .unwrap()
}

#[tokio::test]
async fn test_single_row_scenario() {
    let pool = init_memory_database().await.unwrap();
    let store = SqliteStore::new(pool.clone());
    let hasher = ContentHasher::new("salt");

    let mut importer = Importer::new(HEADER, hasher.clone());
    let loaded = importer.load_data(&[scenario_row()]).unwrap();
    assert_eq!(loaded.stories, 1);
    assert_eq!(loaded.authors, 2);
    assert_eq!(loaded.publications, 4);
    assert_eq!(loaded.story_publications, 4);

    let summary = importer.persist_data(&store, 100).await.unwrap();
    let version = summary.version.clone();
    assert!(!version.is_active);

    let stories: Vec<Story> = store.list(&version).await.unwrap();
    assert_eq!(stories.len(), 1);
    assert_eq!(stories[0].hash, hasher.hash("5"));
    assert_eq!(stories[0].order_num, Some(5));

    let authors: Vec<Author> = store.list(&version).await.unwrap();
    assert_eq!(authors.len(), 2);
    assert!(authors.iter().all(|a| a.is_writer && !a.is_drawer && !a.is_inventor));
    let names: Vec<(&str, &str)> = authors
        .iter()
        .map(|a| (a.first_name.as_str(), a.last_name.as_str()))
        .collect();
    assert_eq!(names, vec![("John", "Doe"), ("Jane", "Roe")]);

    let publications: Vec<Publication> = store.list(&version).await.unwrap();
    let issues: Vec<(PublicationKind, Option<i32>, &str)> = publications
        .iter()
        .map(|p| (p.kind, p.year, p.issue.as_str()))
        .collect();
    assert_eq!(
        issues,
        vec![
            (PublicationKind::Regular, Some(1978), "11"),
            (PublicationKind::Regular, Some(1978), "12"),
            (PublicationKind::Regular, Some(1979), "1"),
            (PublicationKind::Regular, Some(1979), "2"),
        ]
    );

    let links: Vec<StoryPublication> = store.list(&version).await.unwrap();
    assert_eq!(links.len(), 4);
    assert!(links.iter().all(|l| l.title == "Episode 5" && l.story == stories[0].id));

    assert_eq!(count(&pool, "authors_in_stories", &version).await, 2);
    assert_eq!(summary.story_authors, 2);
}

#[tokio::test]
async fn test_same_row_twice_adds_nothing() {
    let pool = init_memory_database().await.unwrap();
    let store = SqliteStore::new(pool.clone());

    let mut importer = Importer::new(HEADER, ContentHasher::default());
    importer.load_data(&[scenario_row(), scenario_row()]).unwrap();
    let summary = importer.persist_data(&store, 100).await.unwrap();

    assert_eq!(summary.stories, 1);
    assert_eq!(summary.authors, 2);
    assert_eq!(summary.publications, 4);
    assert_eq!(summary.story_publications, 4);
    assert_eq!(summary.story_authors, 2);
    assert_eq!(count(&pool, "stories_in_publications", &summary.version).await, 4);
}

#[tokio::test]
async fn test_small_chunks_persist_everything() {
    let pool = init_memory_database().await.unwrap();
    let store = SqliteStore::new(pool.clone());

    let rows: Vec<Vec<String>> = (1..=9)
        .map(|i| {
            let order = i.to_string();
            let title = format!("Story {}", i);
            let author = format!("Writer{}, Some", i % 4);
            let from = i.to_string();
            row(&[order.as_str(), title.as_str(), author.as_str(), "1985", from.as_str(), from.as_str()])
        })
        .collect();

    let mut importer = Importer::new(HEADER, ContentHasher::default());
    importer.load_data(&rows).unwrap();
    let summary = importer.persist_data(&store, 2).await.unwrap();

    assert_eq!(summary.stories, 9);
    assert_eq!(summary.authors, 4);
    assert_eq!(summary.publications, 9);
    assert_eq!(summary.story_authors, 9);

    for entry in importer.graph().stories().entries() {
        let stored: Option<Story> = roistot_common::db::Read::read(&store, entry.durable_id.unwrap())
            .await
            .unwrap();
        assert_eq!(stored.unwrap().hash, entry.item.story.hash);
    }

    // every author link points at the author credited in the source row
    let pairs: Vec<(i64, String)> = sqlx::query_as(
        "SELECT s.order_num, a.last_name FROM authors_in_stories l \
         JOIN stories s ON s.id = l.story JOIN authors a ON a.id = l.author \
         WHERE l.version = ? ORDER BY s.order_num",
    )
    .bind(summary.version.id)
    .fetch_all(&pool)
    .await
    .unwrap();
    assert_eq!(pairs.len(), 9);
    for (order, last_name) in pairs {
        assert_eq!(last_name, format!("Writer{}", order % 4));
    }
}

#[tokio::test]
async fn test_oversized_chunk_size_is_clamped() {
    let pool = init_memory_database().await.unwrap();
    let store = SqliteStore::new(pool.clone());

    let writers: Vec<String> = (0..5000).map(|i| format!("Writer{}, Some", i)).collect();
    let joined = writers.join("; ");
    let rows = vec![row(&["1", "Story", joined.as_str(), "", "", ""])];

    let mut importer = Importer::new(HEADER, ContentHasher::default());
    importer.load_data(&rows).unwrap();
    let summary = importer.persist_data(&store, 5000).await.unwrap();

    assert_eq!(summary.authors, 5000);
    assert_eq!(summary.story_authors, 5000);
    assert_eq!(count(&pool, "authors", &summary.version).await, 5000);
}

#[tokio::test]
async fn test_villains_and_specials() {
    let pool = init_memory_database().await.unwrap();
    let store = SqliteStore::new(pool.clone());
    let header = [
        "Järjestysluku",
        "Tarina",
        "Erikoisjulkaisu",
        "Kronikka",
        "Etunimi",
        "Sukunimi",
        "Rooli",
        "Kohtalo",
        "Sama numero, sama roisto",
    ];

    let mut importer = Importer::new(&header, ContentHasher::default());
    importer
        .load_data(&[
            row(&["10", "Kuolemanlaakso; Laakso", "Maxi-Tex 2", "Kronikka 1", "Jack", "Thunder", "Pomo", "", "T1"]),
            row(&["11", "Paluu", "", "", "Jack", "", "Pomo; Kostaja", "Kuoli", "T1"]),
        ])
        .unwrap();
    let summary = importer.persist_data(&store, 100).await.unwrap();
    let version = summary.version;

    let publications: Vec<Publication> = store.list(&version).await.unwrap();
    assert_eq!(publications.len(), 2);
    assert_eq!(publications[0].kind, PublicationKind::Maxi);
    assert_eq!(publications[0].year, None);
    assert_eq!(publications[1].kind, PublicationKind::Chronicle);

    let links: Vec<StoryPublication> = store.list(&version).await.unwrap();
    let titles: Vec<&str> = links.iter().map(|l| l.title.as_str()).collect();
    assert_eq!(titles, vec!["Kuolemanlaakso", "Laakso"]);

    let villains: Vec<Villain> = store.list(&version).await.unwrap();
    assert_eq!(villains.len(), 1);
    assert_eq!(villains[0].first_names, vec!["Jack"]);
    assert_eq!(villains[0].last_name, "Thunder");

    let appearances: Vec<StoryVillain> = store.list(&version).await.unwrap();
    assert_eq!(appearances.len(), 2);
    assert!(appearances.iter().all(|a| a.villain == villains[0].id));
    assert_eq!(appearances[1].roles, vec!["Pomo", "Kostaja"]);
    assert_eq!(appearances[1].destinies, vec!["Kuoli"]);
}

#[tokio::test]
async fn test_import_file_and_activate() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("data").join("roistot.db");
    let csv_path = dir.path().join("tex.csv");

    // `;` separates author names, so the file is tab-delimited
    let mut file = std::fs::File::create(&csv_path).unwrap();
    writeln!(file, "{}", HEADER.join("\t")).unwrap();
    writeln!(file, "5\tEpisode 5\tDoe, John; Roe, Jane\t1978\t11\t2").unwrap();
    drop(file);

    let table = read_table_file(&csv_path, b'\t').unwrap();
    let pool = init_database(&db_path).await.unwrap();
    let store = SqliteStore::new(pool.clone());
    let versions = VersionRepository::new(pool.clone());

    let mut importer = Importer::new(&table.header, ContentHasher::default());
    importer.load_data(&table.rows).unwrap();
    let first = importer.persist_data(&store, 100).await.unwrap().version;
    versions.set_active(first.id).await.unwrap();

    let mut importer = Importer::new(&table.header, ContentHasher::default());
    importer.load_data(&table.rows).unwrap();
    let second = importer.persist_data(&store, 100).await.unwrap().version;

    // a new run does not replace the active one until activated
    assert_eq!(versions.get_active().await.unwrap().id, first.id);
    versions.set_active(second.id).await.unwrap();
    assert_eq!(versions.get_active().await.unwrap().id, second.id);

    // each run owns a full copy of its rows
    assert_eq!(count(&pool, "publications", &first).await, 4);
    assert_eq!(count(&pool, "publications", &second).await, 4);

    versions.remove(first.id).await.unwrap();
    assert_eq!(count(&pool, "publications", &first).await, 0);
    assert_eq!(count(&pool, "stories", &second).await, 1);
    assert!(db_path.exists());
}
