//! Filter evaluation against a seeded catalog

mod support;

use chrono::{Duration, Utc};
use uuid::Uuid;

use aperture_sync::config::SyncConfig;
use aperture_sync::domain::filters::{
    AlbumFilters, DateRangeFilter, FilterOperator, LocationFilter, MediaType, MetadataFilter,
};
use aperture_sync::infrastructure::database::Database;
use aperture_sync::search::{
    FilterEvaluator, Page, RecoveryPolicy, SearchError, SearchPagination, SortOrder,
};
use aperture_sync::infrastructure::database::entities::asset;

fn evaluator(db: &Database) -> FilterEvaluator {
    FilterEvaluator::new(db.conn().clone(), &SyncConfig::default())
}

async fn matches(
    db: &Database,
    owner: Uuid,
    filters: &AlbumFilters,
) -> Page<asset::Model> {
    evaluator(db)
        .evaluate(
            Uuid::new_v4(),
            owner,
            filters,
            SortOrder::Asc,
            SearchPagination::new(1, 100),
            RecoveryPolicy::Strict,
        )
        .await
        .expect("evaluate")
}

#[tokio::test]
async fn empty_expression_matches_all_timeline_assets_of_owner() {
    let db = support::test_db().await;
    let alice = support::seed_user(&db, "alice").await;
    let bob = support::seed_user(&db, "bob").await;

    let a1 = support::seed_asset(&db, alice.id).await;
    let a2 = support::seed_asset(&db, alice.id).await;
    support::AssetSeed::new(alice.id).hidden().insert(&db).await;
    support::seed_asset(&db, bob.id).await;

    let page = matches(&db, alice.id, &AlbumFilters::default()).await;
    let ids: Vec<Uuid> = page.items.iter().map(|a| a.id).collect();
    assert_eq!(ids.len(), 2);
    assert!(ids.contains(&a1.id));
    assert!(ids.contains(&a2.id));
}

#[tokio::test]
async fn tag_filter_matches_the_whole_subtree() {
    let db = support::test_db().await;
    let alice = support::seed_user(&db, "alice").await;

    let travel = support::seed_tag(&db, "travel", None).await;
    let norway = support::seed_tag(&db, "norway", Some(&travel)).await;

    let tagged_child = support::seed_asset(&db, alice.id).await;
    support::attach_tag(&db, norway.id, tagged_child.id).await;
    let untagged = support::seed_asset(&db, alice.id).await;

    let filters = AlbumFilters {
        tags: Some(vec![travel.id]),
        ..Default::default()
    };
    let page = matches(&db, alice.id, &filters).await;
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].id, tagged_child.id);
    assert_ne!(page.items[0].id, untagged.id);
}

#[tokio::test]
async fn people_and_requires_every_person() {
    let db = support::test_db().await;
    let alice = support::seed_user(&db, "alice").await;
    let p1 = Uuid::new_v4();
    let p2 = Uuid::new_v4();

    let both = support::seed_asset(&db, alice.id).await;
    support::seed_face(&db, both.id, p1).await;
    support::seed_face(&db, both.id, p2).await;

    let only_p1 = support::seed_asset(&db, alice.id).await;
    support::seed_face(&db, only_p1.id, p1).await;

    let mut filters = AlbumFilters {
        people: Some(vec![p1, p2]),
        operator: FilterOperator::And,
        ..Default::default()
    };
    let page = matches(&db, alice.id, &filters).await;
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].id, both.id);

    filters.operator = FilterOperator::Or;
    let page = matches(&db, alice.id, &filters).await;
    assert_eq!(page.items.len(), 2);
}

#[tokio::test]
async fn location_and_camera_metadata_filter_via_exif() {
    let db = support::test_db().await;
    let alice = support::seed_user(&db, "alice").await;

    let oslo = support::seed_asset(&db, alice.id).await;
    support::seed_exif(&db, oslo.id, Some("Oslo"), Some("Fujifilm"), Some(5)).await;
    let bergen = support::seed_asset(&db, alice.id).await;
    support::seed_exif(&db, bergen.id, Some("Bergen"), Some("Sony"), None).await;

    let filters = AlbumFilters {
        location: Some(LocationFilter::Structured {
            city: Some("Oslo".into()),
            state: None,
            country: None,
        }),
        ..Default::default()
    };
    let page = matches(&db, alice.id, &filters).await;
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].id, oslo.id);

    let filters = AlbumFilters {
        metadata: Some(MetadataFilter {
            make: Some("Fujifilm".into()),
            rating: Some(5),
            ..Default::default()
        }),
        ..Default::default()
    };
    let page = matches(&db, alice.id, &filters).await;
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].id, oslo.id);
}

#[tokio::test]
async fn date_range_bounds_are_inclusive() {
    let db = support::test_db().await;
    let alice = support::seed_user(&db, "alice").await;
    let start = Utc::now() - Duration::days(10);
    let end = Utc::now() - Duration::days(5);

    let on_start = support::AssetSeed::new(alice.id).taken_at(start).insert(&db).await;
    let inside = support::AssetSeed::new(alice.id)
        .taken_at(start + Duration::days(2))
        .insert(&db)
        .await;
    support::AssetSeed::new(alice.id)
        .taken_at(end + Duration::days(1))
        .insert(&db)
        .await;

    let filters = AlbumFilters {
        date_range: Some(DateRangeFilter { start, end }),
        ..Default::default()
    };
    let page = matches(&db, alice.id, &filters).await;
    let ids: Vec<Uuid> = page.items.iter().map(|a| a.id).collect();
    assert_eq!(ids, vec![on_start.id, inside.id]);
}

#[tokio::test]
async fn operator_combines_across_fields() {
    let db = support::test_db().await;
    let alice = support::seed_user(&db, "alice").await;

    let favorite_video = support::AssetSeed::new(alice.id)
        .favorite()
        .video()
        .insert(&db)
        .await;
    let favorite_image = support::AssetSeed::new(alice.id).favorite().insert(&db).await;
    let plain_video = support::AssetSeed::new(alice.id).video().insert(&db).await;

    let mut filters = AlbumFilters {
        asset_type: Some(MediaType::Video),
        metadata: Some(MetadataFilter {
            is_favorite: Some(true),
            ..Default::default()
        }),
        operator: FilterOperator::And,
        ..Default::default()
    };
    let page = matches(&db, alice.id, &filters).await;
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].id, favorite_video.id);

    filters.operator = FilterOperator::Or;
    let page = matches(&db, alice.id, &filters).await;
    let ids: Vec<Uuid> = page.items.iter().map(|a| a.id).collect();
    assert_eq!(ids.len(), 3);
    assert!(ids.contains(&favorite_image.id));
    assert!(ids.contains(&plain_video.id));
}

#[tokio::test]
async fn recovery_policy_governs_query_failures() {
    // An unmigrated database fails every query, exercising both
    // recovery paths without any timing assumptions.
    let empty = Database::in_memory().await.expect("open");
    let broken = FilterEvaluator::new(empty.conn().clone(), &SyncConfig::default());
    let owner = Uuid::new_v4();

    let err = broken
        .evaluate(
            Uuid::new_v4(),
            owner,
            &AlbumFilters::default(),
            SortOrder::Asc,
            SearchPagination::new(1, 10),
            RecoveryPolicy::Strict,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, SearchError::Database(_)));

    let page = broken
        .evaluate(
            Uuid::new_v4(),
            owner,
            &AlbumFilters::default(),
            SortOrder::Asc,
            SearchPagination::new(1, 10),
            RecoveryPolicy::BestEffort,
        )
        .await
        .unwrap();
    assert!(page.items.is_empty());
    assert!(!page.has_next_page);
}

#[tokio::test]
async fn pagination_reports_lookahead() {
    let db = support::test_db().await;
    let alice = support::seed_user(&db, "alice").await;
    for _ in 0..3 {
        support::seed_asset(&db, alice.id).await;
    }

    let page = evaluator(&db)
        .evaluate(
            Uuid::new_v4(),
            alice.id,
            &AlbumFilters::default(),
            SortOrder::Asc,
            SearchPagination::new(1, 2),
            RecoveryPolicy::Strict,
        )
        .await
        .unwrap();
    assert_eq!(page.items.len(), 2);
    assert!(page.has_next_page);

    let page = evaluator(&db)
        .evaluate(
            Uuid::new_v4(),
            alice.id,
            &AlbumFilters::default(),
            SortOrder::Asc,
            SearchPagination::new(2, 2),
            RecoveryPolicy::Strict,
        )
        .await
        .unwrap();
    assert_eq!(page.items.len(), 1);
    assert!(!page.has_next_page);
}
