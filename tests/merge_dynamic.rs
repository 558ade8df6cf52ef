//! Dynamic membership synthesis and the merged membership stream

mod support;

use uuid::Uuid;

use aperture_sync::domain::filters::{AlbumFilters, MetadataFilter};
use aperture_sync::infrastructure::database::entities::album::AlbumOrder;
use aperture_sync::services::DynamicAlbumService;
use aperture_sync::sync::{SyncChange, SyncPayload};

fn favorite_filters() -> AlbumFilters {
    AlbumFilters {
        metadata: Some(MetadataFilter {
            is_favorite: Some(true),
            ..Default::default()
        }),
        ..Default::default()
    }
}

fn membership_changes(changes: &[SyncChange]) -> Vec<(Uuid, Uuid, i64)> {
    changes
        .iter()
        .filter_map(|c| match &c.payload {
            SyncPayload::AlbumAssetUpsert(m) => Some((m.album_id, m.asset_id, m.update_id)),
            _ => None,
        })
        .collect()
}

#[tokio::test]
async fn dynamic_membership_is_synthesized_from_matching_assets() {
    let service = support::test_service().await;
    let db = service.db();
    let albums = DynamicAlbumService::new(db);

    let alice = support::seed_user(db, "alice").await;
    let favorite = support::AssetSeed::new(alice.id).favorite().insert(db).await;
    let plain = support::seed_asset(db, alice.id).await;

    let dynamic = albums
        .create(alice.id, "favorites", favorite_filters(), AlbumOrder::Desc)
        .await
        .unwrap();

    let changes = support::drain(service.sync(alice.id, None)).await;
    let memberships = membership_changes(&changes);

    assert_eq!(memberships.len(), 1);
    let (album_id, asset_id, update_id) = memberships[0];
    assert_eq!(album_id, dynamic.id);
    assert_eq!(asset_id, favorite.id);
    // Synthesized rows carry the asset's own update id.
    assert_eq!(update_id, favorite.update_id);
    assert_ne!(asset_id, plain.id);
}

#[tokio::test]
async fn static_and_dynamic_runs_merge_into_one_ascending_sequence() {
    let service = support::test_service().await;
    let db = service.db();
    let albums = DynamicAlbumService::new(db);

    let alice = support::seed_user(db, "alice").await;

    // Interleave static membership and favorite assets so the two runs
    // have alternating update ids.
    let static_album = support::seed_album(db, alice.id, "picks").await;
    let fav1 = support::AssetSeed::new(alice.id).favorite().insert(db).await;
    let plain1 = support::seed_asset(db, alice.id).await;
    support::seed_album_asset(db, static_album.id, plain1.id).await;
    let fav2 = support::AssetSeed::new(alice.id).favorite().insert(db).await;
    let plain2 = support::seed_asset(db, alice.id).await;
    support::seed_album_asset(db, static_album.id, plain2.id).await;

    albums
        .create(alice.id, "favorites", favorite_filters(), AlbumOrder::Asc)
        .await
        .unwrap();

    let changes = support::drain(service.sync(alice.id, None)).await;
    let memberships = membership_changes(&changes);

    assert_eq!(memberships.len(), 4);
    let update_ids: Vec<i64> = memberships.iter().map(|(_, _, id)| *id).collect();
    let mut sorted = update_ids.clone();
    sorted.sort();
    assert_eq!(update_ids, sorted);

    let member_assets: Vec<Uuid> = memberships.iter().map(|(_, a, _)| *a).collect();
    assert!(member_assets.contains(&fav1.id));
    assert!(member_assets.contains(&fav2.id));
    assert!(member_assets.contains(&plain1.id));
    assert!(member_assets.contains(&plain2.id));
}

#[tokio::test]
async fn dynamic_rows_respect_the_cursor() {
    let service = support::test_service().await;
    let db = service.db();
    let albums = DynamicAlbumService::new(db);

    let alice = support::seed_user(db, "alice").await;
    let early = support::AssetSeed::new(alice.id).favorite().insert(db).await;
    albums
        .create(alice.id, "favorites", favorite_filters(), AlbumOrder::Desc)
        .await
        .unwrap();

    let baseline = support::drain(service.sync(alice.id, None)).await;
    let ack = baseline.last().unwrap().ack;

    let late = support::AssetSeed::new(alice.id).favorite().insert(db).await;

    let round = support::drain(service.sync(alice.id, Some(ack))).await;
    let member_assets: Vec<Uuid> = membership_changes(&round)
        .iter()
        .map(|(_, a, _)| *a)
        .collect();
    assert_eq!(member_assets, vec![late.id]);
    assert!(!member_assets.contains(&early.id));
}

#[tokio::test]
async fn editing_an_asset_resurfaces_its_dynamic_membership() {
    let service = support::test_service().await;
    let db = service.db();
    let albums = DynamicAlbumService::new(db);

    let alice = support::seed_user(db, "alice").await;
    let favorite = support::AssetSeed::new(alice.id).favorite().insert(db).await;
    let dynamic = albums
        .create(alice.id, "favorites", favorite_filters(), AlbumOrder::Desc)
        .await
        .unwrap();

    let baseline = support::drain(service.sync(alice.id, None)).await;
    let ack = baseline.last().unwrap().ack;

    let touched = support::touch_asset(db, favorite.id).await;

    let round = support::drain(service.sync(alice.id, Some(ack))).await;
    let memberships = membership_changes(&round);
    assert_eq!(memberships, vec![(dynamic.id, favorite.id, touched.update_id)]);
}

#[tokio::test]
async fn shared_dynamic_albums_compute_against_the_owner() {
    let service = support::test_service().await;
    let db = service.db();
    let albums = DynamicAlbumService::new(db);

    let alice = support::seed_user(db, "alice").await;
    let bob = support::seed_user(db, "bob").await;
    let bobs_favorite = support::AssetSeed::new(bob.id).favorite().insert(db).await;
    // Alice's own favorite must not leak into bob's album.
    support::AssetSeed::new(alice.id).favorite().insert(db).await;

    let dynamic = albums
        .create(bob.id, "favorites", favorite_filters(), AlbumOrder::Desc)
        .await
        .unwrap();
    support::seed_share(db, dynamic.id, alice.id).await;

    let changes = support::drain(service.sync(alice.id, None)).await;
    let memberships = membership_changes(&changes);

    assert_eq!(memberships.len(), 1);
    assert_eq!(memberships[0].0, dynamic.id);
    assert_eq!(memberships[0].1, bobs_favorite.id);
}
