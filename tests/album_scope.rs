//! Album-scoped asset and exif delivery
//!
//! Sharing an album also shares its member assets: viewers receive the
//! asset and exif rows through the regular sections, ahead of the
//! membership rows that reference them.

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

fn asset_upserts(changes: &[SyncChange]) -> Vec<Uuid> {
    changes
        .iter()
        .filter_map(|c| match &c.payload {
            SyncPayload::AssetUpsert(a) => Some(a.id),
            _ => None,
        })
        .collect()
}

fn exif_upserts(changes: &[SyncChange]) -> Vec<(Uuid, i64)> {
    changes
        .iter()
        .filter_map(|c| match &c.payload {
            SyncPayload::AssetExifUpsert(e) => Some((e.asset_id, e.update_id)),
            _ => None,
        })
        .collect()
}

fn asset_position(changes: &[SyncChange], asset_id: Uuid) -> usize {
    changes
        .iter()
        .position(|c| matches!(&c.payload, SyncPayload::AssetUpsert(a) if a.id == asset_id))
        .expect("asset upsert")
}

fn membership_position(changes: &[SyncChange], asset_id: Uuid) -> usize {
    changes
        .iter()
        .position(
            |c| matches!(&c.payload, SyncPayload::AlbumAssetUpsert(m) if m.asset_id == asset_id),
        )
        .expect("membership upsert")
}

#[tokio::test]
async fn shared_album_viewer_receives_member_assets() {
    let service = support::test_service().await;
    let db = service.db();

    let alice = support::seed_user(db, "alice").await;
    let bob = support::seed_user(db, "bob").await;

    let shared = support::seed_asset(db, bob.id).await;
    let exif = support::seed_exif(db, shared.id, Some("Oslo"), None, None).await;
    let private = support::seed_asset(db, bob.id).await;

    let album = support::seed_album(db, bob.id, "trip").await;
    support::seed_album_asset(db, album.id, shared.id).await;
    support::seed_share(db, album.id, alice.id).await;

    let changes = support::drain(service.sync(alice.id, None)).await;

    let assets = asset_upserts(&changes);
    assert!(assets.contains(&shared.id));
    assert!(!assets.contains(&private.id));
    assert_eq!(exif_upserts(&changes), vec![(shared.id, exif.update_id)]);

    // The asset lands before the membership row that references it.
    assert!(asset_position(&changes, shared.id) < membership_position(&changes, shared.id));
}

#[tokio::test]
async fn shared_dynamic_album_viewer_receives_member_assets() {
    let service = support::test_service().await;
    let db = service.db();
    let albums = DynamicAlbumService::new(db);

    let alice = support::seed_user(db, "alice").await;
    let bob = support::seed_user(db, "bob").await;

    let favorite = support::AssetSeed::new(bob.id).favorite().insert(db).await;
    let exif = support::seed_exif(db, favorite.id, None, Some("Fujifilm"), None).await;
    let plain = support::seed_asset(db, bob.id).await;

    let dynamic = albums
        .create(bob.id, "favorites", favorite_filters(), AlbumOrder::Desc)
        .await
        .unwrap();
    support::seed_share(db, dynamic.id, alice.id).await;

    let changes = support::drain(service.sync(alice.id, None)).await;

    let assets = asset_upserts(&changes);
    assert!(assets.contains(&favorite.id));
    assert!(!assets.contains(&plain.id));
    assert_eq!(exif_upserts(&changes), vec![(favorite.id, exif.update_id)]);
    assert!(asset_position(&changes, favorite.id) < membership_position(&changes, favorite.id));
}

#[tokio::test]
async fn member_assets_are_not_duplicated_for_the_owner() {
    let service = support::test_service().await;
    let db = service.db();
    let albums = DynamicAlbumService::new(db);

    let alice = support::seed_user(db, "alice").await;
    let favorite = support::AssetSeed::new(alice.id).favorite().insert(db).await;
    support::seed_exif(db, favorite.id, None, None, Some(5)).await;

    // The same asset is reachable as owned, as a static member and as a
    // dynamic member.
    let album = support::seed_album(db, alice.id, "picks").await;
    support::seed_album_asset(db, album.id, favorite.id).await;
    albums
        .create(alice.id, "favorites", favorite_filters(), AlbumOrder::Desc)
        .await
        .unwrap();

    let changes = support::drain(service.sync(alice.id, None)).await;

    let assets = asset_upserts(&changes);
    assert_eq!(assets, vec![favorite.id]);
    assert_eq!(exif_upserts(&changes).len(), 1);
}

#[tokio::test]
async fn exif_edits_reach_album_viewers() {
    let service = support::test_service().await;
    let db = service.db();

    let alice = support::seed_user(db, "alice").await;
    let bob = support::seed_user(db, "bob").await;

    let shared = support::seed_asset(db, bob.id).await;
    support::seed_exif(db, shared.id, None, None, None).await;
    let album = support::seed_album(db, bob.id, "trip").await;
    support::seed_album_asset(db, album.id, shared.id).await;
    support::seed_share(db, album.id, alice.id).await;

    let baseline = support::drain(service.sync(alice.id, None)).await;
    let ack = baseline.last().unwrap().ack;

    let edited = support::touch_exif(db, shared.id).await;

    let round = support::drain(service.sync(alice.id, Some(ack))).await;
    assert_eq!(exif_upserts(&round), vec![(shared.id, edited.update_id)]);
}

#[tokio::test]
async fn newly_shared_album_backfills_member_assets() {
    let service = support::test_service().await;
    let db = service.db();

    let alice = support::seed_user(db, "alice").await;
    let bob = support::seed_user(db, "bob").await;
    let shared = support::seed_asset(db, bob.id).await;
    let exif = support::seed_exif(db, shared.id, Some("Bergen"), None, None).await;

    // Alice's cursor already passed the asset's update id before the
    // album existed.
    let baseline = support::drain(service.sync(alice.id, None)).await;
    let ack = baseline.last().unwrap().ack;
    assert!(!asset_upserts(&baseline).contains(&shared.id));

    let album = support::seed_album(db, bob.id, "trip").await;
    support::seed_album_asset(db, album.id, shared.id).await;
    support::seed_share(db, album.id, alice.id).await;

    let round = support::drain(service.sync(alice.id, Some(ack))).await;

    let assets = asset_upserts(&round);
    assert!(assets.contains(&shared.id));
    assert_eq!(exif_upserts(&round), vec![(shared.id, exif.update_id)]);
    assert!(asset_position(&round, shared.id) < membership_position(&round, shared.id));

    // Backfilled history sits at or below the cursor the client already
    // holds.
    assert!(shared.update_id <= ack.update_id().value());
}
