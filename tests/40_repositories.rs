mod common;

use anyhow::Result;
use sqlx::PgPool;

use common::{test_pool, test_tokens, unique_email};
use playlists_api::database::models::{
    CreateBandRequest, CreateUserRequest, MemberRequest, PlaylistRequest, SongRequest,
};
use playlists_api::database::{BandRepository, BandScope, PlaylistRepository, UserRepository};
use playlists_api::services::{AuthError, AuthService};

async fn new_user(pool: &PgPool, prefix: &str) -> Result<i32> {
    let users = UserRepository::new(pool.clone());
    let user = users
        .create(&CreateUserRequest {
            first_name: "Repo".into(),
            last_name: "Test".into(),
            email: unique_email(prefix),
            password: "pw".into(),
        })
        .await?;
    Ok(user.id)
}

fn member(name: &str, role: &str) -> MemberRequest {
    MemberRequest {
        name: name.into(),
        role: role.into(),
        ..Default::default()
    }
}

#[tokio::test]
async fn band_creation_rolls_back_when_a_member_fails() -> Result<()> {
    let Some(pool) = test_pool().await? else {
        return Ok(());
    };
    let owner = new_user(&pool, "atomic").await?;
    let bands = BandRepository::new(pool.clone());

    // Postgres text cannot hold NUL, so the second member insert fails mid-transaction
    let req = CreateBandRequest {
        name: "Half Built".into(),
        description: String::new(),
        members: vec![member("Ok", "Drums"), member("Broken", "Bass\0")],
    };
    assert!(bands.create(owner, &req).await.is_err());

    let (band_count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM bands WHERE owner_id = $1")
        .bind(owner)
        .fetch_one(&pool)
        .await?;
    let (member_count,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM band_members m JOIN bands b ON b.id = m.band_id WHERE b.owner_id = $1",
    )
    .bind(owner)
    .fetch_one(&pool)
    .await?;
    assert_eq!(band_count, 0);
    assert_eq!(member_count, 0);

    let ok = CreateBandRequest {
        name: "Whole".into(),
        description: "complete".into(),
        members: vec![member("A", "Vocals"), member("B", "Guitar")],
    };
    let created = bands.create(owner, &ok).await?.expect("owner exists");
    assert_eq!(created.member_count, 2);
    assert_eq!(created.members[0].name, "A");
    Ok(())
}

#[tokio::test]
async fn band_for_vanished_owner_is_absent() -> Result<()> {
    let Some(pool) = test_pool().await? else {
        return Ok(());
    };
    let owner = new_user(&pool, "vanished").await?;
    assert!(UserRepository::new(pool.clone()).delete(owner).await?);

    let bands = BandRepository::new(pool.clone());
    let req = CreateBandRequest {
        name: "Ghost".into(),
        members: vec![member("A", "Vocals")],
        ..Default::default()
    };
    assert!(bands.create(owner, &req).await?.is_none());

    let (member_count,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM band_members m JOIN bands b ON b.id = m.band_id WHERE b.owner_id = $1",
    )
    .bind(owner)
    .fetch_one(&pool)
    .await?;
    assert_eq!(member_count, 0);
    Ok(())
}

#[tokio::test]
async fn child_creation_reverifies_parent_ownership() -> Result<()> {
    let Some(pool) = test_pool().await? else {
        return Ok(());
    };
    let owner = new_user(&pool, "parent").await?;
    let intruder = new_user(&pool, "intruder").await?;
    let bands = BandRepository::new(pool.clone());
    let playlists = PlaylistRepository::new(pool.clone());

    let band = bands
        .create(
            owner,
            &CreateBandRequest {
                name: "Mine".into(),
                ..Default::default()
            },
        )
        .await?
        .expect("owner exists");
    let theirs = BandScope::new(intruder, band.band.id);

    assert!(bands.add_member(theirs, &member("Sneaky", "Spy")).await?.is_none());
    assert!(playlists
        .create(
            theirs,
            &PlaylistRequest {
                name: "Sneaky".into(),
                ..Default::default()
            },
        )
        .await?
        .is_none());
    assert!(bands.list_members(theirs).await?.is_none());
    assert!(playlists.artists(theirs, "a").await?.is_none());
    assert!(!bands.delete(theirs).await?);

    let mine = BandScope::new(owner, band.band.id);
    assert_eq!(bands.list_members(mine).await?.map(|m| m.len()), Some(0));
    Ok(())
}

#[tokio::test]
async fn song_operations_walk_the_whole_chain() -> Result<()> {
    let Some(pool) = test_pool().await? else {
        return Ok(());
    };
    let owner = new_user(&pool, "chain").await?;
    let other = new_user(&pool, "chain-other").await?;
    let bands = BandRepository::new(pool.clone());
    let playlists = PlaylistRepository::new(pool.clone());

    let band = bands
        .create(
            owner,
            &CreateBandRequest {
                name: "Chain".into(),
                ..Default::default()
            },
        )
        .await?
        .expect("owner exists");
    let band_scope = BandScope::new(owner, band.band.id);
    let playlist = playlists
        .create(
            band_scope,
            &PlaylistRequest {
                name: "Set".into(),
                ..Default::default()
            },
        )
        .await?
        .expect("owner can create playlists");
    assert_eq!(playlist.song_count, 0);
    assert!(playlist.songs.is_empty());
    let scope = band_scope.playlist(playlist.playlist.id);

    let song_req = SongRequest {
        artist: "Queen".into(),
        song: "Innuendo".into(),
        notes: String::new(),
        position: 3,
    };
    let song = playlists.add_song(scope, &song_req).await?.expect("owner can add songs");

    let foreign = BandScope::new(other, band.band.id).playlist(playlist.playlist.id);
    assert!(playlists.get_song(foreign, song.id).await?.is_none());
    assert!(playlists.update_song(foreign, song.id, &song_req).await?.is_none());
    assert!(!playlists.delete_song(foreign, song.id).await?);
    assert!(playlists.get(foreign).await?.is_none());

    let fetched = playlists.get(scope).await?.expect("owner can read playlist");
    assert_eq!(fetched.song_count, 1);
    assert_eq!(fetched.songs[0].position, 3);

    assert!(playlists.delete_song(scope, song.id).await?);
    assert!(playlists.get_song(scope, song.id).await?.is_none());
    Ok(())
}

#[tokio::test]
async fn authenticate_rechecks_subject() -> Result<()> {
    let Some(pool) = test_pool().await? else {
        return Ok(());
    };
    let users = UserRepository::new(pool.clone());
    let auth = AuthService::new(users.clone(), test_tokens());
    let email = unique_email("recheck");

    let session = auth
        .register(&CreateUserRequest {
            email: email.clone(),
            password: "pw1".into(),
            ..Default::default()
        })
        .await?;
    let user = auth.authenticate(&session.token).await?;
    assert_eq!(user.id, session.user.id);
    assert!(users.find_by_email(&email).await?.is_some());

    assert!(users.delete(user.id).await?);
    assert!(matches!(
        auth.authenticate(&session.token).await,
        Err(AuthError::Unauthenticated)
    ));
    assert!(users.find_by_id(user.id).await?.is_none());
    Ok(())
}

#[tokio::test]
async fn update_password_on_missing_user_is_not_found() -> Result<()> {
    let Some(pool) = test_pool().await? else {
        return Ok(());
    };
    let users = UserRepository::new(pool);
    let err = users.update_password(i32::MAX, "pw").await.unwrap_err();
    assert!(matches!(err, playlists_api::database::DatabaseError::NotFound(_)));
    Ok(())
}
