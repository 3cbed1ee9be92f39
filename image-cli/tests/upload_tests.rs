mod common;

use common::*;

use image_cli::args::Operation;
use image_storage::mock::InMemoryImageStore;
use pretty_assertions::assert_eq;

#[tokio::test]
async fn test_upload_new_image() {
    let ctx = TestContext::new(&[]);
    let path = ctx.local_file("cat.png", b"cat");

    ctx.manager.upload(&path, None).await.unwrap();

    assert_eq!(ctx.store.contents("cat.png"), Some(b"cat".to_vec()));
    assert_eq!(
        ctx.lines(),
        vec!["Image 'cat.png' successfully uploaded".to_string()]
    );
    assert!(ctx.prompts().is_empty());
}

#[tokio::test]
async fn test_upload_with_name_uses_its_base_name() {
    let ctx = TestContext::new(&[]);
    let path = ctx.local_file("cat.png", b"cat");

    ctx.manager
        .run(Operation::Upload {
            path,
            name: Some("pets/kitty.png".to_string()),
        })
        .await
        .unwrap();

    assert_eq!(ctx.store.contents("kitty.png"), Some(b"cat".to_vec()));
    assert_eq!(ctx.store.contents("cat.png"), None);
    assert_eq!(
        ctx.lines(),
        vec!["Image 'cat.png' successfully uploaded as 'kitty.png'".to_string()]
    );
}

#[tokio::test]
async fn test_missing_local_file_makes_no_remote_call() {
    let ctx = TestContext::new(&[]);

    ctx.manager
        .upload(&ctx.local_path("ghost.png"), None)
        .await
        .unwrap();

    assert_eq!(
        ctx.lines(),
        vec!["Image 'ghost.png' doesn't exist in specified path".to_string()]
    );
    assert_eq!(ctx.store.upload_calls(), 0);
}

#[tokio::test]
async fn test_existing_object_is_overwritten_on_y() {
    let ctx = TestContext::new(&["y"]);
    ctx.store.insert("cat.png", b"old");
    let path = ctx.local_file("cat.png", b"new");

    ctx.manager.upload(&path, None).await.unwrap();

    assert_eq!(
        ctx.prompts(),
        vec!["'cat.png' already exists on s3, override? (y/N): ".to_string()]
    );
    assert_eq!(ctx.store.contents("cat.png"), Some(b"new".to_vec()));
}

#[tokio::test]
async fn test_declined_overwrite_leaves_object_untouched() {
    let ctx = TestContext::new(&["n"]);
    ctx.store.insert("cat.png", b"old");
    let path = ctx.local_file("cat.png", b"new");

    ctx.manager.upload(&path, None).await.unwrap();

    assert_eq!(
        ctx.lines(),
        vec!["Cancelled upload of file 'cat.png' to s3".to_string()]
    );
    assert_eq!(ctx.store.contents("cat.png"), Some(b"old".to_vec()));
    assert_eq!(ctx.store.upload_calls(), 0);
}

#[tokio::test]
async fn test_labeled_image_counts_as_existing() {
    let ctx = TestContext::new(&[""]);
    ctx.table.insert(labeled("cat.png"));
    let path = ctx.local_file("cat.png", b"new");

    ctx.manager.upload(&path, None).await.unwrap();

    assert_eq!(ctx.prompts().len(), 1);
    assert_eq!(ctx.store.upload_calls(), 0);
}

#[tokio::test]
async fn test_rejected_upload_is_reported() {
    let ctx = TestContext::with_store(InMemoryImageStore::new().rejecting_uploads(), &[]);
    let path = ctx.local_file("notes.exe", b"MZ");

    ctx.manager.upload(&path, None).await.unwrap();

    assert_eq!(
        ctx.lines(),
        vec!["Error uploading, unauthorized file type".to_string()]
    );
}

#[tokio::test]
async fn test_unusable_name_is_reported() {
    let ctx = TestContext::new(&[]);
    let path = ctx.local_file("cat.png", b"cat");

    ctx.manager.upload(&path, Some("pets/")).await.unwrap();

    assert_eq!(ctx.lines(), vec!["Invalid image name 'pets/'".to_string()]);
    assert_eq!(ctx.store.upload_calls(), 0);
}
