use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;

fn lovestory(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("lovestory").unwrap();
    cmd.env("LOVESTORY_HOME", home);
    cmd
}

#[test]
fn add_then_list_shows_the_upload() {
    let home = tempfile::tempdir().unwrap();
    let photo = home.path().join("sunset.jpg");
    std::fs::write(&photo, vec![0u8; 2048]).unwrap();

    lovestory(home.path())
        .arg("add")
        .arg(&photo)
        .assert()
        .success()
        .stdout(predicate::str::contains("Added 1 of 1 files."));

    lovestory(home.path())
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("sunset.jpg"))
        .stdout(predicate::str::contains("image"));
}

#[test]
fn favorite_marks_the_listing() {
    let home = tempfile::tempdir().unwrap();
    let photo = home.path().join("beach.jpg");
    std::fs::write(&photo, b"jpeg").unwrap();

    lovestory(home.path()).arg("add").arg(&photo).assert().success();
    lovestory(home.path())
        .arg("favorite")
        .arg("1")
        .assert()
        .success()
        .stdout(predicate::str::contains("favorited beach.jpg"));

    lovestory(home.path())
        .arg("list")
        .arg("--favorites")
        .assert()
        .success()
        .stdout(predicate::str::contains("♥"))
        .stdout(predicate::str::contains("beach.jpg"));
}

#[test]
fn delete_empties_the_gallery() {
    let home = tempfile::tempdir().unwrap();
    let photo = home.path().join("gone.jpg");
    std::fs::write(&photo, b"jpeg").unwrap();

    lovestory(home.path()).arg("add").arg(&photo).assert().success();
    lovestory(home.path()).arg("delete").arg("1").assert().success();

    lovestory(home.path())
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No media found."));
}

#[test]
fn comment_shows_up_under_show() {
    let home = tempfile::tempdir().unwrap();
    let photo = home.path().join("dinner.jpg");
    std::fs::write(&photo, b"jpeg").unwrap();

    lovestory(home.path()).arg("add").arg(&photo).assert().success();
    lovestory(home.path())
        .args(["comment", "1", "Beautiful!", "--author", "Ana"])
        .assert()
        .success();

    lovestory(home.path())
        .args(["show", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Ana"))
        .stdout(predicate::str::contains("Beautiful!"));
}

#[test]
fn guestbook_roundtrip() {
    let home = tempfile::tempdir().unwrap();

    lovestory(home.path())
        .args(["guestbook", "add", "Congrats!", "--name", "Ana"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Message from Ana saved."));

    lovestory(home.path())
        .args(["guestbook", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Ana"))
        .stdout(predicate::str::contains("Congrats!"));

    lovestory(home.path())
        .args(["guestbook", "react", "1", "👍"])
        .assert()
        .success()
        .stdout(predicate::str::contains("👍 1"));
}

#[test]
fn settings_persist_between_invocations() {
    let home = tempfile::tempdir().unwrap();

    lovestory(home.path())
        .args(["settings", "set", "--theme", "dark"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Settings saved."));

    lovestory(home.path())
        .args(["settings", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("theme = dark"))
        .stdout(predicate::str::contains("upload-limit = 100"));
}

#[test]
fn export_writes_a_dated_zip() {
    let home = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    let photo = home.path().join("trip.jpg");
    std::fs::write(&photo, b"jpeg").unwrap();

    lovestory(home.path()).arg("add").arg(&photo).assert().success();
    lovestory(home.path())
        .args(["export", "--out"])
        .arg(out.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported 1 items"));

    let archives: Vec<_> = std::fs::read_dir(out.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| {
            let name = e.file_name().to_string_lossy().into_owned();
            name.starts_with("love-story-backup-") && name.ends_with(".zip")
        })
        .collect();
    assert_eq!(archives.len(), 1);
}

#[test]
fn seed_fills_an_empty_gallery_once() {
    let home = tempfile::tempdir().unwrap();

    lovestory(home.path())
        .arg("seed")
        .assert()
        .success()
        .stdout(predicate::str::contains("Seeded 3 demo items."));

    lovestory(home.path())
        .arg("seed")
        .assert()
        .success()
        .stdout(predicate::str::contains("nothing to seed"));

    lovestory(home.path())
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("demo-1.txt"));
}
