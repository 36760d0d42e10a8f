use assert_cmd::prelude::*;
use predicates::prelude::*;
use predicates::str::contains;
use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

const COURT_OBJ: &str = "mtllib teren2.mtl
o court
v -1.0 0.0 -1.0
v 1.0 0.0 -1.0
v 1.0 0.0 1.0
v -1.0 0.0 1.0
vt 0.0 0.0
vt 1.0 0.0
vt 1.0 1.0
vt 0.0 1.0
vn 0.0 1.0 0.0
usemtl floor
f 1/1/1 2/2/1 3/3/1
f 1/1/1 3/3/1 4/4/1
";

const COURT_MTL: &str = "newmtl floor
map_Kd floor.png
map_Ks floor_spec.png
";

fn write(root: &Path, relative: &str, contents: &[u8]) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().expect("parent dir")).expect("create dirs");
    fs::write(path, contents).expect("write asset");
}

fn write_png(root: &Path, relative: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().expect("parent dir")).expect("create dirs");
    image::RgbaImage::from_pixel(4, 2, image::Rgba([200, 120, 40, 255]))
        .save(path)
        .expect("write png");
}

fn courtside() -> Command {
    Command::cargo_bin("courtside").expect("binary exists")
}

#[test]
fn summary_reports_missing_assets_and_succeeds() {
    let root = TempDir::new().expect("temp root");
    courtside()
        .env("COURTSIDE_ROOT", root.path())
        .arg("--summary-only")
        .assert()
        .success()
        .stdout(contains("Scene with 10 objects"))
        .stdout(contains(" - kobe (resources/objects/kocka/kobe.obj)"))
        .stdout(contains("ball3.obj missing"))
        .stdout(contains("Missing assets: 9"));
}

#[test]
fn summary_lists_meshes_and_material_textures() {
    let root = TempDir::new().expect("temp root");
    write(
        root.path(),
        "resources/objects/kocka/teren2.obj",
        COURT_OBJ.as_bytes(),
    );
    write(
        root.path(),
        "resources/objects/kocka/teren2.mtl",
        COURT_MTL.as_bytes(),
    );
    write_png(root.path(), "resources/textures/container2.png");

    courtside()
        .env("COURTSIDE_ROOT", root.path())
        .arg("--summary-only")
        .assert()
        .success()
        .stdout(contains("teren2.obj meshes=1 textures=2"))
        .stdout(contains("mesh court vertices=4 indices=6"))
        .stdout(contains("floor.png texture_diffuse"))
        .stdout(contains("floor_spec.png texture_specular"))
        .stdout(contains("container2.png 4x2 levels=3"))
        .stdout(contains("Missing assets: 7"));
}

#[test]
fn loaded_material_textures_are_logged_without_rust_log() {
    let root = TempDir::new().expect("temp root");
    write(
        root.path(),
        "resources/objects/kocka/teren2.obj",
        COURT_OBJ.as_bytes(),
    );
    write(
        root.path(),
        "resources/objects/kocka/teren2.mtl",
        COURT_MTL.as_bytes(),
    );

    courtside()
        .env("COURTSIDE_ROOT", root.path())
        .env_remove("RUST_LOG")
        .arg("--summary-only")
        .assert()
        .success()
        .stderr(contains("floor.png texture_diffuse"))
        .stderr(contains("floor_spec.png texture_specular"));
}

#[test]
fn unknown_argument_is_rejected() {
    courtside()
        .arg("--fullscreen")
        .assert()
        .failure()
        .code(1)
        .stderr(contains("Unknown argument: --fullscreen"))
        .stdout(predicate::str::is_empty());
}
