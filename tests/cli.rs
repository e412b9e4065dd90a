use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn overlay_cmd(config_home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("dsnap-overlay").expect("binary exists");
    cmd.env("XDG_CONFIG_HOME", config_home.path());
    cmd
}

fn write_png(dir: &TempDir, name: &str, width: i32, height: i32) -> std::path::PathBuf {
    let surface = cairo::ImageSurface::create(cairo::Format::ARgb32, width, height).unwrap();
    {
        let ctx = cairo::Context::new(&surface).unwrap();
        ctx.set_source_rgb(0.2, 0.4, 0.6);
        ctx.paint().unwrap();
    }
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    surface.write_to_png(&mut file).unwrap();
    path
}

#[test]
fn help_prints_usage() {
    let temp = TempDir::new().unwrap();
    overlay_cmd(&temp)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Screenshot annotation overlay"));
}

#[test]
fn missing_input_is_an_error() {
    let temp = TempDir::new().unwrap();
    overlay_cmd(&temp)
        .assert()
        .failure()
        .stderr(predicate::str::contains("no screenshot given"));
}

#[test]
fn image_and_capture_conflict() {
    let temp = TempDir::new().unwrap();
    overlay_cmd(&temp)
        .args(["--image", "shot.png", "--capture"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}

#[test]
fn malformed_drag_is_rejected() {
    let temp = TempDir::new().unwrap();
    overlay_cmd(&temp)
        .args(["--image", "shot.png", "--select", "1,2,3"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("expected 4 comma-separated numbers"));
}

#[test]
fn selection_is_reported_and_png_written() {
    let temp = TempDir::new().unwrap();
    let image = write_png(&temp, "shot.png", 200, 100);
    let output = temp.path().join("out.png");

    overlay_cmd(&temp)
        .arg("--image")
        .arg(&image)
        .args(["--width", "200", "--height", "100"])
        .args(["--select", "10,10,60,40"])
        .args(["--rect", "100,10,150,60", "--arrow", "20,90,180,90"])
        .arg("--output")
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("selection: 10,10 50x30"))
        .stdout(predicate::str::contains("saved:"));

    let bytes = std::fs::read(&output).unwrap();
    let decoded = cairo::ImageSurface::create_from_png(&mut bytes.as_slice()).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (200, 100));
}

#[test]
fn magnifier_state_is_printed_as_json() {
    let temp = TempDir::new().unwrap();
    let image = write_png(&temp, "shot.png", 400, 200);
    let output = temp.path().join("out.png");

    overlay_cmd(&temp)
        .arg("--image")
        .arg(&image)
        .args(["--width", "200", "--height", "100", "--magnify", "30,40"])
        .arg("--output")
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"show\":true"))
        .stdout(predicate::str::contains("\"bgScale\":0.5"))
        .stdout(predicate::str::contains("\"originalImageWidth\":400"));
}

#[test]
fn mask_flag_uses_mask_selection() {
    let temp = TempDir::new().unwrap();
    let image = write_png(&temp, "shot.png", 200, 100);
    let output = temp.path().join("out.png");

    overlay_cmd(&temp)
        .arg("--image")
        .arg(&image)
        .args(["--width", "200", "--height", "100", "--mask"])
        .args(["--select", "60,40,10,10"])
        .arg("--output")
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("selection: 10,10 50x30"));
}

#[test]
fn invalid_config_reports_path() {
    let temp = TempDir::new().unwrap();
    let image = write_png(&temp, "shot.png", 20, 20);
    let config = temp.path().join("overlay.toml");
    std::fs::write(
        &config,
        "[shortcuts]\nselection = \"2\"\nrectangle = \"2\"\n",
    )
    .unwrap();

    overlay_cmd(&temp)
        .arg("--image")
        .arg(&image)
        .arg("--config")
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid shortcuts"));
}
