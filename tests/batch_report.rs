use caption_overlay::{BatchFailure, BatchReport, CaptionError, Config};
use std::fs;
use std::path::PathBuf;

#[test]
fn batch_report_json_shape() {
    let report = BatchReport {
        processed: 2,
        written: vec![PathBuf::from("out/1.jpeg")],
        failures: vec![BatchFailure {
            image: PathBuf::from("in/2.png"),
            caption: "broken".to_string(),
            error: "failed to open image: in/2.png".to_string(),
        }],
    };
    insta::assert_json_snapshot!(report, @r#"
    {
      "processed": 2,
      "written": [
        "out/1.jpeg"
      ],
      "failures": [
        {
          "image": "in/2.png",
          "caption": "broken",
          "error": "failed to open image: in/2.png"
        }
      ]
    }
    "#);
}

#[test]
fn run_without_font_reports_no_font() {
    let dir = tempfile::tempdir().expect("tempdir");
    let images = dir.path().join("images");
    let fonts = dir.path().join("fonts");
    fs::create_dir_all(&images).expect("images");
    fs::create_dir_all(&fonts).expect("fonts");
    let captions = dir.path().join("captions.txt");
    fs::write(&captions, "你好，世界。\n").expect("captions");

    let err = caption_overlay::run(Config {
        image_dir: images,
        caption_file: captions,
        font_dir: fonts,
        output_dir: dir.path().join("output"),
        ..Config::default()
    })
    .expect_err("no font");
    assert!(matches!(
        err.downcast_ref::<CaptionError>(),
        Some(CaptionError::NoFont { .. })
    ));
}

#[test]
fn run_with_missing_settings_file_fails() {
    let dir = tempfile::tempdir().expect("tempdir");
    let err = caption_overlay::run(Config {
        image_dir: dir.path().to_path_buf(),
        caption_file: dir.path().join("captions.txt"),
        font_dir: dir.path().to_path_buf(),
        output_dir: dir.path().join("output"),
        settings_path: Some(dir.path().join("missing.toml")),
        ..Config::default()
    })
    .expect_err("missing settings");
    assert!(err.to_string().contains("settings file not found"));
}
