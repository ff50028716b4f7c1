//! End-to-end dataset walks over generated fixtures

mod common;

use common::{
    config_for, dataset_root, file_names, subdirectory_names, write_image_set, write_sample,
    SampleKind,
};
use dataset_verify::{validate_dataset, DatasetWalker, ErrorReport, ValidatorConfig};

#[tokio::test]
async fn test_missing_prompt_directory_is_quarantined() {
    let (tmp, root) = dataset_root();
    write_sample(&root, "a", SampleKind::Valid);
    write_sample(&root, "b", SampleKind::Valid);
    let broken = root.join("c");
    write_image_set(&broken, "000", SampleKind::Valid);

    let summary = validate_dataset(config_for(&root)).await.unwrap();

    assert_eq!(summary.directories, 3);
    assert_eq!(summary.total_checked, 2);
    assert_eq!(summary.errors.len(), 1);
    assert_eq!(summary.quarantined, 1);

    let key = broken.display().to_string();
    let messages = summary.errors.get(&key).unwrap();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].starts_with("Directory processing error: Image set check failed"));
    assert!(messages[0].contains("Missing prompt.json file in directory"));

    assert_eq!(subdirectory_names(&root), vec!["a", "b"]);
    assert!(tmp.path().join("error_directories").join("c").join("000_0.png").exists());
}

#[tokio::test]
async fn test_mixed_dataset() {
    let (tmp, root) = dataset_root();
    write_sample(&root, "good", SampleKind::Valid);
    write_sample(&root, "shifted", SampleKind::LowOverlap);
    write_sample(&root, "blank_mask", SampleKind::EmptyMask);
    write_sample(&root, "gray_sketch", SampleKind::GraySketch);

    let summary = validate_dataset(config_for(&root)).await.unwrap();

    assert_eq!(summary.directories, 4);
    assert_eq!(summary.total_checked, 1);
    assert_eq!(summary.errors.len(), 3);
    assert_eq!(summary.quarantined, 3);
    assert_eq!(summary.failed_tasks, 0);
    assert_eq!(summary.low_overlap_count(), 1);

    let blank = summary.errors.get(&root.join("blank_mask").display().to_string()).unwrap();
    assert!(blank[0].contains("Mask area is 0"));

    let gray = summary.errors.get(&root.join("gray_sketch").display().to_string()).unwrap();
    assert!(gray[0].contains("is not properly binarized. Found values: [0 128]"));

    let shifted = summary.errors.get(&root.join("shifted").display().to_string()).unwrap();
    assert!(shifted[0].contains("Low overlap between mask and actual differences: 0.00"));

    assert_eq!(subdirectory_names(&root), vec!["good"]);
    assert_eq!(
        subdirectory_names(&tmp.path().join("error_directories")),
        vec!["blank_mask", "gray_sketch", "shifted"]
    );
}

#[tokio::test]
async fn test_second_run_is_clean() {
    let (tmp, root) = dataset_root();
    let error_dir = tmp.path().join("error_directories");
    write_sample(&root, "a", SampleKind::Valid);
    write_sample(&root, "b", SampleKind::LowOverlap);

    let first = validate_dataset(config_for(&root)).await.unwrap();
    assert_eq!(first.errors.len(), 1);
    assert_eq!(first.total_checked, 1);

    let root_before = subdirectory_names(&root);
    let quarantine_before = subdirectory_names(&error_dir);
    let sample_before = file_names(&root.join("a"));
    let quarantined_sample_before = file_names(&error_dir.join("b"));

    let second = validate_dataset(config_for(&root)).await.unwrap();
    assert!(second.errors.is_empty());
    assert_eq!(second.directories, 1);
    assert_eq!(second.total_checked, first.total_checked);
    assert_eq!(second.quarantined, 0);

    assert_eq!(subdirectory_names(&root), root_before);
    assert_eq!(subdirectory_names(&error_dir), quarantine_before);
    assert_eq!(file_names(&root.join("a")), sample_before);
    assert_eq!(file_names(&error_dir.join("b")), quarantined_sample_before);
    assert_eq!(root_before, vec!["a"]);
    assert_eq!(quarantine_before, vec!["b"]);
}

#[tokio::test]
async fn test_quarantine_collision_replaces_old_entry() {
    let (tmp, root) = dataset_root();
    let error_dir = tmp.path().join("error_directories");
    let stale = error_dir.join("dup");
    std::fs::create_dir_all(&stale).unwrap();
    std::fs::write(stale.join("stale.txt"), b"left over from an earlier run").unwrap();

    let fresh = root.join("dup");
    write_image_set(&fresh, "000", SampleKind::Valid);

    let summary = validate_dataset(config_for(&root)).await.unwrap();
    assert_eq!(summary.quarantined, 1);

    assert!(!stale.join("stale.txt").exists());
    assert!(error_dir.join("dup").join("000_0.png").exists());
    assert!(!fresh.exists());
}

#[tokio::test]
async fn test_report_round_trip_through_disk() {
    let (tmp, root) = dataset_root();
    write_sample(&root, "a", SampleKind::LowOverlap);
    write_sample(&root, "b", SampleKind::Valid);

    let config = ValidatorConfig::builder()
        .root_path(&root)
        .report_path(tmp.path().join("reports").join("final_bincheck_validation_errors.json"))
        .build()
        .unwrap();
    let report_path = config.report_path();

    let summary = DatasetWalker::new(config).unwrap().walk().await.unwrap();
    summary.errors.save(&report_path).unwrap();

    let loaded = ErrorReport::load(&report_path).unwrap();
    assert_eq!(loaded, summary.errors);
    assert_eq!(loaded.first_key(), Some(root.join("a").display().to_string().as_str()));
}

#[tokio::test]
async fn test_custom_error_dir() {
    let (tmp, root) = dataset_root();
    write_sample(&root, "a", SampleKind::LowOverlap);
    let quarantine = tmp.path().join("elsewhere").join("rejected");

    let config = ValidatorConfig::builder()
        .root_path(&root)
        .error_dir_path(&quarantine)
        .build()
        .unwrap();
    let summary = validate_dataset(config).await.unwrap();

    assert_eq!(summary.quarantined, 1);
    assert_eq!(subdirectory_names(&quarantine), vec!["a"]);
    assert!(!tmp.path().join("error_directories").exists());
}

#[cfg(unix)]
#[tokio::test]
async fn test_symlinked_sample_directory_is_checked() {
    use std::os::unix::fs::symlink;

    let (tmp, root) = dataset_root();
    write_sample(&root, "real", SampleKind::Valid);
    let outside = write_sample(&tmp.path().join("elsewhere"), "shifted", SampleKind::LowOverlap);
    symlink(&outside, root.join("linked")).unwrap();

    let summary = validate_dataset(config_for(&root)).await.unwrap();

    assert_eq!(summary.directories, 2);
    assert_eq!(summary.total_checked, 1);
    assert_eq!(summary.low_overlap_count(), 1);
    assert!(summary.errors.get(&root.join("linked").display().to_string()).is_some());
    assert_eq!(summary.quarantined, 1);
    assert_eq!(subdirectory_names(&root), vec!["real"]);
}

#[cfg(unix)]
#[tokio::test]
async fn test_symlinked_image_files_are_checked() {
    use std::os::unix::fs::symlink;

    let (tmp, root) = dataset_root();
    let source = write_sample(&tmp.path().join("elsewhere"), "shifted", SampleKind::LowOverlap);
    let mirror = root.join("mirror");
    std::fs::create_dir_all(&mirror).unwrap();
    for name in ["000_0.png", "000_1.png", "000_2.png", "000_3.png", "prompt.json"] {
        symlink(source.join(name), mirror.join(name)).unwrap();
    }

    let summary = validate_dataset(config_for(&root)).await.unwrap();

    assert_eq!(summary.total_checked, 0);
    let messages = summary.errors.get(&mirror.display().to_string()).unwrap();
    assert!(messages[0].contains("Low overlap between mask and actual differences: 0.00"));
    assert_eq!(summary.quarantined, 1);
    assert!(!mirror.exists());
    assert!(tmp.path().join("error_directories").join("mirror").is_dir());
}
