//! Folder resolution and lifecycle against a temporary sharded volume.

use std::fs;

use hw_projects_storage::{
    MIRROR_FILE_NAME, copy_project_folder, create_project_folder, delete_project_folder,
    load_project, read_dir_names, resolve_project_folder,
};
use hw_projects_test_helpers::{TestVolume, metro_elevator};

#[test]
fn resolves_the_single_matching_folder() {
    let volume = TestVolume::new();
    let expected = volume.add_folder("625301", "625301 Metro Elevator");
    volume.add_folder("625301", "625399 Someone Else");

    let found = resolve_project_folder(volume.root(), "625301").unwrap();
    assert_eq!(found, expected);
}

#[test]
fn missing_match_is_not_found_naming_the_prefix() {
    let volume = TestVolume::new();
    volume.add_folder("625301", "625302 Neighbour");

    let err = resolve_project_folder(volume.root(), "625301").unwrap_err();
    assert_eq!(err.error_type(), "NotFoundError");
    assert!(err.to_string().contains("625301"));
}

#[test]
fn missing_shard_directory_is_list_error() {
    let volume = TestVolume::new();
    let err = resolve_project_folder(volume.root(), "625301").unwrap_err();
    assert_eq!(err.error_type(), "ListError");

    let info = err.info();
    assert_eq!(info.code.as_deref(), Some("ENOENT"));
    assert_eq!(info.syscall.as_deref(), Some("scandir"));
    assert!(info.path.unwrap().ends_with("625xxx"));
}

#[test]
fn duplicate_prefixes_are_ambiguous() {
    let volume = TestVolume::new();
    volume.add_folder("625301", "625301 Metro Elevator");
    volume.add_folder("625301", "625301 Metro Elevator (old)");

    let err = resolve_project_folder(volume.root(), "625301").unwrap_err();
    assert_eq!(err.error_type(), "AmbiguousError");
    assert!(err.to_string().contains("Metro Elevator (old)"));
}

#[test]
fn resolution_does_not_mutate_the_volume() {
    let volume = TestVolume::new();
    volume.add_folder("625301", "625301 Metro Elevator");
    let shard = volume.shard_dir("625301");
    let before = read_dir_names(&shard).unwrap();

    for _ in 0..3 {
        resolve_project_folder(volume.root(), "625301").unwrap();
    }
    assert_eq!(read_dir_names(&shard).unwrap(), before);
}

#[test]
fn create_then_load_round_trips_the_mirror() {
    let volume = TestVolume::new();
    let record = metro_elevator();

    let folder = create_project_folder(volume.root(), &record).unwrap();
    assert!(folder.ends_with("62xxxx/625xxx/625301 Metro Elevator"));

    let raw = fs::read_to_string(folder.join(MIRROR_FILE_NAME)).unwrap();
    assert!(raw.starts_with("{\n  \"contractNo\": \"625301\""), "{raw}");
    assert_eq!(load_project(volume.root(), "625301").unwrap(), record);
}

#[test]
fn copy_keeps_only_directories_and_pdfs() {
    let volume = TestVolume::new();
    let source = volume.add_project(&metro_elevator());
    fs::create_dir_all(source.join("Drawings/Rev A")).unwrap();
    hw_projects_test_helpers::write_fake_pdf(&source.join("Drawings/Rev A/layout.PDF"));
    hw_projects_test_helpers::write_fake_pdf(&source.join("quote.pdf"));
    fs::write(source.join("notes.txt"), "internal").unwrap();

    let mut record = metro_elevator();
    record.contract_no = "625302".into();
    record.customer_name = "Metro Elevator Copy".into();
    let dest = copy_project_folder(volume.root(), "625301", &record).unwrap();

    assert!(dest.join("Drawings/Rev A/layout.PDF").is_file());
    assert!(dest.join("quote.pdf").is_file());
    assert!(!dest.join("notes.txt").exists());
    assert_eq!(load_project(volume.root(), "625302").unwrap(), record);
}

#[test]
fn delete_removes_the_resolved_folder_only() {
    let volume = TestVolume::new();
    let doomed = volume.add_project(&metro_elevator());
    let neighbour = volume.add_folder("625301", "625302 Neighbour");

    let removed = delete_project_folder(volume.root(), "625301").unwrap();
    assert_eq!(removed, doomed);
    assert!(!doomed.exists());
    assert!(neighbour.exists());
}

#[test]
fn copy_refuses_an_existing_destination() {
    let volume = TestVolume::new();
    volume.add_project(&metro_elevator());
    let existing = volume.add_folder("625302", "625302 Metro Elevator Copy");

    let mut record = metro_elevator();
    record.contract_no = "625302".into();
    record.customer_name = "Metro Elevator Copy".into();
    let err = copy_project_folder(volume.root(), "625301", &record).unwrap_err();

    let info = err.info();
    assert_eq!(info.name, "WriteError");
    assert_eq!(info.code.as_deref(), Some("EEXIST"));
    assert!(read_dir_names(&existing).unwrap().is_empty());
}

#[test]
fn copy_onto_the_source_contract_is_invalid() {
    let volume = TestVolume::new();
    volume.add_project(&metro_elevator());

    let mut record = metro_elevator();
    record.customer_name = "Metro Elevator Two".into();
    let err = copy_project_folder(volume.root(), "625301", &record).unwrap_err();

    assert_eq!(err.error_type(), "InvalidArgumentError");
    assert_eq!(read_dir_names(&volume.shard_dir("625301")).unwrap().len(), 1);
    assert!(resolve_project_folder(volume.root(), "625301").is_ok());
}

#[test]
fn a_claimed_contract_number_is_never_given_a_second_folder() {
    let volume = TestVolume::new();
    volume.add_project(&metro_elevator());
    let claimed = volume.add_folder("625302", "625302 Someone Else");

    let mut record = metro_elevator();
    record.contract_no = "625302".into();
    record.customer_name = "Metro Elevator Copy".into();

    let copy_err = copy_project_folder(volume.root(), "625301", &record).unwrap_err();
    let create_err = create_project_folder(volume.root(), &record).unwrap_err();
    for err in [copy_err, create_err] {
        let info = err.info();
        assert_eq!(info.name, "WriteError");
        assert_eq!(info.code.as_deref(), Some("EEXIST"));
        assert_eq!(info.path, Some(claimed.display().to_string()));
    }
    assert_eq!(resolve_project_folder(volume.root(), "625302").unwrap(), claimed);
}
