//! End-to-end conversions through the filesystem.

use std::{fs, path::Path};

use compliance_matrix::{Config, Conversion, RunState, resolve_destination};
use tempfile::TempDir;

fn write_spec(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap()
}

#[test]
fn extracts_shall_statements_into_csv() {
    let tmp = TempDir::new().unwrap();
    let source = write_spec(
        &tmp,
        "system.txt",
        "Intro text.\n\nThe device shall power on.\n\nNotes: etc. done.\n",
    );
    let destination = tmp.path().join("system.csv");

    let report = Conversion::default().convert(&source, &destination);

    assert_eq!(report.state(), RunState::Done);
    assert_eq!(report.requirements(), 1);
    assert_eq!(
        read(&destination),
        "Requirement ID,Requirement,Meets Requirement (Yes / No / Partial),Comment\n\
         1,The device shall power on.,,\n"
    );
}

#[test]
fn wrapped_paragraphs_and_abbreviations() {
    let tmp = TempDir::new().unwrap();
    let source = write_spec(
        &tmp,
        "spec.md",
        "# Power\n\n\
         The unit shall accept mains power, i.e. 230 V. It may also accept\n\
         battery power. The unit SHALL report its supply, e.g. on the display.\n\n\
         ## Packaging\n\n\
         Boxes shall be recyclable.\n",
    );
    let destination = tmp.path().join("matrix.md");

    let report = Conversion::default().convert(&source, &destination);

    assert!(report.is_done());
    assert_eq!(report.paragraphs(), 4);
    assert_eq!(
        read(&destination),
        "| Requirement ID | Requirement | Meets Requirement (Yes / No / Partial) | Comment |\n\
         | --- | --- | --- | --- |\n\
         | 1 | The unit shall accept mains power, i.e. 230 V. |  |  |\n\
         | 2 | The unit SHALL report its supply, e.g. on the display. |  |  |\n\
         | 3 | Boxes shall be recyclable. |  |  |\n"
    );
}

#[test]
fn document_without_requirements_gives_header_only() {
    let tmp = TempDir::new().unwrap();
    let source = write_spec(&tmp, "notes.txt", "Nothing to see. Move along.\n");
    let destination = tmp.path().join("notes.csv");

    let report = Conversion::default().convert(&source, &destination);

    assert!(report.is_done());
    assert_eq!(report.requirements(), 0);
    assert_eq!(read(&destination).lines().count(), 1);
}

#[test]
fn missing_source_produces_no_matrix() {
    let tmp = TempDir::new().unwrap();
    let destination = tmp.path().join("missing.csv");

    let report = Conversion::default().convert(&tmp.path().join("missing.txt"), &destination);

    assert_eq!(report.state(), RunState::Aborted);
    assert_eq!(report.paragraphs(), 0);
    assert!(!destination.exists());
    assert!(matches!(
        report.errors(),
        [compliance_matrix::Error::Resource(error)] if error.is_not_found()
    ));
}

#[test]
fn configuration_drives_destination_and_abbreviations() {
    let tmp = TempDir::new().unwrap();
    let properties = write_spec(
        &tmp,
        "settings.properties",
        "# settings\nDEBUG = false\ncomplianceMatrixExtension = md\nprotectedAbbreviations = approx.\n",
    );
    let config = Config::load(&properties).unwrap();
    let source = write_spec(
        &tmp,
        "weights.txt",
        "Crates shall weigh approx. 3 kg. Pallets shall hold 40 crates.\n",
    );

    let destination = resolve_destination(&source, None, &config);
    assert_eq!(destination, tmp.path().join("weights.md"));

    let report = Conversion::from_config(&config).convert(&source, &destination);

    assert!(report.is_done());
    let matrix = read(&destination);
    assert!(matrix.contains("| 1 | Crates shall weigh approx. 3 kg. |  |  |"));
    assert!(matrix.contains("| 2 | Pallets shall hold 40 crates. |  |  |"));
}

#[test]
fn derived_destination_keeps_csv_source_intact() {
    let tmp = TempDir::new().unwrap();
    let original = "The device shall power on. It may beep.\n";
    let source = write_spec(&tmp, "reqs.csv", original);

    let destination = resolve_destination(&source, None, &Config::default());
    assert_eq!(destination, tmp.path().join("reqs.matrix.csv"));

    let report = Conversion::default().convert(&source, &destination);

    assert!(report.is_done());
    assert_eq!(read(&source), original);
    assert!(read(&destination).ends_with("1,The device shall power on.,,\n"));
}

#[test]
fn explicit_destination_equal_to_source_is_refused() {
    let tmp = TempDir::new().unwrap();
    let original = "The device shall power on.\n";
    let source = write_spec(&tmp, "spec.md", original);
    let destination = tmp.path().join(".").join("spec.md");

    let report = Conversion::default().convert(&source, &destination);

    assert_eq!(report.state(), RunState::Aborted);
    assert_eq!(report.paragraphs(), 0);
    assert_eq!(read(&source), original);
    assert!(matches!(
        report.errors(),
        [compliance_matrix::Error::Resource(
            compliance_matrix::ResourceError::Overwrite { .. }
        )]
    ));
}

#[test]
fn directory_destination_aborts_before_streaming() {
    let tmp = TempDir::new().unwrap();
    let source = write_spec(&tmp, "spec.txt", "It shall work.\n\nIt shall also work.\n");
    let destination = tmp.path().join("matrix.csv");
    fs::create_dir(&destination).unwrap();

    let report = Conversion::default().convert(&source, &destination);

    assert_eq!(report.state(), RunState::Aborted);
    assert_eq!(report.paragraphs(), 0);
    assert_eq!(report.errors().len(), 1);
    assert!(destination.is_dir());
}
