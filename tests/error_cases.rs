mod common;

use std::{
    fs,
    io::{self, ErrorKind},
};

use collection_export::{
    core::{
        exporter::{Exporter, FormatChange},
        feed::FeedTemplate,
        format::Preset,
        item::RecordWriter,
        record::{Collection, Model},
    },
    error::ExportError,
    item::delimited::delimited_writer::DelimitedItemWriterBuilder,
};
use tempfile::tempdir;

use common::{MockFile, init_logger};

fn garage_with_bad_second_row() -> Collection<Model> {
    let mut garage = Collection::new("Collection");
    garage.push(Model::new("Car").with("id", "1").with("make", "Porsche"));
    garage.push_malformed("row could not be hydrated");
    garage.push(Model::new("Car").with("id", "3").with("make", "Mazda"));
    garage
}

#[test]
fn malformed_second_record_should_leave_no_file() -> Result<(), ExportError> {
    init_logger();
    let dir = tempdir()?;

    for preset in [Preset::Tsv, Preset::Csv, Preset::Psv, Preset::Xml] {
        let exporter = Exporter::from_preset(preset, dir.path().join("garage"));

        let result = exporter.export(&garage_with_bad_second_row());

        assert!(
            matches!(result, Err(ExportError::MalformedRecord { index: 1, .. })),
            "{} preset",
            preset
        );
        assert!(!exporter.output_path().exists(), "{} preset", preset);
    }
    Ok(())
}

#[test]
fn malformed_record_should_remove_previous_export_too() -> Result<(), ExportError> {
    init_logger();
    let dir = tempdir()?;
    let exporter = Exporter::from_preset(Preset::Csv, dir.path().join("garage"));
    fs::write(exporter.output_path(), "previous export")?;

    let result = exporter.export(&garage_with_bad_second_row());

    assert!(result.is_err());
    assert!(!exporter.output_path().exists());
    Ok(())
}

#[test]
fn malformed_first_record_should_not_create_file() -> Result<(), ExportError> {
    init_logger();
    let dir = tempdir()?;
    let mut garage: Collection<Model> = Collection::new("Collection");
    garage.push_malformed("nothing here");
    let exporter = Exporter::from_preset(Preset::Csv, dir.path().join("garage"));

    let result = exporter.export(&garage);

    match result {
        Err(ExportError::MalformedRecord { index, reason }) => {
            assert_eq!(index, 0);
            assert_eq!(reason, "nothing here");
        }
        other => panic!("unexpected result: {:?}", other),
    }
    assert!(!exporter.output_path().exists());
    Ok(())
}

#[test]
fn empty_collection_should_be_rejected() -> Result<(), ExportError> {
    init_logger();
    let dir = tempdir()?;

    for preset in [Preset::Csv, Preset::Xml] {
        let exporter = Exporter::from_preset(preset, dir.path().join("empty"));

        let result = exporter.export(&Collection::<Model>::new("Collection"));

        assert!(matches!(result, Err(ExportError::EmptyCollection)));
        assert!(!exporter.output_path().exists());
    }
    Ok(())
}

#[test]
fn missing_directory_should_be_an_io_error() {
    init_logger();
    let dir = tempdir().unwrap();
    let exporter = Exporter::from_preset(Preset::Csv, dir.path().join("missing").join("out"));

    let result = exporter.export(&vec![Model::new("Car").with("id", "1")]);

    match result {
        Err(ExportError::Io(error)) => assert_eq!(error.kind(), ErrorKind::NotFound),
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn failing_writer_should_report_io_error() {
    let mut file = MockFile::default();
    file.expect_write()
        .returning(|_| Err(io::Error::new(ErrorKind::Other, "disk full")));
    file.expect_flush().returning(|| Ok(()));

    let car = Model::new("Car").with("id", "1");
    let writer = DelimitedItemWriterBuilder::new().from_writer(file).unwrap();

    writer.open(&car, "Collection").unwrap();
    writer.write(&car).unwrap();
    let result = writer.close();

    match result {
        Err(ExportError::Io(error)) => assert_eq!(error.to_string(), "disk full"),
        other => panic!("unexpected result: {:?}", other),
    }
}

#[cfg(target_os = "linux")]
#[test]
fn write_failure_during_export_should_remove_file() -> Result<(), ExportError> {
    use std::os::unix::fs::symlink;

    init_logger();
    let dir = tempdir()?;

    for preset in [Preset::Csv, Preset::Xml] {
        let exporter = Exporter::from_preset(preset, dir.path().join("full"));
        // Every write through the link fails with "no space left on device".
        symlink("/dev/full", exporter.output_path())?;

        let result = exporter.export(&vec![Model::new("Car").with("id", "1")]);

        assert!(matches!(result, Err(ExportError::Io(_))), "{} preset", preset);
        assert!(
            fs::symlink_metadata(exporter.output_path()).is_err(),
            "{} preset",
            preset
        );
    }
    assert!(fs::metadata("/dev/full").is_ok());
    Ok(())
}

#[test]
fn conflicting_construction_should_fail() {
    let cases = [
        (",", ",", "\n"),
        (",", "\"", ","),
        (",", "\n", "\n"),
    ];

    for (delimiter, enclosure, separator) in cases {
        let result = Exporter::new("x", delimiter, enclosure, ".csv", separator);

        assert!(
            matches!(result, Err(ExportError::ConfigConflict { .. })),
            "{:?} {:?} {:?}",
            delimiter,
            enclosure,
            separator
        );
    }
}

#[test]
fn conflicting_reconfiguration_should_keep_previous_state() -> Result<(), ExportError> {
    init_logger();
    let dir = tempdir()?;
    let mut exporter = Exporter::from_preset(Preset::Tsv, dir.path().join("out"));

    let result = exporter.change_format(FormatChange::new().enclosure("\t"));

    assert!(matches!(result, Err(ExportError::ConfigConflict { .. })));
    assert_eq!(exporter.config(), &Preset::Tsv.config(dir.path().join("out")));

    let path = exporter.export(&vec![Model::new("Car").with("id", "1")])?;
    assert_eq!(fs::read_to_string(path)?, "\"id\"\n\"1\"\n");
    Ok(())
}

#[test]
fn unknown_preset_should_be_rejected_without_side_effects() {
    assert!(matches!(
        Exporter::from_preset_name("JSON", "x"),
        Err(ExportError::UnknownPreset(name)) if name == "JSON"
    ));

    let mut exporter = Exporter::from_preset(Preset::Psv, "x");
    let result = exporter.change_preset_by_name("YAML", None);

    assert!(matches!(result, Err(ExportError::UnknownPreset(_))));
    assert_eq!(exporter.config(), &Preset::Psv.config("x"));
}

#[test]
fn invalid_feed_template_should_fail() {
    let result = FeedTemplate::from_json("{ not json");

    assert!(matches!(result, Err(ExportError::Serialization(_))));
}
