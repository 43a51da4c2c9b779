use chrono::Timelike;
use collision_dashboard::data::{
    Category, DatasetLoader, LoadCache, LoadError, QueryProcessor, SourceSchema, DATE_TIME_COLUMN,
};
use polars::prelude::*;
use std::sync::Arc;
use tempfile::TempDir;

mod common;

fn setup() -> (TempDir, std::path::PathBuf) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = common::sample_csv(temp_dir.path());
    (temp_dir, path)
}

#[test]
fn test_rows_without_coordinates_are_dropped() {
    let (_dir, path) = setup();
    let table = DatasetLoader::default().load(&path, 100).unwrap();

    assert_eq!(table.row_count(), 4);
    assert_eq!(table.frame().height(), 4);
    for record in table.records() {
        assert!(record.latitude.is_finite());
        assert!(record.longitude.is_finite());
        assert!(record.timestamp.hour() <= 23);
        assert!(record.timestamp.minute() <= 59);
    }
    assert!(table.records().iter().all(|r| r.latitude != 40.7282));
}

#[test]
fn test_columns_are_lowercase_with_canonical_timestamp() {
    let (_dir, path) = setup();
    let table = DatasetLoader::default().load(&path, 100).unwrap();

    let columns = table.column_names();
    assert_eq!(columns[0], DATE_TIME_COLUMN);
    assert!(columns.iter().all(|c| *c == c.to_lowercase()));
    assert!(columns.contains(&"borough".to_string()));
    assert!(columns.contains(&"injured_cyclists".to_string()));
    assert!(!columns.contains(&"crash_date".to_string()));
    assert!(!columns.contains(&"crash_time".to_string()));

    let stamp = table.frame().column(DATE_TIME_COLUMN).unwrap();
    assert!(matches!(
        stamp.dtype(),
        DataType::Datetime(TimeUnit::Milliseconds, None)
    ));
}

#[test]
fn test_records_keep_missing_counts_and_streets() {
    let (_dir, path) = setup();
    let table = DatasetLoader::default().load(&path, 100).unwrap();

    let first = &table.records()[0];
    assert_eq!(first.timestamp.to_string(), "2021-09-11 02:39:00");
    assert_eq!(first.injured_persons, Some(2));
    assert_eq!(first.injured_motorists, Some(2));
    assert_eq!(first.on_street_name.as_deref(), Some("WHITESTONE EXPRESSWAY"));

    let last = table.records().last().unwrap();
    assert_eq!(last.injured_persons, None);
    assert_eq!(last.injured_pedestrians, Some(0));
    assert_eq!(last.on_street_name, None);
}

#[test]
fn test_row_cap_applies_before_coordinate_filter() {
    let (_dir, path) = setup();
    let loader = DatasetLoader::default();

    assert_eq!(loader.load(&path, 2).unwrap().row_count(), 2);
    // third source row has no longitude
    assert_eq!(loader.load(&path, 3).unwrap().row_count(), 2);
    assert_eq!(loader.load(&path, 4).unwrap().row_count(), 3);
}

#[test]
fn test_loading_twice_is_identical() {
    let (_dir, path) = setup();
    let loader = DatasetLoader::default();
    let a = loader.load(&path, 100).unwrap();
    let b = loader.load(&path, 100).unwrap();

    assert_eq!(a.records(), b.records());
    assert!(a.frame().equals_missing(b.frame()));
}

#[test]
fn test_header_lookup_ignores_case() {
    let temp_dir = TempDir::new().unwrap();
    let header = common::HEADER.to_lowercase();
    let path = common::write_csv(temp_dir.path(), "lower.csv", &header, &common::SAMPLE_ROWS);

    let table = DatasetLoader::default().load(&path, 100).unwrap();
    assert_eq!(table.row_count(), 4);
    assert_eq!(table.column_names()[0], DATE_TIME_COLUMN);
}

#[test]
fn test_custom_schema_names() {
    let temp_dir = TempDir::new().unwrap();
    let header = "CRASH DATE,CRASH TIME,LATITUDE,LONGITUDE,ON STREET NAME,\
NUMBER OF PERSONS INJURED,NUMBER OF PEDESTRIANS INJURED,NUMBER OF CYCLIST INJURED,\
NUMBER OF MOTORIST INJURED";
    let path = common::write_csv(
        temp_dir.path(),
        "open_data.csv",
        header,
        &["09/11/2021,14:05,40.66,-73.86,BROADWAY,1,0,1,0"],
    );

    let schema = SourceSchema {
        crash_date: "CRASH DATE".to_string(),
        crash_time: "CRASH TIME".to_string(),
        on_street_name: "ON STREET NAME".to_string(),
        injured_persons: "NUMBER OF PERSONS INJURED".to_string(),
        injured_pedestrians: "NUMBER OF PEDESTRIANS INJURED".to_string(),
        injured_cyclists: "NUMBER OF CYCLIST INJURED".to_string(),
        injured_motorists: "NUMBER OF MOTORIST INJURED".to_string(),
        ..SourceSchema::default()
    };
    let table = DatasetLoader::new(schema).load(&path, 10).unwrap();
    assert_eq!(table.row_count(), 1);
    assert_eq!(table.records()[0].injured_cyclists, Some(1));
    assert_eq!(table.column_names()[0], DATE_TIME_COLUMN);
}

#[test]
fn test_missing_required_column_fails() {
    let temp_dir = TempDir::new().unwrap();
    let path = common::write_csv(
        temp_dir.path(),
        "no_cyclists.csv",
        "CRASH_DATE,CRASH_TIME,LATITUDE,LONGITUDE,ON_STREET_NAME,INJURED_PERSONS,\
INJURED_PEDESTRIANS,INJURED_MOTORISTS",
        &["09/11/2021,2:39,40.66,-73.86,BROADWAY,1,0,1"],
    );

    let err = DatasetLoader::default().load(&path, 10).unwrap_err();
    match err {
        LoadError::MissingColumn(name) => assert_eq!(name, "INJURED_CYCLISTS"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_malformed_date_aborts_load() {
    let temp_dir = TempDir::new().unwrap();
    let path = common::write_csv(
        temp_dir.path(),
        "bad_date.csv",
        common::HEADER,
        &[
            common::SAMPLE_ROWS[0],
            "13/45/2021,2:39,BRONX,40.84,-73.86,GRAND CONCOURSE,1,0,1,0",
        ],
    );

    let err = DatasetLoader::default().load(&path, 10).unwrap_err();
    match err {
        LoadError::InvalidTimestamp { row, date, .. } => {
            assert_eq!(row, 2);
            assert_eq!(date, "13/45/2021");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_negative_count_fails() {
    let temp_dir = TempDir::new().unwrap();
    let path = common::write_csv(
        temp_dir.path(),
        "negative.csv",
        common::HEADER,
        &["09/11/2021,2:39,BRONX,40.84,-73.86,GRAND CONCOURSE,-1,0,0,0"],
    );

    let err = DatasetLoader::default().load(&path, 10).unwrap_err();
    assert!(matches!(err, LoadError::InvalidCount { row: 1, .. }));
}

#[test]
fn test_non_numeric_count_fails() {
    let temp_dir = TempDir::new().unwrap();
    let path = common::write_csv(
        temp_dir.path(),
        "words.csv",
        common::HEADER,
        &[
            common::SAMPLE_ROWS[0],
            "09/11/2021,2:39,BRONX,40.84,-73.86,GRAND CONCOURSE,two,0,0,0",
        ],
    );

    let err = DatasetLoader::default().load(&path, 10).unwrap_err();
    match err {
        LoadError::InvalidCount { column, row, value } => {
            assert_eq!(column, "injured_persons");
            assert_eq!(row, 2);
            assert_eq!(value, "two");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_fractional_count_fails() {
    let temp_dir = TempDir::new().unwrap();
    let path = common::write_csv(
        temp_dir.path(),
        "fractions.csv",
        common::HEADER,
        &["09/11/2021,2:39,BRONX,40.84,-73.86,GRAND CONCOURSE,3,0,2.9,0"],
    );

    let err = DatasetLoader::default().load(&path, 10).unwrap_err();
    match err {
        LoadError::InvalidCount { column, row, .. } => {
            assert_eq!(column, "injured_cyclists");
            assert_eq!(row, 1);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_bad_count_after_many_valid_rows_fails() {
    let temp_dir = TempDir::new().unwrap();
    let mut rows = vec![common::SAMPLE_ROWS[0]; 10_001];
    rows.push("09/11/2021,2:39,BRONX,40.84,-73.86,GRAND CONCOURSE,oops,0,0,0");
    let path = common::write_csv(temp_dir.path(), "long.csv", common::HEADER, &rows);

    let err = DatasetLoader::default().load(&path, 20_000).unwrap_err();
    assert!(matches!(err, LoadError::InvalidCount { row: 10_002, .. }));
}

#[test]
fn test_garbage_coordinate_fails() {
    let temp_dir = TempDir::new().unwrap();
    let path = common::write_csv(
        temp_dir.path(),
        "garbage.csv",
        common::HEADER,
        &["09/11/2021,2:39,BRONX,north,-73.86,GRAND CONCOURSE,1,0,0,1"],
    );

    let err = DatasetLoader::default().load(&path, 10).unwrap_err();
    match err {
        LoadError::InvalidCoordinate { column, row, value } => {
            assert_eq!(column, "latitude");
            assert_eq!(row, 1);
            assert_eq!(value, "north");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_non_finite_coordinates_are_dropped() {
    let temp_dir = TempDir::new().unwrap();
    let path = common::write_csv(
        temp_dir.path(),
        "non_finite.csv",
        common::HEADER,
        &[
            "09/11/2021,2:39,BRONX,NaN,-73.86,GRAND CONCOURSE,1,0,0,1",
            "09/11/2021,3:39,BRONX,40.84,inf,GRAND CONCOURSE,1,0,0,1",
            common::SAMPLE_ROWS[1],
        ],
    );

    let table = DatasetLoader::default().load(&path, 10).unwrap();
    assert_eq!(table.row_count(), 1);
    assert_eq!(table.frame().height(), 1);
    assert_eq!(table.records()[0].on_street_name.as_deref(), Some("BROADWAY"));
}

#[test]
fn test_blank_street_is_missing() {
    let temp_dir = TempDir::new().unwrap();
    let path = common::write_csv(
        temp_dir.path(),
        "blank_street.csv",
        common::HEADER,
        &[
            "09/11/2021,2:39,BRONX,40.84,-73.86,   ,9,0,9,0",
            "09/11/2021,3:39,BRONX,40.84,-73.86,GRAND CONCOURSE,1,0,1,0",
        ],
    );

    let table = DatasetLoader::default().load(&path, 10).unwrap();
    assert_eq!(table.row_count(), 2);
    assert_eq!(table.records()[0].on_street_name, None);

    let ranked = QueryProcessor::top_streets(&table, Category::Cyclists, 10);
    assert_eq!(ranked.len(), 1);
    assert_eq!(ranked[0].street, "GRAND CONCOURSE");
}

#[test]
fn test_labels_colliding_after_lowercasing_fail() {
    let temp_dir = TempDir::new().unwrap();
    let header = format!("{},borough", common::HEADER);
    let row = format!("{},bronx", common::SAMPLE_ROWS[0]);
    let path = common::write_csv(temp_dir.path(), "twice.csv", &header, &[row.as_str()]);

    let err = DatasetLoader::default().load(&path, 10).unwrap_err();
    match err {
        LoadError::DuplicateColumn(name) => assert_eq!(name, "borough"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_cache_memoizes_until_invalidated() {
    let (_dir, path) = setup();
    let loader = DatasetLoader::default();
    let mut cache = LoadCache::new();
    assert!(cache.is_empty());

    let first = cache.get_or_load(&loader, &path, 100).unwrap();
    let second = cache.get_or_load(&loader, &path, 100).unwrap();
    assert!(Arc::ptr_eq(&first, &second));

    // a different cap is a different entry
    let capped = cache.get_or_load(&loader, &path, 2).unwrap();
    assert_eq!(capped.row_count(), 2);
    assert_eq!(cache.len(), 2);

    assert!(cache.invalidate(&path, 100));
    assert!(!cache.invalidate(&path, 100));
    let reloaded = cache.get_or_load(&loader, &path, 100).unwrap();
    assert!(!Arc::ptr_eq(&first, &reloaded));
    assert_eq!(first.records(), reloaded.records());

    cache.clear();
    assert!(cache.get(&path, 2).is_none());
}
