//! Loading, cleaning and reporting from files on disk.

use std::io::Write;

use approx::assert_abs_diff_eq;
use cacao::config::{ConfigFileError, EvaluationConfig};
use cacao::data::columns::{BEAN_ORIGIN, BEAN_TYPE, COCOA_PERCENT, COMPANY, RATING, REF};
use cacao::data::{load_clean, load_csv, split_features_labels, CleanError, CleaningConfig, LoadError};
use cacao::report::EvaluationReport;
use cacao::validation::{guess_from_mean, EncodingStrategy};

const HEADER: &str = "\"Company\u{a0}\r\n(Maker-if known)\",\"Specific Bean Origin\r\nor Bar Name\",REF,\"Review\r\nDate\",\"Cocoa\r\nPercent\",\"Company\r\nLocation\",Rating,\"Bean\r\nType\",\"Broad Bean\r\nOrigin\"";

const ROWS: [&str; 6] = [
    "A. Morin,Agua Grande,1876,2016,63%,France,3.75,\u{a0},Sao Tome",
    "A. Morin,Kpime,1676,2015,70%,France,2.75,\u{a0},Togo",
    "Bonnat,Chuao,1015,2013,75%,France,4,Trinitario,Venezuela",
    "Soma,Dual Origin,1456,2015,70%,Canada,3.5,\"Criollo, Trinitario\",\"Ven., Ecuador\"",
    "Amedei,Porcelana,111,2007,70%,Italy,5,Criollo (Porcelana),Venezuela",
    "Pralus,Tanzanie,32,2006,75%,France,3,Forastero,Tanzania",
];

fn write_csv(rows: &[&str]) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "{HEADER}").unwrap();
    for row in rows {
        writeln!(file, "{row}").unwrap();
    }
    file.flush().unwrap();
    file
}

#[test]
fn load_and_clean_review_file() {
    let file = write_csv(&ROWS);
    let table = load_clean(file.path(), &CleaningConfig::default()).unwrap();

    assert_eq!(table.n_rows(), 6);
    assert!(table.column(REF).is_none());
    assert_eq!(table.column(COMPANY).unwrap().as_categorical().unwrap()[2], "Bonnat");

    let cocoa = table.column(COCOA_PERCENT).unwrap().as_numeric().unwrap();
    assert_abs_diff_eq!(cocoa[0], 0.63, epsilon = 1e-12);

    let bean_type = table.column(BEAN_TYPE).unwrap().as_categorical().unwrap();
    assert_eq!(bean_type, &["unknown", "unknown", "trinitario", "criollo", "criollo", "forasetero"]);

    let origin = table.column(BEAN_ORIGIN).unwrap().as_categorical().unwrap();
    assert_eq!(origin[3], "multi");
    assert_eq!(origin[4], "Venezuela");

    let (features, target) = split_features_labels(&table, RATING).unwrap();
    assert_eq!(features.n_columns(), 7);
    assert_eq!(target.values().to_vec(), vec![3.75, 2.75, 4.0, 3.5, 5.0, 3.0]);
}

#[test]
fn unparsable_rating_is_reported() {
    let file = write_csv(&["Soma,Chuao,1,2015,70%,Canada,great,Criollo,Venezuela"]);
    let err = load_clean(file.path(), &CleaningConfig::default()).unwrap_err();
    assert!(matches!(
        err,
        LoadError::Clean(CleanError::Parse { ref column, row: 0, .. }) if column == RATING
    ));
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_csv(dir.path().join("absent.csv")).unwrap_err();
    assert!(matches!(err, LoadError::Io { .. }));
}

#[test]
fn config_file_and_report() {
    let mut config_file = tempfile::NamedTempFile::new().unwrap();
    write!(
        config_file,
        r#"{{"baseline": {{"n_repeats": 2, "n_folds": 3}}, "nested": {{"encoding": "per_fold"}}}}"#
    )
    .unwrap();
    let config = EvaluationConfig::from_path(config_file.path()).unwrap();
    assert_eq!(config.nested.encoding, EncodingStrategy::PerFold);

    let file = write_csv(&ROWS);
    let table = load_clean(file.path(), &config.cleaning).unwrap();
    let (_, target) = split_features_labels(&table, RATING).unwrap();
    let errors = guess_from_mean(target.values(), &config.baseline).unwrap();
    assert_eq!(errors.len(), 6);

    let json = EvaluationReport::default().with_baseline(errors).to_json_pretty().unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["baseline"]["summary"]["count"], 6);
    assert_eq!(value["baseline"]["values"].as_array().unwrap().len(), 6);
}

#[test]
fn missing_config_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = EvaluationConfig::from_path(dir.path().join("eval.json")).unwrap_err();
    assert!(matches!(err, ConfigFileError::Io { .. }));
}
