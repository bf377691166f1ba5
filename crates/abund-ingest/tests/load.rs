//! Integration tests for load-failure classification.

use std::io::Write;
use std::path::Path;

use abund_ingest::{LoadError, load_table};
use tempfile::NamedTempFile;

fn create_temp_csv(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{}", content).unwrap();
    file
}

#[test]
fn missing_file_is_not_found() {
    let result = load_table(Path::new("/definitely/not/here/microbiome.csv"));
    let err = result.unwrap_err();
    assert!(matches!(err, LoadError::NotFound { .. }));
    assert!(err.to_string().contains("microbiome.csv"));
}

#[test]
fn zero_byte_file_is_empty() {
    let file = create_temp_csv("");
    assert!(matches!(
        load_table(file.path()),
        Err(LoadError::Empty { .. })
    ));
}

#[test]
fn ragged_rows_are_malformed() {
    let file = create_temp_csv("id,SpeciesA\n1,2\n3,4,5,6\n");
    assert!(matches!(
        load_table(file.path()),
        Err(LoadError::Malformed { .. })
    ));
}

#[test]
fn loads_mixed_column_types() {
    let file = create_temp_csv("id,site,SpeciesA,SpeciesB\n1,gut,10,0\n2,skin,,5\n");
    let df = load_table(file.path()).unwrap();
    assert_eq!(df.height(), 2);
    assert_eq!(
        df.get_column_names()
            .iter()
            .map(|name| name.to_string())
            .collect::<Vec<_>>(),
        vec!["id", "site", "SpeciesA", "SpeciesB"]
    );
}
