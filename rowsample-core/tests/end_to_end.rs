//! End-to-end sessions over small streams

use rowsample_core::{
    FieldValue, RawRow, RowSchema, SessionConfig, SourceColumn, SourceKind, StreamSession, TypedDataset,
    TypedValue,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

fn schema() -> RowSchema {
    RowSchema::new(vec![
        SourceColumn::new("A", SourceKind::Number),
        SourceColumn::new("B", SourceKind::String),
    ])
}

fn rows() -> Vec<RawRow> {
    vec![
        vec![FieldValue::Number(1.0), FieldValue::from("x")],
        vec![FieldValue::Number(2.0), FieldValue::from("y")],
        vec![FieldValue::Number(3.0), FieldValue::from("z")],
        vec![FieldValue::Number(4.0), FieldValue::from("x")],
    ]
}

fn run(config: SessionConfig, rows: Vec<RawRow>) -> TypedDataset {
    let mut session = StreamSession::new(config);
    session.bind_schema(&schema()).unwrap();
    for row in rows {
        session.push_row(row).unwrap();
    }
    session.finish().unwrap()
}

#[test]
fn test_reservoir_of_two_over_four_rows() {
    init_tracing();
    let dataset = run(SessionConfig::reservoir(2, 1), rows());

    let dictionary = dataset.dictionary(1).unwrap();
    assert_eq!(dictionary.values(), &["x", "y", "z"]);
    assert_eq!(dictionary.index_of("x"), Some(0));
    assert_eq!(dictionary.index_of("y"), Some(1));
    assert_eq!(dictionary.index_of("z"), Some(2));

    assert_eq!(dataset.num_rows(), 2);
    for record in dataset.records() {
        let a = record[0].as_f64().unwrap();
        let b = record[1].as_f64().unwrap();
        let expected = match a as i64 {
            1 | 4 => 0.0,
            2 => 1.0,
            3 => 2.0,
            other => panic!("unexpected row {}", other),
        };
        assert_eq!(b, expected);
    }

    // seed 1 keeps the first row and replaces the second slot with the last
    let kept: Vec<f64> = dataset.column(0).unwrap().iter().filter_map(TypedValue::as_f64).collect();
    assert_eq!(kept, vec![1.0, 4.0]);
}

#[test]
fn test_same_seed_same_dataset() {
    let stream: Vec<RawRow> = (0..500)
        .map(|i| vec![FieldValue::Number(f64::from(i)), FieldValue::from(format!("c{}", i % 7))])
        .collect();

    let first = run(SessionConfig::reservoir(25, 99), stream.clone());
    let second = run(SessionConfig::reservoir(25, 99), stream.clone());
    assert_eq!(first, second);

    let other_seed = run(SessionConfig::reservoir(25, 100), stream);
    assert_eq!(other_seed.num_rows(), 25);
    assert_eq!(other_seed.dictionary(1), first.dictionary(1));
}

#[test]
fn test_unbounded_keeps_arrival_order() {
    let dataset = run(SessionConfig::reservoir(0, 1), rows());
    let a: Vec<f64> = dataset
        .column(0)
        .unwrap()
        .iter()
        .filter_map(TypedValue::as_f64)
        .collect();
    assert_eq!(a, vec![1.0, 2.0, 3.0, 4.0]);
}

#[test]
fn test_first_rows_stops_after_cap() {
    init_tracing();
    let mut session = StreamSession::new(SessionConfig::first_rows(2));
    session.bind_schema(&schema()).unwrap();

    let mut stream = rows().into_iter();
    session.push_row(stream.next().unwrap()).unwrap();
    session.push_row(stream.next().unwrap()).unwrap();
    let seen = session.rows_seen();

    session.push_row(stream.next().unwrap()).unwrap();
    assert_eq!(session.rows_seen(), seen);

    let dataset = session.finish().unwrap();
    let a: Vec<f64> = dataset.column(0).unwrap().iter().filter_map(TypedValue::as_f64).collect();
    assert_eq!(a, vec![1.0, 2.0]);
}

#[test]
fn test_null_numeric_is_missing() {
    let dataset = run(
        SessionConfig::default(),
        vec![vec![FieldValue::Null, FieldValue::from("x")]],
    );

    let cell = dataset.records()[0][0];
    assert_eq!(cell, TypedValue::Missing);
    assert_ne!(cell, TypedValue::Value(0.0));
    assert_eq!(dataset.missing_count(0), 1);
}

#[test]
fn test_dictionary_covers_unsampled_rows() {
    let stream: Vec<RawRow> = (0..100)
        .map(|i| vec![FieldValue::Number(f64::from(i)), FieldValue::from(format!("v{:03}", i))])
        .collect();

    let dataset = run(SessionConfig::reservoir(5, 3), stream);
    assert_eq!(dataset.num_rows(), 5);
    assert_eq!(dataset.dictionary(1).unwrap().len(), 100);

    for record in dataset.records() {
        let label = dataset.category_label(1, record[1]).unwrap();
        let a = record[0].as_f64().unwrap() as i64;
        assert_eq!(label, format!("v{:03}", a));
    }
}
