use super::*;
use tempfile::TempDir;

#[test]
fn rejects_zero_dimension() {
    assert!(matches!(
        FlatIndex::new(0),
        Err(IndexError::InvalidDimension(0))
    ));
}

#[test]
fn add_grows_size() {
    let mut index = FlatIndex::new(3).expect("should create index");
    assert_eq!(index.size(), 0);
    assert!(index.is_empty());

    index
        .add(&[vec![1.0, 0.0, 0.0], vec![0.0, 1.0, 0.0]])
        .expect("should add vectors");

    assert_eq!(index.size(), 2);
    assert_eq!(index.dimension(), 3);
}

#[test]
fn dimension_mismatch_leaves_index_untouched() {
    let mut index = FlatIndex::new(3).expect("should create index");

    let result = index.add(&[vec![1.0, 0.0, 0.0], vec![1.0, 0.0]]);

    assert!(matches!(
        result,
        Err(IndexError::DimensionMismatch {
            expected: 3,
            actual: 2
        })
    ));
    assert_eq!(index.size(), 0);
}

#[test]
fn search_orders_by_distance() {
    let mut index = FlatIndex::new(2).expect("should create index");
    index
        .add(&[vec![0.0, 0.0], vec![1.0, 1.0], vec![3.0, 3.0]])
        .expect("should add vectors");

    let (distances, indices) = index
        .search(&[0.9, 0.9], 3)
        .expect("should search successfully");

    assert_eq!(indices, vec![1, 0, 2]);
    assert!(distances[0] < distances[1]);
    assert!(distances[1] < distances[2]);
}

#[test]
fn ties_break_toward_lower_position() {
    let mut index = FlatIndex::new(2).expect("should create index");
    index
        .add(&[vec![1.0, 0.0], vec![1.0, 0.0]])
        .expect("should add vectors");

    let (distances, indices) = index
        .search(&[1.0, 0.0], 2)
        .expect("should search successfully");

    assert_eq!(indices, vec![0, 1]);
    assert!(distances[0].abs() < f32::EPSILON);
    assert!(distances[1].abs() < f32::EPSILON);
}

#[test]
fn short_results_are_padded_with_sentinels() {
    let mut index = FlatIndex::new(2).expect("should create index");
    index
        .add(&[vec![0.0, 0.0], vec![1.0, 1.0]])
        .expect("should add vectors");

    let (distances, indices) = index
        .search(&[0.0, 0.0], 5)
        .expect("should search successfully");

    assert_eq!(distances.len(), 5);
    assert_eq!(indices.len(), 5);
    assert_eq!(indices[0], 0);
    assert_eq!(indices[1], 1);
    assert_eq!(&indices[2..], &[INVALID_INDEX, INVALID_INDEX, INVALID_INDEX]);
    assert!(distances[2..].iter().all(|d| d.is_infinite()));
}

#[test]
fn empty_index_returns_only_padding() {
    let index = FlatIndex::new(2).expect("should create index");

    let (distances, indices) = index
        .search(&[0.0, 0.0], 2)
        .expect("should search successfully");

    assert_eq!(indices, vec![INVALID_INDEX, INVALID_INDEX]);
    assert!(distances.iter().all(|d| d.is_infinite()));
}

#[test]
fn query_dimension_is_validated() {
    let index = FlatIndex::new(3).expect("should create index");
    assert!(index.search(&[1.0, 2.0], 1).is_err());
}

#[test]
fn zero_k_returns_nothing() {
    let mut index = FlatIndex::new(2).expect("should create index");
    index.add(&[vec![0.0, 0.0]]).expect("should add vector");

    let (distances, indices) = index.search(&[0.0, 0.0], 0).expect("should search");

    assert!(distances.is_empty());
    assert!(indices.is_empty());
}

#[test]
fn clear_keeps_dimension() {
    let mut index = FlatIndex::new(2).expect("should create index");
    index
        .add(&[vec![1.0, 2.0], vec![3.0, 4.0]])
        .expect("should add vectors");

    index.clear();

    assert_eq!(index.size(), 0);
    assert_eq!(index.dimension(), 2);
}

#[test]
fn persist_round_trips_search_results() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let path = temp_dir.path().join("index.bin");

    let mut index = FlatIndex::new(2).expect("should create index");
    index
        .add(&[vec![0.0, 0.0], vec![1.0, 1.0], vec![2.0, 2.0]])
        .expect("should add vectors");
    index.persist(&path).expect("should persist index");

    let restored = FlatIndex::load(&path).expect("should load index");

    assert_eq!(restored, index);

    let (original_distances, original_indices) =
        index.search(&[0.5, 0.5], 3).expect("should search");
    let (restored_distances, restored_indices) =
        restored.search(&[0.5, 0.5], 3).expect("should search");

    assert_eq!(original_indices, restored_indices);
    assert_eq!(original_distances, restored_distances);
}

#[test]
fn load_missing_file_is_an_error() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    assert!(FlatIndex::load(temp_dir.path().join("absent.bin")).is_err());
}

#[test]
fn load_rejects_corrupt_blob() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let path = temp_dir.path().join("index.bin");

    let zero_dimension = FlatIndex {
        dimension: 0,
        vectors: Vec::new(),
    };
    let bytes = bincode::serialize(&zero_dimension).expect("should serialize");
    std::fs::write(&path, bytes).expect("should write blob");

    assert!(matches!(FlatIndex::load(&path), Err(IndexError::Corrupt)));
}
