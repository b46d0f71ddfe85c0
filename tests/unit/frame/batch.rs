use super::*;

#[test]
fn concat_reports_batch_shape() {
    let batch = FrameBatch::concat(vec![FrameBuffer::zeros(4, 2); 3]).unwrap();
    assert_eq!(batch.shape(), [3, 2, 4, 3]);
    assert_eq!(batch.to_contiguous().len(), 3 * 2 * 4 * 3);
    assert!(batch.to_contiguous().iter().all(|&v| v == 0.0));
}

#[test]
fn concat_rejects_mixed_shapes() {
    let err = FrameBatch::concat(vec![FrameBuffer::zeros(2, 2), FrameBuffer::zeros(3, 2)])
        .unwrap_err();
    assert!(matches!(
        err,
        FrameIoError::ShapeMismatch {
            expected: (2, 2),
            found: (3, 2),
            ..
        }
    ));
}

#[test]
fn concat_sourced_names_the_offending_file() {
    let err = FrameBatch::concat_sourced(vec![
        (PathBuf::from("a.png"), FrameBuffer::zeros(2, 2)),
        (PathBuf::from("b.png"), FrameBuffer::zeros(1, 1)),
    ])
    .unwrap_err();
    let FrameIoError::ShapeMismatch { path, .. } = err else {
        panic!("expected shape mismatch");
    };
    assert_eq!(path, PathBuf::from("b.png"));
}

#[test]
fn extend_keeps_frames_on_mismatch() {
    let mut batch = FrameBatch::from(FrameBuffer::zeros(2, 2));
    assert!(batch.extend(FrameBatch::from(FrameBuffer::zeros(1, 1))).is_err());
    assert_eq!(batch.len(), 1);
    batch
        .extend(FrameBatch::from(FrameBuffer::filled(2, 2, [1.0, 0.0, 0.0])))
        .unwrap();
    assert_eq!(batch.len(), 2);
    assert_eq!(batch.get(1).unwrap().sample(0, 0, 0), Some(1.0));
}

#[test]
fn empty_batch_shape_is_zero() {
    let batch = FrameBatch::concat(vec![]).unwrap();
    assert!(batch.is_empty());
    assert_eq!(batch.shape(), [0, 0, 0, 0]);
}
