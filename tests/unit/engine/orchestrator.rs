use std::collections::HashMap;
use std::sync::Mutex;

use super::*;
use crate::codec::EncodeOpts;
use crate::frame::buffer::FrameBuffer;
use crate::schedule::progress::{CountingProgress, NoProgress};

/// Keeps frames in memory and drops an empty marker file on disk so existence checks work.
#[derive(Default)]
struct MemoryCodec {
    frames: Mutex<HashMap<PathBuf, FrameBuffer>>,
    encodes: AtomicUsize,
    fail_on: Option<PathBuf>,
}

impl MemoryCodec {
    fn encodes(&self) -> usize {
        self.encodes.load(Ordering::Acquire)
    }
}

impl FrameCodec for MemoryCodec {
    fn decode(&self, path: &Path) -> FrameIoResult<FrameBuffer> {
        self.frames
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| FrameIoError::not_found(path))
    }

    fn encode(&self, frame: &FrameBuffer, _opts: &EncodeOpts, path: &Path) -> FrameIoResult<()> {
        if self.fail_on.as_deref() == Some(path) {
            return Err(FrameIoError::Encode {
                path: path.to_path_buf(),
                cause: anyhow::anyhow!("injected failure"),
            });
        }
        self.encodes.fetch_add(1, Ordering::AcqRel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, b"").unwrap();
        self.frames
            .lock()
            .unwrap()
            .insert(path.to_path_buf(), frame.clone());
        Ok(())
    }
}

fn temp_dir(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "frameseq_engine_{name}_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ))
}

fn engine(config: EngineConfig, codec: MemoryCodec) -> BatchEngine<MemoryCodec> {
    BatchEngine::with_codec(config.threads(3), codec).unwrap()
}

fn solid(v: f32) -> FrameBuffer {
    FrameBuffer::filled(2, 2, [v, v, v])
}

fn batch(values: &[f32]) -> FrameBatch {
    FrameBatch::concat(values.iter().map(|v| solid(*v)).collect()).unwrap()
}

#[test]
fn identical_frames_are_encoded_once() {
    let dir = temp_dir("dedup");
    let root = SecurityRoot::new(&dir).unwrap();
    let eng = engine(EngineConfig::default(), MemoryCodec::default());
    let pattern = FramePattern::parse("out/frame_{:04d}.webp").unwrap();
    let sink = CountingProgress::new();

    let saved = eng
        .save_sequence(&batch(&[0.1, 0.5, 0.9, 0.1]), &pattern, 0, &root, &sink)
        .unwrap();

    assert_eq!(eng.codec().encodes(), 3);
    assert_eq!(saved.paths.len(), 4);
    assert_eq!(saved.paths[0], saved.paths[3]);
    assert_eq!(saved.paths[0], dir.join("out/frame_0000.webp"));
    assert!(!dir.join("out/frame_0003.webp").exists());
    assert_eq!(
        saved.stats,
        SaveStats {
            frames_total: 4,
            frames_written: 3,
            frames_deduplicated: 1,
            frames_skipped_existing: 0,
        }
    );
    assert_eq!(sink.total(), 4);
    assert_eq!(sink.ticks(), 4);
    assert_eq!(sink.last(), 4);
}

#[test]
fn dedup_off_writes_every_frame() {
    let dir = temp_dir("nodedup");
    let root = SecurityRoot::new(&dir).unwrap();
    let eng = engine(EngineConfig::default().dedup(false), MemoryCodec::default());
    let pattern = FramePattern::parse("f_{}.webp").unwrap();

    let saved = eng
        .save_sequence(&batch(&[0.2, 0.2]), &pattern, 7, &root, &NoProgress)
        .unwrap();

    assert_eq!(eng.codec().encodes(), 2);
    assert_eq!(saved.paths, vec![dir.join("f_7.webp"), dir.join("f_8.webp")]);
}

#[test]
fn existing_targets_are_kept_when_overwrite_is_off() {
    let dir = temp_dir("keep");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("f_001.webp"), b"old").unwrap();
    let root = SecurityRoot::new(&dir).unwrap();
    let eng = engine(EngineConfig::default().overwrite(false), MemoryCodec::default());
    let pattern = FramePattern::parse("f_{:03d}.webp").unwrap();

    let saved = eng
        .save_sequence(&batch(&[0.1, 0.2, 0.3]), &pattern, 0, &root, &NoProgress)
        .unwrap();

    assert_eq!(eng.codec().encodes(), 2);
    assert_eq!(std::fs::read(dir.join("f_001.webp")).unwrap(), b"old");
    assert_eq!(saved.paths[1], dir.join("f_001.webp"));
    assert_eq!(saved.stats.frames_skipped_existing, 1);
}

#[test]
fn escaping_target_rejects_the_whole_batch_before_writing() {
    let dir = temp_dir("escape");
    let root = SecurityRoot::new(dir.join("root")).unwrap();
    let eng = engine(EngineConfig::default(), MemoryCodec::default());
    let pattern = FramePattern::parse("../outside/f_{}.webp").unwrap();

    let err = eng
        .save_sequence(&batch(&[0.1, 0.2]), &pattern, 0, &root, &NoProgress)
        .unwrap_err();

    assert!(matches!(err, FrameIoError::PermissionDenied { .. }), "{err}");
    assert_eq!(eng.codec().encodes(), 0);
    assert!(!dir.join("outside").exists());
}

#[test]
fn write_failure_aborts_and_reports_written_count() {
    let dir = temp_dir("abort");
    let root = SecurityRoot::new(&dir).unwrap();
    let codec = MemoryCodec {
        fail_on: Some(dir.join("f_0.webp")),
        ..MemoryCodec::default()
    };
    let eng = BatchEngine::with_codec(EngineConfig::default().threads(1), codec).unwrap();
    let pattern = FramePattern::parse("f_{}.webp").unwrap();

    let err = eng
        .save_sequence(&batch(&[0.1, 0.2, 0.3]), &pattern, 0, &root, &NoProgress)
        .unwrap_err();

    match err {
        FrameIoError::SaveAborted { written, source } => {
            assert!(written <= 2);
            assert!(matches!(*source, FrameIoError::Encode { .. }));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn empty_save_batch_is_an_empty_selection() {
    let root = SecurityRoot::new(temp_dir("empty")).unwrap();
    let eng = engine(EngineConfig::default(), MemoryCodec::default());
    let pattern = FramePattern::parse("f_{}.webp").unwrap();
    let err = eng
        .save_sequence(&FrameBatch::default(), &pattern, 0, &root, &NoProgress)
        .unwrap_err();
    assert!(matches!(err, FrameIoError::EmptySelection(_)));
}

#[test]
fn saved_frames_load_back_in_order() {
    let dir = temp_dir("roundtrip");
    let root = SecurityRoot::new(&dir).unwrap();
    let eng = engine(EngineConfig::default().dedup(false), MemoryCodec::default());
    let save_pattern = FramePattern::parse("seq/f_{:02d}.webp").unwrap();
    eng.save_sequence(&batch(&[0.0, 0.25, 0.5, 0.75]), &save_pattern, 0, &root, &NoProgress)
        .unwrap();

    let load_pattern = FramePattern::parse(&format!("{}/seq/f_{{:02d}}.webp", dir.display())).unwrap();
    let sink = CountingProgress::new();
    let loaded = eng
        .load_sequence(&load_pattern, &FrameIndexRange::auto(1), &sink)
        .unwrap();

    assert_eq!(loaded.frame_count, 3);
    assert_eq!(loaded.indices, vec![1, 2, 3]);
    assert_eq!(loaded.frames.get(0).unwrap(), &solid(0.25));
    assert_eq!(loaded.frames.get(2).unwrap(), &solid(0.75));
    assert_eq!(sink.ticks(), 3);
}

#[test]
fn strict_fixed_load_names_the_first_missing_file() {
    let dir = temp_dir("strict");
    let root = SecurityRoot::new(&dir).unwrap();
    let eng = engine(EngineConfig::default().dedup(false), MemoryCodec::default());
    let save_pattern = FramePattern::parse("f_{}.webp").unwrap();
    eng.save_sequence(&batch(&[0.1, 0.2]), &save_pattern, 0, &root, &NoProgress)
        .unwrap();

    let load_pattern = FramePattern::parse(&format!("{}/f_{{}}.webp", dir.display())).unwrap();
    let err = eng
        .load_sequence(&load_pattern, &FrameIndexRange::fixed(0, 4), &NoProgress)
        .unwrap_err();
    match err {
        FrameIoError::NotFound { path } => assert_eq!(path, dir.join("f_2.webp")),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn tolerant_fixed_load_skips_missing_files() {
    let dir = temp_dir("tolerant");
    let root = SecurityRoot::new(&dir).unwrap();
    let eng = engine(
        EngineConfig::default().dedup(false).tolerant(true),
        MemoryCodec::default(),
    );
    let save_pattern = FramePattern::parse("f_{}.webp").unwrap();
    eng.save_sequence(&batch(&[0.1, 0.2]), &save_pattern, 0, &root, &NoProgress)
        .unwrap();

    let load_pattern = FramePattern::parse(&format!("{}/f_{{}}.webp", dir.display())).unwrap();
    let loaded = eng
        .load_sequence(&load_pattern, &FrameIndexRange::fixed(0, 5), &NoProgress)
        .unwrap();
    assert_eq!(loaded.frame_count, 2);
    assert_eq!(loaded.indices, vec![0, 1]);

    let err = eng
        .load_sequence(&load_pattern, &FrameIndexRange::fixed(10, 3), &NoProgress)
        .unwrap_err();
    assert!(matches!(err, FrameIoError::EmptySelection(_)));
}

#[test]
fn auto_load_with_nothing_on_disk_is_an_empty_selection() {
    let dir = temp_dir("nothing");
    let eng = engine(EngineConfig::default(), MemoryCodec::default());
    let pattern = FramePattern::parse(&format!("{}/f_{{}}.png", dir.display())).unwrap();
    let err = eng
        .load_sequence(&pattern, &FrameIndexRange::auto(0), &NoProgress)
        .unwrap_err();
    assert!(matches!(err, FrameIoError::EmptySelection(_)));
}

#[test]
fn list_selection_slices_with_step() {
    let dir = temp_dir("list");
    let root = SecurityRoot::new(&dir).unwrap();
    let eng = engine(EngineConfig::default().dedup(false), MemoryCodec::default());
    let pattern = FramePattern::parse("f_{}.webp").unwrap();
    let saved = eng
        .save_sequence(&batch(&[0.0, 0.1, 0.2, 0.3, 0.4]), &pattern, 0, &root, &NoProgress)
        .unwrap();

    let loaded = eng
        .load_list(
            &saved.paths,
            ListSelection {
                start: 1,
                end: Some(99),
                step: 2,
            },
            &NoProgress,
        )
        .unwrap();
    assert_eq!(loaded.indices, vec![1, 3]);
    assert_eq!(loaded.paths, vec![saved.paths[1].clone(), saved.paths[3].clone()]);
    assert_eq!(loaded.frames.get(1).unwrap(), &solid(0.3));
}

#[test]
fn list_selection_errors() {
    let eng = engine(EngineConfig::default(), MemoryCodec::default());
    let paths = vec![PathBuf::from("/nope/a.png"), PathBuf::from("/nope/b.png")];

    let err = eng
        .load_list(&[], ListSelection::default(), &NoProgress)
        .unwrap_err();
    assert!(matches!(err, FrameIoError::EmptySelection(_)));

    let err = eng
        .load_list(
            &paths,
            ListSelection {
                start: 2,
                ..ListSelection::default()
            },
            &NoProgress,
        )
        .unwrap_err();
    assert!(err.is_configuration());

    let err = eng
        .load_list(
            &paths,
            ListSelection {
                step: 0,
                ..ListSelection::default()
            },
            &NoProgress,
        )
        .unwrap_err();
    assert!(err.is_configuration());

    let err = eng
        .load_list(&paths, ListSelection::default(), &NoProgress)
        .unwrap_err();
    assert!(matches!(err, FrameIoError::NotFound { .. }));
}

#[test]
fn invalid_config_is_rejected_at_construction() {
    let err = BatchEngine::with_codec(EngineConfig::default().quality(0), MemoryCodec::default());
    assert!(err.is_err());
}
