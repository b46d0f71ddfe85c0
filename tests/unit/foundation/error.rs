use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        FrameIoError::configuration("x")
            .to_string()
            .contains("configuration error:")
    );
    assert!(
        FrameIoError::empty_selection("x")
            .to_string()
            .contains("empty selection:")
    );
    assert!(
        FrameIoError::not_found("/a/b.png")
            .to_string()
            .contains("frame does not exist: '/a/b.png'")
    );
    assert!(
        FrameIoError::Cancelled { ordinal: 3 }
            .to_string()
            .contains("ordinal 3")
    );
}

#[test]
fn save_aborted_reports_written_count_and_cause() {
    let err = FrameIoError::SaveAborted {
        written: 2,
        source: Box::new(FrameIoError::Encode {
            path: PathBuf::from("out/f_3.webp"),
            cause: anyhow::anyhow!("encoder exploded"),
        }),
    };
    let msg = err.to_string();
    assert!(msg.contains("after 2 frame(s)"), "{msg}");
    assert!(msg.contains("encoder exploded"), "{msg}");
    assert!(matches!(err.root_cause(), FrameIoError::Encode { .. }));
    assert!(!err.is_configuration());
}

#[test]
fn input_errors_count_as_configuration() {
    assert!(FrameIoError::configuration("x").is_configuration());
    assert!(FrameIoError::empty_selection("x").is_configuration());
    assert!(
        FrameIoError::PermissionDenied {
            path: PathBuf::from("/etc/passwd"),
            root: PathBuf::from("/out"),
            reason: "escapes root".to_owned(),
        }
        .is_configuration()
    );
    assert!(!FrameIoError::not_found("x").is_configuration());
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = FrameIoError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
