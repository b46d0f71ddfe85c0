use super::*;

fn temp_dir(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "frameseq_{name}_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ))
}

fn touch(p: &Path) {
    std::fs::create_dir_all(p.parent().unwrap()).unwrap();
    std::fs::write(p, b"x").unwrap();
}

fn names(listing: &Listing) -> Vec<String> {
    listing
        .paths
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect()
}

fn fixture(name: &str) -> PathBuf {
    let root = temp_dir(name);
    touch(&root.join("clips/b_Take.MP4"));
    touch(&root.join("clips/a_take.mov"));
    touch(&root.join("clips/notes.txt"));
    touch(&root.join("clips/nested/c_take.webm"));
    touch(&root.join("clips/nested/d_other.mkv"));
    root
}

#[test]
fn flat_listing_filters_by_extension_and_sorts() {
    let root = fixture("listing_flat");
    let out = list_files(&root, "clips", VIDEO_EXTENSIONS, &ListingOpts::default()).unwrap();
    assert_eq!(names(&out), vec!["a_take.mov", "b_Take.MP4"]);
    assert_eq!(out.count, 2);
    assert!(out.paths.iter().all(|p| p.is_absolute()));
}

#[test]
fn recursive_listing_with_case_insensitive_filter() {
    let root = fixture("listing_recursive");
    let opts = ListingOpts {
        recursive: true,
        filter: "TAKE".to_owned(),
        cap: 0,
    };
    let out = list_files(&root, "clips", VIDEO_EXTENSIONS, &opts).unwrap();
    assert_eq!(names(&out), vec!["a_take.mov", "b_Take.MP4", "c_take.webm"]);
}

#[test]
fn cap_truncates_after_sorting() {
    let root = fixture("listing_cap");
    let opts = ListingOpts {
        recursive: true,
        cap: 2,
        ..ListingOpts::default()
    };
    let out = list_files(&root, "clips", VIDEO_EXTENSIONS, &opts).unwrap();
    assert_eq!(out.count, 2);
    assert_eq!(names(&out), vec!["a_take.mov", "b_Take.MP4"]);
}

#[test]
fn missing_directory_is_empty() {
    let root = temp_dir("listing_missing");
    let out = list_files(&root, "nope", IMAGE_EXTENSIONS, &ListingOpts::default()).unwrap();
    assert_eq!(out, Listing::default());
}
