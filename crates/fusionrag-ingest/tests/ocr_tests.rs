#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use fusionrag_ingest::{Ingestor, TesseractOcr, UploadedFile};
use tempfile::TempDir;

fn fake_tesseract(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{body}\n")).expect("write script");
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).expect("chmod");
    path
}

// One test so the scripts are never written while another thread forks.
#[test]
fn image_ocr_through_tesseract_command() {
    let tmp = TempDir::new().expect("tmp");
    let image = UploadedFile::new("receipt.JPG", vec![0xff, 0xd8, 0xff]);

    let reads = fake_tesseract(tmp.path(), "reads", r#"[ "$2" = stdout ] && [ "$4" = deu ] && echo "Total due 42""#);
    let ocr = TesseractOcr::new(&reads, "deu");
    assert!(!ocr.is_available(), "script ignores --version");
    let docs = Ingestor::new(ocr).load_files(&[image.clone()]);
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0].content.trim(), "Total due 42");
    assert_eq!(docs[0].source, "receipt.JPG");

    let blank = fake_tesseract(tmp.path(), "blank", "printf '  \\n'");
    assert!(Ingestor::new(TesseractOcr::new(&blank, "eng")).load_files(&[image.clone()]).is_empty());

    let failing = fake_tesseract(tmp.path(), "failing", "echo boom >&2; exit 1");
    let err = Ingestor::new(TesseractOcr::new(&failing, "eng")).extract(&image).expect_err("fails");
    assert!(err.to_string().contains("boom"));
}
