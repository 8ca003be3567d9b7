use std::fs::File;
use std::path::{Path, PathBuf};

use zip::ZipArchive;

use super::{io_error, ConversionError, ConversionResult};

/// Extracts next to the archive and lists what came out, so each file can be
/// inspected on its own afterwards.
pub fn convert(path: &Path) -> Result<ConversionResult, ConversionError> {
    let file = File::open(path).map_err(io_error(path))?;
    let mut archive = ZipArchive::new(file).map_err(|e| ConversionError::malformed(path, e))?;

    let target = extraction_dir(path);
    archive
        .extract(&target)
        .map_err(|e| ConversionError::malformed(path, e))?;

    let mut files = Vec::new();
    for i in 0..archive.len() {
        let entry = archive.by_index(i).map_err(|e| ConversionError::malformed(path, e))?;
        if entry.is_dir() {
            continue;
        }
        if let Some(name) = entry.enclosed_name() {
            files.push(target.join(name));
        }
    }
    files.sort();

    let listing = files
        .iter()
        .map(|f| format!("* {}", f.display()))
        .collect::<Vec<_>>()
        .join("\n");

    let title = path.file_name().and_then(|n| n.to_str()).map(str::to_string);
    Ok(ConversionResult::new(
        title,
        format!(
            "Extracted the archive to {}. It contains the following files:\n\n{}",
            target.display(),
            listing
        ),
    ))
}

/// `data/files.zip` extracts into `data/files/`
pub fn extraction_dir(path: &Path) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "archive".to_string());
    path.with_file_name(stem)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    #[test]
    fn test_extracts_and_lists_files() {
        let dir = tempfile::TempDir::new().unwrap();
        let zip_path = dir.path().join("bundle.zip");

        let mut writer = zip::ZipWriter::new(File::create(&zip_path).unwrap());
        writer.add_directory("nested/", SimpleFileOptions::default()).unwrap();
        writer.start_file("nested/b.txt", SimpleFileOptions::default()).unwrap();
        writer.write_all(b"bravo").unwrap();
        writer.start_file("a.txt", SimpleFileOptions::default()).unwrap();
        writer.write_all(b"alpha").unwrap();
        writer.finish().unwrap();

        let result = convert(&zip_path).unwrap();
        let target = dir.path().join("bundle");

        assert_eq!(result.title.as_deref(), Some("bundle.zip"));
        assert!(result.text_content.contains(&format!("* {}", target.join("a.txt").display())));
        assert!(result.text_content.contains(&format!("* {}", target.join("nested/b.txt").display())));
        assert!(!result.text_content.contains("* nested/\n"));
        assert_eq!(std::fs::read_to_string(target.join("a.txt")).unwrap(), "alpha");
    }

    #[test]
    fn test_extraction_dir() {
        assert_eq!(extraction_dir(Path::new("data/files.zip")), PathBuf::from("data/files"));
    }
}
