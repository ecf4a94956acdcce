//! Archive Flattener
//!
//! Turns stored bytes into the textual input handed to the AI collaborator. ZIP archives
//! are expanded in memory into source/config/doc files; anything else becomes one blob.
//! Failures never propagate: a corrupt archive, or one where nothing survives filtering,
//! degrades to a hex preview of the raw bytes.

use std::io::{Cursor, Read};

use armorclaw_core::models::ProjectFile;

use crate::validator::file_extension;

pub const ZIP_SIGNATURE: [u8; 4] = [0x50, 0x4B, 0x03, 0x04];

/// Extensions kept when expanding an archive. Fixed, unlike the upload allow-list.
pub const PROJECT_FILE_EXTENSIONS: &[&str] = &[
    "c", "h", "cpp", "hpp", "rs", "go", "py", "js", "ts", "mjs", "sh", "md", "txt", "json", "yaml",
    "yml", "ebpf",
];

const JUNK_PATH_MARKERS: &[&str] = &["__MACOSX", ".DS_Store"];

pub const HEX_PREVIEW_BYTES: usize = 1000;

/// Per-entry decompression cap.
const MAX_ENTRY_BYTES: u64 = 16 * 1024 * 1024;

/// What the AI collaborator receives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectInput {
    /// Files extracted from an archive, in archive order.
    Files(Vec<ProjectFile>),
    /// The upload as a single file: decoded text, or a hex preview for binaries.
    Single(ProjectFile),
}

impl ProjectInput {
    pub fn files(&self) -> &[ProjectFile] {
        match self {
            ProjectInput::Files(files) => files,
            ProjectInput::Single(file) => std::slice::from_ref(file),
        }
    }

    pub fn is_archive(&self) -> bool {
        matches!(self, ProjectInput::Files(_))
    }
}

/// True when `data` carries the local file header signature and at least one byte after it.
pub fn is_zip(data: &[u8]) -> bool {
    data.len() > ZIP_SIGNATURE.len() && data.starts_with(&ZIP_SIGNATURE)
}

/// `Binary file (hex preview): 7f 45 4c 46 ...` over the first [`HEX_PREVIEW_BYTES`] bytes.
pub fn hex_preview(data: &[u8]) -> String {
    let preview = data
        .iter()
        .take(HEX_PREVIEW_BYTES)
        .map(|b| format!("{:02x}", b))
        .collect::<Vec<_>>()
        .join(" ");
    format!("Binary file (hex preview): {}...", preview)
}

fn single_blob(name: &str, data: &[u8]) -> ProjectInput {
    ProjectInput::Single(ProjectFile::new(name, hex_preview(data), data.len() as u64))
}

/// Flatten an upload named `name` into [`ProjectInput`].
pub fn flatten(name: &str, data: &[u8]) -> ProjectInput {
    if !is_zip(data) {
        return match std::str::from_utf8(data) {
            Ok(text) if !text.contains('\0') => {
                ProjectInput::Single(ProjectFile::new(name, text, data.len() as u64))
            }
            _ => single_blob(name, data),
        };
    }

    match extract_project_files(data) {
        Ok(files) if !files.is_empty() => {
            tracing::debug!(files = files.len(), archive = %name, "Extracted project files from ZIP");
            ProjectInput::Files(files)
        }
        Ok(_) => {
            tracing::warn!(archive = %name, "No source files survived filtering, using hex preview");
            single_blob(name, data)
        }
        Err(e) => {
            tracing::warn!(error = %e, archive = %name, "ZIP decompression failed, using hex preview");
            single_blob(name, data)
        }
    }
}

fn keep_entry(path: &str) -> bool {
    if path.ends_with('/') {
        return false;
    }
    if JUNK_PATH_MARKERS.iter().any(|marker| path.contains(marker)) {
        return false;
    }
    match file_extension(path) {
        Some(ext) => PROJECT_FILE_EXTENSIONS.contains(&ext.as_str()),
        None => false,
    }
}

fn extract_project_files(data: &[u8]) -> zip::result::ZipResult<Vec<ProjectFile>> {
    let mut archive = zip::ZipArchive::new(Cursor::new(data))?;
    let mut files = Vec::new();

    for index in 0..archive.len() {
        let entry = archive.by_index(index)?;
        let path = entry.name().to_string();
        if entry.is_dir() || !keep_entry(&path) {
            continue;
        }

        if entry.size() > MAX_ENTRY_BYTES {
            tracing::warn!(entry = %path, size_bytes = entry.size(), "Skipping oversized archive entry");
            continue;
        }

        let mut bytes = Vec::with_capacity(entry.size() as usize);
        entry.take(MAX_ENTRY_BYTES).read_to_end(&mut bytes)?;

        let text = String::from_utf8_lossy(&bytes);
        if text.contains('\0') {
            continue;
        }

        files.push(ProjectFile::new(path, text.into_owned(), bytes.len() as u64));
    }

    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::{FileOptions, ZipWriter};
    use zip::CompressionMethod;

    fn build_zip(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut buffer = Vec::new();
        {
            let mut zip = ZipWriter::new(Cursor::new(&mut buffer));
            let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
            for (name, content) in entries {
                if name.ends_with('/') {
                    zip.add_directory(name.trim_end_matches('/'), options).unwrap();
                } else {
                    zip.start_file(*name, options).unwrap();
                    zip.write_all(content).unwrap();
                }
            }
            zip.finish().unwrap();
        }
        buffer
    }

    #[test]
    fn test_non_zip_text_is_single_file() {
        let source = b"SEC(\"xdp\") int prog(struct xdp_md *ctx) { return XDP_PASS; }";
        let input = flatten("prog.c", source);
        match input {
            ProjectInput::Single(file) => {
                assert_eq!(file.path, "prog.c");
                assert_eq!(file.content.as_bytes(), source);
                assert_eq!(file.size, source.len() as u64);
            }
            other => panic!("expected single file, got {:?}", other),
        }
    }

    #[test]
    fn test_non_zip_binary_gets_hex_preview() {
        let elf = [0x7f, b'E', b'L', b'F', 0x02, 0x01, 0x00, 0xff];
        let input = flatten("prog.o", &elf);
        let file = &input.files()[0];
        assert!(!input.is_archive());
        assert_eq!(
            file.content,
            "Binary file (hex preview): 7f 45 4c 46 02 01 00 ff..."
        );
    }

    #[test]
    fn test_hex_preview_is_truncated() {
        let data = vec![0xabu8; 5000];
        let preview = hex_preview(&data);
        assert_eq!(preview.matches("ab").count(), HEX_PREVIEW_BYTES);
    }

    #[test]
    fn test_zip_keeps_only_allowed_text_files() {
        let mut png = vec![0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];
        png.extend(std::iter::repeat(0u8).take(50 * 1024));
        let main_c = vec![b'x'; 1024];
        let zip = build_zip(&[("main.c", &main_c), ("logo.png", &png)]);

        let input = flatten("bundle.zip", &zip);
        assert!(input.is_archive());
        let files = input.files();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].path, "main.c");
        assert_eq!(files[0].size, 1024);
    }

    #[test]
    fn test_zip_filters_directories_junk_and_binary_text() {
        let zip = build_zip(&[
            ("src/", b""),
            ("src/tracer.bpf.c", b"int x;"),
            ("__MACOSX/src/._tracer.bpf.c", b"junk"),
            ("src/.DS_Store.txt", b"junk"),
            ("README.MD", b"# Probe"),
            ("data.json", b"{\"a\":\0}"),
            ("loader.ebpf", b"\xff\xfe bytes"),
        ]);

        let input = flatten("p.zip", &zip);
        let paths: Vec<_> = input.files().iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, vec!["src/tracer.bpf.c", "README.MD", "loader.ebpf"]);
        // invalid UTF-8 is decoded lossily
        assert!(input.files()[2].content.contains('\u{FFFD}'));
    }

    #[test]
    fn test_zip_with_no_survivors_falls_back_to_hex() {
        let zip = build_zip(&[("logo.png", b"\x89PNG"), ("icon.ico", b"\x00\x00")]);
        let input = flatten("images.zip", &zip);
        match input {
            ProjectInput::Single(file) => {
                assert_eq!(file.path, "images.zip");
                assert!(file.content.starts_with("Binary file (hex preview): 50 4b 03 04"));
            }
            other => panic!("expected fallback, got {:?}", other),
        }
    }

    #[test]
    fn test_corrupt_zip_falls_back_to_hex() {
        let mut data = ZIP_SIGNATURE.to_vec();
        data.extend_from_slice(b"not really an archive");
        let input = flatten("broken.zip", &data);
        assert!(!input.is_archive());
        assert!(input.files()[0].content.starts_with("Binary file (hex preview): "));
    }

    #[test]
    fn test_signature_alone_is_not_an_archive() {
        assert!(!is_zip(&ZIP_SIGNATURE));
        assert!(!is_zip(&ZIP_SIGNATURE[..3]));

        let mut one_more = ZIP_SIGNATURE.to_vec();
        one_more.push(0);
        assert!(is_zip(&one_more));

        let input = flatten("empty.zip", &ZIP_SIGNATURE);
        assert!(!input.is_archive());
        assert_eq!(input.files()[0].path, "empty.zip");
        assert_eq!(input.files()[0].size, 4);
    }
}
