#[cfg(test)]
pub mod test {
    use std::fs;
    use std::io::Write;
    use std::path::{Path, PathBuf};

    use zip::write::SimpleFileOptions;

    use crate::error::TransformError;
    use crate::search::FileSearcher;

    /// Write `content` to `root/relative`, creating parent directories.
    pub fn write(root: &Path, relative: &str, content: &str) -> PathBuf {
        write_bytes(root, relative, content.as_bytes())
    }

    pub fn write_bytes(root: &Path, relative: &str, content: &[u8]) -> PathBuf {
        let path = root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path
    }

    pub fn read(root: &Path, relative: &str) -> String {
        fs::read_to_string(root.join(relative)).unwrap()
    }

    // -- Package trees ----------------------------------------------------------

    pub const WEB_CONFIG: &str = r#"<?xml version="1.0"?>
<configuration>
  <appSettings>
    <add key="env" value="dev" />
  </appSettings>
</configuration>
"#;

    pub const WEB_RELEASE_CONFIG: &str = r#"<?xml version="1.0"?>
<configuration xmlns:xdt="http://schemas.microsoft.com/XML-Document-Transform">
  <appSettings>
    <add key="env" value="release" xdt:Transform="SetAttributes" xdt:Locator="Match(key)" />
  </appSettings>
</configuration>
"#;

    pub const WEB_TEST_CONFIG: &str = r#"<?xml version="1.0"?>
<configuration xmlns:xdt="http://schemas.microsoft.com/XML-Document-Transform">
  <appSettings>
    <add key="env" value="test" xdt:Transform="SetAttributes" xdt:Locator="Match(key)" />
  </appSettings>
</configuration>
"#;

    /// A web package: `Web.config` with Release and Test overlays, plus an
    /// unrelated JSON file and a `logs/` directory.
    pub fn web_package(root: &Path) {
        write(root, "Web.config", WEB_CONFIG);
        write(root, "Web.Release.config", WEB_RELEASE_CONFIG);
        write(root, "Web.Test.config", WEB_TEST_CONFIG);
        write(root, "appsettings.json", "{\n  \"Logging\": { \"Level\": \"Debug\" }\n}\n");
        write(root, "logs/old.log", "stale");
    }

    /// Zip every file under `dir` into `archive`, with `/`-separated names.
    pub fn zip_dir(dir: &Path, archive: &Path) {
        let file = fs::File::create(archive).unwrap();
        let mut zip = zip::ZipWriter::new(file);
        let options = SimpleFileOptions::default();
        for entry in walkdir::WalkDir::new(dir).min_depth(1).sort_by_file_name() {
            let entry = entry.unwrap();
            let name = entry
                .path()
                .strip_prefix(dir)
                .unwrap()
                .to_string_lossy()
                .replace('\\', "/");
            if entry.file_type().is_dir() {
                zip.add_directory(name, options).unwrap();
            } else {
                zip.start_file(name, options).unwrap();
                zip.write_all(&fs::read(entry.path()).unwrap()).unwrap();
            }
        }
        zip.finish().unwrap();
    }

    /// Build a zip whose entries are given verbatim, including unsafe names.
    pub fn zip_entries(archive: &Path, entries: &[(&str, &str)]) {
        let file = fs::File::create(archive).unwrap();
        let mut zip = zip::ZipWriter::new(file);
        for (name, content) in entries {
            zip.start_file(*name, SimpleFileOptions::default()).unwrap();
            zip.write_all(content.as_bytes()).unwrap();
        }
        zip.finish().unwrap();
    }

    // -- Searchers --------------------------------------------------------------

    /// Returns a fixed list of relative paths, in the given order, for any query.
    pub struct StaticSearcher {
        paths: Vec<PathBuf>,
    }

    impl StaticSearcher {
        pub fn new<I, S>(paths: I) -> Self
        where
            I: IntoIterator<Item = S>,
            S: Into<PathBuf>,
        {
            Self {
                paths: paths.into_iter().map(Into::into).collect(),
            }
        }
    }

    impl FileSearcher for StaticSearcher {
        fn find(
            &self,
            _root: &Path,
            _exclude_patterns: &[String],
            _include_patterns: &[String],
        ) -> Result<Vec<PathBuf>, TransformError> {
            Ok(self.paths.clone())
        }
    }

    #[test]
    fn zip_dir_captures_nested_files() {
        let dir = tempfile::TempDir::new().unwrap();
        let src = dir.path().join("src");
        web_package(&src);
        let archive = dir.path().join("pkg.zip");
        zip_dir(&src, &archive);

        let zip = zip::ZipArchive::new(fs::File::open(&archive).unwrap()).unwrap();
        let names: Vec<&str> = zip.file_names().collect();
        assert!(names.contains(&"logs/old.log"));
        assert!(names.contains(&"Web.Release.config"));
    }
}
