//! The JSON file shared by the extractor and the server.

use std::{
    fs::{self, File},
    io::{self, BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};

use crate::{
    error::{LoadError, StoreError},
    model::Dataset,
};

/// Writes `dataset` next to `path` and renames it into place, so readers see
/// either the old file or the new one.
pub fn save(dataset: &Dataset, path: &Path) -> Result<(), StoreError> {
    let io_err = |source| StoreError::Io {
        path: path.to_owned(),
        source,
    };

    let tmp = tmp_path(path);
    {
        let file = File::create(&tmp).map_err(io_err)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, dataset)?;
        writer.write_all(b"\n").map_err(io_err)?;
        writer.flush().map_err(io_err)?;
    }
    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(io_err(e));
    }

    tracing::info!(target: "store", "saved {} sessions to {}", dataset.sessions.len(), path.display());
    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

pub fn load(path: &Path) -> Result<Dataset, LoadError> {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(LoadError::Missing(path.to_owned())),
        Err(source) => {
            return Err(LoadError::Io {
                path: path.to_owned(),
                source,
            });
        }
    };
    serde_json::from_reader(BufReader::new(file)).map_err(|source| LoadError::Json {
        path: path.to_owned(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Session;

    #[test]
    fn save_replaces_whole_file() {
        let dir = std::env::temp_dir().join(format!("agenda-store-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("sessions.json");
        fs::write(&path, "stale content that is much longer than the new file").unwrap();

        let dataset = Dataset {
            sessions: vec![Session::new("Budget Roundtable")],
            ..Dataset::default()
        };
        save(&dataset, &path).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("{\n  \"sessions\""));
        assert!(!tmp_path(&path).exists());
        assert_eq!(load(&path).unwrap(), dataset);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn missing_file_is_reported() {
        let path = Path::new("/nonexistent/agenda/sessions.json");
        assert!(matches!(load(path), Err(LoadError::Missing(p)) if p == path));
    }
}
