use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;

const DEFAULT_DIR_NAME: &str = ".taskdeck";

/// Resolves the data directory, falling back to `~/.taskdeck`.
pub(crate) fn data_dir(base_dir: Option<PathBuf>) -> Result<PathBuf> {
    match base_dir {
        Some(dir) => Ok(dir),
        None => {
            let home_dir =
                dirs::home_dir().ok_or_else(|| anyhow!("Could not determine home directory"))?;
            Ok(home_dir.join(DEFAULT_DIR_NAME))
        }
    }
}

/// A JSON array of documents kept in one file.
pub(crate) struct JsonFile<T> {
    path: PathBuf,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Serialize + DeserializeOwned> JsonFile<T> {
    pub(crate) fn open(dir: &Path, file_name: &str) -> Result<Self> {
        fs::create_dir_all(dir)
            .with_context(|| format!("creating data directory {}", dir.display()))?;
        let path = dir.join(file_name);

        let file = Self {
            path,
            _marker: PhantomData,
        };
        if !file.path.exists() {
            file.write_all(&[])?;
        }
        Ok(file)
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    pub(crate) fn read_all(&self) -> Result<Vec<T>> {
        let file = File::open(&self.path)
            .with_context(|| format!("opening {}", self.path.display()))?;
        let reader = BufReader::new(file);
        let docs = serde_json::from_reader(reader)
            .with_context(|| format!("parsing {}", self.path.display()))?;
        Ok(docs)
    }

    pub(crate) fn write_all(&self, docs: &[T]) -> Result<()> {
        let file = File::create(&self.path)
            .with_context(|| format!("writing {}", self.path.display()))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, docs)?;
        writer.flush()?;
        Ok(())
    }
}
