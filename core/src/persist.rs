use crate::config::SearchConfig;
use crate::dictionary::{Dictionary, DICTIONARY_VERSION};
use anyhow::{bail, Context, Result};
use std::fs::{create_dir_all, File};
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};

/// The two artifacts a finished index consists of.
#[derive(Debug, Clone)]
pub struct IndexPaths {
    pub dictionary: PathBuf,
    pub postings: PathBuf,
}

impl IndexPaths {
    pub fn new<D: AsRef<Path>, P: AsRef<Path>>(dictionary: D, postings: P) -> Self {
        Self { dictionary: dictionary.as_ref().to_path_buf(), postings: postings.as_ref().to_path_buf() }
    }
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    }
    Ok(())
}

pub fn save_dictionary(path: &Path, dict: &Dictionary) -> Result<()> {
    ensure_parent(path)?;
    let f = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut out = BufWriter::new(f);
    serde_json::to_writer(&mut out, dict)?;
    out.flush()?;
    Ok(())
}

pub fn load_dictionary(path: &Path) -> Result<Dictionary> {
    let mut f = File::open(path).with_context(|| format!("opening dictionary {}", path.display()))?;
    let mut buf = String::new();
    f.read_to_string(&mut buf)?;
    let dict: Dictionary = serde_json::from_str(&buf).with_context(|| format!("parsing dictionary {}", path.display()))?;
    if dict.version != DICTIONARY_VERSION {
        bail!("dictionary {} has version {}, expected {}", path.display(), dict.version, DICTIONARY_VERSION);
    }
    Ok(dict)
}

pub fn load_search_config(path: &Path) -> Result<SearchConfig> {
    let mut f = File::open(path).with_context(|| format!("opening config {}", path.display()))?;
    let mut buf = String::new();
    f.read_to_string(&mut buf)?;
    let cfg: SearchConfig = serde_json::from_str(&buf).with_context(|| format!("parsing config {}", path.display()))?;
    Ok(cfg)
}
