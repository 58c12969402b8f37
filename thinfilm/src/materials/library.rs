//! Directory of material tables addressed by layer name.

use std::path::{Path, PathBuf};

use log::debug;

use super::{MaterialError, NkTable, SpectrumTable};

/// A directory of `<prefix><name>.csv` refractive index tables.
///
/// A layer named `P3HT` resolves to `nk_P3HT.csv` with the default prefix.
#[derive(Debug, Clone)]
pub struct MaterialLibrary {
    directory: PathBuf,
    prefix: String,
    header_lines: usize,
}

impl MaterialLibrary {
    pub fn new(directory: impl AsRef<Path>) -> Self {
        Self {
            directory: directory.as_ref().to_path_buf(),
            prefix: "nk_".to_string(),
            header_lines: 1,
        }
    }

    pub fn with_prefix(mut self, prefix: &str) -> Self {
        self.prefix = prefix.to_string();
        self
    }

    pub fn with_header_lines(mut self, header_lines: usize) -> Self {
        self.header_lines = header_lines;
        self
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// File backing the material `name`
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.directory.join(format!("{}{}.csv", self.prefix, name))
    }

    pub fn load(&self, name: &str) -> Result<NkTable, MaterialError> {
        let path = self.path_for(name);
        debug!("Loading optical constants for {} from {}", name, path.display());
        let table = NkTable::from_csv(name, &path, self.header_lines)?;
        debug!("Loaded {} rows for {}", table.len(), name);
        Ok(table)
    }

    /// Load a spectrum file stored in the same directory.
    pub fn load_spectrum(&self, file_name: &str) -> Result<SpectrumTable, MaterialError> {
        let path = self.directory.join(file_name);
        debug!("Loading spectrum from {}", path.display());
        SpectrumTable::from_csv(&path, self.header_lines)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::materials::IndexProvider;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_path_resolution() {
        let library = MaterialLibrary::new("matdata");
        assert_eq!(library.path_for("ITO"), PathBuf::from("matdata/nk_ITO.csv"));

        let library = library.with_prefix("n_k-");
        assert_eq!(library.path_for("Al"), PathBuf::from("matdata/n_k-Al.csv"));
    }

    #[test]
    fn test_load_from_directory() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("nk_Ca.csv"),
            "wavelength,n,k\n300,0.3,1.5\n900,0.2,4.0\n",
        )
        .unwrap();
        fs::write(dir.path().join("AM15G.csv"), "wl,irr\n280,0.0\n4000,0.01\n").unwrap();

        let library = MaterialLibrary::new(dir.path());
        let table = library.load("Ca").unwrap();
        assert_eq!(table.name(), "Ca");
        assert_eq!(table.wavelength_range(), (300.0, 900.0));
        assert!(library.load_spectrum("AM15G.csv").is_ok());
    }

    #[test]
    fn test_missing_material_is_io_error() {
        let dir = tempdir().unwrap();
        let library = MaterialLibrary::new(dir.path());
        assert!(matches!(
            library.load("Unobtainium"),
            Err(MaterialError::Io { .. })
        ));
    }
}
