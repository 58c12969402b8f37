//! Tabulated n,k and spectrum data.

use std::io::Read;
use std::path::{Path, PathBuf};

use csv::{Reader, ReaderBuilder, Trim};
use num_complex::Complex64;

use super::{IndexProvider, MaterialError};
use crate::algo::{InterpError, LinearTable};
use crate::grid::WavelengthGrid;

fn reader_builder() -> ReaderBuilder {
    let mut builder = ReaderBuilder::new();
    builder.has_headers(false).trim(Trim::All).flexible(true);
    builder
}

fn csv_error(path: &Path, err: csv::Error) -> MaterialError {
    if err.is_io_error() {
        return MaterialError::Io {
            path: path.to_path_buf(),
            message: err.to_string(),
        };
    }
    MaterialError::Parse {
        path: path.to_path_buf(),
        line: err.position().map_or(0, |p| p.line() as usize),
        message: err.to_string(),
    }
}

/// Read a comma separated numeric table from disk.
///
/// The first `header_lines` lines are skipped, blank lines are ignored and
/// the first `columns` fields of each row are kept (extra columns are
/// allowed). Rows come back sorted by the first column.
pub(crate) fn read_table(
    path: &Path,
    header_lines: usize,
    columns: usize,
) -> Result<Vec<Vec<f64>>, MaterialError> {
    let reader = reader_builder()
        .from_path(path)
        .map_err(|e| csv_error(path, e))?;
    parse_records(path, reader, header_lines, columns)
}

/// [`read_table`] on in-memory text; `path` only labels errors.
pub(crate) fn parse_table(
    path: &Path,
    text: &str,
    header_lines: usize,
    columns: usize,
) -> Result<Vec<Vec<f64>>, MaterialError> {
    let reader = reader_builder().from_reader(text.as_bytes());
    parse_records(path, reader, header_lines, columns)
}

fn parse_records<R: Read>(
    path: &Path,
    mut reader: Reader<R>,
    header_lines: usize,
    columns: usize,
) -> Result<Vec<Vec<f64>>, MaterialError> {
    let parse_error = |line: usize, message: String| MaterialError::Parse {
        path: path.to_path_buf(),
        line,
        message,
    };

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| csv_error(path, e))?;
        let line = record.position().map_or(0, |p| p.line() as usize);
        if line <= header_lines || record.iter().all(str::is_empty) {
            continue;
        }
        if record.len() < columns {
            return Err(parse_error(
                line,
                format!("expected {columns} columns, found {}", record.len()),
            ));
        }

        let mut row = Vec::with_capacity(columns);
        for field in record.iter().take(columns) {
            let value: f64 = field
                .parse()
                .map_err(|_| parse_error(line, format!("invalid number '{field}'")))?;
            if !value.is_finite() {
                return Err(parse_error(line, format!("non-finite value '{field}'")));
            }
            row.push(value);
        }
        rows.push(row);
    }

    sort_rows(path, rows)
}

/// Sort by wavelength and reject short tables and repeated wavelengths.
fn sort_rows(path: &Path, mut rows: Vec<Vec<f64>>) -> Result<Vec<Vec<f64>>, MaterialError> {
    if rows.len() < 2 {
        return Err(MaterialError::TooFewRows {
            path: path.to_path_buf(),
            rows: rows.len(),
        });
    }

    rows.sort_by(|a, b| a[0].total_cmp(&b[0]));
    if let Some(pair) = rows.windows(2).find(|w| w[0][0] == w[1][0]) {
        return Err(MaterialError::DuplicateWavelength {
            path: path.to_path_buf(),
            wavelength_nm: pair[0][0],
        });
    }

    Ok(rows)
}

/// In-memory rows go through the same checks as file rows.
fn rows_from_values(path: &Path, rows: Vec<Vec<f64>>) -> Result<Vec<Vec<f64>>, MaterialError> {
    if let Some(index) = rows
        .iter()
        .position(|row| row.iter().any(|v| !v.is_finite()))
    {
        return Err(MaterialError::Parse {
            path: path.to_path_buf(),
            line: index + 1,
            message: "non-finite value".to_string(),
        });
    }
    sort_rows(path, rows)
}

fn column_table(
    path: &Path,
    rows: &[Vec<f64>],
    index: usize,
) -> Result<LinearTable, MaterialError> {
    let xs = rows.iter().map(|row| row[0]).collect();
    let ys = rows.iter().map(|row| row[index]).collect();
    LinearTable::new(xs, ys).map_err(|e| MaterialError::Parse {
        path: path.to_path_buf(),
        line: 0,
        message: e.to_string(),
    })
}

fn out_of_range(material: &str, err: InterpError) -> MaterialError {
    match err {
        InterpError::OutOfBounds(wavelength_nm, min, max) => MaterialError::OutOfRange {
            material: material.to_string(),
            wavelength_nm,
            min,
            max,
        },
        other => MaterialError::Parse {
            path: PathBuf::from(material),
            line: 0,
            message: other.to_string(),
        },
    }
}

/// Refractive index table of one material
#[derive(Debug, Clone)]
pub struct NkTable {
    name: String,
    n: LinearTable,
    k: LinearTable,
}

impl NkTable {
    fn from_sorted(name: String, path: &Path, rows: &[Vec<f64>]) -> Result<Self, MaterialError> {
        Ok(Self {
            n: column_table(path, rows, 1)?,
            k: column_table(path, rows, 2)?,
            name,
        })
    }

    /// Load a `wavelength,n,k` CSV file.
    pub fn from_csv(
        name: impl Into<String>,
        path: &Path,
        header_lines: usize,
    ) -> Result<Self, MaterialError> {
        let rows = read_table(path, header_lines, 3)?;
        Self::from_sorted(name.into(), path, &rows)
    }

    /// Build a table from `(wavelength, n, k)` rows in any order.
    pub fn from_rows(
        name: impl Into<String>,
        rows: &[(f64, f64, f64)],
    ) -> Result<Self, MaterialError> {
        let name = name.into();
        let path = PathBuf::from(&name);
        let values = rows.iter().map(|&(wl, n, k)| vec![wl, n, k]).collect();
        let rows = rows_from_values(&path, values)?;
        Self::from_sorted(name, &path, &rows)
    }

    pub fn len(&self) -> usize {
        self.n.len()
    }

    pub fn is_empty(&self) -> bool {
        self.n.is_empty()
    }
}

impl IndexProvider for NkTable {
    fn name(&self) -> &str {
        &self.name
    }

    fn wavelength_range(&self) -> (f64, f64) {
        self.n.range()
    }

    fn refractive_index(&self, wavelength_nm: f64) -> Result<Complex64, MaterialError> {
        let n = self
            .n
            .at(wavelength_nm)
            .map_err(|e| out_of_range(&self.name, e))?;
        let k = self
            .k
            .at(wavelength_nm)
            .map_err(|e| out_of_range(&self.name, e))?;
        Ok(Complex64::new(n, k))
    }
}

/// Reference illumination spectrum, irradiance in mW cm⁻² nm⁻¹
#[derive(Debug, Clone)]
pub struct SpectrumTable {
    irradiance: LinearTable,
}

impl SpectrumTable {
    /// Load a `wavelength,irradiance` CSV file.
    pub fn from_csv(path: &Path, header_lines: usize) -> Result<Self, MaterialError> {
        let rows = read_table(path, header_lines, 2)?;
        Ok(Self {
            irradiance: column_table(path, &rows, 1)?,
        })
    }

    /// Build a spectrum from `(wavelength, irradiance)` pairs in any order.
    pub fn from_rows(rows: &[(f64, f64)]) -> Result<Self, MaterialError> {
        let path = Path::new("spectrum");
        let values = rows.iter().map(|&(wl, e)| vec![wl, e]).collect();
        let rows = rows_from_values(path, values)?;
        Ok(Self {
            irradiance: column_table(path, &rows, 1)?,
        })
    }

    /// Irradiance interpolated onto every grid wavelength.
    pub fn resample(&self, grid: &WavelengthGrid) -> Result<Vec<f64>, MaterialError> {
        self.irradiance
            .onto(grid.wavelengths())
            .map_err(|e| out_of_range("spectrum", e))
    }
}
