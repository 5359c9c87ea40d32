//! Plain-text case files for the propagation solver.
//!
//! Every file is one record per line. Index lists put a single space after
//! each index; scalar columns use six decimals.
//!
//! | File | Content |
//! |------|---------|
//! | `vecinos.txt` | site adjacency |
//! | `cell_conex_nodos.txt` | element connectivity |
//! | `centroidCellX.txt` (`Y`, `Z`) | site coordinates |
//! | `EndoToEpi.txt` | transmural class code |
//! | `scarTissue.txt` | cell type code |
//! | `fibreOrientationX.txt` (`Y`, `Z`) | fiber direction |
//! | `centerMass-BPL.txt` (nodes), `centerMass.txt` (elements) | ventricle centroid, one coordinate per line |
//! | `pacing_34.txt` | pacing slots |

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use mesh_types::{HexElement, HexMesh};
use tracing::info;

use crate::error::{ExportError, ExportResult};
use crate::params::EvaluationSite;
use crate::pipeline::{evaluation_sites, TaggedVentricle};
use crate::segments::PacingSites;
use crate::topology::AdjacencyList;

/// Write one line of space-terminated indices per site.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_adjacency<W: Write>(adjacency: &AdjacencyList, writer: &mut W) -> ExportResult<()> {
    for neighbors in adjacency.iter() {
        write_index_row(writer, neighbors)?;
    }
    Ok(())
}

/// Save adjacency to a file.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written.
pub fn save_adjacency<P: AsRef<Path>>(adjacency: &AdjacencyList, path: P) -> ExportResult<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_adjacency(adjacency, &mut writer)?;
    writer.flush()?;
    Ok(())
}

/// Write the node indices of each element in element-local order.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_connectivity<W: Write>(elements: &[HexElement], writer: &mut W) -> ExportResult<()> {
    for element in elements {
        write_index_row(writer, element)?;
    }
    Ok(())
}

/// Save element connectivity to a file.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written.
pub fn save_connectivity<P: AsRef<Path>>(elements: &[HexElement], path: P) -> ExportResult<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_connectivity(elements, &mut writer)?;
    writer.flush()?;
    Ok(())
}

/// Write one value per line with six decimals.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_scalar_column<W, I>(values: I, writer: &mut W) -> ExportResult<()>
where
    W: Write,
    I: IntoIterator<Item = f64>,
{
    for v in values {
        writeln!(writer, "{v:.6}")?;
    }
    Ok(())
}

/// Save a scalar column to a file.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written.
pub fn save_scalar_column<P, I>(values: I, path: P) -> ExportResult<()>
where
    P: AsRef<Path>,
    I: IntoIterator<Item = f64>,
{
    let mut writer = BufWriter::new(File::create(path)?);
    write_scalar_column(values, &mut writer)?;
    writer.flush()?;
    Ok(())
}

/// Write the 34 pacing slots, `-1` for an empty slot.
///
/// # Errors
///
/// Returns an error if writing fails.
#[allow(clippy::cast_precision_loss)]
pub fn write_pacing_sites<W: Write>(pacing: &PacingSites, writer: &mut W) -> ExportResult<()> {
    write_scalar_column(
        pacing.slots.iter().map(|slot| slot.map_or(-1.0, |site| site as f64)),
        writer,
    )
}

fn write_index_row<W: Write>(writer: &mut W, indices: &[u32]) -> ExportResult<()> {
    for i in indices {
        write!(writer, "{i} ")?;
    }
    writeln!(writer)?;
    Ok(())
}

fn check_len(what: &'static str, expected: usize, actual: usize) -> ExportResult<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(ExportError::LengthMismatch {
            what,
            expected,
            actual,
        })
    }
}

/// Name of the centroid file; the node and element readers of the solver
/// expect different names.
const fn center_mass_file(site: EvaluationSite) -> &'static str {
    match site {
        EvaluationSite::Node => "centerMass-BPL.txt",
        EvaluationSite::ElementCentroid => "centerMass.txt",
    }
}

/// Write a complete case directory for a tagged ventricle.
///
/// The directory is created if missing. Coordinates are those of the
/// evaluation sites the ventricle was tagged on.
///
/// # Errors
///
/// Returns [`ExportError::LengthMismatch`] if `result` was not computed on
/// `mesh`, or an I/O error.
pub fn save_case<P: AsRef<Path>>(dir: P, result: &TaggedVentricle, mesh: &HexMesh) -> ExportResult<()> {
    let dir = dir.as_ref();
    let sites = evaluation_sites(mesh, result.site);
    check_len("labels", sites.len(), result.len())?;
    check_len("adjacency", sites.len(), result.adjacency.len())?;
    check_len("pacing flags", sites.len(), result.pacing.flags.len())?;

    fs::create_dir_all(dir)?;

    save_adjacency(&result.adjacency, dir.join("vecinos.txt"))?;
    save_connectivity(mesh.element_connectivity(), dir.join("cell_conex_nodos.txt"))?;

    for (axis, name) in ["centroidCellX.txt", "centroidCellY.txt", "centroidCellZ.txt"]
        .iter()
        .enumerate()
    {
        save_scalar_column(sites.iter().map(|p| p[axis]), dir.join(name))?;
    }

    save_scalar_column(
        result.labels.iter().map(|l| f64::from(l.transmural_class.code())),
        dir.join("EndoToEpi.txt"),
    )?;
    save_scalar_column(
        result.labels.iter().map(|l| f64::from(l.cell_type.code())),
        dir.join("scarTissue.txt"),
    )?;

    for (axis, name) in [
        "fibreOrientationX.txt",
        "fibreOrientationY.txt",
        "fibreOrientationZ.txt",
    ]
    .iter()
    .enumerate()
    {
        save_scalar_column(result.labels.iter().map(|l| l.fiber_orientation[axis]), dir.join(name))?;
    }

    let centroid = result.centroid();
    save_scalar_column(centroid.coords.iter().copied(), dir.join(center_mass_file(result.site)))?;

    let mut writer = BufWriter::new(File::create(dir.join("pacing_34.txt"))?);
    write_pacing_sites(&result.pacing, &mut writer)?;
    writer.flush()?;

    info!(dir = %dir.display(), sites = sites.len(), "saved case files");
    Ok(())
}
