//! On-disk persistence of distance tables between runs.
//!
//! Layout (little-endian):
//!   magic `DTBL` | point count `u64` | SHA-256 key (32 bytes)
//!   then per point: sorted neighbor ids (`u32` × (n − 1)), distances (`f64` × (n − 1))

use std::{fs::File, io::{BufReader, BufWriter, Read, Write}, path::{Path, PathBuf}};

use anyhow::{Context, Result, ensure};
use sha2::{Digest, Sha256};

use crate::common::ensure_dir_exists;
use crate::index::DistanceIndex;
use crate::io::Instance;

const MAGIC: &[u8; 4] = b"DTBL";

/// A directory of persisted distance tables keyed by instance content.
#[derive(Clone, Debug)]
pub struct DistanceCache {
    dir: PathBuf,
}

impl DistanceCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[inline] pub fn dir(&self) -> &Path { &self.dir }

    /// SHA-256 digest of everything that determines the distances of an instance.
    pub fn digest(instance: &Instance) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(format!("{:?}", instance.weight_type).as_bytes());
        hasher.update((instance.len() as u64).to_le_bytes());
        for &(x, y) in &instance.points {
            hasher.update(x.to_le_bytes());
            hasher.update(y.to_le_bytes());
        }
        for row in instance.matrix.iter().flatten() {
            for &d in row { hasher.update(d.to_le_bytes()) }
        }
        let mut digest = [0u8; 32];
        digest.copy_from_slice(&hasher.finalize());
        digest
    }

    /// Hex cache key of an instance.
    pub fn key(instance: &Instance) -> String { hex::encode(Self::digest(instance)) }

    /// Path of the table for an instance.
    pub fn path_for(&self, instance: &Instance) -> PathBuf {
        self.dir.join(format!("{}.dtbl", Self::key(instance)))
    }

    /// Read the persisted table for `instance`, or build and persist it.
    ///
    /// A missing, corrupt or mismatching file is rebuilt; the cache never
    /// changes the distances the engine sees.
    pub fn load_or_build(&self, instance: &Instance) -> Result<DistanceIndex> {
        let path = self.path_for(instance);
        let digest = Self::digest(instance);

        if path.exists() {
            match read_table(&path, &digest, instance.len()).and_then(|(rows, dists)| {
                DistanceIndex::from_sorted_rows(&instance.points, rows, dists)
                    .context("[io::cache] table does not match the instance")
            }) {
                Ok(index) => {
                    log::info!("[io::cache] loaded distance table {}", path.display());
                    return Ok(index);
                }
                Err(err) => log::warn!("[io::cache] rebuilding {}: {err:#}", path.display()),
            }
        }

        let index = instance.build_index()?;
        ensure_dir_exists(&self.dir)?;
        write_table(&path, &index, &digest)?;
        log::info!("[io::cache] wrote distance table {}", path.display());
        Ok(index)
    }
}

fn write_table(path: &Path, index: &DistanceIndex, digest: &[u8; 32]) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("[io::cache] failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    write_distance_table(&mut writer, index, digest)?;
    writer.flush().with_context(|| format!("[io::cache] failed to flush {}", path.display()))
}

fn read_table(path: &Path, digest: &[u8; 32], expected: usize) -> Result<(Vec<Vec<u32>>, Vec<Vec<f64>>)> {
    let file = File::open(path)
        .with_context(|| format!("[io::cache] failed to open {}", path.display()))?;
    let (stored, rows, dists) = read_distance_table(&mut BufReader::new(file), expected)?;
    ensure!(&stored == digest, "[io::cache] key mismatch in {}", path.display());
    Ok((rows, dists))
}

pub(crate) fn write_distance_table<W: Write>(writer: &mut W, index: &DistanceIndex, digest: &[u8; 32]) -> Result<()> {
    writer.write_all(MAGIC)
        .context("[io::cache] Failed to write magic bytes")?;
    writer.write_all(&(index.len() as u64).to_le_bytes())
        .context("[io::cache] Failed to write point count")?;
    writer.write_all(digest)
        .context("[io::cache] Failed to write key")?;

    for i in 0..index.len() {
        let row = index.sorted_row(i);
        for &j in row {
            writer.write_all(&j.to_le_bytes())
                .context("[io::cache] Failed to write neighbor ids")?;
        }
        for &j in row {
            writer.write_all(&index.distance(i, j as usize).to_le_bytes())
                .context("[io::cache] Failed to write distances")?;
        }
    }
    Ok(())
}

/// Read a table that must hold exactly `expected` points.
#[allow(clippy::type_complexity)]
pub(crate) fn read_distance_table<R: Read>(reader: &mut R, expected: usize) -> Result<([u8; 32], Vec<Vec<u32>>, Vec<Vec<f64>>)> {
    let mut magic = [0u8; 4];
    reader.read_exact(&mut magic)
        .context("[io::cache] Failed to read magic bytes")?;
    ensure!(&magic == MAGIC, "[io::cache] Invalid magic: expected 'DTBL'");

    let mut b8 = [0u8; 8];
    reader.read_exact(&mut b8)
        .context("[io::cache] Failed to read point count")?;
    let stored = u64::from_le_bytes(b8);
    ensure!(stored == expected as u64, "[io::cache] table holds {stored} points, expected {expected}");
    let n = expected;

    let mut digest = [0u8; 32];
    reader.read_exact(&mut digest)
        .context("[io::cache] Failed to read key")?;

    let width = n.saturating_sub(1);
    let mut rows = Vec::with_capacity(n);
    let mut dists = Vec::with_capacity(n);
    for _ in 0..n {
        let mut row = vec![0u32; width];
        for x in &mut row {
            let mut b4 = [0u8; 4];
            reader.read_exact(&mut b4)
                .context("[io::cache] Failed to read neighbor ids")?;
            *x = u32::from_le_bytes(b4);
        }
        let mut dist = vec![0f64; width];
        for x in &mut dist {
            reader.read_exact(&mut b8)
                .context("[io::cache] Failed to read distances")?;
            *x = f64::from_le_bytes(b8);
        }
        rows.push(row);
        dists.push(dist);
    }

    Ok((digest, rows, dists))
}
