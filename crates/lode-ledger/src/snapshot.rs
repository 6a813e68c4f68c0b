//! Versioned snapshot persistence for the chain indices.
//!
//! Layout, in exact order: `version: u8`, `tip_hash: 32 bytes`, then the
//! block index, transaction map, spent-image set, output index, and
//! multisig output index as bincode sections. A snapshot is installed only
//! when the version matches this build and the tagged tip equals the tip
//! the caller expects; anything else is reported as stale and the caller
//! rebuilds by replaying block history. Indices without block-for-block
//! provenance cannot be safely reconciled, so partial loads never happen.
//!
//! Save and load borrow the index structures for their duration; nothing
//! here keeps a reference into the store.

use crate::error::{SnapshotError, StaleReason};
use crate::state::ChainIndices;
use lode_core::Hash256;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use tracing::{debug, info, warn};

/// Current archive version. Bump on any layout change; older files are
/// ignored and rebuilt, never migrated in place.
pub const SNAPSHOT_VERSION: u8 = 1;

/// A fully decoded snapshot, ready to install.
pub struct SnapshotData {
    /// Tip the snapshot was taken at.
    pub tip_hash: Hash256,
    pub(crate) indices: ChainIndices,
}

/// Write the indices to `path` via a temporary sibling file and an atomic
/// rename, so a failed save never corrupts the previous snapshot.
pub(crate) fn save(
    path: &Path,
    tip_hash: Hash256,
    indices: &ChainIndices,
) -> Result<(), SnapshotError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let tmp = path.with_extension("tmp");
    let file = File::create(&tmp)?;
    let mut writer = BufWriter::new(file);

    writer.write_all(&[SNAPSHOT_VERSION])?;
    writer.write_all(tip_hash.as_bytes())?;
    debug!("saving block index");
    encode(&mut writer, &indices.blocks)?;
    debug!("saving transaction map");
    encode(&mut writer, &indices.transactions)?;
    debug!("saving spent key images");
    encode(&mut writer, &indices.spent_images)?;
    debug!("saving outputs");
    encode(&mut writer, &indices.outputs)?;
    debug!("saving multi-signature outputs");
    encode(&mut writer, &indices.multisig_outputs)?;

    writer.flush()?;
    writer.get_ref().sync_all()?;
    drop(writer);
    fs::rename(&tmp, path)?;
    info!(path = %path.display(), %tip_hash, "snapshot saved");
    Ok(())
}

/// Read a snapshot from `path`, accepting it only when the version matches
/// and the tagged tip equals `expected_tip`. Decode failures in the index
/// body degrade to [`StaleReason::Corrupt`] rather than a hard error.
pub(crate) fn load(path: &Path, expected_tip: Hash256) -> Result<SnapshotData, SnapshotError> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);

    let mut version = [0u8; 1];
    reader.read_exact(&mut version)?;
    if version[0] != SNAPSHOT_VERSION {
        warn!(found = version[0], expected = SNAPSHOT_VERSION, "snapshot version mismatch, rebuilding");
        return Err(SnapshotError::Stale(StaleReason::Version(version[0])));
    }

    let mut tip = [0u8; 32];
    reader.read_exact(&mut tip)?;
    let tip_hash = Hash256(tip);
    if tip_hash != expected_tip {
        warn!(%tip_hash, %expected_tip, "snapshot tip mismatch, rebuilding");
        return Err(SnapshotError::Stale(StaleReason::TipMismatch));
    }

    debug!("loading block index");
    let blocks = decode(&mut reader)?;
    debug!("loading transaction map");
    let transactions = decode(&mut reader)?;
    debug!("loading spent key images");
    let spent_images = decode(&mut reader)?;
    debug!("loading outputs");
    let outputs = decode(&mut reader)?;
    debug!("loading multi-signature outputs");
    let multisig_outputs = decode(&mut reader)?;

    info!(path = %path.display(), %tip_hash, "snapshot loaded");
    Ok(SnapshotData {
        tip_hash,
        indices: ChainIndices {
            blocks,
            transactions,
            spent_images,
            outputs,
            multisig_outputs,
        },
    })
}

fn encode<W: Write, T: serde::Serialize>(writer: W, value: &T) -> Result<(), SnapshotError> {
    bincode::serialize_into(writer, value)
        .map_err(|e| SnapshotError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
}

fn decode<R: Read, T: serde::de::DeserializeOwned>(reader: R) -> Result<T, SnapshotError> {
    // A truncated or garbled body means the snapshot cannot be trusted as a
    // whole; surface it as staleness so the caller replays instead.
    bincode::deserialize_from(reader).map_err(|_| SnapshotError::Stale(StaleReason::Corrupt))
}
