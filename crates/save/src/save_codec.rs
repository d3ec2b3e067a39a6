// ---------------------------------------------------------------------------
// Record codec: SaveRecord <-> slot file bytes
// ---------------------------------------------------------------------------
//
//   encode: SaveRecord -> bitcode -> [lz4] -> header + payload
//   decode: header check -> [lz4] -> bitcode -> migrate
//
// Both directions are pure and `Send`, so the plugin runs them inside
// IoTaskPool tasks alongside the file I/O.

use std::io::ErrorKind;
use std::path::Path;

use bevy::prelude::*;

use crate::atomic_write::atomic_write;
use crate::file_header::{unwrap_header, wrap_with_header, FLAG_COMPRESSED};
use crate::save_error::SaveError;
use crate::save_migrate::migrate_save_with_report;
use crate::save_types::SaveRecord;

/// Encode a record into the full on-disk byte layout.
pub fn encode_record(record: &SaveRecord, compress: bool) -> Result<Vec<u8>, SaveError> {
    let encoded = record.encode();
    if u32::try_from(encoded.len()).is_err() {
        return Err(SaveError::Encode(format!(
            "record is {} bytes, larger than the header can describe",
            encoded.len()
        )));
    }

    if compress {
        let compressed = lz4_flex::compress_prepend_size(&encoded);
        Ok(wrap_with_header(&compressed, FLAG_COMPRESSED, encoded.len()))
    } else {
        Ok(wrap_with_header(&encoded, 0, encoded.len()))
    }
}

/// Validate, decompress, decode and migrate a slot file's bytes.
pub fn decode_record(bytes: &[u8]) -> Result<SaveRecord, SaveError> {
    let (header, payload) = unwrap_header(bytes)?;
    debug!(
        "Save file header: format v{}, flags {:#X}, timestamp {}, data size {}, checksum {:#010X}",
        header.format_version,
        header.flags,
        header.timestamp,
        header.uncompressed_size,
        header.checksum,
    );

    let decompressed;
    let raw = if header.is_compressed() {
        decompressed = lz4_flex::decompress_size_prepended(payload)
            .map_err(|e| SaveError::Corrupt(format!("lz4 decompression failed: {e}")))?;
        decompressed.as_slice()
    } else {
        payload
    };

    if raw.len() != header.uncompressed_size as usize {
        return Err(SaveError::Corrupt(format!(
            "record size mismatch (header says {}, found {})",
            header.uncompressed_size,
            raw.len()
        )));
    }

    let mut record = SaveRecord::decode(raw)?;
    migrate_save_with_report(&mut record)?;
    Ok(record)
}

/// Read and decode a slot file. A missing file is `Ok(None)`, not an error.
pub fn read_record_file(path: &Path) -> Result<Option<SaveRecord>, SaveError> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    decode_record(&bytes).map(Some)
}

/// Atomically write already-encoded bytes. Returns the number of bytes
/// written.
pub fn write_record_file(path: &Path, bytes: &[u8]) -> Result<usize, SaveError> {
    atomic_write(path, bytes)?;
    Ok(bytes.len())
}
