//! Storage and persistence layer
//!
//! Graphs are snapshotted into a [`GraphDocument`] and encoded by a
//! [`GraphCodec`]. Loading never touches a live graph: a document is fully
//! decoded and validated into a fresh [`GraphStore`] which the caller swaps in
//! only on success.

pub mod codec;
pub mod document;
pub mod geojson;

use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::core::config::GraphFormat;
use crate::core::error::{CodecError, Result};
use crate::graph::GraphStore;

pub use codec::{BinaryCodec, JsonCodec, FORMAT_VERSION, MAGIC};
pub use document::{GraphDocument, Record};
pub use geojson::{import_geojson, import_geojson_slice};

/// Byte encoding of a whole graph
///
/// Implementations must be lossless for node ids, positions, labels, edges and
/// the id counter, and must reject any input they cannot fully validate with
/// [`CodecError::CorruptData`].
pub trait GraphCodec {
    /// Encode a snapshot of the graph
    fn encode(&self, graph: &GraphStore) -> std::result::Result<Vec<u8>, CodecError>;

    /// Decode into a fresh graph
    fn decode(&self, bytes: &[u8]) -> std::result::Result<GraphStore, CodecError>;
}

/// Codec for a configured format
pub fn codec_for(format: GraphFormat, max_bytes: u64) -> Box<dyn GraphCodec> {
    match format {
        GraphFormat::Binary => Box::new(BinaryCodec::new(max_bytes)),
        GraphFormat::Json => Box::new(JsonCodec::new(max_bytes)),
    }
}

/// Format of an encoded document, judged by its leading bytes
pub fn detect_format(bytes: &[u8]) -> GraphFormat {
    if bytes.starts_with(&MAGIC) {
        GraphFormat::Binary
    } else {
        GraphFormat::Json
    }
}

/// Decode a document in either format
pub fn decode_any(bytes: &[u8], max_bytes: u64) -> std::result::Result<GraphStore, CodecError> {
    codec_for(detect_format(bytes), max_bytes).decode(bytes)
}

/// Encode a graph into a writer
pub fn save_to_writer<W: Write>(graph: &GraphStore, mut writer: W, format: GraphFormat) -> Result<()> {
    let bytes = codec_for(format, u64::MAX).encode(graph)?;
    writer.write_all(&bytes)?;
    writer.flush()?;
    debug!(bytes = bytes.len(), ?format, "graph encoded");
    Ok(())
}

/// Decode a graph from a reader, reading at most `max_bytes` plus one
pub fn load_from_reader<R: Read>(reader: R, max_bytes: u64) -> Result<GraphStore> {
    let mut bytes = Vec::new();
    reader.take(max_bytes.saturating_add(1)).read_to_end(&mut bytes)?;
    Ok(decode_any(&bytes, max_bytes)?)
}

/// Write a graph file, replacing any existing file only once the new one is
/// complete
pub fn save_file(graph: &GraphStore, path: impl AsRef<Path>, format: GraphFormat) -> Result<()> {
    let path = path.as_ref();
    let tmp = temp_sibling(path);
    {
        let file = fs::File::create(&tmp)?;
        let mut writer = std::io::BufWriter::new(file);
        save_to_writer(graph, &mut writer, format)?;
        writer.into_inner().map_err(|e| e.into_error())?.sync_all()?;
    }
    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(e.into());
    }
    info!(path = %path.display(), nodes = graph.len(), edges = graph.edge_count(), "graph saved");
    Ok(())
}

/// Read a graph file in either format
pub fn load_file(path: impl AsRef<Path>, max_bytes: u64) -> Result<GraphStore> {
    let path = path.as_ref();
    let graph = load_from_reader(fs::File::open(path)?, max_bytes)?;
    info!(path = %path.display(), nodes = graph.len(), edges = graph.edge_count(), "graph loaded");
    Ok(graph)
}

fn temp_sibling(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::Error;
    use crate::core::types::Point;

    fn sample() -> GraphStore {
        let mut g = GraphStore::new();
        let a = g.add_labeled_node(Point::new(0.0, 0.0), "Gate").unwrap();
        let b = g.add_node(Point::new(3.0, 4.0)).unwrap();
        g.add_edge(a, b).unwrap();
        g
    }

    #[test]
    fn detects_both_formats() {
        let g = sample();
        for format in [GraphFormat::Binary, GraphFormat::Json] {
            let bytes = codec_for(format, 1 << 20).encode(&g).unwrap();
            assert_eq!(detect_format(&bytes), format);
            let back = decode_any(&bytes, 1 << 20).unwrap();
            assert_eq!(back.resolve("Gate"), g.resolve("Gate"));
            assert_eq!(back.edge_count(), 1);
        }
    }

    #[test]
    fn file_round_trip_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("campus.wpg");
        save_file(&sample(), &path, GraphFormat::Binary).unwrap();
        assert!(!temp_sibling(&path).exists());

        let loaded = load_file(&path, 1 << 20).unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded.next_seq(), 3);
    }

    #[test]
    fn oversized_stream_is_corrupt() {
        let mut bytes = Vec::new();
        save_to_writer(&sample(), &mut bytes, GraphFormat::Json).unwrap();
        let err = load_from_reader(bytes.as_slice(), 8).unwrap_err();
        assert!(err.is_corrupt_data(), "{err}");
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_file(dir.path().join("absent.wpg"), 1 << 20).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
