//! Byte encodings for graph documents
//!
//! Binary layout: 4-byte magic `WPGR`, little-endian u16 format version, then
//! the bincode payload (fixed-width integers, no trailing bytes). The JSON
//! encoding wraps the same document in an envelope naming the format and
//! version.

use bincode::Options;
use serde::{Deserialize, Serialize};

use crate::core::error::CodecError;
use crate::graph::GraphStore;
use crate::storage::document::GraphDocument;
use crate::storage::GraphCodec;

/// Leading bytes of every binary graph document
pub const MAGIC: [u8; 4] = *b"WPGR";

/// Current format version for both encodings
pub const FORMAT_VERSION: u16 = 1;

/// Format name written into JSON envelopes
pub const JSON_FORMAT_NAME: &str = "waypoint-graph";

const HEADER_LEN: usize = MAGIC.len() + std::mem::size_of::<u16>();

/// Magic-tagged bincode encoding
#[derive(Debug, Clone, Copy)]
pub struct BinaryCodec {
    max_bytes: u64,
}

/// Pretty-printed JSON encoding
#[derive(Debug, Clone, Copy)]
pub struct JsonCodec {
    max_bytes: u64,
}

#[derive(Serialize, Deserialize)]
struct JsonEnvelope {
    format: String,
    version: u16,
    #[serde(flatten)]
    document: GraphDocument,
}

impl BinaryCodec {
    /// Codec that refuses documents larger than `max_bytes`
    pub fn new(max_bytes: u64) -> Self {
        Self { max_bytes }
    }

    fn options(&self) -> impl Options {
        bincode::DefaultOptions::new()
            .with_fixint_encoding()
            .with_little_endian()
            .reject_trailing_bytes()
            .with_limit(self.max_bytes)
    }
}

impl GraphCodec for BinaryCodec {
    fn encode(&self, graph: &GraphStore) -> Result<Vec<u8>, CodecError> {
        let payload = self.options().serialize(&GraphDocument::from_graph(graph))?;
        let mut bytes = Vec::with_capacity(HEADER_LEN + payload.len());
        bytes.extend_from_slice(&MAGIC);
        bytes.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
        bytes.extend_from_slice(&payload);
        Ok(bytes)
    }

    fn decode(&self, bytes: &[u8]) -> Result<GraphStore, CodecError> {
        if bytes.len() < HEADER_LEN {
            return Err(CodecError::corrupt(format!(
                "truncated header: {} bytes",
                bytes.len()
            )));
        }
        if bytes.len() as u64 > self.max_bytes {
            return Err(CodecError::corrupt(format!(
                "document of {} bytes exceeds limit of {}",
                bytes.len(),
                self.max_bytes
            )));
        }
        let (magic, rest) = bytes.split_at(MAGIC.len());
        if magic != MAGIC {
            return Err(CodecError::corrupt("bad magic"));
        }
        let (version, payload) = rest.split_at(2);
        let version = u16::from_le_bytes([version[0], version[1]]);
        if version != FORMAT_VERSION {
            return Err(CodecError::corrupt(format!("unsupported version {}", version)));
        }

        let document: GraphDocument = self
            .options()
            .deserialize(payload)
            .map_err(|e| CodecError::corrupt(format!("malformed payload: {}", e)))?;
        document.into_graph()
    }
}

impl JsonCodec {
    /// Codec that refuses documents larger than `max_bytes`
    pub fn new(max_bytes: u64) -> Self {
        Self { max_bytes }
    }
}

impl GraphCodec for JsonCodec {
    fn encode(&self, graph: &GraphStore) -> Result<Vec<u8>, CodecError> {
        let envelope = JsonEnvelope {
            format: JSON_FORMAT_NAME.to_string(),
            version: FORMAT_VERSION,
            document: GraphDocument::from_graph(graph),
        };
        Ok(serde_json::to_vec_pretty(&envelope)?)
    }

    fn decode(&self, bytes: &[u8]) -> Result<GraphStore, CodecError> {
        if bytes.len() as u64 > self.max_bytes {
            return Err(CodecError::corrupt(format!(
                "document of {} bytes exceeds limit of {}",
                bytes.len(),
                self.max_bytes
            )));
        }
        let envelope: JsonEnvelope = serde_json::from_slice(bytes)
            .map_err(|e| CodecError::corrupt(format!("malformed JSON: {}", e)))?;
        if envelope.format != JSON_FORMAT_NAME {
            return Err(CodecError::corrupt(format!("unknown format {:?}", envelope.format)));
        }
        if envelope.version != FORMAT_VERSION {
            return Err(CodecError::corrupt(format!(
                "unsupported version {}",
                envelope.version
            )));
        }
        envelope.document.into_graph()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{NodeId, Point};
    use proptest::prelude::*;

    const LIMIT: u64 = 1 << 20;

    fn sample() -> GraphStore {
        let mut g = GraphStore::new();
        let a = g.add_node(Point::new(0.0, 0.0)).unwrap();
        let b = g.add_labeled_node(Point::new(10.0, 0.0), "Library").unwrap();
        let c = g.add_node(Point::new(10.5, 10.25)).unwrap();
        g.add_edge(a, b).unwrap();
        g.add_edge(b, c).unwrap();
        let scratch = g.add_node(Point::new(1.0, 1.0)).unwrap();
        g.remove_node(scratch).unwrap();
        g
    }

    fn assert_same(a: &GraphStore, b: &GraphStore) {
        assert_eq!(a.nodes().collect::<Vec<_>>(), b.nodes().collect::<Vec<_>>());
        assert_eq!(a.edges().collect::<Vec<_>>(), b.edges().collect::<Vec<_>>());
        assert_eq!(a.next_seq(), b.next_seq());
    }

    #[test]
    fn binary_round_trip() {
        let codec = BinaryCodec::new(LIMIT);
        let g = sample();
        let bytes = codec.encode(&g).unwrap();
        assert_eq!(&bytes[..4], b"WPGR");
        assert_same(&g, &codec.decode(&bytes).unwrap());
    }

    #[test]
    fn json_round_trip() {
        let codec = JsonCodec::new(LIMIT);
        let g = sample();
        let bytes = codec.encode(&g).unwrap();
        let text = String::from_utf8(bytes.clone()).unwrap();
        assert!(text.contains("\"format\": \"waypoint-graph\""));
        assert!(text.contains("\"Node_2\""));
        assert_same(&g, &codec.decode(&bytes).unwrap());
    }

    #[test]
    fn binary_rejects_truncation_everywhere() {
        let codec = BinaryCodec::new(LIMIT);
        let bytes = codec.encode(&sample()).unwrap();
        for len in 0..bytes.len() {
            let err = codec.decode(&bytes[..len]).unwrap_err();
            assert!(matches!(err, CodecError::CorruptData(_)), "len {len}: {err}");
        }
    }

    #[test]
    fn binary_rejects_bad_header_and_trailing_bytes() {
        let codec = BinaryCodec::new(LIMIT);
        let good = codec.encode(&sample()).unwrap();

        let mut bad_magic = good.clone();
        bad_magic[0] = b'X';
        assert!(matches!(codec.decode(&bad_magic), Err(CodecError::CorruptData(_))));

        let mut bad_version = good.clone();
        bad_version[4] = 0xFF;
        assert!(matches!(codec.decode(&bad_version), Err(CodecError::CorruptData(_))));

        let mut trailing = good;
        trailing.push(0);
        assert!(matches!(codec.decode(&trailing), Err(CodecError::CorruptData(_))));
    }

    #[test]
    fn size_limit_enforced() {
        let bytes = BinaryCodec::new(LIMIT).encode(&sample()).unwrap();
        let small = BinaryCodec::new(16);
        assert!(matches!(small.decode(&bytes), Err(CodecError::CorruptData(_))));
    }

    #[test]
    fn json_rejects_foreign_documents() {
        let codec = JsonCodec::new(LIMIT);
        assert!(matches!(codec.decode(b"{}"), Err(CodecError::CorruptData(_))));
        assert!(matches!(
            codec.decode(br#"{"format":"other","version":1,"next_seq":1,"records":[]}"#),
            Err(CodecError::CorruptData(_))
        ));
        let dangling = format!(
            r#"{{"format":"waypoint-graph","version":1,"next_seq":2,"records":[
                {{"Node":{{"id":"Node_1","x":0.0,"y":0.0,"label":null}}}},
                {{"Edge":{{"a":"Node_1","b":"{}","weight":1.0}}}}]}}"#,
            NodeId::from_seq(7)
        );
        assert!(matches!(codec.decode(dangling.as_bytes()), Err(CodecError::CorruptData(_))));
    }

    #[test]
    fn counter_at_its_limit_survives_round_trip() {
        let mut g = GraphDocument {
            next_seq: u64::MAX - 1,
            records: Vec::new(),
        }
        .into_graph()
        .unwrap();
        let last = g.add_node(Point::new(2.0, 3.0)).unwrap();
        assert_eq!(g.next_seq(), u64::MAX);

        for codec in [&BinaryCodec::new(LIMIT) as &dyn GraphCodec, &JsonCodec::new(LIMIT)] {
            let mut back = codec.decode(&codec.encode(&g).unwrap()).unwrap();
            assert_same(&g, &back);
            assert!(back.contains(last));
            assert!(back.add_node(Point::default()).is_err());
        }
    }

    #[derive(Debug, Clone)]
    enum Edit {
        Add(i8, i8, Option<String>),
        Link(usize, usize),
        Remove(usize),
    }

    fn edit() -> impl Strategy<Value = Edit> {
        prop_oneof![
            4 => (-4i8..4, -4i8..4, proptest::option::of("[A-Za-z ]{1,8}"))
                .prop_map(|(x, y, label)| Edit::Add(x, y, label)),
            3 => (0usize..32, 0usize..32).prop_map(|(a, b)| Edit::Link(a, b)),
            1 => (0usize..32).prop_map(Edit::Remove),
        ]
    }

    /// Replay edits; small integer grids make coincident points common
    fn build(edits: &[Edit]) -> GraphStore {
        let mut g = GraphStore::new();
        let mut ids: Vec<NodeId> = Vec::new();
        for e in edits {
            match e {
                Edit::Add(x, y, label) => {
                    let at = Point::new(f64::from(*x) * 0.75, f64::from(*y) / 3.0);
                    let id = match label {
                        Some(label) => g.add_labeled_node(at, label.as_str()).unwrap(),
                        None => g.add_node(at).unwrap(),
                    };
                    ids.push(id);
                }
                Edit::Link(a, b) if !ids.is_empty() => {
                    let _ = g.add_edge(ids[a % ids.len()], ids[b % ids.len()]);
                }
                Edit::Remove(i) if !ids.is_empty() => {
                    let _ = g.remove_node(ids[i % ids.len()]);
                }
                _ => {}
            }
        }
        g
    }

    proptest! {
        #[test]
        fn any_graph_round_trips(edits in proptest::collection::vec(edit(), 0..40)) {
            let g = build(&edits);
            for codec in [&BinaryCodec::new(LIMIT) as &dyn GraphCodec, &JsonCodec::new(LIMIT)] {
                let back = codec.decode(&codec.encode(&g).unwrap()).unwrap();
                prop_assert_eq!(g.nodes().collect::<Vec<_>>(), back.nodes().collect::<Vec<_>>());
                prop_assert_eq!(g.edges().collect::<Vec<_>>(), back.edges().collect::<Vec<_>>());
                prop_assert_eq!(g.next_seq(), back.next_seq());
            }
        }
    }
}
