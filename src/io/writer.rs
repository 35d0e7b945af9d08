//! GraphDef writer
//!
//! Save GraphDefs and indexes to files or bytes.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use prost::Message;

use crate::error::RewriteResult;
use crate::graph::GraphIndex;
use crate::proto::{GraphDef, NodeDef};

/// Save a GraphDef to a file
///
/// # Example
///
/// ```ignore
/// use graphdef_rewriter::io::save_graph_def;
///
/// save_graph_def(&graph, "rewritten.pb")?;
/// ```
pub fn save_graph_def<P: AsRef<Path>>(graph: &GraphDef, path: P) -> RewriteResult<()> {
    let path = path.as_ref();

    let file = File::create(path).inspect_err(|e| {
        tracing::debug!(path = %path.display(), error = %e, "failed to create graph file");
    })?;

    let mut writer = BufWriter::new(file);
    let bytes = graph.encode_to_vec();
    writer.write_all(&bytes)?;
    writer.flush()?;

    tracing::debug!(path = %path.display(), bytes = bytes.len(), "saved graph");
    Ok(())
}

/// Encode a GraphDef to bytes
pub fn graph_def_to_bytes(graph: &GraphDef) -> Vec<u8> {
    graph.encode_to_vec()
}

/// Save a bare node list as a GraphDef file
pub fn store_graph<P: AsRef<Path>>(nodes: Vec<NodeDef>, path: P) -> RewriteResult<()> {
    save_graph_def(&GraphDef::from_nodes(nodes), path)
}

/// Dump an index and save it as a GraphDef file
///
/// Only the node list is written. To keep the library and versions of a
/// loaded graph, replace its `node` field and use [`save_graph_def`].
pub fn store_index<P: AsRef<Path>>(index: &GraphIndex, path: P) -> RewriteResult<()> {
    save_graph_def(&index.to_graph_def(), path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::make_node;
    use crate::io::reader::{load_graph, load_graph_def};

    fn create_test_graph() -> GraphDef {
        GraphDef::from_nodes(vec![
            make_node("Placeholder", "x", &[]),
            make_node("Relu", "relu", &["x"]),
        ])
    }

    #[test]
    fn test_graph_def_to_bytes() {
        let graph = create_test_graph();
        let bytes = graph_def_to_bytes(&graph);

        assert!(!bytes.is_empty());
        assert_eq!(bytes.len(), graph.encoded_len());

        let decoded = GraphDef::decode(bytes.as_slice()).unwrap();
        assert_eq!(decoded, graph);
    }

    #[test]
    fn test_load_store_keeps_opaque_fields() {
        use crate::builder::VALUE_ATTR;
        use crate::io::reader::load_graph_def_from_bytes;
        use crate::proto::{AttrValue, DataType, TensorProto, TensorShapeProto};

        let mut half = make_node("Const", "half", &[]);
        half.attr.insert(
            VALUE_ATTR.to_string(),
            AttrValue::tensor(TensorProto {
                dtype: DataType::Half as i32,
                tensor_shape: Some(TensorShapeProto::from_dims(&[2])),
                half_val: vec![15360, 16384],
                ..Default::default()
            }),
        );
        let mut wide = make_node("Const", "wide", &[]);
        wide.attr.insert(
            VALUE_ATTR.to_string(),
            AttrValue::tensor(TensorProto {
                scomplex_val: vec![1.0, -1.0],
                dcomplex_val: vec![2.0, -2.0],
                uint32_val: vec![u32::MAX],
                uint64_val: vec![u64::MAX],
                resource_handle_val: vec![vec![0x0a, 0x01, b'r']],
                variant_val: vec![vec![0x0a, 0x01, b'v']],
                float8_val: vec![0x38],
                ..Default::default()
            }),
        );
        let mut relu = make_node("Relu", "relu", &["half"]);
        relu.experimental_debug_info = vec![0x0a, 0x03, b'a', b'b', b'c'];
        relu.experimental_type = vec![0x08, 0x01];

        let mut graph = GraphDef::from_nodes(vec![half, wide, relu]);
        graph.library = vec![0x0a, 0x00];
        graph.version = 3;
        graph.debug_info = vec![0x12, 0x00];

        let bytes = graph.encode_to_vec();
        let loaded = load_graph_def_from_bytes(&bytes).unwrap();
        let stored = graph_def_to_bytes(&loaded);

        assert_eq!(stored, bytes);
        assert_eq!(GraphDef::decode(stored.as_slice()).unwrap(), graph);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("graph.pb");

        save_graph_def(&create_test_graph(), &path).unwrap();

        let loaded = load_graph_def(&path).unwrap();
        assert_eq!(loaded.node.len(), 2);
        assert_eq!(loaded.node[1].op, "Relu");
    }

    #[test]
    fn test_store_graph() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nodes.pb");

        store_graph(create_test_graph().node, &path).unwrap();
        let nodes = load_graph(&path).unwrap();
        assert_eq!(nodes[0].name, "x");
    }

    #[test]
    fn test_save_into_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let result = save_graph_def(&create_test_graph(), dir.path().join("no/such/graph.pb"));
        assert!(result.is_err());
    }
}
