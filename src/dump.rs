use std::error::Error;

use duckdb::vtab::arrow::WritableVector;
use duckdb::{
    Result,
    core::{DataChunkHandle, LogicalTypeHandle, LogicalTypeId},
    vscalar::{ScalarFunctionSignature, VScalar},
};

use crate::duckdb_impl::scalar::{VarcharOutput, invoke_unary_varchar_to_varchar};
use crate::tree::{GameNode, TreeCollection, TreeId, parse_to_collection};

enum Frame {
    Open(TreeId, usize),
    Close(usize),
}

fn push_indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str("  ");
    }
}

fn push_node(out: &mut String, node: &GameNode<'_>) {
    out.push(';');
    for prop in node {
        out.push_str(prop.id);
        for value in &prop.values {
            out.push('[');
            out.push_str(value);
            out.push(']');
        }
    }
    out.push('\n');
}

/// Renders every tree with one node per line, children indented under their
/// parent. The output is itself valid SGF.
pub fn render_collection(trees: &TreeCollection<'_>) -> String {
    let mut out = String::new();
    let mut frames: Vec<Frame> = trees
        .roots()
        .iter()
        .rev()
        .map(|&root| Frame::Open(root, 0))
        .collect();

    while let Some(frame) = frames.pop() {
        match frame {
            Frame::Open(id, depth) => {
                let tree = trees.tree(id);
                push_indent(&mut out, depth);
                out.push_str("(\n");
                for node in &tree.sequence {
                    push_indent(&mut out, depth + 1);
                    push_node(&mut out, node);
                }
                frames.push(Frame::Close(depth));
                frames.extend(
                    tree.children
                        .iter()
                        .rev()
                        .map(|&child| Frame::Open(child, depth + 1)),
                );
            }
            Frame::Close(depth) => {
                push_indent(&mut out, depth);
                out.push_str(")\n");
            }
        }
    }
    out
}

pub struct SgfTreeScalar;

impl VScalar for SgfTreeScalar {
    type State = ();

    unsafe fn invoke(
        _state: &Self::State,
        input: &mut DataChunkHandle,
        output: &mut dyn WritableVector,
    ) -> Result<(), Box<dyn Error>> {
        invoke_unary_varchar_to_varchar(input, output, |sgf| {
            Ok(match parse_to_collection(sgf) {
                Ok(trees) => VarcharOutput::Value(render_collection(&trees)),
                Err(_) => VarcharOutput::Null,
            })
        })
    }

    fn signatures() -> Vec<ScalarFunctionSignature> {
        vec![ScalarFunctionSignature::exact(
            vec![LogicalTypeHandle::from(LogicalTypeId::Varchar)],
            LogicalTypeHandle::from(LogicalTypeId::Varchar),
        )]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_nested_collection() {
        let trees = parse_to_collection("(;SZ[9]AB[aa][bb];B[cc](;W[dd])(;W[ee]))(;C[x])").unwrap();

        assert_eq!(
            render_collection(&trees),
            "(\n  ;SZ[9]AB[aa][bb]\n  ;B[cc]\n  (\n    ;W[dd]\n  )\n  (\n    ;W[ee]\n  )\n)\n(\n  ;C[x]\n)\n"
        );
    }

    #[test]
    fn test_render_output_parses_back_to_same_shape() {
        let input = r"(;C[a \] b];B[aa](;W[bb];B[cc])(;W[dd]))";
        let trees = parse_to_collection(input).unwrap();
        let rendered = render_collection(&trees);
        let reparsed = parse_to_collection(&rendered).unwrap();

        assert_eq!(render_collection(&reparsed), rendered);
        let root = reparsed.tree(reparsed.roots()[0]);
        assert_eq!(root.sequence[0][0].values.as_slice(), [r"a \] b"]);
        assert_eq!(root.children.len(), 2);
    }

    #[test]
    fn test_render_deep_nesting_on_a_small_stack() {
        let depth = 2_000;
        let input = format!("{}{}", "(;B[aa]".repeat(depth), ")".repeat(depth));
        let trees = parse_to_collection(&input).unwrap();

        let rendered = std::thread::scope(|scope| {
            std::thread::Builder::new()
                .stack_size(64 * 1024)
                .spawn_scoped(scope, || render_collection(&trees))
                .unwrap()
                .join()
                .unwrap()
        });

        assert_eq!(rendered.matches('(').count(), depth);
        assert_eq!(rendered.matches(')').count(), depth);
        assert!(rendered.ends_with(")\n"));
    }
}
