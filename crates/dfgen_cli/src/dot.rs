//! Graphviz rendering of generated DFGs.

use crate::output::NodeLabels;
use dfgen_engine::Dfg;
use std::fmt::Write as _;
use std::path::Path;
use std::process::Command;

/// Renders `dfg` as a strict DOT digraph.
///
/// Nodes on the same longest-path level share a `rank=same` group so the
/// drawing reads top to bottom in dependency order.
pub fn render(name: &str, labels: &NodeLabels, dfg: &Dfg) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "strict digraph \"{name}\" {{");
    out.push_str("    rankdir=TB;\n");

    for (_, label) in labels.iter() {
        let _ = writeln!(out, "    {label} [opcode={}];", labels.opcode());
    }
    for (from, to) in dfg.edges() {
        if let (Some(a), Some(b)) = (labels.name(from), labels.name(to)) {
            let _ = writeln!(out, "    {a} -> {b};");
        }
    }
    for level in dfg.levels().unwrap_or_default() {
        let names: Vec<String> = level.iter().filter_map(|&n| labels.name(n)).collect();
        if names.len() > 1 {
            let _ = writeln!(out, "    {{ rank=same; {}; }}", names.join("; "));
        }
    }

    out.push_str("}\n");
    out
}

/// Renders `dot_path` to `png_path` with the external `dot` tool.
///
/// # Errors
///
/// Fails if `dot` cannot be spawned or exits unsuccessfully.
pub fn render_png(dot_path: &Path, png_path: &Path) -> std::io::Result<()> {
    let status = Command::new("dot")
        .arg("-Tpng")
        .arg(dot_path)
        .arg("-o")
        .arg(png_path)
        .status()?;
    if status.success() {
        Ok(())
    } else {
        Err(std::io::Error::other(format!("dot exited with {status}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dfgen_engine::GeneratedGraph;
    use dfgen_fabric::{FabricNode, Technology};

    fn diamond() -> GeneratedGraph {
        let a = FabricNode::qca(0, 0);
        let b = FabricNode::qca(0, 1);
        let c = FabricNode::qca(1, 0);
        let d = FabricNode::qca(1, 1);
        let mut dfg = Dfg::new();
        dfg.add_path(&[a, b, d]);
        dfg.add_path(&[a, c, d]);
        GeneratedGraph {
            dfg,
            arch_size: (2, 2),
            ii: None,
            difficulty: 2,
            recipe: None,
            fallback: false,
            index: 1,
        }
    }

    #[test]
    fn renders_strict_digraph_with_ranks() {
        let graph = diamond();
        let labels = NodeLabels::new(Technology::Qca, &graph);
        let text = render("g", &labels, &graph.dfg);

        assert!(text.starts_with("strict digraph \"g\" {"));
        assert!(text.contains("rankdir=TB;"));
        assert!(text.contains("op_0 [opcode=op];"));
        assert!(text.contains("op_0 -> op_1;"));
        assert!(text.contains("op_1 -> op_2;"));
        assert!(text.contains("op_0 -> op_3;"));
        assert!(text.contains("op_3 -> op_2;"));
        assert_eq!(text.matches("rank=same").count(), 1);
        assert!(text.trim_end().ends_with('}'));
    }

    #[test]
    fn missing_dot_file_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let result = render_png(&tmp.path().join("absent.dot"), &tmp.path().join("x.png"));
        assert!(result.is_err());
    }
}
