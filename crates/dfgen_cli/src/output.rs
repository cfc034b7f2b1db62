//! On-disk layout and JSON serialization of generated graphs.
//!
//! Every accepted graph is written as `<base>.json` plus `<base>.dot`, and
//! optionally `<base>.png`, under a directory that encodes the technology,
//! mode, II, interconnect or clocking scheme, architecture size and node
//! count.

use crate::dot;
use dfgen_engine::{GeneratedGraph, Recipe, TaskConfig, TaskReport, TechnologyParams};
use dfgen_fabric::{FabricNode, Technology};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Writes generated graphs below a root directory.
#[derive(Debug, Clone)]
pub struct OutputWriter {
    root: PathBuf,
    images: bool,
}

impl OutputWriter {
    /// Creates a writer rooted at `root`; `images` enables PNG rendering.
    pub fn new(root: impl Into<PathBuf>, images: bool) -> Self {
        Self {
            root: root.into(),
            images,
        }
    }

    /// The root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory that receives `graph`.
    pub fn graph_dir(&self, config: &TaskConfig, graph: &GeneratedGraph) -> PathBuf {
        let tec = config.technology.technology();
        let (rows, cols) = graph.arch_size;
        let mut dir = self
            .root
            .join(format!("mappings_{}_{}", tec.as_str(), config.mode));
        match config.technology {
            TechnologyParams::Cgra { interconnect, .. } => {
                let ii = graph.ii.unwrap_or_else(|| graph.ii_required());
                dir.push(format!("II_{ii}"));
                dir.push(interconnect.name());
            }
            TechnologyParams::Qca { scheme } => dir.push(scheme.to_string()),
        }
        dir.push(format!("{rows}x{cols}"));
        dir.push(format!("{}_nodes", graph.dfg.node_count()));
        dir
    }

    /// Writes every graph of a report and returns how many were written.
    ///
    /// Stops at the first I/O failure.
    pub fn write_report(&self, config: &TaskConfig, report: &TaskReport) -> std::io::Result<usize> {
        for graph in &report.graphs {
            self.write_graph(config, graph)?;
        }
        Ok(report.graphs.len())
    }

    /// Writes the JSON and DOT files of one graph, plus the PNG if enabled.
    ///
    /// Returns the path of the JSON file. A failed PNG render is logged and
    /// does not fail the write.
    pub fn write_graph(
        &self,
        config: &TaskConfig,
        graph: &GeneratedGraph,
    ) -> std::io::Result<PathBuf> {
        let dir = self.graph_dir(config, graph);
        std::fs::create_dir_all(&dir)?;

        let name = base_name(config, graph);
        let json_path = dir.join(format!("{name}.json"));
        let dot_path = dir.join(format!("{name}.dot"));

        let document = GraphDocument::new(&name, config, graph);
        let json = serde_json::to_string_pretty(&document).map_err(std::io::Error::other)?;
        std::fs::write(&json_path, json)?;

        let labels = NodeLabels::new(config.technology.technology(), graph);
        std::fs::write(&dot_path, dot::render(&name, &labels, &graph.dfg))?;

        if self.images {
            let png_path = dir.join(format!("{name}.png"));
            if let Err(e) = dot::render_png(&dot_path, &png_path) {
                warn!("could not render {}: {e}", png_path.display());
            }
        }
        debug!("wrote {}", json_path.display());
        Ok(json_path)
    }
}

/// File stem of a graph: `<tec>_map_diff<D>[fb]_<R>x<C>_N<n>_E<e>_<index>`.
///
/// `D` is the difficulty the task asked for; graphs produced by the fallback
/// carry the `fb` marker instead of a lower number.
pub fn base_name(config: &TaskConfig, graph: &GeneratedGraph) -> String {
    let (rows, cols) = graph.arch_size;
    format!(
        "{}_map_diff{}{}_{rows}x{cols}_N{}_E{}_{}",
        config.technology.technology().as_str(),
        config.difficulty,
        if graph.fallback { "fb" } else { "" },
        graph.dfg.node_count(),
        graph.dfg.edge_count(),
        graph.index,
    )
}

/// Stable operation names for the nodes of one graph.
///
/// Names are `<prefix>_<i>` in DFG insertion order, with prefix `add` on
/// CGRA and `op` on QCA.
#[derive(Debug, Clone)]
pub struct NodeLabels {
    prefix: &'static str,
    order: Vec<FabricNode>,
    index: HashMap<FabricNode, usize>,
}

impl NodeLabels {
    /// Labels every node of `graph`.
    pub fn new(technology: Technology, graph: &GeneratedGraph) -> Self {
        let prefix = match technology {
            Technology::Cgra => "add",
            Technology::Qca => "op",
        };
        let order: Vec<FabricNode> = graph.dfg.nodes().collect();
        let index = order.iter().enumerate().map(|(i, &n)| (n, i)).collect();
        Self {
            prefix,
            order,
            index,
        }
    }

    /// Opcode attribute shared by every node.
    pub fn opcode(&self) -> &'static str {
        self.prefix
    }

    /// Name of `node`, or `None` if it is not in the graph.
    pub fn name(&self, node: FabricNode) -> Option<String> {
        self.index
            .get(&node)
            .map(|i| format!("{}_{i}", self.prefix))
    }

    /// Nodes with their names, in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (FabricNode, String)> + '_ {
        self.order
            .iter()
            .enumerate()
            .map(|(i, &node)| (node, format!("{}_{i}", self.prefix)))
    }
}

#[derive(Serialize)]
struct GraphDocument<'a> {
    graph_name: &'a str,
    properties: Properties,
    architecture: Architecture,
    placement: BTreeMap<String, Vec<u32>>,
    edges: Vec<[String; 2]>,
}

#[derive(Serialize)]
struct Properties {
    node_count: usize,
    edge_count: usize,
    #[serde(rename = "II_required")]
    ii_required: u32,
    difficulty: u32,
    recipe: Option<Recipe>,
    fallback: bool,
    #[serde(rename = "II_used")]
    ii_used: Option<u32>,
}

#[derive(Serialize)]
struct Architecture {
    technology: &'static str,
    dimensions: [u32; 2],
    #[serde(skip_serializing_if = "Option::is_none")]
    interconnect_bits: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    clock_scheme: Option<String>,
}

impl<'a> GraphDocument<'a> {
    fn new(name: &'a str, config: &TaskConfig, graph: &GeneratedGraph) -> Self {
        let technology = config.technology.technology();
        let labels = NodeLabels::new(technology, graph);
        let (rows, cols) = graph.arch_size;
        let (interconnect_bits, clock_scheme) = match config.technology {
            TechnologyParams::Cgra { interconnect, .. } => (Some(interconnect.bits()), None),
            TechnologyParams::Qca { scheme } => (None, Some(scheme.to_string())),
        };

        let placement = labels
            .iter()
            .map(|(node, name)| (name, node.coords()))
            .collect();
        let edges = graph
            .dfg
            .edges()
            .filter_map(|(from, to)| Some([labels.name(from)?, labels.name(to)?]))
            .collect();

        Self {
            graph_name: name,
            properties: Properties {
                node_count: graph.dfg.node_count(),
                edge_count: graph.dfg.edge_count(),
                ii_required: graph.ii_required(),
                difficulty: graph.difficulty,
                recipe: graph.recipe,
                fallback: graph.fallback,
                ii_used: graph.ii,
            },
            architecture: Architecture {
                technology: technology.as_str(),
                dimensions: [rows, cols],
                interconnect_bits,
                clock_scheme,
            },
            placement,
            edges,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dfgen_engine::Dfg;
    use dfgen_fabric::{Interconnect, QcaScheme};

    fn cgra_config() -> TaskConfig {
        TaskConfig::new(
            TechnologyParams::Cgra {
                interconnect: Interconnect::MESH,
                ii: Some(1),
            },
            1,
            2,
        )
    }

    fn sample_graph(fallback: bool) -> GeneratedGraph {
        let mut dfg = Dfg::new();
        dfg.add_path(&[
            FabricNode::cgra(0, 0, 0),
            FabricNode::cgra(0, 1, 0),
            FabricNode::cgra(1, 1, 0),
        ]);
        dfg.add_edge(FabricNode::cgra(0, 0, 0), FabricNode::cgra(1, 0, 0));
        GeneratedGraph {
            dfg,
            arch_size: (4, 4),
            ii: Some(1),
            difficulty: if fallback { 1 } else { 2 },
            recipe: Some(Recipe::new(0, 1)),
            fallback,
            index: 3,
        }
    }

    #[test]
    fn base_name_encodes_requested_difficulty() {
        let config = cgra_config();
        assert_eq!(
            base_name(&config, &sample_graph(false)),
            "cgra_map_diff2_4x4_N4_E3_3"
        );
        assert_eq!(
            base_name(&config, &sample_graph(true)),
            "cgra_map_diff2fb_4x4_N4_E3_3"
        );
    }

    #[test]
    fn cgra_directory_layout() {
        let writer = OutputWriter::new("out", false);
        let dir = writer.graph_dir(&cgra_config(), &sample_graph(false));
        assert_eq!(
            dir,
            PathBuf::from("out/mappings_cgra_grammar/II_1/mesh/4x4/4_nodes")
        );
    }

    #[test]
    fn qca_directory_layout() {
        let config = TaskConfig::new(
            TechnologyParams::Qca {
                scheme: QcaScheme::TwoDDWave,
            },
            1,
            1,
        );
        let mut graph = sample_graph(false);
        graph.ii = None;
        let writer = OutputWriter::new("out", false);
        assert_eq!(
            writer.graph_dir(&config, &graph),
            PathBuf::from("out/mappings_qca_grammar/T/4x4/4_nodes")
        );
    }

    #[test]
    fn labels_follow_insertion_order() {
        let graph = sample_graph(false);
        let labels = NodeLabels::new(Technology::Cgra, &graph);
        assert_eq!(labels.name(FabricNode::cgra(0, 0, 0)).as_deref(), Some("add_0"));
        assert_eq!(labels.name(FabricNode::cgra(1, 0, 0)).as_deref(), Some("add_3"));
        assert_eq!(labels.name(FabricNode::cgra(3, 3, 0)), None);
        let qca = NodeLabels::new(Technology::Qca, &graph);
        assert_eq!(qca.opcode(), "op");
    }

    #[test]
    fn writes_json_and_dot() {
        let tmp = tempfile::tempdir().unwrap();
        let writer = OutputWriter::new(tmp.path(), false);
        let config = cgra_config();
        let graph = sample_graph(false);
        let json_path = writer.write_graph(&config, &graph).unwrap();

        assert!(json_path.with_extension("dot").is_file());
        assert!(!json_path.with_extension("png").exists());

        let text = std::fs::read_to_string(&json_path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["graph_name"], "cgra_map_diff2_4x4_N4_E3_3");
        assert_eq!(value["properties"]["node_count"], 4);
        assert_eq!(value["properties"]["edge_count"], 3);
        assert_eq!(value["properties"]["II_required"], 1);
        assert_eq!(value["properties"]["II_used"], 1);
        assert_eq!(value["properties"]["recipe"]["convergence"], 1);
        assert_eq!(value["architecture"]["interconnect_bits"], "1000");
        assert_eq!(value["architecture"]["dimensions"], serde_json::json!([4, 4]));
        assert_eq!(value["placement"]["add_2"], serde_json::json!([1, 1, 0]));
        assert_eq!(value["edges"].as_array().unwrap().len(), 3);
        assert!(value["architecture"].get("clock_scheme").is_none());
    }

    #[test]
    fn write_report_counts_graphs() {
        let tmp = tempfile::tempdir().unwrap();
        let writer = OutputWriter::new(tmp.path(), false);
        let mut second = sample_graph(false);
        second.index = 4;
        let report = TaskReport {
            requested: 2,
            graphs: vec![sample_graph(false), second],
            attempts: 5,
        };
        assert_eq!(writer.write_report(&cgra_config(), &report).unwrap(), 2);
        let dir = writer.graph_dir(&cgra_config(), &report.graphs[0]);
        let json_files = std::fs::read_dir(dir)
            .unwrap()
            .filter(|e| {
                e.as_ref()
                    .unwrap()
                    .path()
                    .extension()
                    .is_some_and(|ext| ext == "json")
            })
            .count();
        assert_eq!(json_files, 2);
    }
}
