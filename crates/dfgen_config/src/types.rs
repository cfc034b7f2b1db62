//! Configuration types deserialized from `campaign.toml`.

use serde::Deserialize;

/// The top-level campaign configuration.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct CampaignConfig {
    /// Sweep dimensions and batch sizes.
    #[serde(default)]
    pub campaign: CampaignSection,
    /// Grammar tuning shared by every task.
    #[serde(default)]
    pub grammar: GrammarSection,
    /// Where and how results are written.
    #[serde(default)]
    pub output: OutputSection,
}

/// Target technology of a campaign.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TechnologyKind {
    /// Coarse-grained reconfigurable arrays (default).
    #[default]
    Cgra,
    /// Quantum-dot cellular automata.
    Qca,
}

/// Generation mode of a campaign.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ModeKind {
    /// Grammar growth with difficulty levels (default).
    #[default]
    Grammar,
    /// Constructive random placement and routing.
    Random,
}

/// The `[campaign]` section.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct CampaignSection {
    /// Target technology.
    pub technology: TechnologyKind,
    /// Generation mode.
    pub mode: ModeKind,
    /// Graphs requested per task.
    pub graphs_per_difficulty: usize,
    /// Graphs requested per task for small graph sizes.
    pub graphs_per_difficulty_small: usize,
    /// Sizes up to this value use `graphs_per_difficulty_small`.
    pub small_graph_threshold: usize,
    /// Highest difficulty swept (from 1).
    pub max_difficulty: u32,
    /// Node counts swept.
    pub graph_sizes: Vec<usize>,
    /// Architecture sizes swept, as `[rows, cols]`.
    pub arch_sizes: Vec<[u32; 2]>,
    /// CGRA interconnect bit strings swept (`mdht` order).
    pub interconnects: Vec<String>,
    /// QCA clocking scheme tokens swept (`U`, `R`, `T`).
    pub qca_schemes: Vec<String>,
    /// Fixed initiation interval; derived per attempt when absent.
    pub ii: Option<u32>,
    /// Base seed; task `i` uses `seed + i`.
    pub seed: Option<u64>,
    /// Pair-routing probability for random mode.
    pub alpha: f64,
}

impl Default for CampaignSection {
    fn default() -> Self {
        Self {
            technology: TechnologyKind::Cgra,
            mode: ModeKind::Grammar,
            graphs_per_difficulty: 500,
            graphs_per_difficulty_small: 50,
            small_graph_threshold: 5,
            max_difficulty: 20,
            graph_sizes: (3..=16).collect(),
            arch_sizes: vec![[4, 4], [8, 8]],
            interconnects: vec!["1000".to_string(), "1111".to_string()],
            qca_schemes: vec!["U".to_string()],
            ii: None,
            seed: None,
            alpha: 0.3,
        }
    }
}

impl CampaignSection {
    /// Number of graphs requested for tasks of the given size.
    pub fn graphs_for_size(&self, size: usize) -> usize {
        if size <= self.small_graph_threshold {
            self.graphs_per_difficulty_small
        } else {
            self.graphs_per_difficulty
        }
    }
}

/// The `[grammar]` section.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct GrammarSection {
    /// Branching-factor range `[min, max]`.
    pub k_range: [u32; 2],
    /// Longest allowed path, in edges.
    pub max_path_length: usize,
    /// Step ceiling of one growth attempt.
    pub growth_timeout: u32,
    /// Attempt ceiling multiplier per batch.
    pub retries_multiplier: usize,
    /// Skip QCA border extension.
    pub no_extend_io: bool,
    /// Merge probability for QCA post-processing.
    pub merge_alpha: f64,
}

impl Default for GrammarSection {
    fn default() -> Self {
        Self {
            k_range: [2, 3],
            max_path_length: 15,
            growth_timeout: 200,
            retries_multiplier: 150,
            no_extend_io: false,
            merge_alpha: 0.15,
        }
    }
}

/// The `[output]` section.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct OutputSection {
    /// Base output directory.
    pub dir: String,
    /// Render PNG images with Graphviz.
    pub images: bool,
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            dir: "results_campaign".to_string(),
            images: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_campaign_defaults() {
        let config = CampaignConfig::default();
        assert_eq!(config.campaign.graph_sizes.first(), Some(&3));
        assert_eq!(config.campaign.graph_sizes.last(), Some(&16));
        assert_eq!(config.campaign.max_difficulty, 20);
        assert_eq!(config.grammar.k_range, [2, 3]);
        assert_eq!(config.output.dir, "results_campaign");
    }

    #[test]
    fn small_sizes_get_fewer_graphs() {
        let section = CampaignSection::default();
        assert_eq!(section.graphs_for_size(3), 50);
        assert_eq!(section.graphs_for_size(5), 50);
        assert_eq!(section.graphs_for_size(6), 500);
    }
}
