//! Citation graph representation
//!
//! Built from a tab-separated edge list, one `citing<TAB>cited` pair per
//! line. Extra columns are ignored.

use citeforge_common::errors::{AppError, Result};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use tracing::{debug, info};

/// In-memory citation graph
#[derive(Debug, Default)]
pub struct CitationGraph {
    /// Adjacency list: document -> documents it cites
    outgoing: HashMap<String, Vec<String>>,

    /// Reverse adjacency: document -> documents citing it
    incoming: HashMap<String, Vec<String>>,

    nodes: HashSet<String>,
}

impl CitationGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read and parse an edge list file
    pub async fn load(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| AppError::io(path, e))?;
        let graph = Self::parse(&content)?;
        info!(
            path = %path.display(),
            nodes = graph.node_count(),
            "Loaded citation network"
        );
        Ok(graph)
    }

    /// Parse edge list text; line numbers in errors are 1-based
    pub fn parse(content: &str) -> Result<Self> {
        let mut graph = Self::new();

        for (number, line) in content.lines().enumerate() {
            let line_no = number + 1;
            if line.trim().is_empty() {
                continue;
            }

            let mut fields = line.split('\t').map(str::trim);
            let citing = fields.next().filter(|f| !f.is_empty());
            let cited = fields.next().filter(|f| !f.is_empty());

            match (citing, cited) {
                (Some(citing), Some(cited)) => graph.add_edge(citing, cited),
                _ => {
                    return Err(AppError::InvalidCitationRow {
                        line: line_no,
                        message: format!("expected two tab-separated indices, got {:?}", line),
                    })
                }
            }
        }

        debug!(nodes = graph.node_count(), "Parsed citation edges");
        Ok(graph)
    }

    /// Add an edge to the graph
    ///
    /// A self-citation counts as a reference only.
    pub fn add_edge(&mut self, citing: &str, cited: &str) {
        self.nodes.insert(citing.to_string());
        self.nodes.insert(cited.to_string());

        self.outgoing
            .entry(citing.to_string())
            .or_default()
            .push(cited.to_string());
        if citing != cited {
            self.incoming
                .entry(cited.to_string())
                .or_default()
                .push(citing.to_string());
        }
    }

    /// Get documents cited by this document
    pub fn get_references(&self, id: &str) -> &[String] {
        self.outgoing.get(id).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Get documents citing this document
    pub fn get_citations(&self, id: &str) -> &[String] {
        self.incoming.get(id).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains(id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_graph_construction() {
        let graph = CitationGraph::parse("27\t3\n27\t5\n8\t27\n3\t5\n").unwrap();

        assert_eq!(graph.node_count(), 4);
        assert_eq!(graph.get_references("27"), &["3".to_string(), "5".to_string()]);
        assert_eq!(graph.get_citations("27"), &["8".to_string()]);
        assert_eq!(graph.get_citations("5"), &["27".to_string(), "3".to_string()]);
        assert!(graph.get_references("404").is_empty());
        assert!(!graph.contains("404"));
    }

    #[test]
    fn test_blank_lines_and_extra_columns() {
        let graph = CitationGraph::parse("\n1\t2\t2019\n\n 3 \t 1\n").unwrap();
        assert_eq!(graph.get_references("1"), &["2".to_string()]);
        assert_eq!(graph.get_citations("1"), &["3".to_string()]);
    }

    #[test]
    fn test_self_citation_is_reference_only() {
        let graph = CitationGraph::parse("1\t1\n").unwrap();
        assert_eq!(graph.get_references("1"), &["1".to_string()]);
        assert!(graph.get_citations("1").is_empty());
    }

    #[test]
    fn test_malformed_row_reports_line() {
        let err = CitationGraph::parse("1\t2\n3 4\n").unwrap_err();
        match err {
            AppError::InvalidCitationRow { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(CitationGraph::parse("1\t\n").unwrap_err().exit_code(), 65);
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let err = CitationGraph::load(Path::new("/nonexistent/citations.tsv"))
            .await
            .unwrap_err();
        assert_eq!(err.exit_code(), 74);
    }
}
