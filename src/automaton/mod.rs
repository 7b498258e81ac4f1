//! Reading edge-label alphabets from automaton files.
//!
//! The search core only needs the *alphabets* of the two input models: the
//! ordered sequence of distinct labels encountered on edges. The input format
//! is a Graphviz-style digraph where edges carry a `label` attribute, e.g.
//!
//! ```text
//! digraph m1 {
//!   0 -> 1 [label="a"];
//!   1 -> 0 [label="b"];
//! }
//! ```
//!
//! Everything else in the file (node statements, other attributes, graph
//! structure) is ignored here; the full automata are only consumed by the
//! isotactic-decision procedure behind the [`crate::oracle`] seam.

use log::debug;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Errors produced while reading an automaton file.
#[derive(Debug, Error)]
pub enum AutomatonError {
    #[error("failed to read automaton file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Read the edge-label alphabet of the automaton at `path`.
///
/// Labels are returned in order of first appearance, with duplicates removed,
/// so the result is directly usable as a symbol set.
pub fn edge_labels(path: &Path) -> Result<Vec<String>, AutomatonError> {
    let contents = fs::read_to_string(path).map_err(|source| AutomatonError::Io {
        path: path.display().to_string(),
        source,
    })?;

    let mut labels = Vec::new();
    for line in contents.lines() {
        // Only edge statements carry labels we care about.
        if !line.contains("->") {
            continue;
        }
        if let Some(label) = extract_label(line) {
            if !labels.iter().any(|known| known == &label) {
                labels.push(label);
            }
        }
    }

    debug!("read {} edge labels from {}", labels.len(), path.display());
    Ok(labels)
}

/// Read the alphabets of both input models at once.
pub fn symbol_sets(m1: &Path, m2: &Path) -> Result<(Vec<String>, Vec<String>), AutomatonError> {
    Ok((edge_labels(m1)?, edge_labels(m2)?))
}

/// Extract the value of the `label` attribute from one edge statement.
///
/// Accepts both quoted (`label="ab"`) and bare (`label=ab`) attribute values.
fn extract_label(line: &str) -> Option<String> {
    let at = line.find("label")?;
    let rest = line[at + "label".len()..].trim_start();
    let rest = rest.strip_prefix('=')?.trim_start();

    if let Some(quoted) = rest.strip_prefix('"') {
        let end = quoted.find('"')?;
        Some(quoted[..end].to_string())
    } else {
        let end = rest
            .find(|c: char| c.is_whitespace() || c == ',' || c == ']' || c == ';')
            .unwrap_or(rest.len());
        if end == 0 {
            None
        } else {
            Some(rest[..end].to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_automaton(dir: &tempfile::TempDir, name: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).expect("failed to create test automaton");
        file.write_all(contents.as_bytes())
            .expect("failed to write test automaton");
        path
    }

    #[test]
    fn labels_in_order_of_appearance() {
        let dir = tempfile::tempdir().expect("temp dir should exist");
        let path = write_automaton(
            &dir,
            "m1.dot",
            "digraph m1 {\n  0 -> 1 [label=\"b\"];\n  1 -> 2 [label=\"a\"];\n  2 -> 0 [label=\"c\"];\n}\n",
        );

        let labels = edge_labels(&path).unwrap();
        assert_eq!(labels, vec!["b", "a", "c"]);
    }

    #[test]
    fn duplicate_labels_are_collapsed() {
        let dir = tempfile::tempdir().expect("temp dir should exist");
        let path = write_automaton(
            &dir,
            "m1.dot",
            "digraph m1 {\n  0 -> 1 [label=\"a\"];\n  1 -> 0 [label=\"a\"];\n  1 -> 2 [label=\"b\"];\n}\n",
        );

        let labels = edge_labels(&path).unwrap();
        assert_eq!(labels, vec!["a", "b"]);
    }

    #[test]
    fn bare_labels_and_node_lines_are_handled() {
        let dir = tempfile::tempdir().expect("temp dir should exist");
        let path = write_automaton(
            &dir,
            "m1.dot",
            "digraph m1 {\n  0 [label=\"ignored\"];\n  0 -> 1 [label=x];\n  1 -> 2 [label=y, weight=2];\n}\n",
        );

        let labels = edge_labels(&path).unwrap();
        assert_eq!(labels, vec!["x", "y"]);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let result = edge_labels(Path::new("/nonexistent/m1.dot"));
        assert!(matches!(result, Err(AutomatonError::Io { .. })));
    }
}
