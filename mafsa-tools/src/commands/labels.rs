use std::io::{self, Write};

use mafsa_graph::Graph;

use crate::InputArgs;

pub fn run(args: &InputArgs) -> anyhow::Result<()> {
    let lexicon = super::load_lexicon(args)?;
    let stdout = io::stdout();
    write_histogram(lexicon.graph(), &mut stdout.lock())?;
    Ok(())
}

/// Etykiety posortowane malejąco według liczby wystąpień, a przy remisie rosnąco.
pub fn label_histogram(graph: &Graph) -> Vec<(&str, usize)> {
    let mut labels: Vec<(&str, usize)> = graph.label_counts().iter().map(|(l, &c)| (l.as_str(), c)).collect();
    labels.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    labels
}

pub fn write_histogram<W: Write>(graph: &Graph, out: &mut W) -> io::Result<()> {
    for (label, count) in label_histogram(graph) {
        writeln!(out, "{}\t{:?}", count, label)?;
    }
    Ok(())
}
