pub mod build;
pub mod labels;
pub mod lookup;

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use std::time::Instant;

use anyhow::Context;
use tracing::info;

use mafsa_lexicon::{BuildAttribute, BuildOptions, FsaLexicon};

use crate::InputArgs;

/// Opcje budowy z pliku `.info` (jeśli podano) z nałożonymi flagami wiersza poleceń.
pub fn build_options(args: &InputArgs) -> anyhow::Result<BuildOptions> {
    let mut options = match &args.config {
        Some(path) => BuildOptions::from_info_file(path)
            .with_context(|| format!("nie można wczytać opcji z {}", path.display()))?,
        None => BuildOptions::new(),
    };
    if let Some(level) = args.compaction {
        options.set(BuildAttribute::CompactionLevel, level.to_string());
    }
    if args.sort {
        options.set(BuildAttribute::SortInput, "true");
    }
    Ok(options)
}

fn open_input(path: Option<&Path>) -> anyhow::Result<Box<dyn BufRead>> {
    match path {
        Some(p) if p != Path::new("-") => {
            let file = File::open(p).with_context(|| format!("nie można otworzyć {}", p.display()))?;
            Ok(Box::new(BufReader::new(file)))
        }
        _ => Ok(Box::new(BufReader::new(io::stdin()))),
    }
}

/// Buduje leksykon zgodnie z argumentami, logując czas budowy.
pub fn load_lexicon(args: &InputArgs) -> anyhow::Result<FsaLexicon> {
    let options = build_options(args)?;
    let reader = open_input(args.input.as_deref())?;

    let start = Instant::now();
    let lexicon = FsaLexicon::build(reader, &options).context("budowa leksykonu nie powiodła się")?;
    info!("Zbudowano leksykon w {:?}: {}", start.elapsed(), lexicon.stats());
    Ok(lexicon)
}
