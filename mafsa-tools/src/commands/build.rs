use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::time::Instant;

use anyhow::Context;
use tracing::info;

use mafsa_lexicon::{FsaLexicon, Lexicon};

use crate::InputArgs;

pub fn run(args: &InputArgs, dump: Option<&Path>) -> anyhow::Result<()> {
    let lexicon = super::load_lexicon(args)?;
    let stdout = io::stdout();
    write_summary(&lexicon, &mut stdout.lock())?;

    if let Some(path) = dump {
        let start = Instant::now();
        let file = File::create(path).with_context(|| format!("nie można utworzyć {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        lexicon.dump(&mut writer)?;
        info!("Zapisano {} napisów do {} w {:?}", lexicon.size(), path.display(), start.elapsed());
    }
    Ok(())
}

pub fn write_summary<W: Write>(lexicon: &FsaLexicon, out: &mut W) -> io::Result<()> {
    let stats = lexicon.stats();
    writeln!(out, "napisy:      {}", lexicon.size())?;
    writeln!(out, "węzły:       {}", stats.num_nodes)?;
    writeln!(out, "krawędzie:   {}", stats.num_edges)?;
    writeln!(out, "akceptujące: {}", stats.num_accept)?;
    writeln!(out, "etykiety:    {}", stats.num_labels)?;
    writeln!(out, "kompakcja:   {:?}", lexicon.compaction_state())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_summary() {
        let mut lexicon = FsaLexicon::from_unsorted(["car", "cat"]).unwrap();
        lexicon.finalize().unwrap();
        let mut out = Vec::new();
        write_summary(&lexicon, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("napisy:      2"));
        assert!(text.contains("węzły:       4"));
        assert!(text.contains("kompakcja:   Uncompacted"));
    }
}
