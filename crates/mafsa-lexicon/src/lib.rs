pub mod build_options;
pub mod compaction;
pub mod error;
pub mod fsa_lexicon;
pub mod lexicon_trait;
pub mod register;
pub mod set_lexicon;

pub use build_options::{BuildAttribute, BuildOptions};
pub use compaction::{CompactionPass, CompactionReport, CompactionState, Compactor};
pub use error::{LexiconError, Result};
pub use fsa_lexicon::FsaLexicon;
pub use lexicon_trait::Lexicon;
pub use set_lexicon::SetLexicon;
