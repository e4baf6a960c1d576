use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Cursor};
use std::path::Path;

use crate::error::{LexiconError, Result};

/// Klucze opcji budowy leksykonu w pliku `.info`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuildAttribute {
    CompactionLevel,
    TrimInput,
    SkipEmpty,
    SortInput,
}

impl BuildAttribute {
    pub fn key_name(&self) -> &'static str {
        match self {
            BuildAttribute::CompactionLevel => "lexicon.compaction.level",
            BuildAttribute::TrimInput => "lexicon.input.trim",
            BuildAttribute::SkipEmpty => "lexicon.input.skip-empty",
            BuildAttribute::SortInput => "lexicon.input.sort",
        }
    }

    pub fn from_key_name(key: &str) -> Option<Self> {
        match key {
            "lexicon.compaction.level" => Some(BuildAttribute::CompactionLevel),
            "lexicon.input.trim" => Some(BuildAttribute::TrimInput),
            "lexicon.input.skip-empty" => Some(BuildAttribute::SkipEmpty),
            "lexicon.input.sort" => Some(BuildAttribute::SortInput),
            _ => None,
        }
    }
}

/// Opcje budowy leksykonu, wczytywane z pliku `klucz = wartość`.
///
/// Puste linie i linie zaczynające się od `#` są pomijane. Nieznane klucze są
/// przechowywane, ale nie mają wpływu na budowę.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildOptions {
    attributes: HashMap<String, String>,
}

impl BuildOptions {
    pub const DEFAULT_COMPACTION_LEVEL: usize = 0;
    pub const DEFAULT_TRIM_INPUT: bool = true;
    pub const DEFAULT_SKIP_EMPTY: bool = true;
    pub const DEFAULT_SORT_INPUT: bool = false;

    pub fn new() -> Self {
        BuildOptions::default()
    }

    pub fn from_info_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref()).map_err(|e| {
            LexiconError::Io(format!("Nie można otworzyć pliku opcji '{}': {}", path.as_ref().display(), e))
        })?;
        Self::from_reader(BufReader::new(file))
    }

    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut attributes = HashMap::new();
        for line in reader.lines() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            match line.split_once('=') {
                Some((key, value)) => {
                    attributes.insert(key.trim().to_string(), value.trim().to_string());
                }
                None => {
                    return Err(LexiconError::InvalidOptionValue(format!("Linia bez znaku '=': '{}'", line)));
                }
            }
        }
        Ok(BuildOptions { attributes })
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::from_reader(Cursor::new(bytes))
    }

    pub fn get_string(&self, attribute: BuildAttribute) -> Option<&str> {
        self.attributes.get(attribute.key_name()).map(|s| s.as_str())
    }

    pub fn set(&mut self, attribute: BuildAttribute, value: impl Into<String>) {
        self.attributes.insert(attribute.key_name().to_string(), value.into());
    }

    pub fn compaction_level(&self) -> Result<usize> {
        let attribute = BuildAttribute::CompactionLevel;
        match self.get_string(attribute) {
            None => Ok(Self::DEFAULT_COMPACTION_LEVEL),
            Some(value) => value.parse().map_err(|source| LexiconError::OptionParseIntError {
                key: attribute.key_name().to_string(),
                value: value.to_string(),
                source,
            }),
        }
    }

    pub fn trim_input(&self) -> Result<bool> {
        self.get_bool(BuildAttribute::TrimInput, Self::DEFAULT_TRIM_INPUT)
    }

    pub fn skip_empty(&self) -> Result<bool> {
        self.get_bool(BuildAttribute::SkipEmpty, Self::DEFAULT_SKIP_EMPTY)
    }

    pub fn sort_input(&self) -> Result<bool> {
        self.get_bool(BuildAttribute::SortInput, Self::DEFAULT_SORT_INPUT)
    }

    fn get_bool(&self, attribute: BuildAttribute, default: bool) -> Result<bool> {
        match self.get_string(attribute) {
            None => Ok(default),
            Some(value) => match value.to_lowercase().as_str() {
                "true" | "yes" | "1" => Ok(true),
                "false" | "no" | "0" => Ok(false),
                _ => Err(LexiconError::InvalidOptionValue(format!(
                    "{} = {}, oczekiwano wartości logicznej",
                    attribute.key_name(),
                    value
                ))),
            },
        }
    }
}
