use thiserror::Error;

use mafsa_graph::error::GraphError;

/// Typ Result używany w tym crate.
pub type Result<T> = std::result::Result<T, LexiconError>;

/// Enum reprezentujący błędy, które mogą wystąpić podczas budowy i kompakcji leksykonu.
#[derive(Debug, Error)]
pub enum LexiconError {
    /// Błąd pochodzący z operacji na grafie.
    #[error("Błąd grafu: {0}")]
    Graph(#[from] GraphError),

    /// Błąd wejścia/wyjścia podczas wczytywania lub zapisu napisów.
    #[error("Błąd I/O: {0}")]
    Io(String),

    /// Napisy muszą być dodawane w porządku leksykograficznym.
    #[error("Napisy nie są posortowane: '{current}' występuje po '{previous}'")]
    UnsortedInput { previous: String, current: String },

    /// Operacja wymaga wcześniejszego wywołania `finalize`.
    #[error("Leksykon nie został sfinalizowany.")]
    NotFinalized,

    #[error("Leksykon został już sfinalizowany, nie można dodawać napisów.")]
    AlreadyFinalized,

    #[error("Leksykon został już skompaktowany, nie można dodawać napisów.")]
    AlreadyCompacted,

    /// Nieprawidłowa wartość opcji budowy.
    #[error("Nieprawidłowa wartość opcji: {0}")]
    InvalidOptionValue(String),

    /// Błąd parsowania liczby w opcjach budowy.
    #[error("Błąd parsowania liczby w opcjach dla klucza '{key}': {value}, błąd: {source}")]
    OptionParseIntError {
        key: String,
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },
}

impl From<std::io::Error> for LexiconError {
    fn from(err: std::io::Error) -> Self {
        LexiconError::Io(err.to_string())
    }
}
