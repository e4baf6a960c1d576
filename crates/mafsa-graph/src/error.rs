use thiserror::Error;

use crate::node::NodeId;

/// Typ Result używany w tym crate.
pub type Result<T> = std::result::Result<T, GraphError>;

/// Enum reprezentujący błędy, które mogą wystąpić podczas operacji na grafie.
///
/// Operacja zwracająca błąd nie zmienia stanu grafu.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    /// Uchwyt nie wskazuje na żaden żywy węzeł grafu (np. węzeł został już usunięty).
    #[error("Nieprawidłowy uchwyt węzła: {0}")]
    InvalidNode(NodeId),

    /// Węzeł nie ma krawędzi wychodzącej o podanej etykiecie.
    #[error("Nie znaleziono krawędzi o etykiecie '{label}' z węzła {node}")]
    EdgeNotFound { label: String, node: NodeId },

    /// Próba usunięcia korzenia, który jest stałą częścią grafu.
    #[error("Korzenia grafu nie można usunąć.")]
    RootRemoval,

    /// Graf jest uszkodzony lub w nieprawidłowym stanie.
    #[error("Graf jest uszkodzony lub w nieprawidłowym stanie: {0}")]
    CorruptedGraph(String),
}
