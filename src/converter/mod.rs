//! # Converter Module
//!
//! Separa le responsabilità della conversione in sottomoduli:
//! - `batch_converter`: Orchestratore principale
//! - `tree_walker`: Attraversamento ricorsivo e dispatch per file
//! - `path_resolver`: Logica di calcolo path centralizzata

pub mod batch_converter;
pub mod path_resolver;
pub mod tree_walker;

pub use batch_converter::{BatchConverter, RunSummary, COMPLETION_MESSAGE};
pub use path_resolver::PathResolver;
pub use tree_walker::TreeWalker;
