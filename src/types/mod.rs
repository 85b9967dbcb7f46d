//! Type definitions

pub mod contact;
pub mod dossier;
pub mod entreprise;
pub mod import;
pub mod transaction;

pub use contact::*;
pub use dossier::*;
pub use entreprise::*;
pub use import::*;
pub use transaction::*;
