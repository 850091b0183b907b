//! Folio Domain Layer
//!
//! Value types and boundary traits shared by every other Folio crate.
//! Nothing here performs I/O; providers, page sources and persistence live
//! in the outer crates and plug in through the traits in [`traits`].
//!
//! ## Key Concepts
//!
//! - **PageText**: raw text of one document page, as handed over by the document layer
//! - **ExtractedItem**: one key/value fact returned by the extraction service
//! - **Row**: the unit of final output, always traceable to a single page
//! - **Sentinel Row**: a row keyed `__UNSTRUCTURED__` that carries content the
//!   pipeline could not structure, so nothing is ever dropped
//! - **RunResult**: rows plus the per-page raw text backup for one run
//!
//! ## Architecture
//!
//! ```text
//! PageSource → PageText → (extractor) → Row → RunResult → persistence
//!                              ↕
//!                         LlmProvider
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod item;
pub mod page;
pub mod row;
pub mod run;
pub mod traits;

// Re-exports for convenience
pub use item::ExtractedItem;
pub use page::PageText;
pub use row::{Row, UNSTRUCTURED_KEY};
pub use run::{RunMetrics, RunResult};
pub use traits::{CandidateFragment, GenerationReply, GenerationRequest, LlmProvider, PageSource};
