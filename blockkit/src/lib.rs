//! Block Kit document model: a hierarchical builder for Slack block
//! messages and modals. Blocks and elements are flat JSON records tagged by
//! `type`; optional fields are compacted away per field (see [`record`]).
//!
//! Shape only: the builder assembles documents, it does not validate
//! platform constraints such as length or block-count limits.

pub mod builder;
pub mod elements;
pub mod modal;
pub mod record;
pub mod rich_text;

pub use builder::BlocksBuilder;
pub use modal::{ModalBuilder, ModalError};
pub use record::{Record, TextArg};
pub use rich_text::{RichTextBuilder, RichTextSectionBuilder};
