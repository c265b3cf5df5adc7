use std::fmt;

use serde_json::Value;

use crate::builder::BlocksBuilder;
use crate::record::{Record, TextArg};

/// Error from exporting a modal.
#[derive(Debug, PartialEq)]
pub enum ModalError {
    /// `finish` was called before `title` was set.
    MissingTitle,
}

impl fmt::Display for ModalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModalError::MissingTitle => write!(f, "modal has no title: call title before export"),
        }
    }
}

impl std::error::Error for ModalError {}

/// Specializes [`BlocksBuilder`] with modal-level metadata. The wrapped
/// block builder is reachable through [`ModalBuilder::blocks_mut`]; the
/// export step snapshots everything into one modal record.
#[derive(Debug, Default)]
pub struct ModalBuilder {
    blocks: BlocksBuilder,
    title: Option<String>,
    submit_text: Option<String>,
    close_text: Option<String>,
    callback_id: Option<String>,
}

impl ModalBuilder {
    pub fn new() -> Self {
        ModalBuilder::default()
    }

    pub fn blocks(&self) -> &BlocksBuilder {
        &self.blocks
    }

    pub fn blocks_mut(&mut self) -> &mut BlocksBuilder {
        &mut self.blocks
    }

    pub fn title(&mut self, text: &str) {
        self.title = Some(text.to_string());
    }

    pub fn submit(&mut self, text: &str) {
        self.submit_text = Some(text.to_string());
    }

    pub fn close(&mut self, text: &str) {
        self.close_text = Some(text.to_string());
    }

    pub fn callback(&mut self, id: &str) {
        self.callback_id = Some(id.to_string());
    }

    pub fn modal_title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn submit_text(&self) -> Option<&str> {
        self.submit_text.as_deref()
    }

    pub fn close_text(&self) -> Option<&str> {
        self.close_text.as_deref()
    }

    pub fn callback_id(&self) -> Option<&str> {
        self.callback_id.as_deref()
    }

    /// Export the modal record. Fails when no title was set rather than
    /// emitting a modal with a null title.
    pub fn finish(self) -> Result<Value, ModalError> {
        let title = self.title.ok_or(ModalError::MissingTitle)?;
        let mut rec = Record::tagged("modal");
        rec.set("title", TextArg::Plain(title).into_plain_text());
        rec.set("blocks", self.blocks.into_blocks());
        rec.set_opt("callback_id", self.callback_id);
        rec.set_opt(
            "submit",
            self.submit_text.map(|t| TextArg::Plain(t).into_plain_text()),
        );
        rec.set_opt(
            "close",
            self.close_text.map(|t| TextArg::Plain(t).into_plain_text()),
        );
        Ok(rec.finish())
    }
}
