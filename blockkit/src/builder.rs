use serde::Deserialize;
use serde_json::Value;

use crate::record::{Record, TextArg};
use crate::rich_text::RichTextBuilder;

/// Accumulates an ordered sequence of Block Kit blocks. One builder instance
/// exists per template evaluation; blocks are append-only and their order is
/// render order.
#[derive(Debug, Default)]
pub struct BlocksBuilder {
    blocks: Vec<Value>,
}

/// Options for [`BlocksBuilder::section`].
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SectionOpts {
    pub accessory: Option<Value>,
    pub fields: Option<Value>,
    pub markdown: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ContextActionsOpts {
    pub block_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImageBlockOpts {
    pub title: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InputOpts {
    pub optional: Option<bool>,
    pub hint: Option<String>,
    pub block_id: Option<String>,
    pub dispatch_action: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileOpts {
    pub source: Option<String>,
    pub block_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VideoOpts {
    pub description: Option<String>,
    pub author_name: Option<String>,
    pub provider_name: Option<String>,
    pub provider_icon_url: Option<String>,
    pub block_id: Option<String>,
}

impl BlocksBuilder {
    pub fn new() -> Self {
        BlocksBuilder { blocks: Vec::new() }
    }

    pub fn blocks(&self) -> &[Value] {
        &self.blocks
    }

    pub fn into_blocks(self) -> Vec<Value> {
        self.blocks
    }

    /// Append a pre-built block unchanged (used by partial composition).
    pub fn append(&mut self, block: Value) {
        self.blocks.push(block);
    }

    pub fn header(&mut self, text: impl Into<TextArg>) {
        let mut rec = Record::tagged("header");
        rec.set("text", text.into().into_plain_text());
        self.blocks.push(rec.finish());
    }

    pub fn section(&mut self, text: Option<TextArg>, opts: SectionOpts) {
        let mut rec = Record::tagged("section");
        if let Some(text) = text {
            let wrapped = if opts.markdown {
                text.into_mrkdwn()
            } else {
                text.into_plain_text()
            };
            rec.set("text", wrapped);
        }
        rec.set_opt("accessory", opts.accessory);
        rec.set_opt("fields", opts.fields);
        self.blocks.push(rec.finish());
    }

    /// Section with markdown text and nothing else.
    pub fn simple_section(&mut self, text: impl Into<TextArg>) {
        self.section(
            Some(text.into()),
            SectionOpts {
                markdown: true,
                ..SectionOpts::default()
            },
        );
    }

    pub fn divider(&mut self) {
        self.blocks.push(Record::tagged("divider").finish());
    }

    pub fn context(&mut self, elements: Vec<Value>) {
        let mut rec = Record::tagged("context");
        rec.set("elements", elements);
        self.blocks.push(rec.finish());
    }

    pub fn context_actions(&mut self, elements: Vec<Value>, opts: ContextActionsOpts) {
        let mut rec = Record::tagged("context_actions");
        rec.set("elements", elements);
        rec.set_opt("block_id", opts.block_id);
        self.blocks.push(rec.finish());
    }

    pub fn actions(&mut self, elements: Vec<Value>) {
        let mut rec = Record::tagged("actions");
        rec.set("elements", elements);
        self.blocks.push(rec.finish());
    }

    pub fn image(&mut self, image_url: &str, alt_text: &str, opts: ImageBlockOpts) {
        let mut rec = Record::tagged("image");
        rec.set("image_url", image_url);
        rec.set("alt_text", alt_text);
        rec.set_opt("title", opts.title.map(|t| TextArg::Plain(t).into_plain_text()));
        self.blocks.push(rec.finish());
    }

    pub fn input(&mut self, label: impl Into<TextArg>, element: Value, opts: InputOpts) {
        let mut rec = Record::tagged("input");
        rec.set("label", label.into().into_plain_text());
        rec.set("element", element);
        rec.set_opt("block_id", opts.block_id);
        rec.set_flag("optional", opts.optional);
        rec.set_opt("hint", opts.hint.map(|h| TextArg::Plain(h).into_plain_text()));
        rec.set_flag("dispatch_action", opts.dispatch_action);
        self.blocks.push(rec.finish());
    }

    pub fn file(&mut self, external_id: &str, opts: FileOpts) {
        let mut rec = Record::tagged("file");
        rec.set("external_id", external_id);
        rec.set("source", opts.source.unwrap_or_else(|| "remote".to_string()));
        rec.set_opt("block_id", opts.block_id);
        self.blocks.push(rec.finish());
    }

    #[allow(clippy::too_many_arguments)]
    pub fn video(
        &mut self,
        title: impl Into<TextArg>,
        title_url: &str,
        thumbnail_url: &str,
        video_url: &str,
        alt_text: &str,
        opts: VideoOpts,
    ) {
        let mut rec = Record::tagged("video");
        rec.set("title", title.into().into_plain_text());
        rec.set("title_url", title_url);
        rec.set("thumbnail_url", thumbnail_url);
        rec.set("video_url", video_url);
        rec.set("alt_text", alt_text);
        rec.set_opt(
            "description",
            opts.description.map(|d| TextArg::Plain(d).into_plain_text()),
        );
        rec.set_opt("author_name", opts.author_name);
        rec.set_opt("provider_name", opts.provider_name);
        rec.set_opt("provider_icon_url", opts.provider_icon_url);
        rec.set_opt("block_id", opts.block_id);
        self.blocks.push(rec.finish());
    }

    /// Append a rich_text block built through a scoped sub-builder.
    pub fn rich_text(&mut self, configure: impl FnOnce(&mut RichTextBuilder)) {
        let mut builder = RichTextBuilder::new();
        configure(&mut builder);
        self.blocks.push(builder.into_block());
    }
}
