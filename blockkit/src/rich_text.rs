use serde::Deserialize;
use serde_json::{Value, json};

use crate::record::Record;

/// Accumulates the element sequence of a rich_text block. Each scope method
/// creates a fresh section sub-builder, hands it to the configure closure,
/// and appends the wrapping element once the closure returns, so elements
/// never leak into the parent sequence.
#[derive(Debug, Default)]
pub struct RichTextBuilder {
    elements: Vec<Value>,
}

impl RichTextBuilder {
    pub fn new() -> Self {
        RichTextBuilder { elements: Vec::new() }
    }

    pub fn elements(&self) -> &[Value] {
        &self.elements
    }

    pub fn into_block(self) -> Value {
        json!({ "type": "rich_text", "elements": self.elements })
    }

    fn scoped(&mut self, kind: &str, style: Option<&str>, configure: impl FnOnce(&mut RichTextSectionBuilder)) {
        let mut section = RichTextSectionBuilder::new();
        configure(&mut section);
        let mut rec = Record::tagged(kind);
        rec.set_opt("style", style);
        rec.set("elements", section.elements);
        self.elements.push(rec.finish());
    }

    pub fn section(&mut self, configure: impl FnOnce(&mut RichTextSectionBuilder)) {
        self.scoped("rich_text_section", None, configure);
    }

    pub fn list(&mut self, style: &str, configure: impl FnOnce(&mut RichTextSectionBuilder)) {
        self.scoped("rich_text_list", Some(style), configure);
    }

    pub fn preformatted(&mut self, configure: impl FnOnce(&mut RichTextSectionBuilder)) {
        self.scoped("rich_text_preformatted", None, configure);
    }

    pub fn quote(&mut self, configure: impl FnOnce(&mut RichTextSectionBuilder)) {
        self.scoped("rich_text_quote", None, configure);
    }
}

/// Style flags for a rich-text run. The `style` sub-record is omitted
/// entirely when no flag is set.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TextStyle {
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    pub strike: Option<bool>,
    pub code: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LinkOpts {
    pub text: Option<String>,
    #[serde(rename = "unsafe")]
    pub unsafe_: Option<bool>,
    pub style: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DateOpts {
    pub fallback: Option<String>,
    pub link: Option<String>,
}

/// Builds the inline elements of one rich-text scope (section, list item
/// run, preformatted, quote).
#[derive(Debug, Default)]
pub struct RichTextSectionBuilder {
    elements: Vec<Value>,
}

impl RichTextSectionBuilder {
    pub fn new() -> Self {
        RichTextSectionBuilder { elements: Vec::new() }
    }

    pub fn elements(&self) -> &[Value] {
        &self.elements
    }

    pub fn text(&mut self, text: &str, style: TextStyle) {
        let mut rec = Record::tagged("text");
        rec.set("text", text);
        let mut flags = Record::untagged();
        flags.set_flag("bold", style.bold);
        flags.set_flag("italic", style.italic);
        flags.set_flag("strike", style.strike);
        flags.set_flag("code", style.code);
        if !flags.is_empty() {
            rec.set("style", flags.finish());
        }
        self.elements.push(rec.finish());
    }

    pub fn link(&mut self, url: &str, opts: LinkOpts) {
        let mut rec = Record::tagged("link");
        rec.set("url", url);
        rec.set_opt("text", opts.text);
        rec.set_flag("unsafe", opts.unsafe_);
        rec.set_opt("style", opts.style);
        self.elements.push(rec.finish());
    }

    pub fn emoji(&mut self, name: &str) {
        let mut rec = Record::tagged("emoji");
        rec.set("name", name);
        self.elements.push(rec.finish());
    }

    pub fn channel(&mut self, channel_id: &str) {
        let mut rec = Record::tagged("channel");
        rec.set("channel_id", channel_id);
        self.elements.push(rec.finish());
    }

    pub fn user(&mut self, user_id: &str) {
        let mut rec = Record::tagged("user");
        rec.set("user_id", user_id);
        self.elements.push(rec.finish());
    }

    pub fn usergroup(&mut self, usergroup_id: &str) {
        let mut rec = Record::tagged("usergroup");
        rec.set("usergroup_id", usergroup_id);
        self.elements.push(rec.finish());
    }

    pub fn date(&mut self, timestamp: i64, format: &str, opts: DateOpts) {
        let mut rec = Record::tagged("date");
        rec.set("timestamp", timestamp);
        rec.set("format", format);
        rec.set_opt("fallback", opts.fallback);
        rec.set_opt("link", opts.link);
        self.elements.push(rec.finish());
    }

    pub fn broadcast(&mut self, range: &str) {
        let mut rec = Record::tagged("broadcast");
        rec.set("range", range);
        self.elements.push(rec.finish());
    }
}
