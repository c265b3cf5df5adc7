use serde_json::json;

use blockkit::rich_text::{DateOpts, LinkOpts, TextStyle};
use blockkit::{BlocksBuilder, RichTextBuilder};

#[test]
fn section_elements_stay_inside_their_scope() {
    let mut rt = RichTextBuilder::new();
    rt.section(|s| {
        s.text("first", TextStyle::default());
    });
    rt.section(|s| {
        s.text("second", TextStyle::default());
    });

    let block = rt.into_block();
    assert_eq!(block["elements"].as_array().unwrap().len(), 2);
    assert_eq!(
        block["elements"][0],
        json!({
            "type": "rich_text_section",
            "elements": [{ "type": "text", "text": "first" }]
        })
    );
}

#[test]
fn unstyled_text_has_no_style_record() {
    let mut rt = RichTextBuilder::new();
    rt.section(|s| {
        s.text("plain", TextStyle::default());
    });
    let block = rt.into_block();
    assert!(block["elements"][0]["elements"][0].get("style").is_none());
}

#[test]
fn false_style_flags_compact_away() {
    let mut rt = RichTextBuilder::new();
    rt.section(|s| {
        s.text(
            "mixed",
            TextStyle {
                bold: Some(true),
                italic: Some(false),
                ..TextStyle::default()
            },
        );
    });
    let block = rt.into_block();
    assert_eq!(
        block["elements"][0]["elements"][0]["style"],
        json!({ "bold": true })
    );
}

#[test]
fn list_carries_its_style() {
    let mut rt = RichTextBuilder::new();
    rt.list("bullet", |s| {
        s.text("item", TextStyle::default());
    });
    let block = rt.into_block();
    assert_eq!(block["elements"][0]["type"], "rich_text_list");
    assert_eq!(block["elements"][0]["style"], "bullet");
}

#[test]
fn preformatted_and_quote_have_no_style() {
    let mut rt = RichTextBuilder::new();
    rt.preformatted(|s| {
        s.text("code", TextStyle::default());
    });
    rt.quote(|s| {
        s.text("quoted", TextStyle::default());
    });
    let block = rt.into_block();
    assert_eq!(block["elements"][0]["type"], "rich_text_preformatted");
    assert!(block["elements"][0].get("style").is_none());
    assert_eq!(block["elements"][1]["type"], "rich_text_quote");
}

#[test]
fn inline_elements() {
    let mut rt = RichTextBuilder::new();
    rt.section(|s| {
        s.link("https://example.com", LinkOpts::default());
        s.emoji("tada");
        s.channel("C1");
        s.user("U1");
        s.usergroup("S1");
        s.date(1700000000, "{date_short}", DateOpts::default());
        s.broadcast("here");
    });
    let block = rt.into_block();
    let elements = block["elements"][0]["elements"].as_array().unwrap();
    let kinds: Vec<&str> = elements
        .iter()
        .map(|e| e["type"].as_str().unwrap())
        .collect();
    assert_eq!(
        kinds,
        ["link", "emoji", "channel", "user", "usergroup", "date", "broadcast"]
    );
    assert_eq!(elements[5]["timestamp"], json!(1700000000));
}

#[test]
fn link_unsafe_flag_keeps_its_platform_name() {
    let mut rt = RichTextBuilder::new();
    rt.section(|s| {
        s.link(
            "https://example.com",
            LinkOpts {
                unsafe_: Some(true),
                ..LinkOpts::default()
            },
        );
    });
    let block = rt.into_block();
    assert_eq!(block["elements"][0]["elements"][0]["unsafe"], json!(true));
}

#[test]
fn rich_text_block_appends_through_blocks_builder() {
    let mut b = BlocksBuilder::new();
    b.rich_text(|rt| {
        rt.section(|s| {
            s.text("hello", TextStyle::default());
        });
    });
    assert_eq!(b.blocks()[0]["type"], "rich_text");
    assert_eq!(b.blocks().len(), 1);
}
