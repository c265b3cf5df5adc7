use serde_json::json;

use blockkit::{ModalBuilder, ModalError};

#[test]
fn minimal_modal() {
    let mut m = ModalBuilder::new();
    m.title("Settings");
    m.blocks_mut().simple_section("body");
    let modal = m.finish().unwrap();
    assert_eq!(modal["type"], "modal");
    assert_eq!(modal["title"], json!({ "type": "plain_text", "text": "Settings" }));
    assert_eq!(modal["blocks"].as_array().unwrap().len(), 1);
}

#[test]
fn optional_metadata_is_omitted() {
    let mut m = ModalBuilder::new();
    m.title("T");
    let modal = m.finish().unwrap();
    assert!(modal.get("submit").is_none());
    assert!(modal.get("close").is_none());
    assert!(modal.get("callback_id").is_none());
}

#[test]
fn full_metadata() {
    let mut m = ModalBuilder::new();
    m.title("T");
    m.submit("Save");
    m.close("Cancel");
    m.callback("settings_modal");
    let modal = m.finish().unwrap();
    assert_eq!(modal["submit"], json!({ "type": "plain_text", "text": "Save" }));
    assert_eq!(modal["close"], json!({ "type": "plain_text", "text": "Cancel" }));
    assert_eq!(modal["callback_id"], "settings_modal");
}

#[test]
fn export_without_title_fails() {
    let mut m = ModalBuilder::new();
    m.blocks_mut().divider();
    assert_eq!(m.finish().unwrap_err(), ModalError::MissingTitle);
}

#[test]
fn later_title_wins() {
    let mut m = ModalBuilder::new();
    m.title("first");
    m.title("second");
    assert_eq!(m.finish().unwrap()["title"]["text"], "second");
}
