//! Element factories: interactive components, composition objects and text
//! objects that get embedded into a block's fields. Each factory returns the
//! finished record; the caller decides where it goes.

use serde::Deserialize;
use serde_json::Value;

use crate::record::{Record, TextArg};

fn plain(text: impl Into<TextArg>) -> Value {
    text.into().into_plain_text()
}

pub fn image_element(image_url: &str, alt_text: &str) -> Value {
    let mut rec = Record::tagged("image");
    rec.set("image_url", image_url);
    rec.set("alt_text", alt_text);
    rec.finish()
}

pub fn mrkdwn_text(text: &str) -> Value {
    let mut rec = Record::tagged("mrkdwn");
    rec.set("text", text);
    rec.finish()
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlainTextOpts {
    pub emoji: Option<bool>,
}

/// `emoji` defaults to true and is always emitted, even when explicitly
/// false. It is the one boolean in the field set whose platform default is
/// true, so flag-style omission would corrupt it.
pub fn plain_text(text: &str, opts: PlainTextOpts) -> Value {
    let mut rec = Record::tagged("plain_text");
    rec.set("text", text);
    rec.set("emoji", opts.emoji.unwrap_or(true));
    rec.finish()
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ButtonOpts {
    pub value: Option<String>,
    pub url: Option<String>,
    pub style: Option<String>,
    pub confirm: Option<Value>,
    pub accessibility_label: Option<String>,
}

pub fn button(text: impl Into<TextArg>, action_id: &str, opts: ButtonOpts) -> Value {
    let mut rec = Record::tagged("button");
    rec.set("text", plain(text));
    rec.set("action_id", action_id);
    rec.set_opt("value", opts.value);
    rec.set_opt("url", opts.url);
    rec.set_opt("style", opts.style);
    rec.set_opt("confirm", opts.confirm);
    rec.set_opt("accessibility_label", opts.accessibility_label);
    rec.finish()
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CheckboxesOpts {
    pub initial_options: Option<Value>,
    pub confirm: Option<Value>,
    pub focus_on_load: Option<bool>,
}

pub fn checkboxes(action_id: &str, options: Vec<Value>, opts: CheckboxesOpts) -> Value {
    let mut rec = Record::tagged("checkboxes");
    rec.set("action_id", action_id);
    rec.set("options", options);
    rec.set_opt("initial_options", opts.initial_options);
    rec.set_opt("confirm", opts.confirm);
    rec.set_flag("focus_on_load", opts.focus_on_load);
    rec.finish()
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatePickerOpts {
    pub placeholder: Option<String>,
    pub initial_date: Option<String>,
    pub confirm: Option<Value>,
    pub focus_on_load: Option<bool>,
}

pub fn date_picker(action_id: &str, opts: DatePickerOpts) -> Value {
    let mut rec = Record::tagged("datepicker");
    rec.set("action_id", action_id);
    rec.set_opt("placeholder", opts.placeholder.map(plain));
    rec.set_opt("initial_date", opts.initial_date);
    rec.set_opt("confirm", opts.confirm);
    rec.set_flag("focus_on_load", opts.focus_on_load);
    rec.finish()
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatetimePickerOpts {
    pub initial_date_time: Option<i64>,
    pub confirm: Option<Value>,
    pub focus_on_load: Option<bool>,
}

pub fn datetime_picker(action_id: &str, opts: DatetimePickerOpts) -> Value {
    let mut rec = Record::tagged("datetimepicker");
    rec.set("action_id", action_id);
    rec.set_opt("initial_date_time", opts.initial_date_time);
    rec.set_opt("confirm", opts.confirm);
    rec.set_flag("focus_on_load", opts.focus_on_load);
    rec.finish()
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TimePickerOpts {
    pub placeholder: Option<String>,
    pub initial_time: Option<String>,
    pub confirm: Option<Value>,
    pub focus_on_load: Option<bool>,
    pub timezone: Option<String>,
}

pub fn time_picker(action_id: &str, opts: TimePickerOpts) -> Value {
    let mut rec = Record::tagged("timepicker");
    rec.set("action_id", action_id);
    rec.set_opt("placeholder", opts.placeholder.map(plain));
    rec.set_opt("initial_time", opts.initial_time);
    rec.set_opt("confirm", opts.confirm);
    rec.set_flag("focus_on_load", opts.focus_on_load);
    rec.set_opt("timezone", opts.timezone);
    rec.finish()
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlainTextInputOpts {
    pub placeholder: Option<String>,
    pub initial_value: Option<String>,
    pub multiline: Option<bool>,
    pub min_length: Option<u64>,
    pub max_length: Option<u64>,
    pub dispatch_action_config: Option<Value>,
    pub focus_on_load: Option<bool>,
}

pub fn plain_text_input(action_id: &str, opts: PlainTextInputOpts) -> Value {
    let mut rec = Record::tagged("plain_text_input");
    rec.set("action_id", action_id);
    rec.set_opt("placeholder", opts.placeholder.map(plain));
    rec.set_opt("initial_value", opts.initial_value);
    rec.set_flag("multiline", opts.multiline);
    rec.set_opt("min_length", opts.min_length);
    rec.set_opt("max_length", opts.max_length);
    rec.set_opt("dispatch_action_config", opts.dispatch_action_config);
    rec.set_flag("focus_on_load", opts.focus_on_load);
    rec.finish()
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TextInputOpts {
    pub placeholder: Option<String>,
    pub initial_value: Option<String>,
    pub dispatch_action_config: Option<Value>,
    pub focus_on_load: Option<bool>,
}

fn simple_text_input(kind: &str, action_id: &str, opts: TextInputOpts) -> Value {
    let mut rec = Record::tagged(kind);
    rec.set("action_id", action_id);
    rec.set_opt("placeholder", opts.placeholder.map(plain));
    rec.set_opt("initial_value", opts.initial_value);
    rec.set_opt("dispatch_action_config", opts.dispatch_action_config);
    rec.set_flag("focus_on_load", opts.focus_on_load);
    rec.finish()
}

pub fn email_input(action_id: &str, opts: TextInputOpts) -> Value {
    simple_text_input("email_text_input", action_id, opts)
}

pub fn url_input(action_id: &str, opts: TextInputOpts) -> Value {
    simple_text_input("url_text_input", action_id, opts)
}

pub fn rich_text_input(action_id: &str, opts: TextInputOpts) -> Value {
    simple_text_input("rich_text_input", action_id, opts)
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NumberInputOpts {
    pub placeholder: Option<String>,
    pub initial_value: Option<Value>,
    pub min_value: Option<Value>,
    pub max_value: Option<Value>,
    pub dispatch_action_config: Option<Value>,
    pub focus_on_load: Option<bool>,
}

pub fn number_input(action_id: &str, is_decimal_allowed: bool, opts: NumberInputOpts) -> Value {
    let mut rec = Record::tagged("number_input");
    rec.set("action_id", action_id);
    rec.set("is_decimal_allowed", is_decimal_allowed);
    rec.set_opt("placeholder", opts.placeholder.map(plain));
    rec.set_opt("initial_value", opts.initial_value);
    rec.set_opt("min_value", opts.min_value);
    rec.set_opt("max_value", opts.max_value);
    rec.set_opt("dispatch_action_config", opts.dispatch_action_config);
    rec.set_flag("focus_on_load", opts.focus_on_load);
    rec.finish()
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RadioButtonsOpts {
    pub initial_option: Option<Value>,
    pub confirm: Option<Value>,
    pub focus_on_load: Option<bool>,
}

pub fn radio_buttons(action_id: &str, options: Vec<Value>, opts: RadioButtonsOpts) -> Value {
    let mut rec = Record::tagged("radio_buttons");
    rec.set("action_id", action_id);
    rec.set("options", options);
    rec.set_opt("initial_option", opts.initial_option);
    rec.set_opt("confirm", opts.confirm);
    rec.set_flag("focus_on_load", opts.focus_on_load);
    rec.finish()
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SelectMenuOpts {
    pub options: Option<Value>,
    pub option_groups: Option<Value>,
    pub initial_option: Option<Value>,
    pub confirm: Option<Value>,
    pub focus_on_load: Option<bool>,
}

pub fn select_menu(action_id: &str, placeholder: impl Into<TextArg>, opts: SelectMenuOpts) -> Value {
    let mut rec = Record::tagged("static_select");
    rec.set("action_id", action_id);
    rec.set("placeholder", plain(placeholder));
    rec.set_opt("options", opts.options);
    rec.set_opt("option_groups", opts.option_groups);
    rec.set_opt("initial_option", opts.initial_option);
    rec.set_opt("confirm", opts.confirm);
    rec.set_flag("focus_on_load", opts.focus_on_load);
    rec.finish()
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MultiSelectMenuOpts {
    pub options: Option<Value>,
    pub option_groups: Option<Value>,
    pub initial_options: Option<Value>,
    pub max_selected_items: Option<u64>,
    pub confirm: Option<Value>,
    pub focus_on_load: Option<bool>,
}

pub fn multi_select_menu(
    action_id: &str,
    placeholder: impl Into<TextArg>,
    opts: MultiSelectMenuOpts,
) -> Value {
    let mut rec = Record::tagged("multi_static_select");
    rec.set("action_id", action_id);
    rec.set("placeholder", plain(placeholder));
    rec.set_opt("options", opts.options);
    rec.set_opt("option_groups", opts.option_groups);
    rec.set_opt("initial_options", opts.initial_options);
    rec.set_opt("max_selected_items", opts.max_selected_items);
    rec.set_opt("confirm", opts.confirm);
    rec.set_flag("focus_on_load", opts.focus_on_load);
    rec.finish()
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UsersSelectOpts {
    pub initial_user: Option<String>,
    pub confirm: Option<Value>,
    pub focus_on_load: Option<bool>,
}

pub fn users_select(action_id: &str, placeholder: impl Into<TextArg>, opts: UsersSelectOpts) -> Value {
    let mut rec = Record::tagged("users_select");
    rec.set("action_id", action_id);
    rec.set("placeholder", plain(placeholder));
    rec.set_opt("initial_user", opts.initial_user);
    rec.set_opt("confirm", opts.confirm);
    rec.set_flag("focus_on_load", opts.focus_on_load);
    rec.finish()
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MultiUsersSelectOpts {
    pub initial_users: Option<Value>,
    pub max_selected_items: Option<u64>,
    pub confirm: Option<Value>,
    pub focus_on_load: Option<bool>,
}

pub fn multi_users_select(
    action_id: &str,
    placeholder: impl Into<TextArg>,
    opts: MultiUsersSelectOpts,
) -> Value {
    let mut rec = Record::tagged("multi_users_select");
    rec.set("action_id", action_id);
    rec.set("placeholder", plain(placeholder));
    rec.set_opt("initial_users", opts.initial_users);
    rec.set_opt("max_selected_items", opts.max_selected_items);
    rec.set_opt("confirm", opts.confirm);
    rec.set_flag("focus_on_load", opts.focus_on_load);
    rec.finish()
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConversationsSelectOpts {
    pub initial_conversation: Option<String>,
    pub default_to_current_conversation: Option<bool>,
    pub filter: Option<Value>,
    pub confirm: Option<Value>,
    pub focus_on_load: Option<bool>,
    pub response_url_enabled: Option<bool>,
}

pub fn conversations_select(
    action_id: &str,
    placeholder: impl Into<TextArg>,
    opts: ConversationsSelectOpts,
) -> Value {
    let mut rec = Record::tagged("conversations_select");
    rec.set("action_id", action_id);
    rec.set("placeholder", plain(placeholder));
    rec.set_opt("initial_conversation", opts.initial_conversation);
    rec.set_flag(
        "default_to_current_conversation",
        opts.default_to_current_conversation,
    );
    rec.set_opt("filter", opts.filter);
    rec.set_opt("confirm", opts.confirm);
    rec.set_flag("focus_on_load", opts.focus_on_load);
    rec.set_flag("response_url_enabled", opts.response_url_enabled);
    rec.finish()
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MultiConversationsSelectOpts {
    pub initial_conversations: Option<Value>,
    pub max_selected_items: Option<u64>,
    pub default_to_current_conversation: Option<bool>,
    pub filter: Option<Value>,
    pub confirm: Option<Value>,
    pub focus_on_load: Option<bool>,
}

pub fn multi_conversations_select(
    action_id: &str,
    placeholder: impl Into<TextArg>,
    opts: MultiConversationsSelectOpts,
) -> Value {
    let mut rec = Record::tagged("multi_conversations_select");
    rec.set("action_id", action_id);
    rec.set("placeholder", plain(placeholder));
    rec.set_opt("initial_conversations", opts.initial_conversations);
    rec.set_opt("max_selected_items", opts.max_selected_items);
    rec.set_flag(
        "default_to_current_conversation",
        opts.default_to_current_conversation,
    );
    rec.set_opt("filter", opts.filter);
    rec.set_opt("confirm", opts.confirm);
    rec.set_flag("focus_on_load", opts.focus_on_load);
    rec.finish()
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChannelsSelectOpts {
    pub initial_channel: Option<String>,
    pub confirm: Option<Value>,
    pub focus_on_load: Option<bool>,
    pub response_url_enabled: Option<bool>,
}

pub fn channels_select(
    action_id: &str,
    placeholder: impl Into<TextArg>,
    opts: ChannelsSelectOpts,
) -> Value {
    let mut rec = Record::tagged("channels_select");
    rec.set("action_id", action_id);
    rec.set("placeholder", plain(placeholder));
    rec.set_opt("initial_channel", opts.initial_channel);
    rec.set_opt("confirm", opts.confirm);
    rec.set_flag("focus_on_load", opts.focus_on_load);
    rec.set_flag("response_url_enabled", opts.response_url_enabled);
    rec.finish()
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MultiChannelsSelectOpts {
    pub initial_channels: Option<Value>,
    pub max_selected_items: Option<u64>,
    pub confirm: Option<Value>,
    pub focus_on_load: Option<bool>,
}

pub fn multi_channels_select(
    action_id: &str,
    placeholder: impl Into<TextArg>,
    opts: MultiChannelsSelectOpts,
) -> Value {
    let mut rec = Record::tagged("multi_channels_select");
    rec.set("action_id", action_id);
    rec.set("placeholder", plain(placeholder));
    rec.set_opt("initial_channels", opts.initial_channels);
    rec.set_opt("max_selected_items", opts.max_selected_items);
    rec.set_opt("confirm", opts.confirm);
    rec.set_flag("focus_on_load", opts.focus_on_load);
    rec.finish()
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OverflowOpts {
    pub confirm: Option<Value>,
}

pub fn overflow(action_id: &str, options: Vec<Value>, opts: OverflowOpts) -> Value {
    let mut rec = Record::tagged("overflow");
    rec.set("action_id", action_id);
    rec.set("options", options);
    rec.set_opt("confirm", opts.confirm);
    rec.finish()
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileInputOpts {
    pub filetypes: Option<Value>,
    pub max_files: Option<u64>,
}

pub fn file_input(action_id: &str, opts: FileInputOpts) -> Value {
    let mut rec = Record::tagged("file_input");
    rec.set("action_id", action_id);
    rec.set_opt("filetypes", opts.filetypes);
    rec.set_opt("max_files", opts.max_files);
    rec.finish()
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WorkflowButtonOpts {
    pub style: Option<String>,
    pub accessibility_label: Option<String>,
}

pub fn workflow_button(text: impl Into<TextArg>, workflow: Value, opts: WorkflowButtonOpts) -> Value {
    let mut rec = Record::tagged("workflow_button");
    rec.set("text", plain(text));
    rec.set("workflow", workflow);
    rec.set_opt("style", opts.style);
    rec.set_opt("accessibility_label", opts.accessibility_label);
    rec.finish()
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FeedbackButtonsOpts {
    pub action_id: Option<String>,
    pub positive_accessibility_label: Option<String>,
    pub negative_accessibility_label: Option<String>,
}

pub fn feedback_buttons(
    positive_text: &str,
    positive_value: &str,
    negative_text: &str,
    negative_value: &str,
    opts: FeedbackButtonsOpts,
) -> Value {
    let mut positive = Record::untagged();
    positive.set("text", plain(positive_text));
    positive.set("value", positive_value);
    positive.set_opt("accessibility_label", opts.positive_accessibility_label);

    let mut negative = Record::untagged();
    negative.set("text", plain(negative_text));
    negative.set("value", negative_value);
    negative.set_opt("accessibility_label", opts.negative_accessibility_label);

    let mut rec = Record::tagged("feedback_buttons");
    rec.set_opt("action_id", opts.action_id);
    rec.set("positive_button", positive.finish());
    rec.set("negative_button", negative.finish());
    rec.finish()
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IconButtonOpts {
    pub value: Option<String>,
    pub confirm: Option<Value>,
    pub accessibility_label: Option<String>,
    pub visible_to_user_ids: Option<Value>,
}

pub fn icon_button(icon: &str, text: impl Into<TextArg>, action_id: &str, opts: IconButtonOpts) -> Value {
    let mut rec = Record::tagged("icon_button");
    rec.set("icon", icon);
    rec.set("text", plain(text));
    rec.set("action_id", action_id);
    rec.set_opt("value", opts.value);
    rec.set_opt("confirm", opts.confirm);
    rec.set_opt("accessibility_label", opts.accessibility_label);
    rec.set_opt("visible_to_user_ids", opts.visible_to_user_ids);
    rec.finish()
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OptionOpts {
    pub description: Option<String>,
    pub url: Option<String>,
}

pub fn option(text: impl Into<TextArg>, value: &str, opts: OptionOpts) -> Value {
    let mut rec = Record::untagged();
    rec.set("text", plain(text));
    rec.set("value", value);
    rec.set_opt(
        "description",
        opts.description.map(|d| TextArg::Plain(d).into_plain_text()),
    );
    rec.set_opt("url", opts.url);
    rec.finish()
}

pub fn option_group(label: impl Into<TextArg>, options: Vec<Value>) -> Value {
    let mut rec = Record::untagged();
    rec.set("label", plain(label));
    rec.set("options", options);
    rec.finish()
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfirmDialogOpts {
    pub style: Option<String>,
}

/// Confirmation dialog. The body text renders as markdown; everything else
/// is plain text.
pub fn confirm_dialog(
    title: impl Into<TextArg>,
    text: impl Into<TextArg>,
    confirm: impl Into<TextArg>,
    deny: impl Into<TextArg>,
    opts: ConfirmDialogOpts,
) -> Value {
    let mut rec = Record::untagged();
    rec.set("title", plain(title));
    rec.set("text", text.into().into_mrkdwn());
    rec.set("confirm", plain(confirm));
    rec.set("deny", plain(deny));
    rec.set_opt("style", opts.style);
    rec.finish()
}

pub fn dispatch_action_config(trigger_actions_on: Vec<Value>) -> Value {
    let mut rec = Record::untagged();
    rec.set("trigger_actions_on", trigger_actions_on);
    rec.finish()
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FilterOpts {
    pub include: Option<Value>,
    pub exclude_external_shared_channels: Option<bool>,
    pub exclude_bot_users: Option<bool>,
}

pub fn filter(opts: FilterOpts) -> Value {
    let mut rec = Record::untagged();
    rec.set_opt("include", opts.include);
    rec.set_flag(
        "exclude_external_shared_channels",
        opts.exclude_external_shared_channels,
    );
    rec.set_flag("exclude_bot_users", opts.exclude_bot_users);
    rec.finish()
}
