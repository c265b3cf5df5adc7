//! Template compilation: pure string composition wrapping the author's
//! source with a fixed preamble/postamble so the result is independently
//! evaluable and yields the built structure.

use std::fmt;
use std::str::FromStr;

/// Declared output format of a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    SlackMessage,
    SlackModal,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::SlackMessage => "slack_message",
            OutputFormat::SlackModal => "slack_modal",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "slack_message" | "message" | "blocks" => Ok(OutputFormat::SlackMessage),
            "slack_modal" | "modal" => Ok(OutputFormat::SlackModal),
            other => Err(format!("unknown output format: {}", other)),
        }
    }
}

const BLOCKS_PREAMBLE: &str = "%builder blocks\n%fallback context\n";
const MODAL_PREAMBLE: &str = "%builder modal\n%fallback context\n";
const BLOCKS_POSTAMBLE: &str = "%yield blocks\n";
const MODAL_POSTAMBLE: &str = "%yield modal\n";

/// Lines both preambles occupy in augmented source. `compile` normalizes
/// the source to end with exactly one newline and introduces no wrapper
/// lines of its own, so this constant is the whole line offset. Author
/// line 1 lands on augmented line `PREAMBLE_LINES + 1`.
pub const PREAMBLE_LINES: usize = 2;

/// Lines the postamble appends after the author's last line.
pub const POSTAMBLE_LINES: usize = 1;

/// Chooses between the Blocks and Modal compilation variants. Both share
/// the same offset geometry; only preamble/postamble content differs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    Blocks,
    Modal,
}

#[derive(Debug, Clone, Copy)]
pub struct Compiler {
    variant: Variant,
}

impl Compiler {
    /// Variant dispatch: modal templates get the modal preamble, everything
    /// else (including undeclared formats) compiles as blocks.
    pub fn for_format(format: Option<OutputFormat>) -> Self {
        match format {
            Some(OutputFormat::SlackModal) => Compiler { variant: Variant::Modal },
            _ => Compiler { variant: Variant::Blocks },
        }
    }

    pub fn blocks() -> Self {
        Compiler { variant: Variant::Blocks }
    }

    pub fn modal() -> Self {
        Compiler { variant: Variant::Modal }
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    /// Format to assume when a template does not declare one.
    pub fn default_format() -> OutputFormat {
        OutputFormat::SlackMessage
    }

    /// This core manages text-encoding concerns itself.
    pub fn handles_encoding() -> bool {
        true
    }

    pub fn preamble(&self) -> &'static str {
        match self.variant {
            Variant::Blocks => BLOCKS_PREAMBLE,
            Variant::Modal => MODAL_PREAMBLE,
        }
    }

    pub fn postamble(&self) -> &'static str {
        match self.variant {
            Variant::Blocks => BLOCKS_POSTAMBLE,
            Variant::Modal => MODAL_POSTAMBLE,
        }
    }

    /// Produce augmented source: preamble + original source + postamble.
    /// Deterministic string assembly; no evaluation happens here.
    pub fn compile(&self, source: &str) -> String {
        format!(
            "{}{}\n{}",
            self.preamble(),
            source.trim_end_matches('\n'),
            self.postamble()
        )
    }
}
