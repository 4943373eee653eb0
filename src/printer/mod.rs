//! Printers for the non-interactive commands: outcomes and examples.

use owo_colors::OwoColorize;
use termimad::MadSkin;

use crate::bridge::RenderedOutcome;
use crate::catalog::Example;

pub struct OutcomePrinter {
    pub color: bool,
}

impl OutcomePrinter {
    pub fn print(&self, outcome: &RenderedOutcome) {
        let text = outcome.text.trim_end_matches('\n');
        if text.is_empty() {
            return;
        }
        // Any failed run goes to stderr, partial output included.
        if self.color && outcome.failed {
            eprintln!("{}", text.red());
        } else if outcome.failed {
            eprintln!("{}", text);
        } else {
            println!("{}", text);
        }
    }
}

pub struct MarkdownPrinter {
    pub skin: MadSkin,
}

impl Default for MarkdownPrinter {
    fn default() -> Self {
        Self { skin: MadSkin::default() }
    }
}

impl MarkdownPrinter {
    pub fn print(&self, text: &str) {
        self.skin.print_text(text);
        println!();
    }

    pub fn print_example(&self, example: &Example) {
        self.print(&example_markdown(example));
    }
}

pub fn example_markdown(example: &Example) -> String {
    format!("## {}\n\n```\n{}\n```\n", example.name, example.code)
}
