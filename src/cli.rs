use clap::{ArgGroup, Parser, ValueEnum};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ConsentAction {
    Accept,
    Reject,
    Status,
}

#[derive(Parser, Debug, Clone)]
#[command(name = "meowpg", about = "Meow playground", version)]
#[command(group(ArgGroup::new("mode").args(["run", "example", "list_examples", "show_example", "share", "consent"]).multiple(false)))]
pub struct Cli {
    /// Run a .nyan file once and print the result ("-" reads stdin).
    #[arg(long, value_name = "FILE")]
    pub run: Option<String>,

    /// Run one of the built-in examples by name.
    #[arg(long, value_name = "NAME")]
    pub example: Option<String>,

    /// List the built-in examples.
    #[arg(short = 'l', long = "list-examples")]
    pub list_examples: bool,

    /// Print a built-in example as Markdown.
    #[arg(long = "show-example", value_name = "NAME")]
    pub show_example: Option<String>,

    /// Print a share link for a .nyan file ("-" reads stdin).
    #[arg(long, value_name = "FILE")]
    pub share: Option<String>,

    /// Decode a share link (URL or #code= fragment).
    ///
    /// Prints the source, or opens it in the playground together with --tui.
    #[arg(long, value_name = "LINK", conflicts_with = "mode")]
    pub open: Option<String>,

    /// Start the interactive playground (default when no other mode is given).
    #[arg(long, conflicts_with = "mode")]
    pub tui: bool,

    /// Record or show the analytics consent choice.
    #[arg(long, value_enum)]
    pub consent: Option<ConsentAction>,

    /// Engine path or URL (overrides MEOW_MODULE).
    #[arg(long, value_name = "PATH_OR_URL")]
    pub module: Option<String>,

    /// Only run once the engine has finished loading; never trigger the load from a run.
    #[arg(long = "require-ready")]
    pub require_ready: bool,

    /// Disable colored output.
    #[arg(long = "no-color")]
    pub no_color: bool,

    /// Log at debug level.
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    pub fn is_interactive(&self) -> bool {
        self.tui
            || (self.run.is_none()
                && self.example.is_none()
                && !self.list_examples
                && self.show_example.is_none()
                && self.share.is_none()
                && self.open.is_none()
                && self.consent.is_none())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_interactive() {
        let cli = Cli::try_parse_from(["meowpg"]).unwrap();
        assert!(cli.is_interactive());
    }

    #[test]
    fn test_run_is_not_interactive() {
        let cli = Cli::try_parse_from(["meowpg", "--run", "fib.nyan", "--module", "/opt/meow"]).unwrap();
        assert!(!cli.is_interactive());
        assert_eq!(cli.module.as_deref(), Some("/opt/meow"));
    }

    #[test]
    fn test_open_with_tui() {
        let cli = Cli::try_parse_from(["meowpg", "--open", "#code=eA==", "--tui"]).unwrap();
        assert!(cli.is_interactive());
    }

    #[test]
    fn test_modes_conflict() {
        assert!(Cli::try_parse_from(["meowpg", "--run", "a.nyan", "--share", "a.nyan"]).is_err());
    }

    #[test]
    fn test_open_and_tui_conflict_with_modes() {
        assert!(Cli::try_parse_from(["meowpg", "--open", "#code=eA==", "--run", "f.nyan"]).is_err());
        assert!(Cli::try_parse_from(["meowpg", "--tui", "--run", "f.nyan"]).is_err());
        assert!(Cli::try_parse_from(["meowpg", "--tui", "--list-examples"]).is_err());
    }

    #[test]
    fn test_consent_values() {
        let cli = Cli::try_parse_from(["meowpg", "--consent", "reject"]).unwrap();
        assert_eq!(cli.consent, Some(ConsentAction::Reject));
    }
}
