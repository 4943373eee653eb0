use std::io;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use is_terminal::IsTerminal;
use tracing::{debug, info};

use meow_playground::bridge::{ExecutionBridge, ReadinessPolicy};
use meow_playground::catalog::{self, EXAMPLES};
use meow_playground::cli::{Cli, ConsentAction};
use meow_playground::config::Config;
use meow_playground::consent::{AnalyticsSink, ConsentBanner, ConsentStore, DataLayer, FileConsentStore};
use meow_playground::engine;
use meow_playground::logging::{self, LogTarget};
use meow_playground::printer::{MarkdownPrinter, OutcomePrinter};
use meow_playground::share;
use meow_playground::tui::{self, app::App};
use meow_playground::utils;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    let mut cfg = Config::load();
    if let Some(module) = args.module.as_deref() {
        cfg.set("MEOW_MODULE", module);
    }
    if args.require_ready {
        cfg.set("MEOW_READINESS", "require");
    }

    let filter = if args.verbose { "debug".to_string() } else { cfg.log_filter() };
    let interactive = args.is_interactive();
    let log_path = cfg.log_path();
    let target = if interactive { LogTarget::File(&log_path) } else { LogTarget::Stderr };
    logging::init(&filter, target)?;
    debug!(config = %cfg.config_path.display(), "configuration loaded");

    if args.list_examples {
        for ex in EXAMPLES {
            println!("{}", ex.name);
        }
        return Ok(());
    }

    if let Some(name) = &args.show_example {
        let example = catalog::find_loose(name).ok_or_else(|| anyhow!("no example named '{}'", name))?;
        if io::stdout().is_terminal() {
            MarkdownPrinter::default().print_example(example);
        } else {
            print!("{}", example.code);
        }
        return Ok(());
    }

    if let Some(file) = &args.share {
        let source = utils::read_source(file)?;
        println!("{}", share::share_url(&cfg.playground_url(), &source));
        return Ok(());
    }

    if let Some(action) = args.consent {
        return consent_command(&cfg, action);
    }

    if let Some(link) = args.open.as_deref().filter(|_| !interactive) {
        let source = share::decode_fragment(link).context("invalid share link")?;
        print!("{}", source);
        return Ok(());
    }

    if interactive {
        return interactive_command(&cfg, args.open.as_deref()).await;
    }

    let source = if let Some(file) = &args.run {
        utils::read_source(file)?
    } else if let Some(name) = &args.example {
        catalog::find_loose(name)
            .ok_or_else(|| anyhow!("no example named '{}'", name))?
            .code
            .to_string()
    } else {
        bail!("nothing to do");
    };

    run_once(&cfg, &source, !args.no_color && io::stderr().is_terminal()).await
}

async fn run_once(cfg: &Config, source: &str, color: bool) -> Result<()> {
    let loader = Arc::new(engine::loader_from_config(cfg)?);
    // The engine loads up front, as on screen start, so RequireReady runs too.
    loader.ensure_ready().await.context("engine failed to load")?;

    let bridge = ExecutionBridge::new(loader, cfg.readiness(), cfg.run_defer());
    let outcome = bridge.run(source).await?;
    OutcomePrinter { color }.print(&outcome);

    if outcome.failed {
        std::process::exit(1);
    }
    Ok(())
}

async fn interactive_command(cfg: &Config, link: Option<&str>) -> Result<()> {
    let loader = Arc::new(engine::loader_from_config(cfg)?);
    let policy = cfg.readiness();
    let bridge = ExecutionBridge::new(loader, policy, cfg.run_defer());

    let banner = consent_banner(cfg);
    let app = App::new(
        share::initial_source(link),
        banner,
        cfg.playground_url(),
        policy == ReadinessPolicy::EnsureReady,
    );
    info!(module = %cfg.module(), "starting playground");
    tui::run_playground(app, bridge).await
}

fn consent_banner(cfg: &Config) -> ConsentBanner {
    let store: Arc<dyn ConsentStore> = Arc::new(FileConsentStore::new(&cfg.consent_path()));
    let sink: Arc<dyn AnalyticsSink> = Arc::new(DataLayer::new());
    ConsentBanner::new(store, sink, cfg.do_not_track())
}

fn consent_command(cfg: &Config, action: ConsentAction) -> Result<()> {
    if cfg.do_not_track() {
        println!("consent: denied (DO_NOT_TRACK is set, nothing stored)");
        return Ok(());
    }

    let mut banner = consent_banner(cfg);
    banner.initialize();
    match action {
        ConsentAction::Accept => banner.accept(),
        ConsentAction::Reject => banner.reject(),
        ConsentAction::Status => {}
    }

    let state = banner.state().as_stored().unwrap_or("unset");
    println!("consent: {}", state);
    Ok(())
}
