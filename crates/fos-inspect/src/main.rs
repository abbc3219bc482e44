//! fOS Inspect - Main Entry Point
//!
//! Loads a page fixture and reports element visibility. With `--watch` it
//! runs a threshold monitor on one element while replaying the fixture's
//! timeline in virtual time.

mod fixture;

use std::path::PathBuf;
use std::rc::Rc;

use anyhow::{bail, Context, Result};
use fos_visibility::{EventLoop, EveryOptions, Visibility, VisibilityConfig};
use serde_json::json;
use tracing_subscriber::EnvFilter;

use crate::fixture::{apply_action, LoadedPage, PageFixture};

const USAGE: &str = "usage: fos-inspect <fixture.json> [--config <config.json>] [--watch <element-id>] [--threshold <0..1>] [--duration <ms>]";

#[derive(Debug, Clone, PartialEq)]
struct Args {
    fixture: PathBuf,
    config: Option<PathBuf>,
    watch: Option<String>,
    threshold: f64,
    duration_ms: u64,
}

impl Args {
    fn parse(mut args: impl Iterator<Item = String>) -> Result<Self> {
        let mut fixture = None;
        let mut config = None;
        let mut watch = None;
        let mut threshold = 0.5;
        let mut duration_ms = 1000;

        while let Some(arg) = args.next() {
            let mut value = |flag: &str| args.next().with_context(|| format!("{} needs a value\n{}", flag, USAGE));
            match arg.as_str() {
                "--config" => config = Some(PathBuf::from(value("--config")?)),
                "--watch" => watch = Some(value("--watch")?),
                "--threshold" => {
                    threshold = value("--threshold")?.parse().context("--threshold must be a number")?
                }
                "--duration" => {
                    duration_ms = value("--duration")?.parse().context("--duration must be milliseconds")?
                }
                "-h" | "--help" => bail!("{}", USAGE),
                flag if flag.starts_with("--") => bail!("unknown option {}\n{}", flag, USAGE),
                path if fixture.is_none() => fixture = Some(PathBuf::from(path)),
                extra => bail!("unexpected argument {}\n{}", extra, USAGE),
            }
        }

        Ok(Self {
            fixture: fixture.context(USAGE)?,
            config,
            watch,
            threshold,
            duration_ms,
        })
    }
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse(std::env::args().skip(1))?;

    let config = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            VisibilityConfig::from_json(&text)?
        }
        None => VisibilityConfig::default(),
    };

    let fixture = PageFixture::load(&args.fixture)?;
    let loaded = fixture.build()?;
    let page = Rc::clone(&loaded.page);
    let visibility = Rc::new(Visibility::with_config(Rc::clone(&page), page.page_visibility(), config)?);

    tracing::info!("Loaded {} ({} elements with ids)", args.fixture.display(), loaded.ids.len());
    println!("{}", json!({ "capabilities": visibility.capabilities() }));

    match &args.watch {
        None => report(&visibility, &loaded),
        Some(id) => watch(&visibility, &loaded, &fixture, id, &args),
    }
}

/// One JSON line per element with an id
fn report(visibility: &Visibility<fos_visibility::Page>, loaded: &LoadedPage) -> Result<()> {
    for (id, node) in &loaded.ids {
        let reading = visibility.reading(*node);
        println!("{}", json!({ "id": id, "state": reading.state(), "reading": reading }));
    }
    Ok(())
}

/// Run `every` on one element while replaying the timeline
fn watch(
    visibility: &Rc<Visibility<fos_visibility::Page>>,
    loaded: &LoadedPage,
    fixture: &PageFixture,
    id: &str,
    args: &Args,
) -> Result<()> {
    let target = loaded.lookup(id).with_context(|| format!("no element with id {:?}", id))?;
    let event_loop = Rc::new(EventLoop::new());
    let monitor = visibility
        .create_monitor(target, Rc::clone(&event_loop))
        .with_event_source(loaded.page.clone());

    let clock = Rc::clone(&event_loop);
    monitor.on(move |event| {
        println!("{}", json!({ "t": clock.current_time(), "monitor": event }));
    });

    let watched = id.to_string();
    let options = EveryOptions::new(args.threshold, args.duration_ms, move |reading| {
        tracing::info!("{} stayed {:.0}% visible", watched, reading.percentage * 100.0);
    })
    .fire_immediately(true);
    monitor.every(options)?;

    for step in fixture.sorted_timeline() {
        if !monitor.is_running() {
            break;
        }
        let now = event_loop.current_time();
        event_loop.advance(step.at_ms.saturating_sub(now));
        tracing::debug!("t={}ms {:?}", step.at_ms, step.action);
        apply_action(loaded, &step.action)?;
    }

    // give the condition one full window after the last step
    let deadline = event_loop.current_time() + args.duration_ms + monitor.interval_ms();
    while monitor.is_running() && event_loop.current_time() < deadline {
        event_loop.advance(monitor.interval_ms());
    }

    if monitor.is_running() {
        tracing::info!("Threshold not reached by t={}ms", event_loop.current_time());
        monitor.stop();
    }
    Ok(())
}
