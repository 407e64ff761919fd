use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use chromovis_core::source::das::parse_das_features;
use chromovis_core::svg::render_svg;
use chromovis_core::{ChromosomeView, SelectionRegistry, ViewConfig, ViewState};

const USAGE: &str = "Usage: chromovis <segment.json> [--config view.json] [--select BAND|START-END]... [--commands]";

struct Args {
    segment: PathBuf,
    config: Option<PathBuf>,
    selections: Vec<String>,
    commands: bool,
}

fn parse_args() -> Result<Args> {
    let mut args = std::env::args().skip(1);
    let mut segment = None;
    let mut config = None;
    let mut selections = Vec::new();
    let mut commands = false;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => config = Some(PathBuf::from(args.next().context("--config needs a path")?)),
            "--select" => selections.push(args.next().context("--select needs a band or range")?),
            "--commands" => commands = true,
            "-h" | "--help" => {
                eprintln!("{USAGE}");
                std::process::exit(0);
            }
            _ if segment.is_none() => segment = Some(PathBuf::from(arg)),
            _ => bail!("unexpected argument {arg:?}\n{USAGE}"),
        }
    }

    let Some(segment) = segment else {
        eprintln!("{USAGE}");
        std::process::exit(1);
    };
    Ok(Args {
        segment,
        config,
        selections,
        commands,
    })
}

fn main() -> Result<()> {
    env_logger::init();
    let args = parse_args()?;

    let data = std::fs::read(&args.segment)
        .with_context(|| format!("reading {}", args.segment.display()))?;
    let model = parse_das_features(&data)?;

    let config = match &args.config {
        Some(path) => ViewConfig::from_json(&std::fs::read_to_string(path)?)?,
        None => ViewConfig::new(model.id.clone(), format!("chr{}", model.id)),
    };

    let registry = SelectionRegistry::new();
    let mut view = ChromosomeView::new(config, registry.clone())?;
    // Inherit has no container to measure here.
    view.resize(1000.0);
    let ticket = view.begin_load()?;
    view.complete_load(ticket, Ok(model));
    if view.state() != ViewState::Rendered {
        bail!("segment could not be displayed");
    }

    for selection in &args.selections {
        select(&mut view, selection)?;
    }
    log::info!("{} selectors", registry.len());

    let commands = view.render();
    let mut out = std::io::stdout().lock();
    if args.commands {
        serde_json::to_writer_pretty(&mut out, &commands)?;
        writeln!(out)?;
    } else {
        let svg = render_svg(&commands, view.canvas_width(), view.canvas_height());
        writeln!(out, "{svg}")?;
    }
    Ok(())
}

/// Seed a selection by band name (`q21.1`) or by base-pair range
/// (`16400001-24000000`).
fn select(view: &mut ChromosomeView, arg: &str) -> Result<()> {
    let range = arg
        .split_once('-')
        .and_then(|(a, b)| Some((a.trim().parse::<u64>().ok()?, b.trim().parse::<u64>().ok()?)));

    let index = match range {
        Some((start, end)) => view
            .layout()
            .geometries
            .iter()
            .find(|g| g.start_bp <= start.max(end) && g.end_bp >= start.min(end))
            .map(|g| g.index),
        None => view
            .layout()
            .geometries
            .iter()
            .find(|g| g.id == arg)
            .map(|g| g.index),
    };
    let Some(index) = index else {
        bail!("no band matches {arg:?}");
    };

    let Some(created) = view.click(index).and_then(|c| c.created) else {
        log::warn!("selection {arg:?} refused in single mode");
        return Ok(());
    };
    if let Some((start, end)) = range {
        let id = created.borrow().id();
        view.move_selector(id, start as f64, end as f64)?;
    }
    Ok(())
}
