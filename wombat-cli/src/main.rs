//! Wombat layout CLI
//!
//! A headless driver for testing and debugging flex layout: reads a JSON
//! scene (container style, item styles, simple block content), runs the
//! reflow loop until the engine stops requesting passes, and prints the
//! resulting geometry.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use owo_colors::OwoColorize;
use serde::Deserialize;
use wombat_layout::{
    BlockContent, ContainerStyle, FlexContainer, ItemStyle, LayoutInfo, NoPagination, SizeInput,
};

/// Command line arguments.
#[derive(Parser)]
#[command(name = "wombat", about = "Lay out a flex scene and print the geometry")]
struct Args {
    /// Path to the JSON scene file.
    scene: PathBuf,

    /// Available width of the containing block.
    #[arg(long, default_value_t = 800)]
    available_width: i32,

    /// Upper bound on reflow passes before giving up.
    #[arg(long, default_value_t = 8)]
    max_passes: u32,

    /// Print the final geometry as JSON instead of a table.
    #[arg(long)]
    json: bool,
}

/// One flex item of the scene.
#[derive(Deserialize)]
struct SceneItem {
    /// Pre-resolved item style.
    #[serde(default)]
    style: ItemStyle,
    /// Block content behind the item.
    content: BlockContent,
}

/// A flex container scene.
#[derive(Deserialize)]
struct Scene {
    /// Pre-resolved container style.
    #[serde(default)]
    container: ContainerStyle,
    /// The container's flex items, in logical order.
    items: Vec<SceneItem>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let text = fs::read_to_string(&args.scene)
        .with_context(|| format!("reading scene {}", args.scene.display()))?;
    let scene: Scene = serde_json::from_str(&text).context("parsing scene JSON")?;

    if scene.items.is_empty() {
        bail!("scene has no items");
    }

    let mut container = FlexContainer::new();
    for item in &scene.items {
        let _ = container.add_item(item.style.clone(), Box::new(item.content));
    }

    let input = SizeInput::block(args.available_width);
    let mut host = NoPagination::default();

    let mut passes = 0;
    let mut external_change = true;

    loop {
        passes += 1;
        if passes > args.max_passes {
            eprintln!("{}", "layout did not settle within the pass budget".yellow());
            break;
        }

        let mut info = LayoutInfo::new(&mut host);
        info.external_layout_change = external_change;
        external_change = false;

        let _ = container.compute_size(&scene.container, &input);
        let pass = container
            .layout(&scene.container, &input, &mut info)
            .context("layout pass failed")?;
        let finished = container
            .finish_layout(&scene.container, &input, &mut info, Some(pass))
            .context("finishing layout failed")?;

        if !finished.needs_reflow {
            break;
        }
    }

    if args.json {
        print_json(&container)?;
    } else {
        print_table(&container, passes);
    }

    Ok(())
}

fn print_json(container: &FlexContainer) -> Result<()> {
    let rects: Vec<_> = (0..container.items().len())
        .map(|i| container.item_border_rect(i))
        .collect();
    println!("{}", serde_json::to_string_pretty(&rects)?);
    Ok(())
}

fn print_table(container: &FlexContainer, passes: u32) {
    let (min_width, max_width) = container.min_max_width();

    println!("{}", "=== Container ===".bold());
    println!(
        "size {}x{}  min/max width {}/{}  min height {}  ({} passes)",
        container.width().green(),
        container.height().green(),
        min_width,
        max_width,
        container.min_height(),
        passes,
    );

    println!("\n{}", "=== Items (logical order) ===".bold());
    for i in 0..container.items().len() {
        let rect = container.item_border_rect(i);
        println!(
            "#{i}: x={} y={} w={} h={}",
            rect.x.cyan(),
            rect.y.cyan(),
            rect.width.green(),
            rect.height.green(),
        );
    }
}
