//! Canvas Tool
//!
//! Command-line access to the template store, zone mapping, frame
//! auto-assignment and offline reconciliation. Settings come from the
//! `CANVAS_*` environment variables (see `canvas_oxide::config`); set
//! `RUST_LOG=debug` for detailed logs.
//!
//! Usage:
//!   canvas_tool templates
//!   canvas_tool save-template <id> <template.json>
//!   canvas_tool map <template-id> <elements.json> [--fit]
//!   canvas_tool assign <elements.json> [--frame <slug>]...
//!   canvas_tool reconcile <records.json> <filename>

use std::fs;
use std::path::Path;
use std::process;
use std::sync::Arc;

use canvas_oxide::extract::{ElementJsonExtractor, Extraction, Extractor};
use canvas_oxide::frames::{find_frame, target_frames, FrameAutoAssigner};
use canvas_oxide::geometry::CanvasTransform;
use canvas_oxide::layout::{observe_page_dims, PageDims};
use canvas_oxide::reconcile::{
    ExternalTextRecord, LocalSourceResolver, MemoryTextStore, ReconcileRequest, RecordFilter, SpatialReconciler,
    TextStore, TokenOverlap,
};
use canvas_oxide::zones::{FileTemplateStore, TemplateStore, ZoneMapper};
use canvas_oxide::{EngineConfig, Error, Result};

const USAGE: &str = "usage:
  canvas_tool templates
  canvas_tool save-template <id> <template.json>
  canvas_tool map <template-id> <elements.json> [--fit]
  canvas_tool assign <elements.json> [--frame <slug>]...
  canvas_tool reconcile <records.json> <filename>";

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if let Err(e) = run(&args) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(args: &[String]) -> Result<()> {
    let config = EngineConfig::from_env()?;
    let store = FileTemplateStore::new(&config.templates_dir);

    match args.first().map(String::as_str) {
        Some("templates") => {
            for summary in store.list_templates()? {
                println!("{}", summary.id);
            }
            Ok(())
        },
        Some("save-template") => {
            let (id, path) = two_args(args)?;
            let document = read_json(Path::new(path))?;
            let template = store.save_template_json(id, document)?;
            println!("Saved {} ({} zones)", id, template.zones.len());
            Ok(())
        },
        Some("map") => {
            let (template_id, path) = two_args(args)?;
            let fit = args.iter().any(|a| a == "--fit");
            map(&store, template_id, Path::new(path), fit)
        },
        Some("assign") => {
            let path = args.get(1).ok_or_else(usage_error)?;
            assign(Path::new(path), &frame_slugs(&args[2..]))
        },
        Some("reconcile") => {
            let (records_path, filename) = two_args(args)?;
            reconcile(&config, Path::new(records_path), filename)
        },
        _ => Err(usage_error()),
    }
}

fn map(store: &FileTemplateStore, template_id: &str, path: &Path, fit: bool) -> Result<()> {
    let template = store.load_template(template_id)?;
    let extraction = ElementJsonExtractor.extract(path)?;
    let page_dims = observe_page_dims(&extraction.blocks);
    let mapper = ZoneMapper::new(&template);

    let mapping = if fit {
        // calibrate on the first page, as a poster is a single sheet
        let first = page_dims.values().next().copied().unwrap_or_else(PageDims::unit);
        let transform =
            CanvasTransform::fit_to_canonical(first.w, first.h, template.canonical_width, template.canonical_height);
        let heights = page_dims.iter().map(|(page, dims)| (*page, dims.h)).collect();
        mapper.map_canonical(&extraction.blocks, &transform, &heights)
    } else {
        mapper.map_to_zones(&extraction.blocks, &page_dims)
    };
    print_json(&mapping)
}

fn assign(path: &Path, slugs: &[&str]) -> Result<()> {
    let extraction: Extraction = ElementJsonExtractor.extract(path)?;
    let frames = if slugs.is_empty() {
        target_frames()
    } else {
        slugs
            .iter()
            .map(|slug| {
                find_frame(slug).ok_or_else(|| Error::NotFound {
                    kind: "frame",
                    id: slug.to_string(),
                })
            })
            .collect::<Result<Vec<_>>>()?
    };
    let assignments = FrameAutoAssigner::new().assign_frames(&frames, &extraction.blocks);
    print_json(&assignments)
}

fn reconcile(config: &EngineConfig, records_path: &Path, filename: &str) -> Result<()> {
    let records: Vec<ExternalTextRecord> = serde_json::from_value(read_json(records_path)?)?;
    let store = Arc::new(MemoryTextStore::with_records(records));
    let reconciler = SpatialReconciler::new(
        Arc::new(ElementJsonExtractor),
        store.clone(),
        Arc::new(LocalSourceResolver::new(&config.source_cache_dir)),
    )
    .with_similarity(Box::new(TokenOverlap::new(config.normalizer())))
    .with_config(config.reconciler_config());

    let report = reconciler.reconcile(&ReconcileRequest::by_filename(filename))?;
    print_json(&report)?;

    let filter = RecordFilter {
        file_id: None,
        filename: Some(filename.to_string()),
        limit: usize::MAX,
    };
    print_json(&store.fetch_records(&filter)?)
}

fn frame_slugs(args: &[String]) -> Vec<&str> {
    let mut slugs = Vec::new();
    let mut i = 0;
    while i < args.len() {
        if args[i] == "--frame" {
            if let Some(slug) = args.get(i + 1) {
                slugs.push(slug.as_str());
            }
            i += 1;
        }
        i += 1;
    }
    slugs
}

fn two_args(args: &[String]) -> Result<(&str, &str)> {
    match (args.get(1), args.get(2)) {
        (Some(a), Some(b)) => Ok((a.as_str(), b.as_str())),
        _ => Err(usage_error()),
    }
}

fn read_json(path: &Path) -> Result<serde_json::Value> {
    let text = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn usage_error() -> Error {
    Error::Config(USAGE.to_string())
}
