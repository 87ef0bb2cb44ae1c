use anyhow::{Result, bail};
use tracing::{info, warn};

use super::inventory::{discover_sources, file_name_of};
use super::output::{write_json_stdout, write_lines_stdout};
use crate::cli::RouteArgs;
use crate::config::ExtractorConfig;
use crate::pipeline::ClassificationPipeline;

pub fn run(args: RouteArgs) -> Result<()> {
    let mut filenames = args.filenames.clone();
    if let Some(source_dir) = &args.source_dir {
        for path in discover_sources(source_dir)? {
            filenames.push(file_name_of(&path)?);
        }
    }

    if filenames.is_empty() {
        bail!("no filenames given; pass filenames or --source-dir");
    }

    let pipeline = ClassificationPipeline::from_config(&ExtractorConfig::default())?;
    let routes = pipeline
        .classifier()
        .route_batch(filenames.iter().map(String::as_str));

    let recognized = routes.values().filter(|plan| plan.is_some()).count();
    info!(
        filenames = routes.len(),
        recognized,
        unrecognized = routes.len() - recognized,
        "routing completed"
    );

    if args.json {
        return write_json_stdout(&routes);
    }

    let mut lines = Vec::with_capacity(routes.len());
    for (filename, plan) in &routes {
        match plan {
            Some(plan) => lines.push(format!(
                "{filename}\t{}\t{}\t[{}]\t{}",
                plan.category,
                plan.processor_kind.as_str(),
                plan.extractors.join(", "),
                plan.description
            )),
            None => {
                warn!(filename = %filename, "no document category matched");
                lines.push(format!("{filename}\tunrecognized"));
            }
        }
    }

    write_lines_stdout(lines)
}
