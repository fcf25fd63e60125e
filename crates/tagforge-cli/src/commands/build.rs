use super::{json_pretty, spin_fail, spin_ok, spinner, Failure, EXIT_SUCCESS};
use console::style;
use std::path::Path;
use tagforge_core::{Pipeline, PipelineConfig};

pub fn run(
    workdir: &Path,
    config_path: Option<&Path>,
    strict_assets: bool,
    json: bool,
) -> Result<u8, Failure> {
    let mut config = match config_path {
        Some(path) => PipelineConfig::load(path)?,
        None => PipelineConfig::discover(workdir)?,
    };
    if strict_assets {
        config.strict_assets = true;
    }

    let pb = if json {
        None
    } else {
        Some(spinner("building catalog..."))
    };

    let report = match Pipeline::new(config).run() {
        Ok(r) => {
            if let Some(ref pb) = pb {
                spin_ok(pb, "catalog built");
            }
            r
        }
        Err(e) => {
            if let Some(ref pb) = pb {
                spin_fail(pb, "build failed");
            }
            return Err(e.into());
        }
    };

    if json {
        println!("{}", json_pretty(&report)?);
    } else {
        println!(
            "{} amiibo, {} skylanders ({} patch file(s))",
            report.amiibo_records, report.skylander_records, report.patch_files
        );
        for artifact in [&report.full, &report.lite] {
            println!(
                "{:<5} {}  {}",
                artifact.kind.to_string(),
                style(artifact.digest.short()).cyan(),
                artifact.versioned_path.display()
            );
        }
        println!(
            "images: {} copied from {} source(s)",
            report.images_copied, report.image_sources
        );
        if report.image_collisions > 0 {
            println!(
                "{}",
                style(format!(
                    "{} image path(s) overwritten by a later source",
                    report.image_collisions
                ))
                .yellow()
            );
        }
        println!("last updated: {}", report.manifest.last_updated);
    }
    Ok(EXIT_SUCCESS)
}
