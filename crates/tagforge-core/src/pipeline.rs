use crate::config::PipelineConfig;
use crate::merge::merge_namespace;
use crate::patches::aggregate_patches;
use crate::source::load_base;
use crate::CoreError;
use chrono::Utc;
use serde::Serialize;
use std::path::PathBuf;
use tagforge_schema::{
    AmiiboLite, AmiiboRecord, Namespace, SkylanderLite, SkylanderRecord, TagRecord,
};
use tagforge_store::{
    copy_tree, list_tree, to_canonical_bytes, ArtifactKind, ArtifactWriter, AssetLedger,
    BuildManifest, DistLayout, PublishedArtifact, StoreError,
};
use tracing::{debug, info, warn};

/// Every record of every namespace, with all declared fields present.
#[derive(Serialize)]
struct FullDistribution<'a> {
    amiibo: &'a [AmiiboRecord],
    skylanders: &'a [SkylanderRecord],
}

#[derive(Serialize)]
struct LiteDistribution {
    amiibo: Vec<AmiiboLite>,
    skylanders: Vec<SkylanderLite>,
}

/// Outcome of a successful build.
#[derive(Debug, Clone, Serialize)]
pub struct BuildReport {
    pub full: PublishedArtifact,
    pub lite: PublishedArtifact,
    pub manifest: BuildManifest,
    pub amiibo_records: usize,
    pub skylander_records: usize,
    pub patch_files: usize,
    pub image_sources: usize,
    pub images_copied: usize,
    pub image_collisions: usize,
}

#[derive(Debug, Default)]
struct AssetSummary {
    sources: usize,
    copied: usize,
    collisions: usize,
}

/// Runs the merge, validate, normalize, serialize, and publish sequence.
///
/// Each step runs to completion before the next starts and the first error
/// aborts the run. Individual output files are replaced atomically, but the
/// set of outputs is not: a failure after the first publish can leave some
/// files from the new build next to files from an older one.
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn run(&self) -> Result<BuildReport, CoreError> {
        info!(
            "building catalog from {} into {}",
            self.config.resources_dir.display(),
            self.config.dist_dir.display()
        );
        let layout = DistLayout::new(&self.config.dist_dir);
        layout.initialize()?;

        let amiibo_base = load_base(
            Namespace::Amiibo,
            &self.config.base_path(Namespace::Amiibo),
            self.config.source(Namespace::Amiibo).shape,
        )?;
        let skylander_base = load_base(
            Namespace::Skylanders,
            &self.config.base_path(Namespace::Skylanders),
            self.config.source(Namespace::Skylanders).shape,
        )?;

        let mut patches = aggregate_patches(&self.config.patches_dir())?;

        let mut amiibo: Vec<AmiiboRecord> =
            merge_namespace(amiibo_base.entries, patches.take(Namespace::Amiibo))?;
        let mut skylanders: Vec<SkylanderRecord> =
            merge_namespace(skylander_base.entries, patches.take(Namespace::Skylanders))?;
        debug!(
            "merged {} amiibo and {} skylander record(s)",
            amiibo.len(),
            skylanders.len()
        );

        normalize_images(&mut amiibo);
        normalize_images(&mut skylanders);

        let assets = self.publish_assets(&layout, &patches.image_dirs)?;

        let full_bytes = to_canonical_bytes(&FullDistribution {
            amiibo: &amiibo,
            skylanders: &skylanders,
        })?;
        let lite_bytes = to_canonical_bytes(&LiteDistribution {
            amiibo: amiibo.iter().map(AmiiboRecord::lite).collect(),
            skylanders: skylanders.iter().map(SkylanderRecord::lite).collect(),
        })?;

        let writer = ArtifactWriter::new(layout.clone(), &self.config.stem);
        let full = writer.publish(ArtifactKind::Full, &full_bytes)?;
        let lite = writer.publish(ArtifactKind::Lite, &lite_bytes)?;

        let manifest = BuildManifest::new(full.digest.clone(), lite.digest.clone(), Utc::now());
        manifest.write(&layout)?;

        info!(
            "published full {} and lite {} to {}",
            full.digest.short(),
            lite.digest.short(),
            layout.root().display()
        );

        Ok(BuildReport {
            full,
            lite,
            manifest,
            amiibo_records: amiibo.len(),
            skylander_records: skylanders.len(),
            patch_files: patches.files.len(),
            image_sources: assets.sources,
            images_copied: assets.copied,
            image_collisions: assets.collisions,
        })
    }

    /// Copy the base image tree, then every patch image tree, into the
    /// distribution. Later sources overwrite earlier ones; each overwrite is
    /// reported, or fails the build when `strict_assets` is set.
    fn publish_assets(
        &self,
        layout: &DistLayout,
        patch_image_dirs: &[PathBuf],
    ) -> Result<AssetSummary, CoreError> {
        let mut sources = vec![self.config.base_images_dir()];
        sources.extend(patch_image_dirs.iter().cloned());

        let mut ledger = AssetLedger::new();
        let mut summary = AssetSummary {
            sources: sources.len(),
            ..AssetSummary::default()
        };

        for src in &sources {
            for file in list_tree(src).map_err(unreadable_source)? {
                let Some(previous) = ledger.claim(src, &file) else {
                    continue;
                };
                if self.config.strict_assets {
                    return Err(CoreError::AssetCollision {
                        relative: file.relative,
                        previous: previous.display().to_string(),
                        current: src.display().to_string(),
                    });
                }
                warn!(
                    "images/{} from {} overwrites the copy from {}",
                    file.relative,
                    src.display(),
                    previous.display()
                );
                summary.collisions += 1;
            }
        }

        let images_dir = layout.images_dir();
        for src in &sources {
            summary.copied += copy_tree(src, &images_dir)?.len();
        }
        Ok(summary)
    }
}

// Image sources are build inputs, so failing to walk one is an input error.
fn unreadable_source(err: StoreError) -> CoreError {
    match err {
        StoreError::Walk { path, reason } => CoreError::UnreadableInput { path, reason },
        other => CoreError::Store(other),
    }
}

fn normalize_images<R: TagRecord>(records: &mut [R]) {
    for record in records {
        record.normalize_image();
    }
}
