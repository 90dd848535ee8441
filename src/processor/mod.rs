//! The compilation pipeline.
//!
//! Files are compiled one at a time in a fixed order. Each binary is built
//! in memory and written out only once it is complete, so a fatal error
//! never leaves a half-written file behind it.
pub mod anim;
pub mod area;
pub mod profiles;
pub mod script_events;
pub mod validators;

use std::path::{Path, PathBuf};

use crate::diagnostics::Diagnostics;
use crate::error::{BuildError, BuildResult};
use crate::manifest::Manifest;
use crate::model::Family;
use crate::parser::Document;
use crate::rules::{Rules, RulesCatalogue};

/// State shared by every compiler for the length of one run.
pub struct Context<'a> {
    pub rules: &'a dyn Rules,
    pub diag: &'a mut Diagnostics,
}

/// What a finished run produced.
#[derive(Debug, Default)]
pub struct BuildReport {
    pub warnings: usize,
    pub errors: usize,
    pub files: Vec<PathBuf>,
}

impl BuildReport {
    pub fn success(&self) -> bool {
        self.errors == 0
    }
}

/// Runs every compiler and validator named by `manifest`.
///
/// `Err` means a fatal problem stopped the run; non-fatal ones are only
/// visible through the report's counters.
pub fn build(manifest: &Manifest, diag: &mut Diagnostics) -> BuildResult<BuildReport> {
    let rules = RulesCatalogue::load(&manifest.rules_path())?;
    let out_dir = manifest.output_dir();
    std::fs::create_dir_all(&out_dir).map_err(|e| BuildError::io(&out_dir, e))?;

    let mut ctx = Context {
        rules: &rules,
        diag,
    };
    let mut files = Vec::new();

    // 1. ── Animation templates ───────────────────────────────────────
    files.push(compile_file(
        manifest,
        &manifest.anim_templates,
        &mut ctx,
        anim::compile_anim_templates,
    )?);

    // 2. ── Profiles ──────────────────────────────────────────────────
    for family in Family::ALL {
        let source = manifest.profiles.get(family);
        files.push(compile_file(manifest, source, &mut ctx, |doc, ctx| {
            profiles::compile_profiles(family, doc, ctx)
        })?);
    }

    // 3. ── Areas ─────────────────────────────────────────────────────
    for source in &manifest.areas {
        files.push(compile_file(manifest, source, &mut ctx, area::compile_area)?);
    }

    // 4. ── Validators ────────────────────────────────────────────────
    let diag = ctx.diag;
    let doc = load(manifest, &manifest.interfaces)?;
    let interfaces = validators::validate_interfaces(&doc, diag);
    report_check(diag, "interfaces", interfaces.ok);

    let doc = load(manifest, &manifest.static_text)?;
    let ok = validators::validate_static_text(&doc, diag);
    report_check(diag, "static text", ok);

    let doc = load(manifest, &manifest.presentations)?;
    let menu_ref = interfaces.new_game_presentation.as_ref();
    let ok = validators::validate_presentations(&doc, menu_ref, diag);
    report_check(diag, "presentations", ok);

    let doc = load(manifest, &manifest.global_events)?;
    let ok = validators::validate_global_events(&doc, diag);
    report_check(diag, "global events", ok);

    let doc = load(manifest, &manifest.player_profile)?;
    let ok = validators::validate_player(&doc, diag);
    report_check(diag, "player profile", ok);

    Ok(BuildReport {
        warnings: diag.warnings(),
        errors: diag.errors(),
        files,
    })
}

fn load(manifest: &Manifest, file: &Path) -> BuildResult<Document> {
    let path = manifest.source(file);
    log::debug!("reading {}", path.display());
    Document::load(&path)
}

/// Load `file`, compile it with `compiler` and write the result.
fn compile_file<F>(
    manifest: &Manifest,
    file: &Path,
    ctx: &mut Context,
    compiler: F,
) -> BuildResult<PathBuf>
where
    F: FnOnce(&Document, &mut Context) -> BuildResult<Vec<u8>>,
{
    let doc = load(manifest, file)?;
    let bytes = compiler(&doc, ctx)?;
    let out = manifest.output_for(file)?;
    std::fs::write(&out, &bytes).map_err(|e| BuildError::io(&out, e))?;
    ctx.diag.note(format_args!(
        "{} -> {} ({} bytes)",
        file.display(),
        out.display(),
        bytes.len()
    ));
    Ok(out)
}

fn report_check(diag: &mut Diagnostics, what: &str, ok: bool) {
    if ok {
        diag.note(format_args!("{what}: ok"));
    } else {
        diag.note(format_args!("{what}: failed"));
    }
}
