//! Animation-template file: one record per `[Template]` section, indexed by
//! template name like the profile files.

use crate::diagnostics::{clamp_range, in_range};
use crate::error::{BuildError, BuildResult};
use crate::model::{
    FileKind, MAX_ANIM_FRAMES, MAX_ANIM_ORIENTATIONS, MAX_ANIM_STATES, MAX_FRAME_SIZE,
};
use crate::parser::{Alpha, Document, Section};
use crate::processor::Context;
use crate::writer::{Container, ContainerWriter};

const MAX_FPS: i64 = 60;

pub fn compile_anim_templates(doc: &Document, ctx: &mut Context) -> BuildResult<Vec<u8>> {
    let mut file = Container::begin(FileKind::AnimTemplates);
    for section in doc.sections() {
        file.mark(section.name())?;
        write_template(section, ctx, file.writer())?;
    }
    ctx.diag
        .note(format_args!("{} animation template(s) compiled", file.entries()));
    Ok(file.finish()?)
}

fn write_template(section: &Section, ctx: &mut Context, w: &mut ContainerWriter) -> BuildResult<()> {
    let texture: String = section.require("Texture")?;
    w.put_str(&texture)?;
    w.put_u16(require_in(section, "Frame.Width", 1, MAX_FRAME_SIZE)? as u16);
    w.put_u16(require_in(section, "Frame.Height", 1, MAX_FRAME_SIZE)? as u16);

    let fps: i64 = section.require("FPS")?;
    w.put_u8(clamp_range(ctx.diag, section.name(), "FPS", fps, 1, MAX_FPS) as u8);
    w.put_u8(section.get_or("Alpha", Alpha(u8::MAX))?.0);

    w.put_u8(require_in(section, "Orientations", 1, MAX_ANIM_ORIENTATIONS)? as u8);
    let states = require_in(section, "States", 1, MAX_ANIM_STATES)?;
    w.put_u8(states as u8);

    for state in 0..states {
        let frames = require_in(section, &format!("State[{state}].Frames"), 1, MAX_ANIM_FRAMES)?;
        w.put_u16(frames as u16);

        let key = format!("State[{state}].Next");
        let next = match section.get::<i64>(&key)? {
            Some(next) if !in_range(next, 0, states - 1) => {
                ctx.diag.error(format_args!(
                    "[{}] {key}: state {next} does not exist, looping on {state}",
                    section.name()
                ));
                state
            }
            Some(next) => next,
            None => state,
        };
        w.put_u8(next as u8);
    }
    Ok(())
}

/// Mandatory integer whose range is structural: anything outside is fatal.
fn require_in(section: &Section, key: &str, min: i64, max: i64) -> BuildResult<i64> {
    let value: i64 = section.require(key)?;
    if in_range(value, min, max) {
        Ok(value)
    } else {
        Err(BuildError::OutOfRange {
            section: section.name().to_string(),
            key: key.to_string(),
            value,
            min,
            max,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::Diagnostics;
    use crate::rules::RulesCatalogue;
    use crate::test_utils::Reader;

    fn compile(src: &str) -> (BuildResult<Vec<u8>>, Diagnostics) {
        let rules = RulesCatalogue::default();
        let doc = Document::parse(src).unwrap();
        let mut diag = Diagnostics::new();
        let mut ctx = Context {
            rules: &rules,
            diag: &mut diag,
        };
        let res = compile_anim_templates(&doc, &mut ctx);
        (res, diag)
    }

    const WALKER: &str = "
[Walker]
Texture = walker.png
Frame.Width = 64
Frame.Height = 96
FPS = 90
Orientations = 8
States = 2
State[0].Frames = 8
State[1].Frames = 4
State[1].Next = 0
";

    #[test]
    fn test_template_record() {
        let (res, diag) = compile(WALKER);
        let bytes = res.unwrap();
        assert_eq!((diag.warnings(), diag.errors()), (1, 0), "fps clamped");

        let index = Reader::new(&bytes).index();
        assert_eq!(index, vec![(8, "Walker".to_string())]);

        let mut r = Reader::at(&bytes, 8);
        assert_eq!(r.str(), "walker.png");
        assert_eq!((r.u16(), r.u16()), (64, 96));
        assert_eq!(r.u8(), 60);
        assert_eq!(r.u8(), 255, "opaque by default");
        assert_eq!((r.u8(), r.u8()), (8, 2));
        assert_eq!((r.u16(), r.u8()), (8, 0), "state 0 loops on itself");
        assert_eq!((r.u16(), r.u8()), (4, 0));
    }

    #[test]
    fn test_bad_next_state_falls_back() {
        let src = WALKER.replace("State[1].Next = 0", "State[1].Next = 7");
        let (res, diag) = compile(&src);
        let bytes = res.unwrap();
        assert_eq!(diag.errors(), 1);

        let mut r = Reader::at(&bytes, 8);
        r.str();
        for _ in 0..8 {
            r.u8();
        }
        r.u16();
        r.u8();
        assert_eq!((r.u16(), r.u8()), (4, 1));
    }

    #[test]
    fn test_structural_ranges_are_fatal() {
        let src = WALKER.replace("States = 2", "States = 0");
        assert!(matches!(compile(&src).0, Err(BuildError::OutOfRange { .. })));

        let src = WALKER.replace("State[1].Frames = 4", "State[1].Frames = 600");
        assert!(matches!(compile(&src).0, Err(BuildError::OutOfRange { .. })));

        let src = WALKER.replace("Texture = walker.png\n", "");
        assert!(matches!(compile(&src).0, Err(BuildError::Read(_))));
    }
}
