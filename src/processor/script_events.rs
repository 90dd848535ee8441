//! Sparse script-event table: only events that name a script are written.

use crate::diagnostics::Diagnostics;
use crate::error::BuildResult;
use crate::model::ScriptEvent;
use crate::parser::Section;
use crate::writer::ContainerWriter;

/// Writes `count: u8` followed by `(code: u8, file: str16)` for every
/// candidate with a `ScriptEvent[<name>]` entry. Returns the count.
///
/// An empty candidate list still produces a zero count so that every
/// record keeps the same leading shape. A blank file name is an error and
/// the event is left out.
pub fn write_events(
    w: &mut ContainerWriter,
    section: &Section,
    candidates: &[ScriptEvent],
    diag: &mut Diagnostics,
) -> BuildResult<u8> {
    let count_at = w.reserve::<u8>();
    let mut count = 0u8;

    for event in candidates {
        let key = format!("ScriptEvent[{}]", event.key());
        if let Some(file) = section.get::<String>(&key)? {
            if file.is_empty() {
                diag.error(format_args!(
                    "[{}] {key}: script file name is empty",
                    section.name()
                ));
                continue;
            }
            w.put_u8(event.code());
            w.put_str(&file)?;
            count += 1;
        }
    }

    w.patch(count_at, count);
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Document;
    use crate::test_utils::Reader;

    fn encode(src: &str, candidates: &[ScriptEvent]) -> (Vec<u8>, Diagnostics) {
        let doc = Document::parse(src).unwrap();
        let section = doc.sections().next().unwrap();
        let mut diag = Diagnostics::new();
        let mut w = ContainerWriter::new();
        write_events(&mut w, section, candidates, &mut diag).unwrap();
        w.put_u8(0xEE); // marker for "next field"
        (w.into_bytes().unwrap(), diag)
    }

    #[test]
    fn test_only_declared_events_are_written() {
        let (bytes, diag) = encode(
            "[Door]\nScriptEvent[OnHit] = door_hit.cbt\nScriptEvent[OnTalk] = ignored.cbt\n",
            &[ScriptEvent::OnObserve, ScriptEvent::OnHit, ScriptEvent::OnManipulate],
        );
        assert_eq!(diag.errors(), 0);
        let mut r = Reader::new(&bytes);
        assert_eq!(
            r.events(),
            vec![(ScriptEvent::OnHit.code(), "door_hit.cbt".to_string())]
        );
        assert_eq!(r.u8(), 0xEE);
    }

    #[test]
    fn test_no_events_is_a_single_zero_byte() {
        let (bytes, _) = encode("[Roof]\nAnimation = roof\n", &[]);
        assert_eq!(bytes, vec![0, 0xEE]);

        let (bytes, _) = encode("[Floor]\nAnimation = grass\n", &[ScriptEvent::OnSetIn]);
        assert_eq!(bytes, vec![0, 0xEE]);
    }

    #[test]
    fn test_blank_script_file_is_reported_and_skipped() {
        let (bytes, diag) = encode(
            "[Door]\nScriptEvent[OnHit] =\nScriptEvent[OnObserve] = look.cbt\n",
            &[ScriptEvent::OnObserve, ScriptEvent::OnHit],
        );
        assert_eq!(diag.errors(), 1);
        let mut r = Reader::new(&bytes);
        assert_eq!(
            r.events(),
            vec![(ScriptEvent::OnObserve.code(), "look.cbt".to_string())]
        );
        assert_eq!(r.u8(), 0xEE);
    }
}
