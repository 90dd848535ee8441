//! Read-only checks over the documents that produce no binary output.
//!
//! Every problem found here is counted through `Diagnostics` and the run
//! goes on; a validator's own result is "no error since it started".
//! Missing mandatory keys are therefore reported, not propagated.

use crate::diagnostics::{Diagnostics, in_range};
use crate::model::{
    MAX_AREA_HEIGHT, MAX_AREA_WIDTH, MAX_LEVEL, SCREEN_HEIGHT, SCREEN_WIDTH, ScriptEvent,
};
use crate::parser::{Alpha, Document, FromValue, Ident, Position, Rgb, Section};

pub const INTERFACE_SECTIONS: [&str; 5] = [
    "MainMenu",
    "MainInterface",
    "Console",
    "CombatInterface",
    "TradeInterface",
];

/// Keys the engine cannot start without.
pub const REQUIRED_TEXT: [&str; 6] = [
    "Title",
    "Menu.NewGame",
    "Menu.LoadGame",
    "Menu.SaveGame",
    "Menu.Exit",
    "Console.Welcome",
];

/// Keys with a usable built-in fallback.
pub const RECOMMENDED_TEXT: [&str; 4] = ["Version", "Credits", "Menu.Options", "Combat.Flee"];

const MAX_CONSOLE_LINES: i64 = 32;
const MAX_SLIDES: usize = 32;
const MAX_SLIDE_TIME: i64 = 60;

/// Outcome of the interface check, carrying the presentation the main menu
/// starts a new game with.
#[derive(Debug, Default)]
pub struct InterfaceCheck {
    pub ok: bool,
    pub new_game_presentation: Option<Ident>,
}

fn required<T: FromValue>(diag: &mut Diagnostics, section: &Section, key: &str) -> Option<T> {
    section.require(key).map_err(|e| diag.error(e)).ok()
}

fn optional<T: FromValue>(diag: &mut Diagnostics, section: &Section, key: &str) -> Option<T> {
    section.get(key).unwrap_or_else(|e| {
        diag.error(e);
        None
    })
}

fn section<'d>(diag: &mut Diagnostics, doc: &'d Document, name: &str) -> Option<&'d Section> {
    doc.require_section(name).map_err(|e| diag.error(e)).ok()
}

fn check_range(diag: &mut Diagnostics, section: &Section, key: &str, value: i64, min: i64, max: i64) {
    if !in_range(value, min, max) {
        diag.error(format_args!(
            "[{}] {key}: {value} is outside [{min}, {max}]",
            section.name()
        ));
    }
}

fn check_position(diag: &mut Diagnostics, section: &Section, key: &str, pos: Position, w: i64, h: i64) {
    let (x, y) = (i64::from(pos.x), i64::from(pos.y));
    if !in_range(x, 0, w - 1) || !in_range(y, 0, h - 1) {
        diag.error(format_args!(
            "[{}] {key}: ({x}, {y}) lies outside {w}x{h}",
            section.name()
        ));
    }
}

pub fn validate_interfaces(doc: &Document, diag: &mut Diagnostics) -> InterfaceCheck {
    let cp = diag.checkpoint();
    let mut new_game_presentation = None;

    for name in INTERFACE_SECTIONS {
        let Some(s) = section(diag, doc, name) else {
            continue;
        };
        if let Some(pos) = required::<Position>(diag, s, "Position") {
            let (w, h) = (i64::from(SCREEN_WIDTH), i64::from(SCREEN_HEIGHT));
            check_position(diag, s, "Position", pos, w, h);
        }
        optional::<Rgb>(diag, s, "Background");
        optional::<Alpha>(diag, s, "Alpha");

        match name {
            "Console" => {
                if let Some(lines) = required::<i64>(diag, s, "Lines") {
                    check_range(diag, s, "Lines", lines, 1, MAX_CONSOLE_LINES);
                }
            }
            "MainMenu" => {
                new_game_presentation = optional(diag, s, "Option.NewGame.Presentation");
            }
            _ => {}
        }
    }

    InterfaceCheck {
        ok: diag.clean_since(cp),
        new_game_presentation,
    }
}

pub fn validate_static_text(doc: &Document, diag: &mut Diagnostics) -> bool {
    let cp = diag.checkpoint();
    let Some(s) = section(diag, doc, "StaticText") else {
        return false;
    };

    for key in REQUIRED_TEXT {
        if !s.contains(key) {
            diag.error(format_args!("[StaticText] {key}: required text is missing"));
        }
    }
    for key in RECOMMENDED_TEXT {
        if !s.contains(key) {
            diag.warn(format_args!("[StaticText] {key}: text is missing, default used"));
        }
    }
    for (key, value) in s.entries() {
        if value.is_empty() {
            diag.error(format_args!("[StaticText] {key}: text is empty"));
        }
    }
    diag.clean_since(cp)
}

/// `menu_ref` is the presentation the main menu points at, if any.
pub fn validate_presentations(
    doc: &Document,
    menu_ref: Option<&Ident>,
    diag: &mut Diagnostics,
) -> bool {
    let cp = diag.checkpoint();

    for s in doc.sections() {
        let mut slides = 0;
        for i in 0..MAX_SLIDES {
            let base = format!("Slide[{i}]");
            if !s.has_prefix(&format!("{base}.")) {
                continue;
            }
            if required::<String>(diag, s, &format!("{base}.Texture")).is_some() {
                slides += 1;
            }
            let key = format!("{base}.Time");
            if let Some(time) = optional::<i64>(diag, s, &key) {
                check_range(diag, s, &key, time, 1, MAX_SLIDE_TIME);
            }
        }
        if slides == 0 {
            diag.error(format_args!("[{}] presentation has no slides", s.name()));
        }
        optional::<String>(diag, s, "Music");
    }

    if let Some(name) = menu_ref
        && doc.section(name.as_str()).is_none()
    {
        diag.error(format_args!(
            "presentation `{name}` used by the main menu is not declared"
        ));
    }
    diag.clean_since(cp)
}

pub fn validate_global_events(doc: &Document, diag: &mut Diagnostics) -> bool {
    let cp = diag.checkpoint();
    let Some(s) = section(diag, doc, "GlobalEvents") else {
        return false;
    };
    for event in ScriptEvent::GLOBAL {
        let key = format!("ScriptEvent[{}]", event.key());
        if optional::<String>(diag, s, &key).is_some_and(|file| file.is_empty()) {
            diag.error(format_args!("[GlobalEvents] {key}: script file name is empty"));
        }
    }
    diag.clean_since(cp)
}

pub fn validate_player(doc: &Document, diag: &mut Diagnostics) -> bool {
    let cp = diag.checkpoint();
    let Some(s) = section(diag, doc, "Player") else {
        return false;
    };
    required::<String>(diag, s, "Name");
    required::<Ident>(diag, s, "Criature");
    required::<Ident>(diag, s, "Area");
    if let Some(pos) = required::<Position>(diag, s, "Position") {
        check_position(diag, s, "Position", pos, MAX_AREA_WIDTH, MAX_AREA_HEIGHT);
    }
    if let Some(level) = required::<i64>(diag, s, "Level") {
        check_range(diag, s, "Level", level, 1, MAX_LEVEL);
    }
    diag.clean_since(cp)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(src: &str) -> Document {
        Document::parse(src).unwrap()
    }

    const INTERFACES: &str = "
[MainMenu]
Position = 0,0
Option.NewGame.Presentation = Intro

[MainInterface]
Position = 0,500
Background = 10,10,10
Alpha = 200

[Console]
Position = 10,520
Lines = 4

[CombatInterface]
Position = 600,0

[TradeInterface]
Position = 200,100
";

    #[test]
    fn interfaces_pass_and_report_menu_presentation() {
        let mut diag = Diagnostics::new();
        let check = validate_interfaces(&doc(INTERFACES), &mut diag);
        assert!(check.ok);
        assert_eq!(check.new_game_presentation, Some(Ident("Intro".into())));
    }

    #[test]
    fn interface_problems_are_counted() {
        let src = INTERFACES
            .replace("Lines = 4", "Lines = 40")
            .replace("Position = 600,0", "Position = 900,0")
            .replace("[TradeInterface]\nPosition = 200,100\n", "");
        let mut diag = Diagnostics::new();
        let check = validate_interfaces(&doc(&src), &mut diag);
        assert!(!check.ok);
        assert_eq!(diag.errors(), 3);
    }

    #[test]
    fn static_text_warnings_do_not_fail() {
        let src = "[StaticText]
Title = Dungeon
Menu.NewGame = New game
Menu.LoadGame = Load
Menu.SaveGame = Save
Menu.Exit = Exit
Console.Welcome = Welcome!
";
        let mut diag = Diagnostics::new();
        assert!(validate_static_text(&doc(src), &mut diag));
        assert_eq!(diag.warnings(), RECOMMENDED_TEXT.len());

        let broken = src.replace("Menu.Exit = Exit\n", "").replace("Dungeon", "\"\"");
        let mut diag = Diagnostics::new();
        assert!(!validate_static_text(&doc(&broken), &mut diag));
        assert_eq!(diag.errors(), 2);
    }

    #[test]
    fn presentations_check_slides_and_menu_reference() {
        let src = "
[Intro]
Slide[0].Texture = intro0.png
Slide[0].Time = 5
Slide[1].Texture = intro1.png
Music = intro.ogg

[Outro]
Slide[0].Texture = end.png
Slide[0].Time = 90
";
        let mut diag = Diagnostics::new();
        let intro = Ident("intro".into());
        assert!(!validate_presentations(&doc(src), Some(&intro), &mut diag));
        assert_eq!(diag.errors(), 1, "only the slide time");

        let mut diag = Diagnostics::new();
        let missing = Ident("Credits".into());
        let src = src.replace("90", "9");
        assert!(!validate_presentations(&doc(&src), Some(&missing), &mut diag));
        assert_eq!(diag.errors(), 1);

        let mut diag = Diagnostics::new();
        assert!(validate_presentations(&doc(&src), None, &mut diag));
    }

    #[test]
    fn empty_presentation_is_an_error() {
        let mut diag = Diagnostics::new();
        assert!(!validate_presentations(&doc("[Intro]\nMusic = a.ogg\n"), None, &mut diag));
    }

    #[test]
    fn global_events_need_the_section_and_file_names() {
        let mut diag = Diagnostics::new();
        assert!(!validate_global_events(&doc("[Other]\n"), &mut diag));

        let src = "[GlobalEvents]\nScriptEvent[OnStartGame] = start.cbt\nScriptEvent[OnNewHour] = \"\"\n";
        let mut diag = Diagnostics::new();
        assert!(!validate_global_events(&doc(src), &mut diag));
        assert_eq!(diag.errors(), 1);
    }

    #[test]
    fn player_profile_ranges() {
        let src = "[Player]
Name = Hero
Criature = hero
Area = village
Position = 12,30
Level = 1
";
        let mut diag = Diagnostics::new();
        assert!(validate_player(&doc(src), &mut diag));

        let bad = src.replace("Level = 1", "Level = 0").replace("12,30", "12,300");
        let mut diag = Diagnostics::new();
        assert!(!validate_player(&doc(&bad), &mut diag));
        assert_eq!(diag.errors(), 2);
    }
}
