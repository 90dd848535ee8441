// numeric constants shared by the builder and the runtime loader
pub const FORMAT_MAJOR: u8 = 1;
pub const FORMAT_MINOR: u8 = 0;

pub const MAX_AREA_WIDTH: i64 = 256;
pub const MAX_AREA_HEIGHT: i64 = 256;

pub const MAX_ROOMS: usize = 255;
pub const MAX_CONTAINER_ITEMS: usize = 255;
pub const MAX_ELEVATION: i64 = 128;
pub const MAX_LIGHT: i64 = 255;

pub const MAX_FLOOR_ATTRIBUTES: usize = 4;
pub const MAX_WALL_ATTRIBUTES: usize = 4;
pub const MAX_SCENE_OBJ_ATTRIBUTES: usize = 8;
pub const MAX_ROOF_ATTRIBUTES: usize = 4;
pub const MAX_ITEM_GLOBAL_ATTRIBUTES: usize = 8;
pub const MAX_ITEM_LOCAL_ATTRIBUTES: usize = 8;
pub const MAX_EXTENDED_ATTRIBUTES: usize = 16;
pub const MAX_HABILITIES: usize = 8;
pub const MAX_SYMPTOMS: usize = 16;
pub const MAX_EQUIPMENT_SLOTS: usize = 16;

pub const MAX_RANGE: i64 = 16;
pub const MAX_LEVEL: i64 = 255;

pub const MAX_ANIM_ORIENTATIONS: i64 = 8;
pub const MAX_ANIM_STATES: i64 = 16;
pub const MAX_ANIM_FRAMES: i64 = 512;
pub const MAX_FRAME_SIZE: i64 = 1024;

pub const SCREEN_WIDTH: i32 = 800;
pub const SCREEN_HEIGHT: i32 = 600;

/// Byte code stored first in every compiled file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum FileKind {
    AnimTemplates = 0x01,
    Floor = 0x02,
    Wall = 0x03,
    SceneObj = 0x04,
    Item = 0x05,
    Criature = 0x06,
    Roof = 0x07,
    Area = 0x08,
}

/// The six entity profile families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Family {
    Floor,
    Wall,
    SceneObj,
    Item,
    Criature,
    Roof,
}

impl Family {
    /// Compilation order used by the orchestrator.
    pub const ALL: [Family; 6] = [
        Family::Floor,
        Family::Wall,
        Family::SceneObj,
        Family::Item,
        Family::Criature,
        Family::Roof,
    ];

    pub fn file_kind(self) -> FileKind {
        match self {
            Family::Floor => FileKind::Floor,
            Family::Wall => FileKind::Wall,
            Family::SceneObj => FileKind::SceneObj,
            Family::Item => FileKind::Item,
            Family::Criature => FileKind::Criature,
            Family::Roof => FileKind::Roof,
        }
    }

    pub fn default_policy(self) -> OffscreenPolicy {
        match self {
            Family::Criature => OffscreenPolicy::Silence,
            _ => OffscreenPolicy::Pause,
        }
    }

    /// Size of the (local) attribute block written for every profile.
    pub fn max_attributes(self) -> usize {
        match self {
            Family::Floor => MAX_FLOOR_ATTRIBUTES,
            Family::Wall => MAX_WALL_ATTRIBUTES,
            Family::SceneObj => MAX_SCENE_OBJ_ATTRIBUTES,
            Family::Item => MAX_ITEM_LOCAL_ATTRIBUTES,
            Family::Criature => MAX_EXTENDED_ATTRIBUTES,
            Family::Roof => MAX_ROOF_ATTRIBUTES,
        }
    }

    /// Whether profiles of this family carry a class scoped by their type.
    pub fn has_class(self) -> bool {
        matches!(self, Family::SceneObj | Family::Item | Family::Criature)
    }

    pub fn script_events(self) -> &'static [ScriptEvent] {
        use ScriptEvent::*;
        match self {
            Family::Floor => &[OnSetIn, OnSetOut, OnObserve],
            Family::Wall => &[OnObserve, OnHit, OnManipulate],
            Family::SceneObj => &[OnObserve, OnHit, OnManipulate, OnInsert, OnRemove],
            Family::Item => &[
                OnObserve,
                OnGet,
                OnDrop,
                OnUse,
                OnEquipped,
                OnUnequipped,
                OnHit,
                OnManipulate,
            ],
            Family::Criature => &[
                OnObserve,
                OnTalk,
                OnManipulate,
                OnDeath,
                OnResurrect,
                OnHit,
                OnInsert,
                OnRemove,
                OnStartCombatTurn,
                OnCriatureInRange,
                OnCriatureOutOfRange,
                OnActivatedSymptom,
                OnDeactivatedSymptom,
            ],
            Family::Roof => &[],
        }
    }
}

impl std::fmt::Display for Family {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Family::Floor => "floor",
            Family::Wall => "wall",
            Family::SceneObj => "scene object",
            Family::Item => "item",
            Family::Criature => "criature",
            Family::Roof => "roof",
        };
        f.write_str(s)
    }
}

/// What the runtime does with an entity's animation while it is off screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OffscreenPolicy {
    Pause = 0,
    Silence = 1,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum WallOrientation {
    SouthWest = 0,
    Front = 1,
    SouthEast = 2,
}

impl WallOrientation {
    pub const ALL: [WallOrientation; 3] = [
        WallOrientation::SouthWest,
        WallOrientation::Front,
        WallOrientation::SouthEast,
    ];

    pub fn key(self) -> &'static str {
        match self {
            WallOrientation::SouthWest => "SouthWest",
            WallOrientation::Front => "Front",
            WallOrientation::SouthEast => "SouthEast",
        }
    }
}

/// Script events a profile or the game itself may bind a script file to.
/// The discriminant is the code written to disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ScriptEvent {
    OnSetIn = 0,
    OnSetOut,
    OnObserve,
    OnTalk,
    OnManipulate,
    OnDeath,
    OnResurrect,
    OnInsert,
    OnRemove,
    OnGet,
    OnDrop,
    OnUse,
    OnEquipped,
    OnUnequipped,
    OnHit,
    OnStartCombatTurn,
    OnCriatureInRange,
    OnCriatureOutOfRange,
    OnActivatedSymptom,
    OnDeactivatedSymptom,
    // global events
    OnStartGame,
    OnClickHourPanel,
    OnFleeCombat,
    OnKeyPressed,
    OnStartCombatMode,
    OnEndCombatMode,
    OnNewHour,
    OnEnterInArea,
    OnWorldIdle,
}

impl ScriptEvent {
    pub const GLOBAL: &'static [ScriptEvent] = &[
        ScriptEvent::OnStartGame,
        ScriptEvent::OnClickHourPanel,
        ScriptEvent::OnFleeCombat,
        ScriptEvent::OnKeyPressed,
        ScriptEvent::OnStartCombatMode,
        ScriptEvent::OnEndCombatMode,
        ScriptEvent::OnNewHour,
        ScriptEvent::OnEnterInArea,
        ScriptEvent::OnWorldIdle,
    ];

    pub fn code(self) -> u8 {
        self as u8
    }

    /// Symbolic key name used inside `ScriptEvent[...]`.
    pub fn key(self) -> &'static str {
        use ScriptEvent::*;
        match self {
            OnSetIn => "OnSetIn",
            OnSetOut => "OnSetOut",
            OnObserve => "OnObserve",
            OnTalk => "OnTalk",
            OnManipulate => "OnManipulate",
            OnDeath => "OnDeath",
            OnResurrect => "OnResurrect",
            OnInsert => "OnInsert",
            OnRemove => "OnRemove",
            OnGet => "OnGet",
            OnDrop => "OnDrop",
            OnUse => "OnUse",
            OnEquipped => "OnEquipped",
            OnUnequipped => "OnUnequipped",
            OnHit => "OnHit",
            OnStartCombatTurn => "OnStartCombatTurn",
            OnCriatureInRange => "OnCriatureInRange",
            OnCriatureOutOfRange => "OnCriatureOutOfRange",
            OnActivatedSymptom => "OnActivatedSymptom",
            OnDeactivatedSymptom => "OnDeactivatedSymptom",
            OnStartGame => "OnStartGame",
            OnClickHourPanel => "OnClickHourPanel",
            OnFleeCombat => "OnFleeCombat",
            OnKeyPressed => "OnKeyPressed",
            OnStartCombatMode => "OnStartCombatMode",
            OnEndCombatMode => "OnEndCombatMode",
            OnNewHour => "OnNewHour",
            OnEnterInArea => "OnEnterInArea",
            OnWorldIdle => "OnWorldIdle",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roof_declares_no_events() {
        assert!(Family::Roof.script_events().is_empty());
    }

    #[test]
    fn only_criatures_default_to_silence() {
        for family in Family::ALL {
            let expected = if family == Family::Criature {
                OffscreenPolicy::Silence
            } else {
                OffscreenPolicy::Pause
            };
            assert_eq!(family.default_policy(), expected, "{family}");
        }
    }

    #[test]
    fn event_codes_follow_declaration_order() {
        assert_eq!(ScriptEvent::OnSetIn.code(), 0);
        assert_eq!(ScriptEvent::OnObserve.code(), 2);
        assert_eq!(ScriptEvent::OnWorldIdle.code(), 28);
    }
}
