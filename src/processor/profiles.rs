//! Entity profile compiler, shared by all six families.
//!
//! Every record starts with the same prefix (animation reference,
//! offscreen policy, script events, display name); the rest is a
//! family-specific [`ProfileBody`]. Attribute blocks are always padded to
//! the family maximum so records of one family have a fixed shape.

use crate::diagnostics::{Diagnostics, clamp_range, in_range};
use crate::error::{BuildError, BuildResult};
use crate::model::{Family, MAX_LEVEL, MAX_RANGE, OffscreenPolicy, WallOrientation};
use crate::model::{MAX_EXTENDED_ATTRIBUTES, MAX_HABILITIES, MAX_ITEM_GLOBAL_ATTRIBUTES, MAX_SYMPTOMS};
use crate::parser::{Document, Ident, Section};
use crate::processor::Context;
use crate::processor::script_events::write_events;
use crate::rules::{Category, resolve};
use crate::writer::bin::Field;
use crate::writer::{Container, ContainerWriter};

#[derive(Debug, Clone, PartialEq)]
pub struct TypedBody {
    pub ty: u8,
    pub attributes: Vec<i16>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WallBody {
    pub ty: u8,
    pub attributes: Vec<i16>,
    pub orientation: WallOrientation,
    pub interactive: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SceneObjBody {
    pub ty: u8,
    pub class: u8,
    pub attributes: Vec<i16>,
    pub container: bool,
    pub interactive: bool,
    pub accessible_floor: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ItemBody {
    pub ty: u8,
    pub class: u8,
    pub global: Vec<i16>,
    pub local: Vec<i16>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CriatureBody {
    pub ty: u8,
    pub class: u8,
    pub level: u16,
    pub experience: u32,
    pub action_points: u8,
    pub health: (i16, i16),
    pub extended: Vec<(i16, i16)>,
    pub habilities: Vec<bool>,
    pub symptoms: Vec<bool>,
    pub range: u8,
    pub transparent: bool,
    pub run: bool,
    pub ghost_movement: bool,
    pub accessible_floor: bool,
}

/// Family-specific tail of a profile record.
#[derive(Debug, Clone, PartialEq)]
pub enum ProfileBody {
    Floor(TypedBody),
    Wall(WallBody),
    SceneObj(SceneObjBody),
    Item(ItemBody),
    Criature(CriatureBody),
    Roof(TypedBody),
}

impl ProfileBody {
    pub fn read(family: Family, section: &Section, ctx: &mut Context) -> BuildResult<Self> {
        let ty = read_code(section, ctx, Category::Type(family), "Type")?;
        let class = if family.has_class() {
            read_code(section, ctx, Category::Class(family, ty), "Class")?
        } else {
            0
        };
        // criatures keep their numbers in the extended attribute block instead
        let attributes = match family {
            Family::Criature => Vec::new(),
            Family::Item => read_attributes(
                section,
                ctx,
                Category::Attribute(family, ty),
                "LocalAttribute",
                family.max_attributes(),
            )?,
            _ => read_attributes(
                section,
                ctx,
                Category::Attribute(family, ty),
                "Attribute",
                family.max_attributes(),
            )?,
        };

        Ok(match family {
            Family::Floor => ProfileBody::Floor(TypedBody { ty, attributes }),
            Family::Roof => ProfileBody::Roof(TypedBody { ty, attributes }),
            Family::Wall => ProfileBody::Wall(WallBody {
                ty,
                attributes,
                orientation: read_orientation(section)?,
                interactive: section.get_or("Interactive", false)?,
            }),
            Family::SceneObj => ProfileBody::SceneObj(SceneObjBody {
                ty,
                class,
                attributes,
                container: ctx.rules.is_container(ty),
                interactive: section.get_or("Interactive", true)?,
                accessible_floor: section.get_or("AccessibleFloor", false)?,
            }),
            Family::Item => ProfileBody::Item(ItemBody {
                ty,
                class,
                global: read_attributes(
                    section,
                    ctx,
                    Category::ItemGlobalAttribute,
                    "GlobalAttribute",
                    MAX_ITEM_GLOBAL_ATTRIBUTES,
                )?,
                local: attributes,
            }),
            Family::Criature => ProfileBody::Criature(read_criature(section, ctx, ty, class)?),
        })
    }

    pub fn write(&self, w: &mut ContainerWriter) {
        match self {
            ProfileBody::Floor(b) | ProfileBody::Roof(b) => {
                w.put_u8(b.ty);
                put_all(w, &b.attributes);
            }
            ProfileBody::Wall(b) => {
                w.put_u8(b.ty);
                put_all(w, &b.attributes);
                w.put_u8(b.orientation as u8);
                w.put_bool(b.interactive);
            }
            ProfileBody::SceneObj(b) => {
                w.put_u8(b.ty);
                w.put_u8(b.class);
                put_all(w, &b.attributes);
                w.put_bool(b.container);
                w.put_bool(b.interactive);
                w.put_bool(b.accessible_floor);
            }
            ProfileBody::Item(b) => {
                w.put_u8(b.ty);
                w.put_u8(b.class);
                put_all(w, &b.global);
                put_all(w, &b.local);
            }
            ProfileBody::Criature(b) => {
                w.put_u8(b.ty);
                w.put_u8(b.class);
                w.put_u16(b.level);
                w.put_u32(b.experience);
                w.put_u8(b.action_points);
                w.put_i16(b.health.0);
                w.put_i16(b.health.1);
                for (base, temp) in &b.extended {
                    w.put_i16(*base);
                    w.put_i16(*temp);
                }
                put_all(w, &b.habilities);
                put_all(w, &b.symptoms);
                w.put_u8(b.range);
                w.put_bool(b.transparent);
                w.put_bool(b.run);
                w.put_bool(b.ghost_movement);
                w.put_bool(b.accessible_floor);
            }
        }
    }
}

fn put_all<T: Field>(w: &mut ContainerWriter, values: &[T]) {
    for v in values {
        w.put(*v);
    }
}

/// Compile every section of `doc` as a profile of `family`.
pub fn compile_profiles(family: Family, doc: &Document, ctx: &mut Context) -> BuildResult<Vec<u8>> {
    let mut file = Container::begin(family.file_kind());

    for section in doc.sections() {
        file.mark(section.name())?;
        write_prefix(family, section, ctx.diag, file.writer())?;
        let body = ProfileBody::read(family, section, ctx)?;
        body.write(file.writer());
    }

    let count = file.entries();
    ctx.diag.note(format_args!("{count} {family} profile(s) compiled"));
    Ok(file.finish()?)
}

fn write_prefix(
    family: Family,
    section: &Section,
    diag: &mut Diagnostics,
    w: &mut ContainerWriter,
) -> BuildResult<()> {
    let anim: Ident = section.require("Animation")?;
    w.put_str(anim.as_str())?;
    // state and orientation are established by the runtime
    w.put_u8(0);
    w.put_u8(0);
    w.put_u8(read_policy(family, section)? as u8);
    write_events(w, section, family.script_events(), diag)?;
    let name: String = section.require("Name")?;
    w.put_str(&name)?;
    Ok(())
}

fn read_policy(family: Family, section: &Section) -> BuildResult<OffscreenPolicy> {
    let pause = section.get_or("Offscreen.Pause", false)?;
    let silence = section.get_or("Offscreen.Silence", false)?;
    match (pause, silence) {
        (true, true) => Err(BuildError::ConflictingFlags {
            section: section.name().to_string(),
            first: "Offscreen.Pause".into(),
            second: "Offscreen.Silence".into(),
        }),
        (true, false) => Ok(OffscreenPolicy::Pause),
        (false, true) => Ok(OffscreenPolicy::Silence),
        (false, false) => Ok(family.default_policy()),
    }
}

fn read_orientation(section: &Section) -> BuildResult<WallOrientation> {
    let mut found = None;
    for orientation in WallOrientation::ALL {
        let key = format!("Orientation.{}", orientation.key());
        if section.get_or(&key, false)? {
            if found.is_some() {
                return Err(BuildError::Orientation {
                    section: section.name().to_string(),
                });
            }
            found = Some(orientation);
        }
    }
    found.ok_or_else(|| BuildError::Orientation {
        section: section.name().to_string(),
    })
}

fn read_code(section: &Section, ctx: &Context, category: Category, key: &str) -> BuildResult<u8> {
    let name: Ident = section.require(key)?;
    resolve(ctx.rules, category, section.name(), key, name.as_str())
}

/// One value per registered name, zero-padded up to `max`.
fn read_attributes(
    section: &Section,
    ctx: &mut Context,
    category: Category,
    prefix: &str,
    max: usize,
) -> BuildResult<Vec<i16>> {
    let rules = ctx.rules;
    let mut out = vec![0i16; max];
    for (i, slot) in out.iter_mut().enumerate() {
        let Some(name) = rules.name_of(category, i) else {
            break;
        };
        let key = format!("{prefix}[{name}]");
        *slot = read_i16(section, ctx, &key, 0)?;
    }
    Ok(out)
}

fn read_i16(section: &Section, ctx: &mut Context, key: &str, default: i64) -> BuildResult<i16> {
    let value = section.get_or(key, default)?;
    let value = clamp_range(
        ctx.diag,
        section.name(),
        key,
        value,
        i16::MIN as i64,
        i16::MAX as i64,
    );
    Ok(value as i16)
}

fn read_clamped(
    section: &Section,
    ctx: &mut Context,
    key: &str,
    default: i64,
    min: i64,
    max: i64,
) -> BuildResult<i64> {
    let value = section.get_or(key, default)?;
    Ok(clamp_range(ctx.diag, section.name(), key, value, min, max))
}

fn read_flags(
    section: &Section,
    ctx: &Context,
    category: Category,
    prefix: &str,
    max: usize,
) -> BuildResult<Vec<bool>> {
    let mut out = vec![false; max];
    for (i, slot) in out.iter_mut().enumerate() {
        let Some(name) = ctx.rules.name_of(category, i) else {
            break;
        };
        *slot = section.get_or(&format!("{prefix}[{name}]"), false)?;
    }
    Ok(out)
}

fn read_criature(section: &Section, ctx: &mut Context, ty: u8, class: u8) -> BuildResult<CriatureBody> {
    let level = read_clamped(section, ctx, "Level", 1, 1, MAX_LEVEL)? as u16;
    let experience = read_clamped(section, ctx, "Experience", 0, 0, u32::MAX as i64)? as u32;
    let action_points = read_clamped(section, ctx, "ActionPoints", 0, 0, u8::MAX as i64)? as u8;
    let health = (
        read_i16(section, ctx, "Health.Base", 1)?,
        read_i16(section, ctx, "Health.Temp", 0)?,
    );

    let rules = ctx.rules;
    let mut extended = vec![(0i16, 0i16); MAX_EXTENDED_ATTRIBUTES];
    for (i, slot) in extended.iter_mut().enumerate() {
        let Some(name) = rules.name_of(Category::ExtendedAttribute, i) else {
            break;
        };
        *slot = (
            read_i16(section, ctx, &format!("ExtendedAttribute[{name}].Base"), 0)?,
            read_i16(section, ctx, &format!("ExtendedAttribute[{name}].Temp"), 0)?,
        );
    }

    let habilities = read_flags(section, ctx, Category::Hability, "Hability", MAX_HABILITIES)?;
    let symptoms = read_flags(section, ctx, Category::Symptom, "Symptom", MAX_SYMPTOMS)?;

    let range = section.get_or("Range", 0i64)?;
    if !in_range(range, 0, MAX_RANGE) {
        return Err(BuildError::OutOfRange {
            section: section.name().to_string(),
            key: "Range".into(),
            value: range,
            min: 0,
            max: MAX_RANGE,
        });
    }

    Ok(CriatureBody {
        ty,
        class,
        level,
        experience,
        action_points,
        health,
        extended,
        habilities,
        symptoms,
        range: range as u8,
        transparent: section.get_or("Transparent", false)?,
        run: section.get_or("Run", true)?,
        ghost_movement: section.get_or("GhostMovement", false)?,
        accessible_floor: section.get_or("AccessibleFloor", false)?,
    })
}
