//! Area compiler: one binary file per playable map.
//!
//! The grid is sparse: only cells with a `[Cell[x,y]]` section are
//! written, each behind a five-flag presence array that is patched once
//! the whole cell is known.

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::diagnostics::{Diagnostics, clamp_range, in_range};
use crate::error::{BuildError, BuildResult};
use crate::model::{
    FileKind, MAX_AREA_HEIGHT, MAX_AREA_WIDTH, MAX_CONTAINER_ITEMS, MAX_ELEVATION, MAX_LIGHT,
    MAX_ROOMS, WallOrientation,
};
use crate::parser::{Document, Ident, Rgb, Section};
use crate::processor::Context;
use crate::rules::Category;
use crate::writer::{Container, ContainerWriter};

const FLOOR: usize = 0;
const ROOF: usize = 1;
const SCENE_OBJ: usize = 2;
const CRIATURE: usize = 3;
const WALL: usize = 4;

/// Tags claimed so far in the area being compiled.
#[derive(Debug, Default)]
pub struct TagRegistry {
    seen: HashSet<String>,
}

impl TagRegistry {
    /// Register `tag`; a duplicate is reported but not fatal.
    pub fn claim(&mut self, diag: &mut Diagnostics, section: &str, key: &str, tag: &Ident) -> bool {
        if self.seen.insert(tag.folded()) {
            return true;
        }
        diag.error(format_args!("[{section}] {key}: tag `{tag}` is already in use"));
        false
    }
}

/// Per-area state, dropped when the area file is done.
#[derive(Debug, Default)]
struct AreaState {
    tags: TagRegistry,
    rooms: HashMap<String, u8>,
}

pub fn cell_name(x: u16, y: u16) -> String {
    format!("Cell[{x},{y}]")
}

fn parse_cell_name(name: &str) -> Option<(i64, i64)> {
    let lower = name.to_ascii_lowercase();
    let inner = lower.strip_prefix("cell[")?.strip_suffix(']')?;
    let (x, y) = inner.split_once(',')?;
    Some((x.trim().parse().ok()?, y.trim().parse().ok()?))
}

/// The bracketed part of every `<prefix>[...]` key, once each, in source order.
fn bracket_indices<'s>(section: &'s Section, prefix: &str) -> Vec<&'s str> {
    let open = format!("{prefix}[");
    let mut found: Vec<&str> = Vec::new();
    for (key, _) in section.entries() {
        let matches = key
            .get(..open.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(&open));
        if !matches {
            continue;
        }
        let rest = &key[open.len()..];
        let index = rest.split_once(']').map_or(rest, |(index, _)| index);
        if !found.contains(&index) {
            found.push(index);
        }
    }
    found
}

/// `Some(i)` only for a plain decimal index below `max`.
fn numeric_index(raw: &str, max: usize) -> Option<usize> {
    let index: usize = raw.parse().ok()?;
    (index < max && index.to_string() == raw).then_some(index)
}

/// Valid numeric indices of `<prefix>[i]` keys, ascending; anything else is
/// reported as an error.
fn read_indices(
    section: &Section,
    prefix: &str,
    max: usize,
    diag: &mut Diagnostics,
) -> Vec<usize> {
    let mut indices = Vec::new();
    for raw in bracket_indices(section, prefix) {
        match numeric_index(raw, max) {
            Some(index) => indices.push(index),
            None => diag.error(format_args!(
                "[{}] {prefix}[{raw}]: index must be between 0 and {}, ignored",
                section.name(),
                max - 1
            )),
        }
    }
    indices.sort_unstable();
    indices
}

pub fn compile_area(doc: &Document, ctx: &mut Context) -> BuildResult<Vec<u8>> {
    let area = doc.require_section("Area")?;
    let name: String = area.require("Name")?;
    let width = read_dimension(area, "Width", MAX_AREA_WIDTH)?;
    let height = read_dimension(area, "Height", MAX_AREA_HEIGHT)?;
    let ambient: Rgb = area.get_or("Light.Ambient", Rgb::default())?;

    let mut file = Container::begin(FileKind::Area);
    let w = file.writer();
    w.put_str(&name)?;
    w.put_u16(width);
    w.put_u16(height);
    w.put_u8(ambient.r);
    w.put_u8(ambient.g);
    w.put_u8(ambient.b);

    let mut state = AreaState {
        tags: TagRegistry::default(),
        rooms: read_rooms(doc, ctx.diag)?,
    };
    w.put_u8(state.rooms.len() as u8);

    // keyed (y, x) so cells come out row by row
    let mut cells: BTreeMap<(u16, u16), &Section> = BTreeMap::new();
    for section in doc.sections() {
        match parse_cell_name(section.name()) {
            Some((x, y)) if x >= 0 && y >= 0 && x < width as i64 && y < height as i64 => {
                let (x, y) = (x as u16, y as u16);
                if let Some(first) = cells.get(&(y, x)) {
                    ctx.diag.error(format_args!(
                        "[{}] is the same cell as [{}], ignored",
                        section.name(),
                        first.name()
                    ));
                } else {
                    cells.insert((y, x), section);
                }
            }
            Some(_) => ctx
                .diag
                .warn(format_args!("[{}] is outside area `{name}`, ignored", section.name())),
            None if ["area", "rooms"].contains(&section.name().to_ascii_lowercase().as_str()) => {}
            None => ctx
                .diag
                .warn(format_args!("[{}] is not part of area `{name}`, ignored", section.name())),
        }
    }

    for (&(y, x), cell) in &cells {
        file.mark(&cell_name(x, y))?;
        write_cell(x, y, cell, ctx, &mut state, file.writer())?;
    }

    let populated = file.entries();
    let total = width as usize * height as usize;
    ctx.diag
        .note(format_args!("area `{name}`: {populated} of {total} cells populated"));
    Ok(file.finish()?)
}

fn read_dimension(area: &Section, key: &str, max: i64) -> BuildResult<u16> {
    let value: i64 = area.require(key)?;
    if !in_range(value, 1, max) {
        return Err(BuildError::OutOfRange {
            section: area.name().to_string(),
            key: key.to_string(),
            value,
            min: 1,
            max,
        });
    }
    Ok(value as u16)
}

/// Room names → 1-based ids; 0 means "no room".
fn read_rooms(doc: &Document, diag: &mut Diagnostics) -> BuildResult<HashMap<String, u8>> {
    let mut rooms = HashMap::new();
    let Some(section) = doc.section("Rooms") else {
        return Ok(rooms);
    };
    for i in read_indices(section, "Room", MAX_ROOMS, diag) {
        let key = format!("Room[{i}]");
        let Some(room) = section.get::<Ident>(&key)? else {
            continue;
        };
        if rooms.contains_key(&room.folded()) {
            diag.error(format_args!("[Rooms] {key}: room `{room}` declared twice"));
            continue;
        }
        let id = rooms.len() as u8 + 1;
        rooms.insert(room.folded(), id);
    }
    Ok(rooms)
}

fn write_cell(
    x: u16,
    y: u16,
    cell: &Section,
    ctx: &mut Context,
    state: &mut AreaState,
    w: &mut ContainerWriter,
) -> BuildResult<()> {
    w.put_u16(x);
    w.put_u16(y);
    let presence_at = w.reserve::<[bool; 5]>();
    let mut presence = [false; 5];

    write_floor(cell, ctx, state, w)?;
    presence[FLOOR] = true;
    presence[ROOF] = write_roof(cell, ctx, w)?;
    presence[SCENE_OBJ] = write_scene_obj(cell, ctx, state, w)?;
    if presence[SCENE_OBJ] {
        if cell.contains("Criature.Profile") {
            ctx.diag.warn(format_args!(
                "[{}] holds a scene object, criature ignored",
                cell.name()
            ));
        }
    } else {
        presence[CRIATURE] = write_criature(cell, ctx, state, w)?;
    }
    presence[WALL] = write_walls(cell, ctx, state, w)? > 0;

    w.patch(presence_at, presence);
    Ok(())
}

fn write_floor(
    cell: &Section,
    ctx: &mut Context,
    state: &mut AreaState,
    w: &mut ContainerWriter,
) -> BuildResult<()> {
    let profile: Ident = cell.require("Floor.Profile")?;
    w.put_str(profile.as_str())?;
    write_elevation(cell, "Floor.Elevation", ctx, w)?;
    write_items(cell, "Floor", ctx, state, w)?;

    let room = match cell.get::<Ident>("Floor.Room")? {
        None => 0,
        Some(room) => match state.rooms.get(&room.folded()) {
            Some(id) => *id,
            None => {
                ctx.diag.warn(format_args!(
                    "[{}] Floor.Room: unknown room `{room}`, using none",
                    cell.name()
                ));
                0
            }
        },
    };
    w.put_u8(room);
    Ok(())
}

fn write_roof(cell: &Section, ctx: &mut Context, w: &mut ContainerWriter) -> BuildResult<bool> {
    let Some(profile) = cell.get::<Ident>("Roof.Profile")? else {
        return Ok(false);
    };
    w.put_str(profile.as_str())?;
    write_elevation(cell, "Roof.Elevation", ctx, w)?;
    w.put_bool(cell.get_or("Roof.ShowUnderneath", false)?);
    Ok(true)
}

fn write_scene_obj(
    cell: &Section,
    ctx: &mut Context,
    state: &mut AreaState,
    w: &mut ContainerWriter,
) -> BuildResult<bool> {
    let Some(profile) = cell.get::<Ident>("SceneObj.Profile")? else {
        return Ok(false);
    };
    w.put_str(profile.as_str())?;
    write_tag(cell, "SceneObj.Tag", ctx, state, w)?;
    write_elevation(cell, "SceneObj.Elevation", ctx, w)?;
    write_light(cell, "SceneObj.Light", ctx, w)?;
    write_items(cell, "SceneObj", ctx, state, w)?;
    Ok(true)
}

fn write_criature(
    cell: &Section,
    ctx: &mut Context,
    state: &mut AreaState,
    w: &mut ContainerWriter,
) -> BuildResult<bool> {
    let Some(profile) = cell.get::<Ident>("Criature.Profile")? else {
        return Ok(false);
    };
    w.put_str(profile.as_str())?;
    w.put_bool(cell.get_or("Criature.Temporary", false)?);
    write_tag(cell, "Criature.Tag", ctx, state, w)?;
    write_elevation(cell, "Criature.Elevation", ctx, w)?;
    write_light(cell, "Criature.Light", ctx, w)?;
    write_items(cell, "Criature", ctx, state, w)?;

    let rules = ctx.rules;
    for raw in bracket_indices(cell, "Criature.Equipment") {
        if rules.code_of(Category::EquipmentSlot, raw).is_none() {
            ctx.diag.error(format_args!(
                "[{}] Criature.Equipment[{raw}]: unknown equipment slot, ignored",
                cell.name()
            ));
        }
    }
    let count_at = w.reserve::<u8>();
    let mut count = 0u8;
    for slot in 0..rules.count_of(Category::EquipmentSlot) {
        let Some(name) = rules.name_of(Category::EquipmentSlot, slot) else {
            continue;
        };
        let base = format!("Criature.Equipment[{name}]");
        if !cell.has_prefix(&format!("{base}.")) {
            continue;
        }
        w.put_u8(slot as u8);
        write_item(cell, &base, ctx, state, w)?;
        count += 1;
    }
    w.patch(count_at, count);
    Ok(true)
}

/// Returns the number of walls written.
fn write_walls(
    cell: &Section,
    ctx: &mut Context,
    state: &mut AreaState,
    w: &mut ContainerWriter,
) -> BuildResult<u8> {
    let count_at = w.reserve::<u8>();
    let mut count = 0u8;
    for orientation in WallOrientation::ALL {
        let base = format!("Wall.{}", orientation.key());
        if !cell.get_or(&base, false)? {
            if cell.has_prefix(&format!("{base}.")) {
                ctx.diag.warn(format_args!(
                    "[{}] {base} is not set, its wall is ignored",
                    cell.name()
                ));
            }
            continue;
        }
        let profile: Ident = cell.require(&format!("{base}.Profile"))?;
        w.put_u8(orientation as u8);
        w.put_str(profile.as_str())?;
        write_tag(cell, &format!("{base}.Tag"), ctx, state, w)?;
        write_elevation(cell, &format!("{base}.Elevation"), ctx, w)?;
        write_light(cell, &format!("{base}.Light"), ctx, w)?;
        w.put_bool(cell.get_or(&format!("{base}.BlockAccess"), true)?);
        count += 1;
    }
    w.patch(count_at, count);
    Ok(count)
}

/// Sparse `<prefix>.Item[i]` list behind a patched count.
fn write_items(
    cell: &Section,
    prefix: &str,
    ctx: &mut Context,
    state: &mut AreaState,
    w: &mut ContainerWriter,
) -> BuildResult<()> {
    let count_at = w.reserve::<u8>();
    let mut count = 0u8;
    let item_prefix = format!("{prefix}.Item");
    for i in read_indices(cell, &item_prefix, MAX_CONTAINER_ITEMS, ctx.diag) {
        let base = format!("{item_prefix}[{i}]");
        if !cell.has_prefix(&format!("{base}.")) {
            continue;
        }
        write_item(cell, &base, ctx, state, w)?;
        count += 1;
    }
    w.patch(count_at, count);
    Ok(())
}

fn write_item(
    cell: &Section,
    base: &str,
    ctx: &mut Context,
    state: &mut AreaState,
    w: &mut ContainerWriter,
) -> BuildResult<()> {
    let profile: Ident = cell.require(&format!("{base}.Profile"))?;
    w.put_str(profile.as_str())?;
    write_tag(cell, &format!("{base}.Tag"), ctx, state, w)?;
    write_light(cell, &format!("{base}.Light"), ctx, w)?;
    Ok(())
}

/// The tag is written verbatim even when it turns out to be a duplicate.
fn write_tag(
    cell: &Section,
    key: &str,
    ctx: &mut Context,
    state: &mut AreaState,
    w: &mut ContainerWriter,
) -> BuildResult<()> {
    let tag = cell.get::<Ident>(key)?;
    if let Some(tag) = &tag {
        state.tags.claim(ctx.diag, cell.name(), key, tag);
    }
    w.put_str(tag.as_ref().map_or("", Ident::as_str))?;
    Ok(())
}

fn write_elevation(
    cell: &Section,
    key: &str,
    ctx: &mut Context,
    w: &mut ContainerWriter,
) -> BuildResult<()> {
    let value = cell.get_or(key, 0i64)?;
    w.put_u8(clamp_range(ctx.diag, cell.name(), key, value, 0, MAX_ELEVATION) as u8);
    Ok(())
}

fn write_light(cell: &Section, key: &str, ctx: &mut Context, w: &mut ContainerWriter) -> BuildResult<()> {
    let value = cell.get_or(key, 0i64)?;
    w.put_u8(clamp_range(ctx.diag, cell.name(), key, value, 0, MAX_LIGHT) as u8);
    Ok(())
}
