//! The configuration surface: a serde/TOML-deserializable [ConfigFile]
//! standing in for the scripted collaborator, plus a [ConfigBuilder] that
//! seeds a fresh [Registry]/[GrabTable]/[Config] from it.
//!
//! The declarative call set (`set`, `gravity`, `grab`, `tag`, `view`,
//! `screen`, `style`) is re-expressed here as TOML tables instead of an
//! embedded scripting DSL; the interpreter that would evaluate a live
//! config script is out of scope for this crate.

use std::path::Path;

use serde::Deserialize;

use crate::core::bindings::{Grab, GrabData, GrabFlags, GrabTable, ModMask};
use crate::core::registry::{ClientMode, GravityId, Registry, TagMask};
use crate::core::{Config, RuntimeFlags};
use crate::pure::gravity::{GravitySpec as PureGravitySpec, TileDirection};
use crate::pure::tag::{MatchField, Matcher};
use crate::{Error, Result};

/// Top-level deserialized configuration file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    pub options: Options,
    pub gravities: Vec<GravitySpec>,
    pub grabs: Vec<GrabSpec>,
    pub tags: Vec<TagSpec>,
    pub views: Vec<ViewSpec>,
    pub screens: Vec<ScreenSpec>,
    pub styles: Vec<StyleSpec>,
}

impl ConfigFile {
    /// Read and parse a TOML configuration file from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&text)?)
    }
}

/// The `set` call's flat scalar options ("Configuration surface").
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Options {
    pub wm_name: String,
    pub border_width: u32,
    pub step: i32,
    pub snap: i32,
    pub honor_size_hints: bool,
    pub click_to_focus: bool,
    pub urgent_dialogs: bool,
    pub skip_pointer_warp: bool,
    pub skip_urgent_warp: bool,
    pub no_randr: bool,
    pub no_xinerama: bool,
    pub tray: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            wm_name: "subtlety".into(),
            border_width: 2,
            step: 5,
            snap: 10,
            honor_size_hints: false,
            click_to_focus: false,
            urgent_dialogs: false,
            skip_pointer_warp: false,
            skip_urgent_warp: false,
            no_randr: false,
            no_xinerama: false,
            tray: false,
        }
    }
}

/// A `gravity name = { x, y, w, h }` declaration, with an optional tiling
/// axis for gravities shared by more than one tiled client.
#[derive(Debug, Clone, Deserialize)]
pub struct GravitySpec {
    pub name: String,
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
    /// `"horizontal"` / `"vertical"`; absent means clients placed on this
    /// gravity are not tiled against each other.
    pub tile: Option<String>,
}

/// A single `fields = [...], pattern = "..."` predicate, with an optional
/// `and` chain expressing conjunction. Sibling [TagSpec::matchers] entries
/// express disjunction.
#[derive(Debug, Clone, Deserialize)]
pub struct MatcherSpec {
    pub fields: Vec<String>,
    pub pattern: String,
    pub and: Option<Box<MatcherSpec>>,
}

/// A `tag name { match, gravity, screen, geometry, mode }` declaration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TagSpec {
    pub name: String,
    #[serde(rename = "match")]
    pub matchers: Vec<MatcherSpec>,
    pub gravity: Option<String>,
    pub screen: Option<usize>,
    pub geometry: Option<(i32, i32, u32, u32)>,
    pub mode: Vec<String>,
}

/// A `view name = [tag, tag, ...]` declaration.
#[derive(Debug, Clone, Deserialize)]
pub struct ViewSpec {
    pub name: String,
    pub tags: Vec<String>,
}

/// A `screen index { view = "..." }` default-view override, applied to
/// outputs enumerated at runtime beyond what the config file otherwise
/// determines (Xrandr/Xinerama decide the actual geometry, not this file).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ScreenSpec {
    pub view: Option<String>,
}

/// A `style name { border, width }` declaration. Recognized names are
/// `normal`, `focus` and `urgent`.
#[derive(Debug, Clone, Deserialize)]
pub struct StyleSpec {
    pub name: String,
    pub border: Option<u32>,
    pub width: Option<u32>,
}

/// A `grab code state = [actions]` declaration, with an optional nested
/// `chain` for multi-key sequences (keychain).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GrabSpec {
    pub code: u32,
    pub state: Vec<String>,
    pub actions: Vec<String>,
    pub int: Option<i64>,
    pub string: Option<String>,
    pub chain: Vec<GrabSpec>,
}

fn modifier_bit(name: &str) -> Option<ModMask> {
    match name.to_ascii_lowercase().as_str() {
        "shift" => Some(1 << 0),
        "lock" | "capslock" => Some(1 << 1),
        "control" | "ctrl" => Some(1 << 2),
        "mod1" | "alt" => Some(1 << 3),
        "mod2" | "numlock" => Some(1 << 4),
        "mod3" => Some(1 << 5),
        "mod4" | "super" | "win" => Some(1 << 6),
        "mod5" => Some(1 << 7),
        _ => None,
    }
}

fn action_flag(name: &str) -> Option<GrabFlags> {
    match name {
        "spawn" => Some(GrabFlags::SPAWN),
        "callback" => Some(GrabFlags::CALLBACK),
        "view-focus" => Some(GrabFlags::VIEW_FOCUS),
        "view-swap" => Some(GrabFlags::VIEW_SWAP),
        "view-select" => Some(GrabFlags::VIEW_SELECT),
        "screen-jump" => Some(GrabFlags::SCREEN_JUMP),
        "window-move" => Some(GrabFlags::WINDOW_MOVE),
        "window-resize" => Some(GrabFlags::WINDOW_RESIZE),
        "window-toggle" => Some(GrabFlags::WINDOW_TOGGLE),
        "window-stack" => Some(GrabFlags::WINDOW_STACK),
        "window-select" => Some(GrabFlags::WINDOW_SELECT),
        "window-gravity" => Some(GrabFlags::WINDOW_GRAVITY),
        "window-kill" => Some(GrabFlags::WINDOW_KILL),
        "subtle-reload" => Some(GrabFlags::SUBTLE_RELOAD),
        "subtle-restart" => Some(GrabFlags::SUBTLE_RESTART),
        "subtle-quit" => Some(GrabFlags::SUBTLE_QUIT),
        "chain-start" => Some(GrabFlags::CHAIN_START),
        "chain-link" => Some(GrabFlags::CHAIN_LINK),
        "chain-end" => Some(GrabFlags::CHAIN_END),
        _ => None,
    }
}

fn mode_flag(name: &str) -> Option<ClientMode> {
    match name {
        "full" => Some(ClientMode::FULL),
        "float" => Some(ClientMode::FLOAT),
        "stick" => Some(ClientMode::STICK),
        "stick_screen" => Some(ClientMode::STICK_SCREEN),
        "urgent" => Some(ClientMode::URGENT),
        "resize" => Some(ClientMode::RESIZE),
        "zaphod" => Some(ClientMode::ZAPHOD),
        "fixed" => Some(ClientMode::FIXED),
        "center" => Some(ClientMode::CENTER),
        "borderless" => Some(ClientMode::BORDERLESS),
        _ => None,
    }
}

fn match_field(name: &str) -> Option<MatchField> {
    match name {
        "name" => Some(MatchField::NAME),
        "instance" => Some(MatchField::INSTANCE),
        "class" => Some(MatchField::CLASS),
        "role" => Some(MatchField::ROLE),
        "type" => Some(MatchField::TYPE),
        _ => None,
    }
}

fn build_matcher(spec: &MatcherSpec) -> Result<Matcher> {
    let mut fields = MatchField::empty();
    for f in &spec.fields {
        let bit = match_field(f).ok_or_else(|| Error::Config(format!("unknown matcher field: {f}")))?;
        fields |= bit;
    }
    let mut matcher = Matcher::new(fields, &spec.pattern)?;
    if let Some(and) = &spec.and {
        matcher = matcher.and(build_matcher(and)?);
    }
    Ok(matcher)
}

fn build_gravity_spec(spec: &GravitySpec) -> Result<PureGravitySpec> {
    let tile = match spec.tile.as_deref() {
        None => None,
        Some(s) if s.eq_ignore_ascii_case("horizontal") => Some(TileDirection::Horizontal),
        Some(s) if s.eq_ignore_ascii_case("vertical") => Some(TileDirection::Vertical),
        Some(other) => return Err(Error::Config(format!("unknown tile direction: {other}"))),
    };
    Ok(PureGravitySpec {
        x: spec.x,
        y: spec.y,
        w: spec.w,
        h: spec.h,
        tile,
    })
}

fn grab_data(spec: &GrabSpec) -> GrabData {
    if let Some(i) = spec.int {
        GrabData::Int(i)
    } else if let Some(s) = &spec.string {
        GrabData::Str(s.clone())
    } else {
        GrabData::None
    }
}

fn build_grab(spec: &GrabSpec) -> Result<Grab> {
    let mut flags = GrabFlags::empty();
    let mut builtin_data: Option<GrabData> = None;

    for a in &spec.actions {
        // The low-level flag vocabulary takes priority; a name only falls
        // through to the named built-in table (e.g. `ViewNext`, `WindowKill`,
        // `ScreenJump2`) when it isn't one of those.
        match action_flag(a) {
            Some(bit) => flags |= bit,
            None => {
                let (bit, data) = crate::builtin::resolve(a)
                    .ok_or_else(|| Error::Config(format!("unknown grab action: {a}")))?;
                flags |= bit;
                builtin_data.get_or_insert(data);
            }
        }
    }

    let mut state: ModMask = 0;
    for m in &spec.state {
        let bit = modifier_bit(m).ok_or_else(|| Error::Config(format!("unknown modifier: {m}")))?;
        state |= bit;
    }

    let chain = spec
        .chain
        .iter()
        .map(build_grab)
        .collect::<Result<Vec<_>>>()?;

    // An explicit `int`/`string` in the config always wins over a built-in's
    // implied data.
    let data = match grab_data(spec) {
        GrabData::None => builtin_data.unwrap_or(GrabData::None),
        explicit => explicit,
    };

    Ok(Grab {
        code: spec.code,
        state,
        flags,
        data,
        chain,
    })
}

/// Seeds a fresh [Registry]/[GrabTable] from a parsed [ConfigFile] and
/// produces the static [Config]/[RuntimeFlags] halves.
pub struct ConfigBuilder;

impl ConfigBuilder {
    /// Resolve `file.options`/`file.styles` into the static [Config].
    /// `modifier_codes` is left empty: translating modifier names to X
    /// keycodes depends on the live keyboard mapping, so the connection
    /// backend populates it after connecting.
    pub fn build_config(file: &ConfigFile) -> Config {
        let mut config = Config::default();
        config.wm_name = file.options.wm_name.clone();
        config.border_width = file.options.border_width;
        config.step = file.options.step;
        config.snap = file.options.snap;

        for style in &file.styles {
            match style.name.to_ascii_lowercase().as_str() {
                "normal" => {
                    if let Some(b) = style.border {
                        config.normal_border = b;
                    }
                }
                "focus" | "focused" => {
                    if let Some(b) = style.border {
                        config.focused_border = b;
                    }
                }
                "urgent" => {
                    if let Some(b) = style.border {
                        config.urgent_border = b;
                    }
                }
                _ => {}
            }
            if let Some(w) = style.width {
                config.border_width = w;
            }
        }

        config
    }

    /// Resolve `file.options` into the initial [RuntimeFlags].
    pub fn build_flags(file: &ConfigFile) -> RuntimeFlags {
        let mut flags = RuntimeFlags::default();
        flags.honor_size_hints = file.options.honor_size_hints;
        flags.click_to_focus = file.options.click_to_focus;
        flags.urgent_dialogs = file.options.urgent_dialogs;
        flags.skip_pointer_warp = file.options.skip_pointer_warp;
        flags.skip_urgent_warp = file.options.skip_urgent_warp;
        flags.tray = file.options.tray;
        flags.xrandr = !file.options.no_randr;
        flags.xinerama = !file.options.no_xinerama;
        flags
    }

    /// Populate `registry`/`grabs` from `file` in dependency order
    /// (gravities, then the default tag, then user tags, then views, then
    /// grabs) and return the default gravity id, used for clients that
    /// match no tag. Per invariant 4, the default tag is always inserted at
    /// [crate::core::registry::DEFAULT_TAG] before any user tag, and a
    /// `tags` entry literally named `default` is rejected rather than
    /// silently shadowed.
    pub fn seed(registry: &mut Registry, grabs: &mut GrabTable, file: &ConfigFile) -> Result<GravityId> {
        if file.gravities.is_empty() {
            return Err(Error::NoGravities);
        }

        let mut default_gravity = None;
        for g in &file.gravities {
            let id = registry.add_gravity(g.name.clone(), build_gravity_spec(g)?);
            default_gravity.get_or_insert(id);
        }
        let default_gravity = default_gravity.expect("checked non-empty above");

        registry.add_tag("default", Vec::new());
        for t in &file.tags {
            if t.name == "default" {
                return Err(Error::Config("the default tag is implicit and may not be redeclared".into()));
            }

            let matchers = t
                .matchers
                .iter()
                .map(build_matcher)
                .collect::<Result<Vec<_>>>()?;
            let tag_id = registry.add_tag(t.name.clone(), matchers);

            let mut mode_flags = ClientMode::empty();
            for m in &t.mode {
                let bit = mode_flag(m).ok_or_else(|| Error::Config(format!("unknown mode: {m}")))?;
                mode_flags |= bit;
            }

            let gravity_id = t
                .gravity
                .as_ref()
                .map(|name| {
                    registry
                        .gravity_by_name(name)
                        .map(|g| g.id)
                        .ok_or_else(|| Error::UnknownGravity(name.clone()))
                })
                .transpose()?;
            let geometry = t.geometry.map(|(x, y, w, h)| crate::pure::Rect { x, y, w, h });

            if let Some(tag) = registry.tag_mut(tag_id) {
                tag.gravity_id = gravity_id;
                tag.screen_id = t.screen.map(crate::core::registry::ScreenId);
                tag.geometry = geometry;
                tag.mode_flags = mode_flags;
            }
        }

        if file.views.is_empty() {
            return Err(Error::Config("no views are defined: at least one is required".into()));
        }
        for v in &file.views {
            let mut mask: TagMask = 0;
            for tag_name in &v.tags {
                let tag = registry
                    .tag_by_name(tag_name)
                    .ok_or_else(|| Error::UnknownTag(tag_name.clone()))?;
                mask |= 1u32 << (tag.id.0 + 1);
            }
            registry.add_view(v.name.clone(), mask);
        }

        for g in &file.grabs {
            let grab = build_grab(g)?;
            registry.add_grab(grab.clone());
            grabs.insert(grab);
        }

        Ok(default_gravity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ConfigFile {
        toml::from_str(
            r#"
            [options]
            wm_name = "subtlety-test"

            [[gravities]]
            name = "center"
            x = 25
            y = 25
            w = 50
            h = 50

            [[tags]]
            name = "terms"
            match = [{ fields = ["class"], pattern = "(?i)term" }]
            gravity = "center"

            [[views]]
            name = "work"
            tags = ["terms"]

            [[grabs]]
            code = 36
            state = ["mod4"]
            actions = ["spawn"]
            string = "xterm"
            "#,
        )
        .expect("sample config parses")
    }

    #[test]
    fn seed_inserts_default_tag_at_id_zero() {
        let mut registry = Registry::new();
        let mut grabs = GrabTable::new();
        let file = sample();

        ConfigBuilder::seed(&mut registry, &mut grabs, &file).expect("seed succeeds");

        assert_eq!(registry.tag(crate::core::registry::DEFAULT_TAG).unwrap().name, "default");
        assert_eq!(registry.tag_by_name("terms").unwrap().name, "terms");
    }

    #[test]
    fn seed_resolves_tag_gravity_by_name() {
        let mut registry = Registry::new();
        let mut grabs = GrabTable::new();
        let file = sample();

        ConfigBuilder::seed(&mut registry, &mut grabs, &file).expect("seed succeeds");

        let tag = registry.tag_by_name("terms").unwrap();
        let gravity = registry.gravity(tag.gravity_id.unwrap()).unwrap();
        assert_eq!(gravity.name, "center");
    }

    #[test]
    fn seed_installs_grabs_into_both_registry_and_table() {
        let mut registry = Registry::new();
        let mut grabs = GrabTable::new();
        let file = sample();

        ConfigBuilder::seed(&mut registry, &mut grabs, &file).expect("seed succeeds");

        assert!(grabs.lookup(36, 1 << 6).is_some());
    }

    #[test]
    fn seed_rejects_a_redeclared_default_tag() {
        let mut file = sample();
        file.tags.push(TagSpec {
            name: "default".into(),
            ..Default::default()
        });

        let mut registry = Registry::new();
        let mut grabs = GrabTable::new();
        let err = ConfigBuilder::seed(&mut registry, &mut grabs, &file).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn seed_requires_at_least_one_gravity() {
        let mut file = sample();
        file.gravities.clear();

        let mut registry = Registry::new();
        let mut grabs = GrabTable::new();
        let err = ConfigBuilder::seed(&mut registry, &mut grabs, &file).unwrap_err();
        assert!(matches!(err, Error::NoGravities));
    }

    #[test]
    fn seed_falls_back_to_named_builtin_actions() {
        let mut file = sample();
        file.grabs.push(GrabSpec {
            code: 40,
            state: vec!["mod4".into()],
            actions: vec!["WindowKill".into()],
            int: None,
            string: None,
            chain: Vec::new(),
        });

        let mut registry = Registry::new();
        let mut grabs = GrabTable::new();
        ConfigBuilder::seed(&mut registry, &mut grabs, &file).expect("seed succeeds");

        let grab = grabs.lookup(40, 1 << 6).expect("grab installed");
        assert!(grab.flags.contains(GrabFlags::WINDOW_KILL));
    }
}
