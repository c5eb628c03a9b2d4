//! Named built-in grab actions: the higher-level vocabulary
//! (`ViewNext`, `WindowKill`, `ScreenJump2`, ...) that a binding can name
//! directly instead of spelling out a low-level `(flags, data)` pair by
//! hand, expressed as a name→[`GrabFlags`]/[`GrabData`] table.
//!
//! [`crate::config::ConfigFile`] tries [`resolve`] as a fallback whenever a
//! grab's action string isn't one of the low-level flag names, so both
//! vocabularies can be mixed freely in the same config.

use crate::core::bindings::{GrabData, GrabFlags};
use crate::core::registry::ClientMode;

/// Resolve a named built-in action to the flags/data pair [`crate::core::
/// actions::dispatch`] already knows how to execute. Returns `None` if
/// `name` isn't a recognized built-in.
pub fn resolve(name: &str) -> Option<(GrabFlags, GrabData)> {
    if let Some(rest) = name.strip_prefix("ViewJump") {
        let idx: i64 = rest.parse().ok()?;
        return Some((GrabFlags::VIEW_FOCUS, GrabData::Int(idx)));
    }
    if let Some(rest) = name.strip_prefix("ViewSwitch") {
        let idx: i64 = rest.parse().ok()?;
        return Some((GrabFlags::VIEW_SWAP, GrabData::Int(idx)));
    }
    if let Some(rest) = name.strip_prefix("ScreenJump") {
        let idx: i64 = rest.parse().ok()?;
        return Some((GrabFlags::SCREEN_JUMP, GrabData::Int(idx)));
    }

    let mode = |m: ClientMode| (GrabFlags::WINDOW_TOGGLE, GrabData::Int(m.bits() as i64));
    let dir = |flags: GrabFlags, d: &str| (flags, GrabData::Str(d.to_string()));

    Some(match name {
        "ViewNext" => (GrabFlags::VIEW_SELECT, GrabData::Str("next".into())),
        "ViewPrev" => (GrabFlags::VIEW_SELECT, GrabData::Str("prev".into())),

        "WindowFloat" => mode(ClientMode::FLOAT),
        "WindowFull" => mode(ClientMode::FULL),
        "WindowStick" => mode(ClientMode::STICK),
        "WindowZaphod" => mode(ClientMode::ZAPHOD),
        "WindowBorderless" => mode(ClientMode::BORDERLESS),

        "WindowRaise" => dir(GrabFlags::WINDOW_STACK, "up"),
        "WindowLower" => dir(GrabFlags::WINDOW_STACK, "down"),

        "WindowLeft" => dir(GrabFlags::WINDOW_SELECT, "left"),
        "WindowRight" => dir(GrabFlags::WINDOW_SELECT, "right"),
        "WindowUp" => dir(GrabFlags::WINDOW_SELECT, "up"),
        "WindowDown" => dir(GrabFlags::WINDOW_SELECT, "down"),

        "WindowMoveLeft" => dir(GrabFlags::WINDOW_MOVE, "left"),
        "WindowMoveRight" => dir(GrabFlags::WINDOW_MOVE, "right"),
        "WindowMoveUp" => dir(GrabFlags::WINDOW_MOVE, "up"),
        "WindowMoveDown" => dir(GrabFlags::WINDOW_MOVE, "down"),

        "WindowResizeLeft" => dir(GrabFlags::WINDOW_RESIZE, "left"),
        "WindowResizeRight" => dir(GrabFlags::WINDOW_RESIZE, "right"),
        "WindowResizeUp" => dir(GrabFlags::WINDOW_RESIZE, "up"),
        "WindowResizeDown" => dir(GrabFlags::WINDOW_RESIZE, "down"),

        "WindowKill" => (GrabFlags::WINDOW_KILL, GrabData::None),

        "SubtleReload" => (GrabFlags::SUBTLE_RELOAD, GrabData::None),
        "SubtleRestart" => (GrabFlags::SUBTLE_RESTART, GrabData::None),
        "SubtleQuit" => (GrabFlags::SUBTLE_QUIT, GrabData::None),

        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_plain_names() {
        let (flags, data) = resolve("WindowKill").expect("should resolve");
        assert_eq!(flags, GrabFlags::WINDOW_KILL);
        assert!(matches!(data, GrabData::None));

        let (flags, data) = resolve("ViewNext").expect("should resolve");
        assert_eq!(flags, GrabFlags::VIEW_SELECT);
        assert!(matches!(data, GrabData::Str(s) if s == "next"));
    }

    #[test]
    fn resolves_indexed_names() {
        let (flags, data) = resolve("ViewJump3").expect("should resolve");
        assert_eq!(flags, GrabFlags::VIEW_FOCUS);
        assert!(matches!(data, GrabData::Int(3)));

        let (flags, data) = resolve("ScreenJump1").expect("should resolve");
        assert_eq!(flags, GrabFlags::SCREEN_JUMP);
        assert!(matches!(data, GrabData::Int(1)));
    }

    #[test]
    fn rejects_unknown_names() {
        assert!(resolve("NotARealAction").is_none());
        assert!(resolve("ViewJumpx").is_none());
    }
}
