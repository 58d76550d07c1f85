//! The desktop surface the session manager projects into: named HUD elements,
//! toggleable windows and the root context that carries theme and plus flags.

use std::collections::{BTreeMap, BTreeSet};

// ── Element ids ───────────────────────────────────────────────────────────────

pub const POINTS_DISPLAY: &str = "pointsDisplay";
pub const PLUS_STATUS: &str = "plusStatus";
pub const PLUS_REQUIREMENT_TEXT: &str = "plusRequirementText";
pub const UNLOCK_PLUS_BTN: &str = "unlockPlusBtn";

pub const ACTIVE_CLASS: &str = "active";
pub const BODY_PLUS_ACTIVE: &str = "body-plus-active";
pub const PLUS_ENABLED: &str = "plus-enabled";

/// Windows of the stock desktop: (id, title).
pub const WINDOWS: &[(&str, &str)] = &[
    ("terminalWindow", "Terminal"),
    ("filesWindow", "Files"),
    ("pointsWindow", "Directional Points"),
    ("settingsWindow", "Settings"),
];

// ── Element ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    pub text: String,
    pub disabled: bool,
    pub classes: BTreeSet<String>,
}

impl Element {
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.contains(class)
    }

    pub fn add_class(&mut self, class: &str) {
        self.classes.insert(class.to_string());
    }

    pub fn remove_class(&mut self, class: &str) {
        self.classes.remove(class);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Root {
    pub classes: BTreeSet<String>,
    pub theme: Option<String>,
}

impl Root {
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.contains(class)
    }

    pub fn set_class(&mut self, class: &str, on: bool) {
        if on {
            self.classes.insert(class.to_string());
        } else {
            self.classes.remove(class);
        }
    }
}

// ── Desktop ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Desktop {
    elements: BTreeMap<String, Element>,
    pub root: Root,
}

impl Desktop {
    /// HUD elements plus the stock windows, all windows closed.
    pub fn norther() -> Self {
        let mut desktop = Self::default();
        for id in [POINTS_DISPLAY, PLUS_STATUS, PLUS_REQUIREMENT_TEXT, UNLOCK_PLUS_BTN] {
            desktop.attach(id);
        }
        for (id, _) in WINDOWS {
            desktop.attach(id);
        }
        desktop
    }

    pub fn attach(&mut self, id: &str) -> &mut Element {
        self.elements.entry(id.to_string()).or_default()
    }

    pub fn detach(&mut self, id: &str) -> Option<Element> {
        self.elements.remove(id)
    }

    pub fn element(&self, id: &str) -> Option<&Element> {
        self.elements.get(id)
    }

    pub fn element_mut(&mut self, id: &str) -> Option<&mut Element> {
        self.elements.get_mut(id)
    }

    pub fn text(&self, id: &str) -> Option<&str> {
        self.element(id).map(|e| e.text.as_str())
    }

    pub fn is_open(&self, id: &str) -> bool {
        self.element(id).is_some_and(|e| e.has_class(ACTIVE_CLASS))
    }

    /// Stock windows present on this desktop, in display order.
    pub fn windows(&self) -> impl Iterator<Item = (&'static str, &'static str, bool)> + '_ {
        WINDOWS
            .iter()
            .filter(|(id, _)| self.element(id).is_some())
            .map(|(id, title)| (*id, *title, self.is_open(id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn norther_desktop_has_hud_and_closed_windows() {
        let desktop = Desktop::norther();
        assert!(desktop.element(POINTS_DISPLAY).is_some());
        assert!(desktop.element(UNLOCK_PLUS_BTN).is_some());
        assert_eq!(desktop.windows().count(), WINDOWS.len());
        assert!(desktop.windows().all(|(_, _, open)| !open));
    }

    #[test]
    fn detached_windows_are_not_listed() {
        let mut desktop = Desktop::norther();
        desktop.detach("filesWindow");
        assert!(desktop.windows().all(|(id, _, _)| id != "filesWindow"));
    }

    #[test]
    fn root_class_toggle() {
        let mut root = Root::default();
        root.set_class(PLUS_ENABLED, true);
        assert!(root.has_class(PLUS_ENABLED));
        root.set_class(PLUS_ENABLED, false);
        assert!(root.classes.is_empty());
    }
}
