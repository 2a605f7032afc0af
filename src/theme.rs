//! The fixed registry of visual themes.
use serde::Serialize;

/// Name of the theme used when nothing (or something unknown) is stored.
pub const DEFAULT_THEME_NAME: &str = "cosmic";

/// Raw colors behind a theme's style classes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThemePalette {
    /// Gradient stops of the page background
    pub bg: [&'static str; 3],
    pub text: &'static str,
    pub button: &'static str,
    pub button_hover: &'static str,
}

/// A named bundle of style tokens applied to the whole interface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Theme {
    /// Unique key, persisted as the active theme
    pub name: &'static str,
    /// Display label for selectors
    pub label: &'static str,
    pub bg: &'static str,
    pub text: &'static str,
    pub button: &'static str,
    pub card: &'static str,
    pub raw: ThemePalette,
}

impl Theme {
    /// The class string applied to the document root while this theme is active.
    pub fn root_class(&self) -> String {
        format!("{} {} transition-colors duration-300", self.bg, self.text)
    }
}

static THEMES: [Theme; 3] = [
    Theme {
        name: "cosmic",
        label: "🌌 Cosmic",
        bg: "bg-gradient-to-br from-[#4c1d95] via-black to-[#1e40af]",
        text: "text-[#bae6fd]",
        button: "bg-[#4f46e5] hover:bg-[#4338ca]",
        card: "bg-white/10 border-white/20",
        raw: ThemePalette {
            bg: ["#4c1d95", "#000000", "#1e40af"],
            text: "#bae6fd",
            button: "#4f46e5",
            button_hover: "#4338ca",
        },
    },
    Theme {
        name: "forest",
        label: "🌲 Forest",
        bg: "bg-gradient-to-br from-[#166534] via-[#111827] to-[#065f46]",
        text: "text-[#ecfccb]",
        button: "bg-[#059669] hover:bg-[#047857]",
        card: "bg-green-900/10 border-emerald-400/20",
        raw: ThemePalette {
            bg: ["#166534", "#111827", "#065f46"],
            text: "#ecfccb",
            button: "#059669",
            button_hover: "#047857",
        },
    },
    Theme {
        name: "sunset",
        label: "🌇 Sunset",
        bg: "bg-gradient-to-br from-[#9a3412] via-[#991b1b] to-[#6b21a8]",
        text: "text-[#fef3c7]",
        button: "bg-[#d97706] hover:bg-[#b45309]",
        card: "bg-orange-900/10 border-amber-400/20",
        raw: ThemePalette {
            bg: ["#9a3412", "#991b1b", "#6b21a8"],
            text: "#fef3c7",
            button: "#d97706",
            button_hover: "#b45309",
        },
    },
];

/// Lookup over the built-in themes. Themes are never created or destroyed at
/// runtime.
pub struct ThemeRegistry;

impl ThemeRegistry {
    /// All themes, always in the same order.
    pub fn all() -> &'static [Theme] {
        &THEMES
    }

    /// The theme used when no valid choice is stored.
    pub fn default_theme() -> &'static Theme {
        &THEMES[0]
    }

    /// Exact-name lookup that reports unknown names.
    pub fn get(name: &str) -> Option<&'static Theme> {
        THEMES.iter().find(|theme| theme.name == name)
    }

    /// Exact-name lookup that falls back to the default theme.
    pub fn by_name(name: &str) -> &'static Theme {
        Self::get(name).unwrap_or_else(Self::default_theme)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_order_is_stable() {
        let names: Vec<&str> = ThemeRegistry::all().iter().map(|t| t.name).collect();
        assert_eq!(names, ["cosmic", "forest", "sunset"]);
        assert_eq!(ThemeRegistry::default_theme().name, DEFAULT_THEME_NAME);
    }

    #[test]
    fn unknown_name_falls_back_to_cosmic() {
        assert_eq!(ThemeRegistry::by_name("doesnotexist").name, "cosmic");
        assert_eq!(ThemeRegistry::by_name("").name, "cosmic");
        assert_eq!(ThemeRegistry::by_name("Forest").name, "cosmic");
        assert!(ThemeRegistry::get("doesnotexist").is_none());
    }

    #[test]
    fn known_names_resolve() {
        assert_eq!(ThemeRegistry::by_name("sunset").label, "🌇 Sunset");
        assert_eq!(ThemeRegistry::get("forest").unwrap().raw.button, "#059669");
    }

    #[test]
    fn root_class_combines_bg_and_text() {
        let theme = ThemeRegistry::by_name("forest");
        assert_eq!(
            theme.root_class(),
            "bg-gradient-to-br from-[#166534] via-[#111827] to-[#065f46] text-[#ecfccb] transition-colors duration-300"
        );
    }
}
