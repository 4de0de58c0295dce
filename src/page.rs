use glam::Vec2;

use crate::scene::relative_scroll_offset;
use crate::telemetry::{log_event, LogLevel};
use crate::theme::{persist_theme, resolve_theme, PreferenceStore, Theme};
use crate::viewport::ViewportTracker;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Backdrop {
    None,
    Hero,
    Section,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SectionInfo {
    pub id: &'static str,
    pub nav_label: Option<&'static str>,
    pub heading: Option<&'static str>,
    pub backdrop: Backdrop,
}

const fn section(
    id: &'static str,
    nav_label: Option<&'static str>,
    heading: Option<&'static str>,
    backdrop: Backdrop,
) -> SectionInfo {
    SectionInfo {
        id,
        nav_label,
        heading,
        backdrop,
    }
}

/// Page sections in document order.
pub const SECTIONS: [SectionInfo; 7] = [
    section("hero", Some("Home"), None, Backdrop::Hero),
    section("about", Some("About"), Some("About Me"), Backdrop::Section),
    section("experience", Some("Experience"), Some("Experience"), Backdrop::None),
    section("projects", Some("Projects"), Some("Projects"), Backdrop::Section),
    section("education", None, Some("Education"), Backdrop::None),
    section("skills", Some("Skills"), Some("Skills"), Backdrop::Section),
    section("contact", Some("Contact"), Some("Get In Touch"), Backdrop::None),
];

pub fn section_index(id: &str) -> Option<usize> {
    SECTIONS.iter().position(|section| section.id == id)
}

/// "01." style label for headed sections, counted from the first one.
pub fn heading_number(id: &str) -> Option<String> {
    SECTIONS
        .iter()
        .filter(|section| section.heading.is_some())
        .position(|section| section.id == id)
        .map(|position| format!("{:02}.", position + 1))
}

#[derive(Clone, Debug, PartialEq)]
pub enum PageAction {
    Scrolled { scroll_y: f64 },
    PointerMoved { x: f64, y: f64 },
    Resized { width: f64, height: f64 },
    SectionsMeasured { heights: Vec<Option<f64>> },
    ActiveSectionChanged { id: Option<String> },
    ToggleTheme,
    ToggleMenu,
    NavigationActivated { id: String },
    ClickedOutsideMenu,
}

impl PageAction {
    /// Mirrors the tracker's active section, including a cleared one.
    pub fn follow_tracker(tracker: &ViewportTracker) -> Self {
        Self::ActiveSectionChanged {
            id: tracker.active().map(str::to_string),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PageEffect {
    None,
    PersistTheme(Theme),
}

#[derive(Clone, Debug, PartialEq)]
pub struct PageState {
    pub scroll_y: f64,
    pub pointer: (f64, f64),
    pub viewport: (f64, f64),
    pub section_heights: Vec<Option<f64>>,
    pub active_section: Option<String>,
    pub theme: Theme,
    pub menu_open: bool,
}

impl PageState {
    pub fn new(theme: Theme) -> Self {
        Self {
            scroll_y: 0.0,
            pointer: (0.0, 0.0),
            viewport: (0.0, 0.0),
            section_heights: vec![None; SECTIONS.len()],
            active_section: None,
            theme,
            menu_open: false,
        }
    }

    pub fn apply(&mut self, action: PageAction) -> PageEffect {
        match action {
            PageAction::Scrolled { scroll_y } => {
                self.scroll_y = if scroll_y.is_finite() { scroll_y.max(0.0) } else { 0.0 };
            }
            PageAction::PointerMoved { x, y } => self.pointer = (x, y),
            PageAction::Resized { width, height } => {
                self.viewport = (width.max(0.0), height.max(0.0));
            }
            PageAction::SectionsMeasured { heights } => self.section_heights = heights,
            PageAction::ActiveSectionChanged { id } => self.active_section = id,
            PageAction::ToggleTheme => {
                self.theme = self.theme.toggled();
                return PageEffect::PersistTheme(self.theme);
            }
            PageAction::ToggleMenu => self.menu_open = !self.menu_open,
            PageAction::NavigationActivated { .. } | PageAction::ClickedOutsideMenu => {
                self.menu_open = false;
            }
        }

        PageEffect::None
    }

    pub fn is_active(&self, id: &str) -> bool {
        self.active_section.as_deref() == Some(id)
    }

    /// Pointer position mapped to [-1, 1] on both axes, centre at zero.
    pub fn normalized_pointer(&self) -> Vec2 {
        let (width, height) = self.viewport;
        if width <= 0.0 || height <= 0.0 {
            return Vec2::ZERO;
        }

        let (x, y) = self.pointer;
        Vec2::new(
            ((x / width) * 2.0 - 1.0).clamp(-1.0, 1.0) as f32,
            ((y / height) * 2.0 - 1.0).clamp(-1.0, 1.0) as f32,
        )
    }

    /// Scroll offset handed to the backdrop of section `id`: absolute for the
    /// hero, relative to the section's top for the others.
    pub fn scene_offset(&self, id: &str) -> f64 {
        match section_index(id) {
            Some(index) if SECTIONS[index].backdrop == Backdrop::Section => {
                relative_scroll_offset(self.scroll_y, &self.section_heights, index)
            }
            _ => self.scroll_y,
        }
    }
}

/// Single writer for page state. Readers get `state()`.
#[derive(Clone, Debug)]
pub struct PageController<S> {
    state: PageState,
    store: S,
}

impl<S: PreferenceStore> PageController<S> {
    pub fn load(store: S, os_prefers_dark: Option<bool>) -> Self {
        let theme = resolve_theme(&store, os_prefers_dark);
        Self {
            state: PageState::new(theme),
            store,
        }
    }

    pub fn state(&self) -> &PageState {
        &self.state
    }

    pub fn dispatch(&mut self, action: PageAction) {
        match self.state.apply(action) {
            PageEffect::None => {}
            PageEffect::PersistTheme(theme) => {
                if let Err(error) = persist_theme(&mut self.store, theme) {
                    log_event(
                        LogLevel::Warn,
                        "theme_persist_failed",
                        serde_json::json!({ "theme": theme.as_str(), "error": error.to_string() }),
                    );
                }
            }
        }
    }

    pub fn into_store(self) -> S {
        self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::{MemoryStore, UnavailableStore, THEME_KEY};
    use crate::viewport::{Region, SharedTracker, TrackingBand};

    #[test]
    fn toggling_persists_and_survives_reload() {
        let mut controller = PageController::load(MemoryStore::default(), None);
        assert_eq!(controller.state().theme, Theme::Dark);

        controller.dispatch(PageAction::ToggleTheme);
        assert_eq!(controller.state().theme, Theme::Light);

        let store = controller.into_store();
        assert_eq!(store.read(THEME_KEY), Ok(Some("light".to_string())));

        let reloaded = PageController::load(store, Some(true));
        assert_eq!(reloaded.state().theme, Theme::Light);
    }

    #[test]
    fn toggle_still_switches_when_storage_is_disabled() {
        let mut controller = PageController::load(UnavailableStore, Some(false));
        assert_eq!(controller.state().theme, Theme::Light);

        controller.dispatch(PageAction::ToggleTheme);
        assert_eq!(controller.state().theme, Theme::Dark);
    }

    #[test]
    fn menu_closes_on_navigation_and_outside_click() {
        let mut state = PageState::new(Theme::Dark);

        state.apply(PageAction::ToggleMenu);
        assert!(state.menu_open);
        state.apply(PageAction::NavigationActivated { id: "about".to_string() });
        assert!(!state.menu_open);

        state.apply(PageAction::ToggleMenu);
        state.apply(PageAction::ClickedOutsideMenu);
        assert!(!state.menu_open);

        state.apply(PageAction::ClickedOutsideMenu);
        assert!(!state.menu_open);
    }

    #[test]
    fn scroll_position_never_goes_negative() {
        let mut state = PageState::new(Theme::Dark);

        state.apply(PageAction::Scrolled { scroll_y: -40.0 });
        assert_eq!(state.scroll_y, 0.0);

        state.apply(PageAction::Scrolled { scroll_y: f64::NAN });
        assert_eq!(state.scroll_y, 0.0);

        state.apply(PageAction::Scrolled { scroll_y: 1450.0 });
        assert_eq!(state.scroll_y, 1450.0);
    }

    #[test]
    fn backdrops_get_offsets_relative_to_their_section() {
        let mut state = PageState::new(Theme::Dark);
        state.apply(PageAction::SectionsMeasured {
            heights: vec![
                Some(800.0),
                Some(600.0),
                Some(900.0),
                Some(1200.0),
                None,
                Some(700.0),
                Some(400.0),
            ],
        });
        state.apply(PageAction::Scrolled { scroll_y: 2500.0 });

        assert_eq!(state.scene_offset("hero"), 2500.0);
        assert_eq!(state.scene_offset("about"), 1700.0);
        assert_eq!(state.scene_offset("projects"), 200.0);
        assert_eq!(state.scene_offset("skills"), 2500.0 - 3500.0);
    }

    #[test]
    fn pointer_is_normalized_against_the_viewport() {
        let mut state = PageState::new(Theme::Dark);
        state.apply(PageAction::PointerMoved { x: 300.0, y: 200.0 });
        assert_eq!(state.normalized_pointer(), Vec2::ZERO);

        state.apply(PageAction::Resized { width: 1200.0, height: 800.0 });
        let pointer = state.normalized_pointer();
        assert!((pointer.x + 0.5).abs() < 1e-6);
        assert!((pointer.y + 0.5).abs() < 1e-6);

        state.apply(PageAction::PointerMoved { x: 5000.0, y: 800.0 });
        assert_eq!(state.normalized_pointer(), Vec2::new(1.0, 1.0));
    }

    #[test]
    fn active_section_follows_tracker_reports() {
        let mut state = PageState::new(Theme::Dark);
        assert!(!state.is_active("hero"));

        state.apply(PageAction::ActiveSectionChanged { id: Some("projects".to_string()) });
        assert!(state.is_active("projects"));

        state.apply(PageAction::ActiveSectionChanged { id: None });
        assert_eq!(state.active_section, None);
    }

    #[test]
    fn headed_sections_are_numbered_in_order() {
        assert_eq!(heading_number("about").as_deref(), Some("01."));
        assert_eq!(heading_number("contact").as_deref(), Some("06."));
        assert_eq!(heading_number("hero"), None);
        assert_eq!(section_index("skills"), Some(5));
    }

    #[test]
    fn highlight_clears_when_the_active_section_goes_away() {
        let tracker = SharedTracker::new(TrackingBand::default());
        let hero = tracker.register("hero").expect("first registration");
        let _about = tracker.register("about").expect("first registration");
        let mut state = PageState::new(Theme::Dark);

        state.apply(tracker.with(|tracker| {
            tracker.observe(800.0, |id| (id == "hero").then(|| Region::new(0.0, 800.0)));
            PageAction::follow_tracker(tracker)
        }));
        assert!(state.is_active("hero"));

        drop(hero);
        state.apply(tracker.with(|tracker| PageAction::follow_tracker(tracker)));
        assert_eq!(state.active_section, None);
    }
}
