use std::{cell::RefCell, rc::Rc};

use crate::telemetry::{log_event, LogLevel};

/// Vertical extent of an element relative to the top of the viewport, in CSS
/// pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Region {
    pub top: f64,
    pub bottom: f64,
}

impl Region {
    pub fn new(top: f64, height: f64) -> Self {
        Self {
            top,
            bottom: top + height.max(0.0),
        }
    }

    /// Threshold-zero overlap: touching edges count.
    pub fn intersects(&self, other: &Region) -> bool {
        self.top <= other.bottom && other.top <= self.bottom
    }
}

/// Horizontal strip of the viewport that decides focus, expressed as insets
/// from the top and bottom as fractions of viewport height.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrackingBand {
    pub top_inset: f64,
    pub bottom_inset: f64,
}

impl Default for TrackingBand {
    fn default() -> Self {
        Self {
            top_inset: 0.2,
            bottom_inset: 0.7,
        }
    }
}

impl TrackingBand {
    pub fn region(&self, viewport_height: f64) -> Region {
        let height = viewport_height.max(0.0);
        Region {
            top: height * self.top_inset,
            bottom: height - height * self.bottom_inset,
        }
    }
}

#[derive(Debug)]
struct TrackedSection {
    id: String,
    intersecting: bool,
}

/// Decides which registered section currently holds the reader's focus.
///
/// Each layout pass recomputes every section's overlap with the tracking band.
/// A section that starts overlapping becomes active; when several start in the
/// same pass, the one registered last wins.
#[derive(Debug, Default)]
pub struct ViewportTracker {
    band: TrackingBand,
    sections: Vec<TrackedSection>,
    active: Option<String>,
}

impl ViewportTracker {
    pub fn new(band: TrackingBand) -> Self {
        Self {
            band,
            sections: Vec::new(),
            active: None,
        }
    }

    pub fn active(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn is_registered(&self, id: &str) -> bool {
        self.sections.iter().any(|section| section.id == id)
    }

    pub fn registered(&self) -> impl Iterator<Item = &str> {
        self.sections.iter().map(|section| section.id.as_str())
    }

    /// Returns false when the identifier is already registered.
    pub fn register(&mut self, id: impl Into<String>) -> bool {
        let id = id.into();
        if self.is_registered(&id) {
            return false;
        }

        self.sections.push(TrackedSection {
            id,
            intersecting: false,
        });
        true
    }

    /// Drops the section; clears the active identifier if it pointed at it.
    pub fn unregister(&mut self, id: &str) -> bool {
        let before = self.sections.len();
        self.sections.retain(|section| section.id != id);

        if self.active.as_deref() == Some(id) {
            self.active = None;
        }
        self.sections.len() != before
    }

    /// Runs one layout pass. `measure` returns the section's current region, or
    /// `None` when it has not been laid out yet; such sections are skipped and
    /// keep their previous state. Returns the active identifier if this pass
    /// changed it.
    pub fn observe<F>(&mut self, viewport_height: f64, mut measure: F) -> Option<&str>
    where
        F: FnMut(&str) -> Option<Region>,
    {
        let band = self.band.region(viewport_height);
        let mut entered = None;

        for (index, section) in self.sections.iter_mut().enumerate() {
            let Some(region) = measure(&section.id) else {
                continue;
            };

            let intersecting = region.intersects(&band);
            if intersecting && !section.intersecting {
                entered = Some(index);
            }
            section.intersecting = intersecting;
        }

        let entered = entered.map(|index| self.sections[index].id.clone())?;
        if self.active.as_ref() == Some(&entered) {
            return None;
        }

        self.active = Some(entered);
        self.active.as_deref()
    }
}

/// Tracker shared between the page and the registration guards it hands out.
///
/// A guard dropped while the tracker is borrowed queues its identifier; the
/// queue is drained before the tracker is next touched.
#[derive(Clone, Debug, Default)]
pub struct SharedTracker {
    inner: Rc<RefCell<ViewportTracker>>,
    released: Rc<RefCell<Vec<String>>>,
}

impl SharedTracker {
    pub fn new(band: TrackingBand) -> Self {
        Self {
            inner: Rc::new(RefCell::new(ViewportTracker::new(band))),
            released: Rc::default(),
        }
    }

    /// Registers a section for as long as the returned guard lives. A duplicate
    /// identifier yields no guard.
    pub fn register(&self, id: impl Into<String>) -> Option<Registration> {
        let id = id.into();
        let registered = self.with(|tracker| tracker.register(id.clone()));
        if !registered {
            return None;
        }

        Some(Registration {
            tracker: Rc::clone(&self.inner),
            released: Rc::clone(&self.released),
            id,
        })
    }

    pub fn active(&self) -> Option<String> {
        self.with(|tracker| tracker.active().map(str::to_string))
    }

    pub fn with<R>(&self, f: impl FnOnce(&mut ViewportTracker) -> R) -> R {
        let mut tracker = self.inner.borrow_mut();
        for id in self.released.borrow_mut().drain(..) {
            tracker.unregister(&id);
        }
        f(&mut tracker)
    }
}

/// Keeps one section registered; dropping it unregisters the section exactly
/// once.
#[derive(Debug)]
pub struct Registration {
    tracker: Rc<RefCell<ViewportTracker>>,
    released: Rc<RefCell<Vec<String>>>,
    id: String,
}

impl Drop for Registration {
    fn drop(&mut self) {
        let id = std::mem::take(&mut self.id);
        match self.tracker.try_borrow_mut() {
            Ok(mut tracker) => {
                tracker.unregister(&id);
            }
            Err(_) => {
                log_event(
                    LogLevel::Debug,
                    "section_release_deferred",
                    serde_json::json!({ "section": id.as_str() }),
                );
                self.released.borrow_mut().push(id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: [(&str, f64); 6] = [
        ("hero", 800.0),
        ("about", 600.0),
        ("projects", 1200.0),
        ("experience", 900.0),
        ("education", 500.0),
        ("contact", 400.0),
    ];

    fn page_tracker() -> ViewportTracker {
        let mut tracker = ViewportTracker::new(TrackingBand::default());
        for (id, _) in PAGE {
            assert!(tracker.register(id));
        }
        tracker
    }

    fn heights() -> Vec<Option<f64>> {
        PAGE.iter().map(|(_, height)| Some(*height)).collect()
    }

    /// Lays the registered sections out top to bottom with the given heights
    /// and runs one pass at `scroll_y`.
    fn observe_stacked<'a>(
        tracker: &'a mut ViewportTracker,
        scroll_y: f64,
        viewport_height: f64,
        heights: &[Option<f64>],
    ) -> Option<&'a str> {
        let mut offset = 0.0;
        let regions: Vec<(String, Option<Region>)> = tracker
            .registered()
            .zip(heights.iter().chain(std::iter::repeat(&None)))
            .map(|(id, height)| {
                let region = height.map(|height| Region::new(offset - scroll_y, height));
                offset += height.unwrap_or(0.0);
                (id.to_string(), region)
            })
            .collect();

        tracker.observe(viewport_height, |id| {
            regions
                .iter()
                .find(|(candidate, _)| candidate == id)
                .and_then(|(_, region)| *region)
        })
    }

    #[test]
    fn band_is_the_strip_below_the_top_fifth() {
        let band = TrackingBand::default().region(1000.0);
        assert!((band.top - 200.0).abs() < 1e-9);
        assert!((band.bottom - 300.0).abs() < 1e-9);
    }

    #[test]
    fn scrolled_into_projects_activates_projects() {
        let mut tracker = page_tracker();

        let changed = observe_stacked(&mut tracker, 1450.0, 800.0, &heights());
        assert_eq!(changed, Some("projects"));
        assert_eq!(tracker.active(), Some("projects"));
    }

    #[test]
    fn nothing_is_active_before_the_first_pass() {
        let tracker = page_tracker();
        assert_eq!(tracker.active(), None);
    }

    #[test]
    fn scrolling_down_walks_through_sections() {
        let mut tracker = page_tracker();
        let heights = heights();

        observe_stacked(&mut tracker, 0.0, 800.0, &heights);
        assert_eq!(tracker.active(), Some("hero"));

        observe_stacked(&mut tracker, 700.0, 800.0, &heights);
        assert_eq!(tracker.active(), Some("about"));

        observe_stacked(&mut tracker, 3250.0, 800.0, &heights);
        assert_eq!(tracker.active(), Some("experience"));
    }

    #[test]
    fn unchanged_focus_reports_no_change() {
        let mut tracker = page_tracker();
        let heights = heights();

        assert_eq!(observe_stacked(&mut tracker, 1450.0, 800.0, &heights), Some("projects"));
        assert_eq!(observe_stacked(&mut tracker, 1500.0, 800.0, &heights), None);
        assert_eq!(tracker.active(), Some("projects"));
    }

    #[test]
    fn later_registration_wins_a_tie() {
        let mut tracker = ViewportTracker::new(TrackingBand::default());
        tracker.register("first");
        tracker.register("second");

        let band = Region::new(200.0, 100.0);
        tracker.observe(1000.0, |_| Some(band));
        assert_eq!(tracker.active(), Some("second"));
    }

    #[test]
    fn section_still_inside_the_band_does_not_retake_focus() {
        let mut tracker = ViewportTracker::new(TrackingBand::default());
        tracker.register("tall");
        tracker.register("short");

        // Both overlap: "short" wins the first pass.
        tracker.observe(1000.0, |_| Some(Region::new(0.0, 1000.0)));
        assert_eq!(tracker.active(), Some("short"));

        // "short" leaves; "tall" never stopped intersecting so nothing new enters.
        tracker.observe(1000.0, |id| match id {
            "tall" => Some(Region::new(0.0, 1000.0)),
            _ => Some(Region::new(-500.0, 100.0)),
        });
        assert_eq!(tracker.active(), Some("short"));
    }

    #[test]
    fn unmeasured_sections_are_skipped() {
        let mut tracker = page_tracker();

        let changed = tracker.observe(800.0, |id| {
            (id == "about").then(|| Region::new(100.0, 600.0))
        });
        assert_eq!(changed, Some("about"));

        assert_eq!(tracker.observe(800.0, |_| None), None);
        assert_eq!(tracker.active(), Some("about"));
    }

    #[test]
    fn duplicate_identifiers_are_refused() {
        let mut tracker = ViewportTracker::default();
        assert!(tracker.register("about"));
        assert!(!tracker.register("about"));
        assert_eq!(tracker.registered().count(), 1);
    }

    #[test]
    fn dropping_the_registration_clears_a_stale_active_section() {
        let shared = SharedTracker::new(TrackingBand::default());
        let hero = shared.register("hero").expect("first registration");
        let about = shared.register("about").expect("first registration");
        assert!(shared.register("about").is_none());

        shared.with(|tracker| {
            tracker.observe(800.0, |id| (id == "about").then(|| Region::new(0.0, 600.0)))
                .map(str::to_string)
        });
        assert_eq!(shared.active().as_deref(), Some("about"));

        drop(about);
        assert_eq!(shared.active(), None);
        assert!(!shared.with(|tracker| tracker.is_registered("about")));
        assert!(shared.with(|tracker| tracker.is_registered("hero")));

        drop(hero);
        assert_eq!(shared.with(|tracker| tracker.registered().count()), 0);
    }

    #[test]
    fn guard_dropped_during_a_borrow_still_unregisters() {
        let shared = SharedTracker::new(TrackingBand::default());
        let about = shared.register("about").expect("first registration");
        let _contact = shared.register("contact").expect("first registration");

        shared.with(|tracker| {
            tracker.observe(800.0, |id| (id == "about").then(|| Region::new(0.0, 600.0)));
            drop(about);
            assert!(tracker.is_registered("about"));
        });

        assert!(!shared.with(|tracker| tracker.is_registered("about")));
        assert_eq!(shared.active(), None);
        assert_eq!(
            shared.with(|tracker| tracker.registered().map(str::to_string).collect::<Vec<_>>()),
            vec!["contact".to_string()]
        );
        assert!(shared.register("about").is_some());
    }
}
