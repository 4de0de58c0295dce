use std::rc::Rc;

use gloo::events::{EventListener, EventListenerOptions};
use wasm_bindgen::JsCast;
use web_sys::{window, Element, MouseEvent, Node};
use yew::prelude::*;

use crate::browser::{
    apply_theme, apply_theme_with_transition, current_year, region_of, scroll_y,
    system_prefers_dark, viewport_size, BrowserStore,
};
use crate::canvas::SceneCanvas;
use crate::content::{ContactLink, Portfolio};
use crate::page::{heading_number, Backdrop, PageAction, PageController, SECTIONS};
use crate::scene::{HERO_SCENE, SECTION_SCENE};
use crate::telemetry::{log_event, LogLevel};
use crate::viewport::{Region, SharedTracker, TrackingBand};

impl Reducible for PageController<BrowserStore> {
    type Action = PageAction;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        let mut next = (*self).clone();
        next.dispatch(action);
        Rc::new(next)
    }
}

fn load_content() -> Option<Portfolio> {
    match Portfolio::embedded() {
        Ok(portfolio) => Some(portfolio),
        Err(error) => {
            log_event(
                LogLevel::Warn,
                "content_load_failed",
                serde_json::json!({ "error": error.to_string() }),
            );
            None
        }
    }
}

/// Reads layout once and feeds scroll, viewport, section heights and the
/// tracker's current active section to the page.
fn sample_layout(
    section_refs: &[NodeRef],
    tracker: &SharedTracker,
    dispatcher: &UseReducerDispatcher<PageController<BrowserStore>>,
) {
    let (width, height) = viewport_size();
    let regions: Vec<Option<Region>> = section_refs
        .iter()
        .map(|node| node.cast::<Element>().map(|element| region_of(&element)))
        .collect();

    let follow = tracker.with(|tracker| {
        tracker.observe(height, |id| {
            SECTIONS
                .iter()
                .position(|section| section.id == id)
                .and_then(|index| regions.get(index).copied().flatten())
        });
        PageAction::follow_tracker(tracker)
    });

    dispatcher.dispatch(PageAction::Resized { width, height });
    dispatcher.dispatch(PageAction::SectionsMeasured {
        heights: regions
            .iter()
            .map(|region| region.map(|region| region.bottom - region.top))
            .collect(),
    });
    dispatcher.dispatch(PageAction::Scrolled {
        scroll_y: scroll_y(),
    });
    dispatcher.dispatch(follow);
}

#[derive(Properties, PartialEq)]
struct ExternalLinkProps {
    href: AttrValue,
    label: AttrValue,
    #[prop_or_default]
    class: Classes,
    #[prop_or_default]
    children: Html,
}

#[function_component(ExternalLink)]
fn external_link(props: &ExternalLinkProps) -> Html {
    html! {
        <a
            class={props.class.clone()}
            href={props.href.clone()}
            target="_blank"
            rel="noopener noreferrer"
        >
            {props.children.clone()}
            <span>{props.label.clone()}</span>
            <span class="external-mark" aria-hidden="true">{"↗"}</span>
            <span class="sr-only">{" (opens in a new tab)"}</span>
        </a>
    }
}

fn contact_item(link: &ContactLink) -> Html {
    let icon = html! { <span class="contact-icon" aria-hidden="true">{link.kind.icon()}</span> };

    match link.href.as_deref() {
        Some(href) if link.kind.opens_new_tab() => html! {
            <ExternalLink class={classes!("contact-item")} href={href.to_string()} label={link.label.clone()}>
                {icon}
            </ExternalLink>
        },
        Some(href) => html! {
            <a class="contact-item" href={href.to_string()}>
                {icon}
                <span>{link.label.clone()}</span>
            </a>
        },
        None => html! {
            <div class="contact-item">
                {icon}
                <span>{link.label.clone()}</span>
            </div>
        },
    }
}

fn section_title(id: &str, heading: &str) -> Html {
    html! {
        <h2 class="section-title" id={format!("{id}-heading")}>
            <span class="title-number">{heading_number(id).unwrap_or_default()}</span>
            {heading.to_string()}
        </h2>
    }
}

fn section_body(id: &str, portfolio: &Portfolio) -> Html {
    match id {
        "hero" => html! {
            <div class="hero-content">
                <h1 class="hero-name">
                    <span class="name-line">{portfolio.profile.first_name.clone()}</span>
                    <span class="name-line">{portfolio.profile.last_name.clone()}</span>
                </h1>
                <div class="hero-subtitle">
                    <span class="typing-text">{portfolio.profile.headline.clone()}</span>
                    <span class="cursor" aria-hidden="true">{"|"}</span>
                </div>
                <p class="hero-description">{portfolio.profile.tagline.clone()}</p>
                <div class="hero-buttons">
                    <a href="#projects" class="btn btn-primary">{"View Projects"}</a>
                    <a href="#contact" class="btn btn-secondary">{"Get in Touch"}</a>
                </div>
            </div>
        },
        "about" => html! {
            <div class="about-content">
                { for portfolio.about.iter().map(|paragraph| html! { <p>{paragraph.clone()}</p> }) }
                <div class="about-highlights">
                    { for portfolio.highlights.iter().map(|highlight| html! {
                        <div class="highlight-item">
                            <span class="highlight-number">{highlight.value.clone()}</span>
                            <span class="highlight-label">{highlight.label.clone()}</span>
                        </div>
                    }) }
                </div>
            </div>
        },
        "experience" => html! {
            <div class="timeline">
                { for portfolio.experience.iter().map(|entry| html! {
                    <div class="timeline-item">
                        <div class="timeline-marker"></div>
                        <div class="timeline-content">
                            <div class="timeline-header">
                                <h3>{entry.title.clone()}</h3>
                                <span class="timeline-company">{entry.company.clone()}</span>
                            </div>
                            <div class="timeline-meta">
                                <span class="timeline-location">{entry.location.clone()}</span>
                                <span class="timeline-period">{entry.period.clone()}</span>
                            </div>
                            <ul class="timeline-responsibilities">
                                { for entry.responsibilities.iter().map(|item| html! { <li>{item.clone()}</li> }) }
                            </ul>
                        </div>
                    </div>
                }) }
            </div>
        },
        "projects" => html! {
            <div class="projects-grid">
                { for portfolio.projects.iter().map(|project| html! {
                    <div class={classes!("project-card", project.status.as_str())}>
                        <div class="project-header">
                            <h3>{project.title.clone()}</h3>
                            <span class={classes!("project-status", project.status.as_str())}>
                                {project.status.label()}
                            </span>
                        </div>
                        <p class="project-description">{project.description.clone()}</p>
                        <div class="project-technologies">
                            { for project.technologies.iter().map(|tech| html! {
                                <span class="tech-tag">{tech.clone()}</span>
                            }) }
                        </div>
                    </div>
                }) }
            </div>
        },
        "education" => html! {
            <div class="education-grid">
                { for portfolio.education.iter().map(|entry| html! {
                    <div class="education-card">
                        <h3>{entry.degree.clone()}</h3>
                        <p class="education-institution">{entry.institution.clone()}</p>
                        <p class="education-period">{entry.period.clone()}</p>
                        if let Some(courses) = entry.courses.as_ref() {
                            <div class="education-courses">
                                <strong>{"Key courses:"}</strong>
                                <ul>
                                    { for courses.iter().map(|course| html! { <li>{course.clone()}</li> }) }
                                </ul>
                            </div>
                        }
                    </div>
                }) }
            </div>
        },
        "skills" => html! {
            <div class="skills-grid">
                { for portfolio.skills.iter().map(|category| html! {
                    <div class="skill-category">
                        <h3>{category.name.clone()}</h3>
                        <div class="skill-items">
                            { for category.items.iter().map(|item| html! {
                                <span class="skill-item">{item.clone()}</span>
                            }) }
                        </div>
                    </div>
                }) }
            </div>
        },
        "contact" => html! {
            <div class="contact-content">
                <p class="contact-description">{portfolio.contact.intro.clone()}</p>
                <div class="contact-info">
                    { for portfolio.contact.links.iter().map(contact_item) }
                </div>
            </div>
        },
        _ => html! {},
    }
}

#[function_component(App)]
fn app() -> Html {
    let content = use_memo((), |_| load_content());
    let page = use_reducer(|| PageController::load(BrowserStore, system_prefers_dark()));
    let tracker = use_memo((), |_| SharedTracker::new(TrackingBand::default()));
    let section_refs = use_memo((), |_| {
        SECTIONS.iter().map(|_| NodeRef::default()).collect::<Vec<_>>()
    });
    let menu_ref = use_node_ref();

    {
        let current = page.state().theme;
        use_effect_with((), move |_| {
            apply_theme(current);
            || ()
        });
    }

    {
        let dispatcher = page.dispatcher();
        let tracker = tracker.clone();
        let section_refs = section_refs.clone();
        let menu_ref = menu_ref.clone();
        use_effect_with((), move |_| {
            let registrations: Vec<_> = SECTIONS
                .iter()
                .filter_map(|section| tracker.register(section.id))
                .collect();

            let sample: Rc<dyn Fn()> = {
                let dispatcher = dispatcher.clone();
                Rc::new(move || sample_layout(&section_refs, &tracker, &dispatcher))
            };
            sample();

            let mut listeners = Vec::new();
            if let Some(win) = window() {
                let passive = EventListenerOptions::default();
                for event in ["scroll", "resize"] {
                    let sample = Rc::clone(&sample);
                    listeners.push(EventListener::new_with_options(
                        &win,
                        event,
                        passive,
                        move |_| sample(),
                    ));
                }

                let pointer = dispatcher.clone();
                listeners.push(EventListener::new_with_options(
                    &win,
                    "mousemove",
                    passive,
                    move |event| {
                        if let Some(event) = event.dyn_ref::<MouseEvent>() {
                            pointer.dispatch(PageAction::PointerMoved {
                                x: f64::from(event.client_x()),
                                y: f64::from(event.client_y()),
                            });
                        }
                    },
                ));

                if let Some(document) = win.document() {
                    let outside = dispatcher.clone();
                    listeners.push(EventListener::new(&document, "click", move |event| {
                        let target = event.target().and_then(|target| target.dyn_into::<Node>().ok());
                        let inside = menu_ref
                            .cast::<Element>()
                            .is_some_and(|menu| menu.contains(target.as_ref()));
                        if !inside {
                            outside.dispatch(PageAction::ClickedOutsideMenu);
                        }
                    }));
                }
            }

            move || {
                drop(listeners);
                drop(registrations);
            }
        });
    }

    let state = page.state();

    let on_toggle_theme = {
        let page = page.clone();
        Callback::from(move |_| {
            let next = page.state().theme.toggled();
            page.dispatch(PageAction::ToggleTheme);
            apply_theme_with_transition(next);
        })
    };

    let on_toggle_menu = {
        let page = page.clone();
        Callback::from(move |_| page.dispatch(PageAction::ToggleMenu))
    };

    let nav_links = SECTIONS
        .iter()
        .filter_map(|section| section.nav_label.map(|label| (section.id, label)))
        .map(|(id, label)| {
            let onclick = {
                let page = page.clone();
                Callback::from(move |_| {
                    page.dispatch(PageAction::NavigationActivated { id: id.to_string() })
                })
            };
            let active = state.is_active(id);
            let aria_current = active.then(|| AttrValue::from("location"));
            html! {
                <a
                    href={format!("#{id}")}
                    class={classes!(active.then_some("active"))}
                    aria-current={aria_current}
                    onclick={onclick}
                >
                    {label}
                </a>
            }
        })
        .collect::<Html>();

    let portfolio: Option<&Portfolio> = Option::as_ref(&content);
    let pointer = state.normalized_pointer();
    let sections = SECTIONS
        .iter()
        .zip(section_refs.iter())
        .map(|(section, node)| {
            let backdrop = match section.backdrop {
                Backdrop::Hero => html! {
                    <div class="scene-layer">
                        <SceneCanvas config={&HERO_SCENE} scroll_offset={state.scroll_y} {pointer} />
                    </div>
                },
                Backdrop::Section => html! {
                    <div class="scene-layer">
                        <SceneCanvas config={&SECTION_SCENE} scroll_offset={state.scene_offset(section.id)} />
                    </div>
                },
                Backdrop::None => html! {},
            };
            let body = portfolio
                .map(|portfolio| section_body(section.id, portfolio))
                .unwrap_or_default();
            let class = if section.id == "hero" {
                classes!("hero")
            } else {
                classes!("section", section.id)
            };

            html! {
                <section id={section.id} ref={node.clone()} class={class}>
                    {backdrop}
                    <div class="container">
                        if let Some(heading) = section.heading {
                            {section_title(section.id, heading)}
                        }
                        {body}
                    </div>
                </section>
            }
        })
        .collect::<Html>();

    let brand = portfolio
        .map(|portfolio| portfolio.profile.first_name.clone())
        .unwrap_or_default();
    let owner = portfolio
        .map(|portfolio| portfolio.profile.full_name())
        .unwrap_or_default();

    html! {
        <div class="app">
            <a class="skip-link" href="#content">{"Skip to main content"}</a>
            <nav class="navbar" ref={menu_ref} aria-label="Sections">
                <div class="nav-container">
                    <div class="nav-logo">{brand}</div>
                    <button
                        class="nav-toggle"
                        type="button"
                        aria-label="Toggle navigation"
                        aria-expanded={state.menu_open.to_string()}
                        onclick={on_toggle_menu}
                    >
                        <span aria-hidden="true">{if state.menu_open { "✕" } else { "☰" }}</span>
                    </button>
                    <div class={classes!("nav-links", state.menu_open.then_some("open"))}>
                        {nav_links}
                    </div>
                    <button
                        class="theme-toggle"
                        type="button"
                        aria-label={state.theme.toggle_label()}
                        onclick={on_toggle_theme}
                    >
                        <span aria-hidden="true">{state.theme.icon()}</span>
                    </button>
                </div>
            </nav>
            <main id="content">
                {sections}
            </main>
            <footer class="footer">
                <div class="container">
                    <p>{format!("© {} {owner}. Built with Rust & Yew.", current_year())}</p>
                </div>
            </footer>
        </div>
    }
}

pub fn run() {
    yew::Renderer::<App>::with_root(
        window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id("app"))
            .expect("missing #app mount point"),
    )
    .render();
}
