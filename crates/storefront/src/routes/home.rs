//! Landing page route handler.
//!
//! The landing page is static marketing content: an iMac hero banner, a
//! horizontally scrolling iPhone feature showcase, an iPad essentials grid
//! and an AirPods comparison grid.

use askama::Template;
use askama_web::WebTemplate;
use axum::response::IntoResponse;
use orchard_core::Price;
use tracing::instrument;

use crate::filters;
use crate::routes::{NavLink, nav_links};

// =============================================================================
// Landing Content
// =============================================================================

/// Hero banner at the top of the landing page.
#[derive(Clone)]
pub struct HeroBanner {
    pub title: &'static str,
    pub button_text: &'static str,
    pub button_url: &'static str,
    pub image_path: &'static str,
    pub image_alt: &'static str,
}

impl Default for HeroBanner {
    fn default() -> Self {
        Self {
            title: "iMac",
            button_text: "Buy",
            button_url: "/store/imac",
            image_path: "/static/images/imac.jpg",
            image_alt: "iMac in seven colors",
        }
    }
}

/// Visual theme of a showcase slide (maps to a CSS class).
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum SlideTheme {
    Ocean,
    Amber,
    Shade,
    Meadow,
    Night,
}

impl SlideTheme {
    /// CSS class for the slide background.
    #[must_use]
    pub const fn css_class(self) -> &'static str {
        match self {
            Self::Ocean => "slide-ocean",
            Self::Amber => "slide-amber",
            Self::Shade => "slide-shade",
            Self::Meadow => "slide-meadow slide-dark-text",
            Self::Night => "slide-night",
        }
    }
}

/// One card of the iPhone feature showcase.
#[derive(Clone)]
pub struct ShowcaseSlide {
    pub category: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub theme: SlideTheme,
    pub image_path: &'static str,
}

/// iPhone feature showcase slides, in scroll order.
fn showcase_slides() -> Vec<ShowcaseSlide> {
    vec![
        ShowcaseSlide {
            category: "Innovation",
            title: "Beautiful and durable, by design.",
            description: "Advanced screen protection system with new generation of gorilla glass",
            theme: SlideTheme::Ocean,
            image_path: "/static/images/screen.png",
        },
        ShowcaseSlide {
            category: "Chip and Battery Life",
            title: "Fast that lasts.",
            description: "A18 Pro chip delivers incredible performance and efficiency",
            theme: SlideTheme::Amber,
            image_path: "/static/images/chip.jpg",
        },
        ShowcaseSlide {
            category: "Peace of mind",
            title: "Helpful features. On and off the grid.",
            description: "Unique safety features allow iPhone to connect to satellite frequencies",
            theme: SlideTheme::Shade,
            image_path: "/static/images/mind.jpg",
        },
        ShowcaseSlide {
            category: "Environment",
            title: "Recycle. Reuse. Repeat.",
            description: "Carbon neutral and made with recycled materials",
            theme: SlideTheme::Meadow,
            image_path: "/static/images/recycle.jpg",
        },
        ShowcaseSlide {
            category: "Privacy",
            title: "Your data. Just yours.",
            description: "Privacy built into everything we do",
            theme: SlideTheme::Night,
            image_path: "/static/images/sec.jpg",
        },
    ]
}

/// An accessory card in the iPad essentials grid.
#[derive(Clone)]
pub struct EssentialCard {
    pub title: &'static str,
    pub tagline: &'static str,
    pub image_path: &'static str,
    pub link: &'static str,
}

fn ipad_essentials() -> Vec<EssentialCard> {
    vec![
        EssentialCard {
            title: "Apple Pencil",
            tagline: "Dream it up. Jot it down.",
            image_path: "/static/images/pencil.jpg",
            link: "/store/ipad",
        },
        EssentialCard {
            title: "Magic Keyboard",
            tagline: "Type it out. Take it with you.",
            image_path: "/static/images/keyboard.jpg",
            link: "/store/ipad",
        },
    ]
}

/// A model in the AirPods comparison grid.
#[derive(Clone)]
pub struct ComparisonCard {
    pub name: &'static str,
    pub subtitle: Option<&'static str>,
    pub description: &'static str,
    pub price: Price,
    pub image_path: &'static str,
}

fn airpods_comparison() -> Vec<ComparisonCard> {
    vec![
        ComparisonCard {
            name: "AirPods 4",
            subtitle: None,
            description: "The next evolution of sound and comfort.",
            price: Price::from_dollars(129),
            image_path: "/static/images/airpods-4.png",
        },
        ComparisonCard {
            name: "AirPods 4",
            subtitle: Some("Active Noise Cancellation"),
            description: "The next evolution of sound, comfort, and noise control.",
            price: Price::from_dollars(179),
            image_path: "/static/images/airpods-4-anc.png",
        },
        ComparisonCard {
            name: "AirPods Pro 2",
            subtitle: None,
            description: "Pro-level Active Noise Cancellation and a breakthrough in hearing health.",
            price: Price::from_dollars(249),
            image_path: "/static/images/airpods-pro-2.png",
        },
        ComparisonCard {
            name: "AirPods Max",
            subtitle: None,
            description: "The ultimate over-ear listening experience.",
            price: Price::from_dollars(549),
            image_path: "/static/images/airpods-max.png",
        },
    ]
}

/// Landing page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub nav: Vec<NavLink>,
    pub hero: HeroBanner,
    pub showcase: Vec<ShowcaseSlide>,
    pub essentials: Vec<EssentialCard>,
    pub comparison: Vec<ComparisonCard>,
}

impl HomeTemplate {
    /// Landing page with its static content.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nav: nav_links(None),
            hero: HeroBanner::default(),
            showcase: showcase_slides(),
            essentials: ipad_essentials(),
            comparison: airpods_comparison(),
        }
    }
}

impl Default for HomeTemplate {
    fn default() -> Self {
        Self::new()
    }
}

/// Display the landing page.
#[instrument]
pub async fn home() -> impl IntoResponse {
    HomeTemplate::new()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_landing_renders_all_sections() {
        let html = HomeTemplate::new().render().unwrap();
        assert!(html.contains("Fast that lasts."));
        assert!(html.contains("Apple Pencil"));
        assert!(html.contains("AirPods Max"));
        assert!(html.contains("$549"));
        assert!(html.contains("href=\"/store/imac\""));
    }

    #[test]
    fn test_showcase_order() {
        let categories: Vec<&str> = showcase_slides().iter().map(|s| s.category).collect();
        assert_eq!(
            categories,
            vec![
                "Innovation",
                "Chip and Battery Life",
                "Peace of mind",
                "Environment",
                "Privacy"
            ]
        );
    }
}
