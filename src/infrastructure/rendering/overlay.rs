use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlElement};

use crate::domain::chart::{BadgeEdge, BadgeSurface, Color, EdgeBadge};
use crate::domain::logging::{LogComponent, get_logger};

/// Edge badges as absolutely positioned children of the chart container.
pub struct DomBadgeSurface {
    document: Document,
    container: HtmlElement,
}

impl DomBadgeSurface {
    pub fn new(document: Document, container: HtmlElement) -> Self {
        Self { document, container }
    }

    fn style(element: &HtmlElement, badge: &EdgeBadge) {
        let vertical = match badge.edge {
            BadgeEdge::Top => "top: 4px;",
            BadgeEdge::Bottom => "bottom: 32px;",
        };
        let color = Color::for_zone(badge.zone).with_alpha(badge.opacity).to_css();
        let css = format!(
            "position: absolute; right: 80px; {vertical} padding: 1px 6px; border-radius: 3px; \
             font: 11px ui-monospace, monospace; pointer-events: none; \
             border: 1px solid {color}; color: {color}; background: rgba(17, 21, 28, 0.85);"
        );
        let _ = element.set_attribute("style", &css);
        element.set_text_content(Some(&badge.text()));
    }
}

impl BadgeSurface for DomBadgeSurface {
    type Handle = HtmlElement;

    fn create(&mut self, badge: &EdgeBadge) -> Option<HtmlElement> {
        let element = self
            .document
            .create_element("div")
            .ok()?
            .dyn_into::<HtmlElement>()
            .ok()?;
        Self::style(&element, badge);
        if let Err(e) = self.container.append_child(&element) {
            get_logger().warn(
                LogComponent::Infrastructure("Overlay"),
                &format!("failed to attach badge {}: {e:?}", badge.label),
            );
            return None;
        }
        Some(element)
    }

    fn update(&mut self, handle: &HtmlElement, badge: &EdgeBadge) {
        Self::style(handle, badge);
    }

    fn remove(&mut self, handle: HtmlElement) {
        handle.remove();
    }
}
