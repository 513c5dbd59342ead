use crate::render::{Control, ControlKind};
use std::sync::Arc;

/// Measures rendered text width in pixels.
pub trait FontMetrics: Send + Sync {
    fn text_width(&self, text: &str) -> f32;
}

/// Fixed advance per character.
#[derive(Debug, Clone, Copy)]
pub struct MonospaceMetrics {
    pub char_width: f32,
}

impl Default for MonospaceMetrics {
    fn default() -> Self {
        Self { char_width: 8.0 }
    }
}

impl FontMetrics for MonospaceMetrics {
    fn text_width(&self, text: &str) -> f32 {
        text.chars().count() as f32 * self.char_width
    }
}

/// Bounds for text control widths.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WidthPolicy {
    /// Width of the containing panel.
    pub panel_width: f32,
    /// Absolute upper bound regardless of panel size.
    pub cap: f32,
    /// Border and caret allowance added to the measured text.
    pub padding: f32,
}

impl Default for WidthPolicy {
    fn default() -> Self {
        Self {
            panel_width: 800.0,
            cap: 400.0,
            padding: 4.0,
        }
    }
}

impl WidthPolicy {
    pub fn max_width(&self) -> f32 {
        (self.panel_width * 0.9).min(self.cap)
    }
}

/// Font metrics plus width bounds, shared by the renderer and the live form.
#[derive(Clone)]
pub struct Layout {
    metrics: Arc<dyn FontMetrics>,
    pub policy: WidthPolicy,
}

impl Default for Layout {
    fn default() -> Self {
        Self::new(Arc::new(MonospaceMetrics::default()), WidthPolicy::default())
    }
}

impl std::fmt::Debug for Layout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Layout").field("policy", &self.policy).finish()
    }
}

impl Layout {
    pub fn new(metrics: Arc<dyn FontMetrics>, policy: WidthPolicy) -> Self {
        Self { metrics, policy }
    }

    pub fn fit(&self, text: &str) -> f32 {
        (self.metrics.text_width(text) + self.policy.padding).min(self.policy.max_width())
    }

    /// Recomputes the width of a single-line text control. Other kinds keep no width.
    pub fn refresh(&self, control: &mut Control) {
        control.width = match control.kind {
            ControlKind::Text => Some(self.fit(control.display_text())),
            ControlKind::TextArea | ControlKind::Choice => None,
        };
    }
}
