use crate::domain::model::{ConfirmControl, Notice};
use crate::domain::ports::DisplaySink;

/// Transient presentation effects layered over a display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Scale pulse on a freshly selected card.
    Pulse { id: String },
    /// Shake on a card that could not be afforded.
    Shake { id: String },
    /// Page finished loading.
    Loaded,
    /// Smooth scroll to a same-page anchor.
    ScrollTo { anchor: String },
}

/// Optional decorator that adds pulse/shake effects to any [`DisplaySink`].
///
/// The controller never depends on it; wrap a sink to get the effects, or don't.
#[derive(Debug)]
pub struct EffectsDecorator<D: DisplaySink> {
    inner: D,
    effects: Vec<Effect>,
}

impl<D: DisplaySink> EffectsDecorator<D> {
    pub fn new(inner: D) -> Self {
        Self {
            inner,
            effects: Vec::new(),
        }
    }

    pub fn mark_loaded(&mut self) {
        self.effects.push(Effect::Loaded);
    }

    /// Same-page anchors only (`#section`); anything else is ignored.
    pub fn scroll_to_anchor(&mut self, href: &str) -> bool {
        match href.strip_prefix('#') {
            Some(anchor) if !anchor.is_empty() => {
                self.effects.push(Effect::ScrollTo {
                    anchor: anchor.to_string(),
                });
                true
            }
            _ => false,
        }
    }

    pub fn effects(&self) -> &[Effect] {
        &self.effects
    }

    pub fn drain_effects(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.effects)
    }

    pub fn inner(&self) -> &D {
        &self.inner
    }

    pub fn into_inner(self) -> D {
        self.inner
    }
}

impl<D: DisplaySink> DisplaySink for EffectsDecorator<D> {
    fn mark_selected(&mut self, id: &str, selected: bool) {
        self.inner.mark_selected(id, selected);
    }

    fn set_confirm_state(&mut self, control: &ConfirmControl) {
        self.inner.set_confirm_state(control);
    }

    fn set_remaining_display(&mut self, text: &str, low: bool) {
        self.inner.set_remaining_display(text, low);
    }

    fn flash_insufficient(&mut self, id: &str, message: &str) {
        self.effects.push(Effect::Shake { id: id.to_string() });
        self.inner.flash_insufficient(id, message);
    }

    fn clear_insufficient(&mut self, id: &str) {
        self.inner.clear_insufficient(id);
    }

    fn flash_success(&mut self, id: &str) {
        self.effects.push(Effect::Pulse { id: id.to_string() });
        self.inner.flash_success(id);
    }

    fn show_notice(&mut self, notice: &Notice) {
        self.inner.show_notice(notice);
    }

    fn has_confirm_control(&self) -> bool {
        self.inner.has_confirm_control()
    }
}
