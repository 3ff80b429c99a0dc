//! The four dialogue variants and their routing table.
//!
//! A variant is the cross of two study axes: whether the engine adapts its
//! questioning to the user (contingency) and whether the user may edit the
//! final summary (agency). Each variant owns a public route, an engine
//! endpoint, and a mask of which engine reply fields are passed through.

/// Whether the engine tailors follow-up questions to prior answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Contingency {
    Adaptive,
    Fixed,
}

/// Whether the user may revise the generated summary afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Agency {
    Editable,
    ReadOnly,
}

/// One cell of the 2x2 study design.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DialogueVariant {
    /// Adaptive questioning, editable summary.
    AdaptiveEditable,
    /// Adaptive questioning, read-only outcome.
    AdaptiveScripted,
    /// Fixed question order, editable summary.
    FixedEditable,
    /// Fixed question order, read-only outcome.
    FixedScripted,
}

/// Which engine reply fields a variant exposes to the client.
/// Fields outside the mask are dropped even when the engine sends them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldMask {
    pub summary: bool,
    pub summary_items: bool,
    pub total_score: bool,
    pub slots: bool,
    pub finished: bool,
    /// Whether the response echoes the encoded conversation history.
    pub echo_history: bool,
}

/// Static routing entry for one variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariantBinding {
    pub variant: DialogueVariant,
    /// Public path this variant is served on.
    pub route_path: &'static str,
    /// Path on the dialogue engine the exchange is forwarded to.
    pub upstream_path: &'static str,
    pub fields: FieldMask,
}

const ADAPTIVE_EDITABLE: VariantBinding = VariantBinding {
    variant: DialogueVariant::AdaptiveEditable,
    route_path: "/chatbot",
    upstream_path: "/api/chat",
    fields: FieldMask {
        summary: true,
        summary_items: true,
        total_score: true,
        slots: true,
        finished: false,
        echo_history: true,
    },
};

const ADAPTIVE_SCRIPTED: VariantBinding = VariantBinding {
    variant: DialogueVariant::AdaptiveScripted,
    route_path: "/phq9_high_c_low_u",
    upstream_path: "/api/phq9_high_c_low_u",
    fields: FieldMask {
        summary: false,
        summary_items: false,
        total_score: true,
        slots: true,
        finished: true,
        echo_history: false,
    },
};

const FIXED_EDITABLE: VariantBinding = VariantBinding {
    variant: DialogueVariant::FixedEditable,
    route_path: "/phq9_fixed_editable",
    upstream_path: "/api/phq9_fixed_editable",
    fields: FieldMask {
        summary: false,
        summary_items: true,
        total_score: false,
        slots: false,
        finished: false,
        echo_history: true,
    },
};

const FIXED_SCRIPTED: VariantBinding = VariantBinding {
    variant: DialogueVariant::FixedScripted,
    route_path: "/phq9_fixed",
    upstream_path: "/api/phq9_fixed",
    fields: FieldMask {
        summary: false,
        summary_items: false,
        total_score: false,
        slots: false,
        finished: false,
        echo_history: false,
    },
};

impl DialogueVariant {
    /// All variants, in study-design order.
    pub const ALL: [DialogueVariant; 4] = [
        DialogueVariant::AdaptiveEditable,
        DialogueVariant::AdaptiveScripted,
        DialogueVariant::FixedEditable,
        DialogueVariant::FixedScripted,
    ];

    /// Variant served when a selector cannot be mapped.
    pub const DEFAULT: DialogueVariant = DialogueVariant::AdaptiveEditable;

    pub fn binding(self) -> &'static VariantBinding {
        match self {
            DialogueVariant::AdaptiveEditable => &ADAPTIVE_EDITABLE,
            DialogueVariant::AdaptiveScripted => &ADAPTIVE_SCRIPTED,
            DialogueVariant::FixedEditable => &FIXED_EDITABLE,
            DialogueVariant::FixedScripted => &FIXED_SCRIPTED,
        }
    }

    pub fn contingency(self) -> Contingency {
        match self {
            DialogueVariant::AdaptiveEditable | DialogueVariant::AdaptiveScripted => {
                Contingency::Adaptive
            }
            DialogueVariant::FixedEditable | DialogueVariant::FixedScripted => Contingency::Fixed,
        }
    }

    pub fn agency(self) -> Agency {
        match self {
            DialogueVariant::AdaptiveEditable | DialogueVariant::FixedEditable => Agency::Editable,
            DialogueVariant::AdaptiveScripted | DialogueVariant::FixedScripted => Agency::ReadOnly,
        }
    }

    /// Strict selector lookup. Accepts the route stem with or without the
    /// leading slash; anything else is `None`.
    pub fn from_selector(selector: &str) -> Option<DialogueVariant> {
        let stem = selector.strip_prefix('/').unwrap_or(selector);
        match stem {
            "chatbot" => Some(DialogueVariant::AdaptiveEditable),
            "phq9_high_c_low_u" => Some(DialogueVariant::AdaptiveScripted),
            "phq9_fixed_editable" => Some(DialogueVariant::FixedEditable),
            "phq9_fixed" => Some(DialogueVariant::FixedScripted),
            _ => None,
        }
    }

    /// Selector lookup that fails open: an unknown selector resolves to
    /// [`DialogueVariant::DEFAULT`] so a stale or mistyped client still gets
    /// a working conversation instead of an error. The miss is logged for
    /// operators to notice.
    pub fn resolve(selector: &str) -> DialogueVariant {
        match Self::from_selector(selector) {
            Some(variant) => variant,
            None => {
                tracing::warn!(selector, "unknown dialogue selector, serving default variant");
                Self::DEFAULT
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_variants_have_distinct_routes_and_upstreams() {
        let mut routes: Vec<&str> = DialogueVariant::ALL
            .iter()
            .map(|v| v.binding().route_path)
            .collect();
        let mut upstreams: Vec<&str> = DialogueVariant::ALL
            .iter()
            .map(|v| v.binding().upstream_path)
            .collect();
        routes.sort_unstable();
        routes.dedup();
        upstreams.sort_unstable();
        upstreams.dedup();
        assert_eq!(routes.len(), 4);
        assert_eq!(upstreams.len(), 4);
    }

    #[test]
    fn binding_round_trips_through_selector() {
        for variant in DialogueVariant::ALL {
            let binding = variant.binding();
            assert_eq!(binding.variant, variant);
            assert_eq!(DialogueVariant::from_selector(binding.route_path), Some(variant));
        }
    }

    #[test]
    fn selector_accepts_bare_stem() {
        assert_eq!(
            DialogueVariant::from_selector("phq9_fixed"),
            Some(DialogueVariant::FixedScripted)
        );
        assert_eq!(
            DialogueVariant::from_selector("/chatbot"),
            Some(DialogueVariant::AdaptiveEditable)
        );
    }

    #[test]
    fn selector_is_exact_not_prefix() {
        assert_eq!(DialogueVariant::from_selector("/phq9_fixed_ed"), None);
        assert_eq!(DialogueVariant::from_selector("/chatbot2"), None);
        assert_eq!(DialogueVariant::from_selector(""), None);
    }

    #[test]
    fn unknown_selector_resolves_to_default() {
        assert_eq!(DialogueVariant::resolve("/nope"), DialogueVariant::DEFAULT);
        assert_eq!(DialogueVariant::resolve(""), DialogueVariant::AdaptiveEditable);
    }

    #[test]
    fn axes_match_the_study_design() {
        use super::{Agency::*, Contingency::*};
        assert_eq!(DialogueVariant::AdaptiveEditable.contingency(), Adaptive);
        assert_eq!(DialogueVariant::AdaptiveEditable.agency(), Editable);
        assert_eq!(DialogueVariant::AdaptiveScripted.contingency(), Adaptive);
        assert_eq!(DialogueVariant::AdaptiveScripted.agency(), ReadOnly);
        assert_eq!(DialogueVariant::FixedEditable.contingency(), Fixed);
        assert_eq!(DialogueVariant::FixedEditable.agency(), Editable);
        assert_eq!(DialogueVariant::FixedScripted.contingency(), Fixed);
        assert_eq!(DialogueVariant::FixedScripted.agency(), ReadOnly);
    }

    #[test]
    fn editable_variants_expose_summary_items() {
        for variant in DialogueVariant::ALL {
            let editable = variant.agency() == Agency::Editable;
            assert_eq!(variant.binding().fields.summary_items, editable);
        }
    }

    #[test]
    fn only_adaptive_editable_echoes_full_summary() {
        for variant in DialogueVariant::ALL {
            let expected = variant == DialogueVariant::AdaptiveEditable;
            assert_eq!(variant.binding().fields.summary, expected);
        }
    }
}
