//! Resolved attribute sets and inline deltas
//!
//! [`Attributes`] is the fixed record every output run carries. Inline styles
//! never replace it wholesale: they are [`InlineDelta`]s touching independent
//! facets, so bold from a strong ancestor and italic from an emphasis ancestor
//! both survive.

use serde::{Deserialize, Serialize};

use crate::style::{BlockStyle, Color, Font, LinkStyle, Slant, Weight};

/// Link destination carried out-of-band on a run
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LinkTarget {
    pub url: String,
    pub title: Option<String>,
}

/// Paragraph-level layout of a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ParagraphAttributes {
    /// Left indent of wrapped lines
    pub indent: f32,
    /// Left indent of the first line (smaller than `indent` for hanging list prefixes)
    pub first_line_indent: f32,
    /// Space below the paragraph; only non-zero on block separators
    pub spacing: f32,
}

/// Fully resolved presentation of a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attributes {
    pub font: Font,
    pub foreground: Color,
    pub background: Option<Color>,
    pub underline: bool,
    pub link: Option<LinkTarget>,
    pub paragraph: ParagraphAttributes,
}

impl Attributes {
    /// Base attributes of a block style, before nesting adjustments
    pub fn from_block(style: &BlockStyle) -> Self {
        Self {
            font: style.font.clone(),
            foreground: style.foreground,
            background: style.background,
            underline: false,
            link: None,
            paragraph: ParagraphAttributes::default(),
        }
    }

    pub fn is_bold(&self) -> bool {
        self.font.weight == Weight::Bold
    }

    pub fn is_italic(&self) -> bool {
        self.font.slant == Slant::Italic
    }
}

/// A change to some facets of an [`Attributes`], leaving the others alone
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InlineDelta {
    pub weight: Option<Weight>,
    pub slant: Option<Slant>,
    pub foreground: Option<Color>,
    pub underline: Option<bool>,
    pub link: Option<LinkTarget>,
}

impl InlineDelta {
    pub fn emphasis() -> Self {
        Self {
            slant: Some(Slant::Italic),
            ..Self::default()
        }
    }

    pub fn strong() -> Self {
        Self {
            weight: Some(Weight::Bold),
            ..Self::default()
        }
    }

    pub fn link(style: &LinkStyle, target: Option<LinkTarget>) -> Self {
        Self {
            foreground: Some(style.foreground),
            underline: Some(style.underline),
            link: target,
            ..Self::default()
        }
    }

    /// Compose with a delta applied after this one.
    ///
    /// Facets are combined independently; where both set the same facet,
    /// `later` wins for that facet only.
    pub fn then(&self, later: &InlineDelta) -> InlineDelta {
        InlineDelta {
            weight: later.weight.or(self.weight),
            slant: later.slant.or(self.slant),
            foreground: later.foreground.or(self.foreground),
            underline: later.underline.or(self.underline),
            link: later.link.clone().or_else(|| self.link.clone()),
        }
    }

    pub fn apply(&self, attributes: &mut Attributes) {
        if let Some(weight) = self.weight {
            attributes.font.weight = weight;
        }
        if let Some(slant) = self.slant {
            attributes.font.slant = slant;
        }
        if let Some(foreground) = self.foreground {
            attributes.foreground = foreground;
        }
        if let Some(underline) = self.underline {
            attributes.underline = underline;
        }
        if let Some(link) = &self.link {
            attributes.link = Some(link.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(url: &str) -> LinkTarget {
        LinkTarget {
            url: url.to_string(),
            title: None,
        }
    }

    #[test]
    fn test_independent_facets_commute() {
        let a = InlineDelta::strong().then(&InlineDelta::emphasis());
        let b = InlineDelta::emphasis().then(&InlineDelta::strong());
        assert_eq!(a, b);
        assert_eq!(a.weight, Some(Weight::Bold));
        assert_eq!(a.slant, Some(Slant::Italic));
    }

    #[test]
    fn test_same_facet_last_wins() {
        let style = LinkStyle::default();
        let outer = InlineDelta::link(&style, Some(target("https://outer.example")));
        let inner = InlineDelta::link(&style, Some(target("https://inner.example")));
        let composed = outer.then(&inner).then(&InlineDelta::strong());
        assert_eq!(composed.link, Some(target("https://inner.example")));
        assert_eq!(composed.weight, Some(Weight::Bold));
    }

    #[test]
    fn test_apply_touches_only_set_facets() {
        let mut attributes = Attributes::from_block(&BlockStyle::default());
        let before = attributes.clone();
        InlineDelta::emphasis().apply(&mut attributes);
        assert!(attributes.is_italic());
        assert!(!attributes.is_bold());
        assert_eq!(attributes.font.size, before.font.size);
        assert_eq!(attributes.foreground, before.foreground);

        InlineDelta::default().apply(&mut attributes);
        assert!(attributes.is_italic());
    }
}
