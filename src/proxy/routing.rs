//! Path classification for the four relay routes.
//!
//! [`classify`] maps the request path to exactly one [`ProxyRoute`].
//! Matching is exact and case-sensitive; a trailing slash or extra
//! segment is not a match. The query string and body are never
//! inspected, and `OPTIONS` preflights are short-circuited by the
//! handler before classification.

/// Which of the three browser-collect endpoints a hit targets. The
/// letter is reused verbatim as the upstream path segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectVariant {
    G,
    J,
    R,
}

impl CollectVariant {
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::G => "/g/collect",
            Self::J => "/j/collect",
            Self::R => "/r/collect",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProxyRoute {
    /// `/gtag/js` — tag-management script, cached aggressively.
    Script,
    /// `/g|j|r/collect` — browser hits; issues the identity cookie.
    Collect(CollectVariant),
    /// `/mp/collect` — Measurement Protocol pass-through.
    Measurement,
    NotFound,
}

#[must_use]
pub fn classify(path: &str) -> ProxyRoute {
    match path {
        "/gtag/js" => ProxyRoute::Script,
        "/g/collect" => ProxyRoute::Collect(CollectVariant::G),
        "/j/collect" => ProxyRoute::Collect(CollectVariant::J),
        "/r/collect" => ProxyRoute::Collect(CollectVariant::R),
        "/mp/collect" => ProxyRoute::Measurement,
        _ => ProxyRoute::NotFound,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_route() {
        assert_eq!(classify("/gtag/js"), ProxyRoute::Script);
    }

    #[test]
    fn collect_routes_carry_variant() {
        assert_eq!(classify("/g/collect"), ProxyRoute::Collect(CollectVariant::G));
        assert_eq!(classify("/j/collect"), ProxyRoute::Collect(CollectVariant::J));
        assert_eq!(classify("/r/collect"), ProxyRoute::Collect(CollectVariant::R));
    }

    #[test]
    fn measurement_route() {
        assert_eq!(classify("/mp/collect"), ProxyRoute::Measurement);
    }

    #[test]
    fn unknown_paths_do_not_match() {
        assert_eq!(classify("/"), ProxyRoute::NotFound);
        assert_eq!(classify("/x/collect"), ProxyRoute::NotFound);
        assert_eq!(classify("/collect"), ProxyRoute::NotFound);
        assert_eq!(classify("/gtag"), ProxyRoute::NotFound);
    }

    #[test]
    fn trailing_slash_does_not_match() {
        assert_eq!(classify("/gtag/js/"), ProxyRoute::NotFound);
        assert_eq!(classify("/g/collect/"), ProxyRoute::NotFound);
    }

    #[test]
    fn extra_segments_do_not_match() {
        assert_eq!(classify("/gtag/js/v2"), ProxyRoute::NotFound);
        assert_eq!(classify("/mp/collect/batch"), ProxyRoute::NotFound);
    }

    #[test]
    fn matching_is_case_sensitive() {
        assert_eq!(classify("/GTAG/JS"), ProxyRoute::NotFound);
        assert_eq!(classify("/G/collect"), ProxyRoute::NotFound);
    }

    #[test]
    fn variant_paths_round_trip() {
        assert_eq!(CollectVariant::G.path(), "/g/collect");
        assert_eq!(CollectVariant::J.path(), "/j/collect");
        assert_eq!(CollectVariant::R.path(), "/r/collect");
    }
}
