//! Concrete flows built from the site route trees

use crate::progress::ProgressRoutes;
use crate::routes::{RouteTree, SiteType};

pub mod norent;
pub mod onboarding;

pub use norent::norent_letter_flow;
pub use onboarding::onboarding_flow;

/// Look up a route the flow declarations depend on.
///
/// # Panics
///
/// Panics when the key is absent, which means the route tree and the flow
/// declarations disagree.
fn route(tree: &RouteTree, key: &str) -> String {
    match tree.path(key) {
        Some(path) => path.to_string(),
        None => panic!("route tree has no leaf at {key:?}"),
    }
}

/// The main flow of a site, if one is modelled
pub fn flow_for(site: SiteType, locale: &str) -> Option<ProgressRoutes> {
    match site {
        SiteType::Justfix => Some(onboarding_flow(locale)),
        SiteType::Norent => Some(norent_letter_flow(locale)),
        SiteType::Evictionfree | SiteType::Laletterbuilder => None,
    }
}
