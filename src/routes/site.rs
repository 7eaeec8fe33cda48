//! Built-in route trees for each branded site.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::RouteTree;

/// The branded products that share this codebase
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SiteType {
    #[default]
    Justfix,
    Norent,
    Evictionfree,
    Laletterbuilder,
}

impl SiteType {
    pub fn all() -> &'static [SiteType] {
        &[
            SiteType::Justfix,
            SiteType::Norent,
            SiteType::Evictionfree,
            SiteType::Laletterbuilder,
        ]
    }

    /// Name used in configuration and bootstrap documents
    pub fn key(&self) -> &'static str {
        match self {
            SiteType::Justfix => "JUSTFIX",
            SiteType::Norent => "NORENT",
            SiteType::Evictionfree => "EVICTIONFREE",
            SiteType::Laletterbuilder => "LALETTERBUILDER",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            SiteType::Justfix => "JustFix",
            SiteType::Norent => "NoRent",
            SiteType::Evictionfree => "EvictionFree",
            SiteType::Laletterbuilder => "LA Letter Builder",
        }
    }
}

impl fmt::Display for SiteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for SiteType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SiteType::all()
            .iter()
            .copied()
            .find(|site| site.key().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown site type: {}", s))
    }
}

/// Routes shared by every site regardless of locale
fn dev_routes() -> RouteTree {
    RouteTree::branch([
        ("home", RouteTree::leaf("/dev")),
        (
            "examples",
            RouteTree::branch([
                ("form", RouteTree::leaf("/dev/examples/form")),
                ("redirect", RouteTree::leaf("/dev/examples/redirect")),
                ("loadable", RouteTree::leaf("/dev/examples/loadable/:name")),
            ]),
        ),
    ])
}

/// Build a leaf under the locale prefix
fn at(prefix: &str, path: &str) -> RouteTree {
    RouteTree::leaf(format!("{}{}", prefix, path))
}

fn justfix_routes(prefix: &str) -> RouteTree {
    RouteTree::branch([
        ("home", at(prefix, "/")),
        ("login", at(prefix, "/login")),
        ("logout", at(prefix, "/logout")),
        (
            "passwordReset",
            RouteTree::branch([
                ("start", at(prefix, "/password-reset")),
                ("verify", at(prefix, "/password-reset/verify")),
                ("confirm", at(prefix, "/password-reset/set")),
            ]),
        ),
        (
            "onboarding",
            RouteTree::branch([
                ("latestStep", at(prefix, "/onboarding")),
                ("step1", at(prefix, "/onboarding/step/1")),
                (
                    "step1AddressModal",
                    at(prefix, "/onboarding/step/1/address-modal"),
                ),
                ("step2", at(prefix, "/onboarding/step/2")),
                ("step3", at(prefix, "/onboarding/step/3")),
                ("step4", at(prefix, "/onboarding/step/4")),
                ("thanks", at(prefix, "/onboarding/thanks")),
            ]),
        ),
        (
            "loc",
            RouteTree::branch([
                ("latestStep", at(prefix, "/loc")),
                ("splash", at(prefix, "/loc/splash")),
                (
                    "issues",
                    RouteTree::branch([
                        ("home", at(prefix, "/loc/issues")),
                        ("area", at(prefix, "/loc/issues/:area")),
                    ]),
                ),
                ("reliefAttempts", at(prefix, "/loc/relief-attempts")),
                ("preview", at(prefix, "/loc/preview")),
                ("confirmation", at(prefix, "/loc/confirmation")),
            ]),
        ),
    ])
}

fn norent_routes(prefix: &str) -> RouteTree {
    let letter = |path: &str| at(prefix, &format!("/letter{}", path));
    RouteTree::branch([
        ("home", at(prefix, "/")),
        ("faqs", at(prefix, "/faqs")),
        ("about", at(prefix, "/about")),
        (
            "letter",
            RouteTree::branch([
                ("latestStep", letter("")),
                ("welcome", letter("/welcome")),
                ("phoneNumber", letter("/phone")),
                ("name", letter("/name")),
                ("city", letter("/city")),
                ("nationalAddress", letter("/address/national")),
                ("nationalAddressConfirm", letter("/address/national/confirm")),
                ("nycAddress", letter("/address/nyc")),
                ("nycAddressConfirm", letter("/address/nyc/confirm")),
                ("email", letter("/email")),
                ("createAccount", letter("/create-account")),
                ("preview", letter("/preview")),
                ("confirmation", letter("/confirmation")),
            ]),
        ),
    ])
}

fn evictionfree_routes(prefix: &str) -> RouteTree {
    let declaration = |path: &str| at(prefix, &format!("/declaration{}", path));
    RouteTree::branch([
        ("home", at(prefix, "/")),
        ("faqs", at(prefix, "/faqs")),
        (
            "declaration",
            RouteTree::branch([
                ("latestStep", declaration("")),
                ("welcome", declaration("/welcome")),
                ("name", declaration("/name")),
                ("address", declaration("/address")),
                ("addressConfirm", declaration("/address/confirm")),
                ("hardshipSituation", declaration("/hardship-situation")),
                ("preview", declaration("/preview")),
                ("confirmation", declaration("/confirmation")),
            ]),
        ),
    ])
}

fn laletterbuilder_routes(prefix: &str) -> RouteTree {
    let letter = |path: &str| at(prefix, &format!("/create-letter{}", path));
    RouteTree::branch([
        ("home", at(prefix, "/")),
        ("myLetters", at(prefix, "/my-letters")),
        (
            "habitability",
            RouteTree::branch([
                ("latestStep", letter("")),
                ("welcome", letter("/welcome")),
                ("myInfo", letter("/my-info")),
                ("issues", letter("/issues/:category")),
                ("preview", letter("/preview")),
                ("confirmation", letter("/confirmation")),
            ]),
        ),
    ])
}

/// The full route tree for a site, with localized routes under `/{locale}`
/// and locale-independent developer routes under `dev`.
pub fn site_routes(site: SiteType, locale: &str) -> RouteTree {
    let prefix = format!("/{}", locale);
    let localized = match site {
        SiteType::Justfix => justfix_routes(&prefix),
        SiteType::Norent => norent_routes(&prefix),
        SiteType::Evictionfree => evictionfree_routes(&prefix),
        SiteType::Laletterbuilder => laletterbuilder_routes(&prefix),
    };
    RouteTree::branch([("locale", localized), ("dev", dev_routes())])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::RouteMap;

    #[test]
    fn test_site_type_parsing() {
        assert_eq!("norent".parse::<SiteType>(), Ok(SiteType::Norent));
        assert_eq!("JUSTFIX".parse::<SiteType>(), Ok(SiteType::Justfix));
        assert!("bogus".parse::<SiteType>().is_err());
    }

    #[test]
    fn test_site_type_serde() {
        let json = serde_json::to_string(&SiteType::Laletterbuilder).unwrap();
        assert_eq!(json, "\"LALETTERBUILDER\"");
    }

    #[test]
    fn test_justfix_routes_are_localized() {
        let routes = site_routes(SiteType::Justfix, "es");
        assert_eq!(
            routes.path("locale.onboarding.step1"),
            Some("/es/onboarding/step/1")
        );
        assert_eq!(routes.path("dev.home"), Some("/dev"));
    }

    #[test]
    fn test_every_leaf_resolves_in_route_map() {
        for site in SiteType::all() {
            let routes = site_routes(*site, "en");
            let map = RouteMap::new(&routes);
            for leaf in routes.leaves() {
                let concrete = leaf
                    .replace(":area", "HOME")
                    .replace(":name", "x")
                    .replace(":category", "health");
                assert!(map.exists(&concrete), "{} should exist for {}", leaf, site);
            }
        }
    }

    #[test]
    fn test_server_only_paths_do_not_exist() {
        let map = RouteMap::new(&site_routes(SiteType::Norent, "en"));
        assert!(!map.exists("/admin/"));
        assert!(map.exists("/en/letter/address/nyc/confirm"));
    }
}
