//! JustFix onboarding: address, household, lease, then account creation

use super::route;
use crate::progress::{ProgressRoutes, Step};
use crate::routes::{site_routes, SiteType};
use crate::session::Session;

fn needs_address_confirmation(session: &Session) -> bool {
    session
        .onboarding_step1
        .as_ref()
        .is_some_and(|step1| !step1.address_verified)
}

pub fn onboarding_flow(locale: &str) -> ProgressRoutes {
    let routes = site_routes(SiteType::Justfix, locale);
    let path = |key: &str| route(&routes, &format!("locale.onboarding.{key}"));

    ProgressRoutes::new(
        "Onboarding",
        vec![],
        vec![
            Step::new(path("step1"), "Address")
                .exact()
                .complete_when(|s| s.onboarding_step1.is_some()),
            Step::new(path("step1AddressModal"), "ConfirmAddress")
                .exact()
                .skip_when(|s| !needs_address_confirmation(s))
                .complete_when(|s| !needs_address_confirmation(s)),
            Step::new(path("step2"), "Household")
                .exact()
                .complete_when(|s| s.onboarding_step2.is_some()),
            Step::new(path("step3"), "Lease")
                .exact()
                .complete_when(|s| s.onboarding_step3.is_some()),
            Step::new(path("step4"), "Account")
                .exact()
                .complete_when(|s| s.onboarding_info.is_some())
                .never_go_back_to(),
        ],
        vec![Step::new(path("thanks"), "Thanks")
            .exact()
            .complete_when(Session::is_logged_in)],
    )
}
