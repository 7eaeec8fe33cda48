//! NoRent letter flow. Which address steps apply depends on whether the
//! tenant's city is in NYC.

use super::route;
use crate::progress::{ProgressRoutes, Step};
use crate::routes::{site_routes, SiteType};
use crate::session::{NorentScaffolding, Session};

fn scaffolding(session: &Session) -> Option<&NorentScaffolding> {
    session.norent_scaffolding.as_ref()
}

fn has_scaffolding(session: &Session, f: impl Fn(&NorentScaffolding) -> bool) -> bool {
    scaffolding(session).is_some_and(f)
}

fn is_in_nyc(session: &Session) -> bool {
    has_scaffolding(session, |s| s.is_city_in_nyc == Some(true))
}

fn has_street(session: &Session) -> bool {
    has_scaffolding(session, |s| !s.street.is_empty())
}

pub fn norent_letter_flow(locale: &str) -> ProgressRoutes {
    let routes = site_routes(SiteType::Norent, locale);
    let path = |key: &str| route(&routes, &format!("locale.letter.{key}"));

    ProgressRoutes::new(
        "NoRent letter",
        vec![Step::new(path("welcome"), "Welcome").exact()],
        vec![
            Step::new(path("phoneNumber"), "PhoneNumber")
                .exact()
                .complete_when(|s| s.phone_number.is_some()),
            Step::new(path("name"), "Name").exact().complete_when(|s| {
                s.first_name.is_some() || has_scaffolding(s, |sc| !sc.first_name.is_empty())
            }),
            Step::new(path("city"), "City")
                .exact()
                .complete_when(|s| has_scaffolding(s, |sc| sc.is_city_in_nyc.is_some())),
            Step::new(path("nationalAddress"), "NationalAddress")
                .exact()
                .skip_when(is_in_nyc)
                .complete_when(has_street),
            Step::new(path("nationalAddressConfirm"), "NationalAddressConfirm")
                .exact()
                .skip_when(is_in_nyc)
                .complete_when(has_street),
            Step::new(path("nycAddress"), "NycAddress")
                .exact()
                .skip_when(|s| !is_in_nyc(s))
                .complete_when(has_street),
            Step::new(path("nycAddressConfirm"), "NycAddressConfirm")
                .exact()
                .skip_when(|s| !is_in_nyc(s))
                .complete_when(has_street),
            Step::new(path("email"), "Email").exact().complete_when(|s| {
                s.email.is_some() || has_scaffolding(s, |sc| !sc.email.is_empty())
            }),
            Step::new(path("createAccount"), "CreateAccount")
                .exact()
                .complete_when(Session::is_logged_in)
                .never_go_back_to(),
            Step::new(path("preview"), "Preview")
                .exact()
                .complete_when(|_| false),
        ],
        vec![Step::new(path("confirmation"), "Confirmation")
            .exact()
            .complete_when(|_| false)],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session_in(city_in_nyc: bool) -> Session {
        Session {
            phone_number: Some("5551234567".to_string()),
            norent_scaffolding: Some(NorentScaffolding {
                first_name: "Boop".to_string(),
                city: if city_in_nyc { "Brooklyn" } else { "Albany" }.to_string(),
                is_city_in_nyc: Some(city_in_nyc),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_city_decides_address_step() {
        let flow = norent_letter_flow("en");
        assert_eq!(
            flow.next(&session_in(true), "/en/letter/city").map(Step::path),
            Some("/en/letter/address/nyc")
        );
        assert_eq!(
            flow.next(&session_in(false), "/en/letter/city").map(Step::path),
            Some("/en/letter/address/national")
        );
    }

    #[test]
    fn test_national_confirm_skips_nyc_steps_going_forward() {
        let flow = norent_letter_flow("en");
        assert_eq!(
            flow.next(&session_in(false), "/en/letter/address/national/confirm")
                .map(Step::path),
            Some("/en/letter/email")
        );
    }

    #[test]
    fn test_back_from_email_lands_on_unfinished_address() {
        let flow = norent_letter_flow("en");
        assert_eq!(
            flow.prev(&session_in(true), "/en/letter/email").map(Step::path),
            Some("/en/letter/address/nyc/confirm")
        );
    }

    #[test]
    fn test_latest_step() {
        let flow = norent_letter_flow("en");
        assert_eq!(flow.latest_step_path(&session_in(false)), "/en/letter/city");
        assert_eq!(
            flow.latest_step_path(&Session::default()),
            "/en/letter/welcome"
        );
    }

    #[test]
    fn test_back_stops_before_account_creation() {
        let flow = norent_letter_flow("en");
        let session = Session {
            user_id: Some(7),
            ..session_in(false)
        };
        assert_eq!(flow.prev(&session, "/en/letter/preview"), None);
    }
}
