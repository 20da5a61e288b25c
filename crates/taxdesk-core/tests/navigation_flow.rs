use std::cell::RefCell;
use std::rc::Rc;

use taxdesk_core::auth::{AuthState, User};
use taxdesk_core::navigation::{ClickEvent, Link, NavigationStore};
use taxdesk_core::routes::{Resolved, Route, Router};

#[test]
fn test_back_after_two_navigations_notifies_everyone() {
    let nav = NavigationStore::in_memory("/login");
    let first = Rc::new(RefCell::new(Vec::new()));
    let second = Rc::new(RefCell::new(Vec::new()));

    let sink = first.clone();
    let _a = nav.subscribe(move |path| sink.borrow_mut().push(path.to_string()));
    let sink = second.clone();
    let _b = nav.subscribe(move |path| sink.borrow_mut().push(path.to_string()));

    nav.navigate("/dashboard");
    nav.navigate("/dashboard/returns");
    assert!(nav.back());

    assert_eq!(nav.current_path(), "/dashboard");
    assert_eq!(first.borrow().last().map(String::as_str), Some("/dashboard"));
    assert_eq!(*first.borrow(), *second.borrow());
}

#[test]
fn test_unauthenticated_deep_link_redirects_to_login() {
    let nav = NavigationStore::in_memory("/dashboard/returns");
    let resolved = Router::resolve(&nav, &AuthState::Unauthenticated);

    assert_eq!(
        resolved,
        Resolved::Page {
            route: Route::Login,
            redirected_from: Some("/dashboard/returns".to_string()),
        }
    );
    assert_eq!(nav.current_path(), "/login");
}

#[test]
fn test_authenticated_login_page_redirects_to_dashboard() {
    let nav = NavigationStore::in_memory("/login");
    let auth = AuthState::Authenticated(User::from_email("pat@example.com", None));

    let resolved = Router::resolve(&nav, &auth);
    assert!(matches!(resolved, Resolved::Page { route: Route::Dashboard, .. }));
    assert_eq!(nav.current_path(), "/dashboard");
}

#[test]
fn test_link_click_navigates_and_resolves() {
    let nav = NavigationStore::in_memory("/dashboard");
    let auth = AuthState::Authenticated(User::from_email("pat@example.com", None));

    let mut event = ClickEvent::new();
    Link::new("dashboard/payments").activate(&nav, &mut event);

    assert!(event.default_prevented());
    assert_eq!(
        Router::resolve(&nav, &auth),
        Resolved::Page {
            route: Route::Payments,
            redirected_from: None,
        }
    );
}
