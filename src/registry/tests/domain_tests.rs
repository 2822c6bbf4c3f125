//! Unit tests for registry snapshot types.

use crate::registry::domain::{CONNECT_PROXY_KIND, RegisteredService, RegisteredServiceSet};
use crate::service::domain::ServiceId;
use rstest::rstest;

fn id(value: &str) -> ServiceId {
    ServiceId::new(value).expect("valid identifier")
}

fn entry(value: &str) -> RegisteredService {
    RegisteredService::new(id(value), value, Vec::new(), 80)
}

#[rstest]
fn set_is_keyed_by_identifier() {
    let set: RegisteredServiceSet = [entry("b"), entry("a"), entry("a")].into_iter().collect();

    assert_eq!(set.len(), 2);
    let ids: Vec<&str> = set.iter().map(|service| service.id().as_str()).collect();
    assert_eq!(ids, ["a", "b"]);
}

#[rstest]
#[case(None, false)]
#[case(Some(CONNECT_PROXY_KIND), true)]
#[case(Some("mesh-gateway"), false)]
fn sidecar_detection_follows_kind(#[case] kind: Option<&str>, #[case] expected: bool) {
    let service = match kind {
        Some(value) => entry("web").with_kind(value),
        None => entry("web"),
    };

    assert_eq!(service.is_sidecar_proxy(), expected);
}

#[rstest]
fn without_sidecars_keeps_plain_services() {
    let set: RegisteredServiceSet = [
        entry("web"),
        entry("web-sidecar-proxy").with_kind(CONNECT_PROXY_KIND),
    ]
    .into_iter()
    .collect();

    let filtered = set.without_sidecars();

    assert_eq!(filtered.len(), 1);
    assert!(filtered.contains(&id("web")));
    assert!(!filtered.contains(&id("web-sidecar-proxy")));
}
