//! Unit tests for service domain types.

use crate::service::domain::{LabelPrefix, ServiceDescription, ServiceDomainError, ServiceId};
use rstest::rstest;

#[rstest]
#[case("/whoami", "whoami")]
#[case("whoami", "whoami")]
#[case("//double", "/double")]
fn service_id_strips_one_leading_slash(#[case] raw: &str, #[case] expected: &str) {
    let id = ServiceId::new(raw).expect("valid identifier");
    assert_eq!(id.as_str(), expected);
}

#[rstest]
#[case("")]
#[case("/")]
fn empty_service_id_is_rejected(#[case] raw: &str) {
    assert_eq!(ServiceId::new(raw), Err(ServiceDomainError::EmptyServiceId));
}

#[rstest]
#[case("")]
#[case("  ")]
fn empty_label_prefix_is_rejected(#[case] raw: &str) {
    assert_eq!(LabelPrefix::new(raw), Err(ServiceDomainError::EmptyLabelPrefix));
}

#[rstest]
fn default_label_prefix_is_traefik() {
    assert_eq!(LabelPrefix::default().as_str(), "traefik");
}

#[rstest]
fn description_rejects_zero_port() {
    let id = ServiceId::new("web").expect("valid identifier");
    let result = ServiceDescription::new(id, "web", 0, Vec::new(), false);
    assert_eq!(result, Err(ServiceDomainError::ZeroPort));
}

#[rstest]
fn description_rejects_empty_name() {
    let id = ServiceId::new("web").expect("valid identifier");
    let result = ServiceDescription::new(id, "", 80, Vec::new(), false);
    assert_eq!(result, Err(ServiceDomainError::EmptyServiceName));
}
