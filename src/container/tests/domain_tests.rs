//! Unit tests for container domain types.

use crate::container::domain::{ContainerSnapshot, PortMapping};
use rstest::rstest;

// ── PortMapping ─────────────────────────────────────────────────────

#[rstest]
#[case("8080", Some(8080))]
#[case(" 443 ", Some(443))]
#[case("0", None)]
#[case("", None)]
#[case("http", None)]
#[case("70000", None)]
fn host_port_parses_positive_numbers(#[case] raw: &str, #[case] expected: Option<u16>) {
    let mapping = PortMapping::published("80/tcp", raw);
    assert_eq!(mapping.host_port(), expected);
}

#[rstest]
#[case("80/tcp", Some(80))]
#[case("53/udp", None)]
#[case("80", None)]
#[case("x/tcp", None)]
fn exposed_port_requires_tcp_key(#[case] key: &str, #[case] expected: Option<u16>) {
    assert_eq!(PortMapping::exposed(key).exposed_tcp_port(), expected);
}

// ── ContainerSnapshot ───────────────────────────────────────────────

#[rstest]
fn lowest_host_port_compares_numerically() {
    let snapshot = ContainerSnapshot::new("/web")
        .with_port(PortMapping::published("80/tcp", "10000"))
        .with_port(PortMapping::published("81/tcp", "9000"))
        .with_port(PortMapping::exposed("82/tcp"));

    assert_eq!(snapshot.lowest_host_port(), Some(9000));
}

#[rstest]
fn lowest_exposed_port_ignores_udp() {
    let snapshot = ContainerSnapshot::new("/dns")
        .with_port(PortMapping::exposed("53/udp"))
        .with_port(PortMapping::exposed("9153/tcp"))
        .with_port(PortMapping::exposed("8080/tcp"));

    assert_eq!(snapshot.lowest_exposed_port(), Some(8080));
    assert_eq!(snapshot.lowest_host_port(), None);
}

#[rstest]
fn labels_keep_insertion_order() {
    let snapshot = ContainerSnapshot::new("/web")
        .with_label("z.last", "1")
        .with_labels([("a.first", "2"), ("m.middle", "3")]);

    let keys: Vec<&str> = snapshot.labels().iter().map(|(key, _)| key.as_str()).collect();
    assert_eq!(keys, ["z.last", "a.first", "m.middle"]);
}
