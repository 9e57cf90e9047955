use serde::{Deserialize, Serialize};
use serde_envelope::{from_str_as, tagged, to_string, Registry, Shape, Tagged};

mod billing {
    use serde::{Deserialize, Serialize};

    #[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
    pub struct Invoice {
        pub number: u32,
    }
    serde_envelope::tagged!(Invoice);
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
struct Explicit {
    id: String,
}
tagged!(Explicit => "acme.Explicit");

const LEDGER_NAME: &str = "acme.Ledger";

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
struct Ledger {
    entries: Vec<i64>,
}
tagged!(Ledger => LEDGER_NAME);

#[test]
fn test_tagged_explicit_name() {
    assert_eq!(Explicit::shape(), Shape::structure("acme.Explicit"));
    assert_eq!(
        <Option<Explicit>>::shape().name().unwrap(),
        "*acme.Explicit"
    );
}

#[test]
fn test_tagged_name_from_const() {
    assert_eq!(Ledger::shape().to_string(), "acme.Ledger");
}

#[test]
fn test_tagged_module_path_name() {
    assert_eq!(
        billing::Invoice::shape().to_string(),
        "macro_tests::billing::Invoice"
    );
}

#[test]
fn test_tagged_types_round_trip() {
    let registry = Registry::new();
    registry.register::<Explicit>().unwrap();
    registry.register::<billing::Invoice>().unwrap();

    let invoice = billing::Invoice { number: 9 };
    let json = to_string(&invoice).unwrap();
    assert_eq!(
        json,
        r#"{"_t":"macro_tests::billing::Invoice","v":{"number":9}}"#
    );
    assert_eq!(
        from_str_as::<billing::Invoice>(&json, &registry).unwrap(),
        invoice
    );

    let explicit = vec![Explicit { id: "x".to_string() }];
    let json = to_string(&explicit).unwrap();
    assert_eq!(
        from_str_as::<Vec<Explicit>>(&json, &registry).unwrap(),
        explicit
    );
}
