//! Registering types and handling decode errors.
//!
//! Run with: cargo run --example registry

use serde::{Deserialize, Serialize};
use serde_envelope::{from_str, to_string, Error, Registry};
use std::error::Error as StdError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
struct Invoice {
    number: u32,
    total: f64,
}
serde_envelope::tagged!(Invoice => "billing.Invoice");

fn main() -> Result<(), Box<dyn StdError>> {
    let json = to_string(&Some(Invoice {
        number: 1001,
        total: 249.5,
    }))?;
    println!("Envelope: {}\n", json);

    // An empty registry knows primitives and `any`, but not our struct
    let registry = Registry::new();
    match from_str(&json, &registry) {
        Err(Error::TypeNotFound(name)) => println!("Not registered yet: {}", name),
        other => println!("Unexpected: {:?}", other),
    }

    // Only structs can be registered
    if let Err(e) = registry.register::<Vec<Invoice>>() {
        println!("Rejected: {}", e);
    }

    registry.register::<Invoice>()?;
    let value = from_str(&json, &registry)?;
    let invoice = value.deref()?;
    println!("Decoded: {:?}", invoice.downcast_ref::<Invoice>());

    // Payloads that do not fit their type are reported against it
    let broken = r#"{"_t":"[]billing.Invoice","v":{"number":1}}"#;
    if let Err(e) = from_str(broken, &registry) {
        println!("Broken payload: {}", e);
    }

    println!("\nKnown types: {}", registry.names().join(", "));
    Ok(())
}
