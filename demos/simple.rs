//! Basic envelope encoding and decoding.
//!
//! Run with: cargo run --example simple

use serde::{Deserialize, Serialize};
use serde_envelope::{from_str_as, to_string, Registry};
use std::error::Error;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
struct User {
    id: u32,
    name: String,
    email: Option<String>,
}
serde_envelope::tagged!(User => "demo.User");

fn main() -> Result<(), Box<dyn Error>> {
    let users = vec![
        Some(User {
            id: 42,
            name: "Alice Johnson".to_string(),
            email: Some("alice@example.com".to_string()),
        }),
        None,
        Some(User {
            id: 43,
            name: "Bob Smith".to_string(),
            email: None,
        }),
    ];

    // Encode: the type name travels with the payload
    let json = to_string(&users)?;
    println!("Envelope:\n{}\n", json);

    // Decode: the registry turns `demo.User` back into a Rust type
    let registry = Registry::new();
    registry.register::<User>()?;

    let users_back: Vec<Option<User>> = from_str_as(&json, &registry)?;
    assert_eq!(users, users_back);
    println!("✓ Round-trip successful");

    Ok(())
}
