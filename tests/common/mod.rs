#![allow(dead_code)]

use rand::Rng;
use serde_json::{Value, json};
use std::fs::File;
use std::io::{Error, Write};
use std::path::Path;

pub fn purchase_json(first_name: &str, email: &str) -> Value {
    let address = json!({
        "street": "1 Main St",
        "city": "Austin",
        "state": "TX",
        "country": "US",
        "zipCode": "73301"
    });
    json!({
        "customer": {"firstName": first_name, "lastName": "Doe", "email": email},
        "shippingAddress": address,
        "billingAddress": address,
        "order": {"totalQuantity": 2, "totalPrice": 37.98},
        "orderItems": [{"productId": 1, "imageUrl": "img/1.png", "unitPrice": 18.99, "quantity": 2}]
    })
}

pub fn purchase_line(first_name: &str, email: &str) -> String {
    purchase_json(first_name, email).to_string()
}

/// Writes `rows` purchases spread randomly over `customers` distinct emails.
pub fn generate_purchases(path: &Path, rows: usize, customers: usize) -> Result<(), Error> {
    let mut file = File::create(path)?;
    let mut rng = rand::thread_rng();

    for _ in 0..rows {
        let customer = rng.gen_range(1..=customers);
        writeln!(
            file,
            "{}",
            purchase_line("Customer", &format!("customer{customer}@example.com"))
        )?;
    }

    file.flush()
}
