//! OpenAPI Specification Generator Binary
//!
//! Prints the ALMA calendar OpenAPI document as JSON to stdout, for client
//! generation.
//!
//! Usage:
//!   cargo run -p alma-api --bin generate-openapi > openapi.json

use alma_api::ApiDoc;

fn main() {
    match ApiDoc::to_json() {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Failed to serialize OpenAPI spec: {}", e);
            std::process::exit(1);
        }
    }
}
