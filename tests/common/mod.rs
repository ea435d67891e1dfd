#![allow(dead_code, unused_imports)]

pub mod mocks;

use collection_export::core::record::{Collection, Model};
use serde::Serialize;

pub use mocks::MockFile;

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[derive(Serialize, Clone)]
pub struct Car {
    pub year: u16,
    pub make: String,
    pub model: String,
    pub description: String,
}

pub fn cars() -> Vec<Car> {
    vec![
        Car {
            year: 1948,
            make: "Porsche".to_string(),
            model: "356".to_string(),
            description: "Luxury sports car".to_string(),
        },
        Car {
            year: 2011,
            make: "Peugeot".to_string(),
            model: "206+".to_string(),
            description: "City car".to_string(),
        },
        Car {
            year: 2012,
            make: "Citroën".to_string(),
            model: "C4 Picasso".to_string(),
            description: "Family \"MPV\" w/ 7 seats".to_string(),
        },
    ]
}

pub fn car_models() -> Vec<Model> {
    cars()
        .iter()
        .map(|car| Model::from_serialize(car).unwrap())
        .collect()
}

/// The two record collection used in the format examples.
pub fn id_name_collection() -> Collection<Model> {
    Collection::from_records(
        "Collection",
        vec![
            Model::new("Item").with("id", "1").with("name", "A"),
            Model::new("Item").with("id", "2").with("name", "B"),
        ],
    )
}
