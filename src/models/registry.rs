// Candidate registry: the fixed set of stores a route can visit

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::error::RegistryError;
use crate::models::Coordinate;

/// Kilometers per degree of latitude (mean)
const KM_PER_DEGREE: f64 = 111.32;

/// Position and address of one registry entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistryEntry {
    pub address: String,

    #[serde(alias = "lat")]
    pub latitude: f64,

    #[serde(alias = "lon")]
    pub longitude: f64,
}

impl RegistryEntry {
    pub fn new<A: Into<String>>(address: A, latitude: f64, longitude: f64) -> Self {
        Self {
            address: address.into(),
            latitude,
            longitude,
        }
    }

    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }
}

/// Registry of candidate points keyed by name
///
/// Backed by a `BTreeMap` so iteration always follows name order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Registry {
    entries: BTreeMap<String, RegistryEntry>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces an entry after validating its coordinate
    pub fn insert<N: Into<String>>(
        &mut self,
        name: N,
        entry: RegistryEntry,
    ) -> Result<(), RegistryError> {
        let name = name.into();
        if !entry.coordinate().is_valid() {
            return Err(RegistryError::InvalidCoordinate {
                name,
                latitude: entry.latitude,
                longitude: entry.longitude,
            });
        }
        self.entries.insert(name, entry);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&RegistryEntry> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RegistryEntry)> {
        self.entries.iter().map(|(name, entry)| (name.as_str(), entry))
    }

    /// Parses a JSON object of `name -> { address, latitude, longitude }`
    pub fn from_json_str(json: &str) -> Result<Self, RegistryError> {
        let raw: BTreeMap<String, RegistryEntry> = serde_json::from_str(json)?;

        let mut registry = Registry::new();
        for (name, entry) in raw {
            registry.insert(name, entry)?;
        }
        Ok(registry)
    }

    /// Loads a JSON registry file
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, RegistryError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| RegistryError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// The built-in store registry (Curitiba)
    pub fn default_stores() -> Self {
        let stores = [
            (
                "Loja Centro",
                "Rua XV de Novembro, 1000, Centro, Curitiba",
                -25.4284,
                -49.2673,
            ),
            (
                "Loja Batel",
                "Avenida do Batel, 1500, Batel, Curitiba",
                -25.4352,
                -49.2945,
            ),
            (
                "Loja Portão",
                "Avenida República Argentina, 3000, Portão, Curitiba",
                -25.4658,
                -49.2901,
            ),
            (
                "Loja Santa Felicidade",
                "Avenida Manoel Ribas, 5000, Santa Felicidade, Curitiba",
                -25.4190,
                -49.3056,
            ),
            (
                "Loja Boqueirão",
                "Rua da Cidadania Boqueirão, Boqueirão, Curitiba",
                -25.4820,
                -49.2897,
            ),
        ];

        let entries = stores
            .into_iter()
            .map(|(name, address, lat, lon)| {
                (name.to_string(), RegistryEntry::new(address, lat, lon))
            })
            .collect();

        Self { entries }
    }

    /// Generates a seeded synthetic registry scattered around `center`
    ///
    /// Every entry lies within `spread_km` of the center along each axis.
    pub fn random(count: usize, center: Coordinate, spread_km: f64, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let km_per_lon_degree = KM_PER_DEGREE * center.latitude.to_radians().cos().max(1e-6);
        let spread = spread_km.abs().max(f64::EPSILON);

        let mut entries = BTreeMap::new();
        for i in 0..count {
            let dy = rng.gen_range(-spread..=spread);
            let dx = rng.gen_range(-spread..=spread);
            let latitude = (center.latitude + dy / KM_PER_DEGREE).clamp(-90.0, 90.0);
            let longitude = (center.longitude + dx / km_per_lon_degree).clamp(-180.0, 180.0);

            let name = format!("Store {:04}", i + 1);
            let address = format!("{} Synthetic Avenue", i + 1);
            entries.insert(name, RegistryEntry::new(address, latitude, longitude));
        }

        Self { entries }
    }
}
